//! Error types for cvsreq

use std::path::PathBuf;
use thiserror::Error;

/// Error types for request building and command execution
#[derive(Debug, Error)]
pub enum CvsError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// No command is registered under this name
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Caller broke a command contract (argument count, root kind, ...)
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// An argument lives in a folder that is not under version control
    #[error("Resource is not managed by CVS: {name}")]
    NotManaged { name: String },

    /// The resource model could not serve a request for this path
    #[error("Resource error at {path}: {source}")]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `CVS/Entries` line could not be parsed
    #[error("Malformed entry line: {0}")]
    MalformedEntry(String),

    /// The server reported that the command failed
    #[error("Server reported an error for '{command}': {message}")]
    Server { command: String, message: String },

    /// The operation was canceled by the caller
    #[error("Operation canceled")]
    Canceled,
}

impl CvsError {
    /// Fatal caller errors that are raised before anything is finished
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            CvsError::Precondition(_) | CvsError::UnknownCommand(_) | CvsError::NotManaged { .. }
        )
    }

    /// Check if this error is a cancellation
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CvsError::Canceled)
    }

    /// Check if the failure was reported by the server
    pub fn is_server_error(&self) -> bool {
        matches!(self, CvsError::Server { .. })
    }

    /// Wrap an IO failure of the resource model with the offending path
    pub fn resource(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CvsError::Resource {
            path: path.into(),
            source,
        }
    }
}
