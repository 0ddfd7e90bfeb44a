//! # cvsreq - CVS client request builder
//!
//! Turns a command invocation against a local working copy into the exact,
//! ordered stream of requests a CVS server expects, then hands the session
//! over to response processing.

// Module declarations
pub mod commands;
pub mod config;
pub mod matcher;
pub mod response;
pub mod session;
pub mod types;
pub mod visitor;
pub mod workspace;

// Re-export commonly used types
pub use commands::{CommandOutcome, CommandRegistry, Invocation};
pub use config::ClientConfig;
pub use session::Session;
pub use types::{CvsError, FileId, FolderId, Resource};
pub use workspace::{ResourceModel, WorkingCopy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
