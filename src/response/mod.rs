//! Response processing seam
//!
//! Once a command has written its last request, the connection is handed to
//! a [`ResponseHandler`]. Parsing server replies and applying them to the
//! working copy is the handler's business; the command only needs to know
//! whether the server reported success.

use crate::types::{CvsError, FolderId};
use crate::workspace::ResourceModel;
use tracing::{info, warn};

/// Final verdict of the server for one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    Ok,
    Error { message: String },
}

impl ServerStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ServerStatus::Ok)
    }
}

/// Sink for human readable server messages (`M` and `E` responses)
pub trait OutputListener {
    fn message(&mut self, line: &str);
    fn error_line(&mut self, line: &str);
}

/// Forwards server messages to the log
#[derive(Debug, Default)]
pub struct TracingListener;

impl OutputListener for TracingListener {
    fn message(&mut self, line: &str) {
        info!("M {}", line);
    }

    fn error_line(&mut self, line: &str) {
        warn!("E {}", line);
    }
}

/// Keeps every server message in memory
#[derive(Debug, Default)]
pub struct CollectingListener {
    pub messages: Vec<String>,
    pub errors: Vec<String>,
}

impl OutputListener for CollectingListener {
    fn message(&mut self, line: &str) {
        self.messages.push(line.to_string());
    }

    fn error_line(&mut self, line: &str) {
        self.errors.push(line.to_string());
    }
}

/// Reads the server replies for a command whose requests have been sent
pub trait ResponseHandler {
    fn handle_responses(
        &mut self,
        request: &str,
        root: FolderId,
        model: &mut dyn ResourceModel,
        listener: &mut dyn OutputListener,
    ) -> Result<ServerStatus, CvsError>;
}

/// Handler with a fixed answer.
///
/// Used when requests are only being written out, with no server reading
/// them, and to script outcomes in tests.
#[derive(Debug, Clone)]
pub struct CannedResponses {
    status: ServerStatus,
    messages: Vec<String>,
    handled: Vec<String>,
}

impl CannedResponses {
    pub fn ok() -> Self {
        Self {
            status: ServerStatus::Ok,
            messages: Vec::new(),
            handled: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ServerStatus::Error {
                message: message.into(),
            },
            messages: Vec::new(),
            handled: Vec::new(),
        }
    }

    /// Message passed to the listener before the verdict
    pub fn with_message(mut self, line: impl Into<String>) -> Self {
        self.messages.push(line.into());
        self
    }

    /// Requests this handler has answered, in order
    pub fn handled(&self) -> &[String] {
        &self.handled
    }
}

impl ResponseHandler for CannedResponses {
    fn handle_responses(
        &mut self,
        request: &str,
        _root: FolderId,
        _model: &mut dyn ResourceModel,
        listener: &mut dyn OutputListener,
    ) -> Result<ServerStatus, CvsError> {
        self.handled.push(request.to_string());
        for line in &self.messages {
            listener.message(line);
        }
        if let ServerStatus::Error { message } = &self.status {
            listener.error_line(message);
        }
        Ok(self.status.clone())
    }
}
