//! Core type definitions for cvsreq

mod error;
mod options;
mod resource;

pub use error::CvsError;
pub use options::{GlobalOption, KSubstMode, LocalOption};
pub use resource::{root_directory, FileId, FolderId, FolderSyncInfo, Resource};

/// Name of the per-folder metadata directory
pub const CVS_DIRECTORY: &str = "CVS";
