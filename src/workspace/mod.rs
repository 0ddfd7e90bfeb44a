//! Local working copy as seen by the request builder
//!
//! [`ResourceModel`] is the capability the traversals consume: existence,
//! dirty bits, sync metadata, parent navigation and children enumeration.
//! [`WorkingCopy`] is the in-memory implementation, filled either by hand or
//! from disk by [`scan_working_copy`].

mod entries;
mod scanner;
mod tree;

pub use entries::{parse_entry_timestamp, EntryLine, MergeState, ADDED_REVISION};
pub use scanner::scan_working_copy;
pub use tree::WorkingCopy;

use crate::session::{DEFAULT_EXECUTABLE_PERMISSIONS, DEFAULT_PERMISSIONS};
use crate::types::{CvsError, FileId, FolderId, FolderSyncInfo, KSubstMode, Resource};

/// Read and bookkeeping access to a working copy.
///
/// Handles are only meaningful for the model that issued them.
pub trait ResourceModel {
    fn folder_name(&self, folder: FolderId) -> &str;
    fn folder_exists(&self, folder: FolderId) -> bool;
    /// Navigational parent; `None` for the topmost folder
    fn folder_parent(&self, folder: FolderId) -> Option<FolderId>;
    /// Files directly inside `folder`, in name order
    fn files(&self, folder: FolderId) -> Vec<FileId>;
    /// Sub-folders directly inside `folder`, in name order
    fn folders(&self, folder: FolderId) -> Vec<FolderId>;
    /// Sync info of a folder under version control
    fn folder_sync(&self, folder: FolderId) -> Option<&FolderSyncInfo>;
    fn set_folder_sync(&mut self, folder: FolderId, info: FolderSyncInfo) -> Result<(), CvsError>;
    /// Remove a folder and everything below it
    fn delete_folder(&mut self, folder: FolderId) -> Result<(), CvsError>;

    fn file_name(&self, file: FileId) -> &str;
    fn file_parent(&self, file: FileId) -> FolderId;
    fn file_exists(&self, file: FileId) -> bool;
    /// Entry of a file the server tracks
    fn entry(&self, file: FileId) -> Option<&EntryLine>;
    /// Local contents differ from what the server last handed out.
    /// Untracked files always count as modified.
    fn is_modified(&self, file: FileId) -> bool;
    /// Untracked file matched by an ignore rule
    fn is_ignored(&self, file: FileId) -> bool;
    fn contents(&self, file: FileId) -> Result<Vec<u8>, CvsError>;

    fn is_executable(&self, _file: FileId) -> bool {
        false
    }

    /// Unmanaged folder matched by an ignore rule of its parent
    fn is_folder_ignored(&self, _folder: FolderId) -> bool {
        false
    }

    fn is_cvs_folder(&self, folder: FolderId) -> bool {
        self.folder_sync(folder).is_some()
    }

    fn is_managed(&self, file: FileId) -> bool {
        self.entry(file).is_some()
    }

    /// Tracking line announced in an `Entry` request
    fn server_entry_line(&self, file: FileId) -> Option<String> {
        self.entry(file)
            .map(|entry| entry.to_server_line(self.is_modified(file)))
    }

    fn keyword_mode(&self, file: FileId) -> Option<KSubstMode> {
        self.entry(file).and_then(|entry| entry.keyword_mode.clone())
    }

    fn permissions(&self, file: FileId) -> &'static str {
        if self.is_executable(file) {
            DEFAULT_EXECUTABLE_PERMISSIONS
        } else {
            DEFAULT_PERMISSIONS
        }
    }

    /// `/`-separated path of `folder` below `root`; empty for the root itself
    fn relative_path(&self, folder: FolderId, root: FolderId) -> String {
        let mut names = Vec::new();
        let mut current = Some(folder);
        while let Some(folder) = current {
            if folder == root {
                break;
            }
            names.push(self.folder_name(folder));
            current = self.folder_parent(folder);
        }
        names.reverse();
        names.join("/")
    }

    /// Repository path of `folder`.
    ///
    /// Folders without sync info inherit their parent's location plus their
    /// own name. The search stops at `root`: an unmanaged root means the
    /// location is unknown.
    fn remote_location(&self, folder: FolderId, root: FolderId) -> Option<String> {
        if let Some(info) = self.folder_sync(folder) {
            return Some(info.remote_location());
        }
        if folder == root {
            return None;
        }
        let parent = self.folder_parent(folder)?;
        let parent_location = self.remote_location(parent, root)?;
        Some(format!("{}/{}", parent_location, self.folder_name(folder)))
    }

    /// Direct child of `folder` called `name`
    fn child(&self, folder: FolderId, name: &str) -> Option<Resource> {
        if let Some(file) = self
            .files(folder)
            .into_iter()
            .find(|&file| self.file_name(file) == name)
        {
            return Some(Resource::File(file));
        }
        self.folders(folder)
            .into_iter()
            .find(|&child| self.folder_name(child) == name)
            .map(Resource::Folder)
    }

    /// Resolve a `/`-separated path below `root`; `.` and `` name the root
    fn resolve(&self, root: FolderId, path: &str) -> Option<Resource> {
        let mut current = Resource::Folder(root);
        for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            let folder = current.as_folder()?;
            current = self.child(folder, segment)?;
        }
        Some(current)
    }
}
