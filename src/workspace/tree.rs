//! WorkingCopy - in-memory resource model

use super::{EntryLine, ResourceModel};
use crate::types::{CvsError, FileId, FolderId, FolderSyncInfo};
use camino::Utf8PathBuf;
use std::fs;

#[derive(Debug, Clone)]
enum Contents {
    Memory(Vec<u8>),
    Disk(Utf8PathBuf),
}

#[derive(Debug, Clone)]
struct FolderNode {
    name: String,
    parent: Option<FolderId>,
    exists: bool,
    ignored: bool,
    sync: Option<FolderSyncInfo>,
    files: Vec<FileId>,
    folders: Vec<FolderId>,
}

#[derive(Debug, Clone)]
struct FileNode {
    name: String,
    parent: FolderId,
    exists: bool,
    entry: Option<EntryLine>,
    modified: bool,
    ignored: bool,
    executable: bool,
    contents: Contents,
}

/// Arena of folders and files
///
/// Handles stay valid after deletion; a deleted folder simply stops existing
/// and disappears from its parent's children.
#[derive(Debug, Clone)]
pub struct WorkingCopy {
    folders: Vec<FolderNode>,
    files: Vec<FileNode>,
    root: FolderId,
}

impl WorkingCopy {
    /// Create a working copy holding a single, existing root folder
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = FolderNode {
            name: root_name.into(),
            parent: None,
            exists: true,
            ignored: false,
            sync: None,
            files: Vec::new(),
            folders: Vec::new(),
        };
        Self {
            folders: vec![root],
            files: Vec::new(),
            root: FolderId::new(0),
        }
    }

    pub fn root(&self) -> FolderId {
        self.root
    }

    /// Add an existing, unmanaged folder below `parent`
    pub fn add_folder(&mut self, parent: FolderId, name: impl Into<String>) -> FolderId {
        let id = FolderId::new(self.folders.len());
        self.folders.push(FolderNode {
            name: name.into(),
            parent: Some(parent),
            exists: true,
            ignored: false,
            sync: None,
            files: Vec::new(),
            folders: Vec::new(),
        });
        let mut siblings = std::mem::take(&mut self.folders[parent.index()].folders);
        siblings.push(id);
        siblings.sort_by(|a, b| self.folders[a.index()].name.cmp(&self.folders[b.index()].name));
        self.folders[parent.index()].folders = siblings;
        id
    }

    /// Add a folder below `parent` that is checked out from `repository`,
    /// inheriting the CVSROOT of the nearest managed ancestor
    pub fn add_managed_folder(
        &mut self,
        parent: FolderId,
        name: impl Into<String>,
        repository: impl Into<String>,
    ) -> FolderId {
        let root = self.inherited_root(parent);
        let id = self.add_folder(parent, name);
        self.folders[id.index()].sync = Some(FolderSyncInfo::new(root, repository));
        id
    }

    /// Add an existing, untracked file with in-memory contents
    pub fn add_file(
        &mut self,
        parent: FolderId,
        name: impl Into<String>,
        contents: impl Into<Vec<u8>>,
    ) -> FileId {
        self.push_file(parent, name.into(), Contents::Memory(contents.into()))
    }

    /// Add an existing, untracked file whose contents are read from disk
    pub fn add_disk_file(
        &mut self,
        parent: FolderId,
        name: impl Into<String>,
        path: Utf8PathBuf,
    ) -> FileId {
        self.push_file(parent, name.into(), Contents::Disk(path))
    }

    /// Add a clean file the server tracks at `entry`
    pub fn add_tracked_file(
        &mut self,
        parent: FolderId,
        entry: EntryLine,
        contents: impl Into<Vec<u8>>,
    ) -> FileId {
        let id = self.add_file(parent, entry.name.clone(), contents);
        let node = &mut self.files[id.index()];
        node.modified = entry.is_added();
        node.entry = Some(entry);
        id
    }

    pub fn set_sync(&mut self, folder: FolderId, info: FolderSyncInfo) {
        self.folders[folder.index()].sync = Some(info);
    }

    pub fn set_folder_exists(&mut self, folder: FolderId, exists: bool) {
        self.folders[folder.index()].exists = exists;
    }

    pub fn set_folder_ignored(&mut self, folder: FolderId, ignored: bool) {
        self.folders[folder.index()].ignored = ignored;
    }

    pub fn set_entry(&mut self, file: FileId, entry: Option<EntryLine>) {
        self.files[file.index()].entry = entry;
    }

    pub fn set_modified(&mut self, file: FileId, modified: bool) {
        self.files[file.index()].modified = modified;
    }

    pub fn set_exists(&mut self, file: FileId, exists: bool) {
        self.files[file.index()].exists = exists;
    }

    pub fn set_ignored(&mut self, file: FileId, ignored: bool) {
        self.files[file.index()].ignored = ignored;
    }

    pub fn set_executable(&mut self, file: FileId, executable: bool) {
        self.files[file.index()].executable = executable;
    }

    /// Number of live folders, root included
    pub fn folder_count(&self) -> usize {
        self.folders.iter().filter(|node| node.exists).count()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    fn push_file(&mut self, parent: FolderId, name: String, contents: Contents) -> FileId {
        let id = FileId::new(self.files.len());
        self.files.push(FileNode {
            name,
            parent,
            exists: true,
            entry: None,
            modified: true,
            ignored: false,
            executable: false,
            contents,
        });
        let siblings = &mut self.folders[parent.index()].files;
        siblings.push(id);
        let files = &self.files;
        siblings.sort_by(|a, b| files[a.index()].name.cmp(&files[b.index()].name));
        id
    }

    fn inherited_root(&self, folder: FolderId) -> String {
        let mut current = Some(folder);
        while let Some(folder) = current {
            if let Some(info) = &self.folders[folder.index()].sync {
                return info.root.clone();
            }
            current = self.folders[folder.index()].parent;
        }
        String::new()
    }

    fn mark_deleted(&mut self, folder: FolderId) {
        let node = &mut self.folders[folder.index()];
        node.exists = false;
        let files = std::mem::take(&mut node.files);
        let children = std::mem::take(&mut node.folders);
        for file in files {
            self.files[file.index()].exists = false;
        }
        for child in children {
            self.mark_deleted(child);
        }
    }
}

impl ResourceModel for WorkingCopy {
    fn folder_name(&self, folder: FolderId) -> &str {
        &self.folders[folder.index()].name
    }

    fn folder_exists(&self, folder: FolderId) -> bool {
        self.folders[folder.index()].exists
    }

    fn is_folder_ignored(&self, folder: FolderId) -> bool {
        let node = &self.folders[folder.index()];
        node.sync.is_none() && node.ignored
    }

    fn folder_parent(&self, folder: FolderId) -> Option<FolderId> {
        self.folders[folder.index()].parent
    }

    fn files(&self, folder: FolderId) -> Vec<FileId> {
        self.folders[folder.index()].files.clone()
    }

    fn folders(&self, folder: FolderId) -> Vec<FolderId> {
        self.folders[folder.index()].folders.clone()
    }

    fn folder_sync(&self, folder: FolderId) -> Option<&FolderSyncInfo> {
        self.folders[folder.index()].sync.as_ref()
    }

    fn set_folder_sync(&mut self, folder: FolderId, info: FolderSyncInfo) -> Result<(), CvsError> {
        self.set_sync(folder, info);
        Ok(())
    }

    fn delete_folder(&mut self, folder: FolderId) -> Result<(), CvsError> {
        if folder == self.root {
            return Err(CvsError::Precondition(
                "the working copy root cannot be deleted".to_string(),
            ));
        }
        if let Some(parent) = self.folders[folder.index()].parent {
            self.folders[parent.index()]
                .folders
                .retain(|&child| child != folder);
        }
        self.mark_deleted(folder);
        Ok(())
    }

    fn file_name(&self, file: FileId) -> &str {
        &self.files[file.index()].name
    }

    fn file_parent(&self, file: FileId) -> FolderId {
        self.files[file.index()].parent
    }

    fn file_exists(&self, file: FileId) -> bool {
        self.files[file.index()].exists
    }

    fn entry(&self, file: FileId) -> Option<&EntryLine> {
        self.files[file.index()].entry.as_ref()
    }

    fn is_modified(&self, file: FileId) -> bool {
        let node = &self.files[file.index()];
        node.entry.is_none() || node.modified
    }

    fn is_ignored(&self, file: FileId) -> bool {
        let node = &self.files[file.index()];
        node.entry.is_none() && node.ignored
    }

    fn contents(&self, file: FileId) -> Result<Vec<u8>, CvsError> {
        match &self.files[file.index()].contents {
            Contents::Memory(bytes) => Ok(bytes.clone()),
            Contents::Disk(path) => {
                fs::read(path).map_err(|e| CvsError::resource(path.as_std_path(), e))
            }
        }
    }

    fn is_executable(&self, file: FileId) -> bool {
        self.files[file.index()].executable
    }
}
