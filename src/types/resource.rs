//! Resource handles and folder sync metadata

use serde::{Deserialize, Serialize};

/// Handle to a folder inside a resource model.
///
/// Two handles are the same folder iff they compare equal; traversals rely on
/// this for their "last folder sent" bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId(usize);

impl FolderId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to a file inside a resource model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(usize);

impl FileId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the working copy: either a file or a folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    File(FileId),
    Folder(FolderId),
}

impl Resource {
    pub fn as_folder(self) -> Option<FolderId> {
        match self {
            Resource::Folder(folder) => Some(folder),
            Resource::File(_) => None,
        }
    }

    pub fn as_file(self) -> Option<FileId> {
        match self {
            Resource::File(file) => Some(file),
            Resource::Folder(_) => None,
        }
    }
}

/// What a `CVS/` metadata directory records about its folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSyncInfo {
    /// CVSROOT the folder was checked out from (`:pserver:anon@host:/cvs`)
    pub root: String,

    /// Repository path relative to the root directory (`project/src`)
    pub repository: String,

    /// Sticky tag in entry form (`Tbranch`, `Nrelease`, `D2002.05.25...`)
    pub tag: Option<String>,

    /// `CVS/Entries.Static` present
    pub is_static: bool,
}

impl FolderSyncInfo {
    pub fn new(root: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            repository: repository.into(),
            tag: None,
            is_static: false,
        }
    }

    /// Absolute repository path of the folder on the server
    pub fn remote_location(&self) -> String {
        format!("{}/{}", root_directory(&self.root), self.repository)
    }

    /// Sync info for a new child folder, inheriting root and sticky tag
    pub fn child(&self, name: &str) -> Self {
        Self {
            root: self.root.clone(),
            repository: format!("{}/{}", self.repository, name),
            tag: self.tag.clone(),
            is_static: false,
        }
    }
}

/// Directory part of a CVSROOT string.
///
/// `:pserver:anon@host:/cvs` and `:pserver:anon@host:2401/cvs` both yield
/// `/cvs`; a plain local root is returned unchanged.
pub fn root_directory(root: &str) -> &str {
    let tail = root.rsplit(':').next().unwrap_or(root);
    match tail.find('/') {
        Some(index) => &tail[index..],
        None => tail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_directory_forms() {
        assert_eq!(root_directory(":pserver:anon@cvs.example.org:/cvsroot"), "/cvsroot");
        assert_eq!(root_directory(":pserver:anon@cvs.example.org:2401/cvsroot"), "/cvsroot");
        assert_eq!(root_directory("/var/lib/cvs"), "/var/lib/cvs");
    }

    #[test]
    fn test_remote_location() {
        let info = FolderSyncInfo::new(":ext:dev@host:/cvs", "project/src");
        assert_eq!(info.remote_location(), "/cvs/project/src");
    }

    #[test]
    fn test_child_inherits_tag_but_not_static() {
        let mut parent = FolderSyncInfo::new("/cvs", "project");
        parent.tag = Some("Tbranch_1".to_string());
        parent.is_static = true;

        let child = parent.child("docs");
        assert_eq!(child.repository, "project/docs");
        assert_eq!(child.tag.as_deref(), Some("Tbranch_1"));
        assert!(!child.is_static);
    }

    #[test]
    fn test_resource_projections() {
        let folder = Resource::Folder(FolderId::new(3));
        assert_eq!(folder.as_folder(), Some(FolderId::new(3)));
        assert_eq!(folder.as_file(), None);
    }
}
