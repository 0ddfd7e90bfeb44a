//! Structure visitors: turn a walk over the working copy into requests
//!
//! [`StructureSender`] holds the two primitives every traversal shares,
//! announcing a folder and describing a file, together with the "last folder
//! sent" cursor that keeps a folder from being announced twice in a row.
//! The traversal policies build on it:
//!
//! * [`FileStructureVisitor`] - top-down walk for commit, update, status, ...
//! * [`AddStructureVisitor`] - ancestor-first announcements for new paths
//! * [`ImportStructureVisitor`] - synthetic folders, ignore and wrapper rules
//!
//! A sender is created for one traversal and dropped with it.

mod add;
mod file_structure;
mod import;

pub use add::AddStructureVisitor;
pub use file_structure::FileStructureVisitor;
pub use import::ImportStructureVisitor;

use crate::session::Session;
use crate::types::{CvsError, FileId, FolderId, KSubstMode, Resource};
use crate::workspace::ResourceModel;

/// Walk policy over files and folders.
///
/// `visit` dispatches each resource; `walk_children` descends into a folder,
/// files first and then sub-folders, both in name order.
pub trait ResourceVisitor {
    fn visit_file(&mut self, file: FileId) -> Result<(), CvsError>;
    fn visit_folder(&mut self, folder: FolderId) -> Result<(), CvsError>;

    /// Model the visitor walks
    fn model(&self) -> &dyn ResourceModel;

    fn visit(&mut self, resources: &[Resource]) -> Result<(), CvsError> {
        for &resource in resources {
            match resource {
                Resource::File(file) => self.visit_file(file)?,
                Resource::Folder(folder) => self.visit_folder(folder)?,
            }
        }
        Ok(())
    }

    fn walk_children(&mut self, folder: FolderId) -> Result<(), CvsError> {
        for file in self.model().files(folder) {
            self.visit_file(file)?;
        }
        for child in self.model().folders(folder) {
            self.visit_folder(child)?;
        }
        Ok(())
    }
}

/// Shared folder and file primitives with the dedup cursor
pub struct StructureSender<'a, 'w> {
    session: &'a mut Session<'w>,
    model: &'a dyn ResourceModel,
    root: FolderId,
    last_folder_sent: Option<FolderId>,
}

impl<'a, 'w> StructureSender<'a, 'w> {
    /// Sender for a traversal below `root`; no folder has been sent yet
    pub fn new(session: &'a mut Session<'w>, model: &'a dyn ResourceModel, root: FolderId) -> Self {
        Self {
            session,
            model,
            root,
            last_folder_sent: None,
        }
    }

    pub fn session(&mut self) -> &mut Session<'w> {
        self.session
    }

    pub fn model(&self) -> &'a dyn ResourceModel {
        self.model
    }

    pub fn root(&self) -> FolderId {
        self.root
    }

    pub fn last_folder_sent(&self) -> Option<FolderId> {
        self.last_folder_sent
    }

    /// Announce `folder` unless it is the folder announced last.
    ///
    /// With `construct` set, an existing folder is announced under a remote
    /// path guessed from its local path. Otherwise its remote location is
    /// used, followed by its static and sticky properties. A folder whose
    /// location is unknown sends nothing but still becomes the current one.
    pub fn send_folder(&mut self, folder: FolderId, construct: bool) -> Result<(), CvsError> {
        if self.last_folder_sent == Some(folder) {
            return Ok(());
        }

        let model = self.model;
        let local = model.relative_path(folder, self.root);
        if construct && model.folder_exists(folder) {
            self.session.send_constructed_directory(&local)?;
            self.last_folder_sent = Some(folder);
            return Ok(());
        }

        if let Some(remote) = model.remote_location(folder, self.root) {
            self.session.send_directory(&local, &remote)?;
            if let Some(info) = model.folder_sync(folder) {
                if info.is_static {
                    self.session.send_static_directory()?;
                }
                if let Some(tag) = &info.tag {
                    self.session.send_sticky(tag)?;
                }
            }
        }
        self.last_folder_sent = Some(folder);
        Ok(())
    }

    /// Describe `file` after announcing its folder.
    ///
    /// Tracked files send their entry line. Untracked ones are reported as
    /// questionable when asked to, and nothing more is said about them.
    /// Contents go out only for files that exist and are modified.
    pub fn send_file(
        &mut self,
        file: FileId,
        send_questionable: bool,
        mode: Option<&KSubstMode>,
    ) -> Result<(), CvsError> {
        let model = self.model;
        self.send_folder(model.file_parent(file), false)?;

        let name = model.file_name(file);
        let binary = mode.is_some_and(KSubstMode::is_binary);

        if let Some(entry_line) = model.server_entry_line(file) {
            self.session.send_entry(&entry_line)?;
        } else if send_questionable {
            // No keyword mode is announced ahead of a questionable file.
            return self.session.send_questionable(name);
        }

        if !model.file_exists(file) {
            return Ok(());
        }

        if model.is_modified(file) {
            let contents = model.contents(file)?;
            self.session
                .send_modified(name, model.permissions(file), &contents, binary)
        } else {
            self.session.send_unchanged(name)
        }
    }
}
