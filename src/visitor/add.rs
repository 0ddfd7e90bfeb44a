//! Ancestor-first traversal for paths being added

use super::{ResourceVisitor, StructureSender};
use crate::session::Session;
use crate::types::{CvsError, FileId, FolderId};
use crate::workspace::ResourceModel;
use std::collections::HashSet;

const IS_MODIFIED: &str = "Is-modified";

/// Announces the not yet announced ancestors of every added path, root
/// first, before the path itself.
///
/// Files are reported with `Is-modified`; contents only go out when the
/// server does not understand that request.
pub struct AddStructureVisitor<'a, 'w> {
    sender: StructureSender<'a, 'w>,
    visited: HashSet<FolderId>,
    last_folder: Option<FolderId>,
    force_send: bool,
}

impl<'a, 'w> AddStructureVisitor<'a, 'w> {
    pub fn new(session: &'a mut Session<'w>, model: &'a dyn ResourceModel, root: FolderId) -> Self {
        Self {
            sender: StructureSender::new(session, model, root),
            visited: HashSet::new(),
            last_folder: None,
            force_send: false,
        }
    }
}

impl ResourceVisitor for AddStructureVisitor<'_, '_> {
    fn model(&self) -> &dyn ResourceModel {
        self.sender.model()
    }

    fn visit_file(&mut self, file: FileId) -> Result<(), CvsError> {
        let model = self.sender.model();
        let parent = model.file_parent(file);
        if self.last_folder != Some(parent) {
            self.force_send = true;
            self.visit_folder(parent)?;
        }

        // Unlike the shared send_file, tracked and clean files get no
        // Entry/Unchanged pair here: an added path is always Is-modified.
        let name = model.file_name(file);
        if self.sender.session().is_valid_request(IS_MODIFIED) {
            self.sender.session().send_is_modified(name)
        } else {
            let contents = model.contents(file)?;
            let binary = model.keyword_mode(file).is_some_and(|mode| mode.is_binary());
            self.sender
                .session()
                .send_modified(name, model.permissions(file), &contents, binary)
        }
    }

    fn visit_folder(&mut self, folder: FolderId) -> Result<(), CvsError> {
        // The flag covers exactly one send decision: this one.
        let force_send = std::mem::take(&mut self.force_send);
        let first_visit = !self.visited.contains(&folder);

        if folder != self.sender.root() && first_visit {
            if let Some(parent) = self.sender.model().folder_parent(folder) {
                self.visit_folder(parent)?;
            }
        }

        if force_send || first_visit {
            self.visited.insert(folder);
            self.last_folder = Some(folder);
            self.sender.send_folder(folder, false)?;
        }
        Ok(())
    }
}
