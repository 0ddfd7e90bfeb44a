//! Traversal that seeds a new module from an unversioned tree

use super::{ResourceVisitor, StructureSender};
use crate::matcher::PatternMatcher;
use crate::session::Session;
use crate::types::{CvsError, FileId, FolderId, KSubstMode};
use crate::workspace::ResourceModel;

/// Sends every non-ignored file with its contents, announcing folders under
/// remote paths built from their local paths.
pub struct ImportStructureVisitor<'a, 'w> {
    sender: StructureSender<'a, 'w>,
    mode: Option<KSubstMode>,
    ignore: PatternMatcher<bool>,
    wrappers: PatternMatcher<KSubstMode>,
}

impl<'a, 'w> ImportStructureVisitor<'a, 'w> {
    pub fn new(
        session: &'a mut Session<'w>,
        model: &'a dyn ResourceModel,
        root: FolderId,
        ignore: PatternMatcher<bool>,
        wrappers: PatternMatcher<KSubstMode>,
    ) -> Self {
        Self {
            sender: StructureSender::new(session, model, root),
            mode: None,
            ignore,
            wrappers,
        }
    }

    /// Mode applied to every file regardless of wrapper rules
    pub fn keyword_mode(mut self, mode: Option<KSubstMode>) -> Self {
        self.mode = mode;
        self
    }

    /// Mode a file named `name` is imported with
    pub fn resolve_mode(&self, name: &str) -> Option<KSubstMode> {
        self.mode
            .clone()
            .or_else(|| self.wrappers.find(name).cloned())
    }
}

impl ResourceVisitor for ImportStructureVisitor<'_, '_> {
    fn model(&self) -> &dyn ResourceModel {
        self.sender.model()
    }

    fn visit_file(&mut self, file: FileId) -> Result<(), CvsError> {
        let name = self.sender.model().file_name(file);
        if self.ignore.matches(name) {
            return Ok(());
        }
        let mode = self.resolve_mode(name);
        self.sender.send_file(file, false, mode.as_ref())
    }

    fn visit_folder(&mut self, folder: FolderId) -> Result<(), CvsError> {
        // The import root itself is never subject to ignore rules.
        let name = self.sender.model().folder_name(folder);
        if folder != self.sender.root() && self.ignore.matches(name) {
            return Ok(());
        }
        self.sender.send_folder(folder, true)?;
        self.walk_children(folder)
    }
}
