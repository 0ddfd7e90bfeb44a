//! Commands that need nothing beyond the shared building blocks

use super::{
    check_resources_managed, require_arguments, send_file_structure, Command, Invocation,
    RequestContext,
};
use crate::session::Session;
use crate::types::{CvsError, FolderId, Resource};
use crate::workspace::ResourceModel;

/// A command that describes its arguments with the generic traversal and
/// has no bookkeeping to do afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStructureCommand {
    name: &'static str,
}

impl FileStructureCommand {
    pub const ADMIN: FileStructureCommand = FileStructureCommand::new("admin");
    pub const ANNOTATE: FileStructureCommand = FileStructureCommand::new("annotate");
    pub const EDITORS: FileStructureCommand = FileStructureCommand::new("editors");
    pub const LOG: FileStructureCommand = FileStructureCommand::new("log");
    pub const REMOVE: FileStructureCommand = FileStructureCommand::new("remove");
    pub const STATUS: FileStructureCommand = FileStructureCommand::new("status");

    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Command for FileStructureCommand {
    fn name(&self) -> &'static str {
        self.name
    }

    fn check_preconditions(
        &self,
        model: &dyn ResourceModel,
        _invocation: &Invocation,
        resources: &[Resource],
    ) -> Result<(), CvsError> {
        check_resources_managed(model, resources)
    }

    fn build_request(&self, ctx: &mut RequestContext<'_, '_>) -> Result<(), CvsError> {
        send_file_structure(ctx, false, false)
    }
}

/// `version`: asks for the server version; no local state at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct Version;

impl Command for Version {
    fn name(&self) -> &'static str {
        "version"
    }

    fn work_resources(&self, _model: &dyn ResourceModel, _invocation: &Invocation) -> Vec<Resource> {
        Vec::new()
    }

    fn check_preconditions(
        &self,
        _model: &dyn ResourceModel,
        invocation: &Invocation,
        _resources: &[Resource],
    ) -> Result<(), CvsError> {
        require_arguments(self.name(), &invocation.arguments, 0, Some(0))
    }

    fn build_request(&self, _ctx: &mut RequestContext<'_, '_>) -> Result<(), CvsError> {
        Ok(())
    }

    fn send_working_directory(
        &self,
        _session: &mut Session<'_>,
        _model: &dyn ResourceModel,
        _root: FolderId,
    ) -> Result<(), CvsError> {
        Ok(())
    }
}
