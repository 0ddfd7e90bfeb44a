use super::{
    check_resources_managed, require_arguments, resolve_arguments, send_file_structure, Command,
    Invocation, RequestContext,
};
use crate::types::{CvsError, Resource};
use crate::workspace::ResourceModel;

/// `tag <name> [paths...]`: the first argument is the tag, the rest name
/// the resources to tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct Tag;

impl Command for Tag {
    fn name(&self) -> &'static str {
        "tag"
    }

    fn work_resources(&self, model: &dyn ResourceModel, invocation: &Invocation) -> Vec<Resource> {
        let paths = invocation.arguments.get(1..).unwrap_or_default();
        resolve_arguments(model, invocation.root, paths)
    }

    fn check_preconditions(
        &self,
        model: &dyn ResourceModel,
        invocation: &Invocation,
        resources: &[Resource],
    ) -> Result<(), CvsError> {
        require_arguments(self.name(), &invocation.arguments, 1, None)?;
        check_resources_managed(model, resources)
    }

    fn build_request(&self, ctx: &mut RequestContext<'_, '_>) -> Result<(), CvsError> {
        send_file_structure(ctx, false, false)
    }
}
