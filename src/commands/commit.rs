use super::{check_resources_managed, send_file_structure, Command, Invocation, RequestContext};
use crate::types::{CvsError, Resource};
use crate::workspace::ResourceModel;

/// `commit`: only modified files are described; the server knows the rest.
#[derive(Debug, Default, Clone, Copy)]
pub struct Commit;

impl Command for Commit {
    fn name(&self) -> &'static str {
        "commit"
    }

    fn request_id(&self) -> &'static str {
        "ci"
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
        send_file_structure(ctx, true, false)
    }
}
