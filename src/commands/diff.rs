use super::{
    check_resources_managed, send_file_structure, Command, CommandOutcome, Invocation,
    RequestContext,
};
use crate::types::{CvsError, Resource};
use crate::workspace::ResourceModel;

/// `diff`: the server answers a non-empty diff with an error status, so a
/// server failure is reported as [`CommandOutcome::DifferencesFound`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Diff;

impl Command for Diff {
    fn name(&self) -> &'static str {
        "diff"
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

    fn classify_failure(&self, error: CvsError) -> Result<CommandOutcome, CvsError> {
        match error {
            CvsError::Server { .. } => Ok(CommandOutcome::DifferencesFound),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_failure_means_differences() {
        let outcome = Diff.classify_failure(CvsError::Server {
            command: "diff".to_string(),
            message: "".to_string(),
        });
        assert_eq!(outcome.expect("remapped"), CommandOutcome::DifferencesFound);

        let err = Diff
            .classify_failure(CvsError::Canceled)
            .expect_err("only server failures are remapped");
        assert!(err.is_cancellation());
    }
}
