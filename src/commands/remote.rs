//! Commands that work on repository modules only

use super::{require_arguments, Command, Invocation, RequestContext};
use crate::types::{CvsError, Resource};
use crate::workspace::ResourceModel;

/// A command whose arguments name repository modules, so no local state is
/// described. Like `checkout`, it runs in the constructed root directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteCommand {
    name: &'static str,
    min_arguments: usize,
}

impl RemoteCommand {
    /// `rdiff <module...>`
    pub const RDIFF: RemoteCommand = RemoteCommand::new("rdiff", 1);
    /// `rtag <tag> <module...>`
    pub const RTAG: RemoteCommand = RemoteCommand::new("rtag", 2);

    pub const fn new(name: &'static str, min_arguments: usize) -> Self {
        Self {
            name,
            min_arguments,
        }
    }
}

impl Command for RemoteCommand {
    fn name(&self) -> &'static str {
        self.name
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
        require_arguments(self.name, &invocation.arguments, self.min_arguments, None)
    }

    fn build_request(&self, _ctx: &mut RequestContext<'_, '_>) -> Result<(), CvsError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::run_command;
    use crate::response::{CannedResponses, CollectingListener};
    use crate::session::Session;
    use crate::types::{FolderSyncInfo, LocalOption};
    use crate::workspace::{EntryLine, WorkingCopy};

    fn run(command: &RemoteCommand, wc: &mut WorkingCopy, invocation: &Invocation) -> Result<String, CvsError> {
        let mut wire = Vec::new();
        {
            let mut session = Session::new(&mut wire, ":pserver:anon@host:/cvs");
            run_command(
                command,
                &mut session,
                wc,
                &mut CannedResponses::ok(),
                &mut CollectingListener::default(),
                invocation,
            )?;
        }
        Ok(String::from_utf8(wire).expect("wire is utf-8"))
    }

    #[test]
    fn test_rtag_sends_no_local_state() {
        let mut wc = WorkingCopy::new("workspace");
        let root = wc.root();
        wc.add_file(root, "notes.txt", "local");
        let invocation = Invocation::new(root).arguments(["REL_1", "proj"]);

        let text = run(&RemoteCommand::RTAG, &mut wc, &invocation).expect("rtag should succeed");
        assert_eq!(
            text,
            "Directory .\n/cvs/\nArgument REL_1\nArgument proj\nrtag\n"
        );
    }

    #[test]
    fn test_rdiff_ignores_checked_out_files() {
        let mut wc = WorkingCopy::new("proj");
        let root = wc.root();
        wc.set_sync(root, FolderSyncInfo::new("/cvs", "proj"));
        let file = wc.add_tracked_file(root, EntryLine::new("a.c", "1.1"), "changed");
        wc.set_modified(file, true);
        let invocation = Invocation::new(root)
            .local_option(LocalOption::with_argument("-r", "REL_1"))
            .argument("proj");

        let text = run(&RemoteCommand::RDIFF, &mut wc, &invocation).expect("rdiff should succeed");
        assert!(!text.contains("a.c"), "local files described: {text}");
        assert!(text.starts_with("Argument -r\nArgument REL_1\n"));
        assert!(text.ends_with("Argument proj\nrdiff\n"));
    }

    #[test]
    fn test_argument_counts() {
        let mut wc = WorkingCopy::new("workspace");
        let root = wc.root();

        let err = run(&RemoteCommand::RTAG, &mut wc, &Invocation::new(root).argument("REL_1"))
            .expect_err("rtag needs a module");
        assert!(err.is_precondition());
        let err = run(&RemoteCommand::RDIFF, &mut wc, &Invocation::new(root))
            .expect_err("rdiff needs a module");
        assert!(err.is_precondition());
    }
}
