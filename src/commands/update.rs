use super::{
    check_resources_managed, prune_empty_folders, send_file_structure, Command, Invocation,
    RequestContext,
};
use crate::types::{CvsError, LocalOption, Resource};
use crate::workspace::ResourceModel;

/// `update`: brings the working copy up to date.
///
/// Every folder is announced, empty or not, so the server can create
/// sub-folders it knows about. With `-P` the folders left empty afterwards
/// are pruned.
#[derive(Debug, Default, Clone, Copy)]
pub struct Update;

impl Command for Update {
    fn name(&self) -> &'static str {
        "update"
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
        send_file_structure(ctx, false, true)
    }

    fn on_finished(
        &self,
        model: &mut dyn ResourceModel,
        invocation: &Invocation,
        resources: &[Resource],
        success: bool,
    ) -> Result<(), CvsError> {
        if success && invocation.has_local_option(&LocalOption::PRUNE_EMPTY_DIRECTORIES) {
            prune_empty_folders(model, invocation.root, resources)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::run_command;
    use crate::response::{CannedResponses, CollectingListener};
    use crate::session::Session;
    use crate::types::FolderSyncInfo;
    use crate::workspace::{EntryLine, WorkingCopy};

    fn run(wc: &mut WorkingCopy, responses: &mut CannedResponses, invocation: &Invocation) -> String {
        let mut wire = Vec::new();
        {
            let mut session = Session::new(&mut wire, "/cvs");
            let _ = run_command(
                &Update,
                &mut session,
                wc,
                responses,
                &mut CollectingListener::default(),
                invocation,
            );
        }
        String::from_utf8(wire).expect("wire is utf-8")
    }

    #[test]
    fn test_update_prunes_only_on_success() {
        let mut wc = WorkingCopy::new("p");
        let root = wc.root();
        wc.set_sync(root, FolderSyncInfo::new("/cvs", "p"));
        let a = wc.add_managed_folder(root, "a", "p/a");
        let b = wc.add_managed_folder(root, "b", "p/b");
        wc.add_tracked_file(b, EntryLine::new("f", "1.1"), "x");
        let invocation = Invocation::new(root).local_option(LocalOption::PRUNE_EMPTY_DIRECTORIES);

        let mut failed = wc.clone();
        run(&mut failed, &mut CannedResponses::error("conflict"), &invocation);
        assert!(failed.folder_exists(a));

        let text = run(&mut wc, &mut CannedResponses::ok(), &invocation);
        assert!(text.contains("Directory a\n/cvs/p/a\n"));
        assert!(text.contains("Directory b\n/cvs/p/b\nEntry /f/1.1///\nUnchanged f\n"));
        assert!(!wc.folder_exists(a));
        assert!(wc.folder_exists(b));
    }

    #[test]
    fn test_no_prune_without_option() {
        let mut wc = WorkingCopy::new("p");
        let root = wc.root();
        wc.set_sync(root, FolderSyncInfo::new("/cvs", "p"));
        let a = wc.add_managed_folder(root, "a", "p/a");

        run(&mut wc, &mut CannedResponses::ok(), &Invocation::new(root));
        assert!(wc.folder_exists(a));
    }
}
