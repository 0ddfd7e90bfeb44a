use super::{
    prune_empty_folders, require_arguments, resolve_arguments, Command, Invocation,
    RequestContext,
};
use crate::types::{CvsError, LocalOption, Resource};
use crate::workspace::ResourceModel;

/// `checkout <module...>`: the arguments are repository modules, so no local
/// state is described.
///
/// With `-P` the folders the modules were checked out into are pruned once
/// the server is done; `-d <dir>` names that folder explicitly.
#[derive(Debug, Default, Clone, Copy)]
pub struct Checkout;

impl Checkout {
    fn checkout_folders(&self, model: &dyn ResourceModel, invocation: &Invocation) -> Vec<Resource> {
        let targets = match LocalOption::find(&invocation.local_options, "-d")
            .and_then(LocalOption::argument)
        {
            Some(target) => vec![target.to_string()],
            None => invocation.arguments.clone(),
        };
        resolve_arguments(model, invocation.root, &targets)
            .into_iter()
            .filter(|resource| resource.as_folder().is_some())
            .collect()
    }
}

impl Command for Checkout {
    fn name(&self) -> &'static str {
        "checkout"
    }

    fn request_id(&self) -> &'static str {
        "co"
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
        require_arguments(self.name(), &invocation.arguments, 1, None)
    }

    fn build_request(&self, _ctx: &mut RequestContext<'_, '_>) -> Result<(), CvsError> {
        Ok(())
    }

    fn on_finished(
        &self,
        model: &mut dyn ResourceModel,
        invocation: &Invocation,
        _resources: &[Resource],
        success: bool,
    ) -> Result<(), CvsError> {
        if success && invocation.has_local_option(&LocalOption::PRUNE_EMPTY_DIRECTORIES) {
            let folders = self.checkout_folders(&*model, invocation);
            prune_empty_folders(model, invocation.root, &folders)?;
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
    use crate::workspace::WorkingCopy;

    fn checkout(wc: &mut WorkingCopy, invocation: &Invocation) -> Result<String, CvsError> {
        let mut wire = Vec::new();
        {
            let mut session = Session::new(&mut wire, ":pserver:anon@host:/cvs");
            run_command(
                &Checkout,
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
    fn test_checkout_sends_no_local_state() {
        let mut wc = WorkingCopy::new("workspace");
        let root = wc.root();
        wc.add_file(root, "notes.txt", "local");
        let invocation = Invocation::new(root)
            .local_option(LocalOption::PRUNE_EMPTY_DIRECTORIES)
            .argument("proj");

        let text = checkout(&mut wc, &invocation).expect("checkout should succeed");
        assert_eq!(
            text,
            "Argument -P\nDirectory .\n/cvs/\nArgument proj\nco\n"
        );
    }

    #[test]
    fn test_checkout_prunes_target_folder() {
        let mut wc = WorkingCopy::new("workspace");
        let root = wc.root();
        let target = wc.add_folder(root, "mine");
        wc.set_sync(target, FolderSyncInfo::new("/cvs", "proj"));
        wc.add_file(target, "README", "");
        let empty = wc.add_managed_folder(target, "empty", "proj/empty");
        let invocation = Invocation::new(root)
            .local_option(LocalOption::PRUNE_EMPTY_DIRECTORIES)
            .local_option(LocalOption::with_argument("-d", "mine"))
            .argument("proj");

        checkout(&mut wc, &invocation).expect("checkout should succeed");
        assert!(!wc.folder_exists(empty));
        assert!(wc.folder_exists(target));
    }

    #[test]
    fn test_checkout_needs_a_module() {
        let mut wc = WorkingCopy::new("workspace");
        let invocation = Invocation::new(wc.root());
        let err = checkout(&mut wc, &invocation).expect_err("no module");
        assert!(err.is_precondition());
    }
}
