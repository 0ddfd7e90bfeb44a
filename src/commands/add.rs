use super::{require_arguments, Command, Invocation, RequestContext};
use crate::types::{CvsError, Resource};
use crate::visitor::{AddStructureVisitor, ResourceVisitor};
use crate::workspace::ResourceModel;
use tracing::debug;

/// `add`: schedules new files and folders.
///
/// Once the server accepted the request, every added folder is stamped with
/// sync info derived from its parent, in argument order, so that nested
/// folders added together each find a managed parent.
#[derive(Debug, Default, Clone, Copy)]
pub struct Add;

impl Command for Add {
    fn name(&self) -> &'static str {
        "add"
    }

    fn check_preconditions(
        &self,
        model: &dyn ResourceModel,
        invocation: &Invocation,
        _resources: &[Resource],
    ) -> Result<(), CvsError> {
        require_arguments(self.name(), &invocation.arguments, 1, None)?;
        if !model.is_cvs_folder(invocation.root) {
            return Err(CvsError::NotManaged {
                name: model.folder_name(invocation.root).to_string(),
            });
        }
        Ok(())
    }

    fn build_request(&self, ctx: &mut RequestContext<'_, '_>) -> Result<(), CvsError> {
        AddStructureVisitor::new(&mut *ctx.session, ctx.model, ctx.invocation.root)
            .visit(ctx.resources)
    }

    fn on_finished(
        &self,
        model: &mut dyn ResourceModel,
        _invocation: &Invocation,
        resources: &[Resource],
        success: bool,
    ) -> Result<(), CvsError> {
        if !success {
            return Ok(());
        }
        for folder in resources.iter().filter_map(|r| r.as_folder()) {
            if model.is_cvs_folder(folder) {
                continue;
            }
            let Some(parent) = model.folder_parent(folder) else {
                continue;
            };
            let Some(info) = model.folder_sync(parent) else {
                continue;
            };
            let info = info.child(model.folder_name(folder));
            debug!("Folder now under version control: {}", info.repository);
            model.set_folder_sync(folder, info)?;
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

    fn add(wc: &mut WorkingCopy, responses: &mut CannedResponses, arguments: &[&str]) -> String {
        let invocation = Invocation::new(wc.root()).arguments(arguments.iter().copied());
        let mut wire = Vec::new();
        {
            let mut session = Session::new(&mut wire, "/cvs");
            let _ = run_command(
                &Add,
                &mut session,
                wc,
                responses,
                &mut CollectingListener::default(),
                &invocation,
            );
        }
        String::from_utf8(wire).expect("wire is utf-8")
    }

    #[test]
    fn test_nested_folders_are_stamped_in_order() {
        let mut wc = WorkingCopy::new("p");
        let root = wc.root();
        let mut info = FolderSyncInfo::new("/cvs", "p");
        info.tag = Some("Tbranch".to_string());
        wc.set_sync(root, info);
        let x = wc.add_folder(root, "x");
        let y = wc.add_folder(x, "y");

        let text = add(&mut wc, &mut CannedResponses::ok(), &["x", "x/y"]);

        assert_eq!(
            text,
            "Directory .\n/cvs/p\nSticky Tbranch\n\
             Directory x\n/cvs/p/x\n\
             Directory x/y\n/cvs/p/x/y\n\
             Directory .\n/cvs/p\n\
             Argument x\nArgument x/y\n\
             add\n"
        );
        let stamped = wc.folder_sync(y).expect("y is managed now");
        assert_eq!(stamped.repository, "p/x/y");
        assert_eq!(stamped.tag.as_deref(), Some("Tbranch"));
    }

    #[test]
    fn test_failed_add_stamps_nothing() {
        let mut wc = WorkingCopy::new("p");
        let root = wc.root();
        wc.set_sync(root, FolderSyncInfo::new("/cvs", "p"));
        let x = wc.add_folder(root, "x");

        add(&mut wc, &mut CannedResponses::error("denied"), &["x"]);
        assert!(!wc.is_cvs_folder(x));
    }

    #[test]
    fn test_add_needs_managed_root_and_arguments() {
        let mut wc = WorkingCopy::new("p");
        let root = wc.root();
        wc.add_file(root, "a.c", "");

        let text = add(&mut wc, &mut CannedResponses::ok(), &["a.c"]);
        assert!(text.is_empty());

        wc.set_sync(root, FolderSyncInfo::new("/cvs", "p"));
        let err = Add
            .check_preconditions(&wc, &Invocation::new(root), &[])
            .expect_err("no arguments");
        assert!(err.is_precondition());
    }
}
