//! Top-down traversal used by the generic sync commands

use super::{ResourceVisitor, StructureSender};
use crate::session::Session;
use crate::types::{CvsError, FileId, FolderId, KSubstMode};
use crate::workspace::ResourceModel;

/// Walks folders before their contents, describing every file it meets.
///
/// Unmanaged sub-folders are reported as questionable, unless ignored, and
/// never entered.
pub struct FileStructureVisitor<'a, 'w> {
    sender: StructureSender<'a, 'w>,
    modified_only: bool,
    send_empty_folders: bool,
    send_questionable: bool,
    mode: Option<KSubstMode>,
}

impl<'a, 'w> FileStructureVisitor<'a, 'w> {
    pub fn new(session: &'a mut Session<'w>, model: &'a dyn ResourceModel, root: FolderId) -> Self {
        Self {
            sender: StructureSender::new(session, model, root),
            modified_only: false,
            send_empty_folders: false,
            send_questionable: true,
            mode: None,
        }
    }

    /// Only describe files that are modified (commit)
    pub fn modified_only(mut self, modified_only: bool) -> Self {
        self.modified_only = modified_only;
        self
    }

    /// Announce every folder, even when none of its files qualifies
    pub fn send_empty_folders(mut self, send_empty_folders: bool) -> Self {
        self.send_empty_folders = send_empty_folders;
        self
    }

    pub fn send_questionable(mut self, send_questionable: bool) -> Self {
        self.send_questionable = send_questionable;
        self
    }

    /// Keyword mode that overrides the one recorded for each file
    pub fn keyword_mode(mut self, mode: Option<KSubstMode>) -> Self {
        self.mode = mode;
        self
    }
}

impl ResourceVisitor for FileStructureVisitor<'_, '_> {
    fn model(&self) -> &dyn ResourceModel {
        self.sender.model()
    }

    fn visit_file(&mut self, file: FileId) -> Result<(), CvsError> {
        let model = self.sender.model();
        if model.is_ignored(file) {
            return Ok(());
        }
        if self.modified_only && !model.is_modified(file) {
            return Ok(());
        }

        let mode = self.mode.clone().or_else(|| model.keyword_mode(file));
        self.sender
            .send_file(file, self.send_questionable, mode.as_ref())
    }

    fn visit_folder(&mut self, folder: FolderId) -> Result<(), CvsError> {
        if self.send_empty_folders {
            self.sender.send_folder(folder, false)?;
        }

        let model = self.sender.model();
        if !model.folder_exists(folder) {
            return Ok(());
        }

        for file in model.files(folder) {
            self.visit_file(file)?;
        }
        for child in model.folders(folder) {
            if model.is_cvs_folder(child) {
                self.visit_folder(child)?;
            } else if self.send_questionable
                && model.folder_exists(child)
                && !model.is_folder_ignored(child)
            {
                self.sender.send_folder(folder, false)?;
                self.sender
                    .session()
                    .send_questionable(model.folder_name(child))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FolderSyncInfo, Resource};
    use crate::workspace::{EntryLine, WorkingCopy};

    const ROOT: &str = "/cvs";

    #[derive(Default)]
    struct Walk {
        modified_only: bool,
        send_empty_folders: bool,
        mode: Option<KSubstMode>,
    }

    fn traverse(wc: &WorkingCopy, resources: &[Resource], walk: Walk) -> String {
        let mut wire = Vec::new();
        {
            let mut session = Session::new(&mut wire, ROOT);
            FileStructureVisitor::new(&mut session, wc, wc.root())
                .modified_only(walk.modified_only)
                .send_empty_folders(walk.send_empty_folders)
                .keyword_mode(walk.mode)
                .visit(resources)
                .expect("traversal should succeed");
        }
        String::from_utf8(wire).expect("wire is utf-8")
    }

    fn checkout() -> WorkingCopy {
        let mut wc = WorkingCopy::new("m");
        let root = wc.root();
        wc.set_sync(root, FolderSyncInfo::new(ROOT, "m"));
        wc.add_tracked_file(root, EntryLine::new("a.c", "1.1"), "a");
        let b = wc.add_tracked_file(root, EntryLine::new("b.c", "1.4"), "bb");
        wc.set_modified(b, true);
        let sub = wc.add_managed_folder(root, "sub", "m/sub");
        wc.add_tracked_file(sub, EntryLine::new("c.c", "1.2"), "c");
        wc.add_managed_folder(root, "empty", "m/empty");
        wc
    }

    #[test]
    fn test_top_down_order() {
        let wc = checkout();
        let text = traverse(&wc, &[Resource::Folder(wc.root())], Walk::default());

        assert_eq!(
            text,
            "Directory .\n/cvs/m\n\
             Entry /a.c/1.1///\nUnchanged a.c\n\
             Entry /b.c/1.4///\nModified b.c\nu=rw,g=rw,o=r\n2\nbb\
             Directory sub\n/cvs/m/sub\n\
             Entry /c.c/1.2///\nUnchanged c.c\n"
        );
    }

    #[test]
    fn test_empty_folders_are_announced_on_request() {
        let wc = checkout();
        let walk = Walk {
            send_empty_folders: true,
            ..Walk::default()
        };
        let text = traverse(&wc, &[Resource::Folder(wc.root())], walk);

        assert!(text.starts_with("Directory .\n/cvs/m\nEntry /a.c/1.1///\n"));
        assert!(text.contains("Directory empty\n/cvs/m/empty\n"));
        assert_eq!(text.matches("Directory .\n").count(), 1, "root announced once");
    }

    #[test]
    fn test_modified_only_skips_clean_files() {
        let wc = checkout();
        let walk = Walk {
            modified_only: true,
            ..Walk::default()
        };
        let text = traverse(&wc, &[Resource::Folder(wc.root())], walk);

        assert_eq!(
            text,
            "Directory .\n/cvs/m\nEntry /b.c/1.4///\nModified b.c\nu=rw,g=rw,o=r\n2\nbb"
        );
    }

    #[test]
    fn test_unmanaged_children_are_questionable() {
        let mut wc = checkout();
        let root = wc.root();
        wc.add_file(root, "notes.txt", "n");
        let ignored = wc.add_file(root, "build.log", "");
        wc.set_ignored(ignored, true);
        wc.add_folder(root, "scratch");

        let text = traverse(&wc, &[Resource::Folder(root)], Walk::default());
        assert!(text.contains("Questionable notes.txt\n"));
        assert!(text.contains("Questionable scratch\n"));
        assert!(!text.contains("build.log"), "ignored files stay silent");
        assert!(!text.contains("Directory scratch"));
    }

    #[test]
    fn test_ignored_unmanaged_folder_stays_silent() {
        let mut wc = checkout();
        let root = wc.root();
        let build = wc.add_folder(root, "build");
        wc.set_folder_ignored(build, true);
        let managed = wc.add_managed_folder(root, "lib", "m/lib");
        wc.set_folder_ignored(managed, true);
        wc.add_tracked_file(managed, EntryLine::new("l.c", "1.1"), "l");

        let text = traverse(&wc, &[Resource::Folder(root)], Walk::default());
        assert!(!text.contains("build"), "ignored folder reported: {text}");
        assert!(text.contains("Directory lib\n/cvs/m/lib\nEntry /l.c/1.1///\n"));
    }

    #[test]
    fn test_keyword_override_controls_binary_transfer() {
        let mut wc = WorkingCopy::new("m");
        let root = wc.root();
        wc.set_sync(root, FolderSyncInfo::new(ROOT, "m"));
        let file = wc.add_tracked_file(root, EntryLine::new("x.txt", "1.1"), "x");
        wc.set_modified(file, true);

        let walk = Walk {
            mode: Some(KSubstMode::Binary),
            ..Walk::default()
        };
        let text = traverse(&wc, &[Resource::File(file)], walk);
        assert!(text.ends_with("Modified x.txt\nu=rw,g=rw,o=r\n1\nx"));
    }
}
