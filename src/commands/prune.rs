//! Removal of folders left empty by an update or checkout

use crate::types::{CvsError, FolderId, Resource};
use crate::workspace::ResourceModel;
use tracing::debug;

/// Delete every managed folder below the given folder resources that holds
/// neither files nor sub-folders once its own children have been pruned.
///
/// Works bottom-up, so a chain of folders that only contain each other goes
/// away completely. `root` itself is never deleted; file resources are
/// skipped. Returns the number of folders deleted.
pub fn prune_empty_folders(
    model: &mut dyn ResourceModel,
    root: FolderId,
    resources: &[Resource],
) -> Result<usize, CvsError> {
    let mut pruned = 0;
    for folder in resources.iter().filter_map(|r| r.as_folder()) {
        if model.folder_exists(folder) {
            pruned += prune_folder(model, root, folder)?;
        }
    }
    Ok(pruned)
}

fn prune_folder(
    model: &mut dyn ResourceModel,
    root: FolderId,
    folder: FolderId,
) -> Result<usize, CvsError> {
    let mut pruned = 0;
    for child in model.folders(folder) {
        if model.folder_exists(child) {
            pruned += prune_folder(model, root, child)?;
        }
    }

    if folder == root || !model.is_cvs_folder(folder) {
        return Ok(pruned);
    }
    let has_folders = model
        .folders(folder)
        .into_iter()
        .any(|child| model.folder_exists(child));
    if has_folders || !model.files(folder).is_empty() {
        return Ok(pruned);
    }

    debug!("Pruning empty folder: {}", model.relative_path(folder, root));
    model.delete_folder(folder)?;
    Ok(pruned + 1)
}
