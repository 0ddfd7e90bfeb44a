//! On-disk working copy scanner
//!
//! Walks a checked-out tree and rebuilds a [`WorkingCopy`] from the `CVS/`
//! metadata of every folder: `Entries`, `Repository`, `Root`, `Tag` and
//! `Entries.Static`, plus the `.cvsignore` rules of the folder.

use super::{EntryLine, ResourceModel, WorkingCopy};
use crate::config::ClientConfig;
use crate::matcher::PatternMatcher;
use crate::types::{root_directory, CvsError, FolderId, FolderSyncInfo, CVS_DIRECTORY};
use camino::{Utf8Path, Utf8PathBuf};
use filetime::FileTime;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use tracing::{debug, warn};

const ENTRIES_FILE: &str = "Entries";
const REPOSITORY_FILE: &str = "Repository";
const ROOT_FILE: &str = "Root";
const TAG_FILE: &str = "Tag";
const STATIC_FILE: &str = "Entries.Static";

/// Per-folder state collected while the walk is inside the folder
struct FolderScan {
    path: Utf8PathBuf,
    entries: HashMap<String, EntryLine>,
    ignore: PatternMatcher<bool>,
}

/// Scan the working copy rooted at `root`
///
/// # Errors
/// * Unreadable metadata files return `CvsError::Resource`
/// * Walker failures below the root are logged and skipped
pub fn scan_working_copy(root: &Utf8Path, config: &ClientConfig) -> Result<WorkingCopy, CvsError> {
    if !root.is_dir() {
        return Err(CvsError::Precondition(format!(
            "working copy root is not a folder: {}",
            root
        )));
    }

    let root_name = root.file_name().unwrap_or(".");
    let mut wc = WorkingCopy::new(root_name);
    let mut folder_ids: HashMap<Utf8PathBuf, FolderId> = HashMap::new();
    let mut scans: Vec<(FolderId, FolderScan)> = Vec::new();
    let mut scan_index: HashMap<FolderId, usize> = HashMap::new();

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir && entry.file_name() == CVS_DIRECTORY)
        })
        .build();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable path during scan: {}", e);
                continue;
            }
        };
        let Some(file_type) = entry.file_type() else {
            continue;
        };
        let path = match Utf8PathBuf::from_path_buf(entry.path().to_path_buf()) {
            Ok(path) => path,
            Err(path) => {
                warn!("Skipping non UTF-8 path: {}", path.display());
                continue;
            }
        };

        if file_type.is_dir() {
            let folder = if entry.depth() == 0 {
                wc.root()
            } else {
                let Some(parent) = path.parent().and_then(|p| folder_ids.get(p)).copied() else {
                    continue;
                };
                let name = entry.file_name().to_string_lossy().into_owned();
                let ignored = scan_index
                    .get(&parent)
                    .is_some_and(|&index| scans[index].1.ignore.matches(&name));
                let folder = wc.add_folder(parent, name);
                wc.set_folder_ignored(folder, ignored);
                folder
            };

            let parent_root = wc
                .folder_parent(folder)
                .and_then(|parent| wc.folder_sync(parent))
                .map(|info| info.root.clone())
                .or_else(|| config.repository_root.clone());
            if let Some(info) = read_sync_info(&path, parent_root)? {
                wc.set_sync(folder, info);
            }

            let scan = FolderScan {
                entries: read_entries(&path)?,
                ignore: folder_ignores(&path, config)?,
                path: path.clone(),
            };
            scan_index.insert(folder, scans.len());
            scans.push((folder, scan));
            folder_ids.insert(path, folder);
            continue;
        }

        if !file_type.is_file() {
            continue;
        }

        let Some(parent) = path.parent().and_then(|p| folder_ids.get(p)).copied() else {
            continue;
        };
        let Some(&index) = scan_index.get(&parent) else {
            continue;
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        let metadata =
            fs::metadata(&path).map_err(|e| CvsError::resource(path.as_std_path(), e))?;

        let file = wc.add_disk_file(parent, name.clone(), path.clone());
        let scan = &mut scans[index].1;
        match scan.entries.remove(&name) {
            Some(entry_line) => {
                let mtime = FileTime::from_last_modification_time(&metadata).unix_seconds();
                let modified = is_dirty(&entry_line, mtime);
                wc.set_entry(file, Some(entry_line));
                wc.set_modified(file, modified);
            }
            None => wc.set_ignored(file, scan.ignore.matches(&name)),
        }
        wc.set_executable(file, is_executable(&metadata));
    }

    // Entries without a file on disk stay tracked but missing
    for (folder, scan) in scans {
        let mut missing: Vec<_> = scan.entries.into_values().collect();
        missing.sort_by(|a, b| a.name.cmp(&b.name));
        for entry_line in missing {
            let path = scan.path.join(&entry_line.name);
            let file = wc.add_disk_file(folder, entry_line.name.clone(), path);
            wc.set_entry(file, Some(entry_line));
            wc.set_exists(file, false);
        }
    }

    debug!(
        "Scanned {}: {} folders, {} files",
        root,
        wc.folder_count(),
        wc.file_count()
    );
    Ok(wc)
}

/// A tracked file is dirty unless its mtime equals the recorded checkout time
fn is_dirty(entry: &EntryLine, mtime_seconds: i64) -> bool {
    if entry.is_added() || entry.is_deleted() {
        return true;
    }
    match entry.timestamp {
        Some(timestamp) => timestamp.and_utc().timestamp() != mtime_seconds,
        None => true,
    }
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}

/// First line of a metadata file, `None` when the file is absent
fn read_first_line(path: &Utf8Path) -> Result<Option<String>, CvsError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text.lines().next().unwrap_or_default().trim().to_string())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CvsError::resource(path.as_std_path(), e)),
    }
}

fn read_sync_info(
    folder: &Utf8Path,
    inherited_root: Option<String>,
) -> Result<Option<FolderSyncInfo>, CvsError> {
    let cvs = folder.join(CVS_DIRECTORY);
    let Some(repository) = read_first_line(&cvs.join(REPOSITORY_FILE))? else {
        return Ok(None);
    };
    let root = read_first_line(&cvs.join(ROOT_FILE))?
        .or(inherited_root)
        .unwrap_or_default();

    // Old clients wrote absolute repository paths
    let root_dir = root_directory(&root);
    let relative = repository
        .strip_prefix(root_dir)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|_| !root_dir.is_empty())
        .map(str::to_string);
    let repository = relative.unwrap_or(repository);

    let mut info = FolderSyncInfo::new(root, repository);
    info.tag = read_first_line(&cvs.join(TAG_FILE))?.filter(|tag| !tag.is_empty());
    info.is_static = cvs.join(STATIC_FILE).is_file();
    Ok(Some(info))
}

fn read_entries(folder: &Utf8Path) -> Result<HashMap<String, EntryLine>, CvsError> {
    let path = folder.join(CVS_DIRECTORY).join(ENTRIES_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => return Err(CvsError::resource(path.as_std_path(), e)),
    };

    let mut entries = HashMap::new();
    for line in text.lines().filter(|line| line.starts_with('/')) {
        match EntryLine::parse(line) {
            Ok(entry) => {
                entries.insert(entry.name.clone(), entry);
            }
            Err(e) => warn!("{} in {}", e, path),
        }
    }
    Ok(entries)
}

fn folder_ignores(folder: &Utf8Path, config: &ClientConfig) -> Result<PatternMatcher<bool>, CvsError> {
    let mut matcher = PatternMatcher::from_ignore_file(folder.as_std_path())
        .map_err(|e| CvsError::resource(folder.as_std_path(), e))?;
    for pattern in &config.ignore {
        matcher.register(pattern, true);
    }
    Ok(matcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::{parse_entry_timestamp, ResourceModel};
    use filetime::set_file_mtime;
    use tempfile::TempDir;

    const CHECKOUT_TIME: &str = "Sat May 25 12:33:33 2002";

    fn utf8_root(temp_dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf()).expect("temp dir is utf-8")
    }

    fn checkout_mtime() -> FileTime {
        let timestamp = parse_entry_timestamp(CHECKOUT_TIME).expect("valid timestamp");
        FileTime::from_unix_time(timestamp.and_utc().timestamp(), 0)
    }

    fn write_metadata(folder: &Utf8Path, repository: &str, entries: &str) {
        let cvs = folder.join(CVS_DIRECTORY);
        fs::create_dir_all(&cvs).expect("Failed to create CVS dir");
        fs::write(cvs.join(REPOSITORY_FILE), format!("{repository}\n")).expect("write Repository");
        fs::write(cvs.join(ENTRIES_FILE), entries).expect("write Entries");
    }

    #[test]
    fn test_scan_plain_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = utf8_root(&temp_dir);
        fs::write(root.join("notes.txt"), "hello").expect("write file");

        let wc = scan_working_copy(&root, &ClientConfig::default()).expect("scan");
        let files = wc.files(wc.root());
        assert_eq!(files.len(), 1);
        assert!(!wc.is_managed(files[0]));
        assert!(wc.is_modified(files[0]));
        assert!(!wc.is_cvs_folder(wc.root()));
    }

    #[test]
    fn test_scan_reads_cvs_metadata() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = utf8_root(&temp_dir);
        write_metadata(
            &root,
            "project",
            &format!("/clean.c/1.1/{CHECKOUT_TIME}//\n/dirty.c/1.2/{CHECKOUT_TIME}//\nD/sub////\n"),
        );
        fs::write(root.join(CVS_DIRECTORY).join(ROOT_FILE), ":pserver:anon@host:/cvs\n")
            .expect("write Root");
        fs::write(root.join(CVS_DIRECTORY).join(TAG_FILE), "Tbranch\n").expect("write Tag");
        fs::write(root.join("clean.c"), "clean").expect("write clean.c");
        fs::write(root.join("dirty.c"), "dirty").expect("write dirty.c");
        set_file_mtime(root.join("clean.c"), checkout_mtime()).expect("pin mtime");

        let wc = scan_working_copy(&root, &ClientConfig::default()).expect("scan");
        let info = wc.folder_sync(wc.root()).expect("root is managed");
        assert_eq!(info.remote_location(), "/cvs/project");
        assert_eq!(info.tag.as_deref(), Some("Tbranch"));
        assert!(!info.is_static);

        let files = wc.files(wc.root());
        assert_eq!(files.len(), 2);
        assert_eq!(wc.file_name(files[0]), "clean.c");
        assert!(!wc.is_modified(files[0]), "pinned mtime should be clean");
        assert_eq!(wc.file_name(files[1]), "dirty.c");
        assert!(wc.is_modified(files[1]), "fresh mtime should be dirty");
    }

    #[test]
    fn test_scan_skips_metadata_and_inherits_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = utf8_root(&temp_dir);
        write_metadata(&root, "project", "");
        fs::write(root.join(CVS_DIRECTORY).join(ROOT_FILE), "/var/cvs\n").expect("write Root");
        write_metadata(&root.join("src"), "/var/cvs/project/src", "");

        let wc = scan_working_copy(&root, &ClientConfig::default()).expect("scan");
        let folders = wc.folders(wc.root());
        assert_eq!(folders.len(), 1, "CVS directories are not part of the model");

        let src = wc.folder_sync(folders[0]).expect("src is managed");
        assert_eq!(src.root, "/var/cvs");
        assert_eq!(src.repository, "project/src");
    }

    #[test]
    fn test_missing_entries_become_missing_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = utf8_root(&temp_dir);
        write_metadata(&root, "project", &format!("/gone.c/1.3/{CHECKOUT_TIME}//\n"));

        let wc = scan_working_copy(&root, &ClientConfig::default()).expect("scan");
        let files = wc.files(wc.root());
        assert_eq!(files.len(), 1);
        assert!(wc.is_managed(files[0]));
        assert!(!wc.file_exists(files[0]));
    }

    #[test]
    fn test_ignored_untracked_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = utf8_root(&temp_dir);
        fs::write(root.join(".cvsignore"), "*.log\n").expect("write .cvsignore");
        fs::write(root.join("build.log"), "").expect("write log");
        fs::write(root.join("core"), "").expect("write core");
        fs::write(root.join("main.c"), "").expect("write main.c");

        let config = ClientConfig {
            ignore: vec!["core".to_string()],
            ..ClientConfig::default()
        };
        let wc = scan_working_copy(&root, &config).expect("scan");
        let ignored: Vec<_> = wc
            .files(wc.root())
            .into_iter()
            .filter(|&file| wc.is_ignored(file))
            .map(|file| wc.file_name(file).to_string())
            .collect();
        assert_eq!(ignored, vec!["build.log".to_string(), "core".to_string()]);
    }

    #[test]
    fn test_scan_rejects_missing_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = utf8_root(&temp_dir).join("nope");
        let err = scan_working_copy(&root, &ClientConfig::default()).expect_err("no root");
        assert!(err.is_precondition());
    }

    #[test]
    fn test_dirty_rules() {
        let entry = EntryLine::new("a.c", "1.1")
            .with_timestamp(parse_entry_timestamp(CHECKOUT_TIME).expect("timestamp"));
        let pinned = checkout_mtime().unix_seconds();
        assert!(!is_dirty(&entry, pinned));
        assert!(is_dirty(&entry, pinned + 1));
        assert!(is_dirty(&EntryLine::added("b.c"), pinned));
        assert!(is_dirty(&EntryLine::new("c.c", "1.1"), pinned));
    }
}
