//! `CVS/Entries` line codec
//!
//! File lines look like `/name/revision/timestamp/options/tagdate`. The
//! timestamp slot doubles as a merge marker, and the revision may carry a
//! `-` prefix for a scheduled removal or be `0` for a scheduled addition.

use crate::types::{CvsError, KSubstMode};
use chrono::NaiveDateTime;

/// Revision recorded for files scheduled for addition
pub const ADDED_REVISION: &str = "0";

const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";
const TIMESTAMP_DUMMY: &str = "dummy timestamp";
const TIMESTAMP_MERGED: &str = "Result of merge";
const TIMESTAMP_SERVER_MERGED: &str = "+modified";
const TIMESTAMP_SERVER_MERGED_WITH_CONFLICT: &str = "+=";

/// How the last update left the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeState {
    #[default]
    None,
    /// Merged cleanly by the server
    Merged,
    /// Merged with conflicts still to be resolved
    Conflicts,
}

/// One parsed file line of `CVS/Entries`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLine {
    pub name: String,
    pub revision: String,
    pub deleted: bool,
    /// Checkout time of the file in UTC, when one is recorded
    pub timestamp: Option<NaiveDateTime>,
    pub merge: MergeState,
    pub keyword_mode: Option<KSubstMode>,
    pub tag: Option<String>,
}

impl EntryLine {
    /// Entry for a file checked out at `revision`
    pub fn new(name: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            revision: revision.into(),
            deleted: false,
            timestamp: None,
            merge: MergeState::None,
            keyword_mode: None,
            tag: None,
        }
    }

    /// Entry for a file scheduled for addition
    pub fn added(name: impl Into<String>) -> Self {
        Self::new(name, ADDED_REVISION)
    }

    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_keyword_mode(mut self, mode: KSubstMode) -> Self {
        self.keyword_mode = Some(mode);
        self
    }

    /// Parse a file line. Directory lines (`D/...`) are rejected.
    pub fn parse(line: &str) -> Result<Self, CvsError> {
        let malformed = || CvsError::MalformedEntry(line.to_string());

        let rest = line.strip_prefix('/').ok_or_else(malformed)?;
        // Tags may themselves contain '/', so only split off the first four slots.
        let mut slots = rest.splitn(5, '/');
        let name = slots.next().ok_or_else(malformed)?;
        let revision = slots.next().ok_or_else(malformed)?;
        let date = slots.next().ok_or_else(malformed)?;
        let options = slots.next().ok_or_else(malformed)?;
        let tag = slots.next().ok_or_else(malformed)?;

        if name.is_empty() || revision.is_empty() {
            return Err(malformed());
        }

        let (deleted, revision) = match revision.strip_prefix('-') {
            Some(revision) => (true, revision),
            None => (false, revision),
        };
        let revision = strip_locker(revision);

        let (merge, timestamp) = parse_timestamp_slot(date);

        Ok(Self {
            name: name.to_string(),
            revision: revision.to_string(),
            deleted,
            timestamp: if revision == ADDED_REVISION {
                None
            } else {
                timestamp
            },
            merge,
            keyword_mode: (!options.is_empty()).then(|| KSubstMode::from_flag(options)),
            tag: (!tag.is_empty()).then(|| tag.to_string()),
        })
    }

    pub fn is_added(&self) -> bool {
        self.revision == ADDED_REVISION
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Line as stored in `CVS/Entries`
    pub fn to_entries_line(&self) -> String {
        let timestamp = match (self.merge, self.timestamp) {
            (MergeState::Merged, _) => TIMESTAMP_MERGED.to_string(),
            (MergeState::Conflicts, Some(ts)) => {
                format!("{}+{}", TIMESTAMP_MERGED, ts.format(TIMESTAMP_FORMAT))
            }
            (MergeState::Conflicts, None) => format!("{}+", TIMESTAMP_MERGED),
            (MergeState::None, Some(ts)) => ts.format(TIMESTAMP_FORMAT).to_string(),
            (MergeState::None, None) if self.is_added() => String::new(),
            (MergeState::None, None) => TIMESTAMP_DUMMY.to_string(),
        };
        self.format_with_timestamp(&timestamp)
    }

    /// Tracking line sent in an `Entry` request.
    ///
    /// The timestamp is blanked, except for merged files: the server learns
    /// `+=` for a conflicting merge nobody touched since, `+modified` for
    /// everything else that came out of a merge.
    pub fn to_server_line(&self, modified_since_checkout: bool) -> String {
        let timestamp = match self.merge {
            MergeState::None => "",
            MergeState::Conflicts if !modified_since_checkout => {
                TIMESTAMP_SERVER_MERGED_WITH_CONFLICT
            }
            MergeState::Merged | MergeState::Conflicts => TIMESTAMP_SERVER_MERGED,
        };
        self.format_with_timestamp(timestamp)
    }

    fn format_with_timestamp(&self, timestamp: &str) -> String {
        format!(
            "/{}/{}{}/{}/{}/{}",
            self.name,
            if self.deleted { "-" } else { "" },
            self.revision,
            timestamp,
            self.keyword_mode
                .as_ref()
                .map(KSubstMode::to_entry_line_mode)
                .unwrap_or_default(),
            self.tag.as_deref().unwrap_or_default()
        )
    }
}

/// Parse a timestamp in entry line format (`Thu May 25 12:33:33 2002`)
pub fn parse_entry_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT).ok()
}

fn parse_timestamp_slot(date: &str) -> (MergeState, Option<NaiveDateTime>) {
    if date.contains(TIMESTAMP_SERVER_MERGED) {
        (MergeState::Merged, None)
    } else if date.contains(TIMESTAMP_SERVER_MERGED_WITH_CONFLICT) {
        (MergeState::Conflicts, None)
    } else if let Some(rest) = date.strip_prefix(&format!("{}+", TIMESTAMP_MERGED)) {
        (MergeState::Conflicts, parse_entry_timestamp(rest))
    } else if date.contains(TIMESTAMP_MERGED) {
        (MergeState::Merged, None)
    } else {
        // Unparseable timestamps (including the dummy) just never match the file.
        let date = date.rsplit('+').next().unwrap_or(date);
        (MergeState::None, parse_entry_timestamp(date))
    }
}

fn strip_locker(revision: &str) -> &str {
    match revision.find(char::is_whitespace) {
        Some(index) if revision[index..].trim_start().starts_with("locked by") => &revision[..index],
        _ => revision,
    }
}
