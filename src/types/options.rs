//! Global options, local options and keyword substitution modes

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Option sent as `Global_option <flag>` ahead of every command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalOption {
    flag: Cow<'static, str>,
}

impl GlobalOption {
    /// Do not change file contents (`-n`)
    pub const DO_NOT_CHANGE: GlobalOption = GlobalOption::from_static("-n");
    /// Do not record the operation in the history (`-l`)
    pub const DO_NOT_LOG: GlobalOption = GlobalOption::from_static("-l");
    /// Make new working files read-only (`-r`)
    pub const MAKE_READ_ONLY: GlobalOption = GlobalOption::from_static("-r");
    /// Trace command execution on the server (`-t`)
    pub const TRACE_EXECUTION: GlobalOption = GlobalOption::from_static("-t");
    /// Normal verbosity; carries no flag and is never sent
    pub const VERBOSE: GlobalOption = GlobalOption::from_static("");
    /// Suppress informational messages (`-q`)
    pub const PARTLY_QUIET: GlobalOption = GlobalOption::from_static("-q");
    /// Silent but for serious problems (`-Q`)
    pub const SILENT: GlobalOption = GlobalOption::from_static("-Q");

    pub const fn from_static(flag: &'static str) -> Self {
        Self {
            flag: Cow::Borrowed(flag),
        }
    }

    pub fn new(flag: impl Into<String>) -> Self {
        Self {
            flag: Cow::Owned(flag.into()),
        }
    }

    pub fn flag(&self) -> &str {
        &self.flag
    }

    /// Options with empty text (the verbose quiet level) stay off the wire
    pub fn is_sendable(&self) -> bool {
        !self.flag.is_empty()
    }
}

impl fmt::Display for GlobalOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flag)
    }
}

/// Command specific option, sent as one or two `Argument` lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalOption {
    option: Cow<'static, str>,
    argument: Option<String>,
}

impl LocalOption {
    /// Recurse into sub-folders (`-R`)
    pub const RECURSE: LocalOption = LocalOption::from_static("-R");
    /// Local folder only (`-l`)
    pub const DO_NOT_RECURSE: LocalOption = LocalOption::from_static("-l");
    /// Remove folders left empty by an update or checkout (`-P`)
    pub const PRUNE_EMPTY_DIRECTORIES: LocalOption = LocalOption::from_static("-P");

    pub const fn from_static(option: &'static str) -> Self {
        Self {
            option: Cow::Borrowed(option),
            argument: None,
        }
    }

    pub fn new(option: impl Into<String>) -> Self {
        Self {
            option: Cow::Owned(option.into()),
            argument: None,
        }
    }

    /// Option followed by a value, e.g. `-m "log message"`
    pub fn with_argument(option: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            option: Cow::Owned(option.into()),
            argument: Some(argument.into()),
        }
    }

    /// `-m <message>`
    pub fn message(message: impl Into<String>) -> Self {
        Self::with_argument("-m", message)
    }

    pub fn option(&self) -> &str {
        &self.option
    }

    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// True when an option with the same flag appears in `options`
    pub fn is_element_of(&self, options: &[LocalOption]) -> bool {
        Self::find(options, &self.option).is_some()
    }

    /// First option carrying `flag`
    pub fn find<'a>(options: &'a [LocalOption], flag: &str) -> Option<&'a LocalOption> {
        options.iter().find(|candidate| candidate.option == flag)
    }

    /// Values of every option carrying `flag`, in order
    pub fn collect_arguments(options: &[LocalOption], flag: &str) -> Vec<String> {
        options
            .iter()
            .filter(|candidate| candidate.option == flag)
            .filter_map(|candidate| candidate.argument.clone())
            .collect()
    }
}

impl fmt::Display for LocalOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.argument.as_deref() {
            Some(argument) if !argument.is_empty() => write!(f, "{} \"{}\"", self.option, argument),
            _ => f.write_str(&self.option),
        }
    }
}

/// Keyword substitution mode, which also decides binary vs text transfer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KSubstMode {
    /// `-kb`: binary, no translation at all
    Binary,
    /// `-ko`: keep the old keyword text
    Old,
    /// `-kkv`: keyword and value (the default text mode)
    KeywordValue,
    /// `-kkvl`: keyword, value and locker
    KeywordValueLocker,
    /// `-kv`: values only
    ValueOnly,
    /// `-kk`: keywords only
    KeywordOnly,
    /// Anything else the server handed us
    Other(String),
}

impl KSubstMode {
    /// Parse a full flag such as `-kb`; an empty flag means the default `-kkv`
    pub fn from_flag(flag: &str) -> Self {
        match flag {
            "" | "-kkv" => KSubstMode::KeywordValue,
            "-kb" => KSubstMode::Binary,
            "-ko" => KSubstMode::Old,
            "-kkvl" => KSubstMode::KeywordValueLocker,
            "-kv" => KSubstMode::ValueOnly,
            "-kk" => KSubstMode::KeywordOnly,
            other => KSubstMode::Other(other.to_string()),
        }
    }

    /// Mode from the bare letters of a wrapper rule (`b`, `o`, `kv`)
    pub fn from_letters(letters: &str) -> Self {
        Self::from_flag(&format!("-k{letters}"))
    }

    pub fn as_flag(&self) -> &str {
        match self {
            KSubstMode::Binary => "-kb",
            KSubstMode::Old => "-ko",
            KSubstMode::KeywordValue => "-kkv",
            KSubstMode::KeywordValueLocker => "-kkvl",
            KSubstMode::ValueOnly => "-kv",
            KSubstMode::KeywordOnly => "-kk",
            KSubstMode::Other(flag) => flag,
        }
    }

    /// Form stored in entry lines: the default mode is written as nothing
    pub fn to_entry_line_mode(&self) -> &str {
        match self {
            KSubstMode::KeywordValue => "",
            other => other.as_flag(),
        }
    }

    /// Content is transferred without line-end translation
    pub fn is_binary(&self) -> bool {
        self.as_flag().contains("-kb")
    }

    /// Mode requested among `options`, either as `-kb` or as `-k b`
    pub fn from_local_options(options: &[LocalOption]) -> Option<Self> {
        options.iter().find_map(|option| match option.option() {
            "-k" => option.argument().map(Self::from_letters),
            flag if flag.starts_with("-k") => Some(Self::from_flag(flag)),
            _ => None,
        })
    }
}

impl fmt::Display for KSubstMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag())
    }
}

impl TryFrom<String> for KSubstMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if !value.starts_with("-k") {
            return Err(format!("keyword mode must start with -k: {value}"));
        }
        Ok(Self::from_flag(&value))
    }
}

impl From<KSubstMode> for String {
    fn from(mode: KSubstMode) -> Self {
        mode.as_flag().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_is_not_sendable() {
        assert!(!GlobalOption::VERBOSE.is_sendable());
        assert!(GlobalOption::SILENT.is_sendable());
        assert_eq!(GlobalOption::DO_NOT_CHANGE.flag(), "-n");
    }

    #[test]
    fn test_local_option_lookup() {
        let options = vec![
            LocalOption::PRUNE_EMPTY_DIRECTORIES,
            LocalOption::with_argument("-W", "*.gif -k 'b'"),
            LocalOption::message("initial import"),
            LocalOption::with_argument("-W", "*.jar -k 'b'"),
        ];

        assert!(LocalOption::PRUNE_EMPTY_DIRECTORIES.is_element_of(&options));
        assert!(!LocalOption::DO_NOT_RECURSE.is_element_of(&options));
        assert_eq!(
            LocalOption::find(&options, "-m").and_then(LocalOption::argument),
            Some("initial import")
        );
        assert_eq!(
            LocalOption::collect_arguments(&options, "-W"),
            vec!["*.gif -k 'b'".to_string(), "*.jar -k 'b'".to_string()]
        );
    }

    #[test]
    fn test_local_option_display() {
        assert_eq!(LocalOption::PRUNE_EMPTY_DIRECTORIES.to_string(), "-P");
        assert_eq!(LocalOption::message("fix").to_string(), "-m \"fix\"");
    }

    #[test]
    fn test_ksubst_flags() {
        assert_eq!(KSubstMode::from_flag("-kb"), KSubstMode::Binary);
        assert_eq!(KSubstMode::from_flag(""), KSubstMode::KeywordValue);
        assert_eq!(KSubstMode::from_letters("o"), KSubstMode::Old);
        assert_eq!(
            KSubstMode::from_flag("-kz"),
            KSubstMode::Other("-kz".to_string())
        );
        assert_eq!(KSubstMode::KeywordValue.to_entry_line_mode(), "");
        assert_eq!(KSubstMode::Binary.to_entry_line_mode(), "-kb");
    }

    #[test]
    fn test_ksubst_binary_detection() {
        assert!(KSubstMode::Binary.is_binary());
        assert!(!KSubstMode::Old.is_binary());
        assert!(!KSubstMode::KeywordValue.is_binary());
    }

    #[test]
    fn test_ksubst_from_local_options() {
        let joined = vec![LocalOption::message("x"), LocalOption::new("-kb")];
        assert_eq!(KSubstMode::from_local_options(&joined), Some(KSubstMode::Binary));

        let split = vec![LocalOption::with_argument("-k", "o")];
        assert_eq!(KSubstMode::from_local_options(&split), Some(KSubstMode::Old));

        assert_eq!(KSubstMode::from_local_options(&[LocalOption::RECURSE]), None);
    }

    #[test]
    fn test_ksubst_rejects_non_k_flags() {
        assert!(KSubstMode::try_from("binary".to_string()).is_err());
        assert_eq!(
            KSubstMode::try_from("-kv".to_string()),
            Ok(KSubstMode::ValueOnly)
        );
    }
}
