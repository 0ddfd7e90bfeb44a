//! Ordered glob matching for ignore files and wrapper rules
//!
//! A matcher is an ordered list of `(glob, tag)` rules. Lookups scan the list
//! in registration order and return the tag of the first rule whose glob
//! matches the whole name.

use crate::types::{KSubstMode, CVS_DIRECTORY};
use globset::{GlobBuilder, GlobMatcher};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::warn;

/// Name of the per-folder ignore file
pub const IGNORE_FILE: &str = ".cvsignore";

#[derive(Debug, Clone)]
struct Rule<T> {
    pattern: String,
    matcher: GlobMatcher,
    tag: T,
}

/// First-match-wins table of glob patterns
#[derive(Debug, Clone)]
pub struct PatternMatcher<T> {
    rules: Vec<Rule<T>>,
}

impl<T> Default for PatternMatcher<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T> PatternMatcher<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule.
    ///
    /// Only `*` and `?` are wildcards; every other character matches itself.
    /// Patterns that are empty after trimming are dropped: they must never
    /// turn into a rule that matches every name.
    pub fn register(&mut self, pattern: &str, tag: T) {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return;
        }

        let glob = GlobBuilder::new(&wildcard_glob(pattern))
            .literal_separator(false)
            .backslash_escape(true)
            .build();
        match glob {
            Ok(glob) => self.rules.push(Rule {
                pattern: pattern.to_string(),
                matcher: glob.compile_matcher(),
                tag,
            }),
            Err(e) => warn!("Ignoring invalid pattern '{}': {}", pattern, e),
        }
    }

    /// Tag of the first rule matching `name`
    pub fn find(&self, name: &str) -> Option<&T> {
        self.rules
            .iter()
            .find(|rule| rule.matcher.is_match(name))
            .map(|rule| &rule.tag)
    }

    pub fn matches(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Registered patterns, in match order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.pattern.as_str())
    }
}

impl PatternMatcher<bool> {
    /// Ignore matcher for `patterns`.
    ///
    /// The metadata directory name is always appended so it stays ignored
    /// even when the caller did not list it.
    pub fn ignoring<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut matcher = Self::new();
        matcher.register_ignored(patterns);
        matcher
    }

    pub fn register_ignored<S: AsRef<str>>(&mut self, patterns: &[S]) {
        for pattern in patterns {
            self.register(pattern.as_ref(), true);
        }
        self.register(CVS_DIRECTORY, true);
    }

    /// Matcher built from the `.cvsignore` file of `folder`.
    ///
    /// A missing file yields an empty matcher; every non-blank line of an
    /// existing file becomes one pattern.
    pub fn from_ignore_file(folder: &Path) -> std::io::Result<Self> {
        let mut matcher = Self::new();
        let text = match fs::read_to_string(folder.join(IGNORE_FILE)) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(matcher),
            Err(e) => return Err(e),
        };

        for line in text.lines() {
            matcher.register(line, true);
        }
        Ok(matcher)
    }
}

impl PatternMatcher<KSubstMode> {
    /// Matcher built from cvswrappers lines such as `*.gif -k 'b'`.
    ///
    /// Lines without a `-k` option or with a malformed mode are skipped.
    pub fn from_wrappers<S: AsRef<str>>(wrappers: &[S]) -> Self {
        let mut matcher = Self::new();
        for wrapper in wrappers {
            match parse_wrapper(wrapper.as_ref()) {
                Some((pattern, mode)) => matcher.register(pattern, mode),
                None => warn!("Skipping wrapper rule without keyword mode: {}", wrapper.as_ref()),
            }
        }
        matcher
    }
}

/// Rewrite `pattern` so globset treats everything but `*` and `?` literally
fn wildcard_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len() * 2);
    let mut previous = None;
    for c in pattern.chars() {
        match c {
            // `**` has a recursive meaning in globset
            '*' if previous == Some('*') => {}
            '*' | '?' => glob.push(c),
            c if c.is_alphanumeric() => glob.push(c),
            c => {
                glob.push('\\');
                glob.push(c);
            }
        }
        previous = Some(c);
    }
    glob
}

/// Split `pattern -k 'mode'` into its glob and keyword mode
pub fn parse_wrapper(wrapper: &str) -> Option<(&str, KSubstMode)> {
    let mut tokens = wrapper.split_whitespace();
    let pattern = tokens.next()?;
    if tokens.next()? != "-k" {
        return None;
    }

    let quoted = tokens.next()?;
    let letters = quoted
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .or_else(|| quoted.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')))?;
    if letters.is_empty() {
        return None;
    }
    Some((pattern, KSubstMode::from_letters(letters)))
}
