//! Command line surface

use super::ClientConfig;
use crate::commands::Invocation;
use crate::types::{CvsError, FolderId, GlobalOption, KSubstMode, LocalOption};
use camino::Utf8PathBuf;
use clap::Parser;

/// Build the request stream of a CVS command for a working copy
#[derive(Parser, Debug, Clone)]
#[command(name = "cvsreq", author, version, about)]
pub struct Cli {
    /// Do not change any files (-n)
    #[arg(short = 'n')]
    pub do_not_change: bool,

    /// Be somewhat quiet (-q)
    #[arg(short = 'q')]
    pub quiet: bool,

    /// Be very quiet (-Q)
    #[arg(short = 'Q')]
    pub silent: bool,

    /// Trace execution on the server (-t)
    #[arg(short = 't')]
    pub trace: bool,

    /// Do not log in the command history (-l)
    #[arg(short = 'l')]
    pub no_log: bool,

    /// Make new working files read-only (-r)
    #[arg(short = 'r')]
    pub read_only: bool,

    /// Repository root (CVSROOT)
    #[arg(short = 'd', value_name = "CVSROOT")]
    pub root: Option<String>,

    /// Working copy to run in
    #[arg(short = 'C', long = "directory", value_name = "DIR", default_value = ".")]
    pub directory: Utf8PathBuf,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Keyword mode forced on every file (e.g. `b` or `-kb`)
    #[arg(short = 'k', value_name = "MODE")]
    pub keyword_mode: Option<String>,

    /// Log protocol decisions to stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Command to run (update, commit, add, ...)
    pub command: String,

    /// Command options followed by arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Everything one run of the binary needs, validated
#[derive(Debug, Clone)]
pub struct CommandLine {
    pub config: ClientConfig,
    pub command: String,
    pub directory: Utf8PathBuf,
    pub global_options: Vec<GlobalOption>,
    pub local_options: Vec<LocalOption>,
    pub arguments: Vec<String>,
    pub keyword_override: Option<KSubstMode>,
    pub verbose: bool,
}

impl CommandLine {
    /// Invocation of the parsed command rooted at `root`
    pub fn invocation(&self, root: FolderId) -> Invocation {
        let mut invocation = Invocation::new(root)
            .global_options(self.global_options.iter().cloned().map(Some))
            .arguments(self.arguments.iter().cloned())
            .keyword_override(self.keyword_override.clone());
        invocation.local_options = self.local_options.clone();
        invocation
    }
}

impl TryFrom<Cli> for CommandLine {
    type Error = CvsError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let mut config = match &cli.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };
        if cli.root.is_some() {
            config.repository_root = cli.root.clone();
        }
        config.validate()?;

        let flags = [
            (cli.do_not_change, GlobalOption::DO_NOT_CHANGE),
            (cli.quiet, GlobalOption::PARTLY_QUIET),
            (cli.silent, GlobalOption::SILENT),
            (cli.trace, GlobalOption::TRACE_EXECUTION),
            (cli.no_log, GlobalOption::DO_NOT_LOG),
            (cli.read_only, GlobalOption::MAKE_READ_ONLY),
        ];
        let global_options = flags
            .into_iter()
            .filter_map(|(set, option)| set.then_some(option))
            .collect();

        let keyword_override = match cli.keyword_mode.as_deref() {
            None => None,
            Some("") => {
                return Err(CvsError::Config("keyword mode cannot be empty".to_string()));
            }
            Some(mode) if mode.starts_with("-k") => Some(KSubstMode::from_flag(mode)),
            Some(letters) => Some(KSubstMode::from_letters(letters)),
        };

        let (local_options, arguments) = split_local_options(&cli.command, &cli.args);

        Ok(CommandLine {
            config,
            command: cli.command,
            directory: cli.directory,
            global_options,
            local_options,
            arguments,
            keyword_override,
            verbose: cli.verbose,
        })
    }
}

/// Flags that consume the following word as their value
fn takes_value(command: &str, flag: &str) -> bool {
    match flag {
        "-m" | "-r" | "-D" | "-k" | "-W" | "-I" | "-j" | "-b" => true,
        // `update -d` creates directories, `checkout -d` names one
        "-d" => command == "checkout" || command == "co",
        _ => false,
    }
}

/// Split the words after the command name into local options and arguments.
///
/// Options come first; the first word not starting with `-`, or a `--`,
/// ends them. A value-taking flag consumes the next word.
pub fn split_local_options(command: &str, words: &[String]) -> (Vec<LocalOption>, Vec<String>) {
    let mut options = Vec::new();
    let mut iter = words.iter();

    while let Some(word) = iter.as_slice().first() {
        if word == "--" {
            iter.next();
            break;
        }
        if !word.starts_with('-') || word == "-" {
            break;
        }
        iter.next();

        if takes_value(command, word) {
            match iter.next() {
                Some(value) => options.push(LocalOption::with_argument(word.as_str(), value.as_str())),
                None => options.push(LocalOption::new(word.as_str())),
            }
        } else {
            options.push(LocalOption::new(word.as_str()));
        }
    }

    (options, iter.cloned().collect())
}
