use anyhow::Context;
use clap::Parser;
use cvsreq::config::{Cli, CommandLine};
use cvsreq::response::{CannedResponses, TracingListener};
use cvsreq::workspace::scan_working_copy;
use cvsreq::{CommandOutcome, CommandRegistry, ResourceModel, Session};
use std::io;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Convert CLI args to a validated command line
    let line = CommandLine::try_from(cli)?;
    info!("cvsreq v{}", cvsreq::VERSION);

    let directory = line
        .directory
        .canonicalize_utf8()
        .with_context(|| format!("Cannot open working copy {}", line.directory))?;
    let mut working_copy = scan_working_copy(&directory, &line.config)?;

    let repository_root = line
        .config
        .repository_root
        .clone()
        .or_else(|| {
            working_copy
                .folder_sync(working_copy.root())
                .map(|info| info.root.clone())
        })
        .context("No repository root: pass -d CVSROOT or run inside a checked-out folder")?;

    let registry = CommandRegistry::from_config(&line.config);
    let invocation = line.invocation(working_copy.root());

    // The request stream goes to stdout; nothing answers it, so every
    // command is taken to have succeeded.
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut session = Session::new(&mut out, repository_root);
    if let Some(requests) = &line.config.valid_requests {
        session = session.with_valid_requests(requests.iter().cloned());
    }

    let outcome = registry.execute(
        &line.command,
        &mut session,
        &mut working_copy,
        &mut CannedResponses::ok(),
        &mut TracingListener,
        &invocation,
    )?;

    if outcome == CommandOutcome::DifferencesFound {
        eprintln!("Differences found");
    }

    Ok(())
}
