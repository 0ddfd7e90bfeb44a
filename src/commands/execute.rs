//! Execution of one command invocation
//!
//! An invocation moves through fixed stages:
//!
//! ```text
//! Idle -> SendingOptions -> BuildingRequest -> SendingArguments
//!      -> AwaitingResponse -> Finished(success | failure)
//! ```
//!
//! Preconditions are checked while idle, so a broken contract never puts a
//! byte on the wire. Cancellation is checked after the options and again
//! after the request was built; a canceled invocation skips the finished
//! hook. Lines already written are never taken back.

use super::{Command, CommandOutcome, Invocation, RequestContext};
use crate::response::{OutputListener, ResponseHandler, ServerStatus};
use crate::session::{Session, CURRENT_LOCAL_FOLDER};
use crate::types::{CvsError, Resource};
use crate::workspace::ResourceModel;
use std::borrow::Cow;
use std::fmt::Write as _;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    SendingOptions,
    BuildingRequest,
    SendingArguments,
    AwaitingResponse,
    Finished { success: bool },
}

struct Execution<'c> {
    command: &'c dyn Command,
    stage: Stage,
}

impl<'c> Execution<'c> {
    fn new(command: &'c dyn Command) -> Self {
        Self {
            command,
            stage: Stage::Idle,
        }
    }

    fn advance(&mut self, next: Stage) {
        debug!("{}: {:?} -> {:?}", self.command.name(), self.stage, next);
        self.stage = next;
    }
}

/// Run `command` for `invocation`.
///
/// # Errors
/// * Precondition failures are returned before anything is sent
/// * `CvsError::Canceled` when cancellation was requested; finished is skipped
/// * Resource model, transport and server failures run the finished hook
///   with `success = false` and are then returned, unless the command maps
///   the server failure onto an outcome of its own
pub fn run_command(
    command: &dyn Command,
    session: &mut Session<'_>,
    model: &mut dyn ResourceModel,
    responses: &mut dyn ResponseHandler,
    listener: &mut dyn OutputListener,
    invocation: &Invocation,
) -> Result<CommandOutcome, CvsError> {
    let mut execution = Execution::new(command);

    if !model.folder_exists(invocation.root) {
        return Err(CvsError::Precondition(format!(
            "command root '{}' does not exist",
            model.folder_name(invocation.root)
        )));
    }
    let resources = command.work_resources(&*model, invocation);
    command.check_preconditions(&*model, invocation, &resources)?;

    info!("{}", invocation_line(command, &*model, invocation));

    let status = send_requests(&mut execution, session, &*model, invocation, &resources)
        .and_then(|()| {
            execution.advance(Stage::AwaitingResponse);
            responses.handle_responses(
                command.request_id(),
                invocation.root,
                &mut *model,
                &mut *listener,
            )
        });

    match status {
        Ok(ServerStatus::Ok) => {
            execution.advance(Stage::Finished { success: true });
            command.on_finished(model, invocation, &resources, true)?;
            Ok(CommandOutcome::Completed)
        }
        Ok(ServerStatus::Error { message }) => {
            execution.advance(Stage::Finished { success: false });
            finish_failed(command, model, invocation, &resources);
            command.classify_failure(CvsError::Server {
                command: command.name().to_string(),
                message,
            })
        }
        Err(e) if e.is_cancellation() || e.is_precondition() => Err(e),
        Err(e) => {
            execution.advance(Stage::Finished { success: false });
            finish_failed(command, model, invocation, &resources);
            Err(e)
        }
    }
}

fn send_requests(
    execution: &mut Execution<'_>,
    session: &mut Session<'_>,
    model: &dyn ResourceModel,
    invocation: &Invocation,
    resources: &[Resource],
) -> Result<(), CvsError> {
    let command = execution.command;

    execution.advance(Stage::SendingOptions);
    for option in invocation.sendable_global_options() {
        session.send_global_option(option.flag())?;
    }
    for option in &invocation.local_options {
        session.send_argument(option.option())?;
        if let Some(argument) = option.argument() {
            session.send_argument(argument)?;
        }
    }
    invocation.cancellation.check()?;

    execution.advance(Stage::BuildingRequest);
    let mut ctx = RequestContext {
        session: &mut *session,
        model,
        invocation,
        resources,
    };
    command.build_request(&mut ctx)?;
    command.send_working_directory(session, model, invocation.root)?;
    invocation.cancellation.check()?;

    execution.advance(Stage::SendingArguments);
    for argument in &invocation.arguments {
        session.send_argument(&escape_argument(argument))?;
    }
    session.send_request(command.request_id())
}

/// The failure already decides the result; a failing hook is only logged.
fn finish_failed(
    command: &dyn Command,
    model: &mut dyn ResourceModel,
    invocation: &Invocation,
    resources: &[Resource],
) {
    if let Err(e) = command.on_finished(model, invocation, resources, false) {
        warn!("{}: cleanup after failure failed: {}", command.name(), e);
    }
}

/// Arguments starting with `-` would be read as options by the server
fn escape_argument(argument: &str) -> Cow<'_, str> {
    if argument.starts_with('-') {
        Cow::Owned(format!("./{argument}"))
    } else {
        Cow::Borrowed(argument)
    }
}

/// Command line equivalent of an invocation, e.g. `cvs -n update -P "proj/src"`
pub fn invocation_line(
    command: &dyn Command,
    model: &dyn ResourceModel,
    invocation: &Invocation,
) -> String {
    let mut line = String::from("cvs");
    for option in invocation.sendable_global_options() {
        let _ = write!(line, " {}", option);
    }
    let _ = write!(line, " {}", command.request_id());
    for option in &invocation.local_options {
        let _ = write!(line, " {}", option);
    }

    let root_path = model.folder_name(invocation.root);
    for argument in invocation.arguments.iter().filter(|a| !a.is_empty()) {
        if argument == CURRENT_LOCAL_FOLDER {
            let _ = write!(line, " \"{}\"", root_path);
        } else {
            let _ = write!(line, " \"{}/{}\"", root_path, argument);
        }
    }
    line
}
