//! Commands and their execution
//!
//! Every CVS command is a [`Command`]: a name, the verb it sends, a hook that
//! describes the relevant local state, and an optional hook run once the
//! server has answered. [`run_command`] drives one invocation through the
//! request stages; [`CommandRegistry`] maps names to commands.

mod add;
mod checkout;
mod commit;
mod diff;
mod execute;
mod import;
mod prune;
mod registry;
mod remote;
mod simple;
mod tag;
mod update;

pub use add::Add;
pub use checkout::Checkout;
pub use commit::Commit;
pub use diff::Diff;
pub use execute::{invocation_line, run_command};
pub use import::Import;
pub use prune::prune_empty_folders;
pub use registry::CommandRegistry;
pub use remote::RemoteCommand;
pub use simple::{FileStructureCommand, Version};
pub use tag::Tag;
pub use update::Update;

use crate::session::{Session, CURRENT_LOCAL_FOLDER};
use crate::types::{CvsError, FolderId, GlobalOption, KSubstMode, LocalOption, Resource};
use crate::visitor::{FileStructureVisitor, ResourceVisitor};
use crate::workspace::ResourceModel;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Successful end of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Completed,
    /// `diff` found differences; the server reports these as a failure
    DifferencesFound,
}

/// Cooperative cancellation flag shared with whoever may cancel
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(CvsError::Canceled)` once cancellation was requested
    pub fn check(&self) -> Result<(), CvsError> {
        if self.is_canceled() {
            Err(CvsError::Canceled)
        } else {
            Ok(())
        }
    }
}

/// Parameters of one command execution
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Holes are skipped, never sent as empty options
    pub global_options: Vec<Option<GlobalOption>>,
    pub local_options: Vec<LocalOption>,
    pub arguments: Vec<String>,
    pub root: FolderId,
    /// Keyword mode forced on every file the command sends
    pub keyword_override: Option<KSubstMode>,
    pub cancellation: Cancellation,
}

impl Invocation {
    pub fn new(root: FolderId) -> Self {
        Self {
            global_options: Vec::new(),
            local_options: Vec::new(),
            arguments: Vec::new(),
            root,
            keyword_override: None,
            cancellation: Cancellation::new(),
        }
    }

    pub fn global_option(mut self, option: GlobalOption) -> Self {
        self.global_options.push(Some(option));
        self
    }

    pub fn global_options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = Option<GlobalOption>>,
    {
        self.global_options.extend(options);
        self
    }

    pub fn local_option(mut self, option: LocalOption) -> Self {
        self.local_options.push(option);
        self
    }

    pub fn argument(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    pub fn arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(arguments.into_iter().map(Into::into));
        self
    }

    pub fn keyword_override(mut self, mode: Option<KSubstMode>) -> Self {
        self.keyword_override = mode;
        self
    }

    pub fn cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn has_local_option(&self, option: &LocalOption) -> bool {
        option.is_element_of(&self.local_options)
    }

    /// Global options that actually go on the wire, in order
    pub fn sendable_global_options(&self) -> impl Iterator<Item = &GlobalOption> {
        self.global_options
            .iter()
            .flatten()
            .filter(|option| option.is_sendable())
    }
}

/// What the request-building hook works with
pub struct RequestContext<'a, 'w> {
    pub session: &'a mut Session<'w>,
    pub model: &'a dyn ResourceModel,
    pub invocation: &'a Invocation,
    /// Resources named by the arguments
    pub resources: &'a [Resource],
}

/// One CVS command.
///
/// Implementations are stateless; everything an execution needs is passed
/// in, so one instance serves every invocation.
pub trait Command: Send + Sync {
    /// Public name the command is registered under
    fn name(&self) -> &'static str;

    /// Verb sent to the server
    fn request_id(&self) -> &'static str {
        self.name()
    }

    /// Resources the arguments stand for; the root when there are none
    fn work_resources(&self, model: &dyn ResourceModel, invocation: &Invocation) -> Vec<Resource> {
        resolve_arguments(model, invocation.root, &invocation.arguments)
    }

    /// Contract checks run before anything is sent
    fn check_preconditions(
        &self,
        _model: &dyn ResourceModel,
        _invocation: &Invocation,
        _resources: &[Resource],
    ) -> Result<(), CvsError> {
        Ok(())
    }

    /// Describe the local state relevant to the command
    fn build_request(&self, ctx: &mut RequestContext<'_, '_>) -> Result<(), CvsError>;

    /// Announce the folder the command runs in
    fn send_working_directory(
        &self,
        session: &mut Session<'_>,
        model: &dyn ResourceModel,
        root: FolderId,
    ) -> Result<(), CvsError> {
        send_local_root_directory(session, model, root)
    }

    /// Bookkeeping once the server has answered
    fn on_finished(
        &self,
        _model: &mut dyn ResourceModel,
        _invocation: &Invocation,
        _resources: &[Resource],
        _success: bool,
    ) -> Result<(), CvsError> {
        Ok(())
    }

    /// Map a server-reported failure onto the command's outcome
    fn classify_failure(&self, error: CvsError) -> Result<CommandOutcome, CvsError> {
        Err(error)
    }
}

/// Resolve argument paths below `root`.
///
/// Arguments that name nothing locally are still sent to the server, they
/// just contribute no local state.
pub fn resolve_arguments(
    model: &dyn ResourceModel,
    root: FolderId,
    arguments: &[String],
) -> Vec<Resource> {
    if arguments.is_empty() {
        return vec![Resource::Folder(root)];
    }
    arguments
        .iter()
        .filter_map(|argument| {
            let resource = model.resolve(root, argument);
            if resource.is_none() {
                warn!("Argument does not name a local resource: {}", argument);
            }
            resource
        })
        .collect()
}

/// Fail unless the argument count lies within `min..=max`
pub fn require_arguments(
    command: &str,
    arguments: &[String],
    min: usize,
    max: Option<usize>,
) -> Result<(), CvsError> {
    let count = arguments.len();
    let too_many = max.is_some_and(|max| count > max);
    if count >= min && !too_many {
        return Ok(());
    }

    let expected = match max {
        Some(max) if max == min => format!("exactly {min}"),
        Some(max) => format!("{min} to {max}"),
        None => format!("at least {min}"),
    };
    Err(CvsError::Precondition(format!(
        "{command} takes {expected} argument(s), got {count}"
    )))
}

/// Every existing folder among the resources (or holding a file resource)
/// must be under version control.
pub fn check_resources_managed(
    model: &dyn ResourceModel,
    resources: &[Resource],
) -> Result<(), CvsError> {
    for &resource in resources {
        let folder = match resource {
            Resource::Folder(folder) => folder,
            Resource::File(file) => model.file_parent(file),
        };
        if !model.is_cvs_folder(folder) && model.folder_exists(folder) {
            return Err(CvsError::NotManaged {
                name: model.folder_name(folder).to_string(),
            });
        }
    }
    Ok(())
}

/// Generic traversal shared by the sync-style commands
pub fn send_file_structure(
    ctx: &mut RequestContext<'_, '_>,
    modified_only: bool,
    send_empty_folders: bool,
) -> Result<(), CvsError> {
    FileStructureVisitor::new(&mut *ctx.session, ctx.model, ctx.invocation.root)
        .modified_only(modified_only)
        .send_empty_folders(send_empty_folders)
        .keyword_mode(ctx.invocation.keyword_override.clone())
        .visit(ctx.resources)
}

/// `Directory .` with the root's repository path, or a constructed root
/// directory when the root is not under version control
pub fn send_local_root_directory(
    session: &mut Session<'_>,
    model: &dyn ResourceModel,
    root: FolderId,
) -> Result<(), CvsError> {
    match model.folder_sync(root) {
        Some(info) => session.send_directory(CURRENT_LOCAL_FOLDER, &info.remote_location()),
        None => session.send_constructed_root_directory(),
    }
}
