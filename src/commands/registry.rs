use super::{
    run_command, Add, Checkout, Command, CommandOutcome, Commit, Diff, FileStructureCommand,
    Import, Invocation, RemoteCommand, Tag, Update, Version,
};
use crate::config::ClientConfig;
use crate::response::{OutputListener, ResponseHandler};
use crate::session::Session;
use crate::types::CvsError;
use crate::workspace::ResourceModel;
use std::collections::BTreeMap;

/// Commands by public name.
///
/// Read-only once built. One registry may serve many invocations, but
/// invocations sharing a connection must not overlap.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Box<dyn Command>>,
}

impl CommandRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in command
    pub fn with_defaults() -> Self {
        Self::from_config(&ClientConfig::default())
    }

    /// Built-in commands, with import seeded from the configured ignore and
    /// wrapper rules
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Add);
        registry.register(Checkout);
        registry.register(Commit);
        registry.register(Diff);
        registry.register(
            Import::new()
                .with_ignores(config.ignore.iter().cloned())
                .with_wrappers(config.wrappers.iter().cloned()),
        );
        registry.register(Tag);
        registry.register(Update);
        registry.register(Version);
        for command in [
            FileStructureCommand::ADMIN,
            FileStructureCommand::ANNOTATE,
            FileStructureCommand::EDITORS,
            FileStructureCommand::LOG,
            FileStructureCommand::REMOVE,
            FileStructureCommand::STATUS,
        ] {
            registry.register(command);
        }
        registry.register(RemoteCommand::RDIFF);
        registry.register(RemoteCommand::RTAG);
        registry
    }

    /// Add a command under its name.
    ///
    /// # Panics
    /// When a command with the same name is already registered.
    pub fn register<C: Command + 'static>(&mut self, command: C) {
        let name = command.name();
        let previous = self.commands.insert(name, Box::new(command));
        assert!(previous.is_none(), "command registered twice: {name}");
    }

    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|command| command.as_ref())
    }

    /// Registered names in alphabetical order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }

    /// Look up `name` and run it
    pub fn execute(
        &self,
        name: &str,
        session: &mut Session<'_>,
        model: &mut dyn ResourceModel,
        responses: &mut dyn ResponseHandler,
        listener: &mut dyn OutputListener,
        invocation: &Invocation,
    ) -> Result<CommandOutcome, CvsError> {
        let command = self
            .get(name)
            .ok_or_else(|| CvsError::UnknownCommand(name.to_string()))?;
        run_command(command, session, model, responses, listener, invocation)
    }
}
