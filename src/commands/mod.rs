//! Command handlers and the registry the shell dispatches through.
//!
//! Each handler implements [`Command`] and is registered by name. Hosts add
//! their own domain commands next to the built-ins.

/// `exit` and `EOF`: stop the command loop.
pub mod exit;
/// `help`: list commands and aliases, or show one command's usage.
pub mod help;
/// `echo`, `env`, `set`, `unset`: variable management.
pub mod vars;

use std::collections::HashMap;
use std::io::Write;

use crate::editor::CompletionRequest;
use crate::error::Result;
use crate::session::Session;

/// What the loop does after a command returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Everything a handler can touch while it runs.
pub struct Invocation<'a> {
    pub session: &'a mut Session,
    /// Command output; a tee when the line was redirected.
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
    pub registry: &'a CommandRegistry,
}

/// A single executable command.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "set NAME=VALUE \[NAME=VALUE ...\]").
    fn usage(&self) -> &str;

    /// Run the command with its argument string.
    fn execute(&self, args: &str, inv: &mut Invocation<'_>) -> Result<Flow>;

    /// Completion candidates for an argument of this command.
    fn complete(&self, _req: &CompletionRequest<'_>) -> Vec<String> {
        Vec::new()
    }
}

/// A command backed by a closure.
pub struct FnCommand<F> {
    name: String,
    description: String,
    usage: String,
    run: F,
}

impl<F> FnCommand<F>
where
    F: Fn(&str, &mut Invocation<'_>) -> Result<Flow>,
{
    pub fn new(name: impl Into<String>, description: impl Into<String>, run: F) -> Self {
        let name = name.into();
        Self {
            usage: name.clone(),
            name,
            description: description.into(),
            run,
        }
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }
}

impl<F> Command for FnCommand<F>
where
    F: Fn(&str, &mut Invocation<'_>) -> Result<Flow>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn usage(&self) -> &str {
        &self.usage
    }

    fn execute(&self, args: &str, inv: &mut Invocation<'_>) -> Result<Flow> {
        (self.run)(args, inv)
    }
}

/// Registry of available commands, keyed by name.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in commands.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_builtins(&mut registry);
        registry
    }

    /// Register a command. Replaces any existing command with the same name.
    pub fn register(&mut self, command: Box<dyn Command>) {
        self.commands.insert(command.name().to_string(), command);
    }

    /// Register a closure as a command.
    pub fn register_fn<F>(&mut self, name: &str, description: &str, run: F)
    where
        F: Fn(&str, &mut Invocation<'_>) -> Result<Flow> + 'static,
    {
        self.register(Box::new(FnCommand::new(name, description, run)));
    }

    /// Look up a command by exact name.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|b| b.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Register all built-in commands into a registry.
pub fn register_builtins(registry: &mut CommandRegistry) {
    registry.register(Box::new(vars::EchoCommand));
    registry.register(Box::new(vars::EnvCommand));
    registry.register(Box::new(vars::SetCommand));
    registry.register(Box::new(vars::UnsetCommand));
    registry.register(Box::new(help::HelpCommand));
    registry.register(Box::new(exit::ExitCommand));
    registry.register(Box::new(exit::EofCommand));
}
