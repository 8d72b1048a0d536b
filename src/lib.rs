//! cmdloop: an embeddable, line-oriented interactive command shell.
//!
//! Each input line goes through one synchronous cycle: variable and
//! history-bang substitution, tokenization, optional output redirection
//! to a file (tee), alias resolution, and dispatch to a registered
//! [`Command`](commands::Command). Redirection is always undone before the
//! next line is read.
//!
//! # Architecture
//!
//! - **[`shell`]**: the command loop and its per-line cycle.
//! - **[`parse`]**: shlex tokenizer, substitution engine, redirection planning.
//! - **[`commands`]**: command trait, registry, and the built-in commands.
//! - **[`session`]**: variables, aliases, the last command, the context stack.
//! - **[`context`]**: nested completion/history contexts over a line editor.
//! - **[`editor`]**: the line-editor capability (rustyline or in-memory).
//! - **[`config`]**: embedded defaults + user overlay merge.
//! - **[`logging`]**: file logging to `~/.local/share/cmdloop/shell.log`.

/// Alias table and resolution.
pub mod alias;
/// Command trait, registry, and built-in commands.
pub mod commands;
/// Tab completion for command names, redirection targets, and arguments.
pub mod complete;
/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Completion/history context stack.
pub mod context;
/// Line-editor trait with terminal and in-memory implementations.
pub mod editor;
/// Error types.
pub mod error;
/// File-based logging setup.
pub mod logging;
/// Output redirection (tee) and capture buffers.
pub mod output;
/// Tokenizer, substitution, and redirection parsing.
pub mod parse;
/// Per-session shell state.
pub mod session;
/// The command loop.
pub mod shell;

pub use commands::{Command, CommandRegistry, Flow, Invocation};
pub use error::{Result, ShellError};
pub use shell::Shell;

/// What a scripted run wrote to its output and error streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub out: String,
    pub err: String,
}

/// Run `script` (one command per line) through a shell with the built-in
/// commands and default configuration, without a prompt.
///
/// This is the main entry point for tests and simple usage.
pub fn run_script(script: &str) -> Transcript {
    run_script_with(CommandRegistry::with_builtins(), script)
}

/// Like [`run_script`], with a caller-supplied registry.
pub fn run_script_with(registry: CommandRegistry, script: &str) -> Transcript {
    let out = output::SharedBuffer::new();
    let err = output::SharedBuffer::new();
    let mut shell = Shell::new(registry, &config::Config::default_config())
        .with_prompt("")
        .with_input(std::io::Cursor::new(script.to_string()))
        .with_output(out.clone())
        .with_error(err.clone());
    // Fatal errors are already on the error stream.
    let _ = shell.run();
    Transcript {
        out: out.contents(),
        err: err.contents(),
    }
}
