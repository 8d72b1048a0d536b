//! Error types for the shell.
//!
//! Every variant except [`ShellError::Fatal`] is recoverable: the command loop
//! reports it on the error stream and reads the next line.

use std::io;

/// Unbalanced quoting or a dangling escape in a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unmatched single quotation mark (')")]
    UnclosedSingleQuote,

    #[error("unmatched double quotation mark (\")")]
    UnclosedDoubleQuote,

    #[error("trailing backslash with nothing to escape")]
    TrailingEscape,
}

impl ParseError {
    /// Message shown to the user when a line cannot be tokenized.
    pub fn user_message(&self) -> String {
        match self {
            ParseError::UnclosedSingleQuote => "Failed to parse your command, because there was an unmatched single quotation mark (').\n\
                 If you meant a literal ', escape it (\\') or wrap it in double quotes (\"'\").\n"
                .into(),
            ParseError::UnclosedDoubleQuote => "Failed to parse your command, because there was an unmatched double quotation mark (\").\n\
                 If you meant a literal \", escape it (\\\") or wrap it in single quotes ('\"').\n"
                .into(),
            ParseError::TrailingEscape => {
                "Failed to parse your command, because it ends with a backslash.\n".into()
            }
        }
    }
}

/// Failure while expanding history-bang tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubstitutionError {
    #[error("no previous command")]
    NoPreviousCommand,

    #[error("no first argument in previous command")]
    NoFirstArgument,
}

/// Failure while setting up output redirection.
#[derive(Debug, thiserror::Error)]
pub enum RedirectionError {
    #[error("No redirection target specified.")]
    MissingTarget,

    /// The target does not unquote to exactly one word.
    #[error("Ambiguous redirection target: {0}.")]
    AmbiguousTarget(String),

    #[error("Error processing your redirection target: {0}.")]
    Open(#[source] io::Error),
}

/// Errors produced by the shell and by command handlers.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Substitution(#[from] SubstitutionError),

    #[error(transparent)]
    Redirection(#[from] RedirectionError),

    #[error("unknown command: {0}")]
    CommandNotFound(String),

    /// A handler failed; the loop carries on.
    #[error("{0}")]
    Command(String),

    /// Unrecoverable; ends the session.
    #[error("fatal: {0}")]
    Fatal(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Whether this error ends the command loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Fatal(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ShellError>;
