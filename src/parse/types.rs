//! Types produced by the line parser and consumed by the command loop.

use std::path::PathBuf;

/// How a redirection target is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// `>`: truncate the target
    Overwrite,
    /// `>>`: append to the target
    Append,
}

impl RedirectMode {
    /// The operator's shell syntax.
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectMode::Overwrite => ">",
            RedirectMode::Append => ">>",
        }
    }
}

/// An output redirection split off a command line.
///
/// `command` is the line with the operator and target removed; it is what
/// gets dispatched (and recorded as the last command).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    /// Command text before the redirection operator, trimmed.
    pub command: String,
    /// File the output is duplicated into.
    pub target: PathBuf,
    pub mode: RedirectMode,
}
