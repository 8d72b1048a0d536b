//! Per-session shell state: variables, aliases, the last command, and the
//! completion/history context stack.

use std::collections::BTreeMap;

use crate::alias::AliasTable;
use crate::context::ContextStack;
use crate::error::{Result, ShellError, SubstitutionError};
use crate::parse;

/// State shared by every stage of the command loop and by command handlers.
pub struct Session {
    variables: BTreeMap<String, String>,
    aliases: AliasTable,
    last_command: String,
    contexts: ContextStack,
}

impl Session {
    pub fn new(aliases: AliasTable, contexts: ContextStack) -> Self {
        Self {
            variables: BTreeMap::new(),
            aliases,
            last_command: String::new(),
            contexts,
        }
    }

    // -- Variable API --

    /// Set a variable. Names must match `[A-Za-z0-9_]+`.
    pub fn set_variable(&mut self, name: &str, value: &str) -> Result<()> {
        if !parse::is_valid_name(name) {
            return Err(ShellError::Command(format!(
                "invalid variable name: {name:?}"
            )));
        }
        self.variables.insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Remove a variable, returning its previous value.
    pub fn unset_variable(&mut self, name: &str) -> Option<String> {
        self.variables.remove(name)
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// All variables, sorted by name.
    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    // -- Alias API --

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    // -- Last command --

    /// The most recently dispatched line; empty before the first one.
    pub fn last_command(&self) -> &str {
        &self.last_command
    }

    pub(crate) fn record(&mut self, line: &str) {
        self.last_command.clear();
        self.last_command.push_str(line);
    }

    // -- Contexts --

    pub fn contexts(&self) -> &ContextStack {
        &self.contexts
    }

    pub fn contexts_mut(&mut self) -> &mut ContextStack {
        &mut self.contexts
    }

    /// Expand variables and history-bang references in `line`.
    pub fn substitute(&self, line: &str) -> std::result::Result<String, SubstitutionError> {
        parse::substitute(line, &self.variables, &self.last_command)
    }
}
