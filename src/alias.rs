//! Command aliases: a leading word mapped to a registered command name.

use std::collections::BTreeMap;

/// Alias token → target command name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alias. Replaces any existing alias with the same name.
    pub fn insert(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.aliases.insert(alias.into(), target.into());
    }

    /// Look up the target command for an alias.
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, t)| (a.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AliasTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = AliasTable::new();
        for (alias, target) in iter {
            table.insert(alias, target);
        }
        table
    }
}

/// Resolve the first token of a command line through the alias table.
///
/// Returns the target command name, or `None` when the first token is not
/// an alias (or there are no tokens) and dispatch should use the literal
/// command name instead.
pub fn resolve<'a>(tokens: &[String], aliases: &'a AliasTable) -> Option<&'a str> {
    tokens.first().and_then(|first| aliases.get(first))
}
