//! Bash-style substitutions: `$NAME` variables and `!!`/`!$`/`!^`/`!*`
//! references to the previous command.
//!
//! Substitution happens on the raw line, before tokenization, so a
//! variable may expand to several words or to quoting.

use std::collections::BTreeMap;

use super::tokenize::tokenize;
use crate::error::SubstitutionError;

/// History-bang tokens that trigger last-command expansion.
pub const HISTORY_TOKENS: [&str; 4] = ["!!", "!$", "!^", "!*"];

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `name` is a valid variable name (`[A-Za-z0-9_]+`).
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_name_char)
}

/// Perform all substitutions on `line`.
///
/// An empty line is returned as is without looking at history.
pub fn substitute(
    line: &str,
    variables: &BTreeMap<String, String>,
    last_command: &str,
) -> Result<String, SubstitutionError> {
    if line.is_empty() {
        return Ok(String::new());
    }

    let line = expand_variables(line, variables);

    if HISTORY_TOKENS.iter().any(|t| line.contains(t)) {
        expand_history(&line, last_command)
    } else {
        Ok(line)
    }
}

/// Replace every `$NAME` whose name is registered.
///
/// At each `$` the longest registered name prefixing the following run of
/// name characters wins, so `$Pfoo` with only `P` set expands to the value
/// of `P` followed by `foo`. Replaced text is never scanned again.
pub fn expand_variables(line: &str, variables: &BTreeMap<String, String>) -> String {
    if variables.is_empty() || !line.contains('$') {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let run_len = after.find(|c: char| !is_name_char(c)).unwrap_or(after.len());
        let run = &after[..run_len];

        // Identifier chars are ASCII, so every byte offset in `run` is a boundary.
        let matched = (1..=run.len())
            .rev()
            .find_map(|n| variables.get(&run[..n]).map(|value| (n, value)));

        match matched {
            Some((n, value)) => {
                out.push_str(value);
                rest = &after[n..];
            }
            None => {
                out.push('$');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Replace history-bang tokens with parts of `last_command`.
///
/// A single left-to-right scan: text pulled in from the previous command is
/// not expanded again.
pub fn expand_history(line: &str, last_command: &str) -> Result<String, SubstitutionError> {
    if last_command.is_empty() {
        return Err(SubstitutionError::NoPreviousCommand);
    }

    let argv = tokenize(last_command).unwrap_or_else(|_| {
        last_command
            .split_whitespace()
            .map(String::from)
            .collect()
    });

    let mut out = String::with_capacity(line.len() + last_command.len());
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '!' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('!') => out.push_str(last_command),
            Some('$') => out.push_str(argv.last().map(String::as_str).unwrap_or("")),
            Some('^') => match argv.get(1) {
                Some(arg) => out.push_str(arg),
                None => return Err(SubstitutionError::NoFirstArgument),
            },
            Some('*') => out.push_str(&argv.get(1..).unwrap_or(&[]).join(" ")),
            _ => {
                out.push(c);
                continue;
            }
        }
        chars.next();
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAST: &str = "run app.package.info -a com.example.app";

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_line_is_noop() {
        // No previous command, but history is never consulted.
        assert_eq!(substitute("", &vars(&[("A", "1")]), "").unwrap(), "");
    }

    #[test]
    fn replaces_every_occurrence() {
        let v = vars(&[("P", "com.example.app")]);
        assert_eq!(
            substitute("run info -a $P; echo $P", &v, "").unwrap(),
            "run info -a com.example.app; echo com.example.app"
        );
    }

    #[test]
    fn unknown_variable_untouched() {
        let v = vars(&[("P", "x")]);
        assert_eq!(substitute("echo $Q $ cost", &v, "").unwrap(), "echo $Q $ cost");
    }

    #[test]
    fn longest_name_wins() {
        let v = vars(&[("P", "short"), ("PATH", "long")]);
        assert_eq!(expand_variables("$PATH $P $Pfoo", &v), "long short shortfoo");
    }

    #[test]
    fn values_are_not_rescanned() {
        let v = vars(&[("A", "$B"), ("B", "$A")]);
        assert_eq!(expand_variables("$A-$B", &v), "$B-$A");
    }

    #[test]
    fn multibyte_text_survives() {
        let v = vars(&[("X", "ü")]);
        assert_eq!(expand_variables("é$X€", &v), "éü€");
    }

    #[test]
    fn bang_bang() {
        assert_eq!(substitute("!!", &BTreeMap::new(), LAST).unwrap(), LAST);
    }

    #[test]
    fn bang_dollar() {
        assert_eq!(
            substitute("echo !$", &BTreeMap::new(), LAST).unwrap(),
            "echo com.example.app"
        );
    }

    #[test]
    fn bang_caret() {
        assert_eq!(
            substitute("echo !^", &BTreeMap::new(), LAST).unwrap(),
            "echo app.package.info"
        );
    }

    #[test]
    fn bang_star() {
        assert_eq!(
            substitute("echo !*", &BTreeMap::new(), LAST).unwrap(),
            "echo app.package.info -a com.example.app"
        );
    }

    #[test]
    fn bang_caret_without_argument() {
        assert_eq!(
            substitute("echo !^", &BTreeMap::new(), "list"),
            Err(SubstitutionError::NoFirstArgument)
        );
    }

    #[test]
    fn bang_star_without_arguments_is_empty() {
        assert_eq!(substitute("echo !*", &BTreeMap::new(), "list").unwrap(), "echo ");
    }

    #[test]
    fn no_previous_command() {
        assert_eq!(
            substitute("!!", &BTreeMap::new(), ""),
            Err(SubstitutionError::NoPreviousCommand)
        );
    }

    #[test]
    fn lone_bang_is_kept() {
        assert_eq!(substitute("echo hi!", &BTreeMap::new(), "").unwrap(), "echo hi!");
    }

    #[test]
    fn history_text_not_reexpanded() {
        assert_eq!(expand_history("!!", "echo !$").unwrap(), "echo !$");
    }

    #[test]
    fn variables_expand_before_history() {
        let v = vars(&[("BANG", "!!")]);
        assert_eq!(substitute("$BANG", &v, "list").unwrap(), "list");
    }

    #[test]
    fn valid_names() {
        assert!(is_valid_name("P_1"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("a-b"));
    }
}
