use crate::error::ParseError;

/// Tokenize a command line into words using shlex (POSIX word splitting).
///
/// Fails when quoting is unbalanced; the error names the quote that was
/// left open.
pub fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    match shlex::split(line) {
        Some(words) => Ok(words),
        None => Err(unbalanced_quoting(line).unwrap_or(ParseError::UnclosedDoubleQuote)),
    }
}

/// Find the quoting problem shlex would trip over, if any.
///
/// Walks the line with the same single/double quote and backslash rules
/// shlex applies and reports whatever state is still open at the end.
pub fn unbalanced_quoting(line: &str) -> Option<ParseError> {
    let (mut sq, mut dq, mut esc) = (false, false, false);

    for c in line.chars() {
        if esc {
            esc = false;
            continue;
        }
        if c == '\\' && !sq {
            esc = true;
            continue;
        }
        if c == '\'' && !dq {
            sq = !sq;
            continue;
        }
        if c == '"' && !sq {
            dq = !dq;
        }
    }

    if sq {
        Some(ParseError::UnclosedSingleQuote)
    } else if dq {
        Some(ParseError::UnclosedDoubleQuote)
    } else if esc {
        Some(ParseError::TrailingEscape)
    } else {
        None
    }
}

/// Split a line into its command word and the raw argument string.
///
/// The command word is the leading run of identifier characters
/// (`[A-Za-z0-9_-]`). A line starting with any other character yields its
/// whole first whitespace-delimited word. The argument string keeps its
/// original quoting so handlers can re-tokenize it themselves.
pub fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim();
    let ident_end = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(line.len());
    let end = if ident_end == 0 {
        line.find(char::is_whitespace).unwrap_or(line.len())
    } else {
        ident_end
    };
    (&line[..end], line[end..].trim())
}

/// Re-join tokens into a single argument string, quoting where needed.
pub fn join(tokens: &[String]) -> String {
    shlex::try_join(tokens.iter().map(String::as_str)).unwrap_or_else(|_| tokens.join(" "))
}
