use std::path::PathBuf;

use super::types::{RedirectMode, Redirection};
use crate::error::RedirectionError;

/// Whether the tokenized line contains a standalone `>` or `>>` word.
pub fn has_redirection_token(tokens: &[String]) -> bool {
    tokens.iter().any(|t| t == ">" || t == ">>")
}

/// Byte offset and length of the last `>` run outside quotes.
///
/// A run of two characters is `>>`. Longer runs keep only their final two.
fn last_operator(line: &str) -> Option<(usize, usize)> {
    let bytes = line.as_bytes();
    let mut found = None;
    let mut i = 0;
    let (mut sq, mut dq, mut esc) = (false, false, false);

    while i < bytes.len() {
        let c = bytes[i];

        if esc {
            esc = false;
            i += 1;
            continue;
        }
        if c == b'\\' && !sq {
            esc = true;
            i += 1;
            continue;
        }
        if c == b'\'' && !dq {
            sq = !sq;
            i += 1;
            continue;
        }
        if c == b'"' && !sq {
            dq = !dq;
            i += 1;
            continue;
        }
        if sq || dq {
            i += 1;
            continue;
        }

        if c == b'>' {
            let start = i;
            while i < bytes.len() && bytes[i] == b'>' {
                i += 1;
            }
            let run = i - start;
            let len = run.min(2);
            found = Some((i - len, len));
            continue;
        }

        i += 1;
    }

    found
}

/// Split an output redirection off a substituted line.
///
/// `tokens` is the tokenized form of `line`. Returns `Ok(None)` when no
/// standalone `>`/`>>` token is present. Otherwise the line is split at
/// the last operator: `>>` appends, `>` overwrites. The target is unquoted
/// and a leading `~` is expanded. A blank target, or one that is not a
/// single word, is an error and the command must not run.
pub fn plan(line: &str, tokens: &[String]) -> Result<Option<Redirection>, RedirectionError> {
    if !has_redirection_token(tokens) {
        return Ok(None);
    }
    let Some((pos, len)) = last_operator(line) else {
        return Ok(None);
    };

    let raw = line[pos + len..].trim();
    if raw.is_empty() {
        return Err(RedirectionError::MissingTarget);
    }
    let target = match shlex::split(raw).as_deref() {
        Some([word]) if !word.is_empty() => shellexpand::tilde(word).into_owned(),
        _ => return Err(RedirectionError::AmbiguousTarget(raw.to_string())),
    };

    let mode = if len == 2 {
        RedirectMode::Append
    } else {
        RedirectMode::Overwrite
    };

    Ok(Some(Redirection {
        command: line[..pos].trim().to_string(),
        target: PathBuf::from(target),
        mode,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::tokenize;

    fn plan_for(line: &str) -> Result<Option<Redirection>, RedirectionError> {
        plan(line, &tokenize(line).unwrap())
    }

    #[test]
    fn no_redirection() {
        assert_eq!(plan_for("foo bar").unwrap(), None);
    }

    #[test]
    fn overwrite() {
        let r = plan_for("foo bar > out.txt").unwrap().unwrap();
        assert_eq!(r.command, "foo bar");
        assert_eq!(r.target, PathBuf::from("out.txt"));
        assert_eq!(r.mode, RedirectMode::Overwrite);
    }

    #[test]
    fn append() {
        let r = plan_for("foo bar >> out.txt").unwrap().unwrap();
        assert_eq!(r.command, "foo bar");
        assert_eq!(r.target, PathBuf::from("out.txt"));
        assert_eq!(r.mode, RedirectMode::Append);
    }

    #[test]
    fn missing_target() {
        assert!(matches!(
            plan_for("foo bar >"),
            Err(RedirectionError::MissingTarget)
        ));
    }

    #[test]
    fn missing_target_append() {
        assert!(matches!(
            plan_for("foo bar >>   "),
            Err(RedirectionError::MissingTarget)
        ));
    }

    #[test]
    fn splits_at_last_operator() {
        let r = plan_for("foo > a > b").unwrap().unwrap();
        assert_eq!(r.command, "foo > a");
        assert_eq!(r.target, PathBuf::from("b"));
    }

    #[test]
    fn quoted_operator_is_not_redirection() {
        assert_eq!(plan_for("echo 'a > b'").unwrap(), None);
    }

    #[test]
    fn attached_operator_is_not_a_token() {
        // `a>b` tokenizes as one word; no standalone operator.
        assert_eq!(plan_for("echo a>b").unwrap(), None);
    }

    #[test]
    fn quoted_target_is_unquoted() {
        let r = plan_for("foo > \"my out.txt\"").unwrap().unwrap();
        assert_eq!(r.command, "foo");
        assert_eq!(r.target, PathBuf::from("my out.txt"));
    }

    #[test]
    fn tilde_target_is_expanded() {
        let r = plan_for("foo >> ~/out.txt").unwrap().unwrap();
        let expected = shellexpand::tilde("~/out.txt").into_owned();
        assert_eq!(r.target, PathBuf::from(expected));
        assert_eq!(r.mode, RedirectMode::Append);
    }

    #[test]
    fn several_words_are_ambiguous() {
        assert!(matches!(
            plan_for("foo > a b"),
            Err(RedirectionError::AmbiguousTarget(t)) if t == "a b"
        ));
    }

    #[test]
    fn empty_quoted_target_is_ambiguous() {
        assert!(matches!(
            plan_for("foo > ''"),
            Err(RedirectionError::AmbiguousTarget(_))
        ));
    }

    #[test]
    fn quoted_operator_before_real_one() {
        let r = plan_for("echo 'x > y' > out").unwrap().unwrap();
        assert_eq!(r.command, "echo 'x > y'");
        assert_eq!(r.target, PathBuf::from("out"));
    }
}
