//! Tab completion for the root context: command names, redirection targets,
//! and per-command arguments.

use std::path::Path;
use std::rc::Rc;

use crate::commands::CommandRegistry;
use crate::editor::{Completer, CompletionRequest};
use crate::parse;

/// Completion candidates for `req`.
///
/// Single directory matches are returned bare so completion can continue
/// into the directory; everything else gets a trailing space.
pub fn complete(registry: &CommandRegistry, req: &CompletionRequest<'_>) -> Vec<String> {
    let line = req.line.trim_start();
    let shift = req.line.len() - line.len();
    let begidx = req.begidx.saturating_sub(shift);
    let endidx = req.endidx.saturating_sub(shift).max(begidx);
    let shifted = CompletionRequest {
        text: req.text,
        line,
        begidx,
        endidx,
    };

    let matches = if begidx == 0 {
        complete_command_name(registry, req.text)
    } else if line[..begidx.min(line.len())].contains('>') {
        complete_filename(req.text)
    } else {
        let (name, _) = parse::split_command(line);
        match registry.get(name) {
            Some(command) => command.complete(&shifted),
            None => Vec::new(),
        }
    };

    if let [only] = matches.as_slice()
        && only.ends_with('/')
    {
        return matches;
    }
    matches.into_iter().map(|m| format!("{m} ")).collect()
}

fn complete_command_name(registry: &CommandRegistry, text: &str) -> Vec<String> {
    registry
        .names()
        .into_iter()
        .filter(|name| *name != "EOF" && name.starts_with(text))
        .map(String::from)
        .collect()
}

/// Paths starting with `text`; directories end in `/`.
///
/// `~` is expanded for the lookup but candidates keep the text as typed.
pub fn complete_filename(text: &str) -> Vec<String> {
    let (typed_dir, prefix) = match text.rfind('/') {
        Some(i) => (&text[..=i], &text[i + 1..]),
        None => ("", text),
    };
    let expanded = shellexpand::tilde(typed_dir);
    let dir = if expanded.is_empty() {
        Path::new(".")
    } else {
        Path::new(&*expanded)
    };

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("cannot list {}: {e}", dir.display());
            return Vec::new();
        }
    };

    let mut matches: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            if !name.starts_with(prefix) || (name.starts_with('.') && !prefix.starts_with('.')) {
                return None;
            }
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false)
                || entry.path().is_dir();
            let suffix = if is_dir { "/" } else { "" };
            Some(format!("{typed_dir}{name}{suffix}"))
        })
        .collect();
    matches.sort();
    matches
}

/// A [`Completer`] over `registry`, suitable for the root context.
pub fn completer(registry: Rc<CommandRegistry>) -> Completer {
    Rc::new(move |req: &CompletionRequest<'_>| complete(&registry, req))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Command, Flow, Invocation};
    use crate::error::Result;

    struct Deploy;

    impl Command for Deploy {
        fn name(&self) -> &str {
            "deploy"
        }
        fn description(&self) -> &str {
            "Deploy an environment."
        }
        fn usage(&self) -> &str {
            "deploy ENV"
        }
        fn execute(&self, _args: &str, _inv: &mut Invocation<'_>) -> Result<Flow> {
            Ok(Flow::Continue)
        }
        fn complete(&self, req: &CompletionRequest<'_>) -> Vec<String> {
            ["staging", "production"]
                .into_iter()
                .filter(|env| env.starts_with(req.text))
                .map(String::from)
                .collect()
        }
    }

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::with_builtins();
        registry.register(Box::new(Deploy));
        registry
    }

    fn complete_at(line: &str) -> Vec<String> {
        complete(&registry(), &CompletionRequest::at(line, line.len()))
    }

    #[test]
    fn command_names() {
        assert_eq!(complete_at("e"), vec!["echo ", "env ", "exit "]);
        assert_eq!(complete_at("de"), vec!["deploy "]);
    }

    #[test]
    fn command_names_after_leading_space() {
        assert_eq!(complete_at("   un"), vec!["unset "]);
    }

    #[test]
    fn eof_is_not_offered() {
        assert!(complete_at("E").is_empty());
    }

    #[test]
    fn command_arguments() {
        assert_eq!(complete_at("deploy st"), vec!["staging "]);
        assert_eq!(complete_at("deploy "), vec!["staging ", "production "]);
    }

    #[test]
    fn unknown_command_has_no_arguments() {
        assert!(complete_at("nope x").is_empty());
    }

    #[test]
    fn redirection_target_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report.txt"), "").unwrap();
        std::fs::write(dir.path().join("readme"), "").unwrap();
        std::fs::create_dir(dir.path().join("results")).unwrap();

        let base = dir.path().display().to_string();
        let line = format!("deploy staging > {base}/re");
        let got = complete(&registry(), &CompletionRequest::at(&line, line.len()));
        assert_eq!(
            got,
            vec![
                format!("{base}/readme "),
                format!("{base}/report.txt "),
                format!("{base}/results/ "),
            ]
        );
    }

    #[test]
    fn single_directory_has_no_trailing_space() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("logs")).unwrap();
        let base = dir.path().display().to_string();
        let line = format!("echo hi >{base}/lo");
        let got = complete(&registry(), &CompletionRequest::at(&line, line.len()));
        assert_eq!(got, vec![format!("{base}/logs/")]);
    }

    #[test]
    fn hidden_files_need_a_dot() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".hidden"), "").unwrap();
        std::fs::write(dir.path().join("shown"), "").unwrap();
        let base = format!("{}/", dir.path().display());
        assert_eq!(complete_filename(&base), vec![format!("{base}shown")]);
        assert_eq!(complete_filename(&format!("{base}.")), vec![format!("{base}.hidden")]);
    }

    #[test]
    fn missing_directory_is_empty() {
        assert!(complete_filename("/definitely/not/here/x").is_empty());
    }

    #[test]
    fn completer_closure_uses_registry() {
        let completer = completer(Rc::new(registry()));
        assert_eq!(completer(&CompletionRequest::at("hel", 3)), vec!["help "]);
    }
}
