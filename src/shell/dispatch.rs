use std::io::Write;

use crate::alias;
use crate::commands::{CommandRegistry, Flow, Invocation};
use crate::error::{Result, ShellError};
use crate::parse;
use crate::session::Session;

/// Resolve `line` to a handler and run it.
///
/// `tokens` is the tokenized form of `line`. An alias on the first token
/// wins over a literal command of the same name; the aliased handler gets
/// the remaining tokens re-quoted. Otherwise the handler gets the raw text
/// after the command word.
pub(crate) fn dispatch(
    registry: &CommandRegistry,
    session: &mut Session,
    line: &str,
    tokens: &[String],
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Flow> {
    let (name, args) = match alias::resolve(tokens, session.aliases()) {
        Some(target) => (target.to_string(), parse::join(&tokens[1..])),
        None => {
            let (name, args) = parse::split_command(line);
            (name.to_string(), args.to_string())
        }
    };

    let Some(command) = registry.get(&name) else {
        return Err(ShellError::CommandNotFound(name));
    };

    if name != "EOF" {
        session.record(line.trim());
    }
    log::debug!("dispatch {name} {args:?}");

    let mut inv = Invocation {
        session,
        out,
        err,
        registry,
    };
    command.execute(&args, &mut inv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasTable;
    use crate::context::ContextStack;

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::with_builtins();
        registry.register_fn("list", "List things.", |args, inv| {
            writeln!(inv.out, "list[{args}]")?;
            Ok(Flow::Continue)
        });
        registry
    }

    fn run(session: &mut Session, line: &str) -> (Result<Flow>, String) {
        let tokens = parse::tokenize(line).unwrap();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let flow = dispatch(&registry(), session, line, &tokens, &mut out, &mut err);
        (flow, String::from_utf8(out).unwrap())
    }

    fn session() -> Session {
        let aliases: AliasTable = [("ls", "list")].into_iter().collect();
        Session::new(aliases, ContextStack::detached("tab"))
    }

    #[test]
    fn literal_gets_raw_arguments() {
        let mut s = session();
        let (_, out) = run(&mut s, "list  'a b'   c");
        assert_eq!(out, "list['a b'   c]\n");
        assert_eq!(s.last_command(), "list  'a b'   c");
    }

    #[test]
    fn alias_gets_requoted_arguments() {
        let mut s = session();
        let (_, out) = run(&mut s, "ls 'a b' c");
        assert_eq!(out, "list['a b' c]\n");
        assert_eq!(s.last_command(), "ls 'a b' c");
    }

    #[test]
    fn unknown_command_is_not_recorded() {
        let mut s = session();
        let (flow, out) = run(&mut s, "frob x");
        assert!(matches!(flow, Err(ShellError::CommandNotFound(name)) if name == "frob"));
        assert_eq!(out, "");
        assert_eq!(s.last_command(), "");
    }

    #[test]
    fn eof_is_not_recorded() {
        let mut s = session();
        run(&mut s, "list x");
        let (flow, _) = run(&mut s, "EOF");
        assert_eq!(flow.unwrap(), Flow::Stop);
        assert_eq!(s.last_command(), "list x");
    }
}
