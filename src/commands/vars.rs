use super::{Command, Flow, Invocation};
use crate::error::Result;

pub struct EchoCommand;

impl Command for EchoCommand {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Print the line after substitution."
    }

    fn usage(&self) -> &str {
        "echo [TEXT]"
    }

    fn execute(&self, args: &str, inv: &mut Invocation<'_>) -> Result<Flow> {
        writeln!(inv.out, "{args}")?;
        Ok(Flow::Continue)
    }
}

pub struct EnvCommand;

impl Command for EnvCommand {
    fn name(&self) -> &str {
        "env"
    }

    fn description(&self) -> &str {
        "List session variables."
    }

    fn usage(&self) -> &str {
        "env"
    }

    fn execute(&self, _args: &str, inv: &mut Invocation<'_>) -> Result<Flow> {
        for (name, value) in inv.session.variables() {
            writeln!(inv.out, "{name}={value}")?;
        }
        Ok(Flow::Continue)
    }
}

pub struct SetCommand;

impl Command for SetCommand {
    fn name(&self) -> &str {
        "set"
    }

    fn description(&self) -> &str {
        "Set one or more session variables."
    }

    fn usage(&self) -> &str {
        "set NAME=VALUE [NAME=VALUE ...]"
    }

    fn execute(&self, args: &str, inv: &mut Invocation<'_>) -> Result<Flow> {
        let items = crate::parse::tokenize(args)?;
        if items.is_empty() {
            writeln!(inv.err, "usage: {}", self.usage())?;
            return Ok(Flow::Continue);
        }
        for item in &items {
            let Some((name, value)) = item.split_once('=') else {
                log::debug!("set: ignoring {item:?}");
                continue;
            };
            if let Err(e) = inv.session.set_variable(name, value) {
                writeln!(inv.err, "{e}")?;
            }
        }
        Ok(Flow::Continue)
    }
}

pub struct UnsetCommand;

impl Command for UnsetCommand {
    fn name(&self) -> &str {
        "unset"
    }

    fn description(&self) -> &str {
        "Remove session variables."
    }

    fn usage(&self) -> &str {
        "unset NAME [NAME ...]"
    }

    fn execute(&self, args: &str, inv: &mut Invocation<'_>) -> Result<Flow> {
        for name in crate::parse::tokenize(args)? {
            inv.session.unset_variable(&name);
        }
        Ok(Flow::Continue)
    }
}
