use super::{Command, Flow, Invocation};
use crate::error::Result;

pub struct ExitCommand;

impl Command for ExitCommand {
    fn name(&self) -> &str {
        "exit"
    }

    fn description(&self) -> &str {
        "Leave the shell."
    }

    fn usage(&self) -> &str {
        "exit"
    }

    fn execute(&self, _args: &str, _inv: &mut Invocation<'_>) -> Result<Flow> {
        Ok(Flow::Stop)
    }
}

/// Dispatched when input ends.
pub struct EofCommand;

impl Command for EofCommand {
    fn name(&self) -> &str {
        "EOF"
    }

    fn description(&self) -> &str {
        "End of input."
    }

    fn usage(&self) -> &str {
        "EOF"
    }

    fn execute(&self, _args: &str, inv: &mut Invocation<'_>) -> Result<Flow> {
        writeln!(inv.out)?;
        Ok(Flow::Stop)
    }
}
