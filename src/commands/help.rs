use super::{Command, Flow, Invocation};
use crate::error::Result;

pub struct HelpCommand;

impl Command for HelpCommand {
    fn name(&self) -> &str {
        "help"
    }

    fn description(&self) -> &str {
        "List commands, or describe one."
    }

    fn usage(&self) -> &str {
        "help [COMMAND]"
    }

    fn execute(&self, args: &str, inv: &mut Invocation<'_>) -> Result<Flow> {
        let topic = args.trim();
        if topic.is_empty() {
            writeln!(inv.out, "Commands:")?;
            for name in inv.registry.names() {
                if name == "EOF" {
                    continue;
                }
                let description = inv.registry.get(name).map(|c| c.description()).unwrap_or("");
                writeln!(inv.out, "  {name:<12} {description}")?;
            }
            let aliases = inv.session.aliases();
            if !aliases.is_empty() {
                writeln!(inv.out)?;
                writeln!(inv.out, "Aliases:")?;
                for (alias, target) in aliases.iter() {
                    writeln!(inv.out, "  {alias:<12} {target}")?;
                }
            }
            return Ok(Flow::Continue);
        }

        let name = inv.session.aliases().get(topic).unwrap_or(topic);
        match inv.registry.get(name) {
            Some(command) => {
                writeln!(inv.out, "usage: {}", command.usage())?;
                writeln!(inv.out, "{}", command.description())?;
            }
            None => writeln!(inv.err, "no help for {topic:?}")?,
        }
        Ok(Flow::Continue)
    }
}
