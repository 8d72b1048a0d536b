use std::io::{self, IsTerminal};
use std::process::ExitCode;

use cmdloop::commands::CommandRegistry;
use cmdloop::config::Config;
use cmdloop::editor::TerminalEditor;
use cmdloop::{Flow, Shell, logging};

const USAGE: &str = "usage: cmdloop [--dump-config] [-c COMMAND]... [SCRIPT]";

#[derive(Debug, Default, PartialEq)]
struct Args {
    dump_config: bool,
    commands: Vec<String>,
    script: Option<String>,
}

fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut args = Args::default();
    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--dump-config" => args.dump_config = true,
            "-c" | "--command" => match argv.next() {
                Some(command) => args.commands.push(command),
                None => return Err(format!("{arg} requires an argument")),
            },
            "-h" | "--help" => return Err(String::new()),
            other if other.starts_with('-') && other != "-" => {
                return Err(format!("unknown option: {other}"));
            }
            _ if args.script.is_some() => return Err("only one script may be given".into()),
            _ => args.script = Some(arg),
        }
    }
    Ok(args)
}

// ─── Entry point ─────────────────────────────────────

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("cmdloop: {msg}");
            }
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    logging::init();
    let config = Config::load();

    if args.dump_config {
        return match config.to_toml() {
            Ok(text) => {
                print!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("cmdloop: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let mut shell = Shell::new(CommandRegistry::with_builtins(), &config);

    // -c runs the given commands and exits, like `sh -c`.
    if !args.commands.is_empty() && args.script.is_none() {
        for command in &args.commands {
            match shell.execute_line(command) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => break,
                Err(_) => return ExitCode::FAILURE,
            }
        }
        return ExitCode::SUCCESS;
    }

    for command in args.commands {
        shell.queue(command);
    }

    shell = match args.script.as_deref() {
        Some("-") => shell.with_prompt(""),
        Some(path) => match std::fs::File::open(path) {
            Ok(file) => shell.with_prompt("").with_input(io::BufReader::new(file)),
            Err(e) => {
                eprintln!("cmdloop: {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None if io::stdin().is_terminal() => match TerminalEditor::new() {
            Ok(editor) => shell.with_editor(Box::new(editor)),
            Err(e) => {
                log::warn!("no line editor, falling back to plain input: {e}");
                shell
            }
        },
        None => shell.with_prompt(""),
    };

    match shell.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

// ─── Tests ───────────────────────────────────────────
