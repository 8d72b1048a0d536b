//! The command loop: read, substitute, redirect, dispatch, restore.
//!
//! A [`Shell`] owns the session, the command registry, and the output and
//! error sinks. Lines come from the queue first, then from the line editor
//! (interactive) or a plain reader (scripts, pipes, tests).

mod dispatch;

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use crate::alias::AliasTable;
use crate::commands::{CommandRegistry, Flow};
use crate::complete;
use crate::config::Config;
use crate::context::ContextStack;
use crate::editor::{Completer, CompletionRequest, LineEditor, ReadLine};
use crate::error::{RedirectionError, Result, ShellError};
use crate::output;
use crate::parse;
use crate::session::Session;

enum Input {
    /// Read through the editor held by the context stack.
    Editor,
    Reader(Box<dyn BufRead>),
}

pub struct Shell {
    registry: Rc<CommandRegistry>,
    session: Session,
    prompt: String,
    intro: String,
    completion_key: String,
    history_file: Option<PathBuf>,
    input: Input,
    queue: VecDeque<String>,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
}

impl Shell {
    /// A shell over stdin/stdout/stderr, configured from `config`.
    pub fn new(registry: CommandRegistry, config: &Config) -> Self {
        let aliases: AliasTable = config
            .aliases
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let contexts = ContextStack::detached(config.settings.completion_key.clone());
        let mut session = Session::new(aliases, contexts);
        for (name, value) in &config.variables {
            if let Err(e) = session.set_variable(name, value) {
                log::warn!("skipping configured variable: {e}");
            }
        }

        Self {
            registry: Rc::new(registry),
            session,
            prompt: config.settings.prompt.clone(),
            intro: config.settings.intro.clone(),
            completion_key: config.settings.completion_key.clone(),
            history_file: config.history_path(),
            input: Input::Reader(Box::new(io::BufReader::new(io::stdin()))),
            queue: VecDeque::new(),
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
        }
    }

    /// Read lines through `editor` and enable completion and history.
    pub fn with_editor(mut self, editor: Box<dyn LineEditor>) -> Self {
        self.session.contexts_mut().attach(editor);
        self.input = Input::Editor;
        self
    }

    /// Read lines from `reader`; the prompt is written to the output.
    pub fn with_input(mut self, reader: impl BufRead + 'static) -> Self {
        self.input = Input::Reader(Box::new(reader));
        self
    }

    pub fn with_output(mut self, out: impl Write + 'static) -> Self {
        self.stdout = Box::new(out);
        self
    }

    pub fn with_error(mut self, err: impl Write + 'static) -> Self {
        self.stderr = Box::new(err);
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Queue a line to run before any further input is read.
    pub fn queue(&mut self, line: impl Into<String>) {
        self.queue.push_back(line.into());
    }

    /// Completion candidates for `line` with the cursor at `pos`.
    pub fn complete(&self, line: &str, pos: usize) -> Vec<String> {
        complete::complete(&self.registry, &CompletionRequest::at(line, pos))
    }

    /// The root-context completer.
    pub fn completer(&self) -> Completer {
        complete::completer(Rc::clone(&self.registry))
    }

    /// Run the loop until a command stops it, input ends, or a fatal error.
    ///
    /// The root completion context is entered first and always left before
    /// returning, so history is flushed on every exit path.
    pub fn run(&mut self) -> Result<()> {
        self.preloop()?;
        let entered = self.enter_root_context();

        let result = self.command_loop();

        if entered && let Err(e) = self.session.contexts_mut().pop() {
            log::warn!("failed to leave root context: {e}");
            self.report(&e);
        }
        if let Err(e) = self.stdout.flush() {
            log::warn!("failed to flush output: {e}");
        }
        result
    }

    /// Run one line through the full cycle.
    ///
    /// Recoverable errors are reported on the error stream and yield
    /// `Flow::Continue`. A fatal error is reported and returned.
    pub fn execute_line(&mut self, line: &str) -> Result<Flow> {
        match self.cycle(line) {
            Ok(flow) => Ok(flow),
            Err(e) => {
                self.report(&e);
                if e.is_fatal() { Err(e) } else { Ok(Flow::Continue) }
            }
        }
    }

    fn preloop(&mut self) -> Result<()> {
        if !self.intro.is_empty() {
            writeln!(self.stdout, "{}", self.intro)?;
        }
        Ok(())
    }

    fn enter_root_context(&mut self) -> bool {
        if !self.session.contexts().has_editor() || self.completion_key.is_empty() {
            return false;
        }
        let completer = self.completer();
        let history_file = self.history_file.clone();
        if let Err(e) = self.session.contexts_mut().push(completer, history_file) {
            log::warn!("failed to enter root context: {e}");
            self.report(&e);
        }
        true
    }

    fn command_loop(&mut self) -> Result<()> {
        loop {
            let (line, at_eof) = match self.next_line() {
                Ok(Some(line)) => (line, false),
                Ok(None) => ("EOF".to_string(), true),
                Err(e) => {
                    self.report(&e);
                    return Err(e);
                }
            };

            if at_eof && !self.registry.contains("EOF") {
                return Ok(());
            }
            let flow = self.execute_line(&line)?;
            // Input is exhausted; another read would only see EOF again.
            if flow == Flow::Stop || at_eof {
                return Ok(());
            }
        }
    }

    /// The next line, or `None` at end of input. Read failures are fatal.
    fn next_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.queue.pop_front() {
            return Ok(Some(line));
        }
        let fatal = |e: io::Error| ShellError::Fatal(format!("failed to read input: {e}"));

        match &mut self.input {
            Input::Editor => {
                let Some(editor) = self.session.contexts_mut().editor_mut() else {
                    return Ok(None);
                };
                match editor.read_line(&self.prompt).map_err(fatal)? {
                    ReadLine::Line(line) => Ok(Some(line)),
                    ReadLine::Interrupted => Ok(Some(String::new())),
                    ReadLine::Eof => Ok(None),
                }
            }
            Input::Reader(reader) => {
                if !self.prompt.is_empty() {
                    write!(self.stdout, "{}", self.prompt).map_err(fatal)?;
                    self.stdout.flush().map_err(fatal)?;
                }
                let mut line = String::new();
                if reader.read_line(&mut line).map_err(fatal)? == 0 {
                    return Ok(None);
                }
                let trimmed = line.trim_end_matches(['\r', '\n']).len();
                line.truncate(trimmed);
                Ok(Some(line))
            }
        }
    }

    fn cycle(&mut self, line: &str) -> Result<Flow> {
        let line = self.session.substitute(line)?;
        let tokens = parse::tokenize(&line)?;
        if tokens.is_empty() {
            return Ok(Flow::Continue);
        }

        let Some(redirection) = parse::plan_redirection(&line, &tokens)? else {
            return dispatch::dispatch(
                &self.registry,
                &mut self.session,
                &line,
                &tokens,
                &mut *self.stdout,
                &mut *self.stderr,
            );
        };

        let command_tokens = parse::tokenize(&redirection.command)?;
        if command_tokens.is_empty() {
            return Ok(Flow::Continue);
        }

        let mut tee =
            output::install(&redirection, &mut *self.stdout).map_err(RedirectionError::Open)?;
        let result = dispatch::dispatch(
            &self.registry,
            &mut self.session,
            &redirection.command,
            &command_tokens,
            &mut tee,
            &mut *self.stderr,
        );
        tee.restore();
        result
    }

    fn report(&mut self, e: &ShellError) {
        log::debug!("reporting: {e}");
        let written = match e {
            ShellError::Parse(p) => write!(self.stderr, "{}", p.user_message()),
            ShellError::CommandNotFound(_)
            | ShellError::Substitution(_)
            | ShellError::Redirection(_)
            | ShellError::Fatal(_) => writeln!(self.stderr, "{e}"),
            _ => writeln!(self.stderr, "error: {e}"),
        };
        if let Err(w) = written {
            log::warn!("failed to report error: {w}");
        }
    }
}
