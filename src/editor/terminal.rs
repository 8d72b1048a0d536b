use std::cell::{Cell, RefCell};
use std::io;
use std::path::Path;

use rustyline::completion::Completer as RlCompleter;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, CompletionType, Config, Context, Editor, EventHandler, Helper, KeyCode, KeyEvent,
    Modifiers,
};

use super::{Completer, CompletionRequest, LineEditor, ReadLine};

/// rustyline helper that routes completion to the installed [`Completer`].
#[derive(Default)]
struct ShellHelper {
    completer: Option<Completer>,
    line: RefCell<String>,
    bounds: Cell<(usize, usize)>,
}

impl Helper for ShellHelper {}

impl RlCompleter for ShellHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let req = CompletionRequest::at(line, pos);
        *self.line.borrow_mut() = line.to_string();
        self.bounds.set((req.begidx, req.endidx));

        let Some(completer) = &self.completer else {
            return Ok((pos, Vec::new()));
        };
        Ok((req.begidx, completer(&req)))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

/// Parse a completion key name: `tab`, `ctrl-X`/`C-X`, or a single character.
fn parse_key(key: &str) -> Option<KeyEvent> {
    let lower = key.to_ascii_lowercase();
    if lower == "tab" {
        return Some(KeyEvent(KeyCode::Tab, Modifiers::NONE));
    }
    let ctrl = lower
        .strip_prefix("ctrl-")
        .or_else(|| lower.strip_prefix("c-"));
    let (chars, ctrl) = match ctrl {
        Some(rest) => (rest, true),
        None => (key, false),
    };
    let mut it = chars.chars();
    match (it.next(), it.next()) {
        (Some(c), None) if ctrl => Some(KeyEvent::ctrl(c)),
        (Some(c), None) => Some(KeyEvent::new(c, Modifiers::NONE)),
        _ => None,
    }
}

fn into_io(e: ReadlineError) -> io::Error {
    match e {
        ReadlineError::Io(e) => e,
        other => io::Error::other(other),
    }
}

/// Interactive terminal editor built on rustyline.
pub struct TerminalEditor {
    editor: Editor<ShellHelper, DefaultHistory>,
}

impl TerminalEditor {
    pub fn new() -> io::Result<Self> {
        let config = Config::builder()
            .completion_type(CompletionType::List)
            .auto_add_history(false)
            .build();
        let mut editor =
            Editor::<ShellHelper, DefaultHistory>::with_config(config).map_err(into_io)?;
        editor.set_helper(Some(ShellHelper::default()));
        Ok(Self { editor })
    }

    fn helper(&self) -> Option<&ShellHelper> {
        self.editor.helper()
    }
}

impl LineEditor for TerminalEditor {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadLine> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.add_history(&line);
                }
                Ok(ReadLine::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadLine::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadLine::Eof),
            Err(e) => Err(into_io(e)),
        }
    }

    fn current_line(&self) -> String {
        self.helper()
            .map(|h| h.line.borrow().clone())
            .unwrap_or_default()
    }

    fn word_boundaries(&self) -> (usize, usize) {
        self.helper().map(|h| h.bounds.get()).unwrap_or_default()
    }

    fn completer(&self) -> Option<Completer> {
        self.helper().and_then(|h| h.completer.clone())
    }

    fn set_completer(&mut self, completer: Option<Completer>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.completer = completer;
        }
    }

    fn clear_history(&mut self) {
        if let Err(e) = self.editor.clear_history() {
            log::warn!("failed to clear history: {e}");
        }
    }

    fn add_history(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            log::warn!("failed to add history entry: {e}");
        }
    }

    fn read_history_file(&mut self, path: &Path) -> io::Result<()> {
        self.editor.load_history(path).map_err(into_io)
    }

    fn write_history_file(&mut self, path: &Path) -> io::Result<()> {
        self.editor.save_history(path).map_err(into_io)
    }

    fn bind_completion_key(&mut self, key: &str) {
        match parse_key(key) {
            Some(event) => {
                self.editor
                    .bind_sequence(event, EventHandler::Simple(Cmd::Complete));
            }
            None => log::warn!("unsupported completion key: {key:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tab() {
        assert_eq!(parse_key("tab"), Some(KeyEvent(KeyCode::Tab, Modifiers::NONE)));
        assert_eq!(parse_key("Tab"), Some(KeyEvent(KeyCode::Tab, Modifiers::NONE)));
    }

    #[test]
    fn parse_ctrl() {
        assert_eq!(parse_key("ctrl-i"), Some(KeyEvent::ctrl('i')));
        assert_eq!(parse_key("C-x"), Some(KeyEvent::ctrl('x')));
    }

    #[test]
    fn parse_char() {
        assert_eq!(parse_key("`"), Some(KeyEvent::new('`', Modifiers::NONE)));
    }

    #[test]
    fn parse_unknown() {
        assert_eq!(parse_key("hyper-space"), None);
        assert_eq!(parse_key(""), None);
    }
}
