use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;
use std::path::Path;

use super::{Completer, CompletionRequest, LineEditor, ReadLine};

/// A [`LineEditor`] that keeps everything in memory.
///
/// Input lines are scripted up front; history files are plain text with
/// one entry per line.
#[derive(Default)]
pub struct MemoryEditor {
    input: VecDeque<String>,
    history: Vec<String>,
    completer: Option<Completer>,
    completion_key: Option<String>,
    line: RefCell<String>,
    bounds: Cell<(usize, usize)>,
}

impl MemoryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// An editor that will return `lines` from `read_line`, then EOF.
    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// The key most recently bound to completion.
    pub fn completion_key(&self) -> Option<&str> {
        self.completion_key.as_deref()
    }

    /// Simulate pressing the completion key with the cursor at `pos`.
    pub fn complete(&self, line: &str, pos: usize) -> Vec<String> {
        let req = CompletionRequest::at(line, pos);
        *self.line.borrow_mut() = line.to_string();
        self.bounds.set((req.begidx, req.endidx));
        match &self.completer {
            Some(completer) => completer(&req),
            None => Vec::new(),
        }
    }
}

impl LineEditor for MemoryEditor {
    fn read_line(&mut self, _prompt: &str) -> io::Result<ReadLine> {
        match self.input.pop_front() {
            Some(line) => {
                if !line.trim().is_empty() {
                    self.add_history(&line);
                }
                Ok(ReadLine::Line(line))
            }
            None => Ok(ReadLine::Eof),
        }
    }

    fn current_line(&self) -> String {
        self.line.borrow().clone()
    }

    fn word_boundaries(&self) -> (usize, usize) {
        self.bounds.get()
    }

    fn completer(&self) -> Option<Completer> {
        self.completer.clone()
    }

    fn set_completer(&mut self, completer: Option<Completer>) {
        self.completer = completer;
    }

    fn clear_history(&mut self) {
        self.history.clear();
    }

    fn add_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }

    fn read_history_file(&mut self, path: &Path) -> io::Result<()> {
        let content = std::fs::read_to_string(path)?;
        self.history
            .extend(content.lines().filter(|l| !l.is_empty()).map(String::from));
        Ok(())
    }

    fn write_history_file(&mut self, path: &Path) -> io::Result<()> {
        let mut content = self.history.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        std::fs::write(path, content)
    }

    fn bind_completion_key(&mut self, key: &str) {
        self.completion_key = Some(key.to_string());
    }
}
