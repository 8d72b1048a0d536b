//! The line-editing capability the shell drives.
//!
//! The shell never talks to a terminal library directly. It reads lines,
//! swaps completers and loads/saves history through [`LineEditor`], so the
//! whole loop runs against [`MemoryEditor`] in tests and against
//! [`TerminalEditor`] (rustyline) interactively.

/// In-memory editor with scripted input.
pub mod memory;
/// rustyline-backed terminal editor.
pub mod terminal;

pub use memory::MemoryEditor;
pub use terminal::TerminalEditor;

use std::io;
use std::path::Path;
use std::rc::Rc;

/// Characters (besides whitespace) that end a completion word.
///
/// `/` is deliberately absent so paths complete as one word.
pub const WORD_DELIMITERS: &str = "\"'`@$><=;|&{(";

/// A tab-completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionRequest<'a> {
    /// The word being completed.
    pub text: &'a str,
    /// The whole input line.
    pub line: &'a str,
    /// Byte offset of `text` in `line`.
    pub begidx: usize,
    /// Byte offset just past `text` (the cursor).
    pub endidx: usize,
}

impl<'a> CompletionRequest<'a> {
    /// Build a request for the word ending at `pos`.
    pub fn at(line: &'a str, pos: usize) -> Self {
        let (begidx, endidx) = word_boundaries(line, pos);
        Self {
            text: &line[begidx..endidx],
            line,
            begidx,
            endidx,
        }
    }
}

/// A completion callback: candidates for the word in the request.
pub type Completer = Rc<dyn Fn(&CompletionRequest<'_>) -> Vec<String>>;

/// Result of reading one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLine {
    Line(String),
    /// Ctrl-C.
    Interrupted,
    /// Ctrl-D or exhausted input.
    Eof,
}

/// Start and end of the completion word ending at `pos`.
pub fn word_boundaries(line: &str, pos: usize) -> (usize, usize) {
    let pos = pos.min(line.len());
    let head = &line[..pos];
    let start = head
        .char_indices()
        .rev()
        .find(|&(_, c)| c.is_whitespace() || WORD_DELIMITERS.contains(c))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    (start, pos)
}

/// Host line-editing capability.
pub trait LineEditor {
    /// Prompt for and read one line.
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadLine>;

    /// The line being edited (as of the latest completion request).
    fn current_line(&self) -> String;

    /// Word boundaries of the latest completion request.
    fn word_boundaries(&self) -> (usize, usize);

    /// The installed completer.
    fn completer(&self) -> Option<Completer>;

    fn set_completer(&mut self, completer: Option<Completer>);

    /// Drop all in-memory history entries.
    fn clear_history(&mut self);

    fn add_history(&mut self, line: &str);

    /// Append the entries in `path` to in-memory history.
    fn read_history_file(&mut self, path: &Path) -> io::Result<()>;

    /// Persist in-memory history to `path`, replacing its contents.
    fn write_history_file(&mut self, path: &Path) -> io::Result<()>;

    /// Bind `key` (e.g. `"tab"`, `"ctrl-i"`) to completion.
    fn bind_completion_key(&mut self, key: &str);
}
