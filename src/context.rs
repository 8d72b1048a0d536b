//! Nested completion/history contexts.
//!
//! Entering a sub-mode (a sub-shell, a module console) pushes a new
//! completer and history file; leaving it pops back. The line editor always
//! carries the top context: its completer is installed and its history file
//! is what the in-memory history was loaded from and will be saved to.
//!
//! Pushes and pops must nest. Every push is paired with exactly one pop,
//! including on error paths, or history ends up in the wrong file.

use std::io;
use std::path::PathBuf;

use crate::editor::{Completer, LineEditor};
use crate::error::Result;

/// Stack of (completer, history file) contexts over an optional editor.
///
/// Without an editor every operation is a no-op.
pub struct ContextStack {
    editor: Option<Box<dyn LineEditor>>,
    completers: Vec<Option<Completer>>,
    histories: Vec<Option<PathBuf>>,
    completion_key: String,
}

impl ContextStack {
    /// A stack with no line editor attached.
    pub fn detached(completion_key: impl Into<String>) -> Self {
        Self {
            editor: None,
            completers: Vec::new(),
            histories: Vec::new(),
            completion_key: completion_key.into(),
        }
    }

    pub fn new(editor: Box<dyn LineEditor>, completion_key: impl Into<String>) -> Self {
        let mut stack = Self::detached(completion_key);
        stack.editor = Some(editor);
        stack
    }

    /// Attach an editor, replacing any previous one.
    ///
    /// Only valid while no context is pushed.
    pub fn attach(&mut self, editor: Box<dyn LineEditor>) {
        debug_assert!(self.histories.is_empty(), "attach with contexts pushed");
        self.editor = Some(editor);
    }

    pub fn has_editor(&self) -> bool {
        self.editor.is_some()
    }

    pub fn editor(&self) -> Option<&dyn LineEditor> {
        self.editor.as_deref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut dyn LineEditor> {
        match &mut self.editor {
            Some(editor) => Some(editor.as_mut()),
            None => None,
        }
    }

    /// Number of pushed contexts.
    pub fn depth(&self) -> usize {
        self.histories.len()
    }

    /// History file of the top context.
    pub fn history_file(&self) -> Option<&PathBuf> {
        self.histories.last().and_then(Option::as_ref)
    }

    /// Enter a new context.
    ///
    /// The context is installed even when loading its history fails, so the
    /// caller must still `pop` it.
    pub fn push(&mut self, completer: Completer, history_file: Option<PathBuf>) -> Result<()> {
        let Some(editor) = self.editor.as_deref_mut() else {
            return Ok(());
        };

        self.completers.push(editor.completer());
        editor.set_completer(Some(completer));

        if let Some(Some(previous)) = self.histories.last()
            && let Err(e) = editor.write_history_file(previous)
        {
            log::warn!("failed to save history to {}: {e}", previous.display());
        }

        log::info!(
            "entering completion context {} (history: {})",
            self.histories.len() + 1,
            history_file
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "none".into())
        );
        self.histories.push(history_file);
        editor.clear_history();

        let mut result = Ok(());
        if let Some(Some(path)) = self.histories.last()
            && path.exists()
        {
            match editor.read_history_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    log::warn!("could not access the history file {}: {e}", path.display());
                }
                Err(e) => result = Err(e.into()),
            }
        }

        editor.bind_completion_key(&self.completion_key);
        result
    }

    /// Leave the top context, restoring the one below.
    ///
    /// The stacks are unwound before any I/O error is returned.
    pub fn pop(&mut self) -> Result<()> {
        let Some(editor) = self.editor.as_deref_mut() else {
            return Ok(());
        };
        let Some(top) = self.histories.pop() else {
            return Ok(());
        };
        let restored = self.completers.pop().flatten();

        let mut result = Ok(());
        if let Some(path) = &top
            && let Err(e) = editor.write_history_file(path)
        {
            result = Err(e.into());
        }

        editor.clear_history();
        if let Some(Some(previous)) = self.histories.last()
            && previous.exists()
            && let Err(e) = editor.read_history_file(previous)
        {
            log::warn!("failed to reload history from {}: {e}", previous.display());
            if result.is_ok() {
                result = Err(e.into());
            }
        }

        editor.set_completer(restored);
        log::info!("left completion context {}", self.histories.len() + 1);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{CompletionRequest, MemoryEditor, ReadLine};
    use crate::error::ShellError;
    use std::path::Path;
    use std::rc::Rc;

    /// An editor whose history loads always fail with `kind`.
    struct UnreadableHistory {
        inner: MemoryEditor,
        kind: io::ErrorKind,
    }

    impl UnreadableHistory {
        fn new(kind: io::ErrorKind) -> Self {
            Self {
                inner: MemoryEditor::new(),
                kind,
            }
        }
    }

    impl LineEditor for UnreadableHistory {
        fn read_line(&mut self, prompt: &str) -> io::Result<ReadLine> {
            self.inner.read_line(prompt)
        }
        fn current_line(&self) -> String {
            self.inner.current_line()
        }
        fn word_boundaries(&self) -> (usize, usize) {
            self.inner.word_boundaries()
        }
        fn completer(&self) -> Option<Completer> {
            self.inner.completer()
        }
        fn set_completer(&mut self, completer: Option<Completer>) {
            self.inner.set_completer(completer);
        }
        fn clear_history(&mut self) {
            self.inner.clear_history();
        }
        fn add_history(&mut self, line: &str) {
            self.inner.add_history(line);
        }
        fn read_history_file(&mut self, _path: &Path) -> io::Result<()> {
            Err(io::Error::new(self.kind, "history unreadable"))
        }
        fn write_history_file(&mut self, path: &Path) -> io::Result<()> {
            self.inner.write_history_file(path)
        }
        fn bind_completion_key(&mut self, key: &str) {
            self.inner.bind_completion_key(key);
        }
    }

    fn completer(tag: &'static str) -> Completer {
        Rc::new(move |_: &CompletionRequest<'_>| vec![tag.to_string()])
    }

    fn installed(stack: &ContextStack) -> Option<Completer> {
        stack.editor().and_then(|e| e.completer())
    }

    #[test]
    fn detached_is_noop() {
        let mut stack = ContextStack::detached("tab");
        stack.push(completer("a"), None).unwrap();
        assert_eq!(stack.depth(), 0);
        stack.pop().unwrap();
        assert!(!stack.has_editor());
    }

    #[test]
    fn push_installs_and_pop_restores() {
        let mut stack = ContextStack::new(Box::new(MemoryEditor::new()), "tab");
        let outer = completer("outer");
        stack.push(outer.clone(), None).unwrap();
        stack.push(completer("inner"), None).unwrap();
        assert_eq!(stack.depth(), 2);

        stack.pop().unwrap();
        assert!(Rc::ptr_eq(&installed(&stack).unwrap(), &outer));
        stack.pop().unwrap();
        assert!(installed(&stack).is_none());
    }

    #[test]
    fn symmetric_push_pop_restores_original() {
        let mut editor = MemoryEditor::new();
        let original = completer("host");
        editor.set_completer(Some(original.clone()));
        let mut stack = ContextStack::new(Box::new(editor), "tab");

        for i in 0..5 {
            stack.push(completer(if i % 2 == 0 { "even" } else { "odd" }), None).unwrap();
        }
        for _ in 0..5 {
            stack.pop().unwrap();
        }
        assert!(Rc::ptr_eq(&installed(&stack).unwrap(), &original));
    }

    #[test]
    fn pop_on_empty_stack_is_noop() {
        let mut stack = ContextStack::new(Box::new(MemoryEditor::new()), "tab");
        stack.pop().unwrap();
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn push_without_history_file() {
        let mut stack = ContextStack::new(Box::new(MemoryEditor::new()), "ctrl-i");
        stack.push(completer("a"), None).unwrap();
        assert_eq!(stack.history_file(), None);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn history_files_swap_with_contexts() {
        let dir = tempfile::tempdir().unwrap();
        let outer_file = dir.path().join("outer_history");
        let inner_file = dir.path().join("inner_history");
        std::fs::write(&outer_file, "outer-1\n").unwrap();

        let mut stack = ContextStack::new(Box::new(MemoryEditor::new()), "tab");
        stack.push(completer("outer"), Some(outer_file.clone())).unwrap();
        stack.editor_mut().unwrap().add_history("outer-2");

        stack.push(completer("inner"), Some(inner_file.clone())).unwrap();
        // Outer history flushed on entering the inner context.
        assert_eq!(std::fs::read_to_string(&outer_file).unwrap(), "outer-1\nouter-2\n");
        stack.editor_mut().unwrap().add_history("inner-1");

        stack.pop().unwrap();
        assert_eq!(std::fs::read_to_string(&inner_file).unwrap(), "inner-1\n");
        assert_eq!(stack.history_file(), Some(&outer_file));

        stack.pop().unwrap();
        assert_eq!(std::fs::read_to_string(&outer_file).unwrap(), "outer-1\nouter-2\n");
    }

    #[test]
    fn context_without_history_file_starts_empty() {
        let mut stack = ContextStack::new(Box::new(MemoryEditor::new()), "tab");
        stack.push(completer("outer"), None).unwrap();
        stack.editor_mut().unwrap().add_history("kept in memory only");
        stack.push(completer("inner"), None).unwrap();
        stack.editor_mut().unwrap().add_history("inner");
        stack.pop().unwrap();
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn permission_denied_history_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let history = dir.path().join("history");
        std::fs::write(&history, "old\n").unwrap();

        let editor = UnreadableHistory::new(io::ErrorKind::PermissionDenied);
        let mut stack = ContextStack::new(Box::new(editor), "tab");
        stack.push(completer("root"), Some(history.clone())).unwrap();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.history_file(), Some(&history));
    }

    #[test]
    fn other_history_errors_are_returned_but_pushed() {
        let dir = tempfile::tempdir().unwrap();
        let history = dir.path().join("history");
        std::fs::write(&history, "old\n").unwrap();

        let editor = UnreadableHistory::new(io::ErrorKind::InvalidData);
        let mut stack = ContextStack::new(Box::new(editor), "tab");
        let root = completer("root");
        let err = stack.push(root.clone(), Some(history)).unwrap_err();
        assert!(matches!(err, ShellError::Io(ref e) if e.kind() == io::ErrorKind::InvalidData));
        assert_eq!(stack.depth(), 1);
        assert!(Rc::ptr_eq(&installed(&stack).unwrap(), &root));
        stack.pop().unwrap();
        assert_eq!(stack.depth(), 0);
    }
}
