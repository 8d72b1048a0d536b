//! Output redirection: a duplicating writer and its install/restore cycle.

use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::rc::Rc;

use crate::parse::{RedirectMode, Redirection};

/// A writer that forwards every write to two underlying writers.
///
/// The primary receives each buffer first; the secondary is written with
/// exactly the bytes the primary accepted so both sinks stay in step.
pub struct Tee<A: Write, B: Write> {
    primary: A,
    secondary: B,
}

impl<A: Write, B: Write> Tee<A, B> {
    pub fn new(primary: A, secondary: B) -> Self {
        Self { primary, secondary }
    }

    /// Flush both sides and hand them back.
    pub fn into_parts(mut self) -> io::Result<(A, B)> {
        self.flush()?;
        Ok((self.primary, self.secondary))
    }
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.primary.write(buf)?;
        self.secondary.write_all(&buf[..n])?;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        self.secondary.flush()
    }
}

/// The output of a command whose output is being redirected.
pub type RedirectedOutput<'a> = Tee<&'a mut dyn Write, BufWriter<File>>;

/// Open the redirection target in the requested mode.
pub fn open_target(redirection: &Redirection) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true);
    match redirection.mode {
        RedirectMode::Overwrite => options.write(true).truncate(true),
        RedirectMode::Append => options.append(true),
    };
    options.open(&redirection.target)
}

/// Wrap `output` so writes also land in the redirection target.
///
/// The tee borrows `output` for as long as it lives; [`Tee::restore`] (or simply
/// dropping the tee) gives the original back.
pub fn install<'a>(
    redirection: &Redirection,
    output: &'a mut dyn Write,
) -> io::Result<RedirectedOutput<'a>> {
    let file = open_target(redirection)?;
    log::debug!(
        "redirecting output {} {}",
        redirection.mode.as_str(),
        redirection.target.display()
    );
    Ok(Tee::new(output, BufWriter::new(file)))
}

impl<'a> Tee<&'a mut dyn Write, BufWriter<File>> {
    /// Flush the target file and return the pre-redirection output.
    ///
    /// A flush failure is logged; the original output is handed back either way.
    pub fn restore(self) -> &'a mut dyn Write {
        let Tee {
            primary,
            mut secondary,
        } = self;
        if let Err(e) = secondary.flush() {
            log::warn!("failed to flush redirection target: {e}");
        }
        primary
    }
}

/// An in-memory sink whose contents stay readable after it is handed to a
/// [`Shell`](crate::shell::Shell) as its output or error stream.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    /// Take the contents, leaving the buffer empty.
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.borrow_mut());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
