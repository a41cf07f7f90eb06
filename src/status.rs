//! Human-readable status lines for invalidation runs.
//!
//! A provider opens a line with [`StatusReporter::begin`] and closes it with
//! either [`StatusReporter::success`] or [`StatusReporter::failure`]:
//!
//! ```text
//! [cloudfront] Invalidating 12 files... ✔
//! [maxcdn] Invalidating 12 files..., error: 401 Unauthorized
//! ```

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use console::style;

/// Writes provider status lines to a sink (stdout by default).
pub struct StatusReporter {
    out: Box<dyn Write + Send>,
    colors: bool,
}

impl StatusReporter {
    /// Reporter on stdout, colored when the terminal supports it.
    pub fn stdout() -> Self {
        Self {
            out: Box::new(io::stdout()),
            colors: console::colors_enabled(),
        }
    }

    /// Reporter on an arbitrary sink, without colors.
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Box::new(out),
            colors: false,
        }
    }

    /// Reporter writing into a shared in-memory buffer.
    pub fn buffered() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Self::new(buffer.clone()), buffer)
    }

    /// Start a status line for `provider` without terminating it.
    pub fn begin(&mut self, provider: &str, message: &str) {
        let header = style(format!("[{provider}]")).cyan().force_styling(self.colors);
        let _ = write!(self.out, "{header} {message}");
        let _ = self.out.flush();
    }

    /// Close the current line with a success marker.
    pub fn success(&mut self) {
        let mark = style("✔").green().force_styling(self.colors);
        let _ = writeln!(self.out, " {mark}");
    }

    /// Close the current line with an error message.
    pub fn failure(&mut self, message: &str) {
        let error = style(format!("error: {message}"))
            .red()
            .force_styling(self.colors);
        let _ = writeln!(self.out, ", {error}");
    }

    /// A complete error line for `provider`.
    pub fn error_line(&mut self, provider: &str, message: &str) {
        let header = style(format!("[{provider}]")).cyan().force_styling(self.colors);
        let text = style(message).red().force_styling(self.colors);
        let _ = writeln!(self.out, "{header} {text}");
    }
}

/// Cloneable in-memory sink for [`StatusReporter::buffered`].
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        match self.0.lock() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self
            .0
            .lock()
            .map_err(|_| io::Error::other("status buffer lock poisoned"))?;
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
