//! Where `print` output goes.
//!
//! - stdout (default), flushed after every line
//! - a buffer, for tests and embedders that capture output
//! - nowhere
//!
//! Enum dispatch rather than a trait object: the set of destinations is
//! closed and `print` is on a hot path in loops.

use std::io::Write;

use parking_lot::Mutex;

/// Writes to stdout.
#[derive(Default)]
pub struct StdoutPrintHandler;

impl StdoutPrintHandler {
    pub fn println(&self, msg: &str) {
        let mut out = std::io::stdout().lock();
        // A closed stdout is not a program error.
        let _ = writeln!(out, "{msg}");
        let _ = out.flush();
    }

    pub fn print(&self, msg: &str) {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "{msg}");
        let _ = out.flush();
    }
}

/// Captures output in memory.
#[derive(Default)]
pub struct BufferPrintHandler {
    buffer: Mutex<String>,
}

impl BufferPrintHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn println(&self, msg: &str) {
        let mut buf = self.buffer.lock();
        buf.push_str(msg);
        buf.push('\n');
    }

    pub fn print(&self, msg: &str) {
        self.buffer.lock().push_str(msg);
    }

    pub fn get_output(&self) -> String {
        self.buffer.lock().clone()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

/// Print destination.
pub enum PrintHandlerImpl {
    Stdout(StdoutPrintHandler),
    Buffer(BufferPrintHandler),
    /// Discards all output.
    Silent,
}

impl PrintHandlerImpl {
    pub fn println(&self, msg: &str) {
        match self {
            Self::Stdout(h) => h.println(msg),
            Self::Buffer(h) => h.println(msg),
            Self::Silent => {}
        }
    }

    pub fn print(&self, msg: &str) {
        match self {
            Self::Stdout(h) => h.print(msg),
            Self::Buffer(h) => h.print(msg),
            Self::Silent => {}
        }
    }

    /// Captured output; empty for stdout and silent handlers.
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(h) => h.get_output(),
            Self::Stdout(_) | Self::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(h) = self {
            h.clear();
        }
    }
}

/// Shared print handler. `Arc` so callers can keep a handle and read the
/// buffer after the interpreter is gone.
pub type SharedPrintHandler = std::sync::Arc<PrintHandlerImpl>;

pub fn stdout_handler() -> SharedPrintHandler {
    std::sync::Arc::new(PrintHandlerImpl::Stdout(StdoutPrintHandler))
}

pub fn buffer_handler() -> SharedPrintHandler {
    std::sync::Arc::new(PrintHandlerImpl::Buffer(BufferPrintHandler::new()))
}

pub fn silent_handler() -> SharedPrintHandler {
    std::sync::Arc::new(PrintHandlerImpl::Silent)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn buffer_println_appends_newline() {
        let handler = BufferPrintHandler::new();
        handler.print("a");
        handler.println("b");
        assert_eq!(handler.get_output(), "ab\n");
        handler.clear();
        assert!(handler.get_output().is_empty());
    }

    #[test]
    fn factories() {
        let buffer = buffer_handler();
        buffer.println("test");
        assert_eq!(buffer.get_output(), "test\n");

        let silent = silent_handler();
        silent.println("hello");
        assert_eq!(silent.get_output(), "");

        assert_eq!(stdout_handler().get_output(), "");
    }

    #[test]
    fn buffer_is_shareable_across_threads() {
        let handler = buffer_handler();
        let other = handler.clone();
        let t = std::thread::spawn(move || {
            for _ in 0..50 {
                other.println("a");
            }
        });
        for _ in 0..50 {
            handler.println("b");
        }
        t.join().unwrap();
        assert_eq!(handler.get_output().lines().count(), 100);
    }
}
