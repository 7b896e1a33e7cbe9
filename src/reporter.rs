//! Progress reporting
//!
//! The engine emits one status line per reporting interval through a
//! [`Reporter`]. The default sink forwards to `tracing`; the buffer sink
//! captures lines so tests and callers can inspect them.

use parking_lot::Mutex;
use std::sync::Arc;

/// Append-only text sink for progress lines
pub trait Reporter: Send {
    /// Write one progress line
    fn writeln(&mut self, line: &str);
}

/// Reporter forwarding every line to `tracing::info!`
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn writeln(&mut self, line: &str) {
        tracing::info!(target: "blackbird::progress", "{line}");
    }
}

/// Reporter that keeps every line in memory
#[derive(Debug, Clone, Default)]
pub struct BufferReporter {
    lines: Arc<Mutex<Vec<String>>>,
}

impl BufferReporter {
    /// Create an empty buffer reporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl Reporter for BufferReporter {
    fn writeln(&mut self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

/// Reporter that drops everything
#[derive(Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn writeln(&mut self, _line: &str) {}
}

/// The supplied reporter, or the tracing default
pub fn reporter_or_default(reporter: Option<Box<dyn Reporter>>) -> Box<dyn Reporter> {
    reporter.unwrap_or_else(|| Box::new(TracingReporter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_reporter_captures_lines() {
        let buffer = BufferReporter::new();
        let mut handle = buffer.clone();
        handle.writeln("first");
        handle.writeln("second");
        assert_eq!(buffer.lines(), vec!["first", "second"]);
    }

    #[test]
    fn test_default_reporter_is_tracing() {
        let mut r = reporter_or_default(None);
        r.writeln("goes to tracing");
    }
}
