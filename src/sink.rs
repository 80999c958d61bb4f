//! Diagnostic output seam.
//!
//! Every subsystem writes line-oriented text to a [`DiagnosticSink`] it
//! owns. Production contexts use [`StderrSink`], which writes one
//! unbuffered line per event. [`CaptureSink`] records lines into a shared
//! buffer so tests can assert on exact line sequences, including ordering
//! across subsystems that share one sink.
//!
//! Line shapes, for downstream tooling that parses the stream:
//!
//! | Prefix       | Event                          |
//! |--------------|--------------------------------|
//! | `warning: `  | warning (or repeat summary)    |
//! | `error: `    | raised exception               |
//! | `+ `         | new root error (trail)         |
//! | `\| `        | trail continuation note        |
//! | `\ `         | handled/terminal trail event   |

use std::cell::RefCell;
use std::rc::Rc;

// ============================================================================
// Sink Trait
// ============================================================================

/// Destination for diagnostic lines.
///
/// Implementations must treat each `emit` as one complete line and must not
/// buffer across calls: a fatal path may terminate the process immediately
/// after its last emit.
pub trait DiagnosticSink {
    /// Writes one diagnostic line.
    fn emit(&mut self, line: &str);
}

// ============================================================================
// Stderr Sink
// ============================================================================

/// Default sink: one line per event on standard error.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn emit(&mut self, line: &str) {
        eprintln!("{line}");
    }
}

// ============================================================================
// Capture Sink
// ============================================================================

/// Test sink recording lines into a shared buffer.
///
/// Clones share the same buffer, so two contexts (say a [`crate::WarningLog`]
/// and a [`crate::ErrorTrail`]) can write to one stream and the test can
/// assert the interleaving.
#[derive(Clone, Debug, Default)]
pub struct CaptureSink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl CaptureSink {
    /// Creates a new empty capture buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all captured lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Returns the number of captured lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.borrow().len()
    }

    /// Returns true if nothing has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }

    /// Discards all captured lines.
    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl DiagnosticSink for CaptureSink {
    fn emit(&mut self, line: &str) {
        self.lines.borrow_mut().push(line.to_owned());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_records_lines_in_order() {
        let mut sink = CaptureSink::new();
        sink.emit("first");
        sink.emit("second");
        assert_eq!(sink.lines(), vec!["first", "second"]);
    }

    #[test]
    fn test_capture_clones_share_buffer() {
        let sink = CaptureSink::new();
        let mut a = sink.clone();
        let mut b = sink.clone();
        a.emit("from a");
        b.emit("from b");
        assert_eq!(sink.lines(), vec!["from a", "from b"]);
    }

    #[test]
    fn test_capture_clear() {
        let mut sink = CaptureSink::new();
        sink.emit("line");
        assert_eq!(sink.len(), 1);
        sink.clear();
        assert!(sink.is_empty());
    }
}
