//! Deduplicating warning log.
//!
//! Hot loops over malformed input tend to emit the same warning thousands
//! of times. The log writes the first occurrence immediately, swallows
//! consecutive repeats, and surfaces one summary line when a different
//! warning arrives or the log is flushed.
//!
//! ```text
//! warn("disk full")   →  warning: disk full
//! warn("disk full")   →  (held)
//! warn("disk full")   →  (held)
//! warn("retry")       →  warning: ... repeated 3 times ...
//!                        warning: retry
//! ```
//!
//! Output is observation-only: callers get no return value and must not
//! assume a repeat has been written until the log is flushed.

use crate::limits::format_clamped;
use crate::sink::{DiagnosticSink, StderrSink};
use std::fmt;

// ============================================================================
// Warning Log
// ============================================================================

/// Deduplicating warning log writing to a diagnostic sink.
///
/// Not share-safe: one instance per logical thread of control.
pub struct WarningLog {
    /// The most recently emitted warning text, clamped.
    last_message: String,

    /// How many times `last_message` has been seen since it was emitted.
    /// Zero means no flush is pending.
    repeat_count: u32,

    /// Destination stream.
    sink: Box<dyn DiagnosticSink>,
}

impl WarningLog {
    /// Creates a log writing to standard error.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(Box::new(StderrSink))
    }

    /// Creates a log writing to the given sink.
    #[must_use]
    pub fn with_sink(sink: Box<dyn DiagnosticSink>) -> Self {
        Self {
            last_message: String::new(),
            repeat_count: 0,
            sink,
        }
    }

    /// Reports a warning, deduplicating consecutive repeats.
    ///
    /// The formatted text is clamped to [`crate::MESSAGE_LIMIT`] bytes. A
    /// repeat of the pending message only bumps the count; a new message
    /// first flushes the pending summary, then is written immediately.
    pub fn warn(&mut self, args: fmt::Arguments<'_>) {
        let message = format_clamped(args);
        if self.repeat_count > 0 && message == self.last_message {
            self.repeat_count += 1;
            return;
        }
        self.flush();
        self.sink.emit(&format!("warning: {message}"));
        self.last_message = message;
        self.repeat_count = 1;
    }

    /// Flushes the pending repeat summary, if any.
    ///
    /// Emits one summary line when the pending message repeated at least
    /// twice, nothing otherwise. Always clears the pending state.
    pub fn flush(&mut self) {
        if self.repeat_count > 1 {
            self.sink
                .emit(&format!("warning: ... repeated {} times ...", self.repeat_count));
        }
        self.last_message.clear();
        self.repeat_count = 0;
    }

    /// Returns how many times the pending message has been seen.
    #[must_use]
    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }
}

impl Default for WarningLog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WarningLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarningLog")
            .field("last_message", &self.last_message)
            .field("repeat_count", &self.repeat_count)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Macros
// ============================================================================

/// Reports a warning with `format!`-style arguments.
///
/// ```
/// use vellum_diag::{warn, WarningLog};
///
/// let mut log = WarningLog::new();
/// warn!(log, "unknown filter {:?}", "FlateDecode");
/// ```
#[macro_export]
macro_rules! warn {
    ($log:expr, $($arg:tt)*) => {
        $log.warn(::core::format_args!($($arg)*))
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::MESSAGE_LIMIT;
    use crate::sink::CaptureSink;

    fn capture_log() -> (WarningLog, CaptureSink) {
        let sink = CaptureSink::new();
        (WarningLog::with_sink(Box::new(sink.clone())), sink)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Deduplication Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_first_warning_emitted_immediately() {
        let (mut log, sink) = capture_log();
        warn!(log, "disk full");
        assert_eq!(sink.lines(), vec!["warning: disk full"]);
    }

    #[test]
    fn test_repeats_are_held() {
        let (mut log, sink) = capture_log();
        for _ in 0..100 {
            warn!(log, "disk full");
        }
        assert_eq!(sink.len(), 1);
        assert_eq!(log.repeat_count(), 100);
    }

    #[test]
    fn test_different_message_flushes_summary() {
        let (mut log, sink) = capture_log();
        warn!(log, "disk full");
        warn!(log, "disk full");
        warn!(log, "disk full");
        warn!(log, "retry");
        assert_eq!(
            sink.lines(),
            vec![
                "warning: disk full",
                "warning: ... repeated 3 times ...",
                "warning: retry",
            ]
        );
    }

    #[test]
    fn test_single_warning_flush_no_summary() {
        let (mut log, sink) = capture_log();
        warn!(log, "once");
        log.flush();
        assert_eq!(sink.lines(), vec!["warning: once"]);
        assert_eq!(log.repeat_count(), 0);
    }

    #[test]
    fn test_flush_on_empty_log_emits_nothing() {
        let (mut log, sink) = capture_log();
        log.flush();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_explicit_flush_emits_summary() {
        let (mut log, sink) = capture_log();
        warn!(log, "slow xref scan");
        warn!(log, "slow xref scan");
        log.flush();
        assert_eq!(
            sink.lines(),
            vec![
                "warning: slow xref scan",
                "warning: ... repeated 2 times ...",
            ]
        );
    }

    #[test]
    fn test_flush_clears_pending_state() {
        let (mut log, sink) = capture_log();
        warn!(log, "again");
        warn!(log, "again");
        log.flush();
        // Same text after a flush counts as a fresh warning.
        warn!(log, "again");
        assert_eq!(sink.lines().last().unwrap(), "warning: again");
        assert_eq!(log.repeat_count(), 1);
    }

    #[test]
    fn test_alternating_messages_never_deduplicate() {
        let (mut log, sink) = capture_log();
        warn!(log, "a");
        warn!(log, "b");
        warn!(log, "a");
        warn!(log, "b");
        assert_eq!(
            sink.lines(),
            vec!["warning: a", "warning: b", "warning: a", "warning: b"]
        );
    }

    // ════════════════════════════════════════════════════════════════════════
    // Edge Cases
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_empty_warning_is_emitted() {
        let (mut log, sink) = capture_log();
        warn!(log, "");
        assert_eq!(sink.lines(), vec!["warning: "]);
    }

    #[test]
    fn test_over_length_warning_truncated() {
        let (mut log, sink) = capture_log();
        let long = "z".repeat(400);
        warn!(log, "{long}");
        let line = &sink.lines()[0];
        assert_eq!(line.len(), "warning: ".len() + MESSAGE_LIMIT);
    }

    #[test]
    fn test_truncated_repeats_compare_equal() {
        // Two messages differing only past the limit deduplicate.
        let (mut log, sink) = capture_log();
        let base = "z".repeat(MESSAGE_LIMIT);
        warn!(log, "{base}AAAA");
        warn!(log, "{base}BBBB");
        assert_eq!(sink.len(), 1);
        assert_eq!(log.repeat_count(), 2);
    }

    #[test]
    fn test_formatting_arguments() {
        let (mut log, sink) = capture_log();
        warn!(log, "object {} out of range {}..{}", 12, 0, 10);
        assert_eq!(sink.lines(), vec!["warning: object 12 out of range 0..10"]);
    }
}
