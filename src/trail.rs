//! Deprecated sentinel-based error trail.
//!
//! Callers predating the protected-scope protocol signal failure through
//! ordinary return values and record context as they bubble the error up by
//! hand. This module keeps that convention working: each reporting call
//! writes one marked line to the diagnostic stream and appends a
//! `location: message` entry to a bounded trail that models a single
//! error's propagation.
//!
//! ```text
//! + pdf/xref.rs:88: load_xref(): cannot find startxref     (root: trail reset)
//! | pdf/doc.rs:40: open_document(): opening "broken.pdf"   (note: appended)
//! \ viewer.rs:12: load_page(): giving up on page 3         (handled: appended)
//! ```
//!
//! The root raise clears history; notes and the terminal handle append while
//! capacity remains and are dropped silently beyond it. Diagnostic data here
//! is best-effort, unlike the exception stack's hard depth invariant.
//!
//! Prefer [`crate::ExceptionStack`] for new code.

use crate::limits::{clamp, format_clamped, DIAG_LINE_COUNT};
use crate::sink::{DiagnosticSink, StderrSink};
use crate::warnings::WarningLog;
use std::fmt;

// ============================================================================
// Trail Event
// ============================================================================

/// Kind of trail event, determining the line's marker prefix.
///
/// Together with the unmarked `warning:` lines, the markers keep the four
/// diagnostic event kinds machine-distinguishable on one stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrailEvent {
    /// A new root error; resets the trail.
    Root,

    /// A continuation note while the error bubbles up.
    Note,

    /// The error was consumed without further propagation.
    Handled,
}

impl TrailEvent {
    /// Returns the one-character marker prefixing this event's line.
    #[inline]
    #[must_use]
    pub const fn marker(self) -> char {
        match self {
            Self::Root => '+',
            Self::Note => '|',
            Self::Handled => '\\',
        }
    }

    /// Returns a human-readable name.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Root => "Root",
            Self::Note => "Note",
            Self::Handled => "Handled",
        }
    }
}

impl fmt::Display for TrailEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Trail Error Sentinel
// ============================================================================

/// Opaque sentinel returned through the deprecated convention.
///
/// Carries no message; it stands for "an error occurred" in a function's
/// ordinary return value. Callers forward it unchanged via
/// [`ErrorTrail::note_error`] and read the recorded text back through
/// [`ErrorTrail::error_line`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use = "forward the sentinel to the caller or consume it with handle_error"]
pub struct TrailError;

// ============================================================================
// Source Location
// ============================================================================

/// Call-site location rendered into trail lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file path.
    pub file: &'static str,

    /// 1-based line number.
    pub line: u32,

    /// Enclosing function name, without path or parentheses.
    pub function: &'static str,
}

impl SourceLocation {
    /// Creates a location.
    #[inline]
    #[must_use]
    pub const fn new(file: &'static str, line: u32, function: &'static str) -> Self {
        Self {
            file,
            line,
            function,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}(): ", self.file, self.line, self.function)
    }
}

// ============================================================================
// Error Trail
// ============================================================================

/// Bounded trail of one error's propagation history.
///
/// Not share-safe: one instance per logical thread of control. Each
/// reporting call takes the [`WarningLog`] explicitly so any pending
/// repeat summary lands on the stream before the error line.
pub struct ErrorTrail {
    /// Recorded lines for the current error, oldest first.
    entries: Vec<String>,

    /// Destination stream.
    sink: Box<dyn DiagnosticSink>,
}

impl ErrorTrail {
    /// Creates a trail writing to standard error.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(Box::new(StderrSink))
    }

    /// Creates a trail writing to the given sink.
    #[must_use]
    pub fn with_sink(sink: Box<dyn DiagnosticSink>) -> Self {
        Self {
            entries: Vec::new(),
            sink,
        }
    }

    /// Records a new root error with a call-site location.
    ///
    /// Flushes pending warnings, writes the `+`-marked line, resets the
    /// trail, and appends the line as entry 0.
    pub fn make_error_at(
        &mut self,
        warnings: &mut WarningLog,
        location: SourceLocation,
        args: fmt::Arguments<'_>,
    ) -> TrailError {
        self.entries.clear();
        self.emit(warnings, TrailEvent::Root, &clamped_location(location), args);
        TrailError
    }

    /// Records a new root error without a location.
    pub fn make_error(&mut self, warnings: &mut WarningLog, args: fmt::Arguments<'_>) -> TrailError {
        self.entries.clear();
        self.emit(warnings, TrailEvent::Root, "", args);
        TrailError
    }

    /// Records a continuation note with a call-site location.
    ///
    /// Appends without resetting and returns `cause` unchanged, so callers
    /// can log context while passing the original sentinel up the chain.
    pub fn note_error_at(
        &mut self,
        warnings: &mut WarningLog,
        location: SourceLocation,
        cause: TrailError,
        args: fmt::Arguments<'_>,
    ) -> TrailError {
        self.emit(warnings, TrailEvent::Note, &clamped_location(location), args);
        cause
    }

    /// Records a continuation note without a location.
    pub fn note_error(
        &mut self,
        warnings: &mut WarningLog,
        cause: TrailError,
        args: fmt::Arguments<'_>,
    ) -> TrailError {
        self.emit(warnings, TrailEvent::Note, "", args);
        cause
    }

    /// Records that the error was consumed, with a call-site location.
    ///
    /// Appends under the same capacity rule as a note; the sentinel stops
    /// here and is not returned.
    pub fn handle_error_at(
        &mut self,
        warnings: &mut WarningLog,
        location: SourceLocation,
        cause: TrailError,
        args: fmt::Arguments<'_>,
    ) {
        let _ = cause;
        self.emit(warnings, TrailEvent::Handled, &clamped_location(location), args);
    }

    /// Records that the error was consumed, without a location.
    pub fn handle_error(
        &mut self,
        warnings: &mut WarningLog,
        cause: TrailError,
        args: fmt::Arguments<'_>,
    ) {
        let _ = cause;
        self.emit(warnings, TrailEvent::Handled, "", args);
    }

    /// Returns the number of recorded trail entries, never above
    /// [`DIAG_LINE_COUNT`].
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns the `n`-th recorded entry, oldest first, or `None` past the
    /// count.
    #[must_use]
    pub fn error_line(&self, n: usize) -> Option<&str> {
        self.entries.get(n).map(String::as_str)
    }

    /// Shared emit path: flush warnings, write the marked line, append the
    /// clamped `location + message` entry while capacity remains.
    fn emit(
        &mut self,
        warnings: &mut WarningLog,
        event: TrailEvent,
        location: &str,
        args: fmt::Arguments<'_>,
    ) {
        warnings.flush();

        let message = format_clamped(args);
        self.sink
            .emit(&format!("{} {location}{message}", event.marker()));

        if self.entries.len() < DIAG_LINE_COUNT {
            let mut entry = String::with_capacity(location.len() + message.len());
            entry.push_str(location);
            entry.push_str(&message);
            clamp(&mut entry);
            self.entries.push(entry);
        }
    }
}

impl Default for ErrorTrail {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ErrorTrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorTrail")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

/// Renders a location clamped to the per-half line limit.
fn clamped_location(location: SourceLocation) -> String {
    let mut text = location.to_string();
    clamp(&mut text);
    text
}

// ============================================================================
// Macros
// ============================================================================

/// Captures the current file, line, and enclosing function as a
/// [`SourceLocation`].
#[macro_export]
macro_rules! source_location {
    () => {{
        fn here() {}
        fn name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        let name = name_of(here);
        let name = name.strip_suffix("::here").unwrap_or(name);
        let name = name.rsplit("::").next().unwrap_or(name);
        $crate::SourceLocation::new(::core::file!(), ::core::line!(), name)
    }};
}

/// Records a new root error at the current call site.
///
/// Expands to [`ErrorTrail::make_error_at`] with an automatic
/// [`SourceLocation`].
#[macro_export]
macro_rules! make_error {
    ($trail:expr, $warnings:expr, $($arg:tt)*) => {
        $trail.make_error_at(
            $warnings,
            $crate::source_location!(),
            ::core::format_args!($($arg)*),
        )
    };
}

/// Records a continuation note at the current call site, forwarding `cause`.
#[macro_export]
macro_rules! note_error {
    ($trail:expr, $warnings:expr, $cause:expr, $($arg:tt)*) => {
        $trail.note_error_at(
            $warnings,
            $crate::source_location!(),
            $cause,
            ::core::format_args!($($arg)*),
        )
    };
}

/// Records the terminal handling of `cause` at the current call site.
#[macro_export]
macro_rules! handle_error {
    ($trail:expr, $warnings:expr, $cause:expr, $($arg:tt)*) => {
        $trail.handle_error_at(
            $warnings,
            $crate::source_location!(),
            $cause,
            ::core::format_args!($($arg)*),
        )
    };
}

// ============================================================================
// Tests
// ============================================================================
