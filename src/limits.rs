//! Shared bounds for diagnostic lines.
//!
//! Every subsystem in this crate stores formatted text in bounded buffers:
//! over-length messages are truncated silently, never rejected, and the
//! truncation is never reported as a secondary error. The exception stack
//! and the error trail also share one capacity constant for their
//! fixed-depth structures.

use std::fmt;

// ============================================================================
// Constants
// ============================================================================

/// Maximum stored length of a formatted diagnostic message, in bytes.
///
/// Anything beyond this is dropped at the nearest UTF-8 boundary.
pub const MESSAGE_LIMIT: usize = 159;

/// Capacity of the fixed-depth diagnostic structures: the protected-scope
/// stack and the error trail both hold at most this many entries.
pub const DIAG_LINE_COUNT: usize = 25;

// ============================================================================
// Truncation
// ============================================================================

/// Truncates `text` in place to at most [`MESSAGE_LIMIT`] bytes.
///
/// The cut lands on a character boundary, so a multi-byte character
/// straddling the limit is dropped whole.
pub fn clamp(text: &mut String) {
    if text.len() > MESSAGE_LIMIT {
        let mut end = MESSAGE_LIMIT;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
}

/// Formats `args` into an owned string clamped to [`MESSAGE_LIMIT`] bytes.
#[must_use]
pub fn format_clamped(args: fmt::Arguments<'_>) -> String {
    let mut text = args.to_string();
    clamp(&mut text);
    text
}

// ============================================================================
// Tests
// ============================================================================
