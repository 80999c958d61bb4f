//! Protected-scope exception stack.
//!
//! The engine's fatal errors do not propagate through return values: a
//! raise transfers control directly to the innermost *protected scope*,
//! unwinding everything in between. This module tracks the armed scopes
//! and performs the transfer.
//!
//! # Protocol
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Protected-Scope Protocol                      │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                   │
//! │   protect(f) ──▶ push_try ──▶ run f ──┬─▶ normal exit: pop, Ok   │
//! │                     │                 │                           │
//! │               depth = 25?             └─▶ throw: unwind to the    │
//! │                     │                     newest scope, pop,      │
//! │                     ▼                     Err(CaughtError)        │
//! │          "exception stack overflow!"                              │
//! │               process exit(1)         throw with no armed scope:  │
//! │                                       "uncaught exception: ..."   │
//! │                                       process exit(1)             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same raise is catchable or fatal purely on caller discipline:
//! [`ExceptionStack::throw`] resumes the most recently armed scope when one
//! exists (LIFO, no matching by kind) and terminates the process when none
//! does. Stack overflow on arming is likewise fatal: 25 unpopped scopes
//! means unbalanced nesting, a programming defect rather than a condition
//! to negotiate.
//!
//! The transfer itself rides the platform unwinder via
//! [`std::panic::resume_unwind`] with a private payload type, so the panic
//! hook stays silent and destructors of everything between raise and scope
//! run. Foreign panics pass through [`protect`](ExceptionStack::protect)
//! untouched.

use crate::limits::{format_clamped, DIAG_LINE_COUNT};
use crate::sink::{DiagnosticSink, StderrSink};
use smallvec::SmallVec;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::process;
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Inline capacity for the scope stack; deeper nesting spills to the heap.
const INLINE_SCOPE_CAPACITY: usize = 8;

/// Maximum number of simultaneously armed scopes. Exceeding this is fatal.
pub const MAX_TRY_DEPTH: usize = DIAG_LINE_COUNT;

// ============================================================================
// Scope Frame
// ============================================================================

/// One armed protected scope.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ScopeFrame {
    /// Stack depth at which this scope was armed (0 = outermost).
    depth: u16,
}

impl ScopeFrame {
    /// Creates a frame armed at the given depth.
    #[inline]
    #[must_use]
    pub const fn new(depth: u16) -> Self {
        Self { depth }
    }

    /// Depth at which this scope was armed.
    #[inline]
    #[must_use]
    pub const fn depth(&self) -> u16 {
        self.depth
    }
}

impl fmt::Debug for ScopeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeFrame(depth={})", self.depth)
    }
}

// ============================================================================
// Caught Error
// ============================================================================

/// Error delivered to a protected scope when a throw resumed it.
///
/// Carries only the formatted message, already clamped; there is no kind or
/// code to match on. A handler that cannot fully recover forwards it with
/// [`ExceptionStack::rethrow`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CaughtError {
    /// The raised message, clamped to [`crate::MESSAGE_LIMIT`] bytes.
    pub message: String,
}

// ============================================================================
// Transfer Signal
// ============================================================================

/// Private unwind payload distinguishing our transfers from foreign panics.
struct ThrowSignal;

// ============================================================================
// Exception Stack
// ============================================================================

/// Bounded stack of protected scopes with longjmp-style raise.
///
/// Not share-safe: one instance per logical thread of control.
///
/// # Usage
///
/// ```
/// use vellum_diag::{throw, ExceptionStack};
///
/// let mut ex = ExceptionStack::new();
/// let result = ex.protect(|ex| {
///     if true {
///         throw!(ex, "cannot repair xref table");
///     }
/// });
/// assert_eq!(result.unwrap_err().message, "cannot repair xref table");
/// ```
pub struct ExceptionStack {
    /// Armed scopes, newest on top.
    frames: SmallVec<[ScopeFrame; INLINE_SCOPE_CAPACITY]>,

    /// The active error message, overwritten on every raise.
    message: String,

    /// Destination stream for raise and fatal diagnostics.
    sink: Box<dyn DiagnosticSink>,
}

impl ExceptionStack {
    /// Creates a stack writing diagnostics to standard error.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(Box::new(StderrSink))
    }

    /// Creates a stack writing diagnostics to the given sink.
    #[must_use]
    pub fn with_sink(sink: Box<dyn DiagnosticSink>) -> Self {
        Self {
            frames: SmallVec::new(),
            message: String::new(),
            sink,
        }
    }

    /// Returns the number of armed scopes.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if no scope is armed (a throw would be fatal).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Maximum number of simultaneously armed scopes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        MAX_TRY_DEPTH
    }

    /// Arms a new scope.
    ///
    /// Called by [`protect`](Self::protect), which also guarantees the
    /// matching pop on both exit paths; pairing is the protected-scope
    /// construct's responsibility, not the raiser's.
    ///
    /// # Termination
    ///
    /// Exceeding [`MAX_TRY_DEPTH`] armed scopes reports
    /// `exception stack overflow!` and terminates the process: unbalanced
    /// nesting is a programming defect, not a recoverable error.
    pub fn push_try(&mut self) {
        if self.frames.len() >= MAX_TRY_DEPTH {
            self.sink.emit("exception stack overflow!");
            process::exit(1);
        }
        let depth = u16::try_from(self.frames.len()).unwrap_or(u16::MAX);
        self.frames.push(ScopeFrame::new(depth));
    }

    /// Runs `f` inside a protected scope.
    ///
    /// Returns `Ok` with `f`'s value on normal completion, or
    /// `Err(CaughtError)` when a [`throw`](Self::throw) or
    /// [`rethrow`](Self::rethrow) from within `f` (at any call depth)
    /// transferred control here. Nested scopes catch innermost-first.
    ///
    /// The scope is disarmed on every exit path, including foreign panics,
    /// which are resumed rather than swallowed.
    pub fn protect<T, F>(&mut self, f: F) -> Result<T, CaughtError>
    where
        F: FnOnce(&mut ExceptionStack) -> T,
    {
        self.push_try();
        let armed = self.frames.len();
        let result = panic::catch_unwind(AssertUnwindSafe(|| f(&mut *self)));
        match result {
            Ok(value) => {
                self.frames.truncate(armed - 1);
                Ok(value)
            }
            Err(payload) => {
                self.frames.truncate(armed - 1);
                if payload.is::<ThrowSignal>() {
                    Err(CaughtError {
                        message: self.message.clone(),
                    })
                } else {
                    panic::resume_unwind(payload)
                }
            }
        }
    }

    /// Raises an error.
    ///
    /// Stores the clamped message as the active error, writes
    /// `error: <message>` to the diagnostic stream, then transfers control
    /// to the innermost armed scope. With no scope armed, writes
    /// `uncaught exception: <message>` and terminates the process — the
    /// raise never returns either way.
    pub fn throw(&mut self, args: fmt::Arguments<'_>) -> ! {
        let message = format_clamped(args);
        self.sink.emit(&format!("error: {message}"));
        self.message = message;
        self.transfer()
    }

    /// Re-raises the active error toward the next outer scope.
    ///
    /// Reuses the stored message byte-for-byte: no formatting, no new
    /// diagnostic line. Only meaningful from a handler that was resumed by
    /// a throw and cannot fully recover.
    pub fn rethrow(&mut self) -> ! {
        debug_assert!(
            !self.message.is_empty(),
            "rethrow with no active error"
        );
        self.transfer()
    }

    /// Returns the active error message.
    ///
    /// Only valid after a throw has transferred control into a handler;
    /// outside that window the content is stale.
    #[must_use]
    pub fn caught(&self) -> &str {
        debug_assert!(
            !self.message.is_empty(),
            "caught() with no active error"
        );
        &self.message
    }

    /// Transfers control to the newest armed scope, or terminates.
    fn transfer(&mut self) -> ! {
        if !self.frames.is_empty() {
            panic::resume_unwind(Box::new(ThrowSignal));
        }
        self.sink
            .emit(&format!("uncaught exception: {}", self.message));
        process::exit(1);
    }
}

impl Default for ExceptionStack {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExceptionStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionStack")
            .field("depth", &self.frames.len())
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Macros
// ============================================================================

/// Raises an error with `format!`-style arguments. Never returns.
///
/// ```
/// use vellum_diag::{throw, ExceptionStack};
///
/// let mut ex = ExceptionStack::new();
/// let result: Result<(), _> = ex.protect(|ex| {
///     throw!(ex, "object {} is damaged", 3);
/// });
/// assert_eq!(result.unwrap_err().message, "object 3 is damaged");
/// ```
#[macro_export]
macro_rules! throw {
    ($ex:expr, $($arg:tt)*) => {
        $ex.throw(::core::format_args!($($arg)*))
    };
}

// ============================================================================
// Tests
// ============================================================================
