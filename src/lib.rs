//! # Vellum Diagnostics
//!
//! Diagnostics and non-local-exit core for the Vellum document engine.
//!
//! This crate provides the three subsystems the rest of the engine reports
//! through:
//!
//! - **Warning Log**: deduplicates consecutive identical warnings, emitting a
//!   single "repeated N times" summary instead of flooding the diagnostic
//!   stream from a hot loop.
//! - **Exception Stack**: a bounded stack of protected scopes with
//!   longjmp-style transfer. Raising an error resumes the innermost armed
//!   scope, or terminates the process when no scope is armed.
//! - **Error Trail** (deprecated): a bounded trail of `location: message`
//!   lines recording one error's propagation for callers still on the
//!   sentinel-return convention.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Diagnostics Core                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  ┌──────────────┐    ┌────────────────┐    ┌──────────────────┐│
//! │  │  WarningLog  │◀───│   ErrorTrail   │    │  ExceptionStack  ││
//! │  │  (dedup +    │flush│  (deprecated  │    │  (protect/throw/ ││
//! │  │   flush)     │    │   bubbling)    │    │   rethrow)       ││
//! │  └──────┬───────┘    └───────┬────────┘    └────────┬─────────┘│
//! │         │                    │                      │          │
//! │         └──────────┬─────────┴──────────────────────┘          │
//! │                    ▼                                           │
//! │           ┌─────────────────┐                                  │
//! │           │ DiagnosticSink  │  one line per event:             │
//! │           │ (stderr default)│  `warning:` / `error:` / `+|\`   │
//! │           └─────────────────┘                                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All state is explicit context objects with no synchronization; each
//! logical thread of control must own its own instances. See the module
//! docs for the per-subsystem contracts.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod exception;
pub mod limits;
pub mod sink;
pub mod trail;
pub mod warnings;

pub use exception::{CaughtError, ExceptionStack, ScopeFrame, MAX_TRY_DEPTH};
pub use limits::{DIAG_LINE_COUNT, MESSAGE_LIMIT};
pub use sink::{CaptureSink, DiagnosticSink, StderrSink};
pub use trail::{ErrorTrail, SourceLocation, TrailError, TrailEvent};
pub use warnings::WarningLog;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
