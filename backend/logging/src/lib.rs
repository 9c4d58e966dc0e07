//! Structured logging components for ReelForge.
//!
//! Handles console and rolling JSON output, operation event logging, and
//! condensing of ffmpeg diagnostics.

pub mod event_logger;
pub mod logger;
pub mod stderr_tail;

pub use event_logger::{EventLogEntry, EventLogger, OperationEvent};
pub use logger::{init_console_logger, init_logger};
pub use stderr_tail::stderr_tail;
