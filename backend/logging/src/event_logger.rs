//! Operation Event Logger
//!
//! Structured events (started, succeeded, failed) for each concat or
//! watermark request, written through `tracing` on the `operation_events`
//! target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::stderr_tail::stderr_tail;

/// Lines of tool diagnostics kept in a failure event.
const FAILURE_TAIL_LINES: usize = 6;

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum OperationEvent {
    Started {
        operation: String,
        inputs: Vec<String>,
    },
    Succeeded {
        operation: String,
        output: String,
    },
    Failed {
        operation: String,
        class: String,
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: OperationEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Log an operation event, condensing any tool diagnostics first.
    pub fn log_event(request_id: &str, mut event: OperationEvent) {
        let failed = matches!(event, OperationEvent::Failed { .. });
        if let OperationEvent::Failed { error_msg, .. } = &mut event {
            *error_msg = stderr_tail(error_msg, FAILURE_TAIL_LINES);
        }

        let entry = EventLogEntry {
            request_id: request_id.into(),
            timestamp: Utc::now(),
            event,
        };

        let json = serde_json::to_string(&entry).unwrap_or_default();
        if failed {
            warn!(target: "operation_events", event = %json, "Operation event");
        } else {
            info!(target: "operation_events", event = %json, "Operation event");
        }
    }
}
