//! Observability for surveycut
//!
//! - Structured logging (JSON lines on stderr)
//! - Engine counters
//! - Typed lifecycle events
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution results
//! 3. No background threads
//! 4. Deterministic output

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{EngineMetrics, MetricsSnapshot};

/// Log a lifecycle event at its default severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
