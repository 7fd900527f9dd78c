//! Observable engine events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Loading
    /// Engine configuration loaded
    ConfigLoaded,
    /// Question catalog loaded
    CatalogLoaded,
    /// Responses loaded
    DatasetLoaded,

    // Batch lifecycle
    /// Batch execution begins
    BatchStart,
    /// Segment mask computed
    SegmentMaterialized,
    /// Segment failed validation and was not materialized
    SegmentRejected,
    /// Cut failed validation and did not run
    CutRejected,
    /// Cut produced a table
    CutComplete,
    /// Cut raised an execution error
    CutFailed,
    /// Batch execution finished
    BatchComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CatalogLoaded => "CATALOG_LOADED",
            Event::DatasetLoaded => "DATASET_LOADED",
            Event::BatchStart => "BATCH_START",
            Event::SegmentMaterialized => "SEGMENT_MATERIALIZED",
            Event::SegmentRejected => "SEGMENT_REJECTED",
            Event::CutRejected => "CUT_REJECTED",
            Event::CutComplete => "CUT_COMPLETE",
            Event::CutFailed => "CUT_FAILED",
            Event::BatchComplete => "BATCH_COMPLETE",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::SegmentMaterialized | Event::CutComplete => Severity::Trace,
            Event::SegmentRejected | Event::CutRejected => Severity::Warn,
            Event::CutFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::CatalogLoaded,
            Event::DatasetLoaded,
            Event::BatchStart,
            Event::SegmentMaterialized,
            Event::SegmentRejected,
            Event::CutRejected,
            Event::CutComplete,
            Event::CutFailed,
            Event::BatchComplete,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert_eq!(s, s.to_uppercase());
        }
    }

    #[test]
    fn test_failure_events_are_loud() {
        assert_eq!(Event::CutFailed.severity(), Severity::Error);
        assert_eq!(Event::CutRejected.severity(), Severity::Warn);
        assert_eq!(Event::BatchStart.severity(), Severity::Info);
    }
}
