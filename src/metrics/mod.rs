//! Metric library for surveycut
//!
//! Pure transforms from a selected column to a result record.
//!
//! # Conventions
//!
//! - Nulls and unparsable text are dropped from denominators, never errors
//! - Empty input yields an empty result (`None` headline, zero counts)
//! - Same input, same output: no randomness, no hidden state

mod boxes;
mod compute;
mod frequency;
mod mean;
mod nps;
mod result;

pub use boxes::{bottom2box, top2box};
pub use compute::{compute_metric, MetricInput};
pub use frequency::{frequency, multi_choice_frequency};
pub use mean::mean;
pub use nps::{nps, NpsThresholds};
pub use result::{
    BoxResult, BoxSide, FrequencyResult, FrequencyRow, MeanResult, MetricValue, NpsResult,
};
