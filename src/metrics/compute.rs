//! Metric dispatch

use crate::dataset::Cell;
use crate::schema::{MetricParams, MetricType, ParamError, Question, QuestionType};

use super::boxes::{bottom2box, top2box};
use super::frequency::{frequency, multi_choice_frequency};
use super::mean::mean;
use super::nps::{nps, NpsThresholds};
use super::result::MetricValue;

/// Everything a metric needs from one selected group
#[derive(Debug, Clone, Copy)]
pub struct MetricInput<'a> {
    pub cells: &'a [Cell],
    pub question: Option<&'a Question>,
    pub params: &'a MetricParams,
    /// Row-aligned weights; only the mean uses them
    pub weights: Option<&'a [Cell]>,
    pub delimiter: &'a str,
}

/// Computes `metric` over one group.
///
/// Fails only on unusable parameters. Multi-choice questions get exploded
/// frequencies.
pub fn compute_metric(metric: MetricType, input: &MetricInput<'_>) -> Result<MetricValue, ParamError> {
    let value = match metric {
        MetricType::Frequency => {
            let multi = input
                .question
                .is_some_and(|q| q.question_type == QuestionType::MultiChoice);
            if multi {
                MetricValue::Frequency(multi_choice_frequency(
                    input.cells,
                    input.question,
                    input.delimiter,
                ))
            } else {
                MetricValue::Frequency(frequency(input.cells, input.question))
            }
        }
        MetricType::Mean => MetricValue::Mean(mean(input.cells, input.weights)),
        MetricType::Top2Box => {
            let overrides = input.params.top_values()?;
            MetricValue::Box(top2box(input.cells, input.question, overrides.as_deref()))
        }
        MetricType::Bottom2Box => {
            let overrides = input.params.bottom_values()?;
            MetricValue::Box(bottom2box(input.cells, input.question, overrides.as_deref()))
        }
        MetricType::Nps => MetricValue::Nps(nps(
            input.cells,
            NpsThresholds::from_params(input.params)?,
        )),
    };

    Ok(value)
}
