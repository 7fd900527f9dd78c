//! Metric / question-type compatibility table

use crate::schema::{MetricType, QuestionType};

const FREQUENCY: &[QuestionType] = &[
    QuestionType::SingleChoice,
    QuestionType::MultiChoice,
    QuestionType::Likert5,
    QuestionType::Likert7,
    QuestionType::Nps,
];

const MEAN: &[QuestionType] = &[
    QuestionType::Likert5,
    QuestionType::Likert7,
    QuestionType::Numeric,
    QuestionType::Nps,
];

const BOX: &[QuestionType] = &[QuestionType::Likert5, QuestionType::Likert7];

const NPS: &[QuestionType] = &[QuestionType::Nps];

/// Question types a metric may be computed on
pub fn compatible_types(metric: MetricType) -> &'static [QuestionType] {
    match metric {
        MetricType::Frequency => FREQUENCY,
        MetricType::Mean => MEAN,
        MetricType::Top2Box | MetricType::Bottom2Box => BOX,
        MetricType::Nps => NPS,
    }
}

pub fn is_compatible(metric: MetricType, question_type: QuestionType) -> bool {
    compatible_types(metric).contains(&question_type)
}
