//! Top-2-box and bottom-2-box shares

use crate::dataset::Cell;
use crate::schema::coerce::to_numeric;
use crate::schema::{Question, QuestionType};

use super::result::{percentage, BoxResult, BoxSide};

/// Share of numeric answers in the top two scale points.
///
/// `overrides` replaces scale detection: likert_1_5 uses {4, 5}, likert_1_7
/// uses {6, 7}, anything else the two highest observed values.
pub fn top2box(cells: &[Cell], question: Option<&Question>, overrides: Option<&[f64]>) -> BoxResult {
    box_share(BoxSide::Top, cells, question, overrides)
}

/// Share of numeric answers in the bottom two scale points.
///
/// Likert scales use {1, 2}; anything else the two lowest observed values.
pub fn bottom2box(
    cells: &[Cell],
    question: Option<&Question>,
    overrides: Option<&[f64]>,
) -> BoxResult {
    box_share(BoxSide::Bottom, cells, question, overrides)
}

fn box_share(
    side: BoxSide,
    cells: &[Cell],
    question: Option<&Question>,
    overrides: Option<&[f64]>,
) -> BoxResult {
    let values: Vec<f64> = cells.iter().filter_map(|c| to_numeric(c.as_ref())).collect();

    if values.is_empty() {
        return BoxResult {
            side,
            pct: None,
            count: 0,
            total: 0,
            values: Vec::new(),
        };
    }

    let box_values = match overrides {
        Some(explicit) => explicit.to_vec(),
        None => scale_values(side, question.map(|q| q.question_type))
            .unwrap_or_else(|| observed_extremes(side, &values)),
    };

    let count = values.iter().filter(|v| box_values.contains(v)).count();

    BoxResult {
        side,
        pct: Some(percentage(count, values.len())),
        count,
        total: values.len(),
        values: box_values,
    }
}

fn scale_values(side: BoxSide, question_type: Option<QuestionType>) -> Option<Vec<f64>> {
    match (side, question_type?) {
        (BoxSide::Top, QuestionType::Likert5) => Some(vec![4.0, 5.0]),
        (BoxSide::Top, QuestionType::Likert7) => Some(vec![6.0, 7.0]),
        (BoxSide::Bottom, QuestionType::Likert5 | QuestionType::Likert7) => Some(vec![1.0, 2.0]),
        _ => None,
    }
}

/// Two highest (or lowest) distinct values, fewer if the data has fewer
fn observed_extremes(side: BoxSide, values: &[f64]) -> Vec<f64> {
    let mut distinct = values.to_vec();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();

    match side {
        BoxSide::Top => distinct.iter().rev().take(2).rev().copied().collect(),
        BoxSide::Bottom => distinct.into_iter().take(2).collect(),
    }
}
