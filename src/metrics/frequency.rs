//! Frequency distributions

use std::collections::{BTreeMap, HashSet};

use crate::dataset::Cell;
use crate::mask::split_choices;
use crate::schema::coerce::{codes_match, ScalarKey};
use crate::schema::{Question, Scalar};

use super::result::{percentage, FrequencyResult, FrequencyRow};

fn label_for(value: &Scalar, question: Option<&Question>) -> String {
    question
        .and_then(|q| q.option_label(value))
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

/// Orders by count descending; ties keep key order
fn sort_by_count(rows: &mut [FrequencyRow]) {
    rows.sort_by(|a, b| b.count.cmp(&a.count));
}

/// Counts distinct non-null values.
///
/// Rows are sorted ascending by value when every value is numeric, otherwise
/// by count descending.
pub fn frequency(cells: &[Cell], question: Option<&Question>) -> FrequencyResult {
    let mut counts: BTreeMap<ScalarKey, (Scalar, usize)> = BTreeMap::new();
    let mut total = 0;

    for value in cells.iter().flatten() {
        total += 1;
        counts
            .entry(ScalarKey::of(value))
            .or_insert_with(|| (value.clone(), 0))
            .1 += 1;
    }

    let all_numeric = counts.keys().all(ScalarKey::is_number);
    let mut distribution: Vec<FrequencyRow> = counts
        .into_values()
        .map(|(value, count)| FrequencyRow {
            label: label_for(&value, question),
            value,
            count,
            percentage: percentage(count, total),
        })
        .collect();

    if !all_numeric {
        sort_by_count(&mut distribution);
    }

    FrequencyResult { distribution }
}

/// Counts individual selections of delimiter-joined multi-choice cells.
///
/// A code repeated within one cell counts once. Percentages are relative to
/// respondents with at least one selection, so they may sum past 100.
pub fn multi_choice_frequency(
    cells: &[Cell],
    question: Option<&Question>,
    delimiter: &str,
) -> FrequencyResult {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut respondents = 0;

    for value in cells.iter().flatten() {
        let text = value.to_string();
        let mut seen = HashSet::new();
        for token in split_choices(&text, delimiter) {
            if seen.insert(token) {
                *counts.entry(token.to_string()).or_insert(0) += 1;
            }
        }
        if !seen.is_empty() {
            respondents += 1;
        }
    }

    let mut distribution: Vec<FrequencyRow> = counts
        .into_iter()
        .map(|(token, count)| {
            let raw = Scalar::Text(token);
            // report the declared code when one matches the token
            let value = question
                .and_then(|q| q.options().iter().find(|o| codes_match(&raw, &o.code)))
                .map(|o| o.code.clone())
                .unwrap_or(raw);
            FrequencyRow {
                label: label_for(&value, question),
                value,
                count,
                percentage: percentage(count, respondents),
            }
        })
        .collect();

    sort_by_count(&mut distribution);
    FrequencyResult { distribution }
}
