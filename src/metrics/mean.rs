//! Mean and spread of numeric answers

use crate::dataset::Cell;
use crate::schema::coerce::to_numeric;

use super::result::{round_to, MeanResult};

/// Computes mean, sample standard deviation, min, max and count.
///
/// Text that does not parse as a number counts as missing. With `weights`
/// (aligned to `cells` by row) the mean is `sum(v * w) / sum(w)` over rows
/// where both are numeric; spread and count still describe the unweighted
/// answers. An empty or all-missing series yields `mean = None`, `count = 0`.
pub fn mean(cells: &[Cell], weights: Option<&[Cell]>) -> MeanResult {
    let values: Vec<f64> = cells.iter().filter_map(|c| to_numeric(c.as_ref())).collect();
    let count = values.len();

    if count == 0 {
        return MeanResult {
            mean: None,
            std: None,
            min: None,
            max: None,
            count: 0,
        };
    }

    let unweighted = values.iter().sum::<f64>() / count as f64;

    let mean = match weights {
        None => Some(unweighted),
        Some(weights) => weighted_mean(cells, weights),
    };

    let std = if count > 1 {
        let variance = values
            .iter()
            .map(|v| (v - unweighted).powi(2))
            .sum::<f64>()
            / (count - 1) as f64;
        Some(round_to(variance.sqrt(), 4))
    } else {
        None
    };

    MeanResult {
        mean: mean.map(|m| round_to(m, 4)),
        std,
        min: values.iter().copied().reduce(f64::min),
        max: values.iter().copied().reduce(f64::max),
        count,
    }
}

fn weighted_mean(cells: &[Cell], weights: &[Cell]) -> Option<f64> {
    let (sum, weight_sum) = cells
        .iter()
        .zip(weights)
        .filter_map(|(c, w)| Some((to_numeric(c.as_ref())?, to_numeric(w.as_ref())?)))
        .fold((0.0, 0.0), |(s, ws), (v, w)| (s + v * w, ws + w));

    if weight_sum > 0.0 {
        Some(sum / weight_sum)
    } else {
        None
    }
}
