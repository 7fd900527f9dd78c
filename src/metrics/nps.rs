//! Net Promoter Score

use crate::dataset::Cell;
use crate::schema::coerce::to_numeric;
use crate::schema::{MetricParams, ParamError, DEFAULT_DETRACTOR_MAX, DEFAULT_PROMOTER_MIN};

use super::result::{round_to, NpsResult};

/// Promoter / detractor cut points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NpsThresholds {
    promoter_min: f64,
    detractor_max: f64,
}

impl Default for NpsThresholds {
    fn default() -> Self {
        Self {
            promoter_min: DEFAULT_PROMOTER_MIN,
            detractor_max: DEFAULT_DETRACTOR_MAX,
        }
    }
}

impl NpsThresholds {
    /// Thresholds must leave promoters strictly above detractors.
    pub fn new(promoter_min: f64, detractor_max: f64) -> Result<Self, ParamError> {
        if promoter_min <= detractor_max {
            return Err(ParamError::new(
                "promoter_min",
                format!(
                    "must be greater than detractor_max ({} <= {})",
                    promoter_min, detractor_max
                ),
            ));
        }
        Ok(Self {
            promoter_min,
            detractor_max,
        })
    }

    /// Reads `promoter_min` / `detractor_max`, falling back to 9 / 6.
    pub fn from_params(params: &MetricParams) -> Result<Self, ParamError> {
        Self::new(params.promoter_min()?, params.detractor_max()?)
    }

    pub fn promoter_min(&self) -> f64 {
        self.promoter_min
    }

    pub fn detractor_max(&self) -> f64 {
        self.detractor_max
    }
}

/// NPS = % promoters - % detractors over numeric answers.
///
/// Answers between the thresholds are passives. Empty input yields
/// `nps = None`.
pub fn nps(cells: &[Cell], thresholds: NpsThresholds) -> NpsResult {
    let values: Vec<f64> = cells.iter().filter_map(|c| to_numeric(c.as_ref())).collect();
    let total = values.len();

    if total == 0 {
        return NpsResult {
            nps: None,
            promoters_count: 0,
            promoters_pct: None,
            passives_count: 0,
            passives_pct: None,
            detractors_count: 0,
            detractors_pct: None,
            total: 0,
        };
    }

    let promoters = values.iter().filter(|v| **v >= thresholds.promoter_min).count();
    let detractors = values.iter().filter(|v| **v <= thresholds.detractor_max).count();
    let passives = total - promoters - detractors;

    let share = |n: usize| n as f64 / total as f64 * 100.0;
    let score = share(promoters) - share(detractors);

    NpsResult {
        nps: Some(round_to(score, 2)),
        promoters_count: promoters,
        promoters_pct: Some(round_to(share(promoters), 2)),
        passives_count: passives,
        passives_pct: Some(round_to(share(passives), 2)),
        detractors_count: detractors,
        detractors_pct: Some(round_to(share(detractors), 2)),
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Scalar;
    use serde_json::json;

    fn ints(values: &[i64]) -> Vec<Cell> {
        values.iter().map(|v| Some(Scalar::Int(*v))).collect()
    }

    #[test]
    fn test_boundary_series_scores_zero() {
        let result = nps(&ints(&[9, 10, 7, 8, 6, 5]), NpsThresholds::default());
        assert_eq!(result.promoters_count, 2);
        assert_eq!(result.passives_count, 2);
        assert_eq!(result.detractors_count, 2);
        assert_eq!(result.nps, Some(0.0));
    }

    #[test]
    fn test_all_promoters() {
        let result = nps(&ints(&[9, 10, 10]), NpsThresholds::default());
        assert_eq!(result.nps, Some(100.0));
        assert_eq!(result.promoters_pct, Some(100.0));
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = NpsThresholds::new(8.0, 5.0).unwrap();
        let result = nps(&ints(&[8, 6, 5]), thresholds);
        assert_eq!(result.promoters_count, 1);
        assert_eq!(result.passives_count, 1);
        assert_eq!(result.detractors_count, 1);
    }

    #[test]
    fn test_empty_input() {
        let result = nps(&[None, Some(Scalar::from("x"))], NpsThresholds::default());
        assert_eq!(result.nps, None);
        assert_eq!(result.total, 0);
    }

    #[test]
    fn test_thresholds_from_params() {
        let params = MetricParams::new()
            .with("promoter_min", json!("8"))
            .with("detractor_max", json!(4));
        let thresholds = NpsThresholds::from_params(&params).unwrap();
        assert_eq!(thresholds.promoter_min(), 8.0);
        assert_eq!(thresholds.detractor_max(), 4.0);

        assert_eq!(
            NpsThresholds::from_params(&MetricParams::new()).unwrap(),
            NpsThresholds::default()
        );
    }

    #[test]
    fn test_overlapping_thresholds_rejected() {
        assert!(NpsThresholds::new(6.0, 6.0).is_err());
        let params = MetricParams::new().with("promoter_min", json!("high"));
        assert!(NpsThresholds::from_params(&params).is_err());
    }
}
