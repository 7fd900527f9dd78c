//! Base-size warnings

/// Minimum and recommended base sizes.
///
/// Thresholds annotate results; they never block execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseSizePolicy {
    min: usize,
    warn: usize,
}

impl Default for BaseSizePolicy {
    fn default() -> Self {
        Self { min: 30, warn: 100 }
    }
}

impl BaseSizePolicy {
    pub fn new(min: usize, warn: usize) -> Self {
        Self { min, warn }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn warn(&self) -> usize {
        self.warn
    }

    /// At most one warning; below `min` outranks below `warn`.
    pub fn warnings(&self, base_n: usize) -> Vec<String> {
        if base_n < self.min {
            vec![format!(
                "Base size ({}) is below minimum threshold ({}). Results may not be statistically reliable.",
                base_n, self.min
            )]
        } else if base_n < self.warn {
            vec![format!(
                "Base size ({}) is below recommended threshold ({}). Interpret results with caution.",
                base_n, self.warn
            )]
        } else {
            Vec::new()
        }
    }
}
