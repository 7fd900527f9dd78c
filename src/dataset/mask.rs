//! Row-selection masks

use std::ops::{BitAnd, BitOr, Not};

/// A boolean per-row selection vector.
///
/// Masks combined with `&`, `|` and `!` must come from the same dataset and
/// therefore share a length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mask {
    bits: Vec<bool>,
}

impl Mask {
    /// Selects every row
    pub fn all(len: usize) -> Self {
        Self {
            bits: vec![true; len],
        }
    }

    /// Selects no row
    pub fn none(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns whether `row` is selected (false when out of range)
    pub fn get(&self, row: usize) -> bool {
        self.bits.get(row).copied().unwrap_or(false)
    }

    /// Selects `row`; out-of-range rows are ignored
    pub fn set(&mut self, row: usize) {
        if let Some(bit) = self.bits.get_mut(row) {
            *bit = true;
        }
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Number of selected rows
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Indices of selected rows, ascending
    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, b)| if *b { Some(i) } else { None })
    }

    fn zip_with(&self, other: &Mask, f: impl Fn(bool, bool) -> bool) -> Mask {
        debug_assert_eq!(self.len(), other.len(), "mask length mismatch");
        Mask {
            bits: self
                .bits
                .iter()
                .zip(&other.bits)
                .map(|(a, b)| f(*a, *b))
                .collect(),
        }
    }
}

impl BitAnd for &Mask {
    type Output = Mask;

    fn bitand(self, rhs: &Mask) -> Mask {
        self.zip_with(rhs, |a, b| a && b)
    }
}

impl BitOr for &Mask {
    type Output = Mask;

    fn bitor(self, rhs: &Mask) -> Mask {
        self.zip_with(rhs, |a, b| a || b)
    }
}

impl Not for &Mask {
    type Output = Mask;

    fn not(self) -> Mask {
        Mask {
            bits: self.bits.iter().map(|b| !b).collect(),
        }
    }
}

impl Not for Mask {
    type Output = Mask;

    fn not(self) -> Mask {
        !&self
    }
}
