//! Mask builder for surveycut
//!
//! Evaluates filter expressions into row masks.
//!
//! # Semantics
//!
//! - Deterministic: the same dataset and expression always yield the same mask
//! - A missing target column yields an all-false mask, never an error
//! - Nulls never satisfy a leaf predicate
//! - `and([])` selects every row, `or([])` selects none

mod builder;

pub use builder::{build_mask, split_choices, MaskBuilder, DEFAULT_DELIMITER};
