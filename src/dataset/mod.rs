//! Response dataset for surveycut
//!
//! Columnar, read-only table of respondent answers plus the row masks
//! computed over it.
//!
//! # Design Principles
//!
//! - Never mutated after construction
//! - Missing answers are explicit (`None`), never sentinel values
//! - Masks always have the dataset's row count

mod frame;
mod mask;

pub use frame::{Cell, Column, Dataset, DatasetError};
pub use mask::Mask;
