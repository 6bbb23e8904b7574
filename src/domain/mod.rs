//! Domain types: the category table and prediction results.

pub mod categories;
pub mod prediction;

pub use categories::{CategoryTable, DOODLE_CATEGORIES};
pub use prediction::Prediction;
