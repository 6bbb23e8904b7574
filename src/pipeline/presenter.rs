//! Human-readable rendering of predictions.

use crate::core::errors::{DoodleError, DoodleResult};
use crate::domain::{CategoryTable, Prediction};
use std::fmt;

/// Text shown to the user for one prediction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    /// One `"<name>: <percent>%"` line per class, in class order.
    pub class_lines: Vec<String>,
    /// `"Prediction: <name>"` for the winning class.
    pub headline: String,
}

impl fmt::Display for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.class_lines {
            writeln!(f, "{}", line)?;
        }
        write!(f, "{}", self.headline)
    }
}

/// Maps predictions onto category names.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionPresenter {
    categories: CategoryTable,
}

impl PredictionPresenter {
    pub fn new(categories: CategoryTable) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    /// Formats a prediction.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the probability vector does not have one entry per
    /// category.
    pub fn format(&self, prediction: &Prediction) -> DoodleResult<Presentation> {
        if prediction.num_classes() != self.categories.len() {
            return Err(DoodleError::invalid_input(format!(
                "prediction has {} probabilities but there are {} categories",
                prediction.num_classes(),
                self.categories.len()
            )));
        }
        let winner = self
            .categories
            .name(prediction.class_index())
            .ok_or_else(|| {
                DoodleError::invalid_input(format!(
                    "class index {} has no category",
                    prediction.class_index()
                ))
            })?;

        let class_lines = self
            .categories
            .iter()
            .zip(prediction.probabilities())
            .map(|((_, name), &p)| format!("{}: {:.2}%", name, p * 100.0))
            .collect();

        Ok(Presentation {
            class_lines,
            headline: format!("Prediction: {}", winner),
        })
    }

    /// What is shown before anything has been classified: an even share for
    /// every category and an empty headline.
    pub fn placeholder(&self) -> Presentation {
        let share = if self.categories.is_empty() {
            0.0
        } else {
            100.0 / self.categories.len() as f64
        };
        Presentation {
            class_lines: self
                .categories
                .iter()
                .map(|(_, name)| format!("{}: {:.2}%", name, share))
                .collect(),
            headline: "Prediction: ".to_string(),
        }
    }
}
