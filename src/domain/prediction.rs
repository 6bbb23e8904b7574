//! The result of classifying one doodle.

use crate::core::constants::PROBABILITY_SUM_TOLERANCE;
use crate::core::errors::{DoodleError, DoodleResult};
use crate::processors::softmax::{argmax, top_k};

/// Predicted class index plus the full probability vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    class_index: usize,
    probabilities: Vec<f64>,
}

impl Prediction {
    /// Builds a prediction from a probability distribution.
    ///
    /// The class index is the argmax, ties broken by lowest index.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the vector is empty, contains a value outside
    /// `[0, 1]`, or does not sum to one within tolerance.
    pub fn from_probabilities(probabilities: Vec<f64>) -> DoodleResult<Self> {
        if let Some((idx, p)) = probabilities
            .iter()
            .enumerate()
            .find(|(_, p)| !(0.0..=1.0).contains(*p))
        {
            return Err(DoodleError::invalid_input(format!(
                "probability at index {} is outside [0, 1]: {}",
                idx, p
            )));
        }

        let sum: f64 = probabilities.iter().sum();
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(DoodleError::invalid_input(format!(
                "probabilities sum to {} instead of 1",
                sum
            )));
        }

        let class_index = argmax(&probabilities)
            .ok_or_else(|| DoodleError::invalid_input("probability vector is empty"))?;

        Ok(Self {
            class_index,
            probabilities,
        })
    }

    /// Index of the most probable class.
    pub fn class_index(&self) -> usize {
        self.class_index
    }

    /// Probability of every class, in class order.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Probability of the predicted class.
    pub fn confidence(&self) -> f64 {
        self.probabilities[self.class_index]
    }

    pub fn num_classes(&self) -> usize {
        self.probabilities.len()
    }

    /// The `k` most probable classes, highest first.
    pub fn ranked(&self, k: usize) -> Vec<(usize, f64)> {
        top_k(&self.probabilities, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_probabilities_picks_argmax() {
        let mut probs = vec![0.05; 10];
        probs[7] = 0.55;
        let prediction = Prediction::from_probabilities(probs).unwrap();
        assert_eq!(prediction.class_index(), 7);
        assert!((prediction.confidence() - 0.55).abs() < 1e-12);
        assert_eq!(prediction.num_classes(), 10);
    }

    #[test]
    fn test_uniform_picks_first_class() {
        let prediction = Prediction::from_probabilities(vec![0.1; 10]).unwrap();
        assert_eq!(prediction.class_index(), 0);
    }

    #[test]
    fn test_invalid_distributions_rejected() {
        assert!(Prediction::from_probabilities(vec![]).is_err());
        assert!(Prediction::from_probabilities(vec![0.5, 0.6]).is_err());
        assert!(Prediction::from_probabilities(vec![1.5, -0.5]).is_err());
        assert!(Prediction::from_probabilities(vec![f64::NAN, 1.0]).is_err());
    }

    #[test]
    fn test_ranked() {
        let prediction = Prediction::from_probabilities(vec![0.2, 0.5, 0.3]).unwrap();
        let ranked = prediction.ranked(2);
        assert_eq!(ranked[0].0, 1);
        assert_eq!(ranked[1].0, 2);
    }
}
