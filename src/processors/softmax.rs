//! Turning raw class scores into probabilities and ranked classes.

use thiserror::Error;

/// Errors raised when scores cannot form a probability distribution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    /// No scores were given.
    #[error("score vector is empty")]
    Empty,

    /// A score is NaN or infinite.
    #[error("score at index {index} is not finite: {value}")]
    NonFinite { index: usize, value: f32 },
}

/// Normalized exponential over raw class scores.
///
/// The maximum score is subtracted before exponentiating; arithmetic is in
/// `f64`.
///
/// # Errors
///
/// Returns [`ScoreError`] for an empty slice or any non-finite score.
pub fn softmax(scores: &[f32]) -> Result<Vec<f64>, ScoreError> {
    if scores.is_empty() {
        return Err(ScoreError::Empty);
    }
    if let Some((index, &value)) = scores.iter().enumerate().find(|(_, s)| !s.is_finite()) {
        return Err(ScoreError::NonFinite { index, value });
    }

    let max = scores
        .iter()
        .map(|&s| s as f64)
        .fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|&s| (s as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    Ok(exps.into_iter().map(|e| e / sum).collect())
}

/// Index of the largest value; ties go to the lowest index.
///
/// Returns `None` for an empty slice. NaN values never win.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if value <= best_value || value.is_nan() => {}
            None if value.is_nan() => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// The `k` highest values as `(index, value)` pairs in descending order.
///
/// Ties keep ascending index order. `k` larger than the input is clamped.
pub fn top_k(values: &[f64], k: usize) -> Vec<(usize, f64)> {
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    // stable sort keeps lower indices first among equal values
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    indexed.truncate(k);
    indexed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0, -4.0, 0.5]).unwrap();
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(probs.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_softmax_equal_scores_is_uniform() {
        let probs = softmax(&[0.0; 10]).unwrap();
        for p in probs {
            assert!((p - 0.1).abs() < 1e-12);
        }
    }

    #[test]
    fn test_softmax_large_logits_are_stable() {
        let probs = softmax(&[1000.0, 999.0, -1000.0]).unwrap();
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!(probs[0] > probs[1]);
        assert!(probs[2] < 1e-12);
    }

    #[test]
    fn test_softmax_rejects_bad_input() {
        assert_eq!(softmax(&[]), Err(ScoreError::Empty));
        assert!(matches!(
            softmax(&[0.0, f32::NAN]),
            Err(ScoreError::NonFinite { index: 1, .. })
        ));
        assert!(softmax(&[f32::INFINITY]).is_err());
    }

    #[test]
    fn test_argmax_ties_pick_lowest_index() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some(1));
        assert_eq!(argmax(&[0.1; 10]), Some(0));
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[f64::NAN, 0.3]), Some(1));
    }

    #[test]
    fn test_top_k_order() {
        let ranked = top_k(&[0.1, 0.5, 0.1, 0.3], 3);
        assert_eq!(ranked, vec![(1, 0.5), (3, 0.3), (0, 0.1)]);
        assert_eq!(top_k(&[0.6, 0.4], 5).len(), 2);
        assert!(top_k(&[0.6, 0.4], 0).is_empty());
    }
}
