//! Prediction counters kept by a [`DoodleSession`](super::DoodleSession).

use std::fmt;

/// Running totals over every predict request of a session.
///
/// Timing covers preprocessing and inference; failed requests count toward
/// the totals but not the average time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStats {
    /// The total number of predict requests.
    pub total_processed: usize,
    /// The number of successful predictions.
    pub successful_predictions: usize,
    /// The number of failed predictions.
    pub failed_predictions: usize,
    /// The average time of successful predictions in milliseconds.
    pub average_inference_time_ms: f64,
}

impl PipelineStats {
    /// Creates zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful prediction that took `elapsed_ms`.
    pub fn record_success(&mut self, elapsed_ms: f64) {
        let previous = self.successful_predictions as f64;
        self.total_processed += 1;
        self.successful_predictions += 1;
        self.average_inference_time_ms =
            (self.average_inference_time_ms * previous + elapsed_ms) / (previous + 1.0);
    }

    /// Records a failed prediction.
    pub fn record_failure(&mut self) {
        self.total_processed += 1;
        self.failed_predictions += 1;
    }

    /// Returns the success rate as a percentage (0.0 to 100.0).
    pub fn success_rate(&self) -> f64 {
        if self.total_processed == 0 {
            0.0
        } else {
            (self.successful_predictions as f64 / self.total_processed as f64) * 100.0
        }
    }

    /// Returns the failure rate as a percentage (0.0 to 100.0).
    pub fn failure_rate(&self) -> f64 {
        if self.total_processed == 0 {
            0.0
        } else {
            (self.failed_predictions as f64 / self.total_processed as f64) * 100.0
        }
    }
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Session statistics:")?;
        writeln!(f, "  Predictions: {}", self.total_processed)?;
        writeln!(
            f,
            "  Successful: {} ({:.1}%)",
            self.successful_predictions,
            self.success_rate()
        )?;
        writeln!(
            f,
            "  Failed: {} ({:.1}%)",
            self.failed_predictions,
            self.failure_rate()
        )?;
        write!(
            f,
            "  Average prediction time: {:.2} ms",
            self.average_inference_time_ms
        )
    }
}
