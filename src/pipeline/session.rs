//! Interactive drawing session.

use super::{DoodlePipeline, PipelineOutput, PipelineStats, Presentation};
use crate::canvas::{CanvasConfig, PointerEvent, StrokeCanvas};
use crate::core::config::{ConfigValidator, DoodleConfig};
use crate::core::errors::{DoodleError, DoodleResult};
use crate::core::traits::ClassifierHandle;
use crate::domain::Prediction;
use crate::processors::Preprocessor;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Where a session is in its capture/predict cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// Waiting for input.
    #[default]
    Idle,
    /// A stroke is being drawn.
    Capturing,
    /// The raster is being copied (and written to disk if configured).
    Snapshotting,
    /// The raster is being converted to the model input.
    Preprocessing,
    /// The classifier is running.
    Inferring,
    /// The prediction is being rendered.
    Presenting,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Capturing => "capturing",
            PipelineState::Snapshotting => "snapshotting",
            PipelineState::Preprocessing => "preprocessing",
            PipelineState::Inferring => "inferring",
            PipelineState::Presenting => "presenting",
        };
        f.write_str(name)
    }
}

/// One canvas plus one pipeline.
///
/// Pointer events draw on the canvas; [`DoodleSession::predict`] classifies
/// what has been drawn so far. A failed prediction leaves the previous
/// presentation on display and records a notice instead.
#[derive(Debug)]
pub struct DoodleSession {
    canvas: StrokeCanvas,
    pipeline: DoodlePipeline,
    state: PipelineState,
    snapshot_path: Option<PathBuf>,
    presentation: Presentation,
    last_prediction: Option<Prediction>,
    notice: Option<String>,
    stats: PipelineStats,
}

impl DoodleSession {
    /// Creates a session with a blank canvas and the placeholder presentation.
    ///
    /// Snapshots stay in memory until [`DoodleSession::with_snapshot_path`]
    /// is used.
    pub fn new(canvas_config: &CanvasConfig, pipeline: DoodlePipeline) -> Self {
        let presentation = pipeline.presenter().placeholder();
        Self {
            canvas: StrokeCanvas::new(canvas_config),
            pipeline,
            state: PipelineState::Idle,
            snapshot_path: None,
            presentation,
            last_prediction: None,
            notice: None,
            stats: PipelineStats::new(),
        }
    }

    /// Builds a session from an application configuration and a loaded
    /// classifier. Every prediction writes the raster to `snapshot_path`.
    ///
    /// # Errors
    ///
    /// * `ConfigError` if any configuration section is invalid
    /// * `ShapeMismatch` if the classifier does not accept the tensors the
    ///   configured preprocessor produces
    pub fn from_config(config: &DoodleConfig, classifier: ClassifierHandle) -> DoodleResult<Self> {
        config.validate()?;
        let preprocessor = Preprocessor::new(config.preprocess.clone())?;
        if classifier.input_len() != preprocessor.output_len() {
            return Err(DoodleError::shape_mismatch(
                classifier.name(),
                classifier.input_len(),
                preprocessor.output_len(),
            ));
        }
        let pipeline = DoodlePipeline::new(preprocessor, classifier, Default::default());
        Ok(Self::new(&config.canvas, pipeline).with_snapshot_path(&config.snapshot_path))
    }

    /// Writes the raster to `path` at the start of every prediction.
    pub fn with_snapshot_path(mut self, path: impl AsRef<Path>) -> Self {
        self.snapshot_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn canvas(&self) -> &StrokeCanvas {
        &self.canvas
    }

    pub fn pipeline(&self) -> &DoodlePipeline {
        &self.pipeline
    }

    /// What is currently on display.
    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    /// The most recent successful prediction.
    pub fn last_prediction(&self) -> Option<&Prediction> {
        self.last_prediction.as_ref()
    }

    /// Message describing the last failed prediction, cleared on success.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Starts a stroke at `(x, y)`.
    pub fn press(&mut self, x: f32, y: f32) {
        self.canvas.begin_stroke(x, y);
        self.transition(PipelineState::Capturing);
    }

    /// Continues the current stroke; ignored when no stroke is in progress.
    pub fn drag(&mut self, x: f32, y: f32) {
        if self.canvas.is_stroking() {
            self.canvas.extend_stroke(x, y);
        }
    }

    /// Ends the current stroke.
    pub fn release(&mut self) {
        self.canvas.end_stroke();
        self.transition(PipelineState::Idle);
    }

    /// Routes a pointer event to [`press`](Self::press),
    /// [`drag`](Self::drag) or [`release`](Self::release).
    pub fn handle_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Press { x, y } => self.press(x, y),
            PointerEvent::Drag { x, y } => self.drag(x, y),
            PointerEvent::Release => self.release(),
        }
    }

    /// Wipes the drawing. The presentation is left as is.
    pub fn clear(&mut self) {
        self.canvas.clear();
        self.transition(PipelineState::Idle);
    }

    /// Changes the color of subsequent strokes.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the color has the same intensity as the background.
    pub fn set_stroke_color(&mut self, color: [u8; 3]) -> DoodleResult<()> {
        self.canvas.set_stroke_color(color)
    }

    /// Writes the current raster to `path`.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> DoodleResult<()> {
        self.canvas.save_snapshot(path)
    }

    /// Classifies the current drawing.
    ///
    /// Any stroke in progress is ended first. On success the new
    /// presentation replaces the old one and the notice is cleared.
    ///
    /// # Errors
    ///
    /// Returns the failure of whichever stage failed. The session is back in
    /// [`PipelineState::Idle`], the previous presentation is untouched and
    /// [`DoodleSession::notice`] describes the failure.
    pub fn predict(&mut self) -> DoodleResult<&Presentation> {
        self.canvas.end_stroke();
        let started = Instant::now();

        match self.run_stages() {
            Ok(output) => {
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                self.stats.record_success(elapsed_ms);
                info!(
                    "{} ({:.1}% confidence, {:.2} ms)",
                    output.presentation.headline,
                    output.prediction.confidence() * 100.0,
                    elapsed_ms
                );
                self.presentation = output.presentation;
                self.last_prediction = Some(output.prediction);
                self.notice = None;
                self.transition(PipelineState::Idle);
                Ok(&self.presentation)
            }
            Err(err) => {
                self.stats.record_failure();
                if err.is_contract_violation() {
                    error!("Prediction failed in {} stage: {}", self.state, err);
                } else {
                    warn!("Prediction failed in {} stage: {}", self.state, err);
                }
                self.notice = Some(format!("Prediction failed: {}", err));
                self.transition(PipelineState::Idle);
                Err(err)
            }
        }
    }

    fn run_stages(&mut self) -> DoodleResult<PipelineOutput> {
        self.transition(PipelineState::Snapshotting);
        let image = self.canvas.snapshot();
        if let Some(path) = &self.snapshot_path {
            self.canvas.save_snapshot(path)?;
        }

        self.transition(PipelineState::Preprocessing);
        let tensor = self.pipeline.preprocess(&image)?;

        self.transition(PipelineState::Inferring);
        let prediction = self.pipeline.classify(&tensor)?;

        self.transition(PipelineState::Presenting);
        let presentation = self.pipeline.present(&prediction)?;

        Ok(PipelineOutput {
            prediction,
            presentation,
        })
    }

    fn transition(&mut self, next: PipelineState) {
        if self.state != next {
            debug!("Session state {} -> {}", self.state, next);
            self.state = next;
        }
    }
}

/// Replays recorded input.
impl Extend<PointerEvent> for DoodleSession {
    fn extend<I: IntoIterator<Item = PointerEvent>>(&mut self, events: I) {
        for event in events {
            self.handle_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeedForwardNet;
    use crate::models::config::FeedForwardConfig;
    use crate::pipeline::test_doubles::ScriptedClassifier;
    use candle_core::{DType, Device};
    use candle_nn::VarBuilder;
    use std::sync::Arc;

    fn small_canvas() -> CanvasConfig {
        CanvasConfig {
            width: 100,
            height: 100,
            line_width: 8,
            ..CanvasConfig::default()
        }
    }

    fn scripted_session(class: usize) -> (DoodleSession, Arc<ScriptedClassifier>) {
        let classifier = Arc::new(ScriptedClassifier::favoring(class));
        let pipeline = DoodlePipeline::with_classifier(classifier.clone());
        (DoodleSession::new(&small_canvas(), pipeline), classifier)
    }

    #[test]
    fn test_starts_with_placeholder() {
        let (session, _) = scripted_session(0);
        assert_eq!(session.state(), PipelineState::Idle);
        assert_eq!(session.presentation().headline, "Prediction: ");
        assert!(session.last_prediction().is_none());
        assert!(session.notice().is_none());
    }

    #[test]
    fn test_pointer_events_drive_state() {
        let (mut session, _) = scripted_session(0);
        session.drag(10.0, 10.0);
        assert!(session.canvas().is_blank());

        session.press(10.0, 10.0);
        assert_eq!(session.state(), PipelineState::Capturing);
        session.drag(60.0, 60.0);
        assert!(!session.canvas().is_blank());

        session.release();
        assert_eq!(session.state(), PipelineState::Idle);
        assert!(!session.canvas().is_stroking());
    }

    #[test]
    fn test_replay_events() {
        let (mut session, _) = scripted_session(0);
        session.extend([
            PointerEvent::Press { x: 20.0, y: 50.0 },
            PointerEvent::Drag { x: 80.0, y: 50.0 },
            PointerEvent::Release,
        ]);
        assert_eq!(session.canvas().image().get_pixel(50, 50).0, [255, 255, 255]);
        assert_eq!(session.state(), PipelineState::Idle);
    }

    #[test]
    fn test_predict_success_updates_presentation() {
        let (mut session, _) = scripted_session(7);
        session.press(10.0, 10.0);
        session.drag(90.0, 90.0);

        let headline = session.predict().unwrap().headline.clone();
        assert_eq!(headline, "Prediction: Diamond");
        assert_eq!(session.state(), PipelineState::Idle);
        assert_eq!(session.last_prediction().unwrap().class_index(), 7);
        assert_eq!(session.stats().successful_predictions, 1);
    }

    #[test]
    fn test_failed_prediction_keeps_previous_presentation() {
        let (mut session, classifier) = scripted_session(3);
        session.predict().unwrap();
        let before = session.presentation().clone();
        assert_eq!(before.headline, "Prediction: Snail");

        classifier.set_failing(true);
        let err = session.predict().unwrap_err();
        assert!(matches!(err, DoodleError::Inference { .. }));
        assert_eq!(session.presentation(), &before);
        assert_eq!(session.state(), PipelineState::Idle);
        assert!(session.notice().unwrap().starts_with("Prediction failed"));
        assert_eq!(session.stats().failed_predictions, 1);

        classifier.set_failing(false);
        session.predict().unwrap();
        assert!(session.notice().is_none());
        assert_eq!(session.stats().total_processed, 3);
    }

    #[test]
    fn test_empty_canvas_with_real_network() {
        let vb = VarBuilder::zeros(DType::F32, &Device::Cpu);
        let net = FeedForwardNet::load(FeedForwardConfig::default(), vb, Device::Cpu).unwrap();
        let pipeline = DoodlePipeline::with_classifier(Arc::new(net));
        let mut session = DoodleSession::new(&CanvasConfig::default(), pipeline);

        session.predict().unwrap();
        let prediction = session.last_prediction().unwrap();
        let sum: f64 = prediction.probabilities().iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert_eq!(session.presentation().headline, "Prediction: Clock");
    }

    #[test]
    fn test_predict_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_image.jpg");
        let (session, _) = scripted_session(1);
        let mut session = session.with_snapshot_path(&path);

        session.press(10.0, 50.0);
        session.drag(90.0, 50.0);
        session.predict().unwrap();

        let saved = image::open(&path).unwrap().to_rgb8();
        assert_eq!(saved.dimensions(), (100, 100));
        assert!(saved.get_pixel(50, 50)[0] > 200);
    }

    #[test]
    fn test_snapshot_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (session, _) = scripted_session(1);
        let mut session = session.with_snapshot_path(dir.path().join("missing/dir/out.jpg"));

        let err = session.predict().unwrap_err();
        assert!(matches!(err, DoodleError::ImageSave { .. }));
        assert_eq!(session.presentation().headline, "Prediction: ");
        assert_eq!(session.state(), PipelineState::Idle);
    }

    #[test]
    fn test_clear_resets_canvas() {
        let (mut session, _) = scripted_session(0);
        session.press(10.0, 10.0);
        session.drag(90.0, 90.0);
        session.clear();
        assert!(session.canvas().is_blank());
        assert_eq!(session.state(), PipelineState::Idle);
    }

    #[test]
    fn test_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = DoodleConfig {
            snapshot_path: dir.path().join("snap.png"),
            ..DoodleConfig::default()
        };
        let mut session =
            DoodleSession::from_config(&config, Arc::new(ScriptedClassifier::favoring(8)))
                .unwrap();
        assert_eq!(session.canvas().dimensions(), (800, 800));
        assert_eq!(session.predict().unwrap().headline, "Prediction: Helicopter");
        assert!(config.snapshot_path.exists());
    }

    #[test]
    fn test_from_config_validates_sections() {
        let config = DoodleConfig {
            canvas: CanvasConfig {
                line_width: 0,
                ..CanvasConfig::default()
            },
            ..DoodleConfig::default()
        };
        let err = DoodleSession::from_config(&config, Arc::new(ScriptedClassifier::favoring(0)))
            .unwrap_err();
        assert!(matches!(err, DoodleError::ConfigError { .. }));
    }

    #[test]
    fn test_from_config_rejects_incompatible_classifier() {
        let classifier = ScriptedClassifier {
            input_len: 783,
            ..ScriptedClassifier::favoring(0)
        };
        let err = DoodleSession::from_config(&DoodleConfig::default(), Arc::new(classifier))
            .unwrap_err();
        assert!(matches!(
            err,
            DoodleError::ShapeMismatch {
                expected: 783,
                actual: 784,
                ..
            }
        ));
    }

    #[test]
    fn test_stroke_color_must_differ_from_background() {
        let (mut session, _) = scripted_session(0);
        let err = session.set_stroke_color([0, 0, 0]).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(session.canvas().stroke_color(), [255, 255, 255]);

        session.set_stroke_color([255, 0, 0]).unwrap();
        assert_eq!(session.canvas().stroke_color(), [255, 0, 0]);
    }
}
