//! Pointer events as delivered by a host UI toolkit.

use super::StrokeCanvas;
use crate::core::errors::{DoodleError, DoodleResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One pointer event in canvas pixel space.
///
/// Serialized with an `event` tag, e.g. `{"event": "drag", "x": 12, "y": 40}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PointerEvent {
    /// Button pressed: a stroke starts here.
    Press { x: f32, y: f32 },
    /// Pointer moved with the button held.
    Drag { x: f32, y: f32 },
    /// Button released.
    Release,
}

impl PointerEvent {
    /// Applies the event to a canvas.
    pub fn apply(&self, canvas: &mut StrokeCanvas) {
        match *self {
            PointerEvent::Press { x, y } => canvas.begin_stroke(x, y),
            PointerEvent::Drag { x, y } => canvas.extend_stroke(x, y),
            PointerEvent::Release => canvas.end_stroke(),
        }
    }
}

/// Reads a JSON array of pointer events from a file.
pub fn load_events(path: impl AsRef<Path>) -> DoodleResult<Vec<PointerEvent>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| {
        DoodleError::invalid_input(format!(
            "failed to parse pointer events from '{}': {}",
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasConfig;
    use std::io::Write;

    #[test]
    fn test_event_json_format() {
        let events: Vec<PointerEvent> = serde_json::from_str(
            r#"[
                {"event": "press", "x": 10, "y": 20},
                {"event": "drag", "x": 30.5, "y": 20},
                {"event": "release"}
            ]"#,
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                PointerEvent::Press { x: 10.0, y: 20.0 },
                PointerEvent::Drag { x: 30.5, y: 20.0 },
                PointerEvent::Release,
            ]
        );
    }

    #[test]
    fn test_apply_events_draws() {
        let mut canvas = StrokeCanvas::new(&CanvasConfig {
            width: 64,
            height: 64,
            line_width: 4,
            ..CanvasConfig::default()
        });
        let events = [
            PointerEvent::Drag { x: 5.0, y: 5.0 },
            PointerEvent::Press { x: 10.0, y: 32.0 },
            PointerEvent::Drag { x: 50.0, y: 32.0 },
            PointerEvent::Release,
            PointerEvent::Drag { x: 50.0, y: 60.0 },
        ];
        for event in &events {
            event.apply(&mut canvas);
        }
        assert_eq!(canvas.image().get_pixel(30, 32).0, [255, 255, 255]);
        assert_eq!(canvas.image().get_pixel(5, 5).0, [0, 0, 0]);
        assert_eq!(canvas.image().get_pixel(50, 58).0, [0, 0, 0]);
    }

    #[test]
    fn test_load_events_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"event": "press", "x": 1, "y": 2}}]"#).unwrap();
        let events = load_events(file.path()).unwrap();
        assert_eq!(events, vec![PointerEvent::Press { x: 1.0, y: 2.0 }]);
    }

    #[test]
    fn test_load_events_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_events(file.path()).unwrap_err().is_invalid_input());
    }
}
