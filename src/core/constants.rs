//! Constants shared across the capture and inference pipeline.

/// Default canvas width in pixels.
pub const DEFAULT_CANVAS_WIDTH: u32 = 800;

/// Default canvas height in pixels.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 800;

/// Default stroke width in pixels.
pub const DEFAULT_LINE_WIDTH: u32 = 35;

/// Canvas background color (black).
pub const BACKGROUND_COLOR: [u8; 3] = [0, 0, 0];

/// Default stroke color (white).
pub const DEFAULT_STROKE_COLOR: [u8; 3] = [255, 255, 255];

/// Side length of the square model input.
pub const MODEL_INPUT_SIDE: u32 = 28;

/// Number of values in a preprocessed tensor (28 x 28).
pub const MODEL_INPUT_LEN: usize = (MODEL_INPUT_SIDE * MODEL_INPUT_SIDE) as usize;

/// Number of output classes.
pub const NUM_CLASSES: usize = 10;

/// Fixed path the raster snapshot is written to.
pub const DEFAULT_SNAPSHOT_PATH: &str = "user_image.jpg";

/// Default directory holding one subdirectory of weights per model variant.
pub const DEFAULT_MODEL_DIR: &str = "models";

/// File name of the safetensors weights inside a variant directory.
pub const SAFETENSORS_WEIGHTS_FILE: &str = "model.safetensors";

/// File name of the ONNX model inside a variant directory.
pub const ONNX_WEIGHTS_FILE: &str = "model.onnx";

/// File name of the optional architecture configuration inside a variant directory.
pub const MODEL_CONFIG_FILE: &str = "config.json";

/// Tolerance used when checking that probabilities sum to one.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Number of images above which batch loading switches to rayon.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;
