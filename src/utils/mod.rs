//! Utility functions: image loading and logging setup.

pub mod image;

pub use self::image::{load_image, load_images_batch, load_images_batch_with_threshold};

/// Initializes the tracing subscriber for logging.
///
/// Sets up an environment filter (`RUST_LOG`) and a formatting layer.
/// Call once at application start.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
