// Fixed render settings for the wireframe cube

use std::time::Duration;

use crate::framebuffer::Color;
use crate::math::Projection;

/// Log filter used when `RUST_LOG` is unset: this crate at `info`, the
/// graphics stack only from `warn` up.
pub const DEFAULT_LOG_FILTER: &str = "warn,wirecube=info";

/// All tunable constants of the program in one place.
///
/// Nothing is read from disk or the command line; `Default` is the only
/// source of values.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub title: String,
    pub projection: Projection,
    /// Radians added to the rotation angle after every frame.
    pub rotation_step: f32,
    /// Blocking delay at the end of each frame.
    pub frame_delay: Duration,
    /// Length of the window over which FPS is averaged, in milliseconds.
    pub fps_window_ms: u64,
    pub background: Color,
    pub foreground: Color,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            title: "Rotating Cube".to_string(),
            projection: Projection::default(),
            rotation_step: 0.01,
            frame_delay: Duration::from_millis(16),
            fps_window_ms: 1000,
            background: Color::BLACK,
            foreground: Color::WHITE,
        }
    }
}
