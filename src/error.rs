// Initialization errors

use thiserror::Error;

/// Everything that can go wrong before the first frame is drawn.
///
/// Each variant keeps the collaborator's own error so the message printed on
/// exit names the real cause.
#[derive(Error, Debug)]
pub enum InitError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[source] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no graphics adapter compatible with the window surface")]
    NoAdapter,

    #[error("failed to open graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported texture format")]
    NoSurfaceFormat,

    #[error("event loop terminated abnormally: {0}")]
    Run(#[source] winit::error::EventLoopError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_stage() {
        assert_eq!(
            InitError::NoAdapter.to_string(),
            "no graphics adapter compatible with the window surface"
        );
        assert!(InitError::NoSurfaceFormat.to_string().contains("texture format"));
    }
}
