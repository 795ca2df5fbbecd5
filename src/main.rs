// wirecube: a rotating wireframe cube drawn by a software line rasterizer

// Module declarations
mod config;
mod error;
mod frame_loop;
mod framebuffer;
mod math;
mod renderer;
mod scene;

use std::process::ExitCode;

use winit::event_loop::EventLoop;

use crate::config::RenderSettings;
use crate::error::InitError;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging; RUST_LOG overrides the default filter
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config::DEFAULT_LOG_FILTER),
    )
    .init();

    match run(RenderSettings::default()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::from(1)
        }
    }
}

async fn run(settings: RenderSettings) -> Result<(), InitError> {
    let event_loop = EventLoop::new().map_err(InitError::EventLoop)?;
    let renderer = renderer::Renderer::new(&event_loop, settings).await?;
    renderer.run(event_loop)
}
