//! Error types for tidewave.
//!
//! Only startup can fail fatally: window/event-loop creation, GPU
//! initialization and shader compilation. Everything inside the tick loop
//! either clamps, skips or logs.

use thiserror::Error;

/// A WGSL program failed to parse, validate or compile.
#[derive(Debug, Clone, Error)]
#[error("{stage} shader error: {message}")]
pub struct ShaderError {
    /// Which program failed ("Trace", "Denoise", ...).
    pub stage: &'static str,
    pub message: String,
}

impl ShaderError {
    pub fn new(stage: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    #[error("Surface has no supported texture formats for this adapter")]
    NoSurfaceFormat,
    /// One of the pass programs did not compile.
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

/// Errors that can occur while starting the renderer.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to create or run the event loop.
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create the window.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
}
