use std::error::Error as StdError;

use thiserror::Error;

use super::desc::ShaderStage;

/// Failure of a single backend call.
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("swap chain failed to resize its buffers: {0}")]
    ResizeBuffers(String),
    #[error("back buffer {0} is not accessible")]
    GetBuffer(u32),
    #[error("failed to create render target view: {0}")]
    CreateView(String),
    /// Compiler diagnostics, verbatim.
    #[error("{0}")]
    Compile(String),
    #[error("present failed: {0}")]
    Present(String),
    #[error("surface lost and could not be reconfigured")]
    SurfaceLost,
    #[error("invalid pipeline binding: {0}")]
    InvalidBinding(&'static str),
    #[error("failed to map buffer: {0}")]
    Map(String),
    #[error("{0}")]
    Other(String),
}

/// Fatal startup failure.
///
/// Display strings are the one-line log messages emitted before the process
/// exits with a failure status.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to create D3D11 device and swapChain")]
    DeviceCreate(#[source] Box<dyn StdError + Send + Sync + 'static>),

    #[error("failed to compile {stage} shader: {message}")]
    ShaderCompile { stage: ShaderStage, message: String },

    #[error("failed to create {0} shader")]
    ShaderCreate(ShaderStage),

    #[error("failed to create input layout: {0}")]
    InputLayout(GpuError),

    #[error("failed to create rasterizer state: {0}")]
    Rasterizer(GpuError),

    #[error("failed to create vertex buffer: {0}")]
    BufferCreate(GpuError),

    #[error("failed to upload vertex buffer: {0}")]
    BufferMap(GpuError),

    #[error("failed to create render target: {0}")]
    RenderTarget(GpuError),
}

impl InitError {
    pub fn device_create(cause: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        InitError::DeviceCreate(cause.into())
    }
}
