//! GPU device seam.
//!
//! `Backend` is the immediate-mode vocabulary the render loop speaks:
//! swap-chain buffers, device object creation and context bindings.
//! `WgpuBackend` implements it on wgpu; tests substitute a recording fake.

mod backend;
mod desc;
mod error;
mod feature_level;
mod surface;
mod wgpu_backend;

pub use backend::{Backend, VertexBufferBinding};
pub use desc::{
    BindFlags, BufferDesc, CompileFlags, CpuAccess, CullMode, ElementOffset, FillMode, Format,
    InputElementDesc, PrimitiveTopology, RasterizerDesc, Rational, ShaderSource, ShaderStage,
    SwapChainDesc, SwapEffect, Texture2dDesc, Usage, Viewport,
};
pub use error::{GpuError, InitError};
pub use feature_level::FeatureLevel;
pub use surface::SurfaceErrorAction;
pub use wgpu_backend::WgpuBackend;
