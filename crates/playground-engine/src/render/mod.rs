//! Render-side building blocks on top of `device::Backend`.
//!
//! - `target`: render-target view over the swap chain's back buffer
//! - `pipeline`: shader stages, input layout, rasterizer state
//! - `vertex_buffer` / `vertex`: the triangle's vertex data
//! - `triangle`: binds and draws the above

mod pipeline;
mod target;
mod triangle;
mod vertex;
mod vertex_buffer;

pub use pipeline::{Pipeline, PipelineDesc, TRIANGLE_SHADER};
pub use target::RenderTargets;
pub use triangle::TriangleScene;
pub use vertex::{Rgba8, VertexPCU};
pub use vertex_buffer::{VertexBuffer, TRIANGLE};
