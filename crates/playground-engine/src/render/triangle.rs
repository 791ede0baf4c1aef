use crate::device::{Backend, CompileFlags, GpuError, InitError, PrimitiveTopology, Viewport};

use super::pipeline::{Pipeline, PipelineDesc};
use super::vertex::VertexPCU;
use super::vertex_buffer::{VertexBuffer, TRIANGLE};

/// The single triangle drawn by the `sd2` variant.
pub struct TriangleScene<B: Backend> {
    // Pipeline objects drop before the vertex buffer.
    pipeline: Pipeline<B>,
    vertices: VertexBuffer<B>,
}

impl<B: Backend> TriangleScene<B> {
    /// Builds the pipeline, then allocates and uploads the vertex buffer.
    pub fn new(backend: &mut B, shader: &str, flags: CompileFlags) -> Result<Self, InitError> {
        let pipeline = Pipeline::build(
            backend,
            &PipelineDesc::triangle(shader, &VertexPCU::INPUT_LAYOUT, flags),
        )?;
        Self::with_pipeline(backend, pipeline)
    }

    /// Like `new` with a caller-built pipeline.
    pub fn with_pipeline(backend: &mut B, pipeline: Pipeline<B>) -> Result<Self, InitError> {
        let mut vertices = VertexBuffer::create(backend, &TRIANGLE)?;
        vertices.upload(backend, &TRIANGLE)?;
        log::debug!("triangle uploaded ({} vertices)", vertices.vertex_count());
        Ok(Self { pipeline, vertices })
    }

    /// Binds everything the draw needs onto the immediate context.
    pub fn bind(&self, backend: &mut B, viewport: Viewport) {
        backend.rs_set_viewports(&[viewport]);
        backend.rs_set_state(&self.pipeline.rasterizer);
        self.vertices.bind(backend);
        backend.ia_set_input_layout(&self.pipeline.input_layout);
        backend.ia_set_primitive_topology(PrimitiveTopology::TriangleList);
        backend.vs_set_shader(&self.pipeline.vertex_shader);
        backend.ps_set_shader(&self.pipeline.pixel_shader);
    }

    pub fn draw(&self, backend: &mut B) -> Result<(), GpuError> {
        backend.draw(self.vertices.vertex_count(), 0)
    }
}
