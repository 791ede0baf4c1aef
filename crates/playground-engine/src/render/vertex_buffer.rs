use crate::device::{Backend, BufferDesc, GpuError, InitError, VertexBufferBinding};

use super::vertex::{Rgba8, VertexPCU};

/// The hard-coded triangle, clockwise in clip space.
pub const TRIANGLE: [VertexPCU; 3] = [
    VertexPCU::new([-0.5, -0.5, 0.0], Rgba8::RED, [0.0, 0.0]),
    VertexPCU::new([0.0, 0.5, 0.0], Rgba8::GREEN, [0.0, 0.0]),
    VertexPCU::new([0.5, -0.5, 0.0], Rgba8::BLUE, [0.0, 0.0]),
];

/// Dynamic vertex buffer sized for a fixed vertex slice.
pub struct VertexBuffer<B: Backend> {
    buffer: B::Buffer,
    byte_width: u64,
    vertex_count: u32,
}

impl<B: Backend> VertexBuffer<B> {
    /// Allocates a CPU-writable buffer of exactly `size_of_val(vertices)` bytes.
    pub fn create(backend: &mut B, vertices: &[VertexPCU]) -> Result<Self, InitError> {
        let byte_width = std::mem::size_of_val(vertices) as u64;
        let desc = BufferDesc::dynamic_vertex(byte_width);
        let buffer = backend
            .create_buffer(&desc)
            .map_err(InitError::BufferCreate)?;

        Ok(Self {
            buffer,
            byte_width,
            vertex_count: vertices.len() as u32,
        })
    }

    /// Replaces the buffer contents (map write-discard, copy, unmap).
    ///
    /// `vertices` must fit the allocation; the draw count follows the upload.
    pub fn upload(&mut self, backend: &mut B, vertices: &[VertexPCU]) -> Result<(), InitError> {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        if bytes.len() as u64 > self.byte_width {
            return Err(InitError::BufferMap(GpuError::Map(format!(
                "{} bytes do not fit a {}-byte vertex buffer",
                bytes.len(),
                self.byte_width
            ))));
        }

        backend
            .map_write_discard(&self.buffer, &mut |mapped: &mut [u8]| {
                mapped[..bytes.len()].copy_from_slice(bytes);
            })
            .map_err(InitError::BufferMap)?;

        self.vertex_count = vertices.len() as u32;
        Ok(())
    }

    /// Binds the buffer to slot 0 with the `VertexPCU` stride.
    pub fn bind(&self, backend: &mut B) {
        backend.ia_set_vertex_buffers(
            0,
            &[VertexBufferBinding {
                buffer: &self.buffer,
                stride: VertexPCU::STRIDE,
                offset: 0,
            }],
        );
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}
