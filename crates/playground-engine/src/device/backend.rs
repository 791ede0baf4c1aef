use super::desc::{
    BufferDesc, CompileFlags, Format, InputElementDesc, PrimitiveTopology, RasterizerDesc,
    ShaderSource, ShaderStage, Texture2dDesc, Viewport,
};
use super::error::GpuError;

/// One vertex-buffer slot binding for `Backend::ia_set_vertex_buffers`.
pub struct VertexBufferBinding<'a, Buf> {
    pub buffer: &'a Buf,
    pub stride: u32,
    pub offset: u32,
}

/// GPU API surface consumed by the render loop.
///
/// The vocabulary is the one of an immediate-mode API: a device creating
/// objects, an immediate context holding bindings, and a swap chain owning the
/// back buffers. Handles are associated types so a backend decides how they are
/// represented; dropping a handle releases it.
///
/// All methods run on the thread that created the window.
pub trait Backend {
    type Texture;
    type RenderTargetView;
    type ShaderBlob;
    type VertexShader;
    type PixelShader;
    type InputLayout;
    type RasterizerState;
    type Buffer;

    // ── swap chain ────────────────────────────────────────────────────────

    /// Resizes the back buffers.
    ///
    /// Zero `width`/`height` mean "match the window client area" and
    /// `Format::Unknown` keeps the current format. No view over a back buffer
    /// may be alive when this is called.
    fn resize_buffers(
        &mut self,
        buffer_count: u32,
        width: u32,
        height: u32,
        format: Format,
        flags: u32,
    ) -> Result<(), GpuError>;

    fn get_buffer(&mut self, index: u32) -> Result<Self::Texture, GpuError>;

    fn texture_desc(&self, texture: &Self::Texture) -> Texture2dDesc;

    /// Presents the current back buffer. `sync_interval` 0 = no wait, 1 = vsync.
    fn present(&mut self, sync_interval: u32, flags: u32) -> Result<(), GpuError>;

    // ── device ────────────────────────────────────────────────────────────

    fn create_render_target_view(
        &mut self,
        texture: &Self::Texture,
    ) -> Result<Self::RenderTargetView, GpuError>;

    /// Compiles one entry point of `source`. Errors carry the compiler output.
    fn compile_shader(
        &mut self,
        source: &ShaderSource<'_>,
        stage: ShaderStage,
        flags: CompileFlags,
    ) -> Result<Self::ShaderBlob, GpuError>;

    fn create_vertex_shader(&mut self, blob: &Self::ShaderBlob)
        -> Result<Self::VertexShader, GpuError>;

    fn create_pixel_shader(&mut self, blob: &Self::ShaderBlob) -> Result<Self::PixelShader, GpuError>;

    /// Builds an input layout validated against the vertex shader blob.
    fn create_input_layout(
        &mut self,
        elements: &[InputElementDesc],
        vs_blob: &Self::ShaderBlob,
    ) -> Result<Self::InputLayout, GpuError>;

    fn create_rasterizer_state(
        &mut self,
        desc: &RasterizerDesc,
    ) -> Result<Self::RasterizerState, GpuError>;

    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<Self::Buffer, GpuError>;

    // ── immediate context ─────────────────────────────────────────────────

    /// Maps `buffer` with write-discard semantics, hands the mapped bytes to
    /// `write`, then unmaps. Previous contents are undefined inside `write`.
    fn map_write_discard(
        &mut self,
        buffer: &Self::Buffer,
        write: &mut dyn FnMut(&mut [u8]),
    ) -> Result<(), GpuError>;

    /// Unbinds everything from the immediate context.
    fn clear_state(&mut self);

    fn om_set_render_targets(&mut self, views: &[&Self::RenderTargetView]);

    fn rs_set_viewports(&mut self, viewports: &[Viewport]);

    fn rs_set_state(&mut self, state: &Self::RasterizerState);

    fn ia_set_vertex_buffers(
        &mut self,
        start_slot: u32,
        buffers: &[VertexBufferBinding<'_, Self::Buffer>],
    );

    fn ia_set_input_layout(&mut self, layout: &Self::InputLayout);

    fn ia_set_primitive_topology(&mut self, topology: PrimitiveTopology);

    fn vs_set_shader(&mut self, shader: &Self::VertexShader);

    fn ps_set_shader(&mut self, shader: &Self::PixelShader);

    fn clear_render_target_view(
        &mut self,
        view: &Self::RenderTargetView,
        color: [f32; 4],
    ) -> Result<(), GpuError>;

    fn draw(&mut self, vertex_count: u32, start_vertex: u32) -> Result<(), GpuError>;
}
