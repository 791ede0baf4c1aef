//! Recording fakes for the backend and UI seams.
//!
//! Both write into one shared `Journal`, so tests can assert on the relative
//! order of GPU and UI calls.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::device::{
    Backend, BufferDesc, CompileFlags, Format, GpuError, InputElementDesc, PrimitiveTopology,
    RasterizerDesc, ShaderSource, ShaderStage, Texture2dDesc, VertexBufferBinding, Viewport,
};
use crate::input::{Event, EventKind};
use crate::ui::DebugUi;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Resource {
    RenderTargetView,
    ShaderBlob,
    VertexShader,
    PixelShader,
    InputLayout,
    RasterizerState,
    Buffer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateDeviceAndSwapChain,
    ResizeBuffers { buffer_count: u32, width: u32, height: u32, format: Format, flags: u32 },
    GetBuffer(u32),
    CreateRenderTargetView { id: u32, width: u32, height: u32 },
    CompileShader { id: u32, stage: ShaderStage, entry_point: String },
    CreateVertexShader(u32),
    CreatePixelShader(u32),
    CreateInputLayout(u32),
    CreateRasterizerState(u32),
    CreateBuffer { id: u32, byte_width: u64 },
    MapWriteDiscard { buffer: u32, bytes: Vec<u8> },
    ClearState,
    OmSetRenderTargets(Vec<u32>),
    RsSetViewports(Vec<Viewport>),
    RsSetState(u32),
    IaSetVertexBuffers { start_slot: u32, buffer: u32, stride: u32, offset: u32 },
    IaSetInputLayout(u32),
    IaSetPrimitiveTopology(PrimitiveTopology),
    VsSetShader(u32),
    PsSetShader(u32),
    ClearRenderTargetView { id: u32, color: [f32; 4] },
    Draw { vertex_count: u32, start_vertex: u32 },
    Present { sync_interval: u32, flags: u32 },
    Release(Resource, u32),
    ReleaseDevice,

    UiInit,
    UiProcessEvent(EventKind),
    UiNewFrame,
    UiColorEdit { label: String, color: [f32; 4] },
    UiRender,
    UiShutdown,
}

pub type Journal = Rc<RefCell<Vec<Call>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Index of the first call matching `pred` at or after `from`.
pub fn find(calls: &[Call], from: usize, pred: impl Fn(&Call) -> bool) -> Option<usize> {
    calls[from..].iter().position(pred).map(|i| i + from)
}

/// Splits a call stream into frames, each ending with its `Present`.
pub fn frames(calls: &[Call]) -> Vec<&[Call]> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, call) in calls.iter().enumerate() {
        if matches!(call, Call::Present { .. }) {
            out.push(&calls[start..=i]);
            start = i + 1;
        }
    }
    out
}

/// Fake GPU object; records its release.
#[derive(Debug)]
pub struct Tracked {
    pub id: u32,
    kind: Resource,
    journal: Journal,
    live: Option<Rc<Cell<u32>>>,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        if let Some(live) = &self.live {
            live.set(live.get() - 1);
        }
        self.journal.borrow_mut().push(Call::Release(self.kind, self.id));
    }
}

#[derive(Debug)]
pub struct FakeTexture {
    width: u32,
    height: u32,
}

#[derive(Debug)]
pub struct FakeBlob {
    _handle: Tracked,
    stage: ShaderStage,
}

#[derive(Debug)]
pub struct FakeBuffer {
    handle: Tracked,
    byte_width: u64,
}

/// Backend calls a test can force to fail.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Fail {
    ResizeBuffers,
    GetBuffer,
    CreateView,
    CreateVertexShader,
    CreatePixelShader,
    CreateInputLayout,
    CreateRasterizer,
    CreateBuffer,
    Map,
    Draw,
    Present,
}

/// `Backend` that journals every call and simulates back-buffer sizing.
///
/// Resizing fails while a render-target view is alive. Shader compilation
/// fails when the source does not declare the entry point. Calls listed with
/// `fail` return an error after being journaled.
pub struct RecordingBackend {
    journal: Journal,
    client_size: (u32, u32),
    back_buffer: (u32, u32),
    live_views: Rc<Cell<u32>>,
    failing: Vec<Fail>,
    next_id: u32,
}

impl RecordingBackend {
    pub fn bootstrap(journal: Journal, client_size: (u32, u32)) -> Self {
        journal.borrow_mut().push(Call::CreateDeviceAndSwapChain);
        Self {
            journal,
            client_size,
            back_buffer: client_size,
            live_views: Rc::new(Cell::new(0)),
            failing: Vec::new(),
            next_id: 1,
        }
    }

    /// Client area the next `resize_buffers(0, 0, ..)` adopts.
    pub fn set_client_size(&mut self, width: u32, height: u32) {
        self.client_size = (width, height);
    }

    pub fn live_views(&self) -> u32 {
        self.live_views.get()
    }

    /// Makes every later `op` call fail.
    pub fn fail(&mut self, op: Fail) {
        self.failing.push(op);
    }

    pub fn failing(mut self, op: Fail) -> Self {
        self.fail(op);
        self
    }

    fn check(&self, op: Fail, err: impl FnOnce() -> GpuError) -> Result<(), GpuError> {
        if self.failing.contains(&op) {
            return Err(err());
        }
        Ok(())
    }

    fn record(&self, call: Call) {
        self.journal.borrow_mut().push(call);
    }

    fn track(&mut self, kind: Resource) -> Tracked {
        let id = self.next_id;
        self.next_id += 1;
        Tracked {
            id,
            kind,
            journal: self.journal.clone(),
            live: None,
        }
    }
}

impl Drop for RecordingBackend {
    fn drop(&mut self) {
        self.record(Call::ReleaseDevice);
    }
}

impl Backend for RecordingBackend {
    type Texture = FakeTexture;
    type RenderTargetView = Tracked;
    type ShaderBlob = FakeBlob;
    type VertexShader = Tracked;
    type PixelShader = Tracked;
    type InputLayout = Tracked;
    type RasterizerState = Tracked;
    type Buffer = FakeBuffer;

    fn resize_buffers(
        &mut self,
        buffer_count: u32,
        width: u32,
        height: u32,
        format: Format,
        flags: u32,
    ) -> Result<(), GpuError> {
        self.record(Call::ResizeBuffers { buffer_count, width, height, format, flags });
        self.check(Fail::ResizeBuffers, || GpuError::ResizeBuffers("device removed".into()))?;
        if self.live_views.get() > 0 {
            return Err(GpuError::ResizeBuffers("a view over the back buffer is alive".into()));
        }
        self.back_buffer = if width == 0 || height == 0 {
            self.client_size
        } else {
            (width, height)
        };
        Ok(())
    }

    fn get_buffer(&mut self, index: u32) -> Result<FakeTexture, GpuError> {
        self.record(Call::GetBuffer(index));
        if index != 0 || self.failing.contains(&Fail::GetBuffer) {
            return Err(GpuError::GetBuffer(index));
        }
        Ok(FakeTexture {
            width: self.back_buffer.0,
            height: self.back_buffer.1,
        })
    }

    fn texture_desc(&self, texture: &FakeTexture) -> Texture2dDesc {
        Texture2dDesc {
            width: texture.width,
            height: texture.height,
            format: Format::R8G8B8A8Unorm,
        }
    }

    fn present(&mut self, sync_interval: u32, flags: u32) -> Result<(), GpuError> {
        self.record(Call::Present { sync_interval, flags });
        self.check(Fail::Present, || GpuError::Present("device removed".into()))
    }

    fn create_render_target_view(&mut self, texture: &FakeTexture) -> Result<Tracked, GpuError> {
        self.check(Fail::CreateView, || GpuError::CreateView("out of memory".into()))?;
        let mut view = self.track(Resource::RenderTargetView);
        self.live_views.set(self.live_views.get() + 1);
        view.live = Some(self.live_views.clone());
        self.record(Call::CreateRenderTargetView {
            id: view.id,
            width: texture.width,
            height: texture.height,
        });
        Ok(view)
    }

    fn compile_shader(
        &mut self,
        source: &ShaderSource<'_>,
        stage: ShaderStage,
        _flags: CompileFlags,
    ) -> Result<FakeBlob, GpuError> {
        let handle = self.track(Resource::ShaderBlob);
        self.record(Call::CompileShader {
            id: handle.id,
            stage,
            entry_point: source.entry_point.to_string(),
        });
        if !source.code.contains(&format!("fn {}(", source.entry_point)) {
            return Err(GpuError::Compile(format!(
                "{}:1:1: entry point `{}` not found",
                source.name, source.entry_point
            )));
        }
        Ok(FakeBlob { _handle: handle, stage })
    }

    fn create_vertex_shader(&mut self, blob: &FakeBlob) -> Result<Tracked, GpuError> {
        if blob.stage != ShaderStage::Vertex {
            return Err(GpuError::Other("not a vertex blob".into()));
        }
        self.check(Fail::CreateVertexShader, || GpuError::Other("bytecode rejected".into()))?;
        let shader = self.track(Resource::VertexShader);
        self.record(Call::CreateVertexShader(shader.id));
        Ok(shader)
    }

    fn create_pixel_shader(&mut self, blob: &FakeBlob) -> Result<Tracked, GpuError> {
        if blob.stage != ShaderStage::Pixel {
            return Err(GpuError::Other("not a pixel blob".into()));
        }
        self.check(Fail::CreatePixelShader, || GpuError::Other("bytecode rejected".into()))?;
        let shader = self.track(Resource::PixelShader);
        self.record(Call::CreatePixelShader(shader.id));
        Ok(shader)
    }

    fn create_input_layout(
        &mut self,
        elements: &[InputElementDesc],
        vs_blob: &FakeBlob,
    ) -> Result<Tracked, GpuError> {
        if vs_blob.stage != ShaderStage::Vertex {
            return Err(GpuError::Other("not a vertex blob".into()));
        }
        InputElementDesc::resolve_offsets(elements).map_err(GpuError::Other)?;
        self.check(Fail::CreateInputLayout, || {
            GpuError::Other("signature does not match the shader".into())
        })?;
        let layout = self.track(Resource::InputLayout);
        self.record(Call::CreateInputLayout(layout.id));
        Ok(layout)
    }

    fn create_rasterizer_state(&mut self, _desc: &RasterizerDesc) -> Result<Tracked, GpuError> {
        self.check(Fail::CreateRasterizer, || GpuError::Other("out of memory".into()))?;
        let state = self.track(Resource::RasterizerState);
        self.record(Call::CreateRasterizerState(state.id));
        Ok(state)
    }

    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<FakeBuffer, GpuError> {
        self.check(Fail::CreateBuffer, || GpuError::Other("out of memory".into()))?;
        let handle = self.track(Resource::Buffer);
        self.record(Call::CreateBuffer {
            id: handle.id,
            byte_width: desc.byte_width,
        });
        Ok(FakeBuffer {
            handle,
            byte_width: desc.byte_width,
        })
    }

    fn map_write_discard(
        &mut self,
        buffer: &FakeBuffer,
        write: &mut dyn FnMut(&mut [u8]),
    ) -> Result<(), GpuError> {
        self.check(Fail::Map, || GpuError::Map("device removed".into()))?;
        let mut bytes = vec![0u8; buffer.byte_width as usize];
        write(&mut bytes);
        self.record(Call::MapWriteDiscard {
            buffer: buffer.handle.id,
            bytes,
        });
        Ok(())
    }

    fn clear_state(&mut self) {
        self.record(Call::ClearState);
    }

    fn om_set_render_targets(&mut self, views: &[&Tracked]) {
        self.record(Call::OmSetRenderTargets(views.iter().map(|v| v.id).collect()));
    }

    fn rs_set_viewports(&mut self, viewports: &[Viewport]) {
        self.record(Call::RsSetViewports(viewports.to_vec()));
    }

    fn rs_set_state(&mut self, state: &Tracked) {
        self.record(Call::RsSetState(state.id));
    }

    fn ia_set_vertex_buffers(
        &mut self,
        start_slot: u32,
        buffers: &[VertexBufferBinding<'_, FakeBuffer>],
    ) {
        for b in buffers {
            self.record(Call::IaSetVertexBuffers {
                start_slot,
                buffer: b.buffer.handle.id,
                stride: b.stride,
                offset: b.offset,
            });
        }
    }

    fn ia_set_input_layout(&mut self, layout: &Tracked) {
        self.record(Call::IaSetInputLayout(layout.id));
    }

    fn ia_set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        self.record(Call::IaSetPrimitiveTopology(topology));
    }

    fn vs_set_shader(&mut self, shader: &Tracked) {
        self.record(Call::VsSetShader(shader.id));
    }

    fn ps_set_shader(&mut self, shader: &Tracked) {
        self.record(Call::PsSetShader(shader.id));
    }

    fn clear_render_target_view(&mut self, view: &Tracked, color: [f32; 4]) -> Result<(), GpuError> {
        self.record(Call::ClearRenderTargetView { id: view.id, color });
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, start_vertex: u32) -> Result<(), GpuError> {
        self.record(Call::Draw { vertex_count, start_vertex });
        self.check(Fail::Draw, || GpuError::Other("device removed".into()))
    }
}

/// `DebugUi` whose color edits follow a script, one entry per frame.
pub struct ScriptedUi {
    journal: Journal,
    edits: VecDeque<Option<[f32; 4]>>,
    shut_down: bool,
}

impl ScriptedUi {
    pub fn new(journal: Journal) -> Self {
        journal.borrow_mut().push(Call::UiInit);
        Self {
            journal,
            edits: VecDeque::new(),
            shut_down: false,
        }
    }

    /// `Some(color)` makes that frame's color edit return `color`.
    pub fn script(mut self, edits: impl IntoIterator<Item = Option<[f32; 4]>>) -> Self {
        self.edits.extend(edits);
        self
    }

    fn record(&self, call: Call) {
        self.journal.borrow_mut().push(call);
    }
}

impl DebugUi<RecordingBackend> for ScriptedUi {
    fn process_event(&mut self, event: &Event) {
        self.record(Call::UiProcessEvent(event.kind));
    }

    fn new_frame(&mut self) {
        self.record(Call::UiNewFrame);
    }

    fn color_edit4(&mut self, label: &str, color: &mut [f32; 4]) -> bool {
        let edit = self.edits.pop_front().flatten();
        if let Some(v) = edit {
            *color = v;
        }
        self.record(Call::UiColorEdit {
            label: label.to_string(),
            color: *color,
        });
        edit.is_some()
    }

    fn render(&mut self, _backend: &mut RecordingBackend) -> Result<(), GpuError> {
        self.record(Call::UiRender);
        Ok(())
    }

    fn shutdown(&mut self) {
        if !self.shut_down {
            self.shut_down = true;
            self.record(Call::UiShutdown);
        }
    }
}
