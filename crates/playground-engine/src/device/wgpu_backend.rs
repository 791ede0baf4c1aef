use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use raw_window_handle::HasWindowHandle;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::backend::{Backend, VertexBufferBinding};
use super::desc::{
    BindFlags, BufferDesc, CompileFlags, CpuAccess, CullMode, FillMode, Format, InputElementDesc,
    PrimitiveTopology, RasterizerDesc, ShaderSource, ShaderStage, SwapChainDesc, Texture2dDesc,
    Usage, Viewport,
};
use super::error::{GpuError, InitError};
use super::feature_level::FeatureLevel;
use super::surface::{self, SurfaceErrorAction};

/// Back buffer 0 as seen at a given swap-chain generation.
///
/// wgpu hands out a fresh surface texture every frame, so the handle only
/// remembers which resize it belongs to; the texture itself is acquired when
/// the first command of a frame targets it.
#[derive(Debug, Clone)]
pub struct BackBuffer {
    generation: u64,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
}

#[derive(Debug)]
pub struct RenderTargetView {
    generation: u64,
}

pub struct ShaderBlob {
    module: wgpu::ShaderModule,
    entry_point: String,
    stage: ShaderStage,
}

#[derive(Clone)]
struct ShaderObject {
    id: u64,
    module: wgpu::ShaderModule,
    entry_point: String,
}

pub struct VertexShader(ShaderObject);

pub struct PixelShader(ShaderObject);

#[derive(Clone)]
pub struct InputLayout {
    id: u64,
    attributes: Arc<[wgpu::VertexAttribute]>,
    min_stride: u32,
}

#[derive(Clone)]
pub struct RasterizerState {
    id: u64,
    primitive: wgpu::PrimitiveState,
}

pub struct Buffer {
    buffer: wgpu::Buffer,
    byte_width: u64,
    cpu_writable: bool,
}

struct BoundVertexBuffer {
    buffer: wgpu::Buffer,
    stride: u32,
    offset: u32,
}

/// Immediate-context bindings. `clear_state` resets this to default.
#[derive(Default)]
struct BoundState {
    render_target: Option<u64>,
    viewport: Option<Viewport>,
    rasterizer: Option<RasterizerState>,
    vertex_buffer: Option<BoundVertexBuffer>,
    input_layout: Option<InputLayout>,
    topology: Option<PrimitiveTopology>,
    vertex_shader: Option<ShaderObject>,
    pixel_shader: Option<ShaderObject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    vertex_shader: u64,
    pixel_shader: u64,
    input_layout: u64,
    rasterizer: u64,
    topology: PrimitiveTopology,
    stride: u32,
    format: wgpu::TextureFormat,
}

/// Surface texture plus the encoder recording into it for the current frame.
struct GpuFrame {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
    /// Command buffers that must be submitted ahead of `encoder`.
    prelude: Vec<wgpu::CommandBuffer>,
}

/// `Backend` implemented on wgpu.
///
/// Immediate-context calls update `BoundState`; clears and draws each record a
/// render pass into the frame encoder, and `present` submits and presents.
/// Render pipelines are built lazily from the bound objects and cached.
pub struct WgpuBackend {
    // Field order is release order: frame resources, cached pipelines, then
    // surface (swap chain), queue (context), device.
    frame: Option<GpuFrame>,
    state: BoundState,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    pipeline_layout: wgpu::PipelineLayout,
    surface: wgpu::Surface<'static>,
    queue: wgpu::Queue,
    device: wgpu::Device,
    adapter_info: wgpu::AdapterInfo,
    window: Arc<Window>,

    config: wgpu::SurfaceConfiguration,
    caps: wgpu::SurfaceCapabilities,
    size: PhysicalSize<u32>,
    feature_level: FeatureLevel,
    sync_interval: u32,
    generation: u64,
    next_id: u64,
}

impl WgpuBackend {
    /// Creates the device, immediate context and swap chain for `window`.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu; this blocks on it.
    pub fn bootstrap(
        window: Arc<Window>,
        desc: &SwapChainDesc,
        sync_interval: u32,
    ) -> Result<Self, InitError> {
        pollster::block_on(Self::create(window, desc, sync_interval))
            .map_err(InitError::device_create)
    }

    async fn create(
        window: Arc<Window>,
        desc: &SwapChainDesc,
        sync_interval: u32,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            desc.sample_count == 1,
            "multisampled swap chains are not supported (count {})",
            desc.sample_count
        );
        anyhow::ensure!(desc.windowed, "exclusive fullscreen swap chains are not supported");

        {
            let handle = window
                .window_handle()
                .context("native window handle is unavailable")?;
            log::debug!("binding swap chain to {:?}", handle.as_raw());
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::from_build_config(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let adapter_info = adapter.get_info();
        anyhow::ensure!(
            adapter_info.device_type != wgpu::DeviceType::Cpu,
            "adapter `{}` is a software rasterizer",
            adapter_info.name
        );

        let feature_level = FeatureLevel::select(&adapter.limits()).with_context(|| {
            format!("adapter `{}` does not reach feature level 10.0", adapter_info.name)
        })?;

        let optional = wgpu::Features::POLYGON_MODE_LINE | wgpu::Features::DEPTH_CLIP_CONTROL;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("playground device"),
                required_features: adapter.features() & optional,
                required_limits: feature_level.limits(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, desc.format)
            .context("no supported surface formats")?;

        let size = if desc.width == 0 || desc.height == 0 {
            window.inner_size()
        } else {
            PhysicalSize::new(desc.width, desc.height)
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface::choose_present_mode(&caps, sync_interval),
            alpha_mode: surface::choose_alpha_mode(&caps),
            view_formats: vec![],
            desired_maximum_frame_latency: desc.buffer_count.max(1),
        };

        if size.width > 0 && size.height > 0 {
            surface.configure(&device, &config);
        }

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("playground pipeline layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        log::info!(
            "device created on `{}` ({:?}) at feature level {}",
            adapter_info.name,
            adapter_info.backend,
            feature_level
        );
        log::debug!(
            "swap chain: {:?} {}x{}, {} buffers, {:?}, {:?}, refresh hint {}/{}",
            format,
            size.width,
            size.height,
            config.desired_maximum_frame_latency,
            config.present_mode,
            desc.swap_effect,
            desc.refresh_rate.numerator,
            desc.refresh_rate.denominator
        );

        Ok(Self {
            frame: None,
            state: BoundState::default(),
            pipelines: HashMap::new(),
            pipeline_layout,
            surface,
            queue,
            device,
            adapter_info,
            window,
            config,
            caps,
            size,
            feature_level,
            sync_interval,
            generation: 0,
            next_id: 1,
        })
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn feature_level(&self) -> FeatureLevel {
        self.feature_level
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    /// Records extra work into the current frame, targeting the bound render
    /// target.
    ///
    /// `encode` receives the frame encoder and the back-buffer view; command
    /// buffers it returns are submitted ahead of the frame encoder. Nothing
    /// happens when no render target is bound or the frame was skipped.
    pub fn encode_overlay<F>(&mut self, encode: F) -> Result<(), GpuError>
    where
        F: FnOnce(
            &wgpu::Device,
            &wgpu::Queue,
            &mut wgpu::CommandEncoder,
            &wgpu::TextureView,
        ) -> Vec<wgpu::CommandBuffer>,
    {
        let Some(target) = self.state.render_target else {
            return Ok(());
        };
        self.check_generation(target)?;
        if !self.ensure_frame()? {
            return Ok(());
        }
        let Some(frame) = self.frame.as_mut() else {
            return Ok(());
        };

        let prelude = encode(&self.device, &self.queue, &mut frame.encoder, &frame.view);
        frame.prelude.extend(prelude);
        Ok(())
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn check_generation(&self, generation: u64) -> Result<(), GpuError> {
        if generation == self.generation {
            Ok(())
        } else {
            Err(GpuError::InvalidBinding(
                "render target view outlived a swap-chain resize",
            ))
        }
    }

    /// Acquires the surface texture for this frame if not done yet.
    ///
    /// Returns `false` when the frame must be skipped (zero-sized or transient
    /// surface error).
    fn ensure_frame(&mut self) -> Result<bool, GpuError> {
        if self.frame.is_some() {
            return Ok(true);
        }
        if self.size.width == 0 || self.size.height == 0 {
            return Ok(false);
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(err) => {
                log::debug!("surface acquire failed: {err}");
                let action = surface::map_surface_error(
                    &self.surface,
                    &self.device,
                    &self.config,
                    self.size,
                    err,
                );
                return match action {
                    SurfaceErrorAction::Fatal => Err(GpuError::SurfaceLost),
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => Ok(false),
                };
            }
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("playground frame encoder"),
            });

        self.frame = Some(GpuFrame {
            surface_texture,
            view,
            encoder,
            prelude: Vec::new(),
        });
        Ok(true)
    }

    /// Looks up or builds the render pipeline for the current bindings.
    fn bound_pipeline(&mut self) -> Result<wgpu::RenderPipeline, GpuError> {
        let state = &self.state;
        let vs = state
            .vertex_shader
            .as_ref()
            .ok_or(GpuError::InvalidBinding("no vertex shader bound"))?;
        let ps = state
            .pixel_shader
            .as_ref()
            .ok_or(GpuError::InvalidBinding("no pixel shader bound"))?;
        let layout = state
            .input_layout
            .as_ref()
            .ok_or(GpuError::InvalidBinding("no input layout bound"))?;
        let rasterizer = state
            .rasterizer
            .as_ref()
            .ok_or(GpuError::InvalidBinding("no rasterizer state bound"))?;
        let topology = state
            .topology
            .ok_or(GpuError::InvalidBinding("no primitive topology set"))?;
        let vb = state
            .vertex_buffer
            .as_ref()
            .ok_or(GpuError::InvalidBinding("no vertex buffer bound"))?;

        if vb.stride < layout.min_stride {
            return Err(GpuError::InvalidBinding(
                "vertex stride is smaller than the input layout",
            ));
        }

        let key = PipelineKey {
            vertex_shader: vs.id,
            pixel_shader: ps.id,
            input_layout: layout.id,
            rasterizer: rasterizer.id,
            topology,
            stride: vb.stride,
            format: self.config.format,
        };

        if let Some(pipeline) = self.pipelines.get(&key) {
            return Ok(pipeline.clone());
        }

        let pipeline = build_pipeline(
            &self.device,
            &self.pipeline_layout,
            PipelineParts {
                vs,
                ps,
                layout,
                rasterizer,
                topology,
                stride: vb.stride,
                format: self.config.format,
            },
        )?;
        self.pipelines.insert(key, pipeline.clone());
        Ok(pipeline)
    }
}

impl Backend for WgpuBackend {
    type Texture = BackBuffer;
    type RenderTargetView = RenderTargetView;
    type ShaderBlob = ShaderBlob;
    type VertexShader = VertexShader;
    type PixelShader = PixelShader;
    type InputLayout = InputLayout;
    type RasterizerState = RasterizerState;
    type Buffer = Buffer;

    fn resize_buffers(
        &mut self,
        buffer_count: u32,
        width: u32,
        height: u32,
        format: Format,
        _flags: u32,
    ) -> Result<(), GpuError> {
        if self.frame.take().is_some() {
            log::debug!("discarding in-flight frame before resize");
        }

        if buffer_count > 0 {
            self.config.desired_maximum_frame_latency = buffer_count;
        }

        if format != Format::Unknown {
            let requested = format
                .to_wgpu_texture()
                .filter(|f| self.caps.formats.contains(f))
                .ok_or_else(|| {
                    GpuError::ResizeBuffers(format!("{format:?} is not supported by the surface"))
                })?;
            if requested != self.config.format {
                self.config.format = requested;
                self.pipelines.clear();
            }
        }

        let new_size = if width == 0 || height == 0 {
            self.window.inner_size()
        } else {
            PhysicalSize::new(width, height)
        };

        surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            new_size,
        );
        self.generation += 1;

        log::debug!(
            "swap chain resized to {}x{} (generation {})",
            self.size.width,
            self.size.height,
            self.generation
        );
        Ok(())
    }

    fn get_buffer(&mut self, index: u32) -> Result<BackBuffer, GpuError> {
        // Flip-model swap chains only expose buffer 0.
        if index != 0 {
            return Err(GpuError::GetBuffer(index));
        }
        Ok(BackBuffer {
            generation: self.generation,
            width: self.size.width,
            height: self.size.height,
            format: self.config.format,
        })
    }

    fn texture_desc(&self, texture: &BackBuffer) -> Texture2dDesc {
        Texture2dDesc {
            width: texture.width,
            height: texture.height,
            format: Format::from_wgpu_texture(texture.format),
        }
    }

    fn present(&mut self, sync_interval: u32, _flags: u32) -> Result<(), GpuError> {
        if let Some(frame) = self.frame.take() {
            let GpuFrame {
                surface_texture,
                view,
                encoder,
                prelude,
            } = frame;

            self.queue
                .submit(prelude.into_iter().chain(std::iter::once(encoder.finish())));
            drop(view);
            self.window.pre_present_notify();
            surface_texture.present();
        }

        // wgpu fixes the present mode per configuration; apply interval
        // changes to the next frame.
        if sync_interval != self.sync_interval {
            self.sync_interval = sync_interval;
            self.config.present_mode = surface::choose_present_mode(&self.caps, sync_interval);
            if self.size.width > 0 && self.size.height > 0 {
                self.surface.configure(&self.device, &self.config);
            }
            log::debug!("present mode switched to {:?}", self.config.present_mode);
        }

        Ok(())
    }

    fn create_render_target_view(
        &mut self,
        texture: &BackBuffer,
    ) -> Result<RenderTargetView, GpuError> {
        if texture.generation != self.generation {
            return Err(GpuError::CreateView(
                "back buffer predates the last resize".to_string(),
            ));
        }
        if texture.width == 0 || texture.height == 0 {
            return Err(GpuError::CreateView("back buffer has no area".to_string()));
        }
        Ok(RenderTargetView {
            generation: texture.generation,
        })
    }

    fn compile_shader(
        &mut self,
        source: &ShaderSource<'_>,
        stage: ShaderStage,
        flags: CompileFlags,
    ) -> Result<ShaderBlob, GpuError> {
        log::debug!(
            "compiling {stage} shader `{}::{}` ({flags:?})",
            source.name,
            source.entry_point
        );

        check_entry_point(source.name, source.code, source.entry_point, stage)?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(source.name),
                source: wgpu::ShaderSource::Wgsl(source.code.into()),
            });
        let info = pollster::block_on(module.get_compilation_info());
        let scope_error = pollster::block_on(self.device.pop_error_scope());

        let diagnostics: Vec<String> = info
            .messages
            .iter()
            .filter(|m| {
                m.message_type == wgpu::CompilationMessageType::Error
                    || (flags.warnings_are_errors
                        && m.message_type == wgpu::CompilationMessageType::Warning)
            })
            .map(|m| match &m.location {
                Some(loc) => format!(
                    "{}:{}:{}: {}",
                    source.name, loc.line_number, loc.line_position, m.message
                ),
                None => format!("{}: {}", source.name, m.message),
            })
            .collect();

        if !diagnostics.is_empty() {
            return Err(GpuError::Compile(diagnostics.join("\n")));
        }
        if let Some(err) = scope_error {
            return Err(GpuError::Compile(err.to_string()));
        }
        Ok(ShaderBlob {
            module,
            entry_point: source.entry_point.to_string(),
            stage,
        })
    }

    fn create_vertex_shader(&mut self, blob: &ShaderBlob) -> Result<VertexShader, GpuError> {
        if blob.stage != ShaderStage::Vertex {
            return Err(GpuError::Other(format!(
                "blob was compiled for the {} stage",
                blob.stage
            )));
        }
        Ok(VertexShader(ShaderObject {
            id: self.next_id(),
            module: blob.module.clone(),
            entry_point: blob.entry_point.clone(),
        }))
    }

    fn create_pixel_shader(&mut self, blob: &ShaderBlob) -> Result<PixelShader, GpuError> {
        if blob.stage != ShaderStage::Pixel {
            return Err(GpuError::Other(format!(
                "blob was compiled for the {} stage",
                blob.stage
            )));
        }
        Ok(PixelShader(ShaderObject {
            id: self.next_id(),
            module: blob.module.clone(),
            entry_point: blob.entry_point.clone(),
        }))
    }

    fn create_input_layout(
        &mut self,
        elements: &[InputElementDesc],
        vs_blob: &ShaderBlob,
    ) -> Result<InputLayout, GpuError> {
        if vs_blob.stage != ShaderStage::Vertex {
            return Err(GpuError::Other(
                "input layouts are validated against a vertex shader blob".to_string(),
            ));
        }

        let (offsets, min_stride) =
            InputElementDesc::resolve_offsets(elements).map_err(GpuError::Other)?;

        // Element `i` feeds shader location `i`.
        let attributes = elements
            .iter()
            .zip(offsets)
            .enumerate()
            .map(|(location, (el, offset))| {
                if el.input_slot != 0 {
                    return Err(GpuError::Other(format!(
                        "{}{} uses input slot {}; only slot 0 is wired",
                        el.semantic, el.semantic_index, el.input_slot
                    )));
                }
                let format = el.format.to_wgpu_vertex().ok_or_else(|| {
                    GpuError::Other(format!("{:?} is not a vertex format", el.format))
                })?;
                Ok(wgpu::VertexAttribute {
                    format,
                    offset: u64::from(offset),
                    shader_location: location as u32,
                })
            })
            .collect::<Result<Vec<_>, GpuError>>()?;

        Ok(InputLayout {
            id: self.next_id(),
            attributes: attributes.into(),
            min_stride,
        })
    }

    fn create_rasterizer_state(
        &mut self,
        desc: &RasterizerDesc,
    ) -> Result<RasterizerState, GpuError> {
        let features = self.device.features();

        let polygon_mode = match desc.fill_mode {
            FillMode::Solid => wgpu::PolygonMode::Fill,
            FillMode::Wireframe => {
                if !features.contains(wgpu::Features::POLYGON_MODE_LINE) {
                    return Err(GpuError::Other(
                        "wireframe fill needs POLYGON_MODE_LINE".to_string(),
                    ));
                }
                wgpu::PolygonMode::Line
            }
        };

        if !desc.depth_clip_enable && !features.contains(wgpu::Features::DEPTH_CLIP_CONTROL) {
            return Err(GpuError::Other(
                "disabling depth clip needs DEPTH_CLIP_CONTROL".to_string(),
            ));
        }

        if desc.antialiased_line_enable {
            log::trace!("antialiased lines requested; wgpu has no per-state switch");
        }

        let cull_mode = match desc.cull_mode {
            CullMode::None => None,
            CullMode::Front => Some(wgpu::Face::Front),
            CullMode::Back => Some(wgpu::Face::Back),
        };

        Ok(RasterizerState {
            id: self.next_id(),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: if desc.front_counter_clockwise {
                    wgpu::FrontFace::Ccw
                } else {
                    wgpu::FrontFace::Cw
                },
                cull_mode,
                unclipped_depth: !desc.depth_clip_enable,
                polygon_mode,
                conservative: false,
            },
        })
    }

    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<Buffer, GpuError> {
        if desc.byte_width == 0 {
            return Err(GpuError::Other("buffers cannot be empty".to_string()));
        }
        if desc.usage == Usage::Dynamic && desc.cpu_access != CpuAccess::Write {
            return Err(GpuError::Other(
                "dynamic buffers must be CPU-writable".to_string(),
            ));
        }

        let mut usage = match desc.bind_flags {
            BindFlags::VertexBuffer => wgpu::BufferUsages::VERTEX,
        };
        let cpu_writable = desc.cpu_access == CpuAccess::Write;
        if cpu_writable {
            usage |= wgpu::BufferUsages::COPY_DST;
        }

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("playground buffer"),
            size: wgpu::util::align_to(desc.byte_width, wgpu::COPY_BUFFER_ALIGNMENT),
            usage,
            mapped_at_creation: false,
        });

        Ok(Buffer {
            buffer,
            byte_width: desc.byte_width,
            cpu_writable,
        })
    }

    fn map_write_discard(
        &mut self,
        buffer: &Buffer,
        write: &mut dyn FnMut(&mut [u8]),
    ) -> Result<(), GpuError> {
        if !buffer.cpu_writable {
            return Err(GpuError::Map(
                "buffer was created without CPU write access".to_string(),
            ));
        }

        // Discard: the mapped range starts zeroed and is written back whole.
        let size = buffer.buffer.size() as usize;
        let mut staging = vec![0u8; size];
        write(&mut staging[..buffer.byte_width as usize]);
        self.queue.write_buffer(&buffer.buffer, 0, &staging);
        Ok(())
    }

    fn clear_state(&mut self) {
        self.state = BoundState::default();
    }

    fn om_set_render_targets(&mut self, views: &[&RenderTargetView]) {
        if views.len() > 1 {
            log::warn!("{} render targets bound; only the first is used", views.len());
        }
        self.state.render_target = views.first().map(|v| v.generation);
    }

    fn rs_set_viewports(&mut self, viewports: &[Viewport]) {
        self.state.viewport = viewports.first().copied();
    }

    fn rs_set_state(&mut self, state: &RasterizerState) {
        self.state.rasterizer = Some(state.clone());
    }

    fn ia_set_vertex_buffers(&mut self, start_slot: u32, buffers: &[VertexBufferBinding<'_, Buffer>]) {
        for (i, binding) in buffers.iter().enumerate() {
            let slot = start_slot + i as u32;
            if slot != 0 {
                log::warn!("vertex buffer slot {slot} ignored; only slot 0 is wired");
                continue;
            }
            self.state.vertex_buffer = Some(BoundVertexBuffer {
                buffer: binding.buffer.buffer.clone(),
                stride: binding.stride,
                offset: binding.offset,
            });
        }
    }

    fn ia_set_input_layout(&mut self, layout: &InputLayout) {
        self.state.input_layout = Some(layout.clone());
    }

    fn ia_set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        self.state.topology = Some(topology);
    }

    fn vs_set_shader(&mut self, shader: &VertexShader) {
        self.state.vertex_shader = Some(shader.0.clone());
    }

    fn ps_set_shader(&mut self, shader: &PixelShader) {
        self.state.pixel_shader = Some(shader.0.clone());
    }

    fn clear_render_target_view(
        &mut self,
        view: &RenderTargetView,
        color: [f32; 4],
    ) -> Result<(), GpuError> {
        self.check_generation(view.generation)?;
        if !self.ensure_frame()? {
            return Ok(());
        }
        let Some(frame) = self.frame.as_mut() else {
            return Ok(());
        };

        let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("playground clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: f64::from(color[0]),
                        g: f64::from(color[1]),
                        b: f64::from(color[2]),
                        a: f64::from(color[3]),
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, start_vertex: u32) -> Result<(), GpuError> {
        let target = self
            .state
            .render_target
            .ok_or(GpuError::InvalidBinding("no render target bound"))?;
        self.check_generation(target)?;

        let pipeline = self.bound_pipeline()?;
        if !self.ensure_frame()? {
            return Ok(());
        }
        let Some(frame) = self.frame.as_mut() else {
            return Ok(());
        };
        let Some(vb) = self.state.vertex_buffer.as_ref() else {
            return Err(GpuError::InvalidBinding("no vertex buffer bound"));
        };

        let viewport = match self.state.viewport {
            Some(vp) => match clamp_viewport(vp, self.size) {
                Some(rect) => Some((rect, vp.min_depth, vp.max_depth)),
                None => {
                    log::trace!("viewport has no area; draw skipped");
                    return Ok(());
                }
            },
            None => None,
        };

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("playground draw"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        rpass.set_pipeline(&pipeline);
        if let Some(((x, y, w, h), min_depth, max_depth)) = viewport {
            rpass.set_viewport(x, y, w, h, min_depth, max_depth);
        }
        rpass.set_vertex_buffer(0, vb.buffer.slice(u64::from(vb.offset)..));
        rpass.draw(start_vertex..start_vertex + vertex_count, 0..1);
        Ok(())
    }
}

struct PipelineParts<'a> {
    vs: &'a ShaderObject,
    ps: &'a ShaderObject,
    layout: &'a InputLayout,
    rasterizer: &'a RasterizerState,
    topology: PrimitiveTopology,
    stride: u32,
    format: wgpu::TextureFormat,
}

fn build_pipeline(
    device: &wgpu::Device,
    pipeline_layout: &wgpu::PipelineLayout,
    parts: PipelineParts<'_>,
) -> Result<wgpu::RenderPipeline, GpuError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("playground pipeline"),
        layout: Some(pipeline_layout),

        vertex: wgpu::VertexState {
            module: &parts.vs.module,
            entry_point: Some(parts.vs.entry_point.as_str()),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: u64::from(parts.stride),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &parts.layout.attributes[..],
            }],
        },

        fragment: Some(wgpu::FragmentState {
            module: &parts.ps.module,
            entry_point: Some(parts.ps.entry_point.as_str()),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: parts.format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: parts.topology.to_wgpu(),
            ..parts.rasterizer.primitive
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(GpuError::Other(format!("pipeline creation failed: {err}")));
    }

    log::debug!(
        "built pipeline for {:?}, stride {}, {:?}",
        parts.topology,
        parts.stride,
        parts.format
    );
    Ok(pipeline)
}

/// Parses `code` as WGSL and checks that `entry` is a `stage` entry point.
fn check_entry_point(
    name: &str,
    code: &str,
    entry: &str,
    stage: ShaderStage,
) -> Result<(), GpuError> {
    let module = naga::front::wgsl::parse_str(code)
        .map_err(|err| GpuError::Compile(err.emit_to_string_with_path(code, name)))?;

    let wanted = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Pixel => naga::ShaderStage::Fragment,
    };

    match module.entry_points.iter().find(|ep| ep.name == entry) {
        Some(ep) if ep.stage == wanted => Ok(()),
        Some(ep) => Err(GpuError::Compile(format!(
            "{name}: entry point `{entry}` is declared for the {:?} stage, not {stage}",
            ep.stage
        ))),
        None => Err(GpuError::Compile(format!(
            "{name}: entry point `{entry}` not found"
        ))),
    }
}

/// Clamps a viewport to the drawable; `None` when nothing is left.
fn clamp_viewport(vp: Viewport, size: PhysicalSize<u32>) -> Option<(f32, f32, f32, f32)> {
    let max_w = size.width as f32;
    let max_h = size.height as f32;
    let x = vp.top_left_x.clamp(0.0, max_w);
    let y = vp.top_left_y.clamp(0.0, max_h);
    let w = vp.width.min(max_w - x);
    let h = vp.height.min(max_h - y);
    if w <= 0.0 || h <= 0.0 { None } else { Some((x, y, w, h)) }
}
