use std::fmt;

/// Resource formats understood by the backend seam.
///
/// Only the formats the playground actually uses are listed. `Unknown` is the
/// "keep the current format" sentinel accepted by `Backend::resize_buffers`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Format {
    Unknown,
    R8G8B8A8Unorm,
    B8G8R8A8Unorm,
    R32G32Float,
    R32G32B32Float,
}

impl Format {
    /// Size of one element in bytes, `None` for `Unknown`.
    pub fn size_bytes(self) -> Option<u32> {
        match self {
            Format::Unknown => None,
            Format::R8G8B8A8Unorm | Format::B8G8R8A8Unorm => Some(4),
            Format::R32G32Float => Some(8),
            Format::R32G32B32Float => Some(12),
        }
    }

    pub fn to_wgpu_texture(self) -> Option<wgpu::TextureFormat> {
        match self {
            Format::R8G8B8A8Unorm => Some(wgpu::TextureFormat::Rgba8Unorm),
            Format::B8G8R8A8Unorm => Some(wgpu::TextureFormat::Bgra8Unorm),
            _ => None,
        }
    }

    pub fn from_wgpu_texture(format: wgpu::TextureFormat) -> Format {
        match format {
            wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => {
                Format::R8G8B8A8Unorm
            }
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => {
                Format::B8G8R8A8Unorm
            }
            _ => Format::Unknown,
        }
    }

    pub fn to_wgpu_vertex(self) -> Option<wgpu::VertexFormat> {
        match self {
            Format::Unknown | Format::B8G8R8A8Unorm => None,
            Format::R8G8B8A8Unorm => Some(wgpu::VertexFormat::Unorm8x4),
            Format::R32G32Float => Some(wgpu::VertexFormat::Float32x2),
            Format::R32G32B32Float => Some(wgpu::VertexFormat::Float32x3),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Pixel => f.write_str("pixel"),
        }
    }
}

// ── swap chain ────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Rational {
    pub numerator: u32,
    pub denominator: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SwapEffect {
    FlipSequential,
    FlipDiscard,
}

/// Swap-chain description handed to device bootstrap.
///
/// `width`/`height` of zero mean "infer from the window client area".
#[derive(Debug, Clone, PartialEq)]
pub struct SwapChainDesc {
    pub width: u32,
    pub height: u32,
    pub format: Format,
    pub refresh_rate: Rational,
    pub sample_count: u32,
    pub sample_quality: u32,
    pub buffer_count: u32,
    pub windowed: bool,
    pub swap_effect: SwapEffect,
    pub allow_mode_switch: bool,
}

impl Default for SwapChainDesc {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            format: Format::R8G8B8A8Unorm,
            refresh_rate: Rational { numerator: 60, denominator: 1 },
            sample_count: 1,
            sample_quality: 0,
            buffer_count: 2,
            windowed: true,
            swap_effect: SwapEffect::FlipDiscard,
            allow_mode_switch: true,
        }
    }
}

/// Description of a 2D texture as read back from the swap chain.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Texture2dDesc {
    pub width: u32,
    pub height: u32,
    pub format: Format,
}

// ── rasterizer / input assembler ──────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Viewport covering a `width` x `height` target with depth range `0..1`.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            top_left_x: 0.0,
            top_left_y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PrimitiveTopology {
    TriangleList,
}

impl PrimitiveTopology {
    pub fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            PrimitiveTopology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FillMode {
    Solid,
    Wireframe,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RasterizerDesc {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub front_counter_clockwise: bool,
    pub depth_clip_enable: bool,
    pub antialiased_line_enable: bool,
}

impl RasterizerDesc {
    /// Solid fill, no culling, depth clip on, antialiased lines on.
    pub const fn solid_no_cull() -> Self {
        Self {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::None,
            front_counter_clockwise: false,
            depth_clip_enable: true,
            antialiased_line_enable: true,
        }
    }
}

/// Byte offset of an input element inside a vertex.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ElementOffset {
    At(u32),
    /// Directly after the previous element.
    AppendAligned,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct InputElementDesc {
    pub semantic: &'static str,
    pub semantic_index: u32,
    pub format: Format,
    pub input_slot: u32,
    pub offset: ElementOffset,
}

impl InputElementDesc {
    /// Resolves append-aligned offsets.
    ///
    /// Returns one absolute byte offset per element plus the end of the last
    /// element (the minimum vertex stride).
    pub fn resolve_offsets(elements: &[InputElementDesc]) -> Result<(Vec<u32>, u32), String> {
        let mut offsets = Vec::with_capacity(elements.len());
        let mut cursor = 0u32;
        let mut end = 0u32;

        for el in elements {
            let size = el.format.size_bytes().ok_or_else(|| {
                format!("{}{} has no vertex format", el.semantic, el.semantic_index)
            })?;
            let offset = match el.offset {
                ElementOffset::At(o) => o,
                ElementOffset::AppendAligned => cursor,
            };
            cursor = offset + size;
            end = end.max(cursor);
            offsets.push(offset);
        }

        Ok((offsets, end))
    }
}

// ── buffers ───────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Usage {
    Default,
    Dynamic,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BindFlags {
    VertexBuffer,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CpuAccess {
    None,
    Write,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BufferDesc {
    pub byte_width: u64,
    pub usage: Usage,
    pub bind_flags: BindFlags,
    pub cpu_access: CpuAccess,
}

impl BufferDesc {
    /// Dynamic, CPU-writable vertex buffer of `byte_width` bytes.
    pub const fn dynamic_vertex(byte_width: u64) -> Self {
        Self {
            byte_width,
            usage: Usage::Dynamic,
            bind_flags: BindFlags::VertexBuffer,
            cpu_access: CpuAccess::Write,
        }
    }
}

// ── shaders ───────────────────────────────────────────────────────────────

/// Shader compilation flags.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CompileFlags {
    pub debug_info: bool,
    pub skip_optimization: bool,
    pub warnings_are_errors: bool,
    pub optimization_level: u8,
}

impl CompileFlags {
    pub const DEBUG: Self = Self {
        debug_info: true,
        skip_optimization: true,
        warnings_are_errors: true,
        optimization_level: 0,
    };

    pub const RELEASE: Self = Self {
        debug_info: false,
        skip_optimization: false,
        warnings_are_errors: false,
        optimization_level: 3,
    };

    /// `DEBUG` in debug builds, `RELEASE` otherwise.
    pub fn from_build_config() -> Self {
        if cfg!(debug_assertions) { Self::DEBUG } else { Self::RELEASE }
    }
}

/// Shader source plus the entry point to compile.
#[derive(Debug, Copy, Clone)]
pub struct ShaderSource<'a> {
    pub name: &'a str,
    pub code: &'a str,
    pub entry_point: &'a str,
}
