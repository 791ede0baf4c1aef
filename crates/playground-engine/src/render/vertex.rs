use bytemuck::{Pod, Zeroable};

use crate::device::{ElementOffset, Format, InputElementDesc};

/// 8-bit UNORM RGBA color, as fed to the `COLOR` input.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Pod, Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const RED: Self = Self::opaque(255, 0, 0);
    pub const GREEN: Self = Self::opaque(0, 255, 0);
    pub const BLUE: Self = Self::opaque(0, 0, 255);
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Position / color / UV vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct VertexPCU {
    pub position: [f32; 3],
    pub color: Rgba8,
    pub uv: [f32; 2],
}

impl VertexPCU {
    /// Byte stride of one vertex.
    pub const STRIDE: u32 = std::mem::size_of::<VertexPCU>() as u32;

    /// Input-layout elements; element `i` feeds shader location `i`.
    pub const INPUT_LAYOUT: [InputElementDesc; 3] = [
        InputElementDesc {
            semantic: "POSITION",
            semantic_index: 0,
            format: Format::R32G32B32Float,
            input_slot: 0,
            offset: ElementOffset::At(0),
        },
        InputElementDesc {
            semantic: "COLOR",
            semantic_index: 0,
            format: Format::R8G8B8A8Unorm,
            input_slot: 0,
            offset: ElementOffset::AppendAligned,
        },
        // UV is two floats; the layout follows the struct.
        InputElementDesc {
            semantic: "TEXCOORD",
            semantic_index: 0,
            format: Format::R32G32Float,
            input_slot: 0,
            offset: ElementOffset::AppendAligned,
        },
    ];

    pub const fn new(position: [f32; 3], color: Rgba8, uv: [f32; 2]) -> Self {
        Self { position, color, uv }
    }
}
