use winit::dpi::LogicalSize;

use crate::device::{CompileFlags, SwapChainDesc};
use crate::render::TRIANGLE_SHADER;
use crate::ui::UiConfig;

/// Everything that differs between the playground variants.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaygroundConfig {
    pub title: String,
    /// Size before maximizing; also what the window restores to.
    pub initial_size: LogicalSize<f64>,
    pub centered: bool,
    pub maximized: bool,

    pub clear_color: [f32; 4],
    /// 0 = present immediately, 1 = wait for vsync.
    pub sync_interval: u32,
    /// Escape key clears the running flag.
    pub escape_quits: bool,
    /// Build and draw the triangle scene.
    pub draw_triangle: bool,
    /// WGSL source of the triangle pipeline.
    pub triangle_shader: &'static str,

    pub swap_chain: SwapChainDesc,
    pub compile_flags: CompileFlags,
    pub ui: UiConfig,
}

impl PlaygroundConfig {
    /// Clear-color editor only, vsync on.
    pub fn dx11() -> Self {
        Self {
            title: "DX11".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
            centered: true,
            maximized: true,
            clear_color: [0.4, 0.8, 1.0, 1.0],
            sync_interval: 1,
            escape_quits: false,
            draw_triangle: false,
            triangle_shader: TRIANGLE_SHADER,
            swap_chain: SwapChainDesc::default(),
            compile_flags: CompileFlags::from_build_config(),
            ui: UiConfig::default(),
        }
    }

    /// Triangle on a grey background, uncapped frame rate, escape quits.
    pub fn sd2() -> Self {
        Self {
            title: "SD2".to_string(),
            clear_color: [0.5, 0.5, 0.5, 1.0],
            sync_interval: 0,
            escape_quits: true,
            draw_triangle: true,
            ..Self::dx11()
        }
    }
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self::dx11()
    }
}
