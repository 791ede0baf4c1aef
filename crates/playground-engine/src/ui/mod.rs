//! Immediate-mode debug UI seam.
//!
//! The shell talks to the UI library through `DebugUi`; `EguiOverlay` is the
//! egui implementation drawing on top of the frame through `WgpuBackend`.

mod egui_overlay;

pub use egui_overlay::EguiOverlay;

use crate::device::{Backend, GpuError};
use crate::input::Event;

/// Debug UI settings.
#[derive(Debug, Clone, PartialEq)]
pub struct UiConfig {
    /// Title of the floating debug window.
    pub window_title: String,
    pub dark_mode: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_title: "Debug".to_string(),
            dark_mode: true,
        }
    }
}

/// Per-frame contract between the shell and the UI library.
///
/// Calls per frame, in order: `process_event` for each pumped event,
/// `new_frame`, widgets, `render`. UI state is never persisted to disk.
pub trait DebugUi<B: Backend> {
    fn process_event(&mut self, event: &Event);

    fn new_frame(&mut self);

    /// RGBA color editor; returns `true` when the user changed `color`.
    fn color_edit4(&mut self, label: &str, color: &mut [f32; 4]) -> bool;

    /// Composites the UI over the bound render target.
    fn render(&mut self, backend: &mut B) -> Result<(), GpuError>;

    /// Releases the GPU backend, then the window backend. Idempotent.
    fn shutdown(&mut self);
}
