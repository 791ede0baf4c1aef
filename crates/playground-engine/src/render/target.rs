use crate::device::{Backend, Format, GpuError, Viewport};

/// Owns the render-target view over back buffer 0 and mirrors its size.
///
/// At most one view exists at a time, and none while the back buffer has no
/// area (minimized window).
pub struct RenderTargets<B: Backend> {
    view: Option<B::RenderTargetView>,
    width: u32,
    height: u32,
}

impl<B: Backend> Default for RenderTargets<B> {
    fn default() -> Self {
        Self {
            view: None,
            width: 0,
            height: 0,
        }
    }
}

impl<B: Backend> RenderTargets<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)creates the view after resizing the swap chain to the client area.
    ///
    /// The old view is released before the swap chain is resized; the swap
    /// chain refuses to resize while a view over its buffers is alive.
    pub fn create_render_target(&mut self, backend: &mut B) -> Result<(), GpuError> {
        backend.clear_state();
        self.view = None;

        backend.resize_buffers(0, 0, 0, Format::Unknown, 0)?;
        let back_buffer = backend.get_buffer(0)?;

        let desc = backend.texture_desc(&back_buffer);
        self.width = desc.width;
        self.height = desc.height;

        if desc.width == 0 || desc.height == 0 {
            log::debug!("back buffer has no area; render target deferred");
            return Ok(());
        }

        self.view = Some(backend.create_render_target_view(&back_buffer)?);
        log::info!("render target {}x{}", desc.width, desc.height);
        Ok(())
    }

    pub fn view(&self) -> Option<&B::RenderTargetView> {
        self.view.as_ref()
    }

    /// Back-buffer size after the most recent resize.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Viewport covering the whole back buffer.
    pub fn viewport(&self) -> Viewport {
        Viewport::full(self.width, self.height)
    }
}
