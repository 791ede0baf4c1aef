use std::sync::Arc;

use winit::window::Window;

use crate::device::{GpuError, WgpuBackend};
use crate::input::Event;

use super::{DebugUi, UiConfig};

/// egui context plus its winit and wgpu backends.
pub struct EguiOverlay {
    // Render backend drops before the window backend.
    renderer: Option<egui_wgpu::Renderer>,
    state: Option<egui_winit::State>,
    ctx: egui::Context,
    window: Arc<Window>,
    window_title: String,
}

impl EguiOverlay {
    pub fn new(
        window: Arc<Window>,
        backend: &WgpuBackend,
        config: &UiConfig,
    ) -> Self {
        let ctx = egui::Context::default();
        ctx.set_theme(if config.dark_mode {
            egui::Theme::Dark
        } else {
            egui::Theme::Light
        });

        let max_texture_side = backend.device().limits().max_texture_dimension_2d as usize;
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            &*window,
            Some(window.scale_factor() as f32),
            window.theme(),
            Some(max_texture_side),
        );

        let renderer = egui_wgpu::Renderer::new(
            backend.device(),
            backend.surface_format(),
            egui_wgpu::RendererOptions::default(),
        );

        log::debug!(
            "egui overlay initialized ({:?}, max texture {max_texture_side})",
            backend.surface_format()
        );

        Self {
            renderer: Some(renderer),
            state: Some(state),
            ctx,
            window,
            window_title: config.window_title.clone(),
        }
    }
}

impl DebugUi<WgpuBackend> for EguiOverlay {
    fn process_event(&mut self, event: &Event) {
        let (Some(state), Some(native)) = (self.state.as_mut(), event.native.as_ref()) else {
            return;
        };
        let response = state.on_window_event(&self.window, native);
        if response.repaint {
            log::trace!("egui consumed={} for {:?}", response.consumed, event.kind);
        }
    }

    fn new_frame(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let raw_input = state.take_egui_input(&self.window);
        self.ctx.begin_pass(raw_input);
    }

    fn color_edit4(&mut self, label: &str, color: &mut [f32; 4]) -> bool {
        let mut changed = false;

        egui::Window::new(self.window_title.as_str()).show(&self.ctx, |ui| {
            ui.horizontal(|ui| {
                changed |= ui.color_edit_button_rgba_unmultiplied(color).changed();
                ui.label(label);
            });
            ui.horizontal(|ui| {
                for (channel, name) in color.iter_mut().zip(["R", "G", "B", "A"]) {
                    let drag = egui::DragValue::new(channel)
                        .range(0.0..=1.0)
                        .speed(0.005)
                        .prefix(format!("{name} "));
                    changed |= ui.add(drag).changed();
                }
            });
        });

        changed
    }

    fn render(&mut self, backend: &mut WgpuBackend) -> Result<(), GpuError> {
        let (Some(state), Some(renderer)) = (self.state.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };

        let output = self.ctx.end_pass();
        state.handle_platform_output(&self.window, output.platform_output);

        let jobs = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        let size = backend.size();
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: output.pixels_per_point,
        };

        for (id, delta) in &output.textures_delta.set {
            renderer.update_texture(backend.device(), backend.queue(), *id, delta);
        }

        backend.encode_overlay(|device, queue, encoder, view| {
            let uploads = renderer.update_buffers(device, queue, encoder, &jobs, &screen);

            let mut rpass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui overlay"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
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
                })
                .forget_lifetime();
            renderer.render(&mut rpass, &jobs, &screen);

            uploads
        })?;

        for id in &output.textures_delta.free {
            renderer.free_texture(id);
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.renderer.take().is_some() {
            log::debug!("egui wgpu backend released");
        }
        self.state = None;
    }
}
