use crate::device::{Backend, GpuError, InitError};
use crate::input::{Event, EventKind, EventQueue, Key};
use crate::render::{RenderTargets, TriangleScene};
use crate::ui::{DebugUi, UiConfig};

use super::config::PlaygroundConfig;
use super::control::AppControl;

/// The playground: event pump, frame driver and owner of every GPU object.
///
/// Teardown shuts the UI down first, then releases the pipeline objects, the
/// vertex buffer, the render-target view and finally the backend.
pub struct Playground<B, U>
where
    B: Backend,
    U: DebugUi<B>,
{
    config: PlaygroundConfig,
    running: bool,
    clear_color: [f32; 4],
    events: EventQueue,

    // Field order is release order.
    ui: U,
    scene: Option<TriangleScene<B>>,
    targets: RenderTargets<B>,
    backend: B,
}

impl<B, U> Playground<B, U>
where
    B: Backend,
    U: DebugUi<B>,
{
    /// Builds the shell on a bootstrapped backend.
    ///
    /// Order: UI, then (with `draw_triangle`) pipeline and vertex buffer, then
    /// the first render target.
    pub fn new<F>(mut backend: B, ui_init: F, config: PlaygroundConfig) -> Result<Self, InitError>
    where
        F: FnOnce(&mut B, &UiConfig) -> Result<U, InitError>,
    {
        let ui = ui_init(&mut backend, &config.ui)?;

        let mut shell = Self {
            running: false,
            clear_color: config.clear_color,
            events: EventQueue::default(),
            ui,
            scene: None,
            targets: RenderTargets::new(),
            backend,
            config,
        };

        if shell.config.draw_triangle {
            let scene = TriangleScene::new(
                &mut shell.backend,
                shell.config.triangle_shader,
                shell.config.compile_flags,
            )?;
            shell.scene = Some(scene);
        }

        shell
            .targets
            .create_render_target(&mut shell.backend)
            .map_err(InitError::RenderTarget)?;

        log::info!("playground `{}` ready", shell.config.title);
        Ok(shell)
    }

    /// Queues an event for the next pump.
    pub fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Drains the event queue. Every event reaches the UI first.
    pub fn pump_events(&mut self) -> Result<(), GpuError> {
        while let Some(event) = self.events.pop() {
            self.ui.process_event(&event);

            match event.kind {
                EventKind::Quit => {
                    log::info!("quit requested");
                    self.running = false;
                }
                EventKind::KeyDown(Key::Escape) if self.config.escape_quits => {
                    log::info!("escape pressed");
                    self.running = false;
                }
                EventKind::WindowResized { width, height } => {
                    log::debug!("window resized to {width}x{height}");
                    self.targets.create_render_target(&mut self.backend)?;
                }
                EventKind::KeyDown(_) | EventKind::Other => {}
            }
        }
        Ok(())
    }

    /// Runs one self-contained frame and reports whether to keep going.
    pub fn run_frame(&mut self) -> Result<AppControl, GpuError> {
        self.pump_events()?;

        self.backend.clear_state();

        if let Some(view) = self.targets.view() {
            self.backend.om_set_render_targets(&[view]);

            if let Some(scene) = &self.scene {
                scene.bind(&mut self.backend, self.targets.viewport());
            }

            self.backend.clear_render_target_view(view, self.clear_color)?;

            if let Some(scene) = &self.scene {
                scene.draw(&mut self.backend)?;
            }
        } else {
            log::trace!("no render target; frame draws UI only");
        }

        self.ui.new_frame();
        if self.ui.color_edit4("clear color", &mut self.clear_color) {
            log::trace!("clear color -> {:?}", self.clear_color);
        }
        self.ui.render(&mut self.backend)?;

        self.backend.present(self.config.sync_interval, 0)?;

        Ok(if self.running {
            AppControl::Continue
        } else {
            AppControl::Exit
        })
    }

    /// Sets the running flag; the host then calls `run_frame` until it clears.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Runs frames until the running flag clears.
    pub fn main_loop(&mut self) -> Result<(), GpuError> {
        self.start();
        while self.running {
            self.run_frame()?;
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Back-buffer size after the most recent resize.
    pub fn framebuffer_size(&self) -> (u32, u32) {
        self.targets.size()
    }

    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B, U> Drop for Playground<B, U>
where
    B: Backend,
    U: DebugUi<B>,
{
    fn drop(&mut self) {
        self.ui.shutdown();
    }
}
