use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{AppControl, Playground, PlaygroundConfig};
use crate::device::WgpuBackend;
use crate::input::Event;
use crate::ui::EguiOverlay;

type Shell = Playground<WgpuBackend, EguiOverlay>;

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and drives the playground until it stops running.
    ///
    /// Initialization and frame failures end the event loop and are returned.
    pub fn run(config: PlaygroundConfig) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut host = Host::new(config);
        event_loop
            .run_app(&mut host)
            .context("winit event loop terminated with error")?;

        host.finish()
    }
}

struct Host {
    config: PlaygroundConfig,
    // The shell drops before the window it renders into.
    shell: Option<Shell>,
    window: Option<Arc<Window>>,
    failure: Option<anyhow::Error>,
}

impl Host {
    fn new(config: PlaygroundConfig) -> Self {
        Self {
            config,
            shell: None,
            window: None,
            failure: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(true)
            .with_maximized(self.config.maximized);

        if self.config.centered {
            if let Some(position) = centered_position(event_loop, self.config.initial_size) {
                attrs = attrs.with_position(position);
            }
        }

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );
        let size = window.inner_size();
        log::info!(
            "window `{}` created ({}x{})",
            self.config.title,
            size.width,
            size.height
        );

        let backend = WgpuBackend::bootstrap(
            window.clone(),
            &self.config.swap_chain,
            self.config.sync_interval,
        )?;

        let ui_window = window.clone();
        let mut shell = Playground::new(
            backend,
            move |backend, ui| Ok(EguiOverlay::new(ui_window, backend, ui)),
            self.config.clone(),
        )?;
        shell.start();

        self.window = Some(window);
        self.shell = Some(shell);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.shell = None;
        self.failure = Some(err);
        event_loop.exit();
    }

    fn finish(self) -> Result<()> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for Host {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.shell.is_some() || self.failure.is_some() {
            return;
        }

        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(shell), Some(window)) = (self.shell.as_mut(), self.window.as_ref()) else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        shell.push_event(Event::from_window_event(&event, window.inner_size()));
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(shell) = self.shell.as_mut() else {
            return;
        };

        match shell.run_frame() {
            Ok(AppControl::Continue) => {}
            Ok(AppControl::Exit) => {
                log::info!("shutting down");
                self.shell = None;
                event_loop.exit();
            }
            Err(err) => self.fail(event_loop, anyhow::Error::new(err).context("frame failed")),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shell = None;
    }
}

/// Top-left position that centers `size` on the primary monitor.
fn centered_position(
    event_loop: &ActiveEventLoop,
    size: LogicalSize<f64>,
) -> Option<PhysicalPosition<i32>> {
    let monitor = event_loop
        .primary_monitor()
        .or_else(|| event_loop.available_monitors().next())?;

    let size = size.to_physical::<f64>(monitor.scale_factor());
    let origin = monitor.position();
    let area = monitor.size();

    Some(PhysicalPosition::new(
        origin.x + ((f64::from(area.width) - size.width) / 2.0).max(0.0) as i32,
        origin.y + ((f64::from(area.height) - size.height) / 2.0).max(0.0) as i32,
    ))
}
