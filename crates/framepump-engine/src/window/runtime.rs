use std::time::Instant;

use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::input::platform::winit::{map_modifiers, translate_key_event};
use crate::input::{InputBus, Key, Modifiers, PassThrough};
use crate::pump::{FrameLoop, LoopConfig};
use crate::surface::{share, RenderSurface};
use crate::timer::TimerQueue;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "framepump".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
///
/// Opens one window, builds the surface from it, and pumps a [`FrameLoop`]
/// until the window closes or Escape is pressed.
pub struct Runtime;

impl Runtime {
    pub fn run<S, F>(config: RuntimeConfig, loop_config: LoopConfig, factory: F) -> Result<()>
    where
        S: RenderSurface + 'static,
        F: FnMut(Window) -> Result<S> + 'static,
    {
        loop_config.validate()?;

        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = HostState::new(config, loop_config, factory);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        state.shutdown();
        Ok(())
    }
}

struct HostState<S, F>
where
    S: RenderSurface + 'static,
{
    config: RuntimeConfig,
    loop_config: LoopConfig,
    factory: F,

    timers: TimerQueue,
    input: InputBus,
    modifiers: Modifiers,

    window_id: Option<WindowId>,
    frame_loop: Option<FrameLoop<S>>,
    exit_requested: bool,
}

impl<S, F> HostState<S, F>
where
    S: RenderSurface + 'static,
    F: FnMut(Window) -> Result<S>,
{
    fn new(config: RuntimeConfig, loop_config: LoopConfig, factory: F) -> Self {
        Self {
            config,
            loop_config,
            factory,
            timers: TimerQueue::new(),
            input: InputBus::new(),
            modifiers: Modifiers::default(),
            window_id: None,
            frame_loop: None,
            exit_requested: false,
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn attach(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;
        let id = window.id();

        let surface = (self.factory)(window).context("failed to create render surface")?;
        let frame_loop = FrameLoop::start(
            self.loop_config.clone(),
            share(surface),
            &self.timers,
            &self.input,
        )?;

        self.window_id = Some(id);
        self.frame_loop = Some(frame_loop);
        Ok(())
    }

    /// Stops ticking, then releases the surface.
    fn shutdown(&mut self) {
        if let Some(mut frame_loop) = self.frame_loop.take() {
            frame_loop.stop();
        }
        self.window_id = None;
    }

    fn surface_lost(&self) -> bool {
        self.frame_loop
            .as_ref()
            .is_some_and(|fl| fl.surface().borrow().is_lost())
    }
}

impl<S, F> ApplicationHandler for HostState<S, F>
where
    S: RenderSurface + 'static,
    F: FnMut(Window) -> Result<S>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.frame_loop.is_some() {
            return;
        }

        if let Err(e) = self.attach(event_loop) {
            log::error!("failed to start: {e:#}");
            self.request_exit();
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.exit_requested {
            self.timers.fire_due(Instant::now());

            if self.surface_lost() {
                log::error!("render surface lost; shutting down");
                self.request_exit();
            }
        }

        if self.exit_requested {
            self.shutdown();
            event_loop.exit();
            return;
        }

        match self.timers.next_deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window_id != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.request_exit(),

            WindowEvent::ModifiersChanged(m) => {
                self.modifiers = map_modifiers(m.state());
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(ev) = translate_key_event(&event, self.modifiers) {
                    let decision = self.input.dispatch(&ev);
                    if decision == PassThrough::Forward && ev.key == Key::Escape && !ev.repeat {
                        self.request_exit();
                    }
                }
            }

            WindowEvent::Resized(size) => {
                if let Some(fl) = &self.frame_loop {
                    fl.surface().borrow_mut().resize(size.width, size.height);
                }
            }

            _ => {}
        }

        if self.exit_requested {
            self.shutdown();
            event_loop.exit();
        }
    }
}
