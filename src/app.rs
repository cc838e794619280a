//! Renderer builder and the winit application loop.
//!
//! Use method chaining to configure, then call `.run()` to open the window.
//!
//! ```ignore
//! use tidewave::prelude::*;
//!
//! Renderer::new()
//!     .with_window_size(1280, 720)
//!     .with_history_cadence(3)
//!     .run()?;
//! ```

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::error::AppError;
use crate::gpu::{FramePipeline, GpuContext};
use crate::hud::{status_line, StatusThrottle};
use crate::input::{Input, KeyCode};
use crate::motion::{MotionConfig, SettleTimeout};
use crate::passes::DEFAULT_HISTORY_CADENCE;
use crate::time::Time;
use crate::world::World;

const STATUS_INTERVAL: f32 = 0.5;

/// What happens to the offscreen targets when the window is resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizePolicy {
    /// Keep the targets at their initial size; the present pass stretches
    /// them onto the resized surface.
    #[default]
    KeepTargets,
    /// Reallocate every target at the new size. History restarts.
    ReallocateTargets,
}

/// Everything [`Renderer`] can be configured with.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Fixed simulation step. `None` follows the wall clock.
    pub fixed_delta: Option<f32>,
    /// History is reset from the denoised frame every this many frames.
    pub history_cadence: u32,
    pub motion: MotionConfig,
    pub resize_policy: ResizePolicy,
    pub vsync: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            title: "tidewave".to_string(),
            width: 1280,
            height: 720,
            fixed_delta: None,
            history_cadence: DEFAULT_HISTORY_CADENCE,
            motion: MotionConfig::default(),
            resize_policy: ResizePolicy::default(),
            vsync: true,
        }
    }
}

/// Interactive renderer builder.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Initial window size in logical pixels.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self
    }

    /// Step the simulation by a fixed `dt` every frame instead of the
    /// measured frame time.
    pub fn with_fixed_delta(mut self, dt: Option<f32>) -> Self {
        self.config.fixed_delta = dt;
        self
    }

    /// Frames between history resets. Zero disables resets.
    pub fn with_history_cadence(mut self, cadence: u32) -> Self {
        self.config.history_cadence = cadence;
        self
    }

    pub fn with_motion(mut self, motion: MotionConfig) -> Self {
        self.config.motion = motion;
        self
    }

    pub fn with_settle_timeout(mut self, timeout: SettleTimeout) -> Self {
        self.config.motion.timeout = timeout;
        self
    }

    pub fn with_resize_policy(mut self, policy: ResizePolicy) -> Self {
        self.config.resize_policy = policy;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.config.vsync = vsync;
        self
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.config);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct Gpu {
    context: GpuContext,
    pipeline: FramePipeline,
}

struct App {
    config: RendererConfig,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    world: World,
    input: Input,
    time: Time,
    status: StatusThrottle,
    /// Fatal error raised inside the event loop, returned from `run`.
    error: Option<AppError>,
}

impl App {
    fn new(config: RendererConfig) -> Self {
        let mut time = Time::new();
        time.set_fixed_delta(config.fixed_delta);
        Self {
            world: World::new(config.width, config.height, config.motion),
            config,
            window: None,
            gpu: None,
            input: Input::new(),
            time,
            status: StatusThrottle::new(STATUS_INTERVAL),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(self.config.width, self.config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.window = Some(window.clone());

        let context = pollster::block_on(GpuContext::new(window, self.config.vsync))?;
        let (width, height) = (context.config.width, context.config.height);
        let pipeline = FramePipeline::new(
            &context.device,
            context.surface_format(),
            width,
            height,
            self.config.history_cadence,
        )?;

        self.world = World::new(width, height, self.config.motion);
        self.gpu = Some(Gpu { context, pipeline });
        log::info!("renderer started at {width}x{height}");
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        log::error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let frame = self.time.frame();
        let (now, dt) = self.time.update();
        let out = self.world.tick(&mut self.input, now, dt);

        if let Some((width, height)) = out.resized {
            gpu.context.resize(width, height);
            if self.config.resize_policy == ResizePolicy::ReallocateTargets {
                gpu.pipeline.resize_targets(&gpu.context.device, width, height);
            }
            log::info!("viewport resized to {width}x{height}");
        }

        match gpu.pipeline.render(&gpu.context, &out.snapshot, frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.context.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("render error: {e:?}"),
        }

        self.input.begin_tick();

        if self.status.ready(now) {
            let line = status_line(&self.world, now, self.time.fps());
            log::debug!("{line}");
            if let Some(window) = &self.window {
                window.set_title(&format!("{} | {line}", self.config.title));
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.init(event_loop) {
                self.fail(event_loop, err);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => {
                if self.input.key_pressed(KeyCode::Escape) {
                    event_loop.exit();
                    return;
                }
                self.frame(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_config() {
        let renderer = Renderer::new()
            .with_window_size(1920, 0)
            .with_fixed_delta(Some(1.0 / 30.0))
            .with_history_cadence(5)
            .with_settle_timeout(SettleTimeout::KeepOscillating)
            .with_resize_policy(ResizePolicy::ReallocateTargets)
            .with_vsync(false);

        let config = renderer.config();
        assert_eq!((config.width, config.height), (1920, 1));
        assert_eq!(config.fixed_delta, Some(1.0 / 30.0));
        assert_eq!(config.history_cadence, 5);
        assert_eq!(config.motion.timeout, SettleTimeout::KeepOscillating);
        assert_eq!(config.resize_policy, ResizePolicy::ReallocateTargets);
        assert!(!config.vsync);
    }

    #[test]
    fn defaults() {
        let config = RendererConfig::default();
        assert_eq!(config.history_cadence, 3);
        assert_eq!(config.resize_policy, ResizePolicy::KeepTargets);
        assert_eq!(config.motion.timeout, SettleTimeout::ForceRest);
    }
}
