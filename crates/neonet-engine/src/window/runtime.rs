use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use super::lifecycle::Lifecycle;
use crate::core::{open_pass, AppControl, FrameCtx, LoadCtx, Scene};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::paint::Color;
use crate::resources::TextureCache;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Initial inner size in logical pixels.
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    /// Directory texture names are resolved against.
    pub texture_root: Option<PathBuf>,
    /// Frames the scene leaves untouched are cleared to this.
    pub clear_color: Color,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "neonet".to_string(),
            width: 800,
            height: 600,
            resizable: true,
            texture_root: None,
            clear_color: Color::BLACK,
        }
    }
}

impl RuntimeConfig {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_texture_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.texture_root = Some(root.into());
        self
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs `scene` in a new window until the window closes or the scene asks
    /// to exit.
    ///
    /// `Scene::initialize` runs before the event loop exists. An error from
    /// window/GPU creation or from `load_content` ends the loop and is
    /// returned here.
    pub fn run<S>(config: RuntimeConfig, gpu_init: GpuInit, mut scene: S) -> Result<()>
    where
        S: Scene + 'static,
    {
        let mut config = config;
        scene.initialize(&mut config);
        log::info!("starting {} ({}x{})", config.title, config.width, config.height);

        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, scene);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    textures: TextureCache,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<S>
where
    S: Scene + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    scene: S,

    window: Option<WindowEntry>,
    lifecycle: Lifecycle,
    error: Option<anyhow::Error>,
}

impl<S> AppState<S>
where
    S: Scene + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, scene: S) -> Self {
        Self {
            config,
            gpu_init,
            scene,
            window: None,
            lifecycle: Lifecycle::new(),
            error: None,
        }
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.width as f64,
                self.config.height as f64,
            ))
            .with_resizable(self.config.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let textures = match &self.config.texture_root {
            Some(root) => TextureCache::with_root(root),
            None => TextureCache::new(),
        };
        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            textures,
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init)).context("GPU initialization failed")
            },
        }
        .try_build()
    }

    fn load_content(&mut self) -> Result<()> {
        let (scene, window) = (&mut self.scene, &mut self.window);
        let Some(entry) = window.as_mut() else {
            anyhow::bail!("load_content without a window");
        };

        entry.with_mut(|fields| {
            let mut ctx = LoadCtx {
                window: fields.window,
                gpu: fields.gpu,
                textures: fields.textures,
            };
            scene.load_content(&mut ctx)
        })?;

        self.lifecycle.mark_loaded(Instant::now())?;
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        self.stop(event_loop);
    }

    /// Stops the loop and releases GPU resources: cached textures first, then
    /// the surface and device with the window.
    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        self.lifecycle.stop();

        if let Some(entry) = self.window.take() {
            entry.with_textures(|t| t.clear());
            drop(entry);
            log::info!("window closed, resources released");
        }

        event_loop.exit();
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        let (scene, window) = (&mut self.scene, &mut self.window);
        let Some(entry) = window.as_mut() else { return };

        let viewport = entry.with_gpu_mut(|gpu| {
            gpu.resize(new_size);
            gpu.viewport()
        });
        scene.resized(viewport);
        entry.with_window(|w| w.request_redraw());
    }

    /// One frame: tick the clock, `update`, acquire the surface texture,
    /// `render`, then submit and present.
    fn redraw(&mut self) -> AppControl {
        let Some(time) = self.lifecycle.begin_frame(Instant::now()) else {
            return AppControl::Continue;
        };

        let (scene, window) = (&mut self.scene, &mut self.window);
        let Some(entry) = window.as_mut() else {
            return AppControl::Continue;
        };

        if scene.update(&time) == AppControl::Exit {
            return AppControl::Exit;
        }

        let clear_color = self.config.clear_color;

        entry.with_mut(|fields| {
            let mut frame = match fields.gpu.begin_frame() {
                Ok(frame) => frame,
                Err(err) => {
                    return match fields.gpu.handle_surface_error(err) {
                        SurfaceErrorAction::Fatal => AppControl::Exit,
                        _ => AppControl::Continue,
                    };
                }
            };

            let viewport = fields.gpu.viewport();
            let (control, cleared) = {
                let mut ctx = FrameCtx::new(fields.window, fields.gpu, fields.textures, &mut frame);
                let control = scene.render(&mut ctx, &time);
                (control, ctx.is_cleared())
            };

            if !cleared {
                drop(open_pass(&mut frame.encoder, &frame.view, clear_color, viewport));
            }

            fields.window.pre_present_notify();
            fields.gpu.present(frame);
            control
        })
    }
}

impl<S> ApplicationHandler for AppState<S>
where
    S: Scene + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.lifecycle.is_stopped() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => self.window = Some(entry),
            Err(e) => {
                self.fail(event_loop, e.context("failed to create initial window"));
                return;
            }
        }

        if let Err(e) = self.load_content() {
            self.fail(event_loop, e.context("failed to load content"));
            return;
        }

        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.lifecycle.is_stopped() {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: every iteration schedules the next frame.
        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let ours = self
            .window
            .as_ref()
            .is_some_and(|entry| entry.with_window(|w| w.id()) == window_id);
        if !ours {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.stop(event_loop),

            // Applied right here, before any further redraw is handled.
            WindowEvent::Resized(new_size) => self.handle_resize(new_size),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|e| e.with_window(|w| w.inner_size())) {
                    self.handle_resize(size);
                }
            }

            WindowEvent::RedrawRequested => {
                if self.redraw() == AppControl::Exit {
                    self.stop(event_loop);
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        if !self.lifecycle.is_stopped() || self.window.is_some() {
            self.stop(event_loop);
        }
    }
}
