use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::translate_window_event;
use crate::input::{InputEvent, InputTracker};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "spikeview".to_string(),
            initial_size: LogicalSize::new(1024.0, 768.0),
        }
    }
}

/// Requests a host can make during a frame; applied once the frame returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    redraw: bool,
    exit: bool,
}

impl RuntimeCtx {
    /// Draws another frame even if no input arrives.
    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    pub fn exit(&mut self) {
        self.exit = true;
    }
}

/// Runs one plot window.
pub struct Runtime;

impl Runtime {
    /// Opens the window and drives `app` until it exits or the window closes.
    ///
    /// Window or GPU setup failures end the loop and are returned here.
    pub fn run<A: App + 'static>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create the event loop")?;
        // Frames are driven by input and explicit redraw requests.
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut host = Host {
            config,
            gpu_init,
            app,
            window: None,
            failure: None,
        };
        event_loop
            .run_app(&mut host)
            .context("event loop terminated with an error")?;

        host.failure.map_or(Ok(()), Err)
    }
}

#[self_referencing]
struct PlotWindow {
    tracker: InputTracker,
    /// Input since the last redraw.
    events: Vec<InputEvent>,
    window: Window,
    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

impl PlotWindow {
    fn open(event_loop: &ActiveEventLoop, config: &RuntimeConfig, gpu_init: GpuInit) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size);
        let window = event_loop
            .create_window(attrs)
            .context("failed to create the window")?;

        PlotWindowTryBuilder {
            tracker: InputTracker::default(),
            events: Vec::new(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
    }

    fn request_redraw(&self) {
        self.with_window(|w| w.request_redraw());
    }
}

struct Host<A: App> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,
    window: Option<PlotWindow>,
    failure: Option<anyhow::Error>,
}

impl<A: App> Host<A> {
    /// Runs one frame. Returns whether the loop should stop.
    fn frame(&mut self) -> bool {
        let Some(window) = &mut self.window else {
            return false;
        };

        let app = &mut self.app;
        let mut runtime = RuntimeCtx::default();
        let control = window.with_mut(|fields| {
            let control = app.on_frame(&mut FrameCtx {
                window: WindowCtx { window: fields.window },
                gpu: fields.gpu,
                events: fields.events,
                runtime: &mut runtime,
            });
            fields.events.clear();
            control
        });

        if runtime.redraw {
            window.request_redraw();
        }
        runtime.exit || control == AppControl::Exit
    }
}

impl<A: App> ApplicationHandler for Host<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        match PlotWindow::open(event_loop, &self.config, self.gpu_init.clone()) {
            Ok(window) => {
                log::info!("window \"{}\" open", self.config.title);
                window.request_redraw();
                self.window = Some(window);
            }
            Err(err) => {
                let err = err.context("failed to open the plot window");
                log::error!("{err:#}");
                self.failure = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(window) = &mut self.window else {
            return;
        };

        let had_input = window.with_mut(|fields| {
            let scale = fields.window.scale_factor();
            match translate_window_event(fields.tracker, scale, &event) {
                Some(input) => {
                    fields.events.push(input);
                    true
                }
                None => false,
            }
        });

        match event {
            WindowEvent::CloseRequested => {
                self.window = None;
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                window.with_gpu_mut(|gpu| gpu.resize(size));
                window.request_redraw();
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = window.with_window(|w| w.inner_size());
                window.with_gpu_mut(|gpu| gpu.resize(size));
                window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if self.frame() {
                    event_loop.exit();
                }
            }
            _ if had_input => window.request_redraw(),
            _ => {}
        }
    }
}
