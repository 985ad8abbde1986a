//! The window and its event loop.

#![expect(unsafe_code)]

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    Result,
    config::{Backend, Config},
    entry_points,
    gpu::{GlowGpu, Gpu},
    renderer::{self, Renderer},
    surface::{NativeSurface, SurfaceContext},
};

/// Build the GL objects and set the initial viewport, and only then call `show_window`.
///
/// On failure the window is never shown.
pub fn prepare<G: Gpu>(
    gl: &G,
    config: &Config,
    [width, height]: [u32; 2],
    show_window: impl FnOnce(),
) -> Result<Renderer<G>> {
    let renderer = Renderer::new(gl, &config.shaders, config.clear_color)?;
    renderer.resize(gl, width, height);
    show_window();
    Ok(renderer)
}

/// Everything that exists between a successful startup and shutdown.
struct Running {
    window: Window,
    gpu: GlowGpu,
    surface: NativeSurface,
    renderer: Renderer<GlowGpu>,
}

impl Running {
    fn start(event_loop: &ActiveEventLoop, config: &Config) -> Result<Self> {
        let (window, surface) = create_surface(event_loop, config)?;

        // SAFETY: `create_surface` left the context current on this thread.
        let gl = match unsafe { entry_points::load_gl(|name| surface.get_proc_address(name)) } {
            Ok(gl) => gl,
            Err(err) => {
                surface.release();
                return Err(err);
            }
        };
        // SAFETY: the context stays current until `shut_down`, which also deletes every
        // object created through this value before releasing it.
        let gpu = unsafe { GlowGpu::new(gl) };

        log::info!("GL version: {:?}", gpu.version_string());
        log::info!("GL renderer: {:?}", gpu.renderer_string());
        log::info!("GLSL version: {:?}", gpu.shading_language_version());

        let size = window.inner_size().into();
        let renderer = match prepare(&gpu, config, size, || window.set_visible(true)) {
            Ok(renderer) => renderer,
            Err(err) => {
                drop(gpu);
                surface.release();
                return Err(err);
            }
        };
        window.request_redraw();

        Ok(Self {
            window,
            gpu,
            surface,
            renderer,
        })
    }

    fn shut_down(self) {
        let Self {
            window,
            gpu,
            surface,
            renderer,
        } = self;
        renderer::shut_down(renderer, &gpu, surface);
        drop(gpu);
        drop(window);
        log::debug!("Window destroyed");
    }
}

fn create_surface(event_loop: &ActiveEventLoop, config: &Config) -> Result<(Window, NativeSurface)> {
    match config.backend {
        #[cfg(windows)]
        Backend::Wgl => {
            let (window, surface) = crate::wgl::create(event_loop, config)?;
            Ok((window, NativeSurface::Wgl(surface)))
        }
        #[cfg(not(windows))]
        Backend::Wgl => Err(crate::Error::UnsupportedBackend("wgl")),
        Backend::Glutin => {
            let (window, surface) = crate::glutin_surface::create(event_loop, config)?;
            Ok((window, NativeSurface::Glutin(surface)))
        }
    }
}

// ----------------------------------------------------------------------------

struct TriangleApp {
    config: Config,
    running: Option<Running>,
    return_result: Result,
}

impl TriangleApp {
    fn new(config: Config) -> Self {
        Self {
            config,
            running: None,
            return_result: Ok(()),
        }
    }

    fn shut_down(&mut self) {
        if let Some(running) = self.running.take() {
            running.shut_down();
        }
    }
}

impl ApplicationHandler for TriangleApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() || self.return_result.is_err() {
            return;
        }

        log::debug!("Starting up with the {:?} backend", self.config.backend);
        match Running::start(event_loop, &self.config) {
            Ok(running) => self.running = Some(running),
            Err(err) => {
                log::error!("Exiting because of error: {err}");
                self.return_result = Err(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::RedrawRequested => {
                if let Some(running) = &self.running {
                    let presented =
                        renderer::present_frame(&running.renderer, &running.gpu, &running.surface);
                    if let Err(err) = presented {
                        log::warn!("{err}");
                    }
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(running) = &self.running {
                    running.surface.resize(size.width, size.height);
                    running.renderer.resize(&running.gpu, size.width, size.height);
                    running.window.request_redraw();
                }
            }
            WindowEvent::CloseRequested => {
                log::debug!("Close requested");
                self.shut_down();
                event_loop.exit();
            }
            WindowEvent::Destroyed => {
                event_loop.exit();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _: &ActiveEventLoop) {
        self.shut_down();
    }
}

/// Open the window, run until it is closed, and release everything on the way out.
pub fn run(config: Config) -> Result {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = TriangleApp::new(config);
    log::trace!("Entering the winit event loop (run_app)…");
    event_loop.run_app(&mut app)?;
    log::debug!("Event loop finished");

    app.return_result
}
