//! The portable backend: `glutin` negotiates format and context for us.
//!
//! glutin runs the same draft-context handshake internally on every platform, so here we only
//! express our format and context requests in its terms.

#![expect(unsafe_code)]

use std::{
    cell::Cell,
    ffi::{CStr, c_void},
    num::NonZeroU32,
};

use glutin::{
    config::{ColorBufferType, GlConfig as _},
    context::NotCurrentGlContext as _,
    display::{GetGlDisplay as _, GlDisplay as _},
    prelude::PossiblyCurrentGlContext as _,
    surface::GlSurface as _,
};
use raw_window_handle::HasWindowHandle as _;
use winit::{event_loop::ActiveEventLoop, window::Window};

use crate::{
    Error, Result,
    config::Config,
    format::{self, PixelFormat},
    surface::SurfaceContext,
};

pub struct GlutinSurface {
    gl_context: glutin::context::PossiblyCurrentContext,
    gl_surface: glutin::surface::Surface<glutin::surface::WindowSurface>,
}

fn pixel_format(config: &glutin::config::Config) -> PixelFormat {
    let color_bits = match config.color_buffer_type() {
        Some(ColorBufferType::Rgb {
            r_size,
            g_size,
            b_size,
        }) => r_size
            .saturating_add(g_size)
            .saturating_add(b_size)
            .saturating_add(config.alpha_size()),
        _ => 0,
    };
    PixelFormat {
        index: 0,
        color_bits,
        depth_bits: config.depth_size(),
        stencil_bits: config.stencil_size(),
        // We never ask glutin for single buffering.
        double_buffer: true,
        rgba: matches!(
            config.color_buffer_type(),
            Some(ColorBufferType::Rgb { .. })
        ),
        hardware_accelerated: config.hardware_accelerated(),
        draw_to_window: config
            .config_surface_types()
            .contains(glutin::config::ConfigSurfaceTypes::WINDOW),
    }
}

/// Create the window and a current context on it.
pub fn create(event_loop: &ActiveEventLoop, config: &Config) -> Result<(Window, GlutinSurface)> {
    let request = config.format;

    let config_template_builder = glutin::config::ConfigTemplateBuilder::new()
        .prefer_hardware_accelerated(request.hardware_accelerated.then_some(true))
        .with_alpha_size(8)
        .with_depth_size(request.depth_bits)
        .with_stencil_size(request.stencil_bits)
        .with_single_buffering(!request.double_buffer)
        .with_transparency(false);

    log::debug!("Trying to create a glutin Display with config: {config_template_builder:?}");

    let display_builder = glutin_winit::DisplayBuilder::new()
        .with_preference(glutin_winit::ApiPreference::FallbackEgl)
        .with_window_attributes(Some(config.window_attributes()));

    let matched = Cell::new(None);
    let (window, gl_config) = display_builder
        .build(event_loop, config_template_builder, |configs| {
            let configs: Vec<_> = configs.collect();
            let picked = match format::choose_format(configs.iter().map(pixel_format), &request) {
                Ok(chosen) => {
                    let position = configs
                        .iter()
                        .position(|config| pixel_format(config) == chosen)
                        .unwrap_or_default();
                    matched.set(Some(chosen));
                    configs.into_iter().nth(position)
                }
                // Anything, so the display can be torn down; rejected right after.
                Err(_) => configs.into_iter().next(),
            };
            picked.expect("glutin never offers an empty config list")
        })
        .map_err(|err| Error::GlutinDisplay(err.to_string()))?;

    let Some(format) = matched.get() else {
        return Err(Error::NoMatchingFormat(request));
    };
    log::debug!("Final pixel format: {format:?}");

    let gl_display = gl_config.display();
    log::debug!(
        "Created GL display with version: {} and supported features: {:?}",
        gl_display.version_string(),
        gl_display.supported_features()
    );

    let window = match window {
        Some(window) => window,
        None => glutin_winit::finalize_window(event_loop, config.window_attributes(), &gl_config)?,
    };

    let raw_window_handle = window.window_handle()?.as_raw();
    let context_attributes = config.context.glutin_attributes(Some(raw_window_handle));
    log::debug!("Creating the rendering context with {context_attributes:?}");

    // SAFETY: the window handle stays valid for as long as the window, which outlives the context.
    let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
        .map_err(|err| Error::ContextCreation(err.to_string()))?;

    let (width_px, height_px): (u32, u32) = window.inner_size().into();
    let surface_attributes =
        glutin::surface::SurfaceAttributesBuilder::<glutin::surface::WindowSurface>::new().build(
            raw_window_handle,
            NonZeroU32::new(width_px).unwrap_or(NonZeroU32::MIN),
            NonZeroU32::new(height_px).unwrap_or(NonZeroU32::MIN),
        );

    log::trace!("Creating surface with attributes: {surface_attributes:?}");
    // SAFETY: as above.
    let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes)? };

    let gl_context = not_current
        .make_current(&gl_surface)
        .map_err(|err| Error::MakeCurrent(err.to_string()))?;
    log::debug!("Rendering context is current");

    let swap_interval = if config.vsync {
        glutin::surface::SwapInterval::Wait(NonZeroU32::MIN)
    } else {
        glutin::surface::SwapInterval::DontWait
    };
    if let Err(err) = gl_surface.set_swap_interval(&gl_context, swap_interval) {
        log::warn!("Failed to set swap interval due to error: {err}");
    }

    Ok((
        window,
        GlutinSurface {
            gl_context,
            gl_surface,
        },
    ))
}

impl SurfaceContext for GlutinSurface {
    fn swap_buffers(&self) -> Result {
        Ok(self.gl_surface.swap_buffers(&self.gl_context)?)
    }

    fn resize(&self, width: u32, height: u32) {
        // glutin surfaces cannot be zero-sized; the viewport can.
        self.gl_surface.resize(
            &self.gl_context,
            NonZeroU32::new(width).unwrap_or(NonZeroU32::MIN),
            NonZeroU32::new(height).unwrap_or(NonZeroU32::MIN),
        );
    }

    fn get_proc_address(&self, name: &CStr) -> *const c_void {
        self.gl_context.display().get_proc_address(name)
    }

    fn release(self) {
        let Self {
            gl_context,
            gl_surface,
        } = self;
        match gl_context.make_not_current() {
            Ok(not_current) => drop(not_current),
            Err(err) => log::warn!("Failed to make the context not current: {err}"),
        }
        drop(gl_surface);
        log::debug!("Rendering context released");
    }
}
