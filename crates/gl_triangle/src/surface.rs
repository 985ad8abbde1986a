use std::ffi::{CStr, c_void};

use crate::Result;

/// A window surface with its current rendering context.
pub trait SurfaceContext {
    /// Present the back buffer.
    fn swap_buffers(&self) -> Result;

    /// The client area changed size. Zero is allowed.
    fn resize(&self, width: u32, height: u32);

    /// Look up a GL entry point. Null if the implementation does not export it.
    fn get_proc_address(&self, name: &CStr) -> *const c_void;

    /// Make no context current and destroy the rendering context.
    fn release(self);
}

/// The surface of whichever backend was used at startup.
pub enum NativeSurface {
    #[cfg(windows)]
    Wgl(crate::wgl::WglSurface),
    Glutin(crate::glutin_surface::GlutinSurface),
}

impl SurfaceContext for NativeSurface {
    fn swap_buffers(&self) -> Result {
        match self {
            #[cfg(windows)]
            Self::Wgl(surface) => surface.swap_buffers(),
            Self::Glutin(surface) => surface.swap_buffers(),
        }
    }

    fn resize(&self, width: u32, height: u32) {
        match self {
            #[cfg(windows)]
            Self::Wgl(surface) => surface.resize(width, height),
            Self::Glutin(surface) => surface.resize(width, height),
        }
    }

    fn get_proc_address(&self, name: &CStr) -> *const c_void {
        match self {
            #[cfg(windows)]
            Self::Wgl(surface) => surface.get_proc_address(name),
            Self::Glutin(surface) => surface.get_proc_address(name),
        }
    }

    fn release(self) {
        match self {
            #[cfg(windows)]
            Self::Wgl(surface) => surface.release(),
            Self::Glutin(surface) => surface.release(),
        }
    }
}
