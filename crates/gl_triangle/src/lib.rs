//! A minimal native OpenGL program: one window, one modern core-profile context, one red
//! triangle.
//!
//! Startup is a chain of fallible steps, each reported as an [`Error`]:
//!
//! * create a window ([`app`]),
//! * negotiate a pixel format and a versioned context ([`bootstrap`], or glutin elsewhere),
//! * resolve the GL entry points ([`entry_points`]),
//! * upload the triangle and build the shader program ([`renderer`]).
//!
//! After that the window repaints on demand until it is closed, and every GL object is
//! released before the context is.

#![expect(clippy::undocumented_unsafe_blocks)]

pub mod app;
pub mod attribs;
pub mod bootstrap;
pub mod config;
pub mod context;
pub mod dialog;
pub mod entry_points;
mod error;
pub mod format;
pub mod glutin_surface;
pub mod gpu;
pub mod mesh;
pub mod renderer;
pub mod shader;
pub mod surface;

#[cfg(windows)]
pub mod wgl;

#[cfg(test)]
mod test_util;

pub use {
    app::run,
    attribs::AttribList,
    config::{Backend, Config},
    context::ContextRequest,
    error::{Error, Result},
    format::{FormatRequest, PixelFormat, choose_format},
    shader::{ShaderSources, ShaderStage},
};
