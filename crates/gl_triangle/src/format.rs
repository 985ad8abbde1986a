//! Pixel format requests and the rule for picking one.

use crate::{
    Error, Result,
    attribs::{AttribList, wgl},
};

/// The minimum a surface format must offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatRequest {
    /// Total color bits, alpha included.
    pub color_bits: u8,
    pub depth_bits: u8,
    pub stencil_bits: u8,
    pub double_buffer: bool,

    /// Reject software (generic) implementations.
    pub hardware_accelerated: bool,
}

impl Default for FormatRequest {
    fn default() -> Self {
        Self {
            color_bits: 32,
            depth_bits: 24,
            stencil_bits: 8,
            double_buffer: true,
            hardware_accelerated: true,
        }
    }
}

impl FormatRequest {
    /// The list handed to the extended format-selection entry point.
    pub fn to_attrib_list(&self) -> AttribList {
        let mut list = AttribList::new();
        list.push(wgl::DRAW_TO_WINDOW_ARB, wgl::TRUE)
            .push(wgl::SUPPORT_OPENGL_ARB, wgl::TRUE)
            .push(wgl::DOUBLE_BUFFER_ARB, i32::from(self.double_buffer))
            .push(wgl::PIXEL_TYPE_ARB, wgl::TYPE_RGBA_ARB)
            .push(wgl::COLOR_BITS_ARB, i32::from(self.color_bits))
            .push(wgl::DEPTH_BITS_ARB, i32::from(self.depth_bits))
            .push(wgl::STENCIL_BITS_ARB, i32::from(self.stencil_bits));
        if self.hardware_accelerated {
            list.push(wgl::ACCELERATION_ARB, wgl::FULL_ACCELERATION_ARB);
        }
        list
    }
}

/// What a driver reports about one of its formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelFormat {
    /// Driver-specific index (1-based on WGL, `0` when the backend has none).
    pub index: i32,
    pub color_bits: u8,
    pub depth_bits: u8,
    pub stencil_bits: u8,
    pub double_buffer: bool,
    pub rgba: bool,
    pub hardware_accelerated: bool,
    pub draw_to_window: bool,
}

impl PixelFormat {
    pub fn satisfies(&self, request: &FormatRequest) -> bool {
        self.draw_to_window
            && self.rgba
            && self.color_bits >= request.color_bits
            && self.depth_bits >= request.depth_bits
            && self.stencil_bits >= request.stencil_bits
            && (self.double_buffer || !request.double_buffer)
            && (self.hardware_accelerated || !request.hardware_accelerated)
    }
}

/// Pick the first candidate that satisfies `request`, in driver order.
pub fn choose_format(
    candidates: impl IntoIterator<Item = PixelFormat>,
    request: &FormatRequest,
) -> Result<PixelFormat> {
    let mut considered = 0;
    for candidate in candidates {
        considered += 1;
        if candidate.satisfies(request) {
            log::debug!("Chose pixel format {candidate:?} after {considered} candidate(s)");
            return Ok(candidate);
        }
        log::trace!("Rejected pixel format {candidate:?}");
    }
    log::debug!("None of {considered} pixel format(s) satisfy {request:?}");
    Err(Error::NoMatchingFormat(*request))
}
