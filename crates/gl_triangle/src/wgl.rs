//! The explicit WGL handshake on top of winit windows.
//!
//! A pixel format can be set only once per window, so the draft format and the throwaway
//! context live on a second, hidden window that is dropped as soon as the real context exists.

#![expect(unsafe_code)]

use std::{
    ffi::{CStr, c_void},
    marker::PhantomData,
};

use raw_window_handle::{HasWindowHandle as _, RawWindowHandle};
use windows_sys::Win32::{
    Foundation::{FreeLibrary, HMODULE, HWND},
    Graphics::{
        Gdi::{GetDC, HDC, ReleaseDC},
        OpenGL::{
            ChoosePixelFormat, DescribePixelFormat, HGLRC, PFD_DOUBLEBUFFER, PFD_DRAW_TO_WINDOW,
            PFD_GENERIC_ACCELERATED, PFD_GENERIC_FORMAT, PFD_MAIN_PLANE, PFD_SUPPORT_OPENGL,
            PFD_TYPE_RGBA, PIXELFORMATDESCRIPTOR, SetPixelFormat, SwapBuffers, wglCreateContext,
            wglDeleteContext, wglGetProcAddress, wglMakeCurrent,
        },
    },
    System::LibraryLoader::{GetProcAddress, LoadLibraryA},
};
use winit::{event_loop::ActiveEventLoop, window::Window};

use crate::{
    Error, Result,
    attribs::AttribList,
    bootstrap::{self, Driver},
    config::Config,
    format::{FormatRequest, PixelFormat},
    surface::SurfaceContext,
};

type RawProc = unsafe extern "system" fn() -> isize;

type ChoosePixelFormatArb = unsafe extern "system" fn(
    hdc: HDC,
    int_attribs: *const i32,
    float_attribs: *const f32,
    max_formats: u32,
    formats: *mut i32,
    num_formats: *mut u32,
) -> i32;

type CreateContextAttribsArb =
    unsafe extern "system" fn(hdc: HDC, share: HGLRC, attribs: *const i32) -> HGLRC;

type SwapIntervalExt = unsafe extern "system" fn(interval: i32) -> i32;

fn last_error() -> String {
    std::io::Error::last_os_error().to_string()
}

/// Some drivers return 1, 2, 3 or -1 instead of null for a missing function.
fn is_valid_proc_address(address: usize) -> bool {
    !matches!(address, 0..=3) && address != usize::MAX
}

/// `wglGetProcAddress`, with its documented failure values mapped to `None`.
/// Drop one reference to a module from `LoadLibraryA`. Null is ignored.
fn release_module(module: HMODULE) {
    if !module.is_null() && unsafe { FreeLibrary(module) } == 0 {
        log::warn!("FreeLibrary failed: {}", last_error());
    }
}

fn wgl_proc(name: &CStr) -> Option<RawProc> {
    let proc = unsafe { wglGetProcAddress(name.as_ptr().cast()) }?;
    is_valid_proc_address((proc as *const c_void).addr()).then_some(proc)
}

// ----------------------------------------------------------------------------

/// A window and its device context.
struct WglTarget {
    hwnd: HWND,
    hdc: HDC,
}

impl WglTarget {
    fn new(window: &Window) -> Result<Self> {
        let RawWindowHandle::Win32(handle) = window.window_handle()?.as_raw() else {
            return Err(Error::UnsupportedBackend("wgl"));
        };
        let hwnd = handle.hwnd.get() as HWND;
        let hdc = unsafe { GetDC(hwnd) };
        if hdc.is_null() {
            return Err(Error::DraftFormat(format!("GetDC failed: {}", last_error())));
        }
        Ok(Self { hwnd, hdc })
    }

    fn describe(&self, index: i32) -> Result<PIXELFORMATDESCRIPTOR> {
        let mut descriptor: PIXELFORMATDESCRIPTOR = unsafe { std::mem::zeroed() };
        let max = unsafe {
            DescribePixelFormat(
                self.hdc,
                index,
                size_of::<PIXELFORMATDESCRIPTOR>() as u32,
                &mut descriptor,
            )
        };
        if max == 0 {
            return Err(Error::ApplyFormat {
                index,
                reason: format!("DescribePixelFormat failed: {}", last_error()),
            });
        }
        Ok(descriptor)
    }
}

impl Drop for WglTarget {
    fn drop(&mut self) {
        unsafe { ReleaseDC(self.hwnd, self.hdc) };
    }
}

fn draft_descriptor(request: &FormatRequest) -> PIXELFORMATDESCRIPTOR {
    let mut descriptor: PIXELFORMATDESCRIPTOR = unsafe { std::mem::zeroed() };
    descriptor.nSize = size_of::<PIXELFORMATDESCRIPTOR>() as u16;
    descriptor.nVersion = 1;
    descriptor.dwFlags = PFD_DRAW_TO_WINDOW | PFD_SUPPORT_OPENGL;
    if request.double_buffer {
        descriptor.dwFlags |= PFD_DOUBLEBUFFER;
    }
    descriptor.iPixelType = PFD_TYPE_RGBA;
    descriptor.cColorBits = request.color_bits;
    descriptor.cDepthBits = request.depth_bits;
    descriptor.cStencilBits = request.stencil_bits;
    descriptor.iLayerType = PFD_MAIN_PLANE as _;
    descriptor
}

fn pixel_format(index: i32, descriptor: &PIXELFORMATDESCRIPTOR) -> PixelFormat {
    let flags = descriptor.dwFlags;
    let generic = flags & PFD_GENERIC_FORMAT != 0;
    let generic_accelerated = flags & PFD_GENERIC_ACCELERATED != 0;
    PixelFormat {
        index,
        // `cColorBits` leaves the alpha planes out.
        color_bits: descriptor.cColorBits.saturating_add(descriptor.cAlphaBits),
        depth_bits: descriptor.cDepthBits,
        stencil_bits: descriptor.cStencilBits,
        double_buffer: flags & PFD_DOUBLEBUFFER != 0,
        rgba: descriptor.iPixelType == PFD_TYPE_RGBA,
        hardware_accelerated: !generic || generic_accelerated,
        draw_to_window: flags & PFD_DRAW_TO_WINDOW != 0,
    }
}

// ----------------------------------------------------------------------------

pub struct WglExtensions {
    choose_pixel_format: ChoosePixelFormatArb,
    create_context_attribs: CreateContextAttribsArb,
}

/// [`Driver`] over raw WGL. Borrows both windows for the duration of the handshake.
pub struct WglDriver<'w> {
    draft: WglTarget,
    target: WglTarget,
    draft_context: Option<HGLRC>,
    _windows: PhantomData<&'w Window>,
}

impl<'w> WglDriver<'w> {
    pub fn new(draft_window: &'w Window, window: &'w Window) -> Result<Self> {
        Ok(Self {
            draft: WglTarget::new(draft_window)?,
            target: WglTarget::new(window)?,
            draft_context: None,
            _windows: PhantomData,
        })
    }

    fn into_surface(self, context: HGLRC) -> WglSurface {
        let Self { draft, target, .. } = self;
        drop(draft);
        WglSurface {
            target,
            context,
            opengl32: unsafe { LoadLibraryA(c"opengl32.dll".as_ptr().cast()) },
        }
    }
}

impl Driver for WglDriver<'_> {
    type Context = HGLRC;
    type Extensions = WglExtensions;

    fn apply_draft_format(&mut self, request: &FormatRequest) -> Result<PixelFormat> {
        let descriptor = draft_descriptor(request);
        let index = unsafe { ChoosePixelFormat(self.draft.hdc, &descriptor) };
        if index == 0 {
            return Err(Error::DraftFormat(format!(
                "ChoosePixelFormat failed: {}",
                last_error()
            )));
        }
        if unsafe { SetPixelFormat(self.draft.hdc, index, &descriptor) } == 0 {
            return Err(Error::DraftFormat(format!(
                "SetPixelFormat({index}) failed: {}",
                last_error()
            )));
        }
        Ok(pixel_format(index, &self.draft.describe(index)?))
    }

    fn create_legacy_context(&mut self) -> Result<HGLRC> {
        let context = unsafe { wglCreateContext(self.draft.hdc) };
        if context.is_null() {
            return Err(Error::DraftContext(last_error()));
        }
        self.draft_context = Some(context);
        Ok(context)
    }

    fn make_current(&mut self, context: Option<&HGLRC>) -> Result {
        let ok = match context {
            Some(&context) => {
                let hdc = if self.draft_context == Some(context) {
                    self.draft.hdc
                } else {
                    self.target.hdc
                };
                unsafe { wglMakeCurrent(hdc, context) }
            }
            None => unsafe { wglMakeCurrent(std::ptr::null_mut(), std::ptr::null_mut()) },
        };
        if ok == 0 {
            Err(Error::MakeCurrent(last_error()))
        } else {
            Ok(())
        }
    }

    fn resolve_extensions(&mut self) -> Result<WglExtensions> {
        let choose = wgl_proc(c"wglChoosePixelFormatARB")
            .ok_or(Error::MissingExtension("wglChoosePixelFormatARB"))?;
        let create = wgl_proc(c"wglCreateContextAttribsARB")
            .ok_or(Error::MissingExtension("wglCreateContextAttribsARB"))?;
        log::debug!("Resolved wglChoosePixelFormatARB and wglCreateContextAttribsARB");

        Ok(WglExtensions {
            choose_pixel_format: unsafe {
                std::mem::transmute::<RawProc, ChoosePixelFormatArb>(choose)
            },
            create_context_attribs: unsafe {
                std::mem::transmute::<RawProc, CreateContextAttribsArb>(create)
            },
        })
    }

    fn delete_context(&mut self, context: HGLRC) {
        if self.draft_context == Some(context) {
            self.draft_context = None;
        }
        if unsafe { wglDeleteContext(context) } == 0 {
            log::warn!("wglDeleteContext failed: {}", last_error());
        }
    }

    fn choose_formats(
        &mut self,
        extensions: &WglExtensions,
        attribs: &AttribList,
    ) -> Result<Vec<i32>> {
        let mut formats = [0_i32; 8];
        let mut count = 0_u32;
        let ok = unsafe {
            (extensions.choose_pixel_format)(
                self.target.hdc,
                attribs.as_ptr(),
                std::ptr::null(),
                formats.len() as u32,
                formats.as_mut_ptr(),
                &mut count,
            )
        };
        if ok == 0 {
            log::debug!("wglChoosePixelFormatARB failed: {}", last_error());
            return Ok(Vec::new());
        }
        let count = (count as usize).min(formats.len());
        Ok(formats[..count].to_vec())
    }

    fn describe_format(&mut self, index: i32) -> Result<PixelFormat> {
        Ok(pixel_format(index, &self.target.describe(index)?))
    }

    fn apply_format(&mut self, index: i32) -> Result<PixelFormat> {
        let descriptor = self.target.describe(index)?;
        if unsafe { SetPixelFormat(self.target.hdc, index, &descriptor) } == 0 {
            return Err(Error::ApplyFormat {
                index,
                reason: format!("SetPixelFormat failed: {}", last_error()),
            });
        }
        Ok(pixel_format(index, &descriptor))
    }

    fn create_context(&mut self, extensions: &WglExtensions, attribs: &AttribList) -> Result<HGLRC> {
        let context = unsafe {
            (extensions.create_context_attribs)(
                self.target.hdc,
                std::ptr::null_mut(),
                attribs.as_ptr(),
            )
        };
        if context.is_null() {
            return Err(Error::ContextCreation(last_error()));
        }
        Ok(context)
    }
}

// ----------------------------------------------------------------------------

/// The window's device context plus the real, current rendering context.
pub struct WglSurface {
    target: WglTarget,
    context: HGLRC,
    opengl32: HMODULE,
}

impl WglSurface {
    fn set_swap_interval(&self, interval: i32) {
        let Some(proc) = wgl_proc(c"wglSwapIntervalEXT") else {
            log::debug!("wglSwapIntervalEXT is not available; leaving the swap interval alone");
            return;
        };
        let swap_interval = unsafe { std::mem::transmute::<RawProc, SwapIntervalExt>(proc) };
        if unsafe { swap_interval(interval) } == 0 {
            log::warn!("wglSwapIntervalEXT({interval}) failed: {}", last_error());
        }
    }
}

impl SurfaceContext for WglSurface {
    fn swap_buffers(&self) -> Result {
        if unsafe { SwapBuffers(self.target.hdc) } == 0 {
            return Err(Error::SwapBuffers(last_error()));
        }
        Ok(())
    }

    fn resize(&self, width: u32, height: u32) {
        // The default framebuffer follows the window.
        log::trace!("WGL surface resized to {width}x{height}");
    }

    fn get_proc_address(&self, name: &CStr) -> *const c_void {
        if let Some(proc) = wgl_proc(name) {
            return proc as *const c_void;
        }
        // GL 1.1 functions are only exported by opengl32.dll itself.
        if self.opengl32.is_null() {
            return std::ptr::null();
        }
        unsafe { GetProcAddress(self.opengl32, name.as_ptr().cast()) }
            .map_or(std::ptr::null(), |proc| proc as *const c_void)
    }

    fn release(self) {
        unsafe {
            wglMakeCurrent(std::ptr::null_mut(), std::ptr::null_mut());
            if wglDeleteContext(self.context) == 0 {
                log::warn!("wglDeleteContext failed: {}", last_error());
            }
        }
        log::debug!("Rendering context released");
        drop(self.target);
        release_module(self.opengl32);
    }
}

// ----------------------------------------------------------------------------

/// Create the window and bring up its context through the two-phase handshake.
pub fn create(event_loop: &ActiveEventLoop, config: &Config) -> Result<(Window, WglSurface)> {
    let window = event_loop.create_window(config.window_attributes())?;
    let draft_window = event_loop.create_window(
        Window::default_attributes()
            .with_title(format!("{} (draft)", config.title))
            .with_visible(false),
    )?;

    let driver = WglDriver::new(&draft_window, &window)?;
    let (driver, context, format) =
        bootstrap::create_context(driver, &config.format, &config.context)?;
    log::debug!("WGL context ready on pixel format {}", format.index);

    let surface = driver.into_surface(context);
    drop(draft_window);

    surface.set_swap_interval(i32::from(config.vsync));
    Ok((window, surface))
}
