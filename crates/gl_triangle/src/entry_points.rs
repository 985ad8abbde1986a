//! Resolving the GL functions beyond the baseline set, once, after the real context is current.

#![expect(unsafe_code)]

use std::ffi::{CStr, CString, c_void};

use crate::{Error, Result};

/// Every GL function the program calls, each checked before the first call.
pub const REQUIRED_ENTRY_POINTS: &[&str] = &[
    "glGenVertexArrays",
    "glBindVertexArray",
    "glDeleteVertexArrays",
    "glGenBuffers",
    "glDeleteBuffers",
    "glBindBuffer",
    "glBufferData",
    "glVertexAttribPointer",
    "glEnableVertexAttribArray",
    "glCreateShader",
    "glDeleteShader",
    "glShaderSource",
    "glCompileShader",
    "glGetShaderiv",
    "glGetShaderInfoLog",
    "glAttachShader",
    "glCreateProgram",
    "glDeleteProgram",
    "glLinkProgram",
    "glGetProgramiv",
    "glGetProgramInfoLog",
    "glUseProgram",
    "glClearColor",
    "glClear",
    "glViewport",
    "glDrawArrays",
    "glGetError",
    "glGetString",
];

fn lookup(loader: &mut impl FnMut(&CStr) -> *const c_void, name: &str) -> *const c_void {
    let Ok(name) = CString::new(name) else {
        return std::ptr::null();
    };
    loader(&name)
}

/// Fail with the first required name the loader cannot find.
pub fn check_entry_points(mut loader: impl FnMut(&CStr) -> *const c_void) -> Result {
    for &name in REQUIRED_ENTRY_POINTS {
        if lookup(&mut loader, name).is_null() {
            return Err(Error::MissingEntryPoint(name));
        }
    }
    log::debug!(
        "All {} required GL entry points are present",
        REQUIRED_ENTRY_POINTS.len()
    );
    Ok(())
}

/// Validate the required entry points, then build the immutable function table.
///
/// # Safety
/// The context `loader` resolves against must be current on this thread.
pub unsafe fn load_gl(mut loader: impl FnMut(&CStr) -> *const c_void) -> Result<glow::Context> {
    check_entry_points(&mut loader)?;
    // SAFETY: the caller guarantees a current context.
    let gl = unsafe { glow::Context::from_loader_function(|name| lookup(&mut loader, name)) };
    Ok(gl)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_address(_: &CStr) -> *const c_void {
        std::ptr::dangling::<c_void>()
    }

    #[test]
    fn everything_present_passes() {
        assert!(check_entry_points(fake_address).is_ok());
    }

    #[test]
    fn first_missing_name_is_reported() {
        let result = check_entry_points(|name| {
            if name == c"glGenBuffers" || name == c"glUseProgram" {
                std::ptr::null()
            } else {
                fake_address(name)
            }
        });
        assert!(matches!(
            result,
            Err(Error::MissingEntryPoint("glGenBuffers"))
        ));
    }

    #[test]
    fn each_name_is_queried_once() {
        let mut queried = Vec::new();
        check_entry_points(|name| {
            queried.push(name.to_owned());
            fake_address(name)
        })
        .expect("all present");
        assert_eq!(queried.len(), REQUIRED_ENTRY_POINTS.len());
        queried.sort();
        queried.dedup();
        assert_eq!(queried.len(), REQUIRED_ENTRY_POINTS.len(), "no duplicates");
    }
}
