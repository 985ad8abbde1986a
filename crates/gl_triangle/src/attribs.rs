//! Zero-terminated `(key, value)` attribute lists, as consumed by the extended WGL entry points.

/// Tokens from `WGL_ARB_pixel_format`, `WGL_ARB_create_context` and
/// `WGL_ARB_create_context_profile`.
pub mod wgl {
    pub const DRAW_TO_WINDOW_ARB: i32 = 0x2001;
    pub const ACCELERATION_ARB: i32 = 0x2003;
    pub const SUPPORT_OPENGL_ARB: i32 = 0x2010;
    pub const DOUBLE_BUFFER_ARB: i32 = 0x2011;
    pub const PIXEL_TYPE_ARB: i32 = 0x2013;
    pub const COLOR_BITS_ARB: i32 = 0x2014;
    pub const DEPTH_BITS_ARB: i32 = 0x2022;
    pub const STENCIL_BITS_ARB: i32 = 0x2023;
    pub const FULL_ACCELERATION_ARB: i32 = 0x2027;
    pub const TYPE_RGBA_ARB: i32 = 0x202B;

    pub const CONTEXT_MAJOR_VERSION_ARB: i32 = 0x2091;
    pub const CONTEXT_MINOR_VERSION_ARB: i32 = 0x2092;
    pub const CONTEXT_FLAGS_ARB: i32 = 0x2094;
    pub const CONTEXT_PROFILE_MASK_ARB: i32 = 0x9126;

    pub const CONTEXT_DEBUG_BIT_ARB: i32 = 0x0001;
    pub const CONTEXT_FORWARD_COMPATIBLE_BIT_ARB: i32 = 0x0002;
    pub const CONTEXT_CORE_PROFILE_BIT_ARB: i32 = 0x0001;

    pub const TRUE: i32 = 1;
}

/// A flat list of `(key, value)` pairs that always ends in a single `0`.
///
/// The terminator is maintained on every push, so [`Self::as_slice`] can be handed to the driver as-is.
#[derive(Clone, PartialEq, Eq)]
pub struct AttribList {
    raw: Vec<i32>,
}

impl Default for AttribList {
    fn default() -> Self {
        Self::new()
    }
}

impl AttribList {
    pub fn new() -> Self {
        Self { raw: vec![0] }
    }

    /// Append a pair. A key of `0` would terminate the list early, so it is rejected.
    ///
    /// # Panics
    /// If `key` is zero.
    pub fn push(&mut self, key: i32, value: i32) -> &mut Self {
        assert!(key != 0, "0 is the list terminator, not a valid key");
        let terminator = self.raw.len() - 1;
        self.raw.splice(terminator..terminator, [key, value]);
        self
    }

    #[must_use]
    pub fn with(mut self, key: i32, value: i32) -> Self {
        self.push(key, value);
        self
    }

    /// Value of the last pair with this key.
    pub fn get(&self, key: i32) -> Option<i32> {
        self.pairs().rev().find(|&(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn pairs(&self) -> impl DoubleEndedIterator<Item = (i32, i32)> + '_ {
        self.raw[..self.raw.len() - 1]
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
    }

    pub fn len(&self) -> usize {
        (self.raw.len() - 1) / 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The zero-terminated list.
    pub fn as_slice(&self) -> &[i32] {
        &self.raw
    }

    pub fn as_ptr(&self) -> *const i32 {
        self.raw.as_ptr()
    }
}

impl std::fmt::Debug for AttribList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.pairs().map(|(k, v)| (format!("0x{k:04X}"), v)))
            .finish()
    }
}

impl FromIterator<(i32, i32)> for AttribList {
    fn from_iter<T: IntoIterator<Item = (i32, i32)>>(iter: T) -> Self {
        let mut list = Self::new();
        for (key, value) in iter {
            list.push(key, value);
        }
        list
    }
}
