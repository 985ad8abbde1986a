use crate::attribs::{AttribList, wgl};

/// The versioned context we ask the driver for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextRequest {
    pub major: u8,
    pub minor: u8,

    /// Core profile: no legacy fixed-function features.
    pub core_profile: bool,

    pub forward_compatible: bool,

    /// Ask for a debug context. Off by default.
    pub debug: bool,
}

impl Default for ContextRequest {
    fn default() -> Self {
        Self {
            major: 3,
            minor: 3,
            core_profile: true,
            forward_compatible: false,
            debug: false,
        }
    }
}

impl ContextRequest {
    /// The list handed to the extended context-creation entry point.
    pub fn to_attrib_list(&self) -> AttribList {
        let mut list = AttribList::new();
        list.push(wgl::CONTEXT_MAJOR_VERSION_ARB, i32::from(self.major))
            .push(wgl::CONTEXT_MINOR_VERSION_ARB, i32::from(self.minor));
        if self.core_profile {
            list.push(
                wgl::CONTEXT_PROFILE_MASK_ARB,
                wgl::CONTEXT_CORE_PROFILE_BIT_ARB,
            );
        }

        let mut flags = 0;
        if self.forward_compatible {
            flags |= wgl::CONTEXT_FORWARD_COMPATIBLE_BIT_ARB;
        }
        if self.debug {
            flags |= wgl::CONTEXT_DEBUG_BIT_ARB;
        }
        if flags != 0 {
            list.push(wgl::CONTEXT_FLAGS_ARB, flags);
        }
        list
    }

    pub fn glutin_attributes(
        &self,
        raw_window_handle: Option<raw_window_handle::RawWindowHandle>,
    ) -> glutin::context::ContextAttributes {
        use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, Version};

        let profile = if self.core_profile {
            GlProfile::Core
        } else {
            GlProfile::Compatibility
        };
        ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(self.major, self.minor))))
            .with_profile(profile)
            .with_debug(self.debug)
            .build(raw_window_handle)
    }
}
