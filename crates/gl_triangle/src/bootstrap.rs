//! Two-phase context creation.
//!
//! The extended format-selection and context-creation entry points can only be looked up
//! while *some* context is current. So we first create a legacy context on a draft format,
//! use it to resolve those entry points, throw it away, and only then pick the real format
//! and create the real, versioned, core-profile context.
//!
//! Each phase is its own state type. The throwaway context lives inside
//! [`DraftContextActive`] and is consumed by [`Bootstrap::resolve_capabilities`], so it cannot
//! leak into the rest of the program.

use crate::{
    Result,
    attribs::AttribList,
    context::ContextRequest,
    format::{FormatRequest, PixelFormat, choose_format},
};

/// The platform calls the bootstrap is made of.
///
/// Every method is expected to check its own result and report failure as an [`crate::Error`].
pub trait Driver {
    type Context;

    /// Extended entry points resolved through the throwaway context.
    type Extensions;

    /// Choose and apply a baseline format to the draft surface. Returns what was applied.
    fn apply_draft_format(&mut self, request: &FormatRequest) -> Result<PixelFormat>;

    /// A context with no version or profile request, on the draft surface.
    fn create_legacy_context(&mut self) -> Result<Self::Context>;

    /// Make `context` current, or make no context current if `None`.
    fn make_current(&mut self, context: Option<&Self::Context>) -> Result;

    fn resolve_extensions(&mut self) -> Result<Self::Extensions>;

    fn delete_context(&mut self, context: Self::Context);

    /// Ask the extended selection entry point for formats matching `attribs`, best first.
    fn choose_formats(
        &mut self,
        extensions: &Self::Extensions,
        attribs: &AttribList,
    ) -> Result<Vec<i32>>;

    /// What format `index` offers on the window surface, without applying it.
    fn describe_format(&mut self, index: i32) -> Result<PixelFormat>;

    /// Describe format `index` and apply it to the window surface.
    fn apply_format(&mut self, index: i32) -> Result<PixelFormat>;

    fn create_context(
        &mut self,
        extensions: &Self::Extensions,
        attribs: &AttribList,
    ) -> Result<Self::Context>;
}

// ----------------------------------------------------------------------------
// States:

/// Nothing created yet.
#[derive(Debug)]
pub struct Uninitialized;

/// The throwaway legacy context exists and is current.
pub struct DraftContextActive<C> {
    context: C,
}

/// The throwaway context is gone; its extended entry points remain.
pub struct CapabilitiesResolved<E> {
    extensions: E,
}

/// The real context exists and is current.
pub struct RealContextActive<C> {
    context: C,
    format: PixelFormat,
}

pub struct Bootstrap<D, S> {
    driver: D,
    state: S,
}

impl<D: Driver> Bootstrap<D, Uninitialized> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            state: Uninitialized,
        }
    }

    /// Phase A: draft format and a current legacy context.
    pub fn create_draft_context(
        mut self,
        request: &FormatRequest,
    ) -> Result<Bootstrap<D, DraftContextActive<D::Context>>> {
        let draft = self.driver.apply_draft_format(request)?;
        log::debug!("Draft pixel format: {draft:?}");

        let context = self.driver.create_legacy_context()?;
        if let Err(err) = self.driver.make_current(Some(&context)) {
            self.driver.delete_context(context);
            return Err(err);
        }
        log::debug!("Throwaway legacy context is current");

        Ok(Bootstrap {
            driver: self.driver,
            state: DraftContextActive { context },
        })
    }
}

impl<D: Driver> Bootstrap<D, DraftContextActive<D::Context>> {
    /// Resolve the extended entry points, then destroy the throwaway context.
    ///
    /// The throwaway context is destroyed whether or not resolution succeeds.
    pub fn resolve_capabilities(
        mut self,
    ) -> Result<Bootstrap<D, CapabilitiesResolved<D::Extensions>>> {
        let extensions = self.driver.resolve_extensions();

        let DraftContextActive { context } = self.state;
        let released = self.driver.make_current(None);
        self.driver.delete_context(context);
        log::debug!("Throwaway legacy context destroyed");

        let extensions = extensions?;
        released?;

        Ok(Bootstrap {
            driver: self.driver,
            state: CapabilitiesResolved { extensions },
        })
    }
}

impl<D: Driver> Bootstrap<D, CapabilitiesResolved<D::Extensions>> {
    /// Phase B: final format through the extended selection, then the versioned context.
    pub fn create_real_context(
        mut self,
        format: &FormatRequest,
        context: &ContextRequest,
    ) -> Result<Bootstrap<D, RealContextActive<D::Context>>> {
        let extensions = &self.state.extensions;

        let format_attribs = format.to_attrib_list();
        log::debug!("Choosing the final pixel format with {format_attribs:?}");
        let matches = self.driver.choose_formats(extensions, &format_attribs)?;
        let described = matches
            .iter()
            .map(|&index| self.driver.describe_format(index))
            .collect::<Result<Vec<_>>>()?;

        // The driver's matching is only a hint; the request is checked here as on every backend.
        let chosen = choose_format(described, format)?;
        let applied = self.driver.apply_format(chosen.index)?;
        log::debug!("Final pixel format: {applied:?}");

        let context_attribs = context.to_attrib_list();
        log::debug!("Creating the rendering context with {context_attribs:?}");
        let real = self.driver.create_context(extensions, &context_attribs)?;
        if let Err(err) = self.driver.make_current(Some(&real)) {
            self.driver.delete_context(real);
            return Err(err);
        }
        log::debug!("Rendering context is current");

        Ok(Bootstrap {
            driver: self.driver,
            state: RealContextActive {
                context: real,
                format: applied,
            },
        })
    }
}

impl<D: Driver> Bootstrap<D, RealContextActive<D::Context>> {
    pub fn format(&self) -> &PixelFormat {
        &self.state.format
    }

    pub fn into_parts(self) -> (D, D::Context, PixelFormat) {
        let RealContextActive { context, format } = self.state;
        (self.driver, context, format)
    }
}

/// Run the whole handshake.
pub fn create_context<D: Driver>(
    driver: D,
    format: &FormatRequest,
    context: &ContextRequest,
) -> Result<(D, D::Context, PixelFormat)> {
    let real = Bootstrap::new(driver)
        .create_draft_context(format)?
        .resolve_capabilities()?
        .create_real_context(format, context)?;
    Ok(real.into_parts())
}
