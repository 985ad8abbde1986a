use crate::{
    context::ContextRequest, format::FormatRequest, renderer::CLEAR_COLOR, shader::ShaderSources,
};

/// How the context is brought up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// The explicit two-phase WGL handshake. Windows only.
    Wgl,

    /// Let glutin negotiate. Works everywhere.
    Glutin,
}

impl Default for Backend {
    fn default() -> Self {
        if cfg!(windows) { Self::Wgl } else { Self::Glutin }
    }
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wgl" => Ok(Self::Wgl),
            "glutin" => Ok(Self::Glutin),
            other => Err(format!("unknown backend {other:?}, expected `wgl` or `glutin`")),
        }
    }
}

/// Everything that can be tuned before startup.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub title: String,

    /// Initial client-area size in physical pixels.
    pub inner_size: [u32; 2],

    pub clear_color: [f32; 4],
    pub format: FormatRequest,
    pub context: ContextRequest,
    pub backend: Backend,
    pub vsync: bool,

    /// Show startup errors in a modal dialog, not just in the log.
    pub error_dialog: bool,

    pub shaders: ShaderSources,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "WinOpenGL".to_owned(),
            inner_size: [1024, 768],
            clear_color: CLEAR_COLOR,
            format: FormatRequest::default(),
            context: ContextRequest::default(),
            backend: Backend::default(),
            vsync: true,
            error_dialog: true,
            shaders: ShaderSources::default(),
        }
    }
}

pub const ENV_BACKEND: &str = "GL_TRIANGLE_BACKEND";
pub const ENV_VSYNC: &str = "GL_TRIANGLE_VSYNC";
pub const ENV_NO_DIALOG: &str = "GL_TRIANGLE_NO_DIALOG";
pub const ENV_GL_DEBUG: &str = "GL_TRIANGLE_GL_DEBUG";

impl Config {
    /// Defaults, overridden by `GL_TRIANGLE_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Values that don't parse are logged and ignored.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup(ENV_BACKEND) {
            match value.parse() {
                Ok(backend) => self.backend = backend,
                Err(err) => log::warn!("Ignoring {ENV_BACKEND}: {err}"),
            }
        }
        if let Some(value) = lookup(ENV_VSYNC) {
            match parse_flag(&value) {
                Some(vsync) => self.vsync = vsync,
                None => log::warn!("Ignoring {ENV_VSYNC}={value:?}: expected 0 or 1"),
            }
        }
        if let Some(value) = lookup(ENV_NO_DIALOG) {
            match parse_flag(&value) {
                Some(no_dialog) => self.error_dialog = !no_dialog,
                None => log::warn!("Ignoring {ENV_NO_DIALOG}={value:?}: expected 0 or 1"),
            }
        }
        if let Some(value) = lookup(ENV_GL_DEBUG) {
            match parse_flag(&value) {
                Some(debug) => self.context.debug = debug,
                None => log::warn!("Ignoring {ENV_GL_DEBUG}={value:?}: expected 0 or 1"),
            }
        }
        self
    }

    /// Top-level, resizable, hidden until the first successful startup.
    pub fn window_attributes(&self) -> winit::window::WindowAttributes {
        let [width, height] = self.inner_size;
        winit::window::Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(width, height))
            .with_resizable(true)
            .with_visible(false)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_owned())
        }
    }

    #[test]
    fn defaults_match_the_window_contract() {
        let config = Config::default();
        assert_eq!(config.title, "WinOpenGL");
        assert_eq!(config.inner_size, [1024, 768]);
        assert_eq!(config.context.major, 3);
        assert_eq!(config.context.minor, 3);
        assert!(config.context.core_profile);
        assert!(config.error_dialog);
    }

    #[test]
    fn overrides_apply() {
        let config = Config::default().with_overrides(env(&[
            (ENV_BACKEND, "Glutin"),
            (ENV_VSYNC, "0"),
            (ENV_NO_DIALOG, "1"),
            (ENV_GL_DEBUG, "yes"),
        ]));
        assert_eq!(config.backend, Backend::Glutin);
        assert!(!config.vsync);
        assert!(!config.error_dialog);
        assert!(config.context.debug);
    }

    #[test]
    fn bad_values_are_ignored() {
        let config =
            Config::default().with_overrides(env(&[(ENV_BACKEND, "vulkan"), (ENV_VSYNC, "maybe")]));
        assert_eq!(config.backend, Backend::default());
        assert!(config.vsync);
    }

    #[test]
    fn no_dialog_flag_is_parsed() {
        let keep = Config::default().with_overrides(env(&[(ENV_NO_DIALOG, "0")]));
        assert!(keep.error_dialog);

        let unparsable = Config::default().with_overrides(env(&[(ENV_NO_DIALOG, "")]));
        assert!(unparsable.error_dialog);

        let off = Config::default().with_overrides(env(&[(ENV_NO_DIALOG, "true")]));
        assert!(!off.error_dialog);
    }
}
