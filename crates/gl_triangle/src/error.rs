use crate::{format::FormatRequest, shader::ShaderStage};

/// Everything that can go wrong while bringing up the window and the GL pipeline.
///
/// All of these are fatal during startup. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create the event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create the window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("the window has no usable native handle: {0}")]
    WindowHandle(#[from] raw_window_handle::HandleError),

    #[error("the {0} backend is not available on this platform")]
    UnsupportedBackend(&'static str),

    #[error("no draft pixel format could be applied to the throwaway surface: {0}")]
    DraftFormat(String),

    #[error("failed to create the throwaway legacy context: {0}")]
    DraftContext(String),

    #[error("the driver does not expose the extended entry point `{0}`")]
    MissingExtension(&'static str),

    #[error("no pixel format satisfies {0:?}")]
    NoMatchingFormat(FormatRequest),

    #[error("failed to apply pixel format {index}: {reason}")]
    ApplyFormat { index: i32, reason: String },

    #[error("failed to create the rendering context: {0}")]
    ContextCreation(String),

    #[error("failed to make the context current: {0}")]
    MakeCurrent(String),

    #[error("failed to present the frame: {0}")]
    SwapBuffers(String),

    #[error("glutin: {0}")]
    Glutin(#[from] glutin::error::Error),

    #[error("glutin could not build a display: {0}")]
    GlutinDisplay(String),

    #[error("the GL implementation does not export `{0}`")]
    MissingEntryPoint(&'static str),

    #[error("failed to allocate {what}: {reason}")]
    Allocation { what: &'static str, reason: String },

    #[error("failed to compile the {stage} shader:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("failed to link the shader program:\n{log}")]
    ProgramLink { log: String },
}

pub type Result<T = (), E = Error> = std::result::Result<T, E>;

impl Error {
    /// Process exit status for this failure.
    ///
    /// `1` for shader and program build failures, `2` for window and event loop failures,
    /// `3` for format, context and entry-point negotiation failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ShaderCompile { .. } | Self::ProgramLink { .. } => 1,
            Self::EventLoop(_) | Self::Window(_) | Self::WindowHandle(_) => 2,
            Self::UnsupportedBackend(_)
            | Self::DraftFormat(_)
            | Self::DraftContext(_)
            | Self::MissingExtension(_)
            | Self::NoMatchingFormat(_)
            | Self::ApplyFormat { .. }
            | Self::ContextCreation(_)
            | Self::MakeCurrent(_)
            | Self::SwapBuffers(_)
            | Self::Glutin(_)
            | Self::GlutinDisplay(_)
            | Self::MissingEntryPoint(_)
            | Self::Allocation { .. } => 3,
        }
    }

    /// The driver's diagnostic text, if this is a shader or program build failure.
    pub fn diagnostic_log(&self) -> Option<&str> {
        match self {
            Self::ShaderCompile { log, .. } | Self::ProgramLink { log } => Some(log),
            _ => None,
        }
    }
}
