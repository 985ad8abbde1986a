use crate::{Error, Result, check_for_gl_error, gpu::Gpu};

/// Shown instead of an empty driver log, so a failure never produces a blank dialog.
const NO_DIAGNOSTIC: &str = "(the driver returned no diagnostic text)";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

/// The two self-contained GLSL sources, submitted as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self {
            vertex: VERTEX_SHADER.to_owned(),
            fragment: FRAGMENT_SHADER.to_owned(),
        }
    }
}

pub const VERTEX_SHADER: &str = r#"#version 330 core

layout (location = 0) in vec2 position;

void main(void)
{
    gl_Position = vec4(position, 0.0, 1.0);
}
"#;

pub const FRAGMENT_SHADER: &str = r#"#version 330 core

out vec4 output_color;

void main(void)
{
    output_color = vec4(1.0, 0.0, 0.0, 1.0);
}
"#;

fn non_empty(log: String) -> String {
    if log.trim().is_empty() {
        NO_DIAGNOSTIC.to_owned()
    } else {
        log
    }
}

/// Compile one stage. A shader that fails to compile is deleted before returning.
pub fn compile_shader<G: Gpu>(gl: &G, stage: ShaderStage, source: &str) -> Result<G::Shader> {
    let shader = gl.create_shader(stage).map_err(|reason| Error::Allocation {
        what: "a shader object",
        reason,
    })?;

    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if gl.shader_compile_status(shader) {
        log::debug!("Compiled the {stage} shader");
        Ok(shader)
    } else {
        let log = non_empty(gl.shader_info_log(shader));
        gl.delete_shader(shader);
        Err(Error::ShaderCompile { stage, log })
    }
}

/// Link compiled shaders. A program that fails to link is deleted before returning.
///
/// The shaders themselves are left to the caller.
pub fn link_program<G: Gpu>(gl: &G, shaders: &[G::Shader]) -> Result<G::Program> {
    let program = gl.create_program().map_err(|reason| Error::Allocation {
        what: "a program object",
        reason,
    })?;

    for &shader in shaders {
        gl.attach_shader(program, shader);
    }

    gl.link_program(program);

    if gl.program_link_status(program) {
        Ok(program)
    } else {
        let log = non_empty(gl.program_info_log(program));
        gl.delete_program(program);
        Err(Error::ProgramLink { log })
    }
}

/// A linked, active program.
#[derive(Debug)]
pub struct ShaderProgram<P> {
    program: P,
}

impl<P: Copy> ShaderProgram<P> {
    /// Compile both stages, link them, drop the shader objects and activate the program.
    ///
    /// Any failure is terminal; no object created here outlives an error.
    pub fn build<G: Gpu<Program = P>>(gl: &G, sources: &ShaderSources) -> Result<Self> {
        let vertex = compile_shader(gl, ShaderStage::Vertex, &sources.vertex)?;

        let fragment = match compile_shader(gl, ShaderStage::Fragment, &sources.fragment) {
            Ok(fragment) => fragment,
            Err(err) => {
                gl.delete_shader(vertex);
                return Err(err);
            }
        };

        let linked = link_program(gl, &[vertex, fragment]);

        // The linked program keeps what it needs.
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);

        let program = linked?;
        log::debug!("Linked the shader program");

        gl.use_program(Some(program));
        check_for_gl_error!(gl, "use_program");

        Ok(Self { program })
    }

    pub fn raw(&self) -> P {
        self.program
    }

    pub fn destroy<G: Gpu<Program = P>>(self, gl: &G) {
        gl.use_program(None);
        gl.delete_program(self.program);
    }
}
