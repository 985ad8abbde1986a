use crate::{
    Result,
    gpu::Gpu,
    mesh::{AttributeLayout, TRIANGLE, TriangleMesh},
    shader::{ShaderProgram, ShaderSources},
    surface::SurfaceContext,
};

/// Background behind the triangle.
pub const CLEAR_COLOR: [f32; 4] = [0.2, 0.3, 0.3, 1.0];

/// Owns the GL objects needed to draw one frame: a mesh and a program.
pub struct Renderer<G: Gpu> {
    mesh: TriangleMesh<G>,
    program: ShaderProgram<G::Program>,
    clear_color: [f32; 4],
}

impl<G: Gpu> Renderer<G> {
    /// Upload the triangle, then build and activate the program.
    pub fn new(gl: &G, sources: &ShaderSources, clear_color: [f32; 4]) -> Result<Self> {
        let mesh = TriangleMesh::new(gl, &TRIANGLE, &[AttributeLayout::POSITION_2D])?;

        let program = match ShaderProgram::build(gl, sources) {
            Ok(program) => program,
            Err(err) => {
                mesh.destroy(gl);
                return Err(err);
            }
        };

        Ok(Self {
            mesh,
            program,
            clear_color,
        })
    }

    /// Clear, bind, draw. Identical every time it is called.
    pub fn paint(&self, gl: &G) {
        gl.clear_color(self.clear_color);
        gl.clear_color_and_depth();
        self.mesh.bind(gl);
        gl.draw_triangles(0, self.mesh.vertex_count());
    }

    /// Map the viewport to the new client area. A zero-sized area is passed through as-is.
    pub fn resize(&self, gl: &G, width: u32, height: u32) {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        gl.viewport(0, 0, width, height);
    }

    /// Release the VAO, the VBO and the program, in that order.
    pub fn destroy(self, gl: &G) {
        let Self { mesh, program, .. } = self;
        mesh.destroy(gl);
        program.destroy(gl);
    }
}

/// Paint and present one frame.
pub fn present_frame<G: Gpu>(
    renderer: &Renderer<G>,
    gl: &G,
    surface: &impl SurfaceContext,
) -> Result {
    renderer.paint(gl);
    surface.swap_buffers()
}

/// Release every GL object, then the context itself.
pub fn shut_down<G: Gpu, S: SurfaceContext>(renderer: Renderer<G>, gl: &G, surface: S) {
    log::debug!("Releasing GL resources");
    renderer.destroy(gl);
    surface.release();
}
