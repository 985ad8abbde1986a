use crate::{Error, Result, check_for_gl_error, gpu::Gpu};

/// The triangle: three 2D positions in normalized device coordinates.
#[rustfmt::skip]
pub const TRIANGLE: [f32; 6] = [
    -0.5, -0.5,
     0.0,  0.5,
     0.5, -0.5,
];

// ----------------------------------------------------------------------------

/// How one float attribute is laid out in the vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeLayout {
    pub location: u32,
    pub components: i32,

    /// Bytes between consecutive vertices, `0` meaning tightly packed.
    pub stride: i32,
    pub offset: i32,
}

impl AttributeLayout {
    /// Attribute 0: two tightly packed floats.
    pub const POSITION_2D: Self = Self {
        location: 0,
        components: 2,
        stride: 0,
        offset: 0,
    };
}

// ----------------------------------------------------------------------------

/// A vertex array object together with the one buffer it reads from.
#[derive(Debug)]
pub struct TriangleMesh<G: Gpu> {
    vao: G::VertexArray,
    vbo: G::Buffer,
    vertex_count: i32,
}

impl<G: Gpu> TriangleMesh<G> {
    /// Upload `vertices` once with a static usage hint and record `layout` in a new VAO.
    pub fn new(gl: &G, vertices: &[f32], layout: &[AttributeLayout]) -> Result<Self> {
        let components: i32 = layout.iter().map(|attribute| attribute.components).sum();
        let vertex_count = if components > 0 {
            i32::try_from(vertices.len()).unwrap_or(i32::MAX) / components
        } else {
            0
        };

        let vao = gl.create_vertex_array().map_err(|reason| Error::Allocation {
            what: "a vertex array object",
            reason,
        })?;
        check_for_gl_error!(gl, "create_vertex_array");

        let vbo = match gl.create_buffer() {
            Ok(vbo) => vbo,
            Err(reason) => {
                gl.delete_vertex_array(vao);
                return Err(Error::Allocation {
                    what: "a vertex buffer",
                    reason,
                });
            }
        };

        // Store state in the VAO:
        gl.bind_vertex_array(Some(vao));
        gl.bind_array_buffer(Some(vbo));
        gl.upload_static_f32(vertices);
        check_for_gl_error!(gl, "buffer_data");

        for attribute in layout {
            gl.vertex_attrib_pointer_f32(
                attribute.location,
                attribute.components,
                attribute.stride,
                attribute.offset,
            );
            check_for_gl_error!(gl, "vertex_attrib_pointer_f32");
            gl.enable_vertex_attrib_array(attribute.location);
            check_for_gl_error!(gl, "enable_vertex_attrib_array");
        }

        gl.bind_array_buffer(None);
        gl.bind_vertex_array(None);

        log::debug!("Uploaded {vertex_count} vertices");

        Ok(Self {
            vao,
            vbo,
            vertex_count,
        })
    }

    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    pub fn bind(&self, gl: &G) {
        gl.bind_vertex_array(Some(self.vao));
    }

    /// Deletes the VAO before the buffer it references.
    pub fn destroy(self, gl: &G) {
        gl.bind_vertex_array(None);
        gl.delete_vertex_array(self.vao);
        gl.delete_buffer(self.vbo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{GpuCall, RecordingGpu};

    #[test]
    fn layout_is_recorded_inside_the_vao() {
        let gl = RecordingGpu::default();
        let mesh = TriangleMesh::new(&gl, &TRIANGLE, &[AttributeLayout::POSITION_2D])
            .expect("mesh");
        assert_eq!(mesh.vertex_count(), 3);

        let (vao, vbo) = (1, 2);
        assert_eq!(
            gl.take_calls(),
            vec![
                GpuCall::CreateVertexArray(vao),
                GpuCall::CreateBuffer(vbo),
                GpuCall::BindVertexArray(Some(vao)),
                GpuCall::BindArrayBuffer(Some(vbo)),
                GpuCall::UploadStatic(TRIANGLE.to_vec()),
                GpuCall::VertexAttribPointer {
                    location: 0,
                    components: 2,
                    stride: 0,
                    offset: 0,
                },
                GpuCall::EnableVertexAttribArray(0),
                GpuCall::BindArrayBuffer(None),
                GpuCall::BindVertexArray(None),
            ]
        );
    }

    #[test]
    fn vao_goes_before_vbo() {
        let gl = RecordingGpu::default();
        let mesh = TriangleMesh::new(&gl, &TRIANGLE, &[AttributeLayout::POSITION_2D])
            .expect("mesh");
        gl.take_calls();

        mesh.destroy(&gl);
        assert_eq!(
            gl.take_calls(),
            vec![
                GpuCall::BindVertexArray(None),
                GpuCall::DeleteVertexArray(1),
                GpuCall::DeleteBuffer(2),
            ]
        );
    }

    #[test]
    fn failed_buffer_allocation_releases_the_vao() {
        let gl = RecordingGpu {
            fail_buffer: true,
            ..Default::default()
        };
        let result = TriangleMesh::new(&gl, &TRIANGLE, &[AttributeLayout::POSITION_2D]);
        assert!(matches!(
            result,
            Err(Error::Allocation {
                what: "a vertex buffer",
                ..
            })
        ));
        assert_eq!(gl.take_calls().last(), Some(&GpuCall::DeleteVertexArray(1)));
    }
}
