//! Recording stand-ins for the driver, the GL and the window surface.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    ffi::{CStr, c_void},
    rc::Rc,
};

use crate::{
    Error, Result,
    attribs::AttribList,
    bootstrap::Driver,
    format::{FormatRequest, PixelFormat},
    gpu::Gpu,
    shader::ShaderStage,
    surface::SurfaceContext,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriverCall {
    ApplyDraftFormat,
    CreateLegacyContext(u32),
    MakeCurrent(Option<u32>),
    ResolveExtensions,
    DeleteContext(u32),
    ChooseFormats,
    DescribeFormat(i32),
    ApplyFormat(i32),
    CreateContext(u32),
}

/// A [`Driver`] whose contexts are counters.
pub struct RecordingDriver {
    pub calls: Rc<RefCell<Vec<DriverCall>>>,
    pub format_attribs: Option<AttribList>,
    pub context_attribs: Option<AttribList>,

    /// Extension to report as missing from [`Driver::resolve_extensions`].
    pub missing_extension: Option<&'static str>,

    /// Returned by [`Driver::choose_formats`].
    pub formats: Vec<i32>,

    /// Formats described as not hardware accelerated.
    pub software_formats: Vec<i32>,

    pub fail_legacy_context: bool,
    pub fail_real_context: bool,

    pub(crate) next_context: u32,
}

impl Default for RecordingDriver {
    fn default() -> Self {
        Self {
            calls: Rc::default(),
            format_attribs: None,
            context_attribs: None,
            missing_extension: None,
            formats: vec![7],
            software_formats: Vec::new(),
            fail_legacy_context: false,
            fail_real_context: false,
            next_context: 0,
        }
    }
}

impl RecordingDriver {
    fn record(&self, call: DriverCall) {
        self.calls.borrow_mut().push(call);
    }

    fn format(&self, index: i32) -> PixelFormat {
        PixelFormat {
            index,
            color_bits: 32,
            depth_bits: 24,
            stencil_bits: 8,
            double_buffer: true,
            rgba: true,
            hardware_accelerated: !self.software_formats.contains(&index),
            draw_to_window: true,
        }
    }

    fn next_context(&mut self) -> u32 {
        self.next_context += 1;
        self.next_context
    }
}

impl Driver for RecordingDriver {
    type Context = u32;
    type Extensions = ();

    fn apply_draft_format(&mut self, request: &FormatRequest) -> Result<PixelFormat> {
        self.record(DriverCall::ApplyDraftFormat);
        Ok(PixelFormat {
            index: 1,
            color_bits: request.color_bits,
            depth_bits: request.depth_bits,
            stencil_bits: request.stencil_bits,
            double_buffer: request.double_buffer,
            rgba: true,
            hardware_accelerated: request.hardware_accelerated,
            draw_to_window: true,
        })
    }

    fn create_legacy_context(&mut self) -> Result<u32> {
        if self.fail_legacy_context {
            return Err(Error::DraftContext("no legacy context today".to_owned()));
        }
        let context = self.next_context();
        self.record(DriverCall::CreateLegacyContext(context));
        Ok(context)
    }

    fn make_current(&mut self, context: Option<&u32>) -> Result {
        self.record(DriverCall::MakeCurrent(context.copied()));
        Ok(())
    }

    fn resolve_extensions(&mut self) -> Result {
        self.record(DriverCall::ResolveExtensions);
        match self.missing_extension {
            Some(name) => Err(Error::MissingExtension(name)),
            None => Ok(()),
        }
    }

    fn delete_context(&mut self, context: u32) {
        self.record(DriverCall::DeleteContext(context));
    }

    fn choose_formats(&mut self, _: &(), attribs: &AttribList) -> Result<Vec<i32>> {
        self.record(DriverCall::ChooseFormats);
        self.format_attribs = Some(attribs.clone());
        Ok(self.formats.clone())
    }

    fn describe_format(&mut self, index: i32) -> Result<PixelFormat> {
        self.record(DriverCall::DescribeFormat(index));
        Ok(self.format(index))
    }

    fn apply_format(&mut self, index: i32) -> Result<PixelFormat> {
        self.record(DriverCall::ApplyFormat(index));
        Ok(self.format(index))
    }

    fn create_context(&mut self, _: &(), attribs: &AttribList) -> Result<u32> {
        self.context_attribs = Some(attribs.clone());
        if self.fail_real_context {
            return Err(Error::ContextCreation("null context".to_owned()));
        }
        let context = self.next_context();
        self.record(DriverCall::CreateContext(context));
        Ok(context)
    }
}

// ----------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub enum GpuCall {
    CreateShader(ShaderStage, u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    LinkProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    CreateVertexArray(u32),
    BindVertexArray(Option<u32>),
    DeleteVertexArray(u32),
    CreateBuffer(u32),
    BindArrayBuffer(Option<u32>),
    UploadStatic(Vec<f32>),
    DeleteBuffer(u32),
    VertexAttribPointer {
        location: u32,
        components: i32,
        stride: i32,
        offset: i32,
    },
    EnableVertexAttribArray(u32),
    Viewport(i32, i32, i32, i32),
    ClearColor([f32; 4]),
    ClearColorAndDepth,
    DrawTriangles {
        first: i32,
        count: i32,
    },
    SwapBuffers,
    ReleaseContext,
}

/// A [`Gpu`] that records every state-changing call and hands out ids from one counter.
///
/// A shader compiles if its source contains `void main`.
#[derive(Default)]
pub struct RecordingGpu {
    pub(crate) calls: Rc<RefCell<Vec<GpuCall>>>,
    pub(crate) next_id: Cell<u32>,
    pub(crate) sources: RefCell<HashMap<u32, String>>,

    pub fail_link: bool,
    pub empty_logs: bool,
    pub fail_buffer: bool,
}

impl RecordingGpu {
    fn record(&self, call: GpuCall) {
        self.calls.borrow_mut().push(call);
    }

    fn next_id(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    /// Drain everything recorded so far.
    pub fn take_calls(&self) -> Vec<GpuCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// The shared log, for a [`RecordingSurface`].
    pub fn log(&self) -> Rc<RefCell<Vec<GpuCall>>> {
        Rc::clone(&self.calls)
    }

    fn failure_log(&self, text: &str) -> String {
        if self.empty_logs {
            String::new()
        } else {
            text.to_owned()
        }
    }
}

impl Gpu for RecordingGpu {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let id = self.next_id();
        self.record(GpuCall::CreateShader(stage, id));
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        self.sources.borrow_mut().insert(shader, source.to_owned());
    }

    fn compile_shader(&self, shader: u32) {
        self.record(GpuCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.sources
            .borrow()
            .get(&shader)
            .is_some_and(|source| source.contains("void main"))
    }

    fn shader_info_log(&self, shader: u32) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            self.failure_log("0:1(1): error: no function with name 'main'")
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.sources.borrow_mut().remove(&shader);
        self.record(GpuCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, String> {
        let id = self.next_id();
        self.record(GpuCall::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record(GpuCall::AttachShader(program, shader));
    }

    fn link_program(&self, program: u32) {
        self.record(GpuCall::LinkProgram(program));
    }

    fn program_link_status(&self, _: u32) -> bool {
        !self.fail_link
    }

    fn program_info_log(&self, _: u32) -> String {
        if self.fail_link {
            self.failure_log("error: vertex and fragment interfaces do not match")
        } else {
            String::new()
        }
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(GpuCall::UseProgram(program));
    }

    fn delete_program(&self, program: u32) {
        self.record(GpuCall::DeleteProgram(program));
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let id = self.next_id();
        self.record(GpuCall::CreateVertexArray(id));
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.record(GpuCall::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.record(GpuCall::DeleteVertexArray(vertex_array));
    }

    fn create_buffer(&self) -> Result<u32, String> {
        if self.fail_buffer {
            return Err("out of memory".to_owned());
        }
        let id = self.next_id();
        self.record(GpuCall::CreateBuffer(id));
        Ok(id)
    }

    fn bind_array_buffer(&self, buffer: Option<u32>) {
        self.record(GpuCall::BindArrayBuffer(buffer));
    }

    fn upload_static_f32(&self, data: &[f32]) {
        self.record(GpuCall::UploadStatic(data.to_vec()));
    }

    fn delete_buffer(&self, buffer: u32) {
        self.record(GpuCall::DeleteBuffer(buffer));
    }

    fn vertex_attrib_pointer_f32(&self, location: u32, components: i32, stride: i32, offset: i32) {
        self.record(GpuCall::VertexAttribPointer {
            location,
            components,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        self.record(GpuCall::EnableVertexAttribArray(location));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GpuCall::Viewport(x, y, width, height));
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.record(GpuCall::ClearColor(rgba));
    }

    fn clear_color_and_depth(&self) {
        self.record(GpuCall::ClearColorAndDepth);
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.record(GpuCall::DrawTriangles { first, count });
    }

    fn error(&self) -> u32 {
        0
    }
}

// ----------------------------------------------------------------------------

/// A [`SurfaceContext`] that writes into a [`RecordingGpu`]'s log.
pub struct RecordingSurface {
    calls: Rc<RefCell<Vec<GpuCall>>>,
}

impl RecordingSurface {
    pub fn new(calls: Rc<RefCell<Vec<GpuCall>>>) -> Self {
        Self { calls }
    }
}

impl SurfaceContext for RecordingSurface {
    fn swap_buffers(&self) -> Result {
        self.calls.borrow_mut().push(GpuCall::SwapBuffers);
        Ok(())
    }

    fn resize(&self, _width: u32, _height: u32) {}

    fn get_proc_address(&self, _name: &CStr) -> *const c_void {
        std::ptr::null()
    }

    fn release(self) {
        self.calls.borrow_mut().push(GpuCall::ReleaseContext);
    }
}
