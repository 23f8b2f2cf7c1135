use std::collections::HashMap;
use std::path::Path;

use glow::HasContext;
use uuid::Uuid;

use cubed_gui_lib::scene::TargetId;

use super::mesh::{self, LineMeshData, MeshData};
use crate::state::settings::{AxisSettings, GridSettings};

// ── Render parameters ────────────────────────────────────────

/// Parameters for rendering the viewport
pub struct RenderParams {
    /// Viewport rectangle [x, y, width, height] in pixels
    pub viewport: [f32; 4],
    /// Show grid
    pub grid_visible: bool,
    /// Show axes
    pub axes_visible: bool,
    /// Axis line thickness
    pub axes_thickness: f32,
    /// Show per-cuboid wireframe outlines
    pub wireframes_visible: bool,
    /// Background color RGB
    pub bg_color: [u8; 3],
}

/// Per-cuboid draw call data, assembled on the main thread each frame.
#[derive(Clone)]
pub struct DrawCuboid {
    pub key: Uuid,
    pub target: TargetId,
    pub model: glam::Mat4,
    pub normal_matrix: glam::Mat3,
    /// Corner-test frustum visibility for this frame
    pub visible: bool,
}

/// The cursor preview's transform for this frame.
#[derive(Clone)]
pub struct CursorDraw {
    pub target: TargetId,
    pub model: glam::Mat4,
    pub normal_matrix: glam::Mat3,
}

// ── GPU handles ──────────────────────────────────────────────

struct GpuMesh {
    vao: glow::VertexArray,
    _vbo: glow::Buffer,
    vertex_count: i32,
}

struct GpuLines {
    vao: glow::VertexArray,
    _vbo: glow::Buffer,
    vertex_count: i32,
}

// ── Main GL renderer ─────────────────────────────────────────

/// Owns every GL resource: the target registry (shader programs keyed by
/// opaque `TargetId`), per-cuboid vertex buffers, and the grid/axes lines.
/// Only ever touched from the thread that owns the GL context.
pub struct GlRenderer {
    programs: HashMap<TargetId, glow::Program>,
    next_target: u32,
    line_program: glow::Program,
    grid: Option<GpuLines>,
    axes: Option<GpuLines>,
    /// Cached grid settings to detect changes
    cached_grid_settings: Option<(i32, f32, f32)>,
    /// Cached axes length to detect changes
    cached_axes_length: Option<f32>,
    /// Cuboid meshes and outlines keyed by cuboid id
    meshes: HashMap<Uuid, GpuMesh>,
    outlines: HashMap<Uuid, GpuLines>,
    cursor_mesh: Option<GpuMesh>,
    /// Scene version the buffers were last uploaded for
    last_scene_version: u64,
}

impl GlRenderer {
    pub fn new(gl: &glow::Context) -> Self {
        let line_program = compile_program(gl, LINE_VERT, LINE_FRAG);

        let grid_data = mesh::grid(10, 0.1, 0.6);
        let grid = Some(upload_lines(gl, &grid_data));

        let axes_data = mesh::axes(0.5);
        let axes = Some(upload_lines(gl, &axes_data));

        Self {
            programs: HashMap::new(),
            next_target: 0,
            line_program,
            grid,
            axes,
            cached_grid_settings: Some((10, 0.1, 0.6)),
            cached_axes_length: Some(0.5),
            meshes: HashMap::new(),
            outlines: HashMap::new(),
            cursor_mesh: None,
            last_scene_version: u64::MAX,
        }
    }

    /// Register a render target: compile a shader program from a directory
    /// holding `vertex.glsl` and `fragment.glsl`, falling back to the
    /// built-in sources when the directory cannot be read. The returned
    /// handle is opaque to everything outside this renderer.
    pub fn create_target(&mut self, gl: &glow::Context, shader_dir: Option<&Path>) -> TargetId {
        let (vert, frag) = match shader_dir {
            Some(dir) => {
                let vert = std::fs::read_to_string(dir.join("vertex.glsl"));
                let frag = std::fs::read_to_string(dir.join("fragment.glsl"));
                match (vert, frag) {
                    (Ok(vert), Ok(frag)) => (vert, frag),
                    _ => {
                        tracing::error!(dir = %dir.display(), "missing shader sources, using built-in");
                        (MESH_VERT.to_string(), MESH_FRAG.to_string())
                    }
                }
            }
            None => (MESH_VERT.to_string(), MESH_FRAG.to_string()),
        };

        let program = compile_program(gl, &vert, &frag);
        let target = TargetId(self.next_target);
        self.next_target += 1;
        self.programs.insert(target, program);
        target
    }

    /// Update grid mesh based on settings
    pub fn update_grid(&mut self, gl: &glow::Context, settings: &GridSettings) {
        let new_settings = (settings.range, settings.size, settings.opacity);
        if self.cached_grid_settings == Some(new_settings) {
            return;
        }

        if let Some(old) = self.grid.take() {
            unsafe {
                gl.delete_vertex_array(old.vao);
                gl.delete_buffer(old._vbo);
            }
        }

        let grid_data = mesh::grid(settings.range, settings.size, settings.opacity);
        self.grid = Some(upload_lines(gl, &grid_data));
        self.cached_grid_settings = Some(new_settings);
    }

    /// Update axes mesh based on settings
    pub fn update_axes(&mut self, gl: &glow::Context, settings: &AxisSettings) {
        if self.cached_axes_length == Some(settings.length) {
            return;
        }

        if let Some(old) = self.axes.take() {
            unsafe {
                gl.delete_vertex_array(old.vao);
                gl.delete_buffer(old._vbo);
            }
        }

        let axes_data = mesh::axes(settings.length);
        self.axes = Some(upload_lines(gl, &axes_data));
        self.cached_axes_length = Some(settings.length);
    }

    /// Re-upload cuboid vertex buffers when the scene version moved.
    pub fn sync_scene(
        &mut self,
        gl: &glow::Context,
        payload: &HashMap<Uuid, (MeshData, LineMeshData)>,
        version: u64,
    ) {
        if version == self.last_scene_version {
            return;
        }
        self.last_scene_version = version;

        for (_, mesh) in self.meshes.drain() {
            unsafe {
                gl.delete_vertex_array(mesh.vao);
                gl.delete_buffer(mesh._vbo);
            }
        }
        for (_, lines) in self.outlines.drain() {
            unsafe {
                gl.delete_vertex_array(lines.vao);
                gl.delete_buffer(lines._vbo);
            }
        }

        for (id, (mesh_data, line_data)) in payload {
            self.meshes.insert(*id, upload_mesh(gl, mesh_data));
            self.outlines.insert(*id, upload_lines(gl, line_data));
        }
    }

    /// Upload or remove the cursor preview mesh (changes every hover).
    pub fn sync_cursor(&mut self, gl: &glow::Context, data: Option<&MeshData>) {
        if let Some(old) = self.cursor_mesh.take() {
            unsafe {
                gl.delete_vertex_array(old.vao);
                gl.delete_buffer(old._vbo);
            }
        }
        if let Some(mesh_data) = data {
            self.cursor_mesh = Some(upload_mesh(gl, mesh_data));
        }
    }

    /// Push view/projection to the targets whose dirty flag was set this
    /// frame; uniforms on other programs are still current.
    pub fn update_target_uniforms(
        &self,
        gl: &glow::Context,
        targets: &[TargetId],
        view: &glam::Mat4,
        projection: &glam::Mat4,
    ) {
        for target in targets {
            if let Some(program) = self.programs.get(target) {
                unsafe {
                    gl.use_program(Some(*program));
                }
                set_uniform_mat4(gl, *program, "u_view", view);
                set_uniform_mat4(gl, *program, "u_projection", projection);
            }
        }
        unsafe {
            gl.use_program(None);
        }
    }

    /// Render the scene
    pub fn paint(
        &self,
        gl: &glow::Context,
        draws: &[DrawCuboid],
        cursor: Option<&CursorDraw>,
        view_projection: &glam::Mat4,
        params: &RenderParams,
    ) {
        unsafe {
            gl.viewport(
                params.viewport[0] as i32,
                params.viewport[1] as i32,
                params.viewport[2] as i32,
                params.viewport[3] as i32,
            );
            gl.scissor(
                params.viewport[0] as i32,
                params.viewport[1] as i32,
                params.viewport[2] as i32,
                params.viewport[3] as i32,
            );
            gl.enable(glow::SCISSOR_TEST);

            gl.clear_color(
                params.bg_color[0] as f32 / 255.0,
                params.bg_color[1] as f32 / 255.0,
                params.bg_color[2] as f32 / 255.0,
                1.0,
            );
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);

            // Grid and axes
            gl.use_program(Some(self.line_program));
            set_uniform_mat4(gl, self.line_program, "u_mvp", view_projection);

            if params.grid_visible {
                if let Some(ref grid) = self.grid {
                    draw_lines(gl, grid);
                }
            }
            if params.axes_visible {
                if let Some(ref axes) = self.axes {
                    gl.line_width(params.axes_thickness);
                    draw_lines(gl, axes);
                    gl.line_width(1.0);
                }
            }

            // Cuboids, grouped per target program
            let light_dir = glam::Vec3::new(0.3, 0.8, 0.5).normalize();
            for draw in draws {
                if !draw.visible {
                    continue;
                }
                let Some(program) = self.programs.get(&draw.target) else {
                    continue;
                };
                let Some(mesh) = self.meshes.get(&draw.key) else {
                    continue;
                };
                gl.use_program(Some(*program));
                set_uniform_vec3(gl, *program, "u_light_dir", &light_dir);
                set_uniform_mat4(gl, *program, "u_model", &draw.model);
                set_uniform_mat3(gl, *program, "u_normal_matrix", &draw.normal_matrix);
                draw_mesh(gl, mesh);
            }

            // Wireframe outlines (already in world space)
            if params.wireframes_visible {
                gl.use_program(Some(self.line_program));
                for draw in draws {
                    if !draw.visible {
                        continue;
                    }
                    if let Some(outline) = self.outlines.get(&draw.key) {
                        draw_lines(gl, outline);
                    }
                }
            }

            // Cursor preview on top
            if let (Some(cursor), Some(mesh)) = (cursor, &self.cursor_mesh) {
                if let Some(program) = self.programs.get(&cursor.target) {
                    gl.use_program(Some(*program));
                    set_uniform_vec3(gl, *program, "u_light_dir", &light_dir);
                    set_uniform_mat4(gl, *program, "u_model", &cursor.model);
                    set_uniform_mat3(gl, *program, "u_normal_matrix", &cursor.normal_matrix);
                    draw_mesh(gl, mesh);
                }
            }

            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }
    }

    #[allow(dead_code)]
    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            for program in self.programs.values() {
                gl.delete_program(*program);
            }
            gl.delete_program(self.line_program);
            if let Some(ref grid) = self.grid {
                gl.delete_vertex_array(grid.vao);
                gl.delete_buffer(grid._vbo);
            }
            if let Some(ref axes) = self.axes {
                gl.delete_vertex_array(axes.vao);
                gl.delete_buffer(axes._vbo);
            }
            if let Some(ref cursor) = self.cursor_mesh {
                gl.delete_vertex_array(cursor.vao);
                gl.delete_buffer(cursor._vbo);
            }
            for mesh in self.meshes.values() {
                gl.delete_vertex_array(mesh.vao);
                gl.delete_buffer(mesh._vbo);
            }
            for lines in self.outlines.values() {
                gl.delete_vertex_array(lines.vao);
                gl.delete_buffer(lines._vbo);
            }
        }
    }
}

// ── GPU upload ───────────────────────────────────────────────

fn upload_mesh(gl: &glow::Context, data: &MeshData) -> GpuMesh {
    unsafe {
        let vao = gl.create_vertex_array().unwrap();
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer().unwrap();
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            cast_slice(&data.vertices),
            glow::STATIC_DRAW,
        );

        let stride = 9 * 4; // 9 floats * 4 bytes
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // normal: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 3 * 4);
        // color: location 2
        gl.enable_vertex_attrib_array(2);
        gl.vertex_attrib_pointer_f32(2, 3, glow::FLOAT, false, stride, 6 * 4);

        gl.bind_vertex_array(None);

        GpuMesh {
            vao,
            _vbo: vbo,
            vertex_count: data.vertex_count() as i32,
        }
    }
}

fn upload_lines(gl: &glow::Context, data: &LineMeshData) -> GpuLines {
    unsafe {
        let vao = gl.create_vertex_array().unwrap();
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer().unwrap();
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            cast_slice(&data.vertices),
            glow::STATIC_DRAW,
        );

        let stride = 7 * 4; // 7 floats * 4 bytes
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // color: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 4, glow::FLOAT, false, stride, 3 * 4);

        gl.bind_vertex_array(None);

        GpuLines {
            vao,
            _vbo: vbo,
            vertex_count: data.vertex_count() as i32,
        }
    }
}

// ── Draw calls ───────────────────────────────────────────────

unsafe fn draw_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    gl.bind_vertex_array(Some(mesh.vao));
    gl.draw_arrays(glow::TRIANGLES, 0, mesh.vertex_count);
    gl.bind_vertex_array(None);
}

unsafe fn draw_lines(gl: &glow::Context, lines: &GpuLines) {
    gl.bind_vertex_array(Some(lines.vao));
    gl.draw_arrays(glow::LINES, 0, lines.vertex_count);
    gl.bind_vertex_array(None);
}

// ── Shader compilation ───────────────────────────────────────

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> glow::Program {
    unsafe {
        let program = gl.create_program().unwrap();

        let vert = gl.create_shader(glow::VERTEX_SHADER).unwrap();
        gl.shader_source(vert, vert_src);
        gl.compile_shader(vert);
        if !gl.get_shader_compile_status(vert) {
            let log = gl.get_shader_info_log(vert);
            tracing::error!("Vertex shader error: {log}");
        }

        let frag = gl.create_shader(glow::FRAGMENT_SHADER).unwrap();
        gl.shader_source(frag, frag_src);
        gl.compile_shader(frag);
        if !gl.get_shader_compile_status(frag) {
            let log = gl.get_shader_info_log(frag);
            tracing::error!("Fragment shader error: {log}");
        }

        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            tracing::error!("Program link error: {log}");
        }

        gl.delete_shader(vert);
        gl.delete_shader(frag);

        program
    }
}

// ── Uniform setters ──────────────────────────────────────────

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &glam::Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_mat3(gl: &glow::Context, program: glow::Program, name: &str, mat: &glam::Mat3) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_3_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_vec3(gl: &glow::Context, program: glow::Program, name: &str, v: &glam::Vec3) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_3_f32(loc.as_ref(), v.x, v.y, v.z);
    }
}

// ── Byte cast helper ─────────────────────────────────────────

fn cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(slice.as_ptr() as *const u8, std::mem::size_of_val(slice)) }
}

// ── Shaders ──────────────────────────────────────────────────

const MESH_VERT: &str = r#"#version 330 core
uniform mat4 u_model;
uniform mat4 u_view;
uniform mat4 u_projection;
uniform mat3 u_normal_matrix;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec3 a_color;

out vec3 v_normal;
out vec3 v_color;

void main() {
    gl_Position = u_projection * u_view * u_model * vec4(a_position, 1.0);
    v_normal = u_normal_matrix * a_normal;
    v_color = a_color;
}
"#;

const MESH_FRAG: &str = r#"#version 330 core
uniform vec3 u_light_dir;

in vec3 v_normal;
in vec3 v_color;

out vec4 frag_color;

void main() {
    vec3 n = normalize(v_normal);
    float diffuse = max(dot(n, u_light_dir), 0.0);
    float ambient = 0.25;
    float light = ambient + diffuse * 0.75;
    frag_color = vec4(v_color * light, 1.0);
}
"#;

const LINE_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec4 a_color;

out vec4 v_color;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_color = a_color;
}
"#;

const LINE_FRAG: &str = r#"#version 330 core
in vec4 v_color;
out vec4 frag_color;

void main() {
    frag_color = v_color;
}
"#;
