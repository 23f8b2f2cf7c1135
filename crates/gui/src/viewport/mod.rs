//! 3D viewport panel with OpenGL rendering

mod camera;
mod gl_renderer;
pub use cubed_gui_lib::viewport::{mesh, picking};

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use egui::Ui;
use glam::Vec3;
use uuid::Uuid;

use cubed_gui_lib::scene::Triangle;

use crate::state::AppState;
pub use camera::FlyCamera;
use gl_renderer::{CursorDraw, DrawCuboid, GlRenderer, RenderParams};
use mesh::{LineMeshData, MeshData};

const WIREFRAME_COLOR: [f32; 4] = [0.05, 0.05, 0.08, 1.0];

/// 3D viewport panel: camera controls, face picking, placement, and the GL
/// paint callback. All GL work happens on the UI thread inside the
/// callback; the per-frame OBB refresh joins before it runs.
pub struct ViewportPanel {
    pub camera: FlyCamera,
    gl_renderer: Option<Arc<Mutex<GlRenderer>>>,
    /// CPU-side mesh payload, rebuilt only when the scene version moves
    mesh_cache: HashMap<Uuid, (MeshData, LineMeshData)>,
    mesh_cache_version: u64,
    last_aspect: f32,
}

impl ViewportPanel {
    pub fn new(settings: &crate::state::AppSettings) -> Self {
        Self {
            camera: FlyCamera::new(
                Vec3::new(0.0, 0.0, 6.0),
                settings.camera.fov,
                settings.camera.move_speed,
                settings.camera.sensitivity,
            ),
            gl_renderer: None,
            mesh_cache: HashMap::new(),
            mesh_cache_version: u64::MAX,
            last_aspect: crate::state::INITIAL_ASPECT,
        }
    }

    /// Initialize the GL renderer and register the cuboid render target
    /// (must be called with a GL context).
    pub fn init_gl(&mut self, gl: &glow::Context, state: &mut AppState) {
        let mut renderer = GlRenderer::new(gl);
        state.cuboid_target = renderer.create_target(gl, Some(Path::new("res/cube_shader")));
        state.rebuild_template();
        self.gl_renderer = Some(Arc::new(Mutex::new(renderer)));
    }

    pub fn show(&mut self, ui: &mut Ui, state: &mut AppState) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }

        // ── Aspect-ratio rescale on viewport resize ─────────────
        let aspect = rect.width() / rect.height();
        if (aspect - self.last_aspect).abs() > 1e-3 {
            state.rescale_all(aspect);
            self.last_aspect = aspect;
        }

        // ── Camera controls ─────────────────────────────────────
        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            if self.camera.look(delta.x, delta.y) {
                ui.ctx().request_repaint();
            }
        }
        if self.camera.update_movement() {
            ui.ctx().request_repaint();
        }

        // ── Per-frame OBB refresh (compute only, joined here) ───
        state.scene.refresh_obbs();

        // ── Hover: pick a face, park the placement preview on it ─
        let hit = response.hover_pos().and_then(|pos| {
            let ray = self.camera.screen_ray(pos, rect);
            state.scene.ray_hit(&ray)
        });
        let cursor_hit = hit.and_then(|(id, face)| {
            state.scene.get(id).map(|cuboid| (cuboid.position(), face))
        });
        if let Some(cursor) = &mut state.cursor {
            cursor.place_on_face(cursor_hit);
            // Shape positions follow the cursor, not just the commit
            if cursor.visible {
                state.session.shape.set_seed(cursor.next_position());
            }
        }

        // ── Clicks: place / pick color / remove ─────────────────
        let alt = ui.input(|i| i.modifiers.alt);
        if response.clicked() {
            if alt {
                let color = hit
                    .and_then(|(id, _)| state.scene.get(id))
                    .and_then(|cuboid| cuboid.color(&state.arena));
                state.session.adopt_face_color(color, &mut state.arena);
            } else {
                state.place_at_cursor();
            }
        }
        if response.secondary_clicked() {
            if let Some((id, _)) = hit {
                state.scene.destroy(id, &mut state.arena);
                state.session.mark_dirty();
            }
        }

        if !ui.is_rect_visible(rect) {
            return;
        }

        // ── GL rendering ────────────────────────────────────────
        self.render_gl(ui, rect, state);
    }

    /// Rebuild the CPU mesh payload when the scene changed; the version
    /// gate keeps idle frames free of geometry work.
    fn refresh_mesh_cache(&mut self, state: &AppState) {
        if state.scene.version() == self.mesh_cache_version {
            return;
        }
        self.mesh_cache_version = state.scene.version();
        self.mesh_cache.clear();

        for cuboid in state.scene.iter() {
            let triangles: Vec<Triangle> = cuboid
                .buffers()
                .flat_map(|(_, buffer)| state.arena.get(buffer).iter().cloned())
                .collect();
            let mesh_data = mesh::interleave(&triangles);
            let outline = mesh::wireframe_lines(cuboid.corners(), WIREFRAME_COLOR);
            self.mesh_cache.insert(cuboid.id, (mesh_data, outline));
        }
    }

    fn render_gl(&mut self, ui: &mut Ui, rect: egui::Rect, state: &mut AppState) {
        self.refresh_mesh_cache(state);
        let Some(renderer) = self.gl_renderer.clone() else {
            return;
        };

        let aspect = rect.width() / rect.height();
        let view = self.camera.view_matrix();
        let projection = self.camera.projection_matrix(aspect);
        let vp = projection * view;

        // Uniform re-push for dirty targets only
        let dirty_targets = state.scene.targets_needing_update(&vp);

        let draws: Vec<DrawCuboid> = state
            .scene
            .iter()
            .map(|cuboid| DrawCuboid {
                key: cuboid.id,
                target: cuboid.target,
                model: cuboid.stretched_model(),
                normal_matrix: cuboid.normal_matrix(),
                visible: cuboid.is_visible(&vp),
            })
            .collect();

        let cursor = state.cursor.as_ref().filter(|cursor| cursor.visible);
        let cursor_draw = cursor.map(|cursor| CursorDraw {
            target: cursor.cuboid.target,
            model: cursor.cuboid.stretched_model(),
            normal_matrix: cursor.cuboid.normal_matrix(),
        });
        let cursor_mesh = cursor.map(|cursor| {
            let triangles: Vec<Triangle> = cursor
                .cuboid
                .buffers()
                .flat_map(|(_, buffer)| state.arena.get(buffer).iter().cloned())
                .collect();
            mesh::interleave(&triangles)
        });

        let payload = self.mesh_cache.clone();
        let version = self.mesh_cache_version;
        let grid_settings = state.settings.grid.clone();
        let axes_settings = state.settings.axes.clone();
        let bg_color = state.settings.viewport.background_color;
        let wireframes_visible = state.settings.viewport.wireframes;

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(eframe::egui_glow::CallbackFn::new(move |info, painter| {
                let gl = painter.gl();

                let clip = info.clip_rect_in_pixels();
                let viewport = [
                    clip.left_px as f32,
                    clip.from_bottom_px as f32,
                    clip.width_px as f32,
                    clip.height_px as f32,
                ];

                if let Ok(mut r) = renderer.lock() {
                    r.update_grid(gl, &grid_settings);
                    r.update_axes(gl, &axes_settings);
                    r.sync_scene(gl, &payload, version);
                    r.sync_cursor(gl, cursor_mesh.as_ref());
                    r.update_target_uniforms(gl, &dirty_targets, &view, &projection);

                    let params = RenderParams {
                        viewport,
                        grid_visible: grid_settings.visible,
                        axes_visible: axes_settings.visible,
                        axes_thickness: axes_settings.thickness,
                        wireframes_visible,
                        bg_color,
                    };
                    r.paint(gl, &draws, cursor_draw.as_ref(), &vp, &params);
                }
            })),
        };
        ui.painter().add(callback);
    }
}
