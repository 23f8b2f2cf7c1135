//! Main application module

mod keyboard;
mod menus;

use std::path::PathBuf;

use eframe::egui;

use crate::state::AppState;
use crate::viewport::ViewportPanel;

/// Main application
pub struct CubedApp {
    state: AppState,
    viewport: ViewportPanel,
    /// Scene version the settings were last persisted at
    last_saved_version: u64,
    last_title: String,
}

impl CubedApp {
    pub fn new(cc: &eframe::CreationContext<'_>, initial_object: Option<PathBuf>) -> Self {
        let mut state = AppState::new();
        let mut viewport = ViewportPanel::new(&state.settings);

        // Initialize GL renderer if glow context is available
        if let Some(gl) = cc.gl.as_ref() {
            viewport.init_gl(gl, &mut state);
        }

        if let Some(path) = initial_object {
            if let Some(data) = state.session.load_from(path) {
                let size = state.settings.editor.cuboid_size;
                match state.scene.load_from_data(
                    &data,
                    size,
                    state.cuboid_target,
                    state.aspect,
                    &mut state.arena,
                ) {
                    Ok(count) => tracing::info!(count, "loaded initial object"),
                    Err(err) => tracing::error!(%err, "failed to parse initial object"),
                }
            }
        }

        state.seed_initial_cuboid();

        let last_saved_version = state.scene.version();
        Self {
            state,
            viewport,
            last_saved_version,
            last_title: String::new(),
        }
    }
}

impl eframe::App for CubedApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        keyboard::handle_keyboard(ctx, &mut self.state, &mut self.viewport);

        // Window title follows the session name
        let title = format!("Cubed — {}", self.state.session.object_name());
        if title != self.last_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.last_title = title;
        }

        // Persist settings when the scene version moves
        let current_version = self.state.scene.version();
        if current_version != self.last_saved_version {
            self.state.settings.save();
            self.last_saved_version = current_version;
        }

        // ── Menu bar ──────────────────────────────────────────
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                menus::file_menu(ui, &mut self.state);
                menus::edit_menu(ui, &mut self.state);
                menus::view_menu(ui, &mut self.state);
            });
        });

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .show(ctx, |ui| {
                menus::status_bar(ui, &self.state);
            });

        // ── Central panel: 3D viewport ───────────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui, &mut self.state);
            });
    }
}
