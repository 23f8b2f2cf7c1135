//! Application menu bar, status bar, and the file actions behind them.
//!
//! Every dialog returns an Option; a cancelled dialog is a silent no-op,
//! never an error.

use eframe::egui;

use cubed_gui_lib::session::{DEV_EXTENSION, EXPORT_EXTENSION};
use cubed_gui_lib::shape::SymmetryMode;

use crate::state::AppState;

/// Show the file menu
pub fn file_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("File", |ui| {
        if ui.button("New").clicked() {
            ui.close_menu();
            action_new(state);
        }
        if ui.button("Open…").clicked() {
            ui.close_menu();
            action_load(state);
        }
        ui.separator();
        if ui.button("Save").clicked() {
            ui.close_menu();
            action_save(state);
        }
        if ui.button("Save As…").clicked() {
            ui.close_menu();
            action_save_as(state);
        }
        ui.separator();
        if ui.button("Export…").clicked() {
            ui.close_menu();
            action_export(state);
        }
        ui.separator();
        if ui.button("Quit").clicked() {
            std::process::exit(0);
        }
    });
}

/// Show the edit menu: placement color and symmetry
pub fn edit_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("Edit", |ui| {
        ui.horizontal(|ui| {
            ui.label("Placement color");
            let mut rgba = state.session.color.to_array();
            if ui.color_edit_button_rgba_unmultiplied(&mut rgba).changed() {
                state
                    .session
                    .set_color(glam::Vec4::from_array(rgba), &mut state.arena);
            }
        });
        ui.separator();
        let mut symmetry = state.session.symmetry_enabled();
        if ui.checkbox(&mut symmetry, "All-axis symmetry").clicked() {
            state.session.toggle_symmetry(SymmetryMode::AllAxis);
        }
    });
}

/// Show the view menu
pub fn view_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("View", |ui| {
        let mut changed = false;
        changed |= ui
            .checkbox(&mut state.settings.grid.visible, "Grid")
            .changed();
        changed |= ui
            .checkbox(&mut state.settings.axes.visible, "Axes")
            .changed();
        changed |= ui
            .checkbox(&mut state.settings.viewport.wireframes, "Wireframes")
            .changed();
        ui.separator();
        ui.label("Movement keys");
        for keyset in crate::state::Keyset::all() {
            if ui
                .radio(state.settings.keyset == *keyset, keyset.display_name())
                .clicked()
            {
                state.settings.keyset = *keyset;
                changed = true;
            }
        }
        if changed {
            state.settings.save();
        }
    });
}

/// Show the status bar
pub fn status_bar(ui: &mut egui::Ui, state: &AppState) {
    ui.horizontal(|ui| {
        let dirty = if state.session.saved { "" } else { "*" };
        ui.label(format!("{}{dirty}", state.session.object_name()));
        ui.separator();
        ui.label(format!("{} cuboids", state.scene.len()));
        if state.session.symmetry_enabled() {
            ui.separator();
            ui.label("symmetry: all-axis");
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let c = state.session.color;
            let swatch = egui::Color32::from_rgb(
                (c.x * 255.0) as u8,
                (c.y * 255.0) as u8,
                (c.z * 255.0) as u8,
            );
            let (rect, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 2.0, swatch);
            ui.label("color");
        });
    });
}

// ── File actions ─────────────────────────────────────────────

/// Save to the session file, prompting for one first if untitled.
pub fn action_save(state: &mut AppState) {
    if state.session.object_path().is_none() && !prompt_object_path(state) {
        return;
    }
    let data = state.scene.dev_data(&state.arena);
    state.session.save(&data);
}

/// Always prompt for a new file, then save.
pub fn action_save_as(state: &mut AppState) {
    if prompt_object_path(state) {
        let data = state.scene.dev_data(&state.arena);
        state.session.save(&data);
    }
}

/// Offer to save unsaved work, then load a development file, replacing the
/// scene.
pub fn action_load(state: &mut AppState) {
    if !offer_save(state) {
        return;
    }
    let Some(path) = rfd::FileDialog::new()
        .set_title("Load Development Object")
        .add_filter("Cubed Development Object", &[DEV_EXTENSION])
        .pick_file()
    else {
        return;
    };
    let Some(data) = state.session.load_from(path) else {
        return;
    };
    let size = state.settings.editor.cuboid_size;
    match state.scene.load_from_data(
        &data,
        size,
        state.cuboid_target,
        state.aspect,
        &mut state.arena,
    ) {
        Ok(count) => tracing::info!(count, "loaded scene"),
        Err(err) => tracing::error!(%err, "failed to parse object file"),
    }
}

/// Offer to save unsaved work, then clear the scene.
pub fn action_new(state: &mut AppState) {
    if !offer_save(state) {
        return;
    }
    state.scene.clear(&mut state.arena);
    state.session.reset();
}

/// Run occlusion culling and write the export-format file.
pub fn action_export(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export Object")
        .add_filter("Cubed Object", &[EXPORT_EXTENSION])
        .set_file_name(format!("object.{EXPORT_EXTENSION}"))
        .save_file()
    else {
        return;
    };
    let data = state.scene.export_data(&mut state.arena);
    state.session.export_to(path, &data);
}

fn prompt_object_path(state: &mut AppState) -> bool {
    let Some(path) = rfd::FileDialog::new()
        .set_title("New Development Object")
        .add_filter("Cubed Development Object", &[DEV_EXTENSION])
        .set_file_name(format!("object.{DEV_EXTENSION}"))
        .save_file()
    else {
        return false;
    };
    state.session.set_object_path(path);
    true
}

/// Save-if-dirty prompt before destructive transitions. Returns false when
/// the user cancels the whole operation.
fn offer_save(state: &mut AppState) -> bool {
    if state.session.saved {
        return true;
    }
    match rfd::MessageDialog::new()
        .set_title("Unsaved changes")
        .set_description("Save the current object before continuing?")
        .set_buttons(rfd::MessageButtons::YesNoCancel)
        .show()
    {
        rfd::MessageDialogResult::Yes => {
            action_save(state);
            true
        }
        rfd::MessageDialogResult::No => true,
        _ => false,
    }
}
