//! Keyboard handling: held movement keys feed the camera, command
//! shortcuts trigger file and editor actions.

use eframe::egui;

use cubed_gui_lib::shape::SymmetryMode;

use super::menus;
use crate::state::{AppState, Keyset};
use crate::viewport::ViewportPanel;

/// Movement bindings for one keyset: (key, axis, direction). Axis 0 is
/// strafe, 1 vertical, 2 forward.
fn movement_bindings(keyset: Keyset) -> [(egui::Key, usize, i8); 6] {
    match keyset {
        Keyset::Wasd => [
            (egui::Key::A, 0, -1),
            (egui::Key::D, 0, 1),
            (egui::Key::C, 1, -1),
            (egui::Key::Space, 1, 1),
            (egui::Key::S, 2, -1),
            (egui::Key::W, 2, 1),
        ],
        Keyset::Arrows => [
            (egui::Key::ArrowLeft, 0, -1),
            (egui::Key::ArrowRight, 0, 1),
            (egui::Key::C, 1, -1),
            (egui::Key::Space, 1, 1),
            (egui::Key::ArrowDown, 2, -1),
            (egui::Key::ArrowUp, 2, 1),
        ],
    }
}

pub fn handle_keyboard(ctx: &egui::Context, state: &mut AppState, viewport: &mut ViewportPanel) {
    // Don't handle shortcuts when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return;
    }

    let (save, load, new, export, symmetry) = ctx.input(|i| {
        for (key, axis, direction) in movement_bindings(state.settings.keyset) {
            if i.key_down(key) {
                viewport.camera.start_move(axis, direction);
            } else {
                viewport.camera.stop_move(axis, direction);
            }
        }

        (
            i.modifiers.command && i.key_pressed(egui::Key::S),
            i.modifiers.command && i.key_pressed(egui::Key::O),
            i.modifiers.command && i.key_pressed(egui::Key::N),
            i.modifiers.command && i.key_pressed(egui::Key::E),
            i.key_pressed(egui::Key::Y) && !i.modifiers.command,
        )
    });

    // Dialogs must open outside the input lock
    if save {
        menus::action_save(state);
    }
    if load {
        menus::action_load(state);
    }
    if new {
        menus::action_new(state);
    }
    if export {
        menus::action_export(state);
    }
    if symmetry {
        state.session.toggle_symmetry(SymmetryMode::AllAxis);
    }

    if viewport.camera.is_moving() {
        ctx.request_repaint();
    }
}
