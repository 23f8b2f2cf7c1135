//! Combined application state

pub mod settings;

pub use settings::{AppSettings, Keyset};

use glam::Vec3;

use cubed_gui_lib::cursor::BlockCursor;
use cubed_gui_lib::scene::{Cuboid, GeometryArena, SceneCubes, Source, TargetId};
use cubed_gui_lib::session::Session;
use cubed_gui_lib::viewport::mesh;

/// Aspect ratio cuboids are built with before the first frame reports the
/// real viewport size (the initial window is 1280x720).
pub const INITIAL_ASPECT: f32 = 1280.0 / 720.0;

/// Combined application state
pub struct AppState {
    pub scene: SceneCubes,
    pub arena: GeometryArena,
    pub session: Session,
    pub cursor: Option<BlockCursor>,
    pub settings: AppSettings,
    /// Render target the cuboid shader was registered under.
    pub cuboid_target: TargetId,
    /// Aspect ratio cuboids currently carry; updated by the resize handler.
    pub aspect: f32,
}

impl AppState {
    pub fn new() -> Self {
        let settings = AppSettings::load();
        let mut state = Self {
            scene: SceneCubes::new(),
            arena: GeometryArena::new(),
            session: Session::new(),
            cursor: None,
            settings,
            cuboid_target: TargetId(0),
            aspect: INITIAL_ASPECT,
        };
        state.rebuild_template();
        state
    }

    /// Build the placement template and its cursor preview from the current
    /// settings. The preview shares the template's geometry buffers, so
    /// color edits show up in the hover preview immediately.
    pub fn rebuild_template(&mut self) {
        // The cursor preview shares the template's buffers, so freeing the
        // template's handles covers both
        if let Some(old) = self.session.template() {
            for (_, buffer) in old.buffers() {
                self.arena.free(buffer);
            }
        }
        let size = self.settings.editor.cuboid_size;
        let block = mesh::cuboid_block(size, self.session.color.truncate());
        let template = Cuboid::from_block(
            "cuboid",
            &block,
            Some(Vec3::ZERO),
            size,
            None,
            self.cuboid_target,
            self.aspect,
            &mut self.arena,
        );
        self.cursor = Some(BlockCursor::new(template.clone_shared()));
        self.session.set_template(template);
    }

    /// Re-thread a changed viewport aspect ratio through every cuboid, the
    /// template and the cursor preview.
    pub fn rescale_all(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.scene.rescale_all(aspect);
        if let Some(template) = self.session.template_mut() {
            template.set_aspect(aspect);
        }
        if let Some(cursor) = &mut self.cursor {
            cursor.cuboid.set_aspect(aspect);
        }
    }

    /// Give a fresh scene its starting cuboid at the origin so there is a
    /// face to build from.
    pub fn seed_initial_cuboid(&mut self) {
        if !self.scene.is_empty() {
            return;
        }
        let Some(template) = self.session.template() else {
            return;
        };
        let data = template.dev_data(&self.arena);
        let size = template.size().x;
        self.scene.create(
            "cuboid",
            Some(Vec3::ZERO),
            size,
            Source::Inline(data),
            self.cuboid_target,
            self.aspect,
            &mut self.arena,
        );
    }

    /// Commit the cursor position as one shape placement: clone the
    /// template's data into a fresh cuboid per expanded position.
    pub fn place_at_cursor(&mut self) {
        let Some(cursor) = &self.cursor else {
            return;
        };
        if !cursor.visible {
            return;
        }
        let seed = cursor.next_position();

        let Some(template) = self.session.template() else {
            return;
        };
        let data = template.dev_data(&self.arena);
        let size = template.size().x;

        for position in self.session.placement_positions(seed) {
            self.scene.create(
                "cuboid",
                Some(position),
                size,
                Source::Inline(data.clone()),
                self.cuboid_target,
                self.aspect,
                &mut self.arena,
            );
        }
        self.session.mark_dirty();
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
