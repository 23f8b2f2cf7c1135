mod app;
mod state;
mod viewport;

// Re-export library modules so that `crate::scene`, `crate::session`, etc.
// resolve to the lib crate types everywhere in the binary.
pub use cubed_gui_lib::cursor;
pub use cubed_gui_lib::scene;
pub use cubed_gui_lib::session;
pub use cubed_gui_lib::shape;

use std::path::PathBuf;

use app::CubedApp;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cubed_gui=info".into()),
        )
        .init();

    // Parse --object <path> argument
    let initial_object = parse_object_arg();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Cubed — 3D Object Editor")
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "cubed-gui",
        native_options,
        Box::new(move |cc| Ok(Box::new(CubedApp::new(cc, initial_object)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

fn parse_object_arg() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--object" && i + 1 < args.len() {
            return Some(PathBuf::from(&args[i + 1]));
        }
        i += 1;
    }
    None
}
