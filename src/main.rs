#![warn(clippy::all, rust_2018_idioms)]

fn main() -> eframe::Result {
    // Log to stderr (if you run with `RUST_LOG=debug`).
    env_logger::init();

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1120.0, 860.0]),
        ..Default::default()
    };
    eframe::run_native(
        "mapforge",
        native_options,
        Box::new(|cc| Ok(Box::new(mapforge::MapApp::new(cc)))),
    )
}
