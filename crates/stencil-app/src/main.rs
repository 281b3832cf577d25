//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() -> eframe::Result<()> {
    env_logger::init();
    log::info!("Starting Stencil");

    let config = stencil_app::AppConfig::from_env();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.title.clone())
            .with_inner_size([config.width as f32, config.height as f32]),
        ..Default::default()
    };

    eframe::run_native(
        "Stencil",
        options,
        Box::new(move |cc| Ok(Box::new(stencil_app::StencilApp::new(cc, config)))),
    )
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
