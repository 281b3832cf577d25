//! WebAssembly entry point.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::{AppConfig, StencilApp};

/// Id of the `<canvas>` element the app mounts into.
const CANVAS_ID: &str = "stencil_canvas";

fn find_canvas() -> Option<web_sys::HtmlCanvasElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(CANVAS_ID)?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .ok()
}

/// Initialize and run the WASM application.
#[wasm_bindgen(start)]
pub async fn run_wasm() {
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::error_1(&format!("Failed to initialize logger: {}", e).into());
    }

    log::info!("Starting Stencil (WASM)");

    let Some(canvas) = find_canvas() else {
        log::error!("No <canvas id=\"{}\"> element found", CANVAS_ID);
        return;
    };

    let config = AppConfig::default();
    let result = eframe::WebRunner::new()
        .start(
            canvas,
            eframe::WebOptions::default(),
            Box::new(move |cc| Ok(Box::new(StencilApp::new(cc, config)))),
        )
        .await;

    if let Err(e) = result {
        log::error!("Failed to start app: {:?}", e);
    }
}
