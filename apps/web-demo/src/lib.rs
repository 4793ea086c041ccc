//! Browser entry point: logging, panic hook and the lazy image loader.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Web demo starting...");

    lazypix_platform_web::install()
}

/// Current loader counters as a string, for poking at from the console.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn lazypix_stats() -> String {
    match lazypix_platform_web::stats() {
        Some(stats) => format!("{stats:?} mode={:?}", lazypix_platform_web::mode()),
        None => "not installed".to_string(),
    }
}
