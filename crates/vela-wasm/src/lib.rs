//! Vela WASM - Browser player overlay for Vela
//!
//! Provides the page-facing half of the player:
//! - `VelaPlayer`: modal overlay driving hls.js (or native HLS) playback
//! - Quality selector, loading, retry and play-button affordances
//! - `PageGuard`: context-menu, shortcut, drag and selection deterrents
//! - Console logging through `tracing`
//!
//! ## Integration
//!
//! ```javascript
//! import init, { VelaPlayer, installPageGuard } from '@vela/wasm';
//!
//! await init();
//! installPageGuard();
//! const player = new VelaPlayer();
//! document.querySelectorAll('[data-video]').forEach(card =>
//!   card.addEventListener('click', () => player.open(card.dataset.video, card.dataset.title)));
//! ```

use wasm_bindgen::prelude::*;

mod dispatch;
mod dom;
mod guard;
mod hls;
mod js;
mod logging;
mod player;

pub use guard::{install_page_guard, PageGuard};
pub use player::VelaPlayer;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"[Vela WASM] Initialized".into());
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    vela_core::VERSION.to_string()
}

/// Install console logging at `level` (error, warn, info, debug, trace).
/// `new VelaPlayer()` does this with its configured level when not done yet.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: &str) -> Result<(), JsValue> {
    let level = level
        .parse()
        .map_err(|_| JsValue::from_str(&format!("unknown log level '{}'", level)))?;
    logging::init(level);
    Ok(())
}
