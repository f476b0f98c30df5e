//! hls.js adapter
//!
//! Binds the global `Hls` class and turns its events into [`PlayerEvent`]s.
//! The error category string is decoded here, once, into [`ErrorKind`].
//!
//! ## Page setup
//!
//! ```html
//! <script src="https://cdn.jsdelivr.net/npm/hls.js@1"></script>
//! ```

use crate::{
    dispatch::Inbox,
    js::{describe, JsResultExt},
};
use js_sys::{Array, Reflect};
use tracing::{debug, warn};
use vela_core::{
    EngineConfig, EngineError, EngineProvider, Error, ErrorKind, Level, PlayerEvent, Result,
    SessionToken, StreamingEngine,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlMediaElement;

/// `Hls.Events.MEDIA_ATTACHED`
pub const MEDIA_ATTACHED: &str = "hlsMediaAttached";
/// `Hls.Events.MANIFEST_PARSED`
pub const MANIFEST_PARSED: &str = "hlsManifestParsed";
/// `Hls.Events.ERROR`
pub const ERROR: &str = "hlsError";

/// `Hls.ErrorTypes.NETWORK_ERROR`
pub const NETWORK_ERROR: &str = "networkError";
/// `Hls.ErrorTypes.MEDIA_ERROR`
pub const MEDIA_ERROR: &str = "mediaError";

#[wasm_bindgen]
extern "C" {
    /// hls.js player instance
    #[derive(Debug, Clone)]
    pub type Hls;

    #[wasm_bindgen(static_method_of = Hls, js_name = isSupported, catch)]
    fn is_supported() -> std::result::Result<bool, JsValue>;

    #[wasm_bindgen(constructor, catch)]
    fn new(config: &JsValue) -> std::result::Result<Hls, JsValue>;

    #[wasm_bindgen(method)]
    fn on(this: &Hls, event: &str, listener: &js_sys::Function);

    #[wasm_bindgen(method, catch, js_name = attachMedia)]
    fn attach_media(this: &Hls, media: &HtmlMediaElement) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = loadSource)]
    fn load_source(this: &Hls, url: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = startLoad)]
    fn start_load(this: &Hls) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = recoverMediaError)]
    fn recover_media_error(this: &Hls) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method)]
    fn destroy(this: &Hls);

    #[wasm_bindgen(method, getter = currentLevel)]
    fn current_level(this: &Hls) -> i32;

    #[wasm_bindgen(method, setter = currentLevel)]
    fn set_current_level(this: &Hls, level: i32);
}

/// Decode an `ErrorTypes` string
pub fn classify(error_type: &str) -> ErrorKind {
    match error_type {
        NETWORK_ERROR => ErrorKind::Network,
        MEDIA_ERROR => ErrorKind::Media,
        _ => ErrorKind::Other,
    }
}

/// Build a rendition from the numeric fields of an hls.js level
pub fn level_from_fields(height: Option<f64>, bitrate: Option<f64>) -> Level {
    let height = height.filter(|h| h.is_finite() && *h > 0.0).unwrap_or(0.0);
    let bitrate = bitrate.filter(|b| b.is_finite() && *b > 0.0).unwrap_or(0.0);
    Level::new(height as u32, bitrate.round() as u64)
}

/// Map hls.js `currentLevel` onto a rendition index
pub fn level_index(raw: i32) -> Option<usize> {
    usize::try_from(raw).ok()
}

fn field(data: &JsValue, name: &str) -> JsValue {
    Reflect::get(data, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED)
}

// Payloads are read field by field: level and error objects carry cyclic
// references (fragments, loaders) that a structural decode would walk.
fn decode_levels(data: &JsValue) -> Vec<Level> {
    let levels = field(data, "levels");
    if !Array::is_array(&levels) {
        return Vec::new();
    }
    Array::from(&levels)
        .iter()
        .map(|level| {
            level_from_fields(field(&level, "height").as_f64(), field(&level, "bitrate").as_f64())
        })
        .collect()
}

fn decode_error(data: &JsValue) -> EngineError {
    let error_type = field(data, "type").as_string().unwrap_or_default();
    EngineError {
        kind: classify(&error_type),
        details: field(data, "details").as_string().unwrap_or_default(),
        fatal: field(data, "fatal").as_bool().unwrap_or(false),
    }
}

type Listener = Closure<dyn FnMut(JsValue, JsValue)>;

/// Live hls.js instance; dropping it destroys the instance
pub struct HlsEngine {
    hls: Hls,
    media: HtmlMediaElement,
    token: SessionToken,
    // hls.js removes its listeners on destroy, so these may drop afterwards
    _listeners: Vec<Listener>,
}

impl HlsEngine {
    fn listen(
        hls: &Hls,
        event: &'static str,
        inbox: Inbox,
        token: SessionToken,
        decode: fn(&JsValue) -> PlayerEvent,
    ) -> Listener {
        let listener = Closure::wrap(Box::new(move |_name: JsValue, data: JsValue| {
            inbox.event(token, decode(&data));
        }) as Box<dyn FnMut(JsValue, JsValue)>);
        hls.on(event, listener.as_ref().unchecked_ref());
        listener
    }
}

impl StreamingEngine for HlsEngine {
    fn attach_media(&mut self) -> Result<()> {
        self.hls.attach_media(&self.media).engine_err()
    }

    fn load_source(&mut self, url: &str) -> Result<()> {
        self.hls.load_source(url).engine_err()
    }

    fn start_load(&mut self) -> Result<()> {
        self.hls.start_load().engine_err()
    }

    fn recover_media_error(&mut self) -> Result<()> {
        self.hls.recover_media_error().engine_err()
    }

    fn current_level(&self) -> Option<usize> {
        level_index(self.hls.current_level())
    }

    fn set_current_level(&mut self, level: Option<usize>) -> Result<()> {
        let raw = match level {
            Some(index) => i32::try_from(index)
                .map_err(|_| Error::engine(format!("rendition index {} out of range", index)))?,
            None => -1,
        };
        self.hls.set_current_level(raw);
        Ok(())
    }

    fn destroy(self) {}
}

impl Drop for HlsEngine {
    fn drop(&mut self) {
        debug!(token = %self.token, "Destroying hls.js instance");
        self.hls.destroy();
    }
}

/// Creates hls.js instances bound to the overlay's video element
pub struct HlsProvider {
    media: HtmlMediaElement,
    inbox: Inbox,
}

impl HlsProvider {
    pub(crate) fn new(media: HtmlMediaElement, inbox: Inbox) -> Self {
        Self { media, inbox }
    }
}

impl EngineProvider for HlsProvider {
    type Engine = HlsEngine;

    fn is_supported(&self) -> bool {
        match Hls::is_supported() {
            Ok(supported) => supported,
            Err(err) => {
                warn!(error = %describe(&err), "hls.js not loaded");
                false
            }
        }
    }

    fn create(&mut self, config: &EngineConfig, token: SessionToken) -> Result<HlsEngine> {
        let js_config = serde_wasm_bindgen::to_value(config)
            .map_err(|err| Error::engine(format!("engine config: {}", err)))?;
        let hls = Hls::new(&js_config).engine_err()?;

        let listeners = vec![
            HlsEngine::listen(&hls, MEDIA_ATTACHED, self.inbox.clone(), token, |_| {
                PlayerEvent::MediaAttached
            }),
            HlsEngine::listen(&hls, MANIFEST_PARSED, self.inbox.clone(), token, |data| {
                PlayerEvent::ManifestParsed { levels: decode_levels(data) }
            }),
            HlsEngine::listen(&hls, ERROR, self.inbox.clone(), token, |data| {
                PlayerEvent::EngineError(decode_error(data))
            }),
        ];

        debug!(%token, "hls.js instance created");
        Ok(HlsEngine {
            hls,
            media: self.media.clone(),
            token,
            _listeners: listeners,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_error_types() {
        assert_eq!(classify("networkError"), ErrorKind::Network);
        assert_eq!(classify("mediaError"), ErrorKind::Media);
        assert_eq!(classify("keySystemError"), ErrorKind::Other);
        assert_eq!(classify("muxError"), ErrorKind::Other);
        assert_eq!(classify(""), ErrorKind::Other);
    }

    #[test]
    fn test_level_from_fields() {
        assert_eq!(
            level_from_fields(Some(1080.0), Some(3_000_000.0)),
            Level::new(1080, 3_000_000)
        );
        assert_eq!(level_from_fields(None, Some(128_000.4)), Level::new(0, 128_000));
        assert_eq!(level_from_fields(Some(f64::NAN), Some(-5.0)), Level::new(0, 0));
    }

    #[test]
    fn test_level_index() {
        assert_eq!(level_index(-1), None);
        assert_eq!(level_index(0), Some(0));
        assert_eq!(level_index(3), Some(3));
    }
}
