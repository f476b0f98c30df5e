//! The `VelaPlayer` class exported to JavaScript

use crate::{
    dispatch::{shared_cyclic, Input, Shared},
    dom::{DomView, Elements},
    hls::HlsProvider,
    js::to_js,
    logging,
};
use std::rc::Rc;
use tracing::{info, warn};
use vela_core::{OverlayConfig, PlayerController, QualitySelection};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget};

type Listener = Closure<dyn FnMut(Event)>;

/// Modal video player bound to the page's overlay markup
///
/// ```javascript
/// const player = new VelaPlayer({ logLevel: 'debug' });
/// player.open('https://cdn.example.com/lecture/master.m3u8', 'Lecture 1');
/// player.changeQuality(1);
/// player.close();
/// ```
#[wasm_bindgen]
pub struct VelaPlayer {
    shared: Rc<Shared>,
    bindings: Vec<(EventTarget, &'static str, Listener)>,
}

#[wasm_bindgen]
impl VelaPlayer {
    /// Bind to the overlay elements. `config` may be omitted or partial.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<VelaPlayer, JsValue> {
        let config: OverlayConfig = if config.is_undefined() || config.is_null() {
            OverlayConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        config.validate().map_err(to_js)?;
        logging::init(config.log_level().map_err(to_js)?);

        let elements = Elements::lookup(&config.dom)?;
        let overlay = elements.overlay.clone();
        let quality = elements.quality.clone();
        let media = elements.video.clone();

        let OverlayConfig {
            engine,
            dom,
            native_mime_type,
            ..
        } = config;
        let shared = shared_cyclic(|inbox| {
            PlayerController::new(
                HlsProvider::new(media.into(), inbox.clone()),
                DomView::new(elements, dom, native_mime_type, inbox),
                engine,
            )
        });

        let mut player = VelaPlayer {
            shared,
            bindings: Vec::new(),
        };

        // Clicks on the backdrop, not on the frame inside it, close the overlay
        let backdrop = overlay.clone();
        player.bind(overlay.into(), "click", move |event, shared| {
            let on_backdrop = event
                .target()
                .map(|target| js_sys::Object::is(&target, &backdrop))
                .unwrap_or(false);
            if on_backdrop {
                shared.post(Input::Close);
            }
        })?;

        let select = quality.clone();
        player.bind(quality.into(), "change", move |_event, shared| {
            let selection = select.value().parse().unwrap_or(QualitySelection::Auto);
            shared.post(Input::ChangeQuality(selection));
        })?;

        info!(version = crate::version(), "Player bound");
        Ok(player)
    }

    /// Open the overlay and start playing `video_url`
    pub fn open(&self, video_url: &str, title: &str) {
        self.shared.post(Input::Open {
            url: video_url.to_string(),
            title: title.to_string(),
        });
    }

    /// Close the overlay; safe to call at any time
    pub fn close(&self) {
        self.shared.post(Input::Close);
    }

    /// Pin a rendition by index, or pass `"auto"`
    #[wasm_bindgen(js_name = changeQuality)]
    pub fn change_quality(&self, selection: JsValue) {
        let selection = match selection.as_f64() {
            Some(index) if index.is_finite() && index >= 0.0 => {
                QualitySelection::Level(index.trunc() as usize)
            }
            Some(_) => QualitySelection::Auto,
            None => selection
                .as_string()
                .and_then(|value| value.parse().ok())
                .unwrap_or(QualitySelection::Auto),
        };
        self.shared.post(Input::ChangeQuality(selection));
    }

    /// Reopen the last video after an error
    pub fn retry(&self) {
        self.shared.post(Input::Retry);
    }

    /// Current overlay state, e.g. `"playing"`
    pub fn state(&self) -> Result<String, JsValue> {
        self.shared
            .target
            .try_borrow()
            .map(|controller| controller.state().to_string())
            .map_err(|_| JsValue::from_str("player is busy"))
    }
}

impl VelaPlayer {
    fn bind(
        &mut self,
        target: EventTarget,
        event: &'static str,
        mut handler: impl FnMut(&Event, &Shared) + 'static,
    ) -> Result<(), JsValue> {
        let shared = Rc::downgrade(&self.shared);
        let listener = Closure::wrap(Box::new(move |event: Event| {
            if let Some(shared) = shared.upgrade() {
                handler(&event, &shared);
            }
        }) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())?;
        self.bindings.push((target, event, listener));
        Ok(())
    }
}

impl Drop for VelaPlayer {
    fn drop(&mut self) {
        for (target, event, listener) in self.bindings.drain(..) {
            if target
                .remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
                .is_err()
            {
                warn!(event, "Failed to unbind listener");
            }
        }
        self.shared.post(Input::Close);
    }
}
