//! Page guard - casual-use deterrents
//!
//! Blocks the context menu and a handful of save/inspect shortcuts, marks
//! media non-draggable and turns off text selection. None of this protects
//! the stream or the page source; it only discourages casual copying.
//!
//! ```javascript
//! import init, { installPageGuard, PageGuard } from '@vela/wasm';
//!
//! await init();
//! installPageGuard();              // permanent, for classic pages
//!
//! const guard = PageGuard.install(); // or keep a handle for SPA navigation
//! guard.teardown();
//! ```

use crate::js::describe;
use tracing::{debug, info, warn};
use vela_core::{KeyChord, NON_DRAGGABLE_SELECTOR};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent};

const USER_SELECT: [&str; 2] = ["user-select", "-webkit-user-select"];

type Listener = Closure<dyn FnMut(Event)>;

/// Installed guard. Dropping it removes the listeners; `teardown` also
/// restores drag and selection settings.
#[wasm_bindgen]
pub struct PageGuard {
    document: Document,
    listeners: Vec<(&'static str, Listener)>,
    /// Elements made non-draggable, with their previous attribute
    draggable: Vec<(Element, Option<String>)>,
    /// Previous `user-select` values on the root element
    user_select: Vec<(&'static str, String)>,
}

#[wasm_bindgen]
impl PageGuard {
    /// Install the guard on the current document
    pub fn install() -> Result<PageGuard, JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let mut guard = PageGuard {
            document,
            listeners: Vec::new(),
            draggable: Vec::new(),
            user_select: Vec::new(),
        };

        guard.listen("contextmenu", |event| event.prevent_default())?;
        guard.listen("keydown", |event| {
            let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = key_event.key();
            let chord = KeyChord::new(&key, key_event.ctrl_key(), key_event.shift_key());
            if let Some(shortcut) = chord.blocked_shortcut() {
                key_event.prevent_default();
                key_event.stop_propagation();
                debug!(?shortcut, "Blocked shortcut");
            }
        })?;
        guard.disable_drag()?;
        guard.disable_selection()?;

        info!(
            listeners = guard.listeners.len(),
            non_draggable = guard.draggable.len(),
            "Page guard installed"
        );
        Ok(guard)
    }

    /// Restore the previous drag and selection settings and remove the
    /// listeners
    pub fn teardown(self) -> Result<(), JsValue> {
        for (element, previous) in &self.draggable {
            match previous {
                Some(value) => element.set_attribute("draggable", value)?,
                None => element.remove_attribute("draggable")?,
            }
        }
        if let Some(style) = self.root_style() {
            for (property, previous) in &self.user_select {
                if previous.is_empty() {
                    style.remove_property(property)?;
                } else {
                    style.set_property(property, previous)?;
                }
            }
        }
        info!("Page guard removed");
        Ok(())
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        for (event, listener) in self.listeners.drain(..) {
            let result = self
                .document
                .remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
            if let Err(err) = result {
                warn!(event, error = %describe(&err), "Failed to remove guard listener");
            }
        }
    }
}

impl PageGuard {
    fn listen(
        &mut self,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        let listener = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        self.document
            .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())?;
        self.listeners.push((event, listener));
        Ok(())
    }

    /// Snapshot only; media added later stays draggable
    fn disable_drag(&mut self) -> Result<(), JsValue> {
        let nodes = self.document.query_selector_all(NON_DRAGGABLE_SELECTOR)?;
        for index in 0..nodes.length() {
            let Some(element) = nodes
                .item(index)
                .and_then(|node| node.dyn_into::<Element>().ok())
            else {
                continue;
            };
            let previous = element.get_attribute("draggable");
            element.set_attribute("draggable", "false")?;
            self.draggable.push((element, previous));
        }
        Ok(())
    }

    fn disable_selection(&mut self) -> Result<(), JsValue> {
        let Some(style) = self.root_style() else {
            return Ok(());
        };
        for property in USER_SELECT {
            let previous = style.get_property_value(property)?;
            style.set_property(property, "none")?;
            self.user_select.push((property, previous));
        }
        Ok(())
    }

    fn root_style(&self) -> Option<web_sys::CssStyleDeclaration> {
        self.document
            .document_element()
            .and_then(|root| root.dyn_into::<HtmlElement>().ok())
            .map(|root| root.style())
    }
}

/// Install the guard for the lifetime of the page
#[wasm_bindgen(js_name = installPageGuard)]
pub fn install_page_guard() -> Result<(), JsValue> {
    let guard = PageGuard::install()?;
    // Listeners must outlive this call
    std::mem::forget(guard);
    Ok(())
}
