//! DOM implementation of the overlay view

use crate::{
    dispatch::{Inbox, Input},
    js::{describe, JsResultExt},
};
use tracing::{debug, warn};
use vela_core::{DomConfig, Error, PlayerEvent, PlayerView, QualityOption, Result, SessionToken};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlOptionElement, HtmlSelectElement,
    HtmlVideoElement, Window,
};

type Listener = Closure<dyn FnMut(Event)>;

/// Page elements the overlay is bound to
pub(crate) struct Elements {
    pub window: Window,
    pub document: Document,
    pub overlay: HtmlElement,
    pub video: HtmlVideoElement,
    pub quality: HtmlSelectElement,
    pub title: HtmlElement,
}

impl Elements {
    pub(crate) fn lookup(dom: &DomConfig) -> std::result::Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        Ok(Self {
            overlay: by_id(&document, &dom.overlay_id)?,
            video: by_id(&document, &dom.video_id)?,
            quality: by_id(&document, &dom.quality_select_id)?,
            title: by_id(&document, &dom.title_id)?,
            window,
            document,
        })
    }
}

fn by_id<T: JsCast>(document: &Document, id: &str) -> std::result::Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("element #{} not found", id)))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("element #{} has the wrong type", id)))
}

/// An element added to the video container, with its click handler
struct Transient {
    element: Element,
    _on_click: Option<Listener>,
}

impl Transient {
    fn remove(self) {
        self.element.remove();
    }
}

/// Overlay view over the live page
pub struct DomView {
    elements: Elements,
    dom: DomConfig,
    native_mime_type: String,
    inbox: Inbox,
    loading: Option<Transient>,
    error: Option<Transient>,
    play_button: Option<Transient>,
    native_listeners: Vec<(&'static str, Listener)>,
}

impl DomView {
    pub(crate) fn new(
        elements: Elements,
        dom: DomConfig,
        native_mime_type: String,
        inbox: Inbox,
    ) -> Self {
        Self {
            elements,
            dom,
            native_mime_type,
            inbox,
            loading: None,
            error: None,
            play_button: None,
            native_listeners: Vec::new(),
        }
    }

    fn container(&self) -> Result<Element> {
        self.elements
            .document
            .query_selector(&self.dom.container_selector)
            .view_err()?
            .ok_or_else(|| Error::view(format!("{} not found", self.dom.container_selector)))
    }

    fn create(&self, tag: &str, class: &str) -> Result<Element> {
        let element = self.elements.document.create_element(tag).view_err()?;
        element.set_class_name(class);
        Ok(element)
    }

    /// Post `input` on every click of `target`
    fn on_click(&self, target: &Element, input: Input) -> Result<Listener> {
        let inbox = self.inbox.clone();
        let listener = Closure::wrap(Box::new(move |_event: Event| {
            inbox.post(input.clone());
        }) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
            .view_err()?;
        Ok(listener)
    }

    /// Append `element` to the video container
    fn mount(&self, element: Element, on_click: Option<Listener>) -> Result<Transient> {
        self.container()?.append_child(&element).view_err()?;
        Ok(Transient {
            element,
            _on_click: on_click,
        })
    }

    fn drop_native_listeners(&mut self) {
        for (event, listener) in self.native_listeners.drain(..) {
            let result = self
                .elements
                .video
                .remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
            if let Err(err) = result {
                warn!(event, error = %describe(&err), "Failed to remove media listener");
            }
        }
    }

    fn listen_media(
        &mut self,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<()> {
        let listener = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        self.elements
            .video
            .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
            .view_err()?;
        self.native_listeners.push((event, listener));
        Ok(())
    }
}

impl PlayerView for DomView {
    fn alert(&mut self, message: &str) {
        if let Err(err) = self.elements.window.alert_with_message(message) {
            warn!(error = %describe(&err), "Alert failed");
        }
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        self.elements.title.set_text_content(Some(title));
        Ok(())
    }

    fn set_modal_visible(&mut self, visible: bool) -> Result<()> {
        let display = if visible { "flex" } else { "none" };
        self.elements
            .overlay
            .style()
            .set_property("display", display)
            .view_err()
    }

    fn set_scroll_locked(&mut self, locked: bool) -> Result<()> {
        let body = self
            .elements
            .document
            .body()
            .ok_or_else(|| Error::view("no body"))?;
        if locked {
            body.style().set_property("overflow", "hidden").view_err()
        } else {
            body.style().remove_property("overflow").view_err().map(|_| ())
        }
    }

    fn show_loading(&mut self) -> Result<()> {
        if self.loading.is_some() {
            return Ok(());
        }
        let spinner = self.create("div", &self.dom.loading_class)?;
        self.loading = Some(self.mount(spinner, None)?);
        Ok(())
    }

    fn remove_loading(&mut self) -> Result<()> {
        if let Some(spinner) = self.loading.take() {
            spinner.remove();
        }
        Ok(())
    }

    fn show_error(&mut self, message: &str) -> Result<()> {
        self.remove_error()?;

        let panel = self.create("div", &self.dom.error_class)?;
        let text = self.create("p", "")?;
        text.set_text_content(Some(message));
        let button = self.create("button", "")?;
        button.set_text_content(Some("Retry"));
        panel.append_child(&text).view_err()?;
        panel.append_child(&button).view_err()?;

        // Only the button retries; clicks elsewhere on the panel do nothing
        let listener = self.on_click(&button, Input::Retry)?;
        self.error = Some(self.mount(panel, Some(listener))?);
        Ok(())
    }

    fn remove_error(&mut self) -> Result<()> {
        if let Some(panel) = self.error.take() {
            panel.remove();
        }
        Ok(())
    }

    fn show_play_button(&mut self) -> Result<()> {
        self.remove_play_button()?;

        let button = self.create("div", &self.dom.play_button_class)?;
        let icon = self.create("i", &self.dom.play_icon_class)?;
        button.append_child(&icon).view_err()?;
        let listener = self.on_click(&button, Input::PlayClicked)?;
        self.play_button = Some(self.mount(button, Some(listener))?);
        Ok(())
    }

    fn remove_play_button(&mut self) -> Result<()> {
        if let Some(button) = self.play_button.take() {
            button.remove();
        }
        Ok(())
    }

    fn set_quality_options(&mut self, options: &[QualityOption]) -> Result<()> {
        let select = &self.elements.quality;
        select.set_length(0);
        for option in options {
            let element = HtmlOptionElement::new_with_text_and_value(&option.label, &option.value)
                .view_err()?;
            select.add_with_html_option_element(&element).view_err()?;
        }
        Ok(())
    }

    fn can_play_natively(&self) -> bool {
        !self
            .elements
            .video
            .can_play_type(&self.native_mime_type)
            .is_empty()
    }

    fn clear_source(&mut self) -> Result<()> {
        self.drop_native_listeners();
        self.elements.video.set_src("");
        Ok(())
    }

    fn reset_media(&mut self) -> Result<()> {
        self.drop_native_listeners();
        let video = &self.elements.video;
        video.pause().view_err()?;
        video.remove_attribute("src").view_err()?;
        video.load();
        Ok(())
    }

    fn load_native(&mut self, url: &str, token: SessionToken) -> Result<()> {
        self.drop_native_listeners();
        self.elements.video.set_src(url);

        let inbox = self.inbox.clone();
        self.listen_media("loadedmetadata", move |_event| {
            inbox.event(token, PlayerEvent::MetadataLoaded);
        })?;

        let inbox = self.inbox.clone();
        let video = self.elements.video.clone();
        self.listen_media("error", move |_event| {
            let detail = video
                .error()
                .map(|err| format!("code {}: {}", err.code(), err.message()))
                .unwrap_or_else(|| "unknown media error".to_string());
            inbox.event(token, PlayerEvent::MediaError(detail));
        })?;

        debug!(%token, "Native playback source set");
        Ok(())
    }

    fn play(&mut self, token: SessionToken) -> Result<()> {
        let promise = self.elements.video.play().view_err()?;
        let inbox = self.inbox.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match wasm_bindgen_futures::JsFuture::from(promise).await {
                Ok(_) => inbox.event(token, PlayerEvent::PlaybackStarted),
                Err(err) => inbox.event(token, PlayerEvent::PlaybackBlocked(describe(&err))),
            }
        });
        Ok(())
    }
}

impl Drop for DomView {
    fn drop(&mut self) {
        self.drop_native_listeners();
    }
}
