//! JsValue helpers

use wasm_bindgen::{JsCast, JsValue};

/// Human-readable text for a thrown JS value
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        let name: String = error.name().into();
        let message: String = error.message().into();
        return format!("{}: {}", name, message);
    }
    format!("{:?}", value)
}

/// Map JS failures onto the core error type
pub(crate) trait JsResultExt<T> {
    fn view_err(self) -> vela_core::Result<T>;
    fn engine_err(self) -> vela_core::Result<T>;
}

impl<T> JsResultExt<T> for Result<T, JsValue> {
    fn view_err(self) -> vela_core::Result<T> {
        self.map_err(|err| vela_core::Error::view(describe(&err)))
    }

    fn engine_err(self) -> vela_core::Result<T> {
        self.map_err(|err| vela_core::Error::engine(describe(&err)))
    }
}

/// Core error as a JS exception value
pub(crate) fn to_js(err: vela_core::Error) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}
