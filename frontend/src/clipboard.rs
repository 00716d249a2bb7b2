//! Clipboard writes through `navigator.clipboard.writeText`.
//!
//! The Clipboard API is looked up dynamically so the build does not depend
//! on `web_sys_unstable_apis`.

use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::api::js_error_message;

pub async fn write_text(text: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("no window")?;
    let clipboard = Reflect::get(&window.navigator(), &JsValue::from_str("clipboard"))
        .map_err(|error| js_error_message(&error))?;
    if clipboard.is_undefined() || clipboard.is_null() {
        return Err("Clipboard API unavailable (insecure context?)".to_string());
    }
    let write_text: Function = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
        .map_err(|error| js_error_message(&error))?
        .dyn_into()
        .map_err(|_| "clipboard.writeText is not a function".to_string())?;
    let promise: Promise = write_text
        .call1(&clipboard, &JsValue::from_str(text))
        .map_err(|error| js_error_message(&error))?
        .dyn_into()
        .map_err(|_| "clipboard.writeText did not return a promise".to_string())?;
    JsFuture::from(promise)
        .await
        .map(|_| ())
        .map_err(|error| js_error_message(&error))
}

/// `window.location.origin`, when there is one.
pub fn page_origin() -> Option<String> {
    web_sys::window().and_then(|window| window.location().origin().ok())
}
