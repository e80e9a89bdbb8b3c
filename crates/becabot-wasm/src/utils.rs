use becabot_core::csrf::cookie_value;
use becabot_types::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlDocument;

use crate::{document, window};

/// Convert a client error into a value JavaScript can throw
pub fn js_error(error: Error) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Path and query of the displayed location
pub fn current_location() -> Result<String, JsValue> {
    let location = window()?.location();
    Ok(format!("{}{}", location.pathname()?, location.search()?))
}

/// CSRF token from the cookie the server issued, if any
pub fn csrf_token(cookie_name: &str) -> Option<String> {
    let cookies = document()
        .ok()?
        .dyn_into::<HtmlDocument>()
        .ok()?
        .cookie()
        .ok()?;
    let raw = cookie_value(&cookies, cookie_name)?;
    js_sys::decode_uri_component(&raw)
        .ok()
        .map(String::from)
        .or(Some(raw))
}
