//! Browser console logging.
//!
//! Messages go to `console.*` on wasm32 only; native builds (and tests) stay
//! silent. Callers prefix messages with a `[Component]` tag.

#[allow(unused_variables)]
pub fn log(msg: impl AsRef<str>) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(msg.as_ref()));
}

#[allow(unused_variables)]
pub fn warn(msg: impl AsRef<str>) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&wasm_bindgen::JsValue::from_str(msg.as_ref()));
}

#[allow(unused_variables)]
pub fn error(msg: impl AsRef<str>) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&wasm_bindgen::JsValue::from_str(msg.as_ref()));
}
