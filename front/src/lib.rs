//! Inline editor for the "My todos" page.
//!
//! Double-clicking a description swaps it for a text input; Enter puts the
//! text back and posts it to the update endpoint. Clicking a completion
//! checkbox posts to the toggle endpoint. Requests are fire-and-forget, the
//! page is patched before they are sent and their responses are ignored.

pub mod api;
pub mod editor;

#[cfg(target_arch = "wasm32")]
mod dom;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use todos_api::v1::{EditorConfig, EDITOR_OBJECT};
    use wasm_bindgen::prelude::*;

    use crate::{dom, editor::Endpoints};

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let config = js_sys::Reflect::get(&window, &JsValue::from_str(EDITOR_OBJECT))
            .ok()
            .filter(|value| !value.is_undefined())
            .and_then(|value| serde_wasm_bindgen::from_value::<EditorConfig>(value).ok())
            .unwrap_or_default();
        let origin = window.location().origin()?;

        dom::install(&document, Endpoints::new(origin, config))
    }
}
