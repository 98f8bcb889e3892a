use super::Navigator;
use gloo_utils::window;
use wasm_bindgen::JsValue;
#[cfg(feature = "tracing")]
use tracing::error;

/// [`Navigator`] backed by the browser window.
///
/// Same-origin paths go through `history.pushState`, which clears the query
/// string without reloading the page; anything else (the provider login
/// redirect) is a full location assignment.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserNavigator;

impl BrowserNavigator {
    pub fn new() -> Self {
        BrowserNavigator
    }
}

impl Navigator for BrowserNavigator {
    fn go_to(&self, location: &str) {
        let window = window();
        if location.starts_with('/') {
            if let Ok(history) = window.history() {
                if history
                    .push_state_with_url(&JsValue::NULL, "", Some(location))
                    .is_ok()
                {
                    return;
                }
            }
        }
        if window.location().set_href(location).is_err() {
            #[cfg(feature = "tracing")]
            error!("failed to navigate to {location}");
        }
    }
}
