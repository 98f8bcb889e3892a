//! Navigation capability injected into the session client.

#[cfg(feature = "wasm-js")]
pub mod wasm_js;
#[cfg(feature = "wasm-js")]
pub use wasm_js::BrowserNavigator;

/// Trait for moving the page to a new location.
///
/// One operation covers everything the client does: the post-resolution
/// redirect to the landing path and the full-page redirect to a login
/// provider. Implementations decide how to get there.
pub trait Navigator: Send {
    /// Navigates to `location`, a same-origin path or an absolute URL.
    fn go_to(&self, location: &str);
}

/// A [`Navigator`] that goes nowhere, for hosts where navigation is
/// meaningless (server-side rendering, headless tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn go_to(&self, _location: &str) {}
}
