//! Simple interface to get your web application authenticated against a
//! social-login (OAuth redirect) backend.
//!
//! The backend performs the actual OAuth exchange with the provider and
//! redirects back to the application with a bearer token in the `token`
//! query parameter. This crate resolves that token once per page load
//! (from the URL first, then from prior storage), decodes its payload into
//! a [`UserProfile`], and exposes the resulting [`ViewState`] along with
//! the login-redirect and logout operations. The token's signature and
//! expiry are never verified locally; the issuing backend is the authority.
//!
//! The resolution flow runs over two injected capabilities so it works (and
//! tests) anywhere: a [`SessionStorage`] for the token slot and a
//! [`Navigator`] for redirects. The `wasm-js` feature (default) supplies the
//! browser implementations of both.
//!
//! # Usage
//!
//! ```
//! use oauth_session_client::{
//!     MemoryStorage, NoopNavigator, SessionClient, SessionClientCreateOptions, ViewState,
//! };
//!
//! let options = SessionClientCreateOptions::builder()
//!     // In the browser, omit these to get local storage and `window.location`.
//!     .storage(Box::new(MemoryStorage::new()))
//!     .navigator(Box::new(NoopNavigator))
//!     .build();
//! let client = SessionClient::new_with_options(options);
//!
//! match client.resolve_from_query("?token=ey…") {
//!     ViewState::Authenticated(profile) => {
//!         println!("{} <{}>", profile.display_name, profile.email);
//!     }
//!     ViewState::Anonymous => {
//!         // Render the login buttons; `client.login(Provider::Google)`
//!         // starts the Google flow.
//!     }
//! }
//! ```

pub mod callback;
pub mod navigator;
pub mod session;
pub mod storage;
pub mod token;

pub use callback::OnStateChange;
pub use navigator::{Navigator, NoopNavigator};
pub use session::{
    Provider, SessionClient, SessionClientCreateOptions, ViewState, DEFAULT_AUTH_ORIGIN,
};
pub use storage::{MemoryStorage, SessionStorage, StorageError, KEY_SESSION_TOKEN};
pub use token::{decode_profile, TokenDecodeError, UserProfile, DEFAULT_AVATAR};

#[cfg(feature = "wasm-js")]
pub use navigator::BrowserNavigator;
#[cfg(feature = "wasm-js")]
pub use storage::LocalStorage;
