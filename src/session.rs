//! The session client: load-time resolution, login redirects, and logout.

use crate::{
    callback::OnStateChange,
    navigator::Navigator,
    storage::{SessionStorage, KEY_SESSION_TOKEN},
    token::{self, UserProfile},
};
use parking_lot::Mutex;
use std::{fmt, sync::Arc};
#[cfg(feature = "tracing")]
use tracing::{error, warn};
use url::form_urlencoded;

/// Default origin of the auth backend that performs the OAuth exchange.
pub const DEFAULT_AUTH_ORIGIN: &str = "http://localhost:5000";

/// Path navigated to after every resolution.
const DEFAULT_LANDING_PATH: &str = "/";

/// Query parameter the backend uses to hand the token back.
const TOKEN_QUERY_PARAM: &str = "token";

/// UI mode of the page: exactly one of anonymous or authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    /// No usable session; show the provider login buttons.
    #[default]
    Anonymous,
    /// A token decoded successfully; show the profile card.
    Authenticated(UserProfile),
}

impl ViewState {
    /// The decoded profile, when authenticated.
    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            ViewState::Anonymous => None,
            ViewState::Authenticated(profile) => Some(profile),
        }
    }
}

/// External OAuth provider the backend can log a user in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    Facebook,
}

impl Provider {
    /// Backend path that starts this provider's OAuth exchange.
    pub fn auth_path(&self) -> &'static str {
        match self {
            Provider::Google => "/auth/google",
            Provider::Facebook => "/auth/facebook",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Google => write!(f, "google"),
            Provider::Facebook => write!(f, "facebook"),
        }
    }
}

/// Options for creating a [`SessionClient`].
#[derive(Default, bon::Builder)]
#[builder(on(String, into))]
pub struct SessionClientCreateOptions {
    /// Storage for the token slot. Browser local storage when not provided
    /// (in-memory without the `wasm-js` feature).
    pub storage: Option<Box<dyn SessionStorage>>,

    /// Navigation capability. The browser window when not provided (a no-op
    /// without the `wasm-js` feature).
    pub navigator: Option<Box<dyn Navigator>>,

    /// Origin of the auth backend. [`DEFAULT_AUTH_ORIGIN`] when not provided.
    pub auth_origin: Option<String>,

    /// Path navigated to after every resolution. `/` when not provided.
    pub landing_path: Option<String>,

    /// Callback executed after every resolution and logout.
    #[builder(into)]
    pub on_state_change: Option<OnStateChange>,
}

struct SessionClientInner {
    state: Mutex<ViewState>,
    storage: Mutex<Box<dyn SessionStorage>>,
    navigator: Box<dyn Navigator>,
    auth_origin: String,
    landing_path: String,
    on_state_change: Option<OnStateChange>,
}

impl fmt::Debug for SessionClientInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClientInner")
            .field("state", &self.state)
            .field("auth_origin", &self.auth_origin)
            .field("landing_path", &self.landing_path)
            .finish()
    }
}

/// The tool for bootstrapping and managing the page's session.
///
/// It resolves the view state once per page load from the token sources (URL
/// query parameter, then storage), and provides the login-redirect and
/// logout operations. Cheap to clone; clones share state.
#[derive(Clone, Debug)]
pub struct SessionClient(Arc<SessionClientInner>);

impl SessionClient {
    /// Creates a new [`SessionClient`] with default options: browser local
    /// storage and browser navigation.
    #[cfg(feature = "wasm-js")]
    pub fn new() -> Self {
        Self::new_with_options(SessionClientCreateOptions::default())
    }

    /// Creates a new [`SessionClient`] with the provided options.
    pub fn new_with_options(options: SessionClientCreateOptions) -> Self {
        let SessionClientCreateOptions {
            storage,
            navigator,
            auth_origin,
            landing_path,
            on_state_change,
        } = options;

        SessionClient(Arc::new(SessionClientInner {
            state: Mutex::new(ViewState::Anonymous),
            storage: Mutex::new(storage.unwrap_or_else(default_storage)),
            navigator: navigator.unwrap_or_else(default_navigator),
            auth_origin: auth_origin.unwrap_or_else(|| DEFAULT_AUTH_ORIGIN.to_owned()),
            landing_path: landing_path.unwrap_or_else(|| DEFAULT_LANDING_PATH.to_owned()),
            on_state_change,
        }))
    }

    /// Resolves the session once for this page load, reading the query
    /// string from the browser's current location.
    #[cfg(feature = "wasm-js")]
    pub fn resolve(&self) -> ViewState {
        let search = gloo_utils::window().location().search().unwrap_or_default();
        self.resolve_from_query(&search)
    }

    /// Resolves the session once, given the navigation URL's query string
    /// (with or without the leading `?`).
    ///
    /// A non-empty `token` parameter wins and is persisted, overwriting any
    /// prior value; otherwise the stored token is used. A token that fails
    /// to decode is deleted from storage. The landing path is navigated to
    /// in every case: success, failure, or absence.
    pub fn resolve_from_query(&self, query: &str) -> ViewState {
        let active = match token_from_query(query) {
            Some(token) => {
                if let Err(_e) = self.0.storage.lock().set(KEY_SESSION_TOKEN, &token) {
                    #[cfg(feature = "tracing")]
                    warn!("could not persist session token: {_e}");
                }
                Some(token)
            }
            None => match self.0.storage.lock().get(KEY_SESSION_TOKEN) {
                Ok(stored) => stored,
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    warn!("could not read session token: {_e}");
                    None
                }
            },
        };

        let state = match active {
            Some(token) => match token::decode_profile(&token) {
                Ok(profile) => ViewState::Authenticated(profile),
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    error!("invalid session token: {_e}");
                    if let Err(_e) = self.0.storage.lock().remove(KEY_SESSION_TOKEN) {
                        #[cfg(feature = "tracing")]
                        warn!("could not delete invalid session token: {_e}");
                    }
                    ViewState::Anonymous
                }
            },
            None => ViewState::Anonymous,
        };

        self.set_state(state.clone());
        self.0.navigator.go_to(&self.0.landing_path);
        state
    }

    /// The current view state.
    pub fn view_state(&self) -> ViewState {
        self.0.state.lock().clone()
    }

    /// Whether a profile was decoded for this page load.
    pub fn is_authenticated(&self) -> bool {
        matches!(*self.0.state.lock(), ViewState::Authenticated(_))
    }

    /// Starts the OAuth exchange with `provider`: an unconditional full-page
    /// redirect to the auth backend.
    ///
    /// No local state changes and no completion confirmation; the backend
    /// redirecting back with a `token` parameter is what re-enters
    /// resolution.
    pub fn login(&self, provider: Provider) {
        let url = format!("{}{}", self.0.auth_origin, provider.auth_path());
        self.0.navigator.go_to(&url);
    }

    /// Logs the user out: deletes the stored token and returns the page to
    /// the anonymous state. No navigation.
    pub fn logout(&self) {
        if let Err(_e) = self.0.storage.lock().remove(KEY_SESSION_TOKEN) {
            #[cfg(feature = "tracing")]
            warn!("could not delete session token on logout: {_e}");
        }
        self.set_state(ViewState::Anonymous);
    }

    fn set_state(&self, state: ViewState) {
        *self.0.state.lock() = state.clone();
        if let Some(on_state_change) = &self.0.on_state_change {
            // try_lock so a callback that re-enters the client cannot deadlock.
            if let Some(mut callback) = on_state_change.0.try_lock() {
                (*callback)(state);
            } else {
                #[cfg(feature = "tracing")]
                warn!("state-change callback is busy; notification skipped");
            }
        }
    }
}

#[cfg(feature = "wasm-js")]
impl Default for SessionClient {
    fn default() -> Self {
        Self::new()
    }
}

fn default_storage() -> Box<dyn SessionStorage> {
    #[cfg(feature = "wasm-js")]
    {
        Box::new(crate::storage::LocalStorage::new())
    }
    #[cfg(not(feature = "wasm-js"))]
    {
        Box::new(crate::storage::MemoryStorage::new())
    }
}

fn default_navigator() -> Box<dyn Navigator> {
    #[cfg(feature = "wasm-js")]
    {
        Box::new(crate::navigator::BrowserNavigator::new())
    }
    #[cfg(not(feature = "wasm-js"))]
    {
        Box::new(crate::navigator::NoopNavigator)
    }
}

/// Extracts a usable `token` parameter from a query string. An empty value
/// counts as absent and falls through to storage.
fn token_from_query(query: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .find(|(name, value)| name == TOKEN_QUERY_PARAM && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use serde_json::json;

    #[derive(Debug, Default, Clone)]
    struct RecordingNavigator(Arc<Mutex<Vec<String>>>);

    impl RecordingNavigator {
        fn visited(&self) -> Vec<String> {
            self.0.lock().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn go_to(&self, location: &str) {
            self.0.lock().push(location.to_owned());
        }
    }

    fn forge_token(claims: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        format!("{header}.{payload}.forged-signature")
    }

    fn jane_token() -> String {
        forge_token(json!({
            "displayName": "Jane Doe",
            "email": "jane@x.com",
            "photo": "",
        }))
    }

    fn client_with(storage: MemoryStorage, navigator: RecordingNavigator) -> SessionClient {
        SessionClient::new_with_options(
            SessionClientCreateOptions::builder()
                .storage(Box::new(storage))
                .navigator(Box::new(navigator))
                .build(),
        )
    }

    #[test]
    fn url_token_authenticates_and_persists() {
        let storage = MemoryStorage::new();
        let navigator = RecordingNavigator::default();
        let client = client_with(storage.clone(), navigator.clone());
        let token = jane_token();

        let state = client.resolve_from_query(&format!("?token={token}"));

        let profile = state.profile().expect("should be authenticated");
        assert_eq!(profile.display_name, "Jane Doe");
        assert_eq!(profile.email, "jane@x.com");
        assert_eq!(profile.avatar_url(), crate::token::DEFAULT_AVATAR);
        assert_eq!(
            storage.clone().get(KEY_SESSION_TOKEN).unwrap().as_deref(),
            Some(token.as_str())
        );
        assert_eq!(navigator.visited(), vec!["/".to_owned()]);
        assert!(client.is_authenticated());
    }

    #[test]
    fn stored_token_authenticates_without_url_parameter() {
        let storage = MemoryStorage::new();
        storage.clone().set(KEY_SESSION_TOKEN, &jane_token()).unwrap();
        let navigator = RecordingNavigator::default();
        let client = client_with(storage, navigator.clone());

        let state = client.resolve_from_query("");

        assert!(state.profile().is_some());
        assert_eq!(navigator.visited(), vec!["/".to_owned()]);
    }

    #[test]
    fn malformed_url_token_is_deleted() {
        let storage = MemoryStorage::new();
        let navigator = RecordingNavigator::default();
        let client = client_with(storage.clone(), navigator.clone());

        let state = client.resolve_from_query("?token=not-a-token");

        assert_eq!(state, ViewState::Anonymous);
        assert_eq!(storage.clone().get(KEY_SESSION_TOKEN).unwrap(), None);
        assert_eq!(navigator.visited(), vec!["/".to_owned()]);
    }

    #[test]
    fn malformed_stored_token_is_deleted() {
        let storage = MemoryStorage::new();
        storage.clone().set(KEY_SESSION_TOKEN, "not-a-token").unwrap();
        let navigator = RecordingNavigator::default();
        let client = client_with(storage.clone(), navigator.clone());

        let state = client.resolve_from_query("");

        assert_eq!(state, ViewState::Anonymous);
        assert_eq!(storage.clone().get(KEY_SESSION_TOKEN).unwrap(), None);
        assert_eq!(navigator.visited(), vec!["/".to_owned()]);
    }

    #[test]
    fn no_token_anywhere_stays_anonymous() {
        let storage = MemoryStorage::new();
        let navigator = RecordingNavigator::default();
        let client = client_with(storage.clone(), navigator.clone());

        let state = client.resolve_from_query("?foo=bar");

        assert_eq!(state, ViewState::Anonymous);
        assert_eq!(storage.clone().get(KEY_SESSION_TOKEN).unwrap(), None);
        assert_eq!(navigator.visited(), vec!["/".to_owned()]);
        assert!(!client.is_authenticated());
    }

    #[test]
    fn url_token_overwrites_stored_token() {
        let storage = MemoryStorage::new();
        storage.clone().set(KEY_SESSION_TOKEN, &jane_token()).unwrap();
        let navigator = RecordingNavigator::default();
        let client = client_with(storage.clone(), navigator.clone());
        let fresh = forge_token(json!({
            "displayName": "John Roe",
            "email": "john@x.com",
        }));

        let state = client.resolve_from_query(&format!("?token={fresh}"));

        assert_eq!(state.profile().unwrap().display_name, "John Roe");
        assert_eq!(
            storage.clone().get(KEY_SESSION_TOKEN).unwrap().as_deref(),
            Some(fresh.as_str())
        );
    }

    #[test]
    fn empty_url_token_falls_back_to_storage() {
        let storage = MemoryStorage::new();
        storage.clone().set(KEY_SESSION_TOKEN, &jane_token()).unwrap();
        let navigator = RecordingNavigator::default();
        let client = client_with(storage.clone(), navigator);

        let state = client.resolve_from_query("?token=");

        assert_eq!(state.profile().unwrap().email, "jane@x.com");
        assert!(storage.clone().get(KEY_SESSION_TOKEN).unwrap().is_some());
    }

    #[test]
    fn logout_clears_storage_without_navigating() {
        let storage = MemoryStorage::new();
        let navigator = RecordingNavigator::default();
        let client = client_with(storage.clone(), navigator.clone());
        client.resolve_from_query(&format!("?token={}", jane_token()));
        assert!(client.is_authenticated());

        client.logout();

        assert!(!client.is_authenticated());
        assert_eq!(client.view_state(), ViewState::Anonymous);
        assert_eq!(storage.clone().get(KEY_SESSION_TOKEN).unwrap(), None);
        // Only the resolution navigated; logout must not.
        assert_eq!(navigator.visited().len(), 1);
    }

    #[test]
    fn logout_from_anonymous_is_harmless() {
        let storage = MemoryStorage::new();
        let navigator = RecordingNavigator::default();
        let client = client_with(storage.clone(), navigator);

        client.logout();

        assert_eq!(client.view_state(), ViewState::Anonymous);
        assert_eq!(storage.clone().get(KEY_SESSION_TOKEN).unwrap(), None);
    }

    #[test]
    fn login_redirects_to_the_provider_endpoint() {
        let storage = MemoryStorage::new();
        let navigator = RecordingNavigator::default();
        let client = client_with(storage.clone(), navigator.clone());

        client.login(Provider::Google);

        assert_eq!(
            navigator.visited(),
            vec!["http://localhost:5000/auth/google".to_owned()]
        );
        assert_eq!(client.view_state(), ViewState::Anonymous);
        assert_eq!(storage.clone().get(KEY_SESSION_TOKEN).unwrap(), None);
    }

    #[test]
    fn login_honors_a_custom_auth_origin() {
        let navigator = RecordingNavigator::default();
        let client = SessionClient::new_with_options(
            SessionClientCreateOptions::builder()
                .storage(Box::new(MemoryStorage::new()))
                .navigator(Box::new(navigator.clone()))
                .auth_origin("https://auth.example.com")
                .build(),
        );

        client.login(Provider::Facebook);

        assert_eq!(
            navigator.visited(),
            vec!["https://auth.example.com/auth/facebook".to_owned()]
        );
    }

    #[test]
    fn state_change_callback_fires_on_resolution_and_logout() {
        let seen: Arc<Mutex<Vec<ViewState>>> = Arc::default();
        let sink = seen.clone();
        let navigator = RecordingNavigator::default();
        let client = SessionClient::new_with_options(
            SessionClientCreateOptions::builder()
                .storage(Box::new(MemoryStorage::new()))
                .navigator(Box::new(navigator))
                .on_state_change(OnStateChange::from(move |state: ViewState| {
                    sink.lock().push(state)
                }))
                .build(),
        );

        client.resolve_from_query(&format!("?token={}", jane_token()));
        client.logout();

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].profile().is_some());
        assert_eq!(seen[1], ViewState::Anonymous);
    }

    #[test]
    fn query_parameter_parsing_handles_both_prefixes() {
        assert_eq!(token_from_query("?token=abc"), Some("abc".to_owned()));
        assert_eq!(token_from_query("token=abc"), Some("abc".to_owned()));
        assert_eq!(token_from_query("?token="), None);
        assert_eq!(token_from_query("?other=abc"), None);
        assert_eq!(token_from_query(""), None);
    }
}
