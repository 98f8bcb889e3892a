//! State-change callback handler for the session client.

use crate::session::ViewState;
use parking_lot::Mutex;
use std::sync::Arc;

pub(crate) type OnStateChangeInner = Box<dyn FnMut(ViewState) + Send>;

/// The callback executed after every resolution and logout, with the
/// [`ViewState`] that is now current.
///
/// # Usage
/// ```
/// use oauth_session_client::OnStateChange;
///
/// let on_state_change = OnStateChange::from(|state| {
///     // Push the new state into the UI layer
///     let _ = state;
/// });
/// ```
#[derive(Clone)]
pub struct OnStateChange(pub(crate) Arc<Mutex<OnStateChangeInner>>);

impl<F> From<F> for OnStateChange
where
    F: FnMut(ViewState) + Send + 'static,
{
    fn from(f: F) -> Self {
        OnStateChange(Arc::new(Mutex::new(Box::new(f))))
    }
}
