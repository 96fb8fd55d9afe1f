use crate::domain::session::Session;
use crate::domain::user::UserIdentity;
use crate::storage::SessionStore;
use std::sync::Arc;
use tokio::sync::watch;

/// Process-wide observable session.
///
/// Holds `Some(Session)` while authenticated, `None` otherwise; observers
/// see the latest value only (last-write-wins, no buffering). All writes
/// go through the auth service; the mutators are crate-private.
#[derive(Debug, Clone)]
pub struct SessionState {
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl SessionState {
    pub fn empty() -> Self {
        Self { tx: Arc::new(watch::Sender::new(None)) }
    }

    /// Reads the persisted session once at startup. A cached token and
    /// identity are trusted as-is: no network round-trip and no expiry
    /// check until the first 401 proves them stale.
    pub fn hydrate(store: &dyn SessionStore) -> Self {
        let initial = match (store.access_token(), store.user()) {
            (Some(access_token), Some(user)) => {
                tracing::debug!(username = %user.username, "session restored from store");
                Some(Session { access_token, user })
            }
            _ => None,
        };

        Self { tx: Arc::new(watch::Sender::new(initial)) }
    }

    /// Watch the session for changes; the receiver always starts at the
    /// current value.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn current_user(&self) -> Option<UserIdentity> {
        self.tx.borrow().as_ref().map(|s| s.user.clone())
    }

    pub fn access_token(&self) -> Option<String> {
        self.tx.borrow().as_ref().map(|s| s.access_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub(crate) fn replace(&self, session: Session) {
        self.tx.send_replace(Some(session));
    }

    pub(crate) fn clear(&self) {
        self.tx.send_replace(None);
    }
}
