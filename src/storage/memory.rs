use super::{SessionRecord, SessionStore};
use crate::domain::auth::TokenPair;
use crate::domain::user::UserIdentity;
use crate::error::Result;
use std::sync::Mutex;

/// In-memory session store for tests and embedding without a filesystem.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    record: Mutex<SessionRecord>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds arbitrary field combinations, including ones `persist` can
    /// never produce (e.g. an access token with no refresh token).
    pub fn seed(
        &self,
        access_token: Option<String>,
        refresh_token: Option<String>,
        user: Option<UserIdentity>,
    ) {
        let mut record = self.record.lock().expect("session store poisoned");
        *record = SessionRecord { access_token, refresh_token, user };
    }
}

impl SessionStore for MemorySessionStore {
    fn access_token(&self) -> Option<String> {
        self.record.lock().expect("session store poisoned").access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.record.lock().expect("session store poisoned").refresh_token.clone()
    }

    fn user(&self) -> Option<UserIdentity> {
        self.record.lock().expect("session store poisoned").user.clone()
    }

    fn persist(&self, tokens: &TokenPair, user: &UserIdentity) -> Result<()> {
        self.seed(
            Some(tokens.access_token.clone()),
            Some(tokens.refresh_token.clone()),
            Some(user.clone()),
        );
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.seed(None, None, None);
        Ok(())
    }
}
