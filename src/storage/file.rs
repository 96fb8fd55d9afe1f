use super::{SessionRecord, SessionStore};
use crate::domain::auth::TokenPair;
use crate::domain::user::UserIdentity;
use crate::error::Result;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Session store backed by a single JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> SessionRecord {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return SessionRecord::default(),
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "failed to read session file");
                return SessionRecord::default();
            }
        };

        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!(error = %e, path = %self.path.display(), "session file is corrupt, treating as absent");
            SessionRecord::default()
        })
    }

    fn write(&self, record: &SessionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn access_token(&self) -> Option<String> {
        self.read().access_token
    }

    fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token
    }

    fn user(&self) -> Option<UserIdentity> {
        self.read().user
    }

    fn persist(&self, tokens: &TokenPair, user: &UserIdentity) -> Result<()> {
        self.write(&SessionRecord {
            access_token: Some(tokens.access_token.clone()),
            refresh_token: Some(tokens.refresh_token.clone()),
            user: Some(user.clone()),
        })
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
