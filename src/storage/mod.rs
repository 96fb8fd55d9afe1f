use crate::domain::auth::TokenPair;
use crate::domain::user::UserIdentity;
use crate::error::Result;

pub mod file;
pub mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

/// Persistent mirror of the active session: two opaque token strings and
/// the cached identity, written and cleared as a unit.
///
/// Access is synchronous and local; each accessor reads the latest
/// persisted value.
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    fn user(&self) -> Option<UserIdentity>;

    /// Replaces all persisted fields with the given pair and identity.
    fn persist(&self, tokens: &TokenPair, user: &UserIdentity) -> Result<()>;

    /// Removes every persisted field.
    fn clear(&self) -> Result<()>;
}

/// On-disk layout of the persisted session. Field names are the fixed
/// keys the record is stored under.
#[derive(Debug, Default, Clone, serde::Serialize, serde::Deserialize)]
pub(crate) struct SessionRecord {
    pub(crate) access_token: Option<String>,
    pub(crate) refresh_token: Option<String>,
    pub(crate) user: Option<UserIdentity>,
}
