use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Identity derived from the access token's payload.
///
/// Cached in the session store alongside the tokens so it survives a
/// restart without re-decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_login_time: Option<OffsetDateTime>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}
