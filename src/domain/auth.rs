use crate::domain::user::UserIdentity;
use crate::error::{ClientError, Result};
use base64::Engine;
use time::OffsetDateTime;

/// Login input. Never persisted.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Signup input. Never persisted.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// A freshly issued token pair as returned by login/register/refresh.
///
/// Only the two token strings and the decoded identity are mirrored into
/// the session store; expiry and scheme stay with the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: OffsetDateTime,
    pub token_type: String,
}

/// Claim names the backend places identity fields under.
pub const CLAIM_ID: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";
pub const CLAIM_USERNAME: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";
pub const CLAIM_EMAIL: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress";
pub const CLAIM_ROLE: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";

/// Decodes the payload segment of a bearer token into a [`UserIdentity`].
///
/// The signature is NOT verified; the decoded identity is display-only
/// trust and the server re-checks the token on every request. Any
/// malformed segment, non-JSON payload or missing identity claim fails
/// the whole decode; a partially populated identity is never returned.
pub fn decode_identity(access_token: &str) -> Result<UserIdentity> {
    let payload = access_token
        .split('.')
        .nth(1)
        .ok_or_else(|| ClientError::Decode("token has no payload segment".to_string()))?;

    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ClientError::Decode(format!("payload is not base64url: {e}")))?;

    let claims: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::Decode(format!("payload is not valid JSON: {e}")))?;

    Ok(UserIdentity {
        id: required_claim(&claims, CLAIM_ID)?,
        username: required_claim(&claims, CLAIM_USERNAME)?,
        email: required_claim(&claims, CLAIM_EMAIL)?,
        last_login_time: None,
        roles: role_claim(&claims),
    })
}

fn required_claim(claims: &serde_json::Value, name: &str) -> Result<String> {
    claims
        .get(name)
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ClientError::Decode(format!("missing claim {name}")))
}

/// The role claim may be absent, a single string, or an array of strings.
fn role_claim(claims: &serde_json::Value) -> Option<Vec<String>> {
    match claims.get(CLAIM_ROLE)? {
        serde_json::Value::String(role) => Some(vec![role.clone()]),
        serde_json::Value::Array(roles) => Some(
            roles
                .iter()
                .filter_map(serde_json::Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}
