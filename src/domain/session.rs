use crate::domain::user::UserIdentity;

/// An authenticated session: the access token currently attached to
/// requests and the identity decoded from it. Constructed whole, so a
/// token is never held without its identity or vice versa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user: UserIdentity,
}
