use thiserror::Error;

/// Failure taxonomy for every client operation.
///
/// Services normalize whatever goes wrong into one of these variants and
/// surface the `Display` message through the notification center, so the
/// message text is what an end user sees.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure: DNS, connect, TLS, or a broken body.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The server rejected the credentials attached to a request (401).
    #[error("session expired, please log in again")]
    Unauthorized,
    /// The server answered, but reported failure (`success: false` or a
    /// missing payload), possibly on an HTTP 200.
    #[error("{0}")]
    Application(String),
    /// The access token payload could not be decoded into an identity.
    #[error("invalid token: {0}")]
    Decode(String),
    /// A refresh was attempted with nothing in the session store.
    #[error("no refresh token available")]
    NoRefreshToken,
    /// The local session store could not be read or written.
    #[error("session storage error: {0}")]
    Storage(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
