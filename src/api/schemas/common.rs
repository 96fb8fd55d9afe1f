use crate::error::{ClientError, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Response envelope every backend endpoint wraps its payload in.
///
/// `success: false` or a missing `data` field is an application-level
/// failure even when the HTTP status is 200.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T: DeserializeOwned> ApiEnvelope<T> {
    /// Reads and parses the envelope out of a response body.
    pub async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        response
            .json::<Self>()
            .await
            .map_err(|_| ClientError::Application(format!("malformed server response (HTTP {status})")))
    }
}

impl<T> ApiEnvelope<T> {
    /// Unwraps the payload, turning a reported failure into an
    /// [`ClientError::Application`] carrying the server's message.
    pub fn into_data(self, fallback: &str) -> Result<T> {
        match self {
            Self { success: true, data: Some(data), .. } => Ok(data),
            Self { message, .. } => {
                Err(ClientError::Application(message.unwrap_or_else(|| fallback.to_string())))
            }
        }
    }

    /// Like [`Self::into_data`], for endpoints whose success carries no
    /// payload.
    pub fn into_success(self, fallback: &str) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(ClientError::Application(self.message.unwrap_or_else(|| fallback.to_string())))
        }
    }
}
