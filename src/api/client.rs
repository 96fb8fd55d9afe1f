use crate::error::{ClientError, Result};
use crate::routing::{Navigator, ROUTE_LOGIN};
use crate::services::auth_service::AuthService;
use crate::services::notification_service::NotificationCenter;
use crate::services::session_state::SessionState;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, Request, RequestBuilder, Response, StatusCode, Url};
use std::sync::Arc;

/// Endpoints that must go out without credentials.
const PUBLIC_ENDPOINTS: [&str; 2] = ["/auth/login", "/auth/register"];

/// Authorizing wrapper around the HTTP client.
///
/// Every request leaving through here gets the current access token as a
/// bearer credential (public endpoints excepted) and a single
/// refresh-and-retry when the server answers 401. An unrecoverable 401
/// ends the session: store and state are cleared, the user is told, and
/// navigation heads back to the login page.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_url: String,
    public_paths: Vec<String>,
    auth: Arc<AuthService>,
    state: SessionState,
    notifications: Arc<NotificationCenter>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        http: reqwest::Client,
        api_url: String,
        auth: Arc<AuthService>,
        notifications: Arc<NotificationCenter>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let base_path = Url::parse(&api_url)
            .map(|url| url.path().trim_end_matches('/').to_string())
            .unwrap_or_default();
        let public_paths =
            PUBLIC_ENDPOINTS.iter().map(|endpoint| format!("{base_path}{endpoint}")).collect();

        let state = auth.session_state().clone();
        Self { http, api_url, public_paths, auth, state, notifications, navigator }
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.request(Method::PUT, path)
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.request(Method::DELETE, path)
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.endpoint(path))
    }

    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build()?;
        self.execute(request).await
    }

    /// Sends one request through the authorization pipeline.
    #[tracing::instrument(
        skip(self, request),
        fields(method = %request.method(), path = %request.url().path())
    )]
    pub async fn execute(&self, mut request: Request) -> Result<Response> {
        let public = self.is_public(request.url());

        if !public {
            if let Some(token) = self.state.access_token() {
                attach_bearer(&mut request, &token);
            }
        }

        // One shot at a replay; streaming bodies cannot be cloned.
        let retry_request = request.try_clone();

        let response = self.http.execute(request).await?;

        if response.status() == StatusCode::UNAUTHORIZED && !public {
            return self.refresh_and_retry(retry_request).await;
        }

        Ok(response)
    }

    /// The 401 path: refresh once, replay once. A failed refresh ends the
    /// session and the original failure propagates as `Unauthorized`.
    async fn refresh_and_retry(&self, retry_request: Option<Request>) -> Result<Response> {
        match self.auth.refresh().await {
            Ok(pair) => {
                let Some(mut request) = retry_request else {
                    tracing::warn!("request body cannot be replayed after refresh");
                    return Err(ClientError::Unauthorized);
                };

                attach_bearer(&mut request, &pair.access_token);
                tracing::debug!("retrying request with rotated token");
                Ok(self.http.execute(request).await?)
            }
            Err(error) => {
                tracing::debug!(%error, "token refresh failed, ending session");
                self.auth.expire_session();
                self.notifications.show_error("Session expired. Please log in again.", None);
                self.navigator.navigate(ROUTE_LOGIN, &[]);
                Err(ClientError::Unauthorized)
            }
        }
    }

    fn is_public(&self, url: &Url) -> bool {
        self.public_paths.iter().any(|path| url.path() == path)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_url.trim_end_matches('/'))
    }
}

fn attach_bearer(request: &mut Request, token: &str) {
    match HeaderValue::from_str(&format!("Bearer {token}")) {
        Ok(value) => {
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Err(error) => {
            tracing::warn!(%error, "access token is not a valid header value, sending without it");
        }
    }
}
