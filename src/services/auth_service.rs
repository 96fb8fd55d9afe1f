use crate::api::schemas::auth::{Login, Refresh, Register, TokenResponse};
use crate::api::schemas::common::ApiEnvelope;
use crate::domain::auth::{Credentials, Registration, TokenPair, decode_identity};
use crate::domain::session::Session;
use crate::domain::user::UserIdentity;
use crate::error::{ClientError, Result};
use crate::routing::{Navigator, ROUTE_LOGIN};
use crate::services::notification_service::NotificationCenter;
use crate::services::session_state::SessionState;
use crate::storage::SessionStore;
use opentelemetry::{global, metrics::Counter};
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;

#[derive(Clone)]
struct Metrics {
    login_total: Counter<u64>,
    register_total: Counter<u64>,
    refresh_total: Counter<u64>,
    logout_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("storefront-client");
        Self {
            login_total: meter
                .u64_counter("auth_login_total")
                .with_description("Total number of successful logins")
                .build(),
            register_total: meter
                .u64_counter("auth_register_total")
                .with_description("Total number of successful registrations")
                .build(),
            refresh_total: meter
                .u64_counter("auth_refresh_total")
                .with_description("Total number of successful token rotations")
                .build(),
            logout_total: meter
                .u64_counter("auth_logout_total")
                .with_description("Total number of confirmed logouts")
                .build(),
        }
    }
}

/// Orchestrates login, registration, logout and refresh against the
/// backend. Sole writer of the session state and the session store; the
/// two are always updated together.
#[derive(Clone)]
pub struct AuthService {
    http: reqwest::Client,
    api_url: String,
    state: SessionState,
    store: Arc<dyn SessionStore>,
    notifications: Arc<NotificationCenter>,
    navigator: Arc<dyn Navigator>,
    metrics: Metrics,
}

impl AuthService {
    pub fn new(
        http: reqwest::Client,
        api_url: String,
        state: SessionState,
        store: Arc<dyn SessionStore>,
        notifications: Arc<NotificationCenter>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            http,
            api_url,
            state,
            store,
            notifications,
            navigator,
            metrics: Metrics::new(),
        }
    }

    #[tracing::instrument(
        skip(self, credentials),
        fields(email = %credentials.email),
        err(level = "warn")
    )]
    pub async fn login(&self, credentials: Credentials) -> Result<TokenPair> {
        let request = Login::from(credentials);
        let pair = match self.request_token_pair("/auth/login", &request, "Login failed").await {
            Ok(pair) => pair,
            Err(error) => return Err(self.surface(error)),
        };

        self.metrics.login_total.add(1, &[]);
        self.notifications.show_success("Login successful", None);
        Ok(pair)
    }

    #[tracing::instrument(
        skip(self, registration),
        fields(email = %registration.email, username = %registration.username),
        err(level = "warn")
    )]
    pub async fn register(&self, registration: Registration) -> Result<TokenPair> {
        let request = Register::from(registration);
        let pair =
            match self.request_token_pair("/auth/register", &request, "Registration failed").await {
                Ok(pair) => pair,
                Err(error) => return Err(self.surface(error)),
            };

        self.metrics.register_total.add(1, &[]);
        self.notifications.show_success("Registration successful", None);
        Ok(pair)
    }

    /// Ends the session on the server, then locally. The local session is
    /// only cleared once the server confirms; a failed logout leaves it
    /// in place for the caller to retry.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn logout(&self) -> Result<()> {
        let mut request = self.http.post(self.endpoint("/auth/logout"));
        if let Some(token) = self.state.access_token() {
            request = request.bearer_auth(token);
        }

        let confirmed: Result<()> = async {
            let response = request.send().await?;
            let envelope: ApiEnvelope<serde_json::Value> = ApiEnvelope::read(response).await?;
            envelope.into_success("Logout failed")
        }
        .await;

        if let Err(error) = confirmed {
            return Err(self.surface(error));
        }

        self.clear_session()?;
        self.metrics.logout_total.add(1, &[]);
        self.notifications.show_success("Logged out successfully", None);
        self.navigator.navigate(ROUTE_LOGIN, &[]);
        Ok(())
    }

    /// Trades the stored refresh token for a new pair. Fails immediately,
    /// without touching the network, when none is stored. On failure the
    /// session is left as-is and the caller decides whether to end it.
    #[tracing::instrument(skip(self), err(level = "debug"))]
    pub async fn refresh(&self) -> Result<TokenPair> {
        let Some(refresh_token) = self.store.refresh_token() else {
            return Err(ClientError::NoRefreshToken);
        };

        let request = Refresh { refresh_token };
        match self.request_token_pair("/auth/refresh-token", &request, "Token refresh failed").await
        {
            Ok(pair) => {
                tracing::info!("token pair rotated");
                self.metrics.refresh_total.add(1, &[]);
                Ok(pair)
            }
            Err(error) => Err(self.surface(error)),
        }
    }

    /// Synchronous read of the current identity; no I/O.
    pub fn current_user(&self) -> Option<UserIdentity> {
        self.state.current_user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn session_state(&self) -> &SessionState {
        &self.state
    }

    /// Drops the session after an unrecoverable 401. Store and state are
    /// cleared together; a store failure is logged, not propagated, so an
    /// expired session never lingers in memory.
    pub(crate) fn expire_session(&self) {
        if let Err(error) = self.clear_session() {
            tracing::warn!(%error, "failed to clear session store");
        }
    }

    async fn request_token_pair<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<TokenPair> {
        let response = self.http.post(self.endpoint(path)).json(body).send().await?;
        let envelope: ApiEnvelope<TokenResponse> = ApiEnvelope::read(response).await?;
        let pair = TokenPair::from(envelope.into_data(fallback)?);
        self.install_session(&pair)?;
        Ok(pair)
    }

    /// Decodes the identity and commits the new session to store and
    /// state. Decode failure aborts before anything is written, so a bad
    /// token can never displace a working session.
    fn install_session(&self, pair: &TokenPair) -> Result<()> {
        let user = decode_identity(&pair.access_token)?;

        if pair.expires_at < OffsetDateTime::now_utc() {
            tracing::debug!("freshly issued access token is already expired");
        }

        self.store.persist(pair, &user)?;
        self.state.replace(Session { access_token: pair.access_token.clone(), user });
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        self.store.clear()?;
        self.state.clear();
        Ok(())
    }

    /// Pushes the error at the user before handing it back. A missing
    /// refresh token is the one silent case: it short-circuits before any
    /// request and its consequences get announced by the caller.
    fn surface(&self, error: ClientError) -> ClientError {
        if !matches!(error, ClientError::NoRefreshToken) {
            self.notifications.show_error(&error.to_string(), None);
        }
        error
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_url.trim_end_matches('/'))
    }
}
