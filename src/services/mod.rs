use crate::api::ApiClient;
use crate::config::Config;
use crate::error::Result;
use crate::routing::{Navigator, RouteGuard};
use crate::storage::SessionStore;
use std::sync::Arc;

pub mod auth_service;
pub mod notification_service;
pub mod product_service;
pub mod session_state;

use auth_service::AuthService;
use notification_service::NotificationCenter;
use product_service::ProductService;
use session_state::SessionState;

/// Wires the whole client together: one HTTP connection pool, one
/// observable session hydrated from the store, and the services that
/// share them.
#[derive(Clone)]
pub struct ServiceContainer {
    pub session_state: SessionState,
    pub notifications: Arc<NotificationCenter>,
    pub auth_service: Arc<AuthService>,
    pub api: Arc<ApiClient>,
    pub product_service: ProductService,
}

impl ServiceContainer {
    pub fn new(
        config: &Config,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        let notifications = Arc::new(NotificationCenter::new(&config.notifications));
        let session_state = SessionState::hydrate(store.as_ref());

        let auth_service = Arc::new(AuthService::new(
            http.clone(),
            config.api_url.clone(),
            session_state.clone(),
            store,
            Arc::clone(&notifications),
            Arc::clone(&navigator),
        ));

        let api = Arc::new(ApiClient::new(
            http,
            config.api_url.clone(),
            Arc::clone(&auth_service),
            Arc::clone(&notifications),
            navigator,
        ));

        let product_service = ProductService::new(Arc::clone(&api), Arc::clone(&notifications));

        Ok(Self { session_state, notifications, auth_service, api, product_service })
    }

    pub fn route_guard(&self) -> RouteGuard {
        RouteGuard::new(self.session_state.clone(), Arc::clone(&self.notifications))
    }
}
