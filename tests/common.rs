#![allow(dead_code)]

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use storefront_client::api::schemas::product::{Product, ProductImage};
use storefront_client::config::{
    Config, LogFormat, NotificationConfig, SessionConfig, TelemetryConfig,
};
use storefront_client::domain::auth::{CLAIM_EMAIL, CLAIM_ID, CLAIM_USERNAME};
use storefront_client::routing::Navigator;
use storefront_client::services::ServiceContainer;
use storefront_client::storage::{MemorySessionStore, SessionStore};
use time::OffsetDateTime;
use uuid::Uuid;

const JWT_SECRET: &[u8] = b"integration-test-secret";
const ACCESS_TTL_SECS: i64 = 900;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("storefront_client=debug".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

#[derive(Debug, Clone)]
pub struct MockUser {
    pub username: String,
    pub password: String,
}

/// In-memory stand-in for the storefront backend.
#[derive(Debug, Default)]
pub struct MockState {
    pub users: Mutex<HashMap<String, MockUser>>,
    /// Valid refresh tokens, keyed to the email they were issued for.
    pub refresh_tokens: Mutex<HashMap<String, String>>,
    /// Access tokens the server no longer accepts, despite a valid exp.
    pub revoked_access: Mutex<Vec<String>>,
    pub products: Mutex<Vec<Product>>,
    pub images: Mutex<HashMap<String, Vec<ProductImage>>>,

    pub fail_logout: AtomicBool,
    pub fail_refresh: AtomicBool,

    pub login_calls: AtomicUsize,
    pub register_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub ping_calls: AtomicUsize,
    /// Whether the last login request carried an Authorization header.
    pub login_saw_authorization: AtomicBool,
    /// Bearer token seen by the most recent ping.
    pub last_ping_token: Mutex<Option<String>>,
}

impl MockState {
    pub fn add_user(&self, email: &str, username: &str, password: &str) {
        self.users.lock().unwrap().insert(
            email.to_string(),
            MockUser { username: username.to_string(), password: password.to_string() },
        );
    }

    pub fn add_product(&self, product: Product) {
        self.products.lock().unwrap().push(product);
    }

    pub fn revoke_access_token(&self, token: &str) {
        self.revoked_access.lock().unwrap().push(token.to_string());
    }

    pub fn mint_access_token(&self, email: &str, username: &str) -> String {
        let exp = OffsetDateTime::now_utc().unix_timestamp() + ACCESS_TTL_SECS;
        let claims = json!({
            CLAIM_ID: Uuid::new_v4().to_string(),
            CLAIM_USERNAME: username,
            CLAIM_EMAIL: email,
            "exp": exp,
        });
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(JWT_SECRET),
        )
        .expect("token encoding cannot fail")
    }

    fn issue_pair(&self, email: &str, username: &str) -> Value {
        let access_token = self.mint_access_token(email, username);
        let refresh_token = format!("refresh-{}", Uuid::new_v4());
        self.refresh_tokens.lock().unwrap().insert(refresh_token.clone(), email.to_string());

        let expires_at = OffsetDateTime::now_utc() + time::Duration::seconds(ACCESS_TTL_SECS);
        json!({
            "accessToken": access_token,
            "refreshToken": refresh_token,
            "expiresAt": expires_at
                .format(&time::format_description::well_known::Rfc3339)
                .expect("rfc3339 formatting cannot fail"),
            "tokenType": "Bearer",
        })
    }

    fn bearer_identity(&self, headers: &HeaderMap) -> Option<(String, String)> {
        let token = bearer_token(headers)?;
        if self.revoked_access.lock().unwrap().contains(&token) {
            return None;
        }

        let decoded = jsonwebtoken::decode::<Value>(
            &token,
            &jsonwebtoken::DecodingKey::from_secret(JWT_SECRET),
            &jsonwebtoken::Validation::default(),
        )
        .ok()?;
        let email = decoded.claims.get(CLAIM_EMAIL)?.as_str()?.to_string();
        let username = decoded.claims.get(CLAIM_USERNAME)?.as_str()?.to_string();
        Some((email, username))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn ok_envelope<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data, "message": null }))
}

fn fail_envelope(message: &str) -> Json<Value> {
    Json(json!({ "success": false, "data": null, "message": message }))
}

async fn login(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.login_calls.fetch_add(1, Ordering::SeqCst);
    state
        .login_saw_authorization
        .store(headers.contains_key(header::AUTHORIZATION), Ordering::SeqCst);

    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();

    let user = state.users.lock().unwrap().get(&email).cloned();
    match user {
        Some(user) if user.password == password => {
            (StatusCode::OK, ok_envelope(state.issue_pair(&email, &user.username)))
        }
        _ => (StatusCode::UNAUTHORIZED, fail_envelope("Invalid email or password")),
    }
}

async fn register(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.register_calls.fetch_add(1, Ordering::SeqCst);

    let email = body["email"].as_str().unwrap_or_default().to_string();
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();

    let mut users = state.users.lock().unwrap();
    if users.contains_key(&email) {
        return (StatusCode::CONFLICT, fail_envelope("Email already registered"));
    }
    users.insert(email.clone(), MockUser { username: username.clone(), password });
    drop(users);

    (StatusCode::CREATED, ok_envelope(state.issue_pair(&email, &username)))
}

async fn logout(State(state): State<Arc<MockState>>) -> (StatusCode, Json<Value>) {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);

    if state.fail_logout.load(Ordering::SeqCst) {
        return (StatusCode::OK, fail_envelope("Logout failed upstream"));
    }
    (StatusCode::OK, ok_envelope(Value::Null))
}

async fn refresh(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    if state.fail_refresh.load(Ordering::SeqCst) {
        return (StatusCode::UNAUTHORIZED, fail_envelope("Invalid refresh token"));
    }

    let presented = body["refreshToken"].as_str().unwrap_or_default().to_string();
    let email = state.refresh_tokens.lock().unwrap().remove(&presented);
    match email {
        Some(email) => {
            let username = state
                .users
                .lock()
                .unwrap()
                .get(&email)
                .map_or_else(|| "unknown".to_string(), |u| u.username.clone());
            (StatusCode::OK, ok_envelope(state.issue_pair(&email, &username)))
        }
        None => (StatusCode::UNAUTHORIZED, fail_envelope("Invalid refresh token")),
    }
}

async fn ping(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.ping_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_ping_token.lock().unwrap() = bearer_token(&headers);

    match state.bearer_identity(&headers) {
        Some(_) => (StatusCode::OK, ok_envelope(json!({ "pong": true }))),
        None => (StatusCode::UNAUTHORIZED, fail_envelope("Unauthorized")),
    }
}

/// Reports what authorization the request carried, without requiring any.
async fn echo_auth(headers: HeaderMap) -> Json<Value> {
    ok_envelope(json!({
        "hasAuthorization": headers.contains_key(header::AUTHORIZATION),
        "token": bearer_token(&headers),
    }))
}

async fn server_error() -> (StatusCode, Json<Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, fail_envelope("Something broke"))
}

async fn list_products(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if state.bearer_identity(&headers).is_none() {
        return (StatusCode::UNAUTHORIZED, fail_envelope("Unauthorized"));
    }
    let products = state.products.lock().unwrap().clone();
    (StatusCode::OK, ok_envelope(products))
}

async fn get_product(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let product = state.products.lock().unwrap().iter().find(|p| p.id == id).cloned();
    match product {
        Some(product) => (StatusCode::OK, ok_envelope(product)),
        None => (StatusCode::NOT_FOUND, fail_envelope("Product not found")),
    }
}

async fn get_product_by_code(
    State(state): State<Arc<MockState>>,
    Path(code): Path<String>,
) -> (StatusCode, Json<Value>) {
    let product =
        state.products.lock().unwrap().iter().find(|p| p.product_code == code).cloned();
    match product {
        Some(product) => (StatusCode::OK, ok_envelope(product)),
        None => (StatusCode::NOT_FOUND, fail_envelope("Product not found")),
    }
}

async fn products_by_category(
    State(state): State<Arc<MockState>>,
    Path(category): Path<String>,
) -> (StatusCode, Json<Value>) {
    let products: Vec<Product> = state
        .products
        .lock()
        .unwrap()
        .iter()
        .filter(|p| p.category == category)
        .cloned()
        .collect();
    (StatusCode::OK, ok_envelope(products))
}

async fn create_product(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if state.bearer_identity(&headers).is_none() {
        return (StatusCode::UNAUTHORIZED, fail_envelope("Unauthorized"));
    }

    let product = Product {
        id: Uuid::new_v4().to_string(),
        category: body["category"].as_str().unwrap_or_default().to_string(),
        product_code: body["productCode"].as_str().unwrap_or_default().to_string(),
        name: body["name"].as_str().unwrap_or_default().to_string(),
        price: body["price"].as_f64().unwrap_or_default(),
        minimum_quantity: body["minimumQuantity"].as_i64().unwrap_or_default() as i32,
        discount_rate: body["discountRate"].as_f64().unwrap_or_default(),
        created_at: OffsetDateTime::now_utc(),
        images: Vec::new(),
    };
    state.add_product(product.clone());
    (StatusCode::CREATED, ok_envelope(product))
}

async fn update_product(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut products = state.products.lock().unwrap();
    let Some(product) = products.iter_mut().find(|p| p.id == id) else {
        return (StatusCode::NOT_FOUND, fail_envelope("Product not found"));
    };

    product.category = body["category"].as_str().unwrap_or_default().to_string();
    product.product_code = body["productCode"].as_str().unwrap_or_default().to_string();
    product.name = body["name"].as_str().unwrap_or_default().to_string();
    product.price = body["price"].as_f64().unwrap_or_default();
    product.minimum_quantity = body["minimumQuantity"].as_i64().unwrap_or_default() as i32;
    product.discount_rate = body["discountRate"].as_f64().unwrap_or_default();

    (StatusCode::OK, ok_envelope(product.clone()))
}

async fn delete_product(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let mut products = state.products.lock().unwrap();
    let before = products.len();
    products.retain(|p| p.id != id);
    if products.len() == before {
        return (StatusCode::NOT_FOUND, fail_envelope("Product not found"));
    }
    (StatusCode::OK, ok_envelope(Value::Null))
}

async fn list_images(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let images = state.images.lock().unwrap().get(&id).cloned().unwrap_or_default();
    (StatusCode::OK, ok_envelope(images))
}

async fn upload_image(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("imageFile") {
            let file_name = field.file_name().map(str::to_string);
            let Ok(bytes) = field.bytes().await else {
                return (StatusCode::BAD_REQUEST, fail_envelope("Unreadable upload"));
            };
            if bytes.is_empty() {
                return (StatusCode::BAD_REQUEST, fail_envelope("Empty upload"));
            }

            let image = ProductImage {
                id: Uuid::new_v4().to_string(),
                image_path: format!("/static/{id}/{}", file_name.as_deref().unwrap_or("upload")),
                file_name,
                uploaded_at: OffsetDateTime::now_utc(),
            };
            state.images.lock().unwrap().entry(id).or_default().push(image.clone());
            return (StatusCode::CREATED, ok_envelope(image));
        }
    }
    (StatusCode::BAD_REQUEST, fail_envelope("Missing imageFile field"))
}

async fn delete_image(
    State(state): State<Arc<MockState>>,
    Path((id, image_id)): Path<(String, String)>,
) -> (StatusCode, Json<Value>) {
    let mut images = state.images.lock().unwrap();
    let list = images.entry(id).or_default();
    let before = list.len();
    list.retain(|i| i.id != image_id);
    if list.len() == before {
        return (StatusCode::NOT_FOUND, fail_envelope("Image not found"));
    }
    (StatusCode::OK, ok_envelope(Value::Null))
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/refresh-token", post(refresh))
        .route("/api/protected/ping", get(ping))
        .route("/api/echo-auth", get(echo_auth))
        .route("/api/broken", get(server_error))
        .route("/api/product", get(list_products))
        .route("/api/products", post(create_product))
        .route("/api/products/{id}", get(get_product).put(update_product).delete(delete_product))
        .route("/api/products/code/{code}", get(get_product_by_code))
        .route("/api/products/category/{category}", get(products_by_category))
        .route("/api/products/{id}/images", get(list_images).post(upload_image))
        .route("/api/products/{id}/images/{image_id}", delete(delete_image))
        .with_state(state)
}

/// Navigator test double that remembers every requested navigation.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.visits.lock().unwrap().clone()
    }

    pub fn last_path(&self) -> Option<String> {
        self.visits.lock().unwrap().last().map(|(path, _)| path.clone())
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str, query: &[(&str, &str)]) {
        let query = query.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        self.visits.lock().unwrap().push((path.to_string(), query));
    }
}

pub fn test_config(api_url: &str) -> Config {
    Config {
        api_url: api_url.to_string(),
        session: SessionConfig { session_file: "unused-in-tests.json".into() },
        notifications: NotificationConfig { default_duration_ms: 0 },
        telemetry: TelemetryConfig { log_format: LogFormat::Text },
    }
}

/// One mock backend plus a fully wired client against it.
pub struct TestApp {
    pub server_url: String,
    pub state: Arc<MockState>,
    pub store: Arc<MemorySessionStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub services: ServiceContainer,
}

impl TestApp {
    pub async fn spawn() -> Self {
        setup_tracing();

        let state = Arc::new(MockState::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().expect("listener has no address");

        let app = router(Arc::clone(&state));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend crashed");
        });

        let server_url = format!("http://{addr}/api");
        let store = Arc::new(MemorySessionStore::new());
        let navigator = Arc::new(RecordingNavigator::default());

        let services = ServiceContainer::new(
            &test_config(&server_url),
            Arc::clone(&store) as Arc<dyn SessionStore>,
            Arc::clone(&navigator) as Arc<dyn Navigator>,
        )
        .expect("failed to wire services");

        Self { server_url, state, store, navigator, services }
    }

    /// Rewires a fresh container over the same store and backend, as a
    /// process restart would.
    pub fn restart(&mut self) {
        self.navigator = Arc::new(RecordingNavigator::default());
        self.services = ServiceContainer::new(
            &test_config(&self.server_url),
            Arc::clone(&self.store) as Arc<dyn SessionStore>,
            Arc::clone(&self.navigator) as Arc<dyn Navigator>,
        )
        .expect("failed to wire services");
    }

    pub fn sample_product(&self, code: &str, category: &str) -> Product {
        Product {
            id: Uuid::new_v4().to_string(),
            category: category.to_string(),
            product_code: code.to_string(),
            name: format!("Product {code}"),
            price: 19.99,
            minimum_quantity: 1,
            discount_rate: 0.0,
            created_at: OffsetDateTime::now_utc(),
            images: Vec::new(),
        }
    }
}
