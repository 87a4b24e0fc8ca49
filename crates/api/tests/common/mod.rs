#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, SET_COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use smuggler_api::auth::jwt::{generate_access_token, JwtConfig};
use smuggler_api::auth::password::hash_password;
use smuggler_api::config::{FixtureSettings, ServerConfig};
use smuggler_api::router::build_app_router;
use smuggler_api::state::AppState;
use smuggler_core::clock::FixedClock;
use smuggler_core::messages::{FlashCodec, Message, MESSAGES_COOKIE};
use smuggler_db::models::user::CreateUser;
use smuggler_db::repositories::UserRepo;
use smuggler_db::DbPool;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults and the given fixture
/// settings.
pub fn test_config(fixtures: FixtureSettings) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        jwt: jwt_config(),
        fixtures,
        bootstrap_admin: None,
    }
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_SECRET.to_string(),
        access_token_expiry_mins: 60,
    }
}

/// Fresh in-memory database with migrations applied.
pub async fn test_pool() -> DbPool {
    let pool = smuggler_db::create_memory_pool()
        .await
        .expect("in-memory pool should open");
    smuggler_db::run_migrations(&pool)
        .await
        .expect("migrations should apply");
    pool
}

/// Build the full application router with a clock frozen at
/// 2012-01-14T00:00:00Z.
pub fn build_test_app(pool: DbPool, fixtures: FixtureSettings) -> Router {
    let clock = FixedClock(Utc.with_ymd_and_hms(2012, 1, 14, 0, 0, 0).unwrap());
    let state = AppState::new(
        pool,
        test_config(fixtures),
        smuggler_db::schema::builtin_registry(),
        Arc::new(clock),
    )
    .expect("templates should compile");
    build_app_router(state)
}

/// Insert a user with [`ADMIN_PASSWORD`].
pub async fn create_user(pool: &DbPool, username: &str, is_staff: bool, is_superuser: bool) -> i64 {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: hash_password(ADMIN_PASSWORD).expect("hashing should succeed"),
            is_staff,
            is_superuser,
        },
    )
    .await
    .expect("user creation should succeed");
    user.id
}

/// Create a superuser and return an access token for it.
pub async fn superuser_token(pool: &DbPool) -> String {
    let id = create_user(pool, "admin", true, true).await;
    generate_access_token(id, "admin", "superuser", &jwt_config()).unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    token: &str,
    form: MultipartForm,
) -> Response<Body> {
    let (content_type, body) = form.finish();
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Multipart bodies
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "----smuggler-test-boundary";

/// Minimal `multipart/form-data` body builder.
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/json\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(content);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={BOUNDARY}"), self.body)
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// Flash messages set by a response, decoded with the test secret.
pub fn flash_messages<B>(response: &Response<B>) -> Vec<Message> {
    let codec = FlashCodec::new(TEST_SECRET);
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| cookie::Cookie::parse(v.to_string()).ok())
        .find(|c| c.name() == MESSAGES_COOKIE)
        .map(|c| codec.decode(c.value()))
        .unwrap_or_default()
}

/// Number of rows in a table.
pub async fn count(pool: &DbPool, table: &str) -> i64 {
    let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap();
    n
}
