//! Shared harness for the API integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use keystone_api::auth::jwt::{generate_access_token, JwtConfig};
use keystone_api::config::{PluginEngineConfig, ServerConfig};
use keystone_api::engine::dispatcher::PluginDispatcher;
use keystone_api::router::build_app_router;
use keystone_api::state::AppState;
use keystone_core::types::DbId;
use keystone_db::models::settings::UpdatePluginRuntimeSettings;
use keystone_db::repositories::SettingsRepo;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "keystone-test-secret".to_string(),
            access_token_expiry_mins: 15,
        },
        plugins: PluginEngineConfig::default(),
    }
}

/// Build the application state the way `main.rs` does.
pub fn build_test_state(pool: PgPool) -> AppState {
    let config = test_config();
    let dispatcher = PluginDispatcher::from_config(pool.clone(), &config.plugins);
    AppState {
        pool,
        config: Arc::new(config),
        dispatcher: Arc::new(dispatcher),
    }
}

/// Build the full application router through the production builder.
pub fn build_test_app(pool: PgPool) -> Router {
    app_for(build_test_state(pool))
}

/// Router over an existing state, so a test can keep a handle on the
/// dispatcher.
pub fn app_for(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

/// Router over an existing state with a shortened request timeout.
pub fn app_with_request_timeout(state: AppState, request_timeout_secs: u64) -> Router {
    let config = ServerConfig {
        request_timeout_secs,
        ..test_config()
    };
    build_app_router(state, &config)
}

/// Wait for every dispatched and manual execution to finish.
pub async fn drain(state: &AppState) {
    assert!(
        state.dispatcher.shutdown(Duration::from_secs(20)).await,
        "plugin executions did not drain"
    );
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

/// Insert a user with the given role and return `(user_id, bearer token)`.
pub async fn seed_user(pool: &PgPool, username: &str, role: &str) -> (DbId, String) {
    let id: DbId =
        sqlx::query_scalar("INSERT INTO users (username, role) VALUES ($1, $2) RETURNING id")
            .bind(username)
            .bind(role)
            .fetch_one(pool)
            .await
            .expect("insert user");
    let token = generate_access_token(id, role, &test_config().jwt).expect("mint token");
    (id, token)
}

/// Insert a database owned by `owner_id` with one table, returning the
/// table id.
pub async fn seed_table(pool: &PgPool, owner_id: DbId, table_name: &str) -> DbId {
    let database_id: DbId = sqlx::query_scalar(
        "INSERT INTO databases (name, owner_id) VALUES ($1, $2) RETURNING id",
    )
    .bind(format!("{table_name}_db"))
    .bind(owner_id)
    .fetch_one(pool)
    .await
    .expect("insert database");

    sqlx::query_scalar("INSERT INTO tables (database_id, name) VALUES ($1, $2) RETURNING id")
        .bind(database_id)
        .bind(table_name)
        .fetch_one(pool)
        .await
        .expect("insert table")
}

/// Point the stored runtime settings at `work_dir`.
pub async fn set_work_dir(pool: &PgPool, work_dir: &Path, actor_id: DbId) {
    SettingsRepo::upsert_plugin_runtime(
        pool,
        &UpdatePluginRuntimeSettings {
            plugin_timeout_secs: None,
            plugin_work_dir: Some(work_dir.to_string_lossy().into_owned()),
        },
        actor_id,
    )
    .await
    .expect("update settings");
}

/// Write a bash script into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).expect("write script");
}

/// Register a bash plugin through the API and return its id.
pub async fn create_bash_plugin(
    app: Router,
    token: &str,
    name: &str,
    entry_file: &str,
    timeout_secs: Option<i32>,
) -> DbId {
    let body = serde_json::json!({
        "name": name,
        "interpreter": "bash",
        "entry_file": entry_file,
        "timeout_secs": timeout_secs,
        "config_values": "{\"threshold\":3}",
    });
    let response = post_json_auth(app, "/api/v1/plugins", body, token).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_i64()
        .expect("plugin id")
}

/// Bind a plugin through the API, asserting success.
pub async fn bind(app: Router, token: &str, plugin_id: DbId, table_id: DbId, trigger: &str) {
    let body = serde_json::json!({ "table_id": table_id, "trigger": trigger });
    let response =
        post_json_auth(app, &format!("/api/v1/plugins/{plugin_id}/bind"), body, token).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request failed")
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn json_auth(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    json_auth(app, Method::POST, uri, body, token).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    json_auth(app, Method::PUT, uri, body, token).await
}

pub async fn delete_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    json_auth(app, Method::DELETE, uri, body, token).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}
