#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use base64ct::{Base64, Encoding};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use notedav::{config::Config, db::Database, path_locks::PathLocks, routes, AppState};

pub const TEST_USERNAME: &str = "testuser";
pub const TEST_PASSWORD: &str = "testpass";

pub struct TestServer {
    pub app: Router,
    pub db: Database,
    _data_dir: TempDir,
}

/// Build the real router against a throwaway SQLite database, with the test
/// account seeded.
pub async fn setup() -> TestServer {
    let data_dir = tempfile::tempdir().unwrap();
    let database_url = format!("sqlite://{}", data_dir.path().join("notedav.db").display());

    let db = Database::new(&database_url).await.unwrap();
    sqlx::migrate!("./migrations").run(&db.pool).await.unwrap();

    let config = Config {
        database_url,
        server_address: "127.0.0.1:0".to_string(),
        admin_username: TEST_USERNAME.to_string(),
        admin_password: TEST_PASSWORD.to_string(),
    };
    notedav::seed::seed_admin_user(&db, &config).await.unwrap();

    let state = Arc::new(AppState {
        db: db.clone(),
        config,
        locks: Arc::new(PathLocks::new()),
    });

    let app = Router::new()
        .route("/api/health", axum::routing::get(notedav::health_check))
        .merge(routes::dav::router())
        .with_state(state);

    TestServer {
        app,
        db,
        _data_dir: data_dir,
    }
}

pub fn basic_auth() -> String {
    basic_auth_for(TEST_USERNAME, TEST_PASSWORD)
}

pub fn basic_auth_for(username: &str, password: &str) -> String {
    let raw = format!("{username}:{password}");
    format!("Basic {}", Base64::encode_string(raw.as_bytes()))
}

/// Send an authenticated request and return the raw response.
pub async fn send_raw(
    app: &Router,
    method: &str,
    path: &str,
    body: Vec<u8>,
    headers: &[(&str, &str)],
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header("Authorization", basic_auth());
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder.body(Body::from(body)).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn send(
    app: &Router,
    method: &str,
    path: &str,
    body: Vec<u8>,
    headers: &[(&str, &str)],
) -> (StatusCode, Bytes) {
    let response = send_raw(app, method, path, body, headers).await;
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes)
}

pub async fn put(app: &Router, path: &str, content: &[u8]) -> StatusCode {
    send(app, "PUT", path, content.to_vec(), &[]).await.0
}

pub async fn get(app: &Router, path: &str) -> (StatusCode, Bytes) {
    send(app, "GET", path, Vec::new(), &[]).await
}

pub async fn head(app: &Router, path: &str) -> Response {
    send_raw(app, "HEAD", path, Vec::new(), &[]).await
}

pub async fn delete(app: &Router, path: &str) -> StatusCode {
    send(app, "DELETE", path, Vec::new(), &[]).await.0
}

pub async fn mkcol(app: &Router, path: &str) -> StatusCode {
    send(app, "MKCOL", path, Vec::new(), &[]).await.0
}

pub async fn propfind(app: &Router, path: &str, depth: Option<&str>) -> (StatusCode, String) {
    let headers: Vec<(&str, &str)> = depth.map(|d| ("Depth", d)).into_iter().collect();
    let (status, bytes) = send(app, "PROPFIND", path, Vec::new(), &headers).await;
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

pub fn hrefs(multistatus_xml: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = multistatus_xml;
    while let Some(start) = rest.find("<D:href>") {
        rest = &rest[start + "<D:href>".len()..];
        if let Some(end) = rest.find("</D:href>") {
            found.push(rest[..end].to_string());
            rest = &rest[end..];
        } else {
            break;
        }
    }
    found
}
