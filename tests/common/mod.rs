//! Shared helpers for the HTTP integration tests.
//!
//! `spawn_app` builds the real router over a throwaway SQLite file and
//! photo directory; requests are driven with `tower::ServiceExt::oneshot`,
//! no TCP listener involved.

// Not every test binary uses every helper.
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use inventory_service::{database, routes, services::inventory_service::InventoryService};
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt;

/// Boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "inventory-test-boundary";

/// The application under test plus the directories backing it.
pub struct TestApp {
    pub router: Router,
    pub photo_dir: PathBuf,
    // Held so the database file and photos outlive the test body.
    _tmp: TempDir,
}

/// Build the real router over a fresh SQLite file and photo directory.
///
/// This mirrors the construction in `main.rs` (pool, migrations, service,
/// routes) so the tests exercise the same stack that production uses.
pub async fn spawn_app() -> TestApp {
    let tmp = TempDir::new().expect("create tempdir");
    let photo_dir = tmp.path().join("photos");
    std::fs::create_dir_all(&photo_dir).expect("create photo dir");

    let database_url = format!("sqlite://{}", tmp.path().join("inventory.db").display());
    let db = database::create_pool(&database_url).await.expect("open pool");
    database::run_migrations(&db).await.expect("run migrations");

    let service = InventoryService::new(db, photo_dir.clone());
    TestApp {
        router: routes::routes::routes().with_state(service),
        photo_dir,
        _tmp: tmp,
    }
}

/// Number of files currently in the photo directory.
pub fn photo_file_count(app: &TestApp) -> usize {
    std::fs::read_dir(&app.photo_dir)
        .map(|entries| entries.count())
        .unwrap_or(0)
}

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router
        .clone()
        .oneshot(request)
        .await
        .expect("router call failed")
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

pub async fn delete(app: &TestApp, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn put_json(app: &TestApp, uri: &str, json: serde_json::Value) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(Method::PUT)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_form(app: &TestApp, uri: &str, form: &str) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_multipart(app: &TestApp, uri: &str, body: Vec<u8>) -> Response<Body> {
    send(app, multipart_request(Method::POST, uri, body)).await
}

pub async fn put_multipart(app: &TestApp, uri: &str, body: Vec<u8>) -> Response<Body> {
    send(app, multipart_request(Method::PUT, uri, body)).await
}

fn multipart_request(method: Method, uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// One part of a multipart form: a plain text field or a file.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        field: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

/// Assemble a `multipart/form-data` body using [`BOUNDARY`].
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                field,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(
                    format!("Content-Type: {content_type}\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Register an item with no photo through the real endpoint, returning its id.
pub async fn register_plain(app: &TestApp, name: &str, description: &str) -> i64 {
    let body = multipart_body(&[
        Part::Text("inventory_name", name),
        Part::Text("description", description),
    ]);
    let response = post_multipart(app, "/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Register an item carrying a photo, returning its id.
pub async fn register_with_photo(
    app: &TestApp,
    name: &str,
    file_name: &str,
    content_type: &str,
    data: &[u8],
) -> i64 {
    let body = multipart_body(&[
        Part::Text("inventory_name", name),
        Part::File {
            field: "photo",
            file_name,
            content_type,
            data,
        },
    ]);
    let response = post_multipart(app, "/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|err| panic!("response was not JSON: {err}"))
}

pub async fn body_bytes(response: Response<Body>) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}
