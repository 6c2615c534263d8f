//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that checks the database and the photo directory

use crate::services::inventory_service::InventoryService;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;
use tokio::fs;
use uuid::Uuid;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}

/// `GET /healthz`
///
/// Liveness probe — always 200, never performs I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Runs `SELECT 1` against SQLite and a write/read/delete round trip in the
/// photo directory. 200 when both pass, 503 otherwise.
pub async fn readyz(State(service): State<InventoryService>) -> impl IntoResponse {
    let database = check_database(&service).await;
    let photo_store = check_photo_dir(&service).await;

    let overall_ok = database.ok && photo_store.ok;
    let mut checks = HashMap::new();
    checks.insert("database", database);
    checks.insert("photo_store", photo_store);

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(ReadyResponse {
            status: if overall_ok { "ok".into() } else { "error".into() },
            checks,
        }),
    )
}

async fn check_database(service: &InventoryService) -> CheckStatus {
    match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&*service.db)
        .await
    {
        Ok(1) => CheckStatus { ok: true, error: None },
        Ok(other) => CheckStatus {
            ok: false,
            error: Some(format!("unexpected result: {other}")),
        },
        Err(err) => CheckStatus {
            ok: false,
            error: Some(format!("error: {err}")),
        },
    }
}

async fn check_photo_dir(service: &InventoryService) -> CheckStatus {
    let probe = service
        .photos
        .dir()
        .join(format!(".readyz-{}", Uuid::new_v4()));

    let result = async {
        fs::write(&probe, b"readyz").await?;
        let bytes = fs::read(&probe).await?;
        if bytes != b"readyz" {
            return Err(std::io::Error::other("file content mismatch"));
        }
        fs::remove_file(&probe).await
    }
    .await;

    match result {
        Ok(_) => CheckStatus { ok: true, error: None },
        Err(err) => {
            let _ = fs::remove_file(&probe).await;
            CheckStatus {
                ok: false,
                error: Some(err.to_string()),
            }
        }
    }
}
