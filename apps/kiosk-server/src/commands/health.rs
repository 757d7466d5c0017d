//! # Health Command

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use kiosk_db::{Database, MigrationStatus};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrations: Option<MigrationStatus>,
}

/// `GET /health`
///
/// 200 when the database answers and every migration is applied,
/// 503 otherwise.
pub async fn health(State(db): State<Database>) -> (StatusCode, Json<HealthResponse>) {
    if !db.health_check().await {
        warn!("Health check: database unreachable");
        return unavailable(None);
    }

    match db.migration_status().await {
        Ok(status) if status.is_current() => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                migrations: Some(status),
            }),
        ),
        Ok(status) => {
            warn!(pending = status.pending(), "Health check: migrations pending");
            unavailable(Some(status))
        }
        Err(e) => {
            warn!(error = %e, "Health check: migration status unreadable");
            unavailable(None)
        }
    }
}

fn unavailable(migrations: Option<MigrationStatus>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(HealthResponse {
            status: "unavailable",
            migrations,
        }),
    )
}
