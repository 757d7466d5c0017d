//! # Catalog Commands

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tower_sessions::Session;
use tracing::debug;

use kiosk_core::CatalogSnapshot;
use kiosk_db::Database;

use crate::error::ApiError;
use crate::guard;

/// The menu plus the token the client must echo on writes.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub catalog: CatalogSnapshot,
    pub csrf_token: String,
}

/// `GET /api/catalog`
pub async fn get_catalog(
    State(db): State<Database>,
    session: Session,
) -> Result<Json<CatalogResponse>, ApiError> {
    debug!("get_catalog");

    let catalog = db.catalog().load().await?;
    let csrf_token = guard::issue_token(&session).await?;

    Ok(Json(CatalogResponse {
        catalog: catalog.all().clone(),
        csrf_token,
    }))
}
