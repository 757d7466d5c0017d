//! # Sessions
//!
//! Cookie sessions stored in the kiosk's SQLite database.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  kiosk_session cookie ──► SessionManagerLayer ──► SqliteStore           │
//! │                                                   (tower_sessions)      │
//! │                                                                         │
//! │  expiry task (every min(ttl, 5 min))                                    │
//! │       ├── SessionCarts::prune_expired()                                 │
//! │       └── SqliteStore::delete_expired()                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every cookieless request that touches its session stores a record, so
//! expired records have to be deleted, not just ignored on load.

use std::time::Duration;

use tower_sessions::cookie::time::Duration as CookieDuration;
use tower_sessions::cookie::SameSite;
use tower_sessions::{ExpiredDeletion, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing::{debug, warn};

use kiosk_db::{Database, DbResult};

use crate::state::{ConfigState, SessionCarts};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "kiosk_session";

/// Opens the session store on the kiosk pool, creating its table if needed.
pub async fn session_store(db: &Database) -> DbResult<SqliteStore> {
    let store = SqliteStore::new(db.pool().clone());
    store.migrate().await?;
    debug!("Session store ready");
    Ok(store)
}

/// Session layer with inactivity expiry and the configured cookie flags.
pub fn session_layer(store: SqliteStore, config: &ConfigState) -> SessionManagerLayer<SqliteStore> {
    let ttl_secs = i64::try_from(config.session_ttl.as_secs()).unwrap_or(i64::MAX);

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(CookieDuration::seconds(ttl_secs)))
        .with_secure(config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Drops expired carts and deletes expired session records.
pub async fn remove_expired(carts: &SessionCarts, store: &SqliteStore) {
    carts.prune_expired();
    if let Err(e) = store.delete_expired().await {
        warn!(error = %e, "Could not delete expired sessions");
    }
}

/// Runs [`remove_expired`] every `min(ttl, 5 min)`, at least once a second.
pub fn spawn_expiry_task(carts: SessionCarts, store: SqliteStore, ttl: Duration) {
    let period = ttl.clamp(Duration::from_secs(1), Duration::from_secs(300));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            remove_expired(&carts, &store).await;
        }
    });
}
