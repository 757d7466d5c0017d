//! # State Module
//!
//! Shared state handed to every handler.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      AppState (Clone)                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │      ┌──────────────┬────────┴─────┬───────────────────┐               │
//! │      ▼              ▼              ▼                   ▼                │
//! │  ┌──────────┐  ┌─────────────┐  ┌──────────────┐  ┌────────────────┐   │
//! │  │ Database │  │ SqliteStore │  │ SessionCarts │  │Arc<ConfigState>│   │
//! │  │          │  │             │  │              │  │                │   │
//! │  │  SQLite  │  │  cookie     │  │  Arc<Mutex<  │  │  allowed hosts │   │
//! │  │  pool    │  │  sessions   │  │   HashMap>>  │  │  cookie flags  │   │
//! │  └──────────┘  └─────────────┘  └──────────────┘  └────────────────┘   │
//! │                                                                         │
//! │  Handlers extract only the part they need: `State<Database>`,          │
//! │  `State<SessionCarts>`, `State<Arc<ConfigState>>`.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;

use std::sync::Arc;

use axum::extract::FromRef;
use tower_sessions_sqlx_store::SqliteStore;

use kiosk_db::{Database, DbResult};

use crate::sessions;

pub use cart::SessionCarts;
pub use config::{ConfigError, ConfigState};

/// Application state shared across all handlers.
#[derive(Debug, Clone, FromRef)]
pub struct AppState {
    pub db: Database,
    pub sessions: SqliteStore,
    pub carts: SessionCarts,
    pub config: Arc<ConfigState>,
}

impl AppState {
    /// Builds the state, creating the session table on `db` if needed.
    pub async fn new(db: Database, config: ConfigState) -> DbResult<Self> {
        let sessions = sessions::session_store(&db).await?;
        Ok(AppState {
            db,
            sessions,
            carts: SessionCarts::new(config.session_ttl),
            config: Arc::new(config),
        })
    }
}
