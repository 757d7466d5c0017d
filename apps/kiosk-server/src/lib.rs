//! # kiosk-server: HTTP Surface for the Coffee Kiosk
//!
//! Thin axum layer over `kiosk-core` (pricing, carts, checkout) and
//! `kiosk-db` (SQLite).
//!
//! ## Module Organization
//! ```text
//! src/
//! ├── lib.rs          ◄─── You are here (startup, tracing)
//! ├── main.rs         ◄─── Binary entry point
//! ├── routes.rs       ◄─── Router and middleware stack
//! ├── guard.rs        ◄─── Write tokens and origin checks
//! ├── sessions.rs     ◄─── SQLite session store and expiry task
//! ├── error.rs        ◄─── ApiError → HTTP responses
//! ├── extract.rs      ◄─── ApiJson body extractor
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState
//! │   ├── cart.rs     ◄─── Session carts (CartRepository)
//! │   └── config.rs   ◄─── Environment configuration
//! └── commands/
//!     ├── catalog.rs  ◄─── GET  /api/catalog
//!     ├── cart.rs     ◄─── /api/cart/...
//!     ├── checkout.rs ◄─── POST /api/orders
//!     └── health.rs   ◄─── GET  /health
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ConfigState::from_env()
//!      │
//!      ▼
//! Database::new(DbConfig)  ── migrations run here
//!      │
//!      ▼
//! AppState::new()  ── session table created here
//!      │
//!      ▼
//! router(AppState) ──► axum::serve(listener).with_graceful_shutdown(ctrl-c)
//! ```

pub mod commands;
pub mod error;
pub mod extract;
pub mod guard;
pub mod routes;
pub mod sessions;
pub mod state;

use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use kiosk_db::{Database, DbConfig, DbError};

pub use error::{ApiError, ErrorCode};
pub use routes::router;
pub use state::{AppState, ConfigError, ConfigState, SessionCarts};

/// Errors that stop the server from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initializes tracing with `RUST_LOG` or the kiosk default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kiosk=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}

/// Opens the database, serves HTTP until ctrl-c, then closes the pool.
pub async fn run(config: ConfigState) -> Result<(), ServerError> {
    info!(
        db_path = %config.db_path.display(),
        bind_addr = %config.bind_addr,
        "Starting coffee kiosk server"
    );

    let db = Database::new(
        DbConfig::new(config.db_path.clone()).max_connections(config.db_max_connections),
    )
    .await?;

    let bind_addr = config.bind_addr;
    let state = AppState::new(db.clone(), config).await?;
    sessions::spawn_expiry_task(
        state.carts.clone(),
        state.sessions.clone(),
        state.config.session_ttl,
    );

    let listener = TcpListener::bind(bind_addr).await?;
    info!(addr = %bind_addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
