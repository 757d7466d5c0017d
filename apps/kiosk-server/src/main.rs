//! Coffee kiosk HTTP server.

use kiosk_server::{init_tracing, run, ConfigState};

#[tokio::main]
async fn main() {
    init_tracing();

    let result = match ConfigState::from_env() {
        Ok(config) => run(config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Kiosk server failed");
        std::process::exit(1);
    }
}
