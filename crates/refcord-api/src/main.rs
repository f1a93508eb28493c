//! RefCord ingress server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p refcord-api
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use refcord_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::from_logging(&config.logging)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        name = %config.app.name,
        env = ?config.app.env,
        address = %config.api.address(),
        attribution = ?config.attribution,
        "Starting RefCord"
    );

    if let Err(e) = refcord_api::run(config).await {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}
