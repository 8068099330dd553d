//! `toon-service` binary: parse configuration, initialize logging, serve.
//!
//! ```sh
//! toon-service --bind 127.0.0.1:4000
//! TOON_MAX_BODY_BYTES=1048576 RUST_LOG=debug toon-service
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use toon_service::{ServeConfig, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServeConfig::parse();
    init_tracing();

    let server = Server::bind(&config)
        .await
        .context("Failed to start toon-service")?;
    server.run().await.context("toon-service exited with an error")?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}
