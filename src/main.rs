//! send-a-person: a one-shot protobuf-over-TCP example
//!
//! One binary, two roles picked by `--admin`:
//! - client: encode one Person record, write it over a single connection,
//!   close, exit
//! - server: accept connections forever; each connection carries exactly one
//!   record, delimited only by the peer closing its write side

mod client;
mod config;
mod protocol;
mod server;

use config::{Config, Mode};
use server::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        mode = ?config.mode,
        addr = %config.addr,
        read_timeout = ?config.read_timeout,
        "Starting send-a-person"
    );

    match config.mode {
        Mode::Client => client::send_record(&config).await?,
        Mode::Server => Server::bind(&config).await?.run().await?,
    }

    Ok(())
}
