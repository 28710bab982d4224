//! Configuration module for send-a-person.
//!
//! All configuration comes from command-line arguments, parsed once at
//! startup and passed explicitly to the chosen role. There is no config file
//! and no environment-variable lookup beyond the standard `RUST_LOG` filter.

use clap::{Parser, ValueEnum};
use std::time::Duration;

/// Which role this process invocation performs
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Send one record to the server, then exit
    Client,
    /// Accept connections and report received records, forever
    Server,
}

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "send-a-person")]
#[command(version = "0.1.0")]
#[command(about = "Send a protobuf Person record over a single TCP connection", long_about = None)]
pub struct CliArgs {
    /// Run as "client" or "server"
    #[arg(long, value_enum, default_value_t = Mode::Server)]
    pub admin: Mode,

    /// Address to bind (server) or connect to (client)
    #[arg(short = 'a', long, default_value = "127.0.0.1:8085")]
    pub addr: String,

    /// Server-side read deadline per connection, in seconds.
    /// Unset means a connection may wait on an idle peer indefinitely.
    #[arg(long, value_name = "SECONDS")]
    pub read_timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub addr: String,
    pub read_timeout: Option<Duration>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args.
    pub fn load() -> Self {
        Self::from_args(CliArgs::parse())
    }

    fn from_args(cli: CliArgs) -> Self {
        Config {
            mode: cli.admin,
            addr: cli.addr,
            read_timeout: cli.read_timeout.map(Duration::from_secs),
            log_level: cli.log_level,
        }
    }
}
