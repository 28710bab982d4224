//! TCP server for receiving Person records.
//!
//! Accepts connections forever. Each accepted connection is handled by its
//! own task: read the stream until the peer closes its write side, decode the
//! accumulated bytes as one Person record, and report it. A failed connection
//! only ends its own task; the accept loop keeps serving.

use crate::config::Config;
use crate::protocol::{decode, CodecError, Person};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};

/// Maximum number of concurrent connections
const MAX_CONNECTIONS: usize = 1024;

/// Initial read buffer capacity
const BUFFER_SIZE: usize = 4 * 1024;

/// Where decoded records are reported.
#[derive(Clone)]
pub enum ReportSink {
    /// Print each record to standard output
    Stdout,
    /// Hand each record to a channel (used by tests to observe reports)
    Channel(mpsc::UnboundedSender<Person>),
}

impl ReportSink {
    fn report(&self, person: Person) {
        match self {
            ReportSink::Stdout => println!("{:?}", person),
            ReportSink::Channel(tx) => {
                let _ = tx.send(person);
            }
        }
    }
}

/// Errors that end a single handling task
#[derive(Debug)]
pub enum ConnectionError {
    /// Reading from the connection failed
    Read(std::io::Error),
    /// The accumulated payload did not decode into a record
    Decode(CodecError),
    /// The peer did not close its write side within the configured deadline
    TimedOut(Duration),
}

impl std::fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionError::Read(e) => write!(f, "Read failed: {}", e),
            ConnectionError::Decode(e) => write!(f, "{}", e),
            ConnectionError::TimedOut(limit) => {
                write!(f, "No end-of-stream within {:?}", limit)
            }
        }
    }
}

impl std::error::Error for ConnectionError {}

/// Server instance
pub struct Server {
    listener: TcpListener,
    read_timeout: Option<Duration>,
    connection_limit: Arc<Semaphore>,
    report: ReportSink,
}

impl Server {
    /// Bind the listening socket. Failure here is the one unrecoverable
    /// startup error and should terminate the process.
    pub async fn bind(config: &Config) -> std::io::Result<Self> {
        let listener = TcpListener::bind(&config.addr).await?;

        Ok(Server {
            listener,
            read_timeout: config.read_timeout,
            connection_limit: Arc::new(Semaphore::new(MAX_CONNECTIONS)),
            report: ReportSink::Stdout,
        })
    }

    /// Replace the report sink (tests observe records through a channel)
    pub fn with_report_sink(mut self, report: ReportSink) -> Self {
        self.report = report;
        self
    }

    /// The bound address, useful when binding to an ephemeral port
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until an unrecoverable accept error occurs.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        info!(address = %self.listener.local_addr()?, "Server listening");

        loop {
            // Wait for a connection slot
            let permit = self.connection_limit.clone().acquire_owned().await?;

            let (stream, addr) = self.listener.accept().await?;
            debug!(peer = %addr, "New connection");

            let report = self.report.clone();
            let read_timeout = self.read_timeout;

            tokio::spawn(async move {
                match handle_connection(stream, read_timeout).await {
                    Ok(person) => {
                        info!(peer = %addr, id = person.id, "Record received");
                        report.report(person);
                    }
                    Err(e) => {
                        warn!(peer = %addr, error = %e, "Connection failed");
                    }
                }
                drop(permit);
            });
        }
    }
}

/// Handle a single client connection: read to EOF, then decode.
///
/// The stream is owned by this task and closed on every exit path, including
/// a deadline expiry cancelling the read.
pub async fn handle_connection(
    stream: TcpStream,
    read_timeout: Option<Duration>,
) -> Result<Person, ConnectionError> {
    let payload = match read_timeout {
        Some(limit) => tokio::time::timeout(limit, read_to_eof(stream))
            .await
            .map_err(|_| ConnectionError::TimedOut(limit))??,
        None => read_to_eof(stream).await?,
    };

    decode(&payload).map_err(ConnectionError::Decode)
}

/// Accumulate all bytes until the peer closes its write side.
async fn read_to_eof(mut stream: TcpStream) -> Result<BytesMut, ConnectionError> {
    let mut buffer = BytesMut::with_capacity(BUFFER_SIZE);

    loop {
        let n = stream
            .read_buf(&mut buffer)
            .await
            .map_err(ConnectionError::Read)?;
        if n == 0 {
            // End of stream: the message is complete
            return Ok(buffer);
        }
    }
}
