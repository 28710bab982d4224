//! Client role: build one record, encode it, ship it over one connection.
//!
//! The exchange is fire-and-forget: nothing flows back from the server, and
//! the connection is used for exactly one message. Closing the write side is
//! what tells the server the message is complete.

use crate::config::Config;
use crate::protocol::{encode, Person};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info};

/// Build and send the example record to the configured server address.
///
/// Any transport error propagates to the caller; for a one-shot client
/// process that means logging it and exiting nonzero.
pub async fn send_record(config: &Config) -> std::io::Result<()> {
    let person = Person {
        id: 1,
        name: "Minh Tran".to_string(),
        age: 19,
    };

    send_to(&config.addr, &person).await?;
    info!(id = person.id, name = %person.name, age = person.age, "Record sent");
    Ok(())
}

/// Send one encoded record over a fresh connection to `addr`.
///
/// The full payload is written before the write side is shut down; the
/// stream is dropped (closed) on every exit path.
pub async fn send_to(addr: &str, person: &Person) -> std::io::Result<()> {
    let payload = encode(person);

    let mut stream = TcpStream::connect(addr).await?;
    debug!(peer = %addr, bytes = payload.len(), "Connected");

    stream.write_all(&payload).await?;
    stream.shutdown().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decode;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tokio_test::assert_ok;

    /// Accept one connection and read it to EOF.
    async fn recv_one(listener: TcpListener) -> Vec<u8> {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        buf
    }

    #[tokio::test]
    async fn test_send_to_delivers_full_payload() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let receiver = tokio::spawn(recv_one(listener));

        let person = Person {
            id: 7,
            name: "Ada".to_string(),
            age: 36,
        };
        tokio_test::assert_ok!(send_to(&addr, &person).await);

        let bytes = receiver.await.unwrap();
        assert_eq!(decode(&bytes).unwrap(), person);
    }

    #[tokio::test]
    async fn test_send_record_sends_hardcoded_person() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = Config {
            mode: crate::config::Mode::Client,
            addr: listener.local_addr().unwrap().to_string(),
            read_timeout: None,
            log_level: "info".to_string(),
        };
        let receiver = tokio::spawn(recv_one(listener));

        send_record(&config).await.unwrap();

        let person = decode(&receiver.await.unwrap()).unwrap();
        assert_eq!(person.id, 1);
        assert_eq!(person.name, "Minh Tran");
        assert_eq!(person.age, 19);
    }

    #[tokio::test]
    async fn test_send_to_unreachable_server_fails() {
        // Bind then drop to get a port nothing is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let person = Person {
            id: 1,
            name: "nobody".to_string(),
            age: 0,
        };
        assert!(send_to(&addr, &person).await.is_err());
    }
}
