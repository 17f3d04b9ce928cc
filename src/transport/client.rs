//! TCP link to the game's command listener.
//!
//! One JSON object per line goes out; the game may answer with a short
//! acknowledgment.  An empty answer still counts as delivered.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::command::BridgeCommand;
use crate::config::NetworkConfig;

/// Largest acknowledgment read per command.
const ACK_BUFFER: usize = 1024;

// ---------------------------------------------------------------------------
// Errors / Ack
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not connect to the game at {addr}: {reason}")]
    Connect { addr: String, reason: String },

    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("could not encode command: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// What the game said after receiving a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    /// First non-empty reply line.
    Reply(String),
    /// Nothing, or only whitespace, came back.
    Empty,
}

// ---------------------------------------------------------------------------
// CommandLink trait
// ---------------------------------------------------------------------------

/// Delivers validated commands to the game.
#[async_trait]
pub trait CommandLink: Send {
    async fn send(&mut self, command: &BridgeCommand) -> Result<Ack, TransportError>;

    /// Drop the connection.  Safe to call when already closed.
    async fn close(&mut self);

    fn is_connected(&self) -> bool;
}

// ---------------------------------------------------------------------------
// GameClient
// ---------------------------------------------------------------------------

/// [`CommandLink`] over a lazily opened TCP connection.
///
/// The socket is opened on the first `send`.  A timeout or socket error
/// drops it, and the following `send` connects again.
pub struct GameClient {
    addr: String,
    connect_timeout: Duration,
    ack_timeout: Duration,
    stream: Option<TcpStream>,
}

impl GameClient {
    pub fn new(addr: impl Into<String>, connect_timeout: Duration, ack_timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            connect_timeout,
            ack_timeout,
            stream: None,
        }
    }

    pub fn from_config(config: &NetworkConfig) -> Self {
        Self::new(config.address(), config.connect_timeout(), config.ack_timeout())
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Open the connection now instead of on the first `send`.
    pub async fn connect(&mut self) -> Result<(), TransportError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let stream = match timeout(self.connect_timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(TransportError::Connect {
                    addr: self.addr.clone(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(TransportError::Connect {
                    addr: self.addr.clone(),
                    reason: format!("no answer within {:?}", self.connect_timeout),
                });
            }
        };
        // Commands are tiny; don't let Nagle hold them back.
        stream.set_nodelay(true)?;

        log::info!("connected to the game at {}", self.addr);
        self.stream = Some(stream);
        Ok(())
    }

    async fn exchange(&mut self, line: &str) -> Result<Ack, TransportError> {
        let ack_timeout = self.ack_timeout;
        let Some(stream) = self.stream.as_mut() else {
            return Err(TransportError::Io(std::io::ErrorKind::NotConnected.into()));
        };

        timeout(ack_timeout, stream.write_all(line.as_bytes()))
            .await
            .map_err(|_| TransportError::Timeout(ack_timeout))??;

        let mut buffer = vec![0u8; ACK_BUFFER];
        let n = timeout(ack_timeout, stream.read(&mut buffer))
            .await
            .map_err(|_| TransportError::Timeout(ack_timeout))??;

        if n == 0 {
            // The game hung up after reading; the command still arrived.
            log::warn!("game closed the connection");
            self.stream = None;
            return Ok(Ack::Empty);
        }

        let reply = String::from_utf8_lossy(&buffer[..n]);
        Ok(reply
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map_or(Ack::Empty, |l| Ack::Reply(l.to_string())))
    }
}

#[async_trait]
impl CommandLink for GameClient {
    async fn send(&mut self, command: &BridgeCommand) -> Result<Ack, TransportError> {
        let line = command.to_json_line()?;
        self.connect().await?;

        match self.exchange(&line).await {
            Ok(ack) => {
                log::info!("sent {}", line.trim_end());
                match &ack {
                    Ack::Reply(reply) => log::info!("ack: {reply}"),
                    Ack::Empty => log::info!("ack: (empty)"),
                }
                Ok(ack)
            }
            Err(e) => {
                log::warn!("dropping connection to {}: {e}", self.addr);
                self.stream = None;
                Err(e)
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
            log::info!("disconnected from the game");
        }
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Intent;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::TcpListener;

    const SHORT: Duration = Duration::from_millis(300);

    async fn listener() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        (listener, addr)
    }

    fn client(addr: &str) -> GameClient {
        GameClient::new(addr, SHORT, SHORT)
    }

    fn mars() -> BridgeCommand {
        BridgeCommand::new(Intent::Navigate).with_target("Mars").with_warp(5.0)
    }

    #[tokio::test]
    async fn sends_one_json_line_and_reads_ack() {
        let (listener, addr) = listener().await;
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            reader.get_mut().write_all(b"OK navigate\n").await.unwrap();
            line
        });

        let mut link = client(&addr);
        assert!(!link.is_connected());
        let ack = link.send(&mars()).await.unwrap();
        assert_eq!(ack, Ack::Reply("OK navigate".into()));
        assert!(link.is_connected());

        let line = server.await.unwrap();
        assert!(line.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["department"], "helm");
        assert_eq!(value["intent"], "navigate");
        assert_eq!(value["target"], "Mars");
        assert_eq!(value["warp_factor"], 5.0);
        assert!(value["maneuver"].is_null());
    }

    #[tokio::test]
    async fn whitespace_reply_is_empty_ack() {
        let (listener, addr) = listener().await;
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            reader.get_mut().write_all(b"  \n").await.unwrap();
            // Keep the socket open until the client is done.
            let _ = reader.read_line(&mut line).await;
        });

        let mut link = client(&addr);
        assert_eq!(link.send(&mars()).await.unwrap(), Ack::Empty);
        assert!(link.is_connected());
    }

    #[tokio::test]
    async fn hang_up_after_read_is_delivered_but_disconnects() {
        let (listener, addr) = listener().await;
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
        });

        let mut link = client(&addr);
        assert_eq!(link.send(&mars()).await.unwrap(), Ack::Empty);
        assert!(!link.is_connected());
    }

    #[tokio::test]
    async fn silent_game_times_out_and_disconnects() {
        let (listener, addr) = listener().await;
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(stream);
        });

        let mut link = client(&addr);
        let err = link.send(&mars()).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout(_)), "got {err:?}");
        assert!(!link.is_connected());
    }

    #[tokio::test]
    async fn nobody_listening_is_connect_error() {
        let (listener, addr) = listener().await;
        drop(listener);

        let mut link = client(&addr);
        let err = link.send(&mars()).await.unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }), "got {err:?}");
        assert!(!link.is_connected());
    }

    #[tokio::test]
    async fn reconnects_on_next_send() {
        let (listener, addr) = listener().await;
        tokio::spawn(async move {
            // First connection: read and hang up.
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            drop(reader);

            // Second connection: acknowledge.
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);
            line.clear();
            reader.read_line(&mut line).await.unwrap();
            reader.get_mut().write_all(b"ACK\n").await.unwrap();
            let _ = reader.read_line(&mut line).await;
        });

        let mut link = client(&addr);
        assert_eq!(link.send(&mars()).await.unwrap(), Ack::Empty);
        assert!(!link.is_connected());

        let stop = BridgeCommand::new(Intent::Stop);
        assert_eq!(link.send(&stop).await.unwrap(), Ack::Reply("ACK".into()));
        assert!(link.is_connected());
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (listener, addr) = listener().await;
        tokio::spawn(async move {
            let _conn = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(1)).await;
        });

        let mut link = client(&addr);
        link.connect().await.unwrap();
        assert!(link.is_connected());
        link.close().await;
        assert!(!link.is_connected());
        link.close().await;
    }

    #[test]
    fn from_config_uses_network_section() {
        let link = GameClient::from_config(&NetworkConfig::default());
        assert_eq!(link.addr(), "127.0.0.1:5005");
        assert!(!link.is_connected());
    }
}
