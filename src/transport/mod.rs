//! Delivery of validated commands to the game over TCP.
//!
//! ```text
//! BridgeCommand ──to_json_line──▶ GameClient ──TCP──▶ game listener
//!                                      ◀── optional ack line
//! ```

pub mod client;

pub use client::{Ack, CommandLink, GameClient, TransportError};
