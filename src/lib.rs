//! Voice-command relay for a starship bridge game.
//!
//! ```text
//! microphone ─▶ audio ─▶ stt (whisper.cpp) ─▶ intent (fast path / llm)
//!            ─▶ command::validate ─▶ transport (TCP, JSON lines) ─▶ game
//! ```
//!
//! The binary wires these together in [`pipeline::BridgePipeline`].

pub mod audio;
pub mod command;
pub mod config;
pub mod intent;
pub mod llm;
pub mod pipeline;
pub mod stt;
pub mod transport;
