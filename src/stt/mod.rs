//! STT (Speech-to-Text) module.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  SttEngine (trait)                   │
//! │                                                      │
//! │   ┌──────────────┐    ┌──────────────┐               │
//! │   │ locate_binary│    │  WhisperCli  │               │
//! │   │ locate_model │───▶│ - binary     │               │
//! │   └──────────────┘    │ - model      │               │
//! │                       └──────┬───────┘               │
//! │                              │ temp WAV + subprocess │
//! │                              ▼                       │
//! │                    ┌──────────────────┐              │
//! │                    │ clean_transcript │              │
//! │                    └──────────────────┘              │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use bridge_ai::config::SttConfig;
//! use bridge_ai::stt::{SttEngine, WhisperCli};
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = WhisperCli::from_config(&SttConfig::default())
//!         .expect("install whisper.cpp and download ggml-base.en.bin");
//!
//!     // audio: 16 kHz, mono, f32 PCM from the audio module
//!     let audio: Vec<f32> = vec![0.0; 16_000];
//!     match engine.transcribe(&audio).await.unwrap() {
//!         Some(text) => println!("{text}"),
//!         None => println!("(silence)"),
//!     }
//! }
//! ```

pub mod engine;
pub mod locate;
pub mod whisper_cli;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{SttEngine, SttError};
pub use locate::{locate_binary, locate_model, model_file_name};
pub use whisper_cli::{clean_transcript, WhisperCli};

#[cfg(test)]
pub use engine::MockSttEngine;
