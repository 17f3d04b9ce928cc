//! Audio pipeline: microphone capture → mono → silence detection → 16 kHz.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → stereo_to_mono
//!           → SilenceDetector → resample_to_16k → write_wav (for whisper.cpp)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bridge_ai::audio::{AudioSource, MicrophoneRecorder};
//! use bridge_ai::config::AudioConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let recorder = MicrophoneRecorder::new(AudioConfig::default());
//!     match recorder.record().await {
//!         Ok(Some(samples)) => println!("{} samples @ 16 kHz", samples.len()),
//!         Ok(None) => println!("no speech"),
//!         Err(e) => eprintln!("capture failed: {e}"),
//!     }
//! }
//! ```

pub mod capture;
pub mod recorder;
pub mod resample;
pub mod vad;
pub mod wav;

pub use capture::{input_device_names, AudioCapture, AudioChunk, CaptureError, StreamHandle};
pub use recorder::{AudioSource, MicrophoneRecorder};
pub use resample::{resample_to_16k, stereo_to_mono, TARGET_RATE};
pub use vad::{rms, Detection, SilenceDetector};
pub use wav::write_wav;
