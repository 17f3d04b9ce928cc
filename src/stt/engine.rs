//! Core STT engine trait and error type.
//!
//! [`SttEngine`] is the interface used by the pipeline.  It is object-safe
//! and `Send + Sync` so it can be held behind a `Box<dyn SttEngine>`.
//!
//! [`WhisperCli`](crate::stt::WhisperCli) is the production implementation.
//! [`MockSttEngine`] (available under `#[cfg(test)]`) returns a
//! pre-configured response, for unit-testing the pipeline without whisper.cpp.

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

/// All errors that can arise from the STT subsystem.
#[derive(Debug, Clone, Error)]
pub enum SttError {
    /// No whisper.cpp executable in any searched location.
    #[error("whisper.cpp executable not found (searched: {0})")]
    BinaryNotFound(String),

    /// No GGML model file in any searched location.
    #[error("whisper model not found (searched: {0})")]
    ModelNotFound(String),

    /// The temporary WAV file could not be written.
    #[error("failed to write audio for transcription: {0}")]
    Audio(String),

    /// The subprocess could not be started or its output read.
    #[error("failed to run whisper.cpp: {0}")]
    Io(String),

    /// whisper.cpp exited with a non-zero status.
    #[error("whisper.cpp failed (exit {code:?}): {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    /// whisper.cpp did not finish in time and was killed.
    #[error("whisper.cpp timed out after {0} s")]
    Timeout(u64),
}

impl From<std::io::Error> for SttError {
    fn from(e: std::io::Error) -> Self {
        SttError::Io(e.to_string())
    }
}

impl From<hound::Error> for SttError {
    fn from(e: hound::Error) -> Self {
        SttError::Audio(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// SttEngine trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for speech-to-text engines.
///
/// # Contract
///
/// - `audio` must be **16 kHz, mono, f32** PCM samples.
/// - `Ok(None)` means the engine heard no speech (blank or non-speech only).
#[async_trait]
pub trait SttEngine: Send + Sync {
    async fn transcribe(&self, audio: &[f32]) -> Result<Option<String>, SttError>;
}

// Compile-time assertion: Box<dyn SttEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SttEngine>) {}
};

// ---------------------------------------------------------------------------
// MockSttEngine  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response.
#[cfg(test)]
pub struct MockSttEngine {
    response: Result<Option<String>, SttError>,
}

#[cfg(test)]
impl MockSttEngine {
    /// Always returns `Ok(Some(text))`.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(Some(text.into())),
        }
    }

    /// Always returns `Ok(None)`.
    pub fn silent() -> Self {
        Self { response: Ok(None) }
    }

    /// Always returns `Err(error)`.
    pub fn err(error: SttError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl SttEngine for MockSttEngine {
    async fn transcribe(&self, _audio: &[f32]) -> Result<Option<String>, SttError> {
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_ok_returns_configured_text() {
        let engine = MockSttEngine::ok("all stop");
        assert_eq!(
            engine.transcribe(&[0.0; 16]).await.unwrap().as_deref(),
            Some("all stop")
        );
    }

    #[tokio::test]
    async fn mock_err_returns_configured_error() {
        let engine = MockSttEngine::err(SttError::Timeout(30));
        let err = engine.transcribe(&[0.0; 16]).await.unwrap_err();
        assert!(matches!(err, SttError::Timeout(30)));
    }

    #[tokio::test]
    async fn box_dyn_stt_engine() {
        let engine: Box<dyn SttEngine> = Box::new(MockSttEngine::silent());
        assert!(engine.transcribe(&[]).await.unwrap().is_none());
    }

    #[test]
    fn stt_error_display() {
        let e = SttError::ModelNotFound("/models/ggml-base.en.bin".into());
        assert!(e.to_string().contains("/models/ggml-base.en.bin"));

        let e = SttError::Failed {
            code: Some(3),
            stderr: "bad model".into(),
        };
        assert_eq!(e.to_string(), "whisper.cpp failed (exit Some(3)): bad model");
    }
}
