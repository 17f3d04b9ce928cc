//! One utterance per call: open the microphone, wait for speech, stop on
//! silence, release the microphone.
//!
//! [`AudioSource`] is the seam the pipeline records through.
//! [`MicrophoneRecorder`] is the cpal-backed implementation; tests use
//! scripted sources.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use async_trait::async_trait;

use crate::audio::capture::{AudioCapture, AudioChunk, CaptureError};
use crate::audio::resample::{resample_to_16k, stereo_to_mono};
use crate::audio::vad::{Detection, SilenceDetector};
use crate::config::AudioConfig;

/// How often the capture worker checks for cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// AudioSource trait
// ---------------------------------------------------------------------------

/// Records one spoken utterance.
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// 16 kHz mono samples of the utterance, or `None` if nothing was said
    /// before the recording limit (or the recording was cancelled).
    async fn record(&self) -> Result<Option<Vec<f32>>, CaptureError>;

    /// Abort a recording in progress.  The pending `record` returns promptly.
    fn cancel(&self);
}

// ---------------------------------------------------------------------------
// MicrophoneRecorder
// ---------------------------------------------------------------------------

/// Records from the default input device.
///
/// The cpal stream is opened at the start of each `record` call and dropped
/// before it returns, so the microphone is never held between cycles.
pub struct MicrophoneRecorder {
    config: AudioConfig,
    cancelled: Arc<AtomicBool>,
}

impl MicrophoneRecorder {
    pub fn new(config: AudioConfig) -> Self {
        Self {
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check that the configured input device exists and reports a usable
    /// format.  Returns the device name.
    pub fn probe(&self) -> Result<String, CaptureError> {
        AudioCapture::open(self.config.device.as_deref()).map(|c| c.name().to_string())
    }
}

#[async_trait]
impl AudioSource for MicrophoneRecorder {
    async fn record(&self) -> Result<Option<Vec<f32>>, CaptureError> {
        self.cancelled.store(false, Ordering::SeqCst);
        let config = self.config.clone();
        let cancelled = Arc::clone(&self.cancelled);

        // cpal streams are not `Send`; the whole capture lives on one
        // blocking thread.
        tokio::task::spawn_blocking(move || record_blocking(&config, &cancelled))
            .await
            .map_err(|e| CaptureError::Worker(e.to_string()))?
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

fn record_blocking(
    config: &AudioConfig,
    cancelled: &AtomicBool,
) -> Result<Option<Vec<f32>>, CaptureError> {
    let capture = AudioCapture::open(config.device.as_deref())?;
    let (tx, rx) = mpsc::channel::<AudioChunk>();
    let handle = capture.start(tx)?;

    log::info!("listening...");
    let source_rate = capture.sample_rate();
    let detector = SilenceDetector::from_config(config, source_rate);
    let result = drain(&rx, detector, cancelled);

    // Release the microphone before any post-processing.
    drop(handle);

    let Some(audio) = result? else {
        return Ok(None);
    };
    log::info!(
        "recorded {:.1} s",
        audio.len() as f32 / source_rate.max(1) as f32
    );
    Ok(Some(resample_to_16k(&audio, source_rate)))
}

/// Feed chunks into `detector` until it reports `Done` or `cancelled` is set.
fn drain(
    rx: &mpsc::Receiver<AudioChunk>,
    mut detector: SilenceDetector,
    cancelled: &AtomicBool,
) -> Result<Option<Vec<f32>>, CaptureError> {
    loop {
        if cancelled.load(Ordering::SeqCst) {
            log::debug!("recording cancelled");
            return Ok(None);
        }

        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(chunk) => {
                let mono = stereo_to_mono(&chunk.samples, chunk.channels);
                if detector.push(&mono) == Detection::Done {
                    return Ok(detector.finish());
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => return Err(CaptureError::StreamClosed),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> SilenceDetector {
        SilenceDetector::new(0.1, 100, 1_000, 0.2, 5.0)
    }

    fn chunk(level: f32, frames: usize, channels: u16) -> AudioChunk {
        AudioChunk {
            samples: vec![level; frames * channels as usize],
            sample_rate: 1_000,
            channels,
        }
    }

    #[test]
    fn drain_returns_speech_after_trailing_silence() {
        let (tx, rx) = mpsc::channel();
        tx.send(chunk(0.0, 300, 2)).unwrap();
        tx.send(chunk(0.5, 200, 2)).unwrap();
        tx.send(chunk(0.0, 200, 2)).unwrap();

        let audio = drain(&rx, detector(), &AtomicBool::new(false))
            .unwrap()
            .unwrap();
        assert_eq!(audio.len(), 400);
    }

    #[test]
    fn drain_reports_closed_stream() {
        let (tx, rx) = mpsc::channel();
        tx.send(chunk(0.5, 100, 1)).unwrap();
        drop(tx);

        let err = drain(&rx, detector(), &AtomicBool::new(false)).unwrap_err();
        assert!(matches!(err, CaptureError::StreamClosed));
    }

    #[test]
    fn drain_stops_when_cancelled() {
        let (_tx, rx) = mpsc::channel::<AudioChunk>();
        let result = drain(&rx, detector(), &AtomicBool::new(true)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn recorder_is_object_safe() {
        let recorder = MicrophoneRecorder::new(AudioConfig::default());
        let source: Box<dyn AudioSource> = Box::new(recorder);
        source.cancel();
    }
}
