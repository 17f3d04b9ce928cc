//! Energy-based end-of-utterance detection.
//!
//! [`SilenceDetector`] is fed microphone samples as they arrive and decides
//! when a spoken order is over.  Audio is cut into fixed windows; a window
//! whose RMS exceeds the threshold counts as speech.
//!
//! ```text
//! Waiting ──loud window──▶ Speaking ──N quiet windows──▶ Done
//!    │                         │
//!    └──────── max_windows ────┴──────────────────────▶ Done
//! ```
//!
//! Windows heard before the first loud one are discarded.  Once speech has
//! started every window is kept, trailing silence included.

use crate::config::AudioConfig;

/// Where the detector is in the current recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// No speech heard yet.
    Waiting,
    /// Speech heard, recording.
    Speaking,
    /// Recording finished: enough trailing silence or the length cap.
    Done,
}

/// Root-mean-square level of `samples` (0.0 for an empty slice).
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean_sq: f32 = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    mean_sq.sqrt()
}

/// Fixed-window RMS state machine.
///
/// # Example
///
/// ```rust
/// use bridge_ai::audio::{Detection, SilenceDetector};
///
/// // 100-sample windows at 1 kHz, 0.2 s of silence ends the utterance.
/// let mut det = SilenceDetector::new(0.1, 100, 1_000, 0.2, 5.0);
/// assert_eq!(det.push(&[0.0; 100]), Detection::Waiting);
/// assert_eq!(det.push(&[0.5; 100]), Detection::Speaking);
/// assert_eq!(det.push(&[0.0; 200]), Detection::Done);
/// assert_eq!(det.finish().unwrap().len(), 300);
/// ```
#[derive(Debug, Clone)]
pub struct SilenceDetector {
    threshold: f32,
    window: usize,
    windows_for_silence: usize,
    max_windows: usize,

    pending: Vec<f32>,
    captured: Vec<f32>,
    windows_seen: usize,
    quiet_run: usize,
    state: Detection,
}

impl SilenceDetector {
    /// * `threshold`: RMS above which a window is speech.
    /// * `window`: samples per window (at `sample_rate`).
    /// * `silence_secs`: quiet time after speech that ends the recording.
    /// * `max_secs`: hard cap on the recording, speech or not.
    pub fn new(
        threshold: f32,
        window: usize,
        sample_rate: u32,
        silence_secs: f32,
        max_secs: f32,
    ) -> Self {
        let window = window.max(1);
        let per_sec = sample_rate as f32 / window as f32;
        Self {
            threshold,
            window,
            windows_for_silence: ((silence_secs * per_sec) as usize).max(1),
            max_windows: ((max_secs * per_sec) as usize).max(1),
            pending: Vec::with_capacity(window),
            captured: Vec::new(),
            windows_seen: 0,
            quiet_run: 0,
            state: Detection::Waiting,
        }
    }

    /// Detector for audio arriving at `sample_rate` with the configured
    /// window, threshold and timings.
    pub fn from_config(config: &AudioConfig, sample_rate: u32) -> Self {
        Self::new(
            config.silence_threshold,
            config.window,
            sample_rate,
            config.silence_duration_secs,
            config.max_record_secs,
        )
    }

    pub fn state(&self) -> Detection {
        self.state
    }

    /// Feed mono samples of any length.  Input after `Done` is ignored.
    pub fn push(&mut self, samples: &[f32]) -> Detection {
        for &sample in samples {
            if self.state == Detection::Done {
                break;
            }
            self.pending.push(sample);
            if self.pending.len() == self.window {
                self.close_window();
            }
        }
        self.state
    }

    fn close_window(&mut self) {
        let window = std::mem::take(&mut self.pending);
        self.windows_seen += 1;

        if rms(&window) > self.threshold {
            self.state = Detection::Speaking;
            self.quiet_run = 0;
            self.captured.extend_from_slice(&window);
        } else if self.state == Detection::Speaking {
            self.captured.extend_from_slice(&window);
            self.quiet_run += 1;
            if self.quiet_run >= self.windows_for_silence {
                self.state = Detection::Done;
            }
        }

        if self.windows_seen >= self.max_windows {
            self.state = Detection::Done;
        }
        self.pending = window;
        self.pending.clear();
    }

    /// The recorded utterance, or `None` if no speech was heard.
    pub fn finish(self) -> Option<Vec<f32>> {
        if self.captured.is_empty() {
            None
        } else {
            Some(self.captured)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
