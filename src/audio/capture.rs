//! Microphone access through `cpal`.
//!
//! [`AudioCapture`] picks an input device (the system default, or one chosen
//! by name) and opens a stream in whatever sample format the device prefers.
//! Every callback buffer is converted to `f32` and sent as an
//! [`AudioChunk`].  The microphone stays open exactly as long as the
//! [`StreamHandle`] returned by [`AudioCapture::start`] is alive.

use std::sync::mpsc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use thiserror::Error;

/// One callback's worth of interleaved samples in `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub samples: Vec<f32>,
    /// Device rate in Hz, not yet resampled.
    pub sample_rate: u32,
    pub channels: u16,
}

/// Keeps the input stream running; drop it to release the device.
pub struct StreamHandle {
    _stream: cpal::Stream,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("no input device named '{0}'")]
    DeviceNotFound(String),

    #[error("failed to list input devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("unsupported input sample format: {0}")]
    UnsupportedFormat(String),

    #[error("audio stream stopped delivering samples")]
    StreamClosed,

    #[error("capture worker failed: {0}")]
    Worker(String),
}

/// Names of every input device on the default host.
pub fn input_device_names() -> Result<Vec<String>, CaptureError> {
    let host = cpal::default_host();
    Ok(host
        .input_devices()?
        .filter_map(|device| device.name().ok())
        .collect())
}

/// A chosen input device and the stream format it will be opened with.
///
/// ```rust,no_run
/// use std::sync::mpsc;
/// use bridge_ai::audio::{AudioCapture, AudioChunk};
///
/// let (tx, rx) = mpsc::channel::<AudioChunk>();
/// let capture = AudioCapture::open(None).unwrap();
/// let handle = capture.start(tx).unwrap();
/// let first = rx.recv().unwrap();
/// drop(handle); // microphone released
/// println!("{} Hz, {} channel(s)", first.sample_rate, first.channels);
/// ```
pub struct AudioCapture {
    device: cpal::Device,
    name: String,
    config: cpal::StreamConfig,
    sample_format: SampleFormat,
}

impl AudioCapture {
    /// Open the device whose name contains `name` (case-insensitive), or the
    /// host's default input device when `name` is `None`.
    pub fn open(name: Option<&str>) -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = match name {
            None => host.default_input_device().ok_or(CaptureError::NoDevice)?,
            Some(wanted) => {
                let needle = wanted.to_lowercase();
                host.input_devices()?
                    .find(|d| {
                        d.name()
                            .map(|n| n.to_lowercase().contains(&needle))
                            .unwrap_or(false)
                    })
                    .ok_or_else(|| CaptureError::DeviceNotFound(wanted.to_string()))?
            }
        };

        let supported = device.default_input_config()?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        let name = device.name().unwrap_or_else(|_| "unknown".into());

        log::debug!(
            "input device '{name}': {} Hz, {} channel(s), {sample_format:?}",
            config.sample_rate.0,
            config.channels
        );

        Ok(Self {
            device,
            name,
            config,
            sample_format,
        })
    }

    /// Start streaming chunks into `tx`.
    ///
    /// Chunks are dropped silently once the receiver is gone.
    pub fn start(&self, tx: mpsc::Sender<AudioChunk>) -> Result<StreamHandle, CaptureError> {
        let stream = match self.sample_format {
            SampleFormat::F32 => self.build::<f32>(tx)?,
            SampleFormat::F64 => self.build::<f64>(tx)?,
            SampleFormat::I8 => self.build::<i8>(tx)?,
            SampleFormat::I16 => self.build::<i16>(tx)?,
            SampleFormat::I32 => self.build::<i32>(tx)?,
            SampleFormat::U8 => self.build::<u8>(tx)?,
            SampleFormat::U16 => self.build::<u16>(tx)?,
            SampleFormat::U32 => self.build::<u32>(tx)?,
            other => return Err(CaptureError::UnsupportedFormat(format!("{other:?}"))),
        };
        stream.play()?;
        Ok(StreamHandle { _stream: stream })
    }

    fn build<T>(&self, tx: mpsc::Sender<AudioChunk>) -> Result<cpal::Stream, CaptureError>
    where
        T: SizedSample + Send + 'static,
        f32: FromSample<T>,
    {
        let sample_rate = self.sample_rate();
        let channels = self.channels();

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let _ = tx.send(AudioChunk {
                    samples: to_f32(data),
                    sample_rate,
                    channels,
                });
            },
            |err| log::error!("input stream error: {err}"),
            None,
        )?;
        Ok(stream)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }
}

fn to_f32<T>(data: &[T]) -> Vec<f32>
where
    T: Sample,
    f32: FromSample<T>,
{
    data.iter().map(|&s| s.to_sample::<f32>()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_samples_scale_to_unit_range() {
        let out = to_f32(&[0i16, i16::MIN, 16_384]);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], -1.0);
        assert!((out[2] - 0.5).abs() < 1e-4);

        let out = to_f32(&[128u8, 0u8]);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], -1.0);
    }

    #[test]
    fn float_samples_pass_through() {
        assert_eq!(to_f32(&[0.25f32, -0.75]), vec![0.25, -0.75]);
    }

    #[test]
    fn audio_chunk_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<AudioChunk>();
    }

    #[test]
    fn capture_errors_render_readably() {
        assert_eq!(
            CaptureError::DeviceNotFound("USB Mic".into()).to_string(),
            "no input device named 'USB Mic'"
        );
        assert_eq!(
            CaptureError::Worker("panicked".into()).to_string(),
            "capture worker failed: panicked"
        );
    }
}
