//! 16-bit PCM mono WAV encoding via `hound`.

use std::path::Path;

/// WAV layout handed to whisper.cpp.
pub fn wav_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

fn to_i16(sample: f32) -> i16 {
    (sample * 32767.0).clamp(-32768.0, 32767.0) as i16
}

/// Write `samples` (mono, `[-1.0, 1.0]`) to `path` as 16-bit PCM.
///
/// # Errors
///
/// Returns the underlying `hound` error if the file cannot be created or
/// written.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), hound::Error> {
    let mut writer = hound::WavWriter::create(path, wav_spec(sample_rate))?;
    for &sample in samples {
        writer.write_sample(to_i16(sample))?;
    }
    writer.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_readable_mono_16bit_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("clip.wav");

        let samples = vec![0.0_f32, 0.5, -0.5, 1.0, -1.0];
        write_wav(&path, &samples, 16_000).expect("write");

        let mut reader = hound::WavReader::open(&path).expect("open");
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.bits_per_sample, 16);

        let read: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(read, vec![0, 16383, -16383, 32767, -32767]);
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        assert_eq!(to_i16(2.0), i16::MAX);
        assert_eq!(to_i16(-2.0), i16::MIN);
    }
}
