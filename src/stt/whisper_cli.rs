//! whisper.cpp as a subprocess.
//!
//! Each call writes the utterance to a temporary 16-bit WAV file and runs
//!
//! ```text
//! <binary> -m <model> -f <wav> --no-timestamps -l <language>
//! ```
//!
//! bounded by the configured timeout.  The child is killed if the timeout
//! fires.  Stdout is the transcript.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;

use crate::audio::{write_wav, TARGET_RATE};
use crate::config::SttConfig;
use crate::stt::engine::{SttEngine, SttError};
use crate::stt::locate::{locate_binary, locate_model};

/// Non-speech annotations: `[BLANK_AUDIO]`, `[MUSIC]`, `(wind blowing)`.
static NON_SPEECH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)").expect("valid non-speech regex"));

/// Strip non-speech tags and fold the transcript onto one line.
///
/// Returns `None` when nothing spoken remains.
///
/// ```
/// use bridge_ai::stt::clean_transcript;
///
/// assert_eq!(clean_transcript(" [BLANK_AUDIO]\n"), None);
/// assert_eq!(clean_transcript(" Set course for Mars.\n").as_deref(), Some("Set course for Mars."));
/// ```
pub fn clean_transcript(raw: &str) -> Option<String> {
    let stripped = NON_SPEECH.replace_all(raw, " ");
    let text = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Production [`SttEngine`] backed by the whisper.cpp command-line tool.
#[derive(Debug, Clone)]
pub struct WhisperCli {
    binary: PathBuf,
    model: PathBuf,
    language: String,
    timeout: Duration,
}

impl WhisperCli {
    pub fn new(binary: PathBuf, model: PathBuf, language: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary,
            model,
            language: language.into(),
            timeout,
        }
    }

    /// Locate the executable and model named by `config`.
    ///
    /// # Errors
    ///
    /// [`SttError::BinaryNotFound`] or [`SttError::ModelNotFound`] listing
    /// every path that was tried.
    pub fn from_config(config: &SttConfig) -> Result<Self, SttError> {
        let binary = locate_binary(config)?;
        log::info!("whisper.cpp found at {}", binary.display());
        let model = locate_model(config, &binary)?;
        log::info!("whisper model {}", model.display());

        Ok(Self::new(
            binary,
            model,
            config.language.clone(),
            Duration::from_secs(config.timeout_secs),
        ))
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn model(&self) -> &Path {
        &self.model
    }

    fn command(&self, wav: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-m")
            .arg(&self.model)
            .arg("-f")
            .arg(wav)
            .arg("--no-timestamps")
            .arg("-l")
            .arg(&self.language)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Run whisper.cpp on an existing WAV file and return raw stdout.
    pub async fn run(&self, wav: &Path) -> Result<String, SttError> {
        let output = tokio::time::timeout(self.timeout, self.command(wav).output())
            .await
            .map_err(|_| SttError::Timeout(self.timeout.as_secs()))??;

        if !output.status.success() {
            return Err(SttError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl SttEngine for WhisperCli {
    async fn transcribe(&self, audio: &[f32]) -> Result<Option<String>, SttError> {
        if audio.is_empty() {
            return Ok(None);
        }

        // Deleted when `wav` drops, on every return path.
        let wav = tempfile::Builder::new()
            .prefix("bridge-ai-")
            .suffix(".wav")
            .tempfile()?;
        write_wav(wav.path(), audio, TARGET_RATE)?;

        log::info!("transcribing {:.1} s of audio", audio.len() as f32 / TARGET_RATE as f32);
        let stdout = self.run(wav.path()).await?;
        let transcript = clean_transcript(&stdout);
        match &transcript {
            Some(text) => log::info!("heard: \"{text}\""),
            None => log::info!("no speech in transcript"),
        }
        Ok(transcript)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_blank_audio_and_tags() {
        assert_eq!(clean_transcript("[BLANK_AUDIO]"), None);
        assert_eq!(clean_transcript("  [MUSIC] (wind blowing)\n"), None);
        assert_eq!(
            clean_transcript(" [BLANK_AUDIO]\n Red alert!\n").as_deref(),
            Some("Red alert!")
        );
        assert_eq!(
            clean_transcript(" Helm,\n warp six.").as_deref(),
            Some("Helm, warp six.")
        );
    }

    #[test]
    fn command_line_layout() {
        let cli = WhisperCli::new(
            PathBuf::from("/opt/whisper/main"),
            PathBuf::from("/models/ggml-base.en.bin"),
            "en",
            Duration::from_secs(30),
        );
        let cmd = cli.command(Path::new("/tmp/clip.wav"));
        let args: Vec<_> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-m",
                "/models/ggml-base.en.bin",
                "-f",
                "/tmp/clip.wav",
                "--no-timestamps",
                "-l",
                "en"
            ]
        );
        assert_eq!(cmd.as_std().get_program(), "/opt/whisper/main");
    }

    #[tokio::test]
    async fn empty_audio_is_no_speech() {
        let cli = WhisperCli::new(
            PathBuf::from("/nonexistent/whisper"),
            PathBuf::from("/nonexistent/model.bin"),
            "en",
            Duration::from_secs(1),
        );
        assert!(cli.transcribe(&[]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_binary_is_io_error() {
        let cli = WhisperCli::new(
            PathBuf::from("/nonexistent/whisper"),
            PathBuf::from("/nonexistent/model.bin"),
            "en",
            Duration::from_secs(1),
        );
        let err = cli.transcribe(&[0.1; 1_600]).await.unwrap_err();
        assert!(matches!(err, SttError::Io(_)), "got {err:?}");
    }

    #[cfg(unix)]
    mod scripted {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        fn script(body: &str) -> (TempDir, PathBuf) {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("fake-whisper");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            (dir, path)
        }

        fn cli(binary: PathBuf, timeout_secs: u64) -> WhisperCli {
            WhisperCli::new(
                binary,
                PathBuf::from("/models/ggml-base.en.bin"),
                "en",
                Duration::from_secs(timeout_secs),
            )
        }

        #[tokio::test]
        async fn returns_cleaned_stdout() {
            let (_dir, bin) = script("echo ' [BLANK_AUDIO]'\necho ' Set course for Mars.'");
            let text = cli(bin, 10).transcribe(&[0.1; 1_600]).await.unwrap();
            assert_eq!(text.as_deref(), Some("Set course for Mars."));
        }

        #[tokio::test]
        async fn receives_an_existing_wav_file() {
            // Prints "ok" only if the file after -f exists.
            let (_dir, bin) = script("[ -f \"$4\" ] && echo ok");
            let text = cli(bin, 10).transcribe(&[0.1; 1_600]).await.unwrap();
            assert_eq!(text.as_deref(), Some("ok"));
        }

        #[tokio::test]
        async fn blank_output_is_no_speech() {
            let (_dir, bin) = script("echo '[BLANK_AUDIO]'");
            assert!(cli(bin, 10).transcribe(&[0.1; 1_600]).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn non_zero_exit_is_failure() {
            let (_dir, bin) = script("echo 'model load failed' >&2\nexit 3");
            let err = cli(bin, 10).transcribe(&[0.1; 1_600]).await.unwrap_err();
            match err {
                SttError::Failed { code, stderr } => {
                    assert_eq!(code, Some(3));
                    assert_eq!(stderr, "model load failed");
                }
                other => panic!("expected Failed, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn slow_process_times_out() {
            let (_dir, bin) = script("exec sleep 5");
            let err = cli(bin, 1).transcribe(&[0.1; 1_600]).await.unwrap_err();
            assert!(matches!(err, SttError::Timeout(1)), "got {err:?}");
        }
    }
}
