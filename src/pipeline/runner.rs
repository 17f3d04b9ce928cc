//! Pipeline runner: drives the capture → STT → resolve → validate → send loop.
//!
//! [`BridgePipeline`] owns every stage plus the [`CommandMemory`], and runs
//! one cycle at a time to completion.
//!
//! # Cycle flow
//!
//! ```text
//! AudioSource::record           [Listening]
//!   └─▶ SttEngine::transcribe   [Transcribing]
//!         └─▶ IntentResolver    [Resolving]   fast path, then LLM
//!               └─▶ validate
//!                     └─▶ CommandLink::send   [Sending]
//!                           └─▶ memory.update [Done]
//! ```
//!
//! Every failure is reported as a [`PipelineError`] and ends the cycle in
//! `Error`; the loop in [`run`](BridgePipeline::run) then carries on.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::audio::{AudioSource, CaptureError};
use crate::command::{validate, BridgeCommand, CommandMemory, ValidationError};
use crate::intent::{IntentResolver, ResolutionSource};
use crate::stt::{SttEngine, SttError};
use crate::transport::{Ack, CommandLink, TransportError};

use super::state::PipelineState;

/// Pause between cycles.
pub const CYCLE_PAUSE: Duration = Duration::from_millis(500);
/// Pause after a failed cycle.
pub const ERROR_PAUSE: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Why a cycle ended without delivering a command.
///
/// None of these stop the loop.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no speech detected")]
    NoSpeech,

    #[error("audio capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("transcription failed: {0}")]
    Transcription(#[from] SttError),

    #[error("transcript was empty")]
    EmptyTranscript,

    #[error("could not understand \"{0}\"")]
    Unresolved(String),

    #[error("invalid command: {0}")]
    Validation(#[from] ValidationError),

    #[error("could not deliver command: {0}")]
    Transport(#[from] TransportError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Nothing was said; not worth more than an info line.
    pub fn is_silence(&self) -> bool {
        matches!(self, PipelineError::NoSpeech | PipelineError::EmptyTranscript)
    }
}

// ---------------------------------------------------------------------------
// CycleReport
// ---------------------------------------------------------------------------

/// Outcome of a successful cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub transcript: String,
    pub command: BridgeCommand,
    pub source: ResolutionSource,
    pub ack: Ack,
}

// ---------------------------------------------------------------------------
// BridgePipeline
// ---------------------------------------------------------------------------

/// Drives voice (or typed) commands through to the game.
///
/// ```rust,no_run
/// use bridge_ai::audio::MicrophoneRecorder;
/// use bridge_ai::config::{AppConfig, AppPaths};
/// use bridge_ai::intent::IntentResolver;
/// use bridge_ai::pipeline::BridgePipeline;
/// use bridge_ai::stt::WhisperCli;
/// use bridge_ai::transport::GameClient;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = AppConfig::load_from(&AppPaths::new().settings_file)?;
/// let mut pipeline = BridgePipeline::new(
///     IntentResolver::new(true, None),
///     Box::new(GameClient::from_config(&config.network)),
/// )
/// .with_voice(
///     Box::new(MicrophoneRecorder::new(config.audio.clone())),
///     Box::new(WhisperCli::from_config(&config.stt)?),
/// );
///
/// pipeline.run(async { tokio::signal::ctrl_c().await.ok(); }).await;
/// # Ok(())
/// # }
/// ```
pub struct BridgePipeline {
    audio: Option<Box<dyn AudioSource>>,
    stt: Option<Box<dyn SttEngine>>,
    resolver: IntentResolver,
    link: Box<dyn CommandLink>,
    memory: CommandMemory,
    state: PipelineState,
}

impl BridgePipeline {
    /// A text-only pipeline.  Add a microphone with [`with_voice`](Self::with_voice).
    pub fn new(resolver: IntentResolver, link: Box<dyn CommandLink>) -> Self {
        Self {
            audio: None,
            stt: None,
            resolver,
            link,
            memory: CommandMemory::new(),
            state: PipelineState::Idle,
        }
    }

    pub fn with_voice(mut self, audio: Box<dyn AudioSource>, stt: Box<dyn SttEngine>) -> Self {
        self.audio = Some(audio);
        self.stt = Some(stt);
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// True while a cycle is part-way through.
    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    pub fn memory(&self) -> &CommandMemory {
        &self.memory
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    // -----------------------------------------------------------------------
    // Single cycles
    // -----------------------------------------------------------------------

    /// Record one utterance and carry it through to the game.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, PipelineError> {
        let result = match self.listen().await {
            Ok(transcript) => self.resolve_and_send(&transcript).await,
            Err(e) => Err(e),
        };
        self.finish(result)
    }

    /// Carry an already-transcribed (or typed) command through to the game.
    pub async fn process_text(&mut self, text: &str) -> Result<CycleReport, PipelineError> {
        let result = self.resolve_and_send(text).await;
        self.finish(result)
    }

    async fn listen(&mut self) -> Result<String, PipelineError> {
        let (Some(audio), Some(stt)) = (self.audio.as_ref(), self.stt.as_ref()) else {
            return Err(PipelineError::Internal("no microphone configured".into()));
        };

        self.state = PipelineState::Listening;
        log::debug!("pipeline: → {}", self.state.label());
        let samples = audio.record().await?.ok_or(PipelineError::NoSpeech)?;

        self.state = PipelineState::Transcribing;
        log::debug!("pipeline: → {} ({} samples)", self.state.label(), samples.len());
        stt.transcribe(&samples)
            .await?
            .ok_or(PipelineError::EmptyTranscript)
    }

    async fn resolve_and_send(&mut self, text: &str) -> Result<CycleReport, PipelineError> {
        let transcript = text.trim();
        if transcript.is_empty() {
            return Err(PipelineError::EmptyTranscript);
        }

        self.state = PipelineState::Resolving;
        log::debug!("pipeline: → {}", self.state.label());
        let resolution = self
            .resolver
            .resolve(transcript, &self.memory)
            .await
            .ok_or_else(|| PipelineError::Unresolved(transcript.to_string()))?;
        log::info!("command ({}): {}", resolution.source.label(), resolution.command);

        validate(&resolution.command)?;

        self.state = PipelineState::Sending;
        log::debug!("pipeline: → {}", self.state.label());
        let ack = self.link.send(&resolution.command).await?;

        // Only delivered commands shape later follow-ups.
        self.memory.update(&resolution.command);
        log::debug!("pipeline: memory = {}", self.memory.context_string());

        Ok(CycleReport {
            transcript: transcript.to_string(),
            command: resolution.command,
            source: resolution.source,
            ack,
        })
    }

    fn finish(
        &mut self,
        result: Result<CycleReport, PipelineError>,
    ) -> Result<CycleReport, PipelineError> {
        self.state = match &result {
            Ok(_) => PipelineState::Done,
            Err(_) => PipelineState::Error,
        };
        result
    }

    // -----------------------------------------------------------------------
    // Loops
    // -----------------------------------------------------------------------

    /// Run voice cycles until `shutdown` resolves.
    ///
    /// A recording in progress is cancelled and the game connection closed
    /// before this returns.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        log::info!("bridge is listening for orders (Ctrl-C to stop)");

        loop {
            let outcome = tokio::select! {
                _ = &mut shutdown => break,
                outcome = self.run_cycle() => outcome,
            };

            let pause = match outcome {
                Ok(report) => {
                    log::info!("delivered: {}", report.command);
                    CYCLE_PAUSE
                }
                Err(e) if e.is_silence() => {
                    log::info!("{e}");
                    CYCLE_PAUSE
                }
                Err(e) => {
                    log::warn!("{e}");
                    ERROR_PAUSE
                }
            };

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        self.shutdown().await;
    }

    /// Read one command per line from `reader` until end of input.
    ///
    /// Blank lines are skipped.  Returns how many commands were delivered.
    /// The pipeline is shut down whether input ends or fails to read.
    pub async fn run_typed<R>(&mut self, reader: R) -> std::io::Result<usize>
    where
        R: AsyncBufRead + Unpin,
    {
        let result = self.deliver_lines(reader).await;
        self.shutdown().await;
        result
    }

    async fn deliver_lines<R>(&mut self, reader: R) -> std::io::Result<usize>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut delivered = 0;

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match self.process_text(&line).await {
                Ok(report) => {
                    log::info!("delivered: {}", report.command);
                    delivered += 1;
                }
                Err(e) => log::warn!("{e}"),
            }
        }
        Ok(delivered)
    }

    /// Release the microphone and the game connection.
    ///
    /// A cycle cut short by the caller is abandoned where it stands.
    pub async fn shutdown(&mut self) {
        if self.is_busy() {
            log::info!("abandoning cycle while {}", self.state.label());
        }
        if let Some(audio) = &self.audio {
            audio.cancel();
        }
        self.link.close().await;
        self.state = PipelineState::Idle;
        log::info!("pipeline stopped");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
