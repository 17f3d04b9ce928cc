//! Phases of one voice-command cycle.
//!
//! [`PipelineState`] is advanced by [`BridgePipeline`](super::BridgePipeline)
//! as a cycle progresses and logged at debug level on every transition.

/// States of the bridge pipeline.
///
/// The state machine transitions are:
///
/// ```text
/// Idle ──cycle start──▶ Listening
///      ──speech ended──▶ Transcribing
///      ──transcript───▶ Resolving
///      ──command valid─▶ Sending
///      ──delivered────▶ Done
/// any state ──error──▶ Error
/// Done / Error ──next cycle──▶ Listening
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// No cycle has started yet, or the loop has stopped.
    #[default]
    Idle,

    /// The microphone is open and waiting for speech or silence.
    Listening,

    /// whisper.cpp is running on the captured utterance.
    Transcribing,

    /// The fast path, then possibly the LLM, is interpreting the transcript.
    Resolving,

    /// The validated command is on its way to the game.
    Sending,

    /// The last command was delivered.
    Done,

    /// The last cycle failed.  The loop carries on after a pause.
    Error,
}

impl PipelineState {
    /// Returns `true` while a cycle is in progress.
    ///
    /// ```
    /// use bridge_ai::pipeline::PipelineState;
    ///
    /// assert!(!PipelineState::Idle.is_busy());
    /// assert!(PipelineState::Listening.is_busy());
    /// assert!(PipelineState::Sending.is_busy());
    /// assert!(!PipelineState::Done.is_busy());
    /// assert!(!PipelineState::Error.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            PipelineState::Listening
                | PipelineState::Transcribing
                | PipelineState::Resolving
                | PipelineState::Sending
        )
    }

    /// A short human-readable label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Idle => "Idle",
            PipelineState::Listening => "Listening",
            PipelineState::Transcribing => "Transcribing",
            PipelineState::Resolving => "Resolving",
            PipelineState::Sending => "Sending",
            PipelineState::Done => "Done",
            PipelineState::Error => "Error",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PipelineState; 7] = [
        PipelineState::Idle,
        PipelineState::Listening,
        PipelineState::Transcribing,
        PipelineState::Resolving,
        PipelineState::Sending,
        PipelineState::Done,
        PipelineState::Error,
    ];

    #[test]
    fn busy_states() {
        let busy: Vec<_> = ALL.iter().filter(|s| s.is_busy()).collect();
        assert_eq!(
            busy,
            vec![
                &PipelineState::Listening,
                &PipelineState::Transcribing,
                &PipelineState::Resolving,
                &PipelineState::Sending,
            ]
        );
    }

    #[test]
    fn labels_are_distinct() {
        let mut labels: Vec<_> = ALL.iter().map(|s| s.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), ALL.len());
    }

    #[test]
    fn label_done() {
        assert_eq!(PipelineState::Done.label(), "Done");
    }

    #[test]
    fn default_pipeline_state_is_idle() {
        assert_eq!(PipelineState::default(), PipelineState::Idle);
    }
}
