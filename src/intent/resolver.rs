//! Utterance → command resolution: fast path first, LLM second.

use crate::command::{BridgeCommand, CommandMemory, Intent};
use crate::intent::patterns::PatternMatcher;
use crate::intent::utterance::preprocess;
use crate::llm::FallbackInterpreter;

/// Which parser produced a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    FastPath,
    Language,
}

impl ResolutionSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::FastPath => "fast path",
            Self::Language => "LLM",
        }
    }
}

/// A resolved command and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub command: BridgeCommand,
    pub source: ResolutionSource,
}

/// Turns transcripts into commands.
///
/// Memory is only read here; the pipeline updates it after delivery.
pub struct IntentResolver {
    matcher: PatternMatcher,
    fast_path: bool,
    interpreter: Option<FallbackInterpreter>,
}

impl IntentResolver {
    /// `interpreter` is `None` when no LLM is configured.
    pub fn new(fast_path: bool, interpreter: Option<FallbackInterpreter>) -> Self {
        Self {
            matcher: PatternMatcher::new(),
            fast_path,
            interpreter,
        }
    }

    /// Resolve `text` against `memory`.  `None` when neither parser succeeds.
    pub async fn resolve(&self, text: &str, memory: &CommandMemory) -> Option<Resolution> {
        let cleaned = preprocess(text);
        if cleaned.is_empty() {
            return None;
        }

        if self.fast_path {
            if let Some(command) = self.matcher.match_command(&cleaned) {
                log::debug!("fast path matched '{cleaned}'");
                return Some(Resolution {
                    command: resume(command, memory),
                    source: ResolutionSource::FastPath,
                });
            }
        }

        let interpreter = match &self.interpreter {
            Some(interpreter) => interpreter,
            None => {
                log::warn!("no pattern matched '{cleaned}' and no LLM is configured");
                return None;
            }
        };

        log::info!("no pattern matched, asking the LLM");
        let command = interpreter
            .interpret(&cleaned, &memory.context_string())
            .await?;
        Some(Resolution {
            command: resume(command, memory),
            source: ResolutionSource::Language,
        })
    }
}

/// Fill in a destination for targetless warp/orbit orders from memory.
fn resume(mut command: BridgeCommand, memory: &CommandMemory) -> BridgeCommand {
    if command.target.is_none() && matches!(command.intent, Intent::Warp | Intent::Orbit) {
        command.target = memory.last_destination.clone();
    }
    command
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
