//! Fallback interpreter: wraps any [`CommandInterpreter`] and swallows errors.
//!
//! When the LLM call fails for any reason (transport, timeout, bad JSON,
//! low confidence, unknown intent) [`FallbackInterpreter`] logs the reason
//! and returns `None`.  The caller treats that as "could not resolve" and
//! moves on to the next utterance.

use crate::command::BridgeCommand;
use crate::llm::interpreter::{CommandInterpreter, LlmError};

// ---------------------------------------------------------------------------
// FallbackInterpreter
// ---------------------------------------------------------------------------

/// A wrapper around any [`CommandInterpreter`] that never returns an error.
///
/// # Example
/// ```rust
/// use bridge_ai::config::LlmConfig;
/// use bridge_ai::llm::{FallbackInterpreter, LlmInterpreter, OllamaBackend};
///
/// let config = LlmConfig::default();
/// let inner = LlmInterpreter::new(OllamaBackend::from_config(&config), config.min_confidence);
/// let interpreter = FallbackInterpreter::new(Box::new(inner));
/// // `interpreter.interpret(..)` yields `Option<BridgeCommand>` and is safe
/// // to call even when Ollama is not running.
/// ```
pub struct FallbackInterpreter {
    inner: Box<dyn CommandInterpreter>,
}

impl FallbackInterpreter {
    /// Wrap `inner` with fallback behaviour.
    pub fn new(inner: Box<dyn CommandInterpreter>) -> Self {
        Self { inner }
    }

    /// Interpret `text`; `None` on any failure.
    pub async fn interpret(&self, text: &str, context: &str) -> Option<BridgeCommand> {
        match self.inner.interpret(text, context).await {
            Ok(command) => Some(command),
            Err(LlmError::LowConfidence {
                confidence,
                threshold,
            }) => {
                log::warn!(
                    "low confidence ({confidence:.2} < {threshold:.2}), please repeat the order"
                );
                None
            }
            Err(err) => {
                log::warn!("LLM interpretation failed: {err}");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
