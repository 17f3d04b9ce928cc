//! Core `CommandInterpreter` trait and the LLM-backed implementation.
//!
//! [`LlmInterpreter`] sends the fixed system prompt plus one user turn to a
//! [`ChatBackend`], extracts the JSON object from the reply and turns it into
//! a canonical [`BridgeCommand`].

use async_trait::async_trait;
use thiserror::Error;

use crate::command::BridgeCommand;
use crate::llm::backend::ChatBackend;
use crate::llm::prompt::PromptBuilder;
use crate::llm::response::{command_from_reply, extract_json};

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur while interpreting an utterance with an LLM.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport, connection or non-2xx status.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The reply could not be parsed as expected JSON.
    #[error("failed to parse LLM response: {0}")]
    Parse(String),

    /// The LLM returned no usable text.
    #[error("LLM returned an empty response")]
    EmptyResponse,

    /// The provider needs an API key and none is configured.
    #[error("no API key configured for this LLM provider")]
    MissingApiKey,

    /// The model was not sure enough; ask the captain to repeat.
    #[error("confidence {confidence:.2} below threshold {threshold:.2}")]
    LowConfidence { confidence: f64, threshold: f64 },

    /// The reply parsed but named something outside the schema.
    #[error("reply rejected: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// CommandInterpreter trait
// ---------------------------------------------------------------------------

/// Async trait for free-form utterance interpretation.
///
/// # Arguments
/// * `text`    – Preprocessed transcript.
/// * `context` – [`CommandMemory::context_string`](crate::command::CommandMemory::context_string).
#[async_trait]
pub trait CommandInterpreter: Send + Sync {
    async fn interpret(&self, text: &str, context: &str) -> Result<BridgeCommand, LlmError>;
}

// ---------------------------------------------------------------------------
// LlmInterpreter
// ---------------------------------------------------------------------------

/// Interprets utterances through any [`ChatBackend`].
pub struct LlmInterpreter<B: ChatBackend> {
    backend: B,
    prompt_builder: PromptBuilder,
    min_confidence: f64,
}

impl<B: ChatBackend> LlmInterpreter<B> {
    pub fn new(backend: B, min_confidence: f64) -> Self {
        Self {
            backend,
            prompt_builder: PromptBuilder::new(),
            min_confidence,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[async_trait]
impl<B: ChatBackend> CommandInterpreter for LlmInterpreter<B> {
    async fn interpret(&self, text: &str, context: &str) -> Result<BridgeCommand, LlmError> {
        let (system, user) = self.prompt_builder.build_chat(text, context);
        let reply = self.backend.complete(&system, &user).await?;
        log::debug!("{} replied: {reply}", self.backend.name());

        let map = extract_json(&reply)
            .ok_or_else(|| LlmError::Parse(format!("no JSON object in reply: {reply}")))?;
        command_from_reply(&map, self.min_confidence)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Intent;
    use std::sync::Mutex;

    /// Returns a canned reply and records the prompts it was given.
    struct CannedBackend {
        reply: Result<String, ()>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl CannedBackend {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for CannedBackend {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
            self.seen
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            self.reply.clone().map_err(|_| LlmError::Timeout)
        }

        async fn health_check(&self) -> Result<(), LlmError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn interprets_prose_wrapped_reply() {
        let backend = CannedBackend::ok(
            "Aye captain: {\"intent\":\"navigate\",\"target\":\"saturn\",\"warp_factor\":6,\"confidence\":0.9}",
        );
        let interpreter = LlmInterpreter::new(backend, 0.3);

        let cmd = interpreter
            .interpret("make for the ringed planet at warp 6", "No previous context")
            .await
            .unwrap();
        assert_eq!(cmd.intent, Intent::Navigate);
        assert_eq!(cmd.target.as_deref(), Some("Saturn"));
        assert_eq!(cmd.warp_factor, Some(6.0));
    }

    #[tokio::test]
    async fn sends_context_in_user_turn() {
        let interpreter = LlmInterpreter::new(CannedBackend::ok("{\"intent\":\"warp\"}"), 0.3);
        interpreter
            .interpret("engage", "Last destination: Mars")
            .await
            .unwrap();

        let seen = interpreter.backend().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].1.starts_with("Context: Last destination: Mars"));
        assert!(seen[0].1.contains("Command: \"engage\""));
    }

    #[tokio::test]
    async fn reply_without_json_is_parse_error() {
        let interpreter = LlmInterpreter::new(CannedBackend::ok("I cannot do that."), 0.3);
        let err = interpreter.interpret("sing", "").await.unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[tokio::test]
    async fn low_confidence_is_reported() {
        let interpreter =
            LlmInterpreter::new(CannedBackend::ok("{\"intent\":\"scan\",\"confidence\":0.1}"), 0.3);
        let err = interpreter.interpret("mumble", "").await.unwrap_err();
        assert!(matches!(err, LlmError::LowConfidence { .. }));
    }

    #[tokio::test]
    async fn backend_errors_propagate() {
        let interpreter = LlmInterpreter::new(CannedBackend::failing(), 0.3);
        let err = interpreter.interpret("anything", "").await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout));
    }

    #[test]
    fn interpreter_is_object_safe() {
        let interpreter = LlmInterpreter::new(CannedBackend::ok("{}"), 0.3);
        let _: Box<dyn CommandInterpreter> = Box::new(interpreter);
    }
}
