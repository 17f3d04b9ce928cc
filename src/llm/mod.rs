//! LLM fallback parser.
//!
//! This module provides:
//! * [`ChatBackend`]: async trait over chat-completion APIs, with
//!   [`OllamaBackend`], [`OpenAiBackend`] and [`GeminiBackend`].
//! * [`CommandInterpreter`]: async trait turning an utterance into a
//!   [`BridgeCommand`](crate::command::BridgeCommand); [`LlmInterpreter`]
//!   implements it over any backend.
//! * [`FallbackInterpreter`]: wraps an interpreter; logs failures and
//!   returns `None` instead of an error.
//! * [`PromptBuilder`]: fixed system prompt plus context/user turn.
//! * [`extract_json`], [`coerce_confidence`], [`command_from_reply`]: reply
//!   normalization.
//! * [`LlmError`]: error variants for LLM operations.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use bridge_ai::command::CommandMemory;
//! use bridge_ai::config::AppConfig;
//! use bridge_ai::llm::{backend_from_config, FallbackInterpreter, LlmInterpreter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let backend = backend_from_config(&config.llm).unwrap().unwrap();
//!     let interpreter = FallbackInterpreter::new(Box::new(LlmInterpreter::new(
//!         backend,
//!         config.llm.min_confidence,
//!     )));
//!
//!     let memory = CommandMemory::new();
//!     if let Some(cmd) = interpreter
//!         .interpret("make for the ringed planet", &memory.context_string())
//!         .await
//!     {
//!         println!("{cmd}");
//!     }
//! }
//! ```

pub mod backend;
pub mod fallback;
pub mod interpreter;
pub mod prompt;
pub mod response;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use backend::{backend_from_config, ChatBackend, GeminiBackend, OllamaBackend, OpenAiBackend};
pub use fallback::FallbackInterpreter;
pub use interpreter::{CommandInterpreter, LlmError, LlmInterpreter};
pub use prompt::PromptBuilder;
pub use response::{coerce_confidence, command_from_reply, extract_json, DEFAULT_CONFIDENCE};
