//! Utterance resolution.
//!
//! * [`preprocess`] / [`parse_number`]: transcript clean-up.
//! * [`PatternMatcher`]: deterministic fast path over common phrasings.
//! * [`IntentResolver`]: fast path first, LLM fallback second, with
//!   destination resumption from [`CommandMemory`](crate::command::CommandMemory).

pub mod patterns;
pub mod resolver;
pub mod utterance;

pub use patterns::{PatternMatcher, DEFAULT_WARP};
pub use resolver::{IntentResolver, Resolution, ResolutionSource};
pub use utterance::{parse_number, preprocess};
