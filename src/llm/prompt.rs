//! Prompt builder for the LLM fallback parser.
//!
//! [`PromptBuilder::build_chat`] returns a `(system_msg, user_msg)` pair.
//! The system message is fixed for the life of the process: it lists every
//! valid intent, every known destination and a handful of worked examples,
//! and asks for a single JSON object.  The user message carries the memory
//! context and the transcript.

use crate::command::{Intent, KNOWN_TARGETS};

// ---------------------------------------------------------------------------
// System instruction
// ---------------------------------------------------------------------------

const SYSTEM_HEADER: &str = "\
You are the bridge computer of a starship. Parse the captain's spoken order into JSON.
Output ONLY one JSON object, for example:
{\"department\":\"helm\",\"intent\":\"navigate\",\"target\":\"Jupiter\",\"warp_factor\":5,\"impulse_percent\":null,\"maneuver\":null,\"confidence\":0.9}

Departments: helm, tactical, engineering, ops";

const WORKED_EXAMPLES: &str = "
Examples:
\"set course for jupiter warp 5\" -> {\"intent\":\"navigate\",\"target\":\"Jupiter\",\"warp_factor\":5,\"confidence\":0.95}
\"course to mars\" -> {\"intent\":\"navigate\",\"target\":\"Mars\",\"warp_factor\":5,\"confidence\":0.9}
\"head to neptune warp 7\" -> {\"intent\":\"navigate\",\"target\":\"Neptune\",\"warp_factor\":7,\"confidence\":0.95}
\"the sun\" -> {\"intent\":\"navigate\",\"target\":\"Sun\",\"warp_factor\":5,\"confidence\":0.8}
\"bring us up to warp 7\" -> {\"intent\":\"warp\",\"warp_factor\":7,\"confidence\":0.9}
\"full impulse\" -> {\"intent\":\"impulse\",\"impulse_percent\":100,\"confidence\":0.95}
\"quarter impulse\" -> {\"intent\":\"impulse\",\"impulse_percent\":25,\"confidence\":0.95}
\"all stop\" -> {\"intent\":\"stop\",\"confidence\":0.95}
\"drop out of warp\" -> {\"intent\":\"stop\",\"confidence\":0.9}
\"come about to heading 270\" -> {\"intent\":\"turn\",\"maneuver\":\"heading 270\",\"confidence\":0.8}
\"orbit earth\" -> {\"intent\":\"orbit\",\"target\":\"Earth\",\"confidence\":0.9}
\"raise shields\" -> {\"department\":\"tactical\",\"intent\":\"raise_shields\",\"confidence\":0.95}
\"fire phasers at the warbird\" -> {\"department\":\"tactical\",\"intent\":\"fire\",\"target\":\"Warbird\",\"maneuver\":\"phasers\",\"confidence\":0.9}
\"scan that ship\" -> {\"department\":\"ops\",\"intent\":\"scan\",\"target\":\"Ship\",\"confidence\":0.7}
\"how are we doing\" -> {\"department\":\"ops\",\"intent\":\"status\",\"confidence\":0.6}

Warp factor must be above 0 and below 10. Impulse percent is 0 to 100.
If the order is unclear, give a low confidence.
JSON ONLY. No explanation.";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds chat prompts for the fallback parser.
///
/// # Example
/// ```rust
/// use bridge_ai::llm::PromptBuilder;
///
/// let builder = PromptBuilder::new();
/// let (system, user) = builder.build_chat("plot a course for the moon", "No previous context");
/// assert!(system.contains("raise_shields"));
/// assert!(user.ends_with("JSON:"));
/// ```
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system: String,
}

impl PromptBuilder {
    pub fn new() -> Self {
        let intents = Intent::ALL
            .iter()
            .map(|i| i.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let targets = KNOWN_TARGETS.join(", ");

        let mut system = String::with_capacity(2048);
        system.push_str(SYSTEM_HEADER);
        system.push_str(&format!("\nValid intents: {intents}"));
        system.push_str(&format!("\nValid targets (case-insensitive): {targets}\n"));
        system.push_str(WORKED_EXAMPLES);

        Self { system }
    }

    /// The fixed system instruction.
    pub fn system(&self) -> &str {
        &self.system
    }

    /// The single user turn: memory context, then the transcript.
    pub fn user_turn(&self, text: &str, context: &str) -> String {
        format!("Context: {context}\n\nCommand: \"{text}\"\n\nJSON:")
    }

    /// Build a **(system_msg, user_msg)** pair.
    pub fn build_chat(&self, text: &str, context: &str) -> (String, String) {
        (self.system.clone(), self.user_turn(text, context))
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_lists_every_intent_and_target() {
        let builder = PromptBuilder::new();
        for intent in Intent::ALL {
            assert!(builder.system().contains(intent.as_str()), "{intent}");
        }
        for target in KNOWN_TARGETS {
            assert!(builder.system().contains(target), "{target}");
        }
    }

    #[test]
    fn system_prompt_asks_for_json_only() {
        let builder = PromptBuilder::new();
        assert!(builder.system().contains("JSON ONLY"));
        assert!(builder.system().contains("\"confidence\""));
    }

    #[test]
    fn user_turn_layout() {
        let builder = PromptBuilder::new();
        let user = builder.user_turn("engage", "Last destination: Mars");
        assert_eq!(
            user,
            "Context: Last destination: Mars\n\nCommand: \"engage\"\n\nJSON:"
        );
    }

    #[test]
    fn build_chat_is_stable_across_calls() {
        let builder = PromptBuilder::new();
        let (a, _) = builder.build_chat("one", "No previous context");
        let (b, _) = builder.build_chat("two", "Last warp factor: 5");
        assert_eq!(a, b);
    }
}
