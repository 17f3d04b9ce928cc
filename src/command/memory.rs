//! Conversational memory carried between voice-command cycles.
//!
//! [`CommandMemory`] lets short follow-ups ("engage", "increase to warp 7",
//! "standard orbit") resolve against what the ship was last told to do.
//! It is updated only after a command has been validated **and** delivered
//! to the game, and is never rolled back.
//!
//! # At-warp rule
//!
//! * set when the intent is `warp` or `navigate` **and** a warp factor was
//!   supplied;
//! * cleared by `stop`, `impulse`, `disengage` and `orbit`;
//! * left untouched by everything else.

use crate::command::types::{BridgeCommand, Intent};

/// Process-scoped state, created empty at startup.
///
/// # Example
/// ```rust
/// use bridge_ai::command::{BridgeCommand, CommandMemory, Intent};
///
/// let mut memory = CommandMemory::new();
/// memory.update(&BridgeCommand::new(Intent::Navigate).with_target("Mars").with_warp(5.0));
/// assert_eq!(memory.last_destination.as_deref(), Some("Mars"));
/// assert!(memory.at_warp);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandMemory {
    pub last_destination: Option<String>,
    pub last_warp_factor: Option<f64>,
    pub last_impulse: Option<f64>,
    pub at_warp: bool,
    pub shields_raised: bool,
}

impl CommandMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a successfully delivered command into memory.
    ///
    /// Applying the same command twice leaves memory as after the first.
    pub fn update(&mut self, command: &BridgeCommand) {
        if let Some(target) = &command.target {
            self.last_destination = Some(target.clone());
        }

        // A zero warp factor never becomes the remembered cruising speed.
        if let Some(warp) = command.warp_factor.filter(|w| *w != 0.0) {
            self.last_warp_factor = Some(warp);
        }

        if let Some(impulse) = command.impulse_percent {
            self.last_impulse = Some(impulse);
        }

        match command.intent {
            Intent::Warp | Intent::Navigate if command.warp_factor.is_some() => {
                self.at_warp = true;
            }
            Intent::Stop | Intent::Impulse | Intent::Disengage | Intent::Orbit => {
                self.at_warp = false;
            }
            _ => {}
        }

        match command.intent {
            Intent::RaiseShields => self.shields_raised = true,
            Intent::LowerShields => self.shields_raised = false,
            _ => {}
        }
    }

    /// Render memory as the context line embedded in the LLM prompt.
    pub fn context_string(&self) -> String {
        let mut parts = Vec::with_capacity(5);
        if let Some(dest) = &self.last_destination {
            parts.push(format!("Last destination: {dest}"));
        }
        if let Some(warp) = self.last_warp_factor {
            parts.push(format!("Last warp factor: {warp}"));
        }
        if let Some(impulse) = self.last_impulse {
            parts.push(format!("Last impulse: {impulse}%"));
        }
        if self.at_warp {
            parts.push("Ship is currently at warp".to_string());
        }
        if self.shields_raised {
            parts.push("Shields are currently raised".to_string());
        }

        if parts.is_empty() {
            "No previous context".to_string()
        } else {
            parts.join("; ")
        }
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
