//! Command schema, validation, alias tables and conversational memory.
//!
//! * [`BridgeCommand`]: the canonical command sent to the game.
//! * [`Department`] / [`Intent`]: closed routing enums.
//! * [`validate`] / [`ValidationError`]: numeric range gate.
//! * [`normalize_target`], [`resolve_destination`], [`normalize_intent`]:
//!   static alias tables shared by both parse paths.
//! * [`CommandMemory`]: state that lets follow-up utterances resolve.

pub mod aliases;
pub mod memory;
pub mod types;
pub mod validate;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use aliases::{
    destination_keys, normalize_intent, normalize_target, resolve_destination, KNOWN_TARGETS,
    PRIMARY_STATION,
};
pub use memory::CommandMemory;
pub use types::{BridgeCommand, Department, Intent};
pub use validate::{validate, ValidationError, MAX_IMPULSE, MAX_WARP};
