//! Cycle orchestration for the bridge.
//!
//! # Architecture
//!
//! ```text
//! main ──▶ BridgePipeline::run(ctrl_c)         voice mode
//!      └─▶ BridgePipeline::run_typed(stdin)    typed mode
//!
//!   each cycle:  AudioSource → SttEngine → IntentResolver
//!                → validate → CommandLink → CommandMemory
//! ```
//!
//! Cycles never overlap.  [`CommandMemory`](crate::command::CommandMemory) is
//! the only state carried from one cycle to the next.

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{BridgePipeline, CycleReport, PipelineError, CYCLE_PAUSE, ERROR_PAUSE};
pub use state::PipelineState;
