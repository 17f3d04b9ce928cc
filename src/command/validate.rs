//! Final structural gate before a command reaches the game.

use thiserror::Error;

use crate::command::types::BridgeCommand;

/// Exclusive upper bound for warp factors.
pub const MAX_WARP: f64 = 10.0;
/// Inclusive upper bound for impulse percentages.
pub const MAX_IMPULSE: f64 = 100.0;

/// Reasons a command is refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("unknown department: {0}")]
    UnknownDepartment(String),

    #[error("unknown intent: {0}")]
    UnknownIntent(String),

    #[error("warp factor must be between 0 and 10 (exclusive): {0}")]
    WarpOutOfRange(f64),

    #[error("impulse must be between 0 and 100: {0}")]
    ImpulseOutOfRange(f64),
}

/// Check the numeric ranges of `command`.
///
/// Department and intent are already closed enums, so the only remaining
/// checks are `0 < warp_factor < 10` and `0 <= impulse_percent <= 100`.
/// NaN fails both.
pub fn validate(command: &BridgeCommand) -> Result<(), ValidationError> {
    if let Some(warp) = command.warp_factor {
        if !(warp > 0.0 && warp < MAX_WARP) {
            return Err(ValidationError::WarpOutOfRange(warp));
        }
    }

    if let Some(impulse) = command.impulse_percent {
        if !(0.0..=MAX_IMPULSE).contains(&impulse) {
            return Err(ValidationError::ImpulseOutOfRange(impulse));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Intent;

    fn warp(w: f64) -> BridgeCommand {
        BridgeCommand::new(Intent::Warp).with_warp(w)
    }

    fn impulse(p: f64) -> BridgeCommand {
        BridgeCommand::new(Intent::Impulse).with_impulse(p)
    }

    #[test]
    fn rejects_warp_at_or_beyond_bounds() {
        for w in [0.0, 10.0, -1.0, 12.5] {
            assert_eq!(validate(&warp(w)), Err(ValidationError::WarpOutOfRange(w)));
        }
    }

    #[test]
    fn accepts_warp_inside_bounds() {
        assert!(validate(&warp(9.9)).is_ok());
        assert!(validate(&warp(1.0)).is_ok());
        assert!(validate(&warp(0.5)).is_ok());
    }

    #[test]
    fn rejects_impulse_outside_bounds() {
        for p in [101.0, -1.0] {
            assert_eq!(
                validate(&impulse(p)),
                Err(ValidationError::ImpulseOutOfRange(p))
            );
        }
    }

    #[test]
    fn accepts_impulse_bounds_inclusive() {
        assert!(validate(&impulse(0.0)).is_ok());
        assert!(validate(&impulse(100.0)).is_ok());
        assert!(validate(&impulse(66.0)).is_ok());
    }

    #[test]
    fn nan_is_rejected() {
        assert!(validate(&warp(f64::NAN)).is_err());
        assert!(validate(&impulse(f64::NAN)).is_err());
    }

    #[test]
    fn command_without_numbers_is_valid() {
        assert!(validate(&BridgeCommand::new(Intent::RaiseShields)).is_ok());
    }
}
