//! The canonical command shape exchanged with the game.
//!
//! [`Department`] and [`Intent`] are closed enums: a string that does not
//! name one of their variants is rejected when the command is built, so a
//! [`BridgeCommand`] can never carry an unknown routing value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::command::validate::ValidationError;

// ---------------------------------------------------------------------------
// Department
// ---------------------------------------------------------------------------

/// Ship subsystem a command is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Helm,
    Tactical,
    Engineering,
    Ops,
}

impl Department {
    pub const ALL: [Department; 4] = [
        Department::Helm,
        Department::Tactical,
        Department::Engineering,
        Department::Ops,
    ];

    /// Wire name of the department.
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Helm => "helm",
            Department::Tactical => "tactical",
            Department::Engineering => "engineering",
            Department::Ops => "ops",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Department::ALL
            .into_iter()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownDepartment(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// The canonical action a command requests.
///
/// The first eleven variants form the core helm vocabulary; the rest cover
/// tactical, ops and engineering orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Navigate,
    NavigateCoordinates,
    Warp,
    Impulse,
    Stop,
    Turn,
    RaiseShields,
    LowerShields,
    Orbit,
    Disengage,
    Status,
    Reverse,
    Evasive,
    Dock,
    Land,
    RedAlert,
    YellowAlert,
    GreenAlert,
    Fire,
    Scan,
    Hail,
    Viewscreen,
    DamageReport,
}

impl Intent {
    pub const ALL: [Intent; 23] = [
        Intent::Navigate,
        Intent::NavigateCoordinates,
        Intent::Warp,
        Intent::Impulse,
        Intent::Stop,
        Intent::Turn,
        Intent::RaiseShields,
        Intent::LowerShields,
        Intent::Orbit,
        Intent::Disengage,
        Intent::Status,
        Intent::Reverse,
        Intent::Evasive,
        Intent::Dock,
        Intent::Land,
        Intent::RedAlert,
        Intent::YellowAlert,
        Intent::GreenAlert,
        Intent::Fire,
        Intent::Scan,
        Intent::Hail,
        Intent::Viewscreen,
        Intent::DamageReport,
    ];

    /// Wire name of the intent.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Navigate => "navigate",
            Intent::NavigateCoordinates => "navigate_coordinates",
            Intent::Warp => "warp",
            Intent::Impulse => "impulse",
            Intent::Stop => "stop",
            Intent::Turn => "turn",
            Intent::RaiseShields => "raise_shields",
            Intent::LowerShields => "lower_shields",
            Intent::Orbit => "orbit",
            Intent::Disengage => "disengage",
            Intent::Status => "status",
            Intent::Reverse => "reverse",
            Intent::Evasive => "evasive",
            Intent::Dock => "dock",
            Intent::Land => "land",
            Intent::RedAlert => "red_alert",
            Intent::YellowAlert => "yellow_alert",
            Intent::GreenAlert => "green_alert",
            Intent::Fire => "fire",
            Intent::Scan => "scan",
            Intent::Hail => "hail",
            Intent::Viewscreen => "viewscreen",
            Intent::DamageReport => "damage_report",
        }
    }

    /// Department that handles this intent when the speaker did not say.
    pub fn default_department(&self) -> Department {
        match self {
            Intent::RaiseShields
            | Intent::LowerShields
            | Intent::RedAlert
            | Intent::YellowAlert
            | Intent::GreenAlert
            | Intent::Fire => Department::Tactical,
            Intent::Status | Intent::Scan | Intent::Hail | Intent::Viewscreen => Department::Ops,
            Intent::DamageReport => Department::Engineering,
            _ => Department::Helm,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = ValidationError;

    /// Parses a canonical intent name only. LLM phrasing variants go through
    /// [`crate::command::normalize_intent`] instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Intent::ALL
            .into_iter()
            .find(|i| i.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownIntent(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// BridgeCommand
// ---------------------------------------------------------------------------

/// Structured command sent to the game, one JSON object per line.
///
/// Absent optional fields serialize as `null`; the game expects every key to
/// be present.
///
/// ```
/// use bridge_ai::command::{BridgeCommand, Intent};
///
/// let cmd = BridgeCommand::new(Intent::Navigate)
///     .with_target("Mars")
///     .with_warp(5.0);
/// let line = cmd.to_json_line().unwrap();
/// assert!(line.ends_with('\n'));
/// assert!(line.contains("\"department\":\"helm\""));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeCommand {
    pub department: Department,
    pub intent: Intent,
    pub target: Option<String>,
    pub warp_factor: Option<f64>,
    pub impulse_percent: Option<f64>,
    pub maneuver: Option<String>,
}

impl BridgeCommand {
    /// A command with every optional field absent, routed to the intent's
    /// default department.
    pub fn new(intent: Intent) -> Self {
        Self {
            department: intent.default_department(),
            intent,
            target: None,
            warp_factor: None,
            impulse_percent: None,
            maneuver: None,
        }
    }

    /// Build from untyped department/intent names, e.g. from an external
    /// parser. Unknown names are rejected.
    pub fn from_parts(department: &str, intent: &str) -> Result<Self, ValidationError> {
        let department: Department = department.parse()?;
        let intent: Intent = intent.parse()?;
        Ok(Self::new(intent).with_department(department))
    }

    pub fn with_department(mut self, department: Department) -> Self {
        self.department = department;
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_warp(mut self, warp_factor: f64) -> Self {
        self.warp_factor = Some(warp_factor);
        self
    }

    pub fn with_impulse(mut self, impulse_percent: f64) -> Self {
        self.impulse_percent = Some(impulse_percent);
        self
    }

    pub fn with_maneuver(mut self, maneuver: impl Into<String>) -> Self {
        self.maneuver = Some(maneuver.into());
        self
    }

    /// Serialize as a single newline-terminated JSON line.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

impl fmt::Display for BridgeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.department, self.intent)?;
        if let Some(target) = &self.target {
            write!(f, " {target}")?;
        }
        if let Some(warp) = self.warp_factor {
            write!(f, " (warp {warp})")?;
        }
        if let Some(impulse) = self.impulse_percent {
            write!(f, " ({impulse}% impulse)")?;
        }
        if let Some(maneuver) = &self.maneuver {
            write!(f, " [{maneuver}]")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_has_every_key_with_nulls() {
        let cmd = BridgeCommand::new(Intent::Stop);
        let value: serde_json::Value = serde_json::to_value(&cmd).unwrap();
        let obj = value.as_object().unwrap();

        assert_eq!(obj.len(), 6);
        assert_eq!(obj["department"], "helm");
        assert_eq!(obj["intent"], "stop");
        assert!(obj["target"].is_null());
        assert!(obj["warp_factor"].is_null());
        assert!(obj["impulse_percent"].is_null());
        assert!(obj["maneuver"].is_null());
    }

    #[test]
    fn json_line_is_single_line() {
        let cmd = BridgeCommand::new(Intent::Navigate)
            .with_target("Jupiter")
            .with_warp(5.0);
        let line = cmd.to_json_line().unwrap();
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.contains("\"target\":\"Jupiter\""));
        assert!(line.contains("\"warp_factor\":5.0"));
    }

    #[test]
    fn intent_names_round_trip_through_from_str() {
        for intent in Intent::ALL {
            assert_eq!(intent.as_str().parse::<Intent>().unwrap(), intent);
        }
    }

    #[test]
    fn serde_names_match_as_str() {
        for intent in Intent::ALL {
            let json = serde_json::to_string(&intent).unwrap();
            assert_eq!(json, format!("\"{}\"", intent.as_str()));
        }
        for dept in Department::ALL {
            let json = serde_json::to_string(&dept).unwrap();
            assert_eq!(json, format!("\"{}\"", dept.as_str()));
        }
    }

    #[test]
    fn department_parse_is_case_insensitive() {
        assert_eq!("Tactical".parse::<Department>().unwrap(), Department::Tactical);
        assert_eq!(" OPS ".parse::<Department>().unwrap(), Department::Ops);
    }

    #[test]
    fn from_parts_rejects_unknown_values() {
        assert!(matches!(
            BridgeCommand::from_parts("science", "scan"),
            Err(ValidationError::UnknownDepartment(_))
        ));
        assert!(matches!(
            BridgeCommand::from_parts("helm", "moonwalk"),
            Err(ValidationError::UnknownIntent(_))
        ));
    }

    #[test]
    fn from_parts_keeps_explicit_department() {
        let cmd = BridgeCommand::from_parts("engineering", "status").unwrap();
        assert_eq!(cmd.department, Department::Engineering);
        assert_eq!(cmd.intent, Intent::Status);
    }

    #[test]
    fn default_departments() {
        assert_eq!(Intent::Navigate.default_department(), Department::Helm);
        assert_eq!(Intent::RaiseShields.default_department(), Department::Tactical);
        assert_eq!(Intent::Fire.default_department(), Department::Tactical);
        assert_eq!(Intent::Hail.default_department(), Department::Ops);
        assert_eq!(Intent::DamageReport.default_department(), Department::Engineering);
    }

    #[test]
    fn display_summarises_fields() {
        let cmd = BridgeCommand::new(Intent::Navigate)
            .with_target("Mars")
            .with_warp(7.0);
        assert_eq!(cmd.to_string(), "helm → navigate Mars (warp 7)");
    }
}
