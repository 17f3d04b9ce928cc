//! Static alias tables shared by the fast path and the LLM-reply normalizer.
//!
//! Both parse paths spell targets and intents through these tables, so the
//! same utterance produces the same canonical command whichever path wins.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::command::types::Intent;

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// Canonical destinations the game knows about.
pub const KNOWN_TARGETS: &[&str] = &[
    "Sun",
    "Mercury",
    "Venus",
    "Earth",
    "Moon",
    "Mars",
    "Jupiter",
    "Saturn",
    "Uranus",
    "Neptune",
    "Pluto",
    "Starbase 1",
];

/// Default station for dock/land orders that name no target.
pub const PRIMARY_STATION: &str = "Starbase 1";

/// Colloquial spellings, keyed in lower case.
static TARGET_ALIASES: &[(&str, &str)] = &[
    ("sol", "Sun"),
    ("the sun", "Sun"),
    ("terra", "Earth"),
    ("home", "Earth"),
    ("the earth", "Earth"),
    ("planet earth", "Earth"),
    ("luna", "Moon"),
    ("the moon", "Moon"),
    ("the red planet", "Mars"),
    ("starbase", "Starbase 1"),
    ("starbase one", "Starbase 1"),
    ("star base", "Starbase 1"),
    ("star base one", "Starbase 1"),
    ("star base 1", "Starbase 1"),
    ("spacedock", "Starbase 1"),
    ("space dock", "Starbase 1"),
    ("the starbase", "Starbase 1"),
    ("the station", "Starbase 1"),
];

static TARGET_TABLE: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    let mut table: HashMap<String, &'static str> = KNOWN_TARGETS
        .iter()
        .map(|t| (t.to_lowercase(), *t))
        .collect();
    for (alias, canonical) in TARGET_ALIASES {
        table.insert((*alias).to_string(), *canonical);
    }
    table
});

fn target_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Resolve `raw` to a known destination, or `None` if it is not one.
///
/// ```
/// use bridge_ai::command::resolve_destination;
///
/// assert_eq!(resolve_destination("SOL"), Some("Sun"));
/// assert_eq!(resolve_destination("the moon"), Some("Moon"));
/// assert_eq!(resolve_destination("kronos"), None);
/// ```
pub fn resolve_destination(raw: &str) -> Option<&'static str> {
    TARGET_TABLE.get(&target_key(raw)).copied()
}

/// Canonical spelling of `raw`: a table hit, else each word title-cased.
///
/// Idempotent: normalizing an already-normalized name returns it unchanged.
pub fn normalize_target(raw: &str) -> String {
    match resolve_destination(raw) {
        Some(canonical) => canonical.to_string(),
        None => title_case(raw),
    }
}

/// Every lower-case key of the target table, longest first so that regex
/// alternations prefer "starbase one" over "starbase".
pub fn destination_keys() -> Vec<&'static str> {
    let table: &'static HashMap<String, &'static str> = &TARGET_TABLE;
    let mut keys: Vec<&'static str> = table.keys().map(String::as_str).collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    keys
}

fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Intents
// ---------------------------------------------------------------------------

/// LLM phrasing variants, keyed after folding spaces and hyphens to `_`.
static INTENT_ALIASES: &[(&str, Intent)] = &[
    ("navigation", Intent::Navigate),
    ("set_course", Intent::Navigate),
    ("plot_course", Intent::Navigate),
    ("course", Intent::Navigate),
    ("go_to", Intent::Navigate),
    ("goto", Intent::Navigate),
    ("head_to", Intent::Navigate),
    ("take_us_to", Intent::Navigate),
    ("travel", Intent::Navigate),
    ("navigate_to", Intent::Navigate),
    ("coordinates", Intent::NavigateCoordinates),
    ("engage", Intent::Warp),
    ("engage_warp", Intent::Warp),
    ("warp_speed", Intent::Warp),
    ("set_warp", Intent::Warp),
    ("change_warp", Intent::Warp),
    ("increase_speed", Intent::Warp),
    ("decrease_speed", Intent::Warp),
    ("set_speed", Intent::Warp),
    ("impulse_power", Intent::Impulse),
    ("set_impulse", Intent::Impulse),
    ("full_stop", Intent::Stop),
    ("all_stop", Intent::Stop),
    ("halt", Intent::Stop),
    ("drop_out", Intent::Stop),
    ("drop_out_of_warp", Intent::Stop),
    ("rotate", Intent::Turn),
    ("come_about", Intent::Turn),
    ("shields_up", Intent::RaiseShields),
    ("raise_shield", Intent::RaiseShields),
    ("shields_down", Intent::LowerShields),
    ("lower_shield", Intent::LowerShields),
    ("enter_orbit", Intent::Orbit),
    ("standard_orbit", Intent::Orbit),
    ("disengage_warp", Intent::Disengage),
    ("cancel_course", Intent::Disengage),
    ("report", Intent::Status),
    ("ship_status", Intent::Status),
    ("status_report", Intent::Status),
    ("full_reverse", Intent::Reverse),
    ("reverse_course", Intent::Reverse),
    ("evasive_maneuvers", Intent::Evasive),
    ("evasive_action", Intent::Evasive),
    ("evade", Intent::Evasive),
    ("docking", Intent::Dock),
    ("dock_at", Intent::Dock),
    ("landing", Intent::Land),
    ("battle_stations", Intent::RedAlert),
    ("condition_red", Intent::RedAlert),
    ("alert_red", Intent::RedAlert),
    ("condition_yellow", Intent::YellowAlert),
    ("alert_yellow", Intent::YellowAlert),
    ("condition_green", Intent::GreenAlert),
    ("stand_down", Intent::GreenAlert),
    ("cancel_alert", Intent::GreenAlert),
    ("fire_phasers", Intent::Fire),
    ("fire_torpedoes", Intent::Fire),
    ("fire_weapons", Intent::Fire),
    ("attack", Intent::Fire),
    ("open_fire", Intent::Fire),
    ("sensor_scan", Intent::Scan),
    ("scan_target", Intent::Scan),
    ("open_channel", Intent::Hail),
    ("hailing_frequencies", Intent::Hail),
    ("on_screen", Intent::Viewscreen),
    ("main_viewer", Intent::Viewscreen),
    ("view_screen", Intent::Viewscreen),
    ("damage", Intent::DamageReport),
    ("report_damage", Intent::DamageReport),
];

static INTENT_TABLE: LazyLock<HashMap<&'static str, Intent>> = LazyLock::new(|| {
    let mut table: HashMap<&'static str, Intent> =
        Intent::ALL.iter().map(|i| (i.as_str(), *i)).collect();
    table.extend(INTENT_ALIASES.iter().copied());
    table
});

/// Map an intent name (canonical or a known variant) onto [`Intent`].
///
/// ```
/// use bridge_ai::command::{normalize_intent, Intent};
///
/// assert_eq!(normalize_intent("Set Course"), Some(Intent::Navigate));
/// assert_eq!(normalize_intent("battle-stations"), Some(Intent::RedAlert));
/// assert_eq!(normalize_intent("juggle"), None);
/// ```
pub fn normalize_intent(raw: &str) -> Option<Intent> {
    let key: String = raw
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    INTENT_TABLE.get(key.as_str()).copied()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
