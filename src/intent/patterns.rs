//! Deterministic fast path: common bridge phrasings → [`BridgeCommand`].
//!
//! [`PatternMatcher::match_command`] tries eleven pattern families in a fixed
//! priority order and returns the first hit.  Order matters: explicit
//! warp-speed phrasings are checked before the bare "warp N" catch-all, and
//! the bare-destination rule runs last so that "warp 5" is never read as a
//! course change.
//!
//! | # | Family                         | Example                         |
//! |---|--------------------------------|---------------------------------|
//! | 1 | warp speed change              | "increase to warp 7"            |
//! | 2 | warp catchphrase               | "punch it"                      |
//! | 3 | bare warp (no destination)     | "warp 6"                        |
//! | 4 | impulse level                  | "half impulse"                  |
//! | 5 | stop / disengage / reverse     | "all stop"                      |
//! | 6 | shields and alert level        | "shields up", "red alert"       |
//! | 7 | status / damage / viewscreen   | "damage report"                 |
//! | 8 | orbit                          | "standard orbit around mars"    |
//! | 9 | scan / hail / fire             | "fire phasers at the warbird"   |
//! | 10| dock / land                    | "begin docking"                 |
//! | 11| navigation                     | "set course for jupiter warp 5" |
//!
//! Input is expected in [`preprocess`](crate::intent::preprocess)ed form.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::command::{
    destination_keys, normalize_target, resolve_destination, BridgeCommand, Intent,
    PRIMARY_STATION,
};
use crate::intent::utterance::{parse_number, NUMBER_PATTERN};

/// Warp factor used when a course is laid in without one.
pub const DEFAULT_WARP: f64 = 5.0;

/// Target used for fire orders that name none.
pub const DEFAULT_FIRE_TARGET: &str = "enemy";

fn compile(pattern: &str) -> Regex {
    let pattern = pattern.replace("{NUM}", NUMBER_PATTERN);
    Regex::new(&pattern).expect("valid fast-path regex")
}

// ---------------------------------------------------------------------------
// Catchphrase tables
// ---------------------------------------------------------------------------

static WARP_CATCHPHRASES: &[(&str, f64)] = &[
    ("punch it", 9.0),
    ("hit it", 9.0),
    ("engage", 5.0),
    ("make it so", 5.0),
    ("energize", 5.0),
    ("engage warp", 5.0),
    ("engage warp drive", 5.0),
    ("engage the warp drive", 5.0),
    ("maximum warp", 9.9),
    ("max warp", 9.9),
    ("warp maximum", 9.9),
    ("go to maximum warp", 9.9),
    ("maximum speed", 9.9),
];

static IMPULSE_LEVELS: &[(&str, f64)] = &[
    ("three quarters", 75.0),
    ("three quarter", 75.0),
    ("3/4", 75.0),
    ("two thirds", 66.0),
    ("two third", 66.0),
    ("2/3", 66.0),
    ("one third", 33.0),
    ("1/3", 33.0),
    ("one quarter", 25.0),
    ("1/4", 25.0),
    ("full", 100.0),
    ("half", 50.0),
    ("quarter", 25.0),
];

static THRUSTER_PHRASES: &[&str] = &[
    "thrusters",
    "thrusters only",
    "use thrusters",
    "maneuvering thrusters",
    "maneuvering thrusters only",
    "use maneuvering thrusters",
];

/// Impulse percentage for thrusters-only orders.
pub const THRUSTERS_PERCENT: f64 = 10.0;

static STOP_PHRASES: &[&str] = &[
    "stop",
    "all stop",
    "full stop",
    "halt",
    "stop engines",
    "all engines stop",
    "stop the ship",
    "drop out of warp",
    "come out of warp",
    "exit warp",
    "take us out of warp",
];

static DISENGAGE_PHRASES: &[&str] = &[
    "disengage",
    "disengage warp",
    "disengage warp drive",
    "disengage engines",
    "disengage autopilot",
    "cancel course",
    "abort course",
];

static REVERSE_PHRASES: &[&str] = &[
    "reverse",
    "full reverse",
    "reverse course",
    "reverse engines",
    "reverse thrust",
    "back us off",
    "back off",
    "all back",
    "all back full",
];

static RAISE_SHIELD_PHRASES: &[&str] = &[
    "raise shields",
    "raise the shields",
    "shields up",
    "shields",
    "activate shields",
    "shields on",
    "raise deflectors",
    "deflectors up",
];

static LOWER_SHIELD_PHRASES: &[&str] = &[
    "lower shields",
    "lower the shields",
    "shields down",
    "drop shields",
    "deactivate shields",
    "shields off",
    "lower deflectors",
    "deflectors down",
];

static GREEN_ALERT_PHRASES: &[&str] = &[
    "green alert",
    "condition green",
    "stand down",
    "stand down red alert",
    "cancel red alert",
    "cancel yellow alert",
    "cancel alert",
    "secure from red alert",
    "all clear",
];

static RED_ALERT_PHRASES: &[&str] = &[
    "red alert",
    "battle stations",
    "condition red",
    "go to red alert",
    "sound red alert",
];

static YELLOW_ALERT_PHRASES: &[&str] = &["yellow alert", "condition yellow", "go to yellow alert"];

static STATUS_PHRASES: &[&str] = &[
    "status",
    "status report",
    "report",
    "report status",
    "ship status",
    "ships status",
    "ship's status",
    "give me a status report",
    "what's our status",
    "what is our status",
];

static DAMAGE_PHRASES: &[&str] = &[
    "damage report",
    "report damage",
    "damage status",
    "damage assessment",
    "give me a damage report",
    "how bad is it",
];

static VIEWSCREEN_PHRASES: &[&str] = &[
    "on screen",
    "onscreen",
    "put it on screen",
    "main viewer",
    "on viewer",
    "on the main viewer",
    "put it on the main viewer",
    "viewscreen",
    "view screen",
];

/// Words that follow "orbit"/"hail"/"fire at" without naming anything.
static VAGUE_OBJECTS: &[&str] = &[
    "it", "them", "him", "her", "here", "there", "will", "planet", "the planet", "this planet",
    "that planet",
];

fn is_one_of(text: &str, phrases: &[&str]) -> bool {
    phrases.contains(&text)
}

/// Courtesy words that trail an order without being part of its object.
static TRAILING_FILLER: &[&str] = &["please", "now", "immediately"];

/// Canonical object name for a captured noun phrase, `None` if it is vague.
///
/// The longest word prefix that names a known destination wins, so trailing
/// words ("at warp 5", "then hold") never leak into the target.  Unknown
/// objects are title-cased with courtesy words dropped from the end.
fn object_name(raw: &str) -> Option<String> {
    let mut words: Vec<&str> = raw.split_whitespace().collect();
    while words.last().is_some_and(|w| TRAILING_FILLER.contains(w)) {
        words.pop();
    }
    let phrase = words.join(" ");
    if phrase.is_empty() || VAGUE_OBJECTS.contains(&phrase.as_str()) {
        return None;
    }

    if let Some(known) = (1..=words.len())
        .rev()
        .find_map(|len| destination(&words[..len].join(" ")))
    {
        return Some(known.to_string());
    }

    let stripped = phrase.strip_prefix("the ").unwrap_or(&phrase);
    Some(normalize_target(stripped))
}

/// Known destination for a captured phrase, trying once more without "the".
fn destination(raw: &str) -> Option<&'static str> {
    let raw = raw.trim();
    resolve_destination(raw).or_else(|| raw.strip_prefix("the ").and_then(resolve_destination))
}

fn captured_number(caps: &Captures<'_>, name: &str) -> Option<f64> {
    caps.name(name).and_then(|m| parse_number(m.as_str()))
}

// ---------------------------------------------------------------------------
// Regexes
// ---------------------------------------------------------------------------

static WARP_CHANGE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^(?:increase|raise|slow|reduce|decrease|drop|bring|go|accelerate|change|adjust|take|get|push|kick)(?: (?:us|it|our|the|ship's))?(?: (?:speed|velocity))?(?: (?:down|up|back))?(?: to)? warp(?: factor| speed)? (?P<warp>{NUM})$",
        r"^(?:(?:set|change|adjust|make|maintain|hold) )?(?:our )?speed(?: to)? (?:warp(?: factor)? )?(?P<warp>{NUM})$",
        r"^(?:(?:set|change|adjust|make|maintain|hold|go to) )?warp (?:factor|speed) (?P<warp>{NUM})$",
        r"^(?:set|change|adjust) warp(?: factor| speed)? to (?P<warp>{NUM})$",
    ]
    .iter()
    .map(|p| compile(p))
    .collect()
});

static BARE_WARP: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\bwarp(?: factor| speed)? (?P<warp>{NUM})\b"));

static NAV_VERB: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b(?:course|head|heading|take us|go to|fly|travel|proceed|navigate|plot|lay in|bring us to)\b")
});

static DESTINATION_WORD: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = destination_keys()
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    compile(&format!(r"\b(?:{alternation})\b"))
});

static IMPULSE_LEVEL: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?:(?:go to|set|engage|ahead|give me|take us to|bring us to) )?(?P<level>three quarters?|two thirds?|one third|one quarter|full|half|quarter|3/4|2/3|1/3|1/4)(?: (?:power|speed))? impulse(?: (?:power|speed))?$")
});

static AHEAD_LEVEL: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?:all )?ahead (?P<level>three quarters?|two thirds?|one third|one quarter|full|half|quarter)(?: impulse)?$")
});

static IMPULSE_PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?:(?:set|go to) )?(?:impulse(?: power)?(?: to)? (?P<a>\d+(?:\.\d+)?) percent|(?P<b>\d+(?:\.\d+)?) percent impulse(?: power)?)$")
});

static EVASIVE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?:(?:take|begin|initiate|execute) )?evasive(?: (?:maneuvers?|action))?(?: (?P<pattern>pattern [a-z0-9]+(?: [a-z0-9]+)?))?$")
});

static ORBIT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?:(?:enter|establish|assume|achieve|go into|take us into|put us into|put us in) )?(?:an? )?(?:(?:standard|high|low|synchronous|geosynchronous|stable) )?orbit(?: (?:around|of|over|above))?(?: (?P<target>.+))?$")
});

static SCAN: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?:(?:run|perform|do|conduct|begin|initiate) (?:a )?(?:(?:full|sensor|long range|short range|detailed) )*(?:scan|sweep)|(?:(?:full|sensor|long range|short range) )*(?:scan|sweep)|scan)(?: (?:of|on|for))?(?: (?P<target>.+))?$")
});

static HAIL: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?:hail|contact|open (?:a )?(?:hailing frequencies|hailing frequency|channel|channels|frequencies|comms|communications)(?: (?:to|with))?)(?: (?P<target>.+))?$")
});

static FIRE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?:open fire|fire)(?: (?P<weapon>phasers?|photon torpedoes?|quantum torpedoes?|torpedoes?|disruptors?|all weapons|everything))?(?: (?:at|on) (?P<target>.+))?$")
});

static DOCK: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?:dock|(?:begin|initiate|commence) docking(?: (?:procedures?|sequence))?|docking procedures?|take us in to dock)(?: (?:at|with|to) (?P<target>.+))?$")
});

static LAND: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?:land|set down|set us down|take us down|(?:begin|initiate) landing(?: sequence)?)(?: (?:at|on) (?P<target>.+))?$")
});

static NAVIGATION: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let tail = r"(?: (?:at )?warp(?: factor| speed)? (?P<warp>{NUM}))?";
    [
        format!(r"^(?:set|plot|lay in|lay|chart)(?: a| the)? course (?:for|to|towards?) (?P<dest>.+?){tail}$"),
        format!(r"^course (?:for|to) (?P<dest>.+?){tail}$"),
        format!(r"^(?:take us|head|go|fly|travel|proceed|navigate|bring us|get us|move)(?: over| on)?(?: (?:to|towards?|for))? (?P<dest>.+?){tail}$"),
        r"^(?P<dest>.+?) (?:at )?warp(?: factor| speed)? (?P<warp>{NUM})$".to_string(),
    ]
    .iter()
    .map(|p| compile(p))
    .collect()
});

// ---------------------------------------------------------------------------
// PatternMatcher
// ---------------------------------------------------------------------------

/// Stateless fast-path matcher.
///
/// # Example
/// ```rust
/// use bridge_ai::command::Intent;
/// use bridge_ai::intent::PatternMatcher;
///
/// let matcher = PatternMatcher::new();
/// let cmd = matcher.match_command("take us to jupiter").unwrap();
/// assert_eq!(cmd.intent, Intent::Navigate);
/// assert_eq!(cmd.target.as_deref(), Some("Jupiter"));
/// assert_eq!(cmd.warp_factor, Some(5.0));
///
/// assert!(matcher.match_command("sing me a song").is_none());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternMatcher;

impl PatternMatcher {
    pub fn new() -> Self {
        Self
    }

    /// First matching family wins; `None` means hand over to the LLM.
    pub fn match_command(&self, text: &str) -> Option<BridgeCommand> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        warp_change(text)
            .or_else(|| warp_catchphrase(text))
            .or_else(|| bare_warp(text))
            .or_else(|| impulse(text))
            .or_else(|| stop_family(text))
            .or_else(|| shields_and_alerts(text))
            .or_else(|| reports(text))
            .or_else(|| orbit(text))
            .or_else(|| scan_hail_fire(text))
            .or_else(|| dock_land(text))
            .or_else(|| navigation(text))
    }
}

// ---------------------------------------------------------------------------
// Families
// ---------------------------------------------------------------------------

fn warp_command(warp: f64) -> BridgeCommand {
    BridgeCommand::new(Intent::Warp).with_warp(warp)
}

fn warp_change(text: &str) -> Option<BridgeCommand> {
    WARP_CHANGE
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| captured_number(&caps, "warp"))
        .map(warp_command)
}

fn warp_catchphrase(text: &str) -> Option<BridgeCommand> {
    WARP_CATCHPHRASES
        .iter()
        .find(|(phrase, _)| *phrase == text)
        .map(|(_, warp)| warp_command(*warp))
}

fn bare_warp(text: &str) -> Option<BridgeCommand> {
    if DESTINATION_WORD.is_match(text) || NAV_VERB.is_match(text) {
        return None;
    }
    BARE_WARP
        .captures(text)
        .and_then(|caps| captured_number(&caps, "warp"))
        .map(warp_command)
}

fn impulse_level(level: &str) -> Option<f64> {
    IMPULSE_LEVELS
        .iter()
        .find(|(name, _)| *name == level)
        .map(|(_, pct)| *pct)
}

fn impulse(text: &str) -> Option<BridgeCommand> {
    let percent = if let Some(caps) = IMPULSE_LEVEL
        .captures(text)
        .or_else(|| AHEAD_LEVEL.captures(text))
    {
        impulse_level(caps.name("level")?.as_str())?
    } else if let Some(caps) = IMPULSE_PERCENT.captures(text) {
        caps.name("a")
            .or_else(|| caps.name("b"))
            .and_then(|m| m.as_str().parse().ok())?
    } else if is_one_of(text, THRUSTER_PHRASES) {
        THRUSTERS_PERCENT
    } else {
        return None;
    };

    Some(BridgeCommand::new(Intent::Impulse).with_impulse(percent))
}

fn stop_family(text: &str) -> Option<BridgeCommand> {
    if is_one_of(text, STOP_PHRASES) {
        return Some(BridgeCommand::new(Intent::Stop));
    }
    if is_one_of(text, DISENGAGE_PHRASES) {
        return Some(BridgeCommand::new(Intent::Disengage));
    }
    if is_one_of(text, REVERSE_PHRASES) {
        return Some(BridgeCommand::new(Intent::Reverse));
    }

    let caps = EVASIVE.captures(text)?;
    let maneuver = match caps.name("pattern") {
        Some(pattern) => format!("evasive {}", pattern.as_str()),
        None => "evasive maneuvers".to_string(),
    };
    Some(BridgeCommand::new(Intent::Evasive).with_maneuver(maneuver))
}

fn shields_and_alerts(text: &str) -> Option<BridgeCommand> {
    let intent = if is_one_of(text, RAISE_SHIELD_PHRASES) {
        Intent::RaiseShields
    } else if is_one_of(text, LOWER_SHIELD_PHRASES) {
        Intent::LowerShields
    } else if is_one_of(text, GREEN_ALERT_PHRASES) {
        Intent::GreenAlert
    } else if is_one_of(text, RED_ALERT_PHRASES) {
        Intent::RedAlert
    } else if is_one_of(text, YELLOW_ALERT_PHRASES) {
        Intent::YellowAlert
    } else {
        return None;
    };
    Some(BridgeCommand::new(intent))
}

fn reports(text: &str) -> Option<BridgeCommand> {
    let intent = if is_one_of(text, STATUS_PHRASES) {
        Intent::Status
    } else if is_one_of(text, DAMAGE_PHRASES) {
        Intent::DamageReport
    } else if is_one_of(text, VIEWSCREEN_PHRASES) {
        Intent::Viewscreen
    } else {
        return None;
    };
    Some(BridgeCommand::new(intent))
}

fn orbit(text: &str) -> Option<BridgeCommand> {
    let caps = ORBIT.captures(text)?;
    let mut cmd = BridgeCommand::new(Intent::Orbit);
    cmd.target = caps.name("target").and_then(|m| object_name(m.as_str()));
    Some(cmd)
}

fn scan_hail_fire(text: &str) -> Option<BridgeCommand> {
    if let Some(caps) = FIRE.captures(text) {
        let target = caps
            .name("target")
            .and_then(|m| object_name(m.as_str()))
            .unwrap_or_else(|| DEFAULT_FIRE_TARGET.to_string());
        let mut cmd = BridgeCommand::new(Intent::Fire).with_target(target);
        cmd.maneuver = caps.name("weapon").map(|m| m.as_str().to_string());
        return Some(cmd);
    }

    let (intent, caps) = if let Some(caps) = SCAN.captures(text) {
        (Intent::Scan, caps)
    } else if let Some(caps) = HAIL.captures(text) {
        (Intent::Hail, caps)
    } else {
        return None;
    };

    let mut cmd = BridgeCommand::new(intent);
    cmd.target = caps.name("target").and_then(|m| object_name(m.as_str()));
    Some(cmd)
}

fn dock_land(text: &str) -> Option<BridgeCommand> {
    let (intent, caps) = if let Some(caps) = DOCK.captures(text) {
        (Intent::Dock, caps)
    } else if let Some(caps) = LAND.captures(text) {
        (Intent::Land, caps)
    } else {
        return None;
    };

    let target = caps
        .name("target")
        .and_then(|m| object_name(m.as_str()))
        .unwrap_or_else(|| PRIMARY_STATION.to_string());
    Some(BridgeCommand::new(intent).with_target(target))
}

fn navigation(text: &str) -> Option<BridgeCommand> {
    let (target, warp) = NAVIGATION
        .iter()
        .filter_map(|re| re.captures(text))
        .find_map(|caps| {
            let target = destination(caps.name("dest")?.as_str())?;
            Some((target, captured_number(&caps, "warp")))
        })
        .or_else(|| destination(text).map(|target| (target, None)))?;

    Some(
        BridgeCommand::new(Intent::Navigate)
            .with_target(target)
            .with_warp(warp.unwrap_or(DEFAULT_WARP)),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
