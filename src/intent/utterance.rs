//! Transcript clean-up and spoken-number parsing.
//!
//! Whisper output arrives with capitals, punctuation and the occasional
//! vocative ("Helm, set course for Mars."). [`preprocess`] folds all of
//! that into the flat lower-case form the fast-path patterns expect.

/// Station names a speaker may address before the order itself.
const VOCATIVES: &[&str] = &[
    "helm",
    "tactical",
    "engineering",
    "ops",
    "computer",
    "ensign",
    "bridge",
];

/// Trailing confirmations that carry no information of their own.
const TRAILING_CONFIRMATIONS: &[&str] = &[
    " and make it so",
    " make it so",
    " and engage",
    " engage",
    " energize",
];

/// Normalize a raw transcript.
///
/// * lower-case;
/// * `,;:!?"` and sentence periods become spaces (a `.` between two digits
///   is kept, so "9.9" survives);
/// * `-` becomes a space and `%` becomes " percent";
/// * whitespace is collapsed;
/// * a leading vocative and a trailing "engage" are removed when other
///   words remain.
///
/// ```
/// use bridge_ai::intent::preprocess;
///
/// assert_eq!(preprocess("Helm, set course for Mars. Warp 5!"), "set course for mars warp 5");
/// assert_eq!(preprocess("Maximum warp, 9.9."), "maximum warp 9.9");
/// assert_eq!(preprocess("Engage."), "engage");
/// ```
pub fn preprocess(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let chars: Vec<char> = lowered.chars().collect();

    let mut folded = String::with_capacity(lowered.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '.' => {
                let prev_digit = i > 0 && chars[i - 1].is_ascii_digit();
                let next_digit = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
                folded.push(if prev_digit && next_digit { '.' } else { ' ' });
            }
            ',' | ';' | ':' | '!' | '?' | '"' | '-' => folded.push(' '),
            '%' => folded.push_str(" percent"),
            _ => folded.push(c),
        }
    }

    let mut text = folded.split_whitespace().collect::<Vec<_>>().join(" ");

    for vocative in VOCATIVES {
        if let Some(rest) = text.strip_prefix(vocative) {
            if let Some(rest) = rest.strip_prefix(' ') {
                text = rest.to_string();
                break;
            }
        }
    }

    for suffix in TRAILING_CONFIRMATIONS {
        if let Some(rest) = text.strip_suffix(suffix) {
            if !rest.is_empty() {
                text = rest.to_string();
                break;
            }
        }
    }

    text
}

// ---------------------------------------------------------------------------
// Spoken numbers
// ---------------------------------------------------------------------------

/// Regex fragment matching a number written in digits or spoken in words
/// ("7", "9.9", "seven", "nine point nine five").
pub(crate) const NUMBER_PATTERN: &str = r"\d+(?:\.\d+)?|(?:zero|one|two|three|four|five|six|seven|eight|nine|ten)(?: point(?: (?:zero|one|two|three|four|five|six|seven|eight|nine))+)?";

fn word_value(word: &str) -> Option<u32> {
    let value = match word {
        "zero" => 0,
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        other => return other.parse().ok(),
    };
    Some(value)
}

/// Parse a number matched by [`NUMBER_PATTERN`].
///
/// ```
/// use bridge_ai::intent::parse_number;
///
/// assert_eq!(parse_number("7"), Some(7.0));
/// assert_eq!(parse_number("nine point nine"), Some(9.9));
/// assert_eq!(parse_number("warp"), None);
/// ```
pub fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<f64>() {
        return Some(n);
    }

    let mut words = raw.split_whitespace();
    let whole = word_value(words.next()?)?;
    match words.next() {
        None => Some(f64::from(whole)),
        Some("point") => {
            let digits = words
                .map(|w| {
                    word_value(w)
                        .filter(|d| *d < 10)
                        .and_then(|d| char::from_digit(d, 10))
                })
                .collect::<Option<String>>()?;
            if digits.is_empty() {
                return None;
            }
            format!("{whole}.{digits}").parse().ok()
        }
        Some(_) => None,
    }
}
