// Locale-aware number grouping and human-readable time lengths

use std::env;
use std::sync::LazyLock;
use std::time::Duration;

/// Digit grouping rules for a locale.
/// Only the thousands separator matters here; smartctl values are integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumberLocale {
    /// Thousands separator, or None for plain digits
    separator: Option<char>,
}

/// Locale resolved from the environment on first use
static SYSTEM_LOCALE: LazyLock<NumberLocale> = LazyLock::new(NumberLocale::from_environment);

impl NumberLocale {
    /// The "C" locale: no grouping at all.
    pub const INVARIANT: NumberLocale = NumberLocale { separator: None };

    /// Creates a locale grouping thousands with `separator`.
    pub const fn with_separator(separator: char) -> Self {
        Self {
            separator: Some(separator),
        }
    }

    /// The locale of the running process.
    pub fn system() -> Self {
        *SYSTEM_LOCALE
    }

    /// Resolves a POSIX locale name such as `de_DE.UTF-8` or `fr_FR@euro`.
    /// Returns None if the language is not one we know the grouping for.
    pub fn from_name(name: &str) -> Option<Self> {
        let base = name
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .trim();
        if base.is_empty() || base == "C" || base == "POSIX" {
            return Some(Self::INVARIANT);
        }

        let mut parts = base.split(['_', '-']);
        let lang = parts.next().unwrap_or_default().to_ascii_lowercase();
        let territory = parts.next().unwrap_or_default().to_ascii_uppercase();

        if territory == "CH" && matches!(lang.as_str(), "de" | "it") {
            return Some(Self::with_separator('\''));
        }

        let separator = match lang.as_str() {
            "en" | "ja" | "zh" | "ko" | "he" | "th" | "hi" | "ga" | "cy" | "ms" | "ta" => ',',
            "de" | "es" | "it" | "nl" | "pt" | "da" | "id" | "tr" | "el" | "ro" | "sl"
            | "hr" | "sr" | "vi" => '.',
            "fr" | "ru" | "pl" | "cs" | "sk" | "sv" | "fi" | "nb" | "nn" | "no" | "uk"
            | "hu" | "bg" | "et" | "lv" | "lt" | "kk" => '\u{a0}',
            _ => return None,
        };
        Some(Self::with_separator(separator))
    }

    /// Looks at LC_ALL, LC_NUMERIC and LANG in the order libc does.
    /// Anything unrecognised falls back to the invariant locale.
    fn from_environment() -> Self {
        let name = ["LC_ALL", "LC_NUMERIC", "LANG"]
            .iter()
            .filter_map(|var| env::var(var).ok())
            .find(|value| !value.is_empty());

        match name {
            Some(name) => Self::from_name(&name).unwrap_or_else(|| {
                tracing::debug!("no digit grouping known for locale {:?}, using plain digits", name);
                Self::INVARIANT
            }),
            None => Self::INVARIANT,
        }
    }

    /// Formats an integer with this locale's thousands separator.
    pub fn format_integer(&self, n: impl Into<i128>) -> String {
        let n: i128 = n.into();
        let digits = n.unsigned_abs().to_string();
        let Some(sep) = self.separator else {
            return n.to_string();
        };

        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if n < 0 {
            out.push('-');
        }
        let lead = digits.len() % 3;
        for (i, ch) in digits.chars().enumerate() {
            if i != 0 && (i + 3 - lead) % 3 == 0 {
                out.push(sep);
            }
            out.push(ch);
        }
        out
    }
}

/// Formats an integer using the process locale.
pub fn number_to_string_locale(n: impl Into<i128>) -> String {
    NumberLocale::system().format_integer(n)
}

/// Formats `raw_int` with grouping if `raw` is exactly its decimal form.
/// Values like "120 (Average 18)" carry extra structure and pass through unchanged.
pub fn format_raw_number(raw: &str, raw_int: i64, locale: &NumberLocale) -> String {
    if raw_int.to_string() == raw {
        locale.format_integer(raw_int)
    } else {
        raw.to_string()
    }
}

/// Formats a duration as a rough human-readable length, e.g. "45 sec" or "3 hours".
pub fn format_time_length(length: Duration) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    let secs = length.as_secs();
    if secs < 2 * MINUTE {
        format!("{} sec", secs)
    } else if secs < 2 * HOUR {
        format!("{} min", (secs + MINUTE / 2) / MINUTE)
    } else if secs < 2 * DAY {
        format!("{} hours", (secs + HOUR / 2) / HOUR)
    } else {
        format!("{} days", (secs + DAY / 2) / DAY)
    }
}
