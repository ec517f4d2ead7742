// One row of the SMART attributes table

use crate::format::{NumberLocale, format_raw_number};
use std::fmt;

/// Pre-failure / old-age classification of an attribute
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AttributeType {
    #[default]
    Unknown,
    /// Reported as "Pre-fail"
    Prefail,
    /// Reported as "Old_age"
    OldAge,
}

impl AttributeType {
    /// Readable type name
    pub fn name(self) -> &'static str {
        match self {
            AttributeType::Unknown => "[unknown]",
            AttributeType::Prefail => "pre-failure",
            AttributeType::OldAge => "old age",
        }
    }
}

/// When the attribute gets updated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UpdateType {
    #[default]
    Unknown,
    /// Continuously (reported: "Always")
    Always,
    /// Only during offline data collection (reported: "Offline")
    Offline,
}

impl UpdateType {
    /// Readable when-updated name
    pub fn name(self) -> &'static str {
        match self {
            UpdateType::Unknown => "[unknown]",
            UpdateType::Always => "continuously",
            UpdateType::Offline => "on offline data collect.",
        }
    }
}

/// When the normalized value crossed the threshold, if ever
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FailTime {
    #[default]
    Unknown,
    /// Never (reported: "-")
    None,
    /// In the past (reported: "In_the_past")
    Past,
    /// Right now (reported: "FAILING_NOW")
    Now,
    /// Not applicable, NVMe devices have no thresholds
    NotAvailable,
}

impl FailTime {
    /// Readable when-failed name
    pub fn name(self) -> &'static str {
        match self {
            FailTime::Unknown => "[unknown]",
            FailTime::None => "never",
            FailTime::Past => "in the past",
            FailTime::Now => "now",
            FailTime::NotAvailable => "not available",
        }
    }
}

/// A single SMART attribute.
/// Normalized values may be absent ("---" in smartctl output).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute ID, -1 if unknown
    pub id: i32,
    /// Flag column: "0x0033" in the old format, "PO--CK" in the brief one
    pub flag: String,
    /// Normalized value, 0-255
    pub value: Option<u8>,
    /// Worst normalized value ever seen
    pub worst: Option<u8>,
    /// Failure threshold for the normalized value
    pub threshold: Option<u8>,
    pub attr_type: AttributeType,
    pub update_type: UpdateType,
    pub when_failed: FailTime,
    /// Raw value as printed by smartctl
    pub raw_value: String,
    /// Raw value parsed as an integer
    pub raw_value_int: i64,
}

impl Default for Attribute {
    fn default() -> Self {
        Self {
            id: -1,
            flag: String::new(),
            value: None,
            worst: None,
            threshold: None,
            attr_type: AttributeType::Unknown,
            update_type: UpdateType::Unknown,
            when_failed: FailTime::Unknown,
            raw_value: String::new(),
            raw_value_int: 0,
        }
    }
}

impl Attribute {
    /// Raw value with thousands grouping if it is a plain number.
    pub fn format_raw_value(&self) -> String {
        self.format_raw_value_with(&NumberLocale::system())
    }

    pub fn format_raw_value_with(&self, locale: &NumberLocale) -> String {
        format_raw_number(&self.raw_value, self.raw_value_int, locale)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => write!(f, "{}", v)?,
            None => f.write_str("-")?,
        }
        write!(f, " ({})", self.format_raw_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(raw: &str, raw_int: i64) -> Attribute {
        Attribute {
            id: 9,
            flag: "0x0032".into(),
            value: Some(97),
            worst: Some(97),
            threshold: Some(0),
            attr_type: AttributeType::OldAge,
            update_type: UpdateType::Always,
            when_failed: FailTime::None,
            raw_value: raw.into(),
            raw_value_int: raw_int,
        }
    }

    #[test]
    fn plain_raw_value_is_grouped() {
        let en = NumberLocale::with_separator(',');
        assert_eq!(attr("100", 100).format_raw_value_with(&en), "100");
        assert_eq!(attr("100", 100).format_raw_value(), "100");
        assert_eq!(attr("2853412", 2853412).format_raw_value_with(&en), "2,853,412");
    }

    #[test]
    fn structured_raw_value_is_kept() {
        let a = attr("120 (Average 18)", 120);
        assert_eq!(a.format_raw_value(), "120 (Average 18)");
        assert_eq!(a.format_raw_value_with(&NumberLocale::with_separator(',')), "120 (Average 18)");
    }

    #[test]
    fn display_shows_missing_normalized_value() {
        let mut a = attr("42", 42);
        assert_eq!(a.to_string(), "97 (42)");
        a.value = None;
        assert_eq!(a.to_string(), "- (42)");
    }

    #[test]
    fn names() {
        assert_eq!(AttributeType::Prefail.name(), "pre-failure");
        assert_eq!(UpdateType::Offline.name(), "on offline data collect.");
        assert_eq!(FailTime::NotAvailable.name(), "not available");
        assert_eq!(Attribute::default().id, -1);
    }
}
