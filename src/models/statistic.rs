// One line of the device statistics (devstat) log

use crate::format::{NumberLocale, format_raw_number};
use std::fmt;

/// A device statistics entry, identified by its log page and offset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Statistic {
    /// Page header lines carry no value
    pub is_header: bool,
    /// Flags in "NDC" / "---" form
    pub flags: String,
    /// Value as printed by smartctl
    pub value: String,
    /// Value parsed as an integer
    pub value_int: i64,
    pub page: i64,
    pub offset: i64,
}

impl Statistic {
    /// Whether the value is normalized ('N' flag)
    pub fn is_normalized(&self) -> bool {
        self.flags.contains('N')
    }

    /// Value with thousands grouping if it is a plain number.
    pub fn format_value(&self) -> String {
        self.format_value_with(&NumberLocale::system())
    }

    pub fn format_value_with(&self, locale: &NumberLocale) -> String {
        format_raw_number(&self.value, self.value_int, locale)
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
