// Severity levels attached to properties and error log codes

use std::fmt;

/// How serious a reported condition is.
/// Levels are ordered, so the worst of several can be taken with `max`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WarningLevel {
    /// Nothing to report
    #[default]
    None,
    /// Informational, not a problem by itself
    Notice,
    /// Something the user should look at
    Warning,
    /// Likely data loss or imminent failure
    Alert,
}

impl WarningLevel {
    pub fn name(self) -> &'static str {
        match self {
            WarningLevel::None => "none",
            WarningLevel::Notice => "notice",
            WarningLevel::Warning => "warning",
            WarningLevel::Alert => "alert",
        }
    }
}

impl fmt::Display for WarningLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
