// One entry of the ATA error log

use crate::format::NumberLocale;
use crate::models::WarningLevel;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Known ATA error register codes with their description and severity.
static ERROR_TYPES: LazyLock<HashMap<&'static str, (&'static str, WarningLevel)>> =
    LazyLock::new(|| {
        HashMap::from([
            ("ABRT", ("Command aborted", WarningLevel::None)),
            ("AMNF", ("Address mark not found", WarningLevel::Alert)),
            ("CCTO", ("Command completion timed out", WarningLevel::Warning)),
            ("EOM", ("End of media", WarningLevel::Warning)),
            ("ICRC", ("Interface CRC error", WarningLevel::Warning)),
            ("IDNF", ("Identity not found", WarningLevel::Alert)),
            ("ILI", ("(Packet command-set specific)", WarningLevel::Notice)),
            ("MC", ("Media changed", WarningLevel::None)),
            ("MCR", ("Media change request", WarningLevel::None)),
            ("NM", ("No media", WarningLevel::None)),
            ("obs", ("Obsolete", WarningLevel::None)),
            ("TK0NF", ("Track 0 not found", WarningLevel::Alert)),
            ("UNC", ("Uncorrectable error in data", WarningLevel::Alert)),
            ("WP", ("Media is write protected", WarningLevel::None)),
        ])
    });

/// An error log block, e.g.
/// `Error 1 occurred at disk power-on lifetime: 1234 hours ... Error: UNC at LBA = ...`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorBlock {
    pub error_num: u32,
    /// Power-on hours when the error happened
    pub lifetime_hours: u32,
    /// Device state at the time, "active or idle", "standby", ...
    pub device_state: String,
    /// Error codes as reported, e.g. "UNC"
    pub reported_types: Vec<String>,
    /// Extra detail, e.g. "at LBA = 0x0253eac0 = 39054016"
    pub type_more_info: String,
}

impl ErrorBlock {
    /// Human-readable description of one error code.
    /// Never fails; unknown codes get a generated description.
    pub fn describe_error_type(code: &str) -> String {
        match ERROR_TYPES.get(code) {
            Some((description, _)) => (*description).to_string(),
            None if code.is_empty() => "Unknown type".to_string(),
            None => format!("Unknown type: {}", code),
        }
    }

    /// Descriptions of all `types`, joined with ", ".
    pub fn displayable_error_types<S: AsRef<str>>(types: &[S]) -> String {
        types
            .iter()
            .map(|t| Self::describe_error_type(t.as_ref()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Severity of an error code; unknown codes are not considered a problem.
    pub fn warning_level_for_error_type(code: &str) -> WarningLevel {
        ERROR_TYPES
            .get(code)
            .map(|(_, level)| *level)
            .unwrap_or(WarningLevel::None)
    }

    /// Worst severity among the reported codes
    pub fn warning_level(&self) -> WarningLevel {
        self.reported_types
            .iter()
            .map(|t| Self::warning_level_for_error_type(t))
            .max()
            .unwrap_or_default()
    }

    pub fn format_lifetime_hours(&self) -> String {
        NumberLocale::system().format_integer(self.lifetime_hours)
    }
}

impl fmt::Display for ErrorBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error number {}: {} [{}]",
            self.error_num,
            self.reported_types.join(", "),
            Self::displayable_error_types(&self.reported_types)
        )
    }
}
