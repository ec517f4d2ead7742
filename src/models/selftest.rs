// One entry of the self-test log

use crate::format::NumberLocale;
use std::fmt;

/// Outcome of a self-test run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SelftestStatus {
    #[default]
    Unknown,
    /// Completed with no error, or no test was run
    CompletedNoError,
    AbortedByHost,
    /// Interrupted by a host reset
    Interrupted,
    /// Treated as a test failure
    FatalOrUnknown,
    ComplUnknownFailure,
    ComplElectricalFailure,
    ComplServoFailure,
    ComplReadFailure,
    ComplHandlingDamage,
    InProgress,
    Reserved,
}

/// How bad a self-test status is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusSeverity {
    #[default]
    None,
    Warning,
    Error,
}

impl SelftestStatus {
    pub fn displayable_name(self) -> &'static str {
        match self {
            SelftestStatus::Unknown => "[unknown]",
            SelftestStatus::CompletedNoError => "Completed without error",
            SelftestStatus::AbortedByHost => "Manually aborted",
            SelftestStatus::Interrupted => "Interrupted (host reset)",
            SelftestStatus::FatalOrUnknown => "Fatal or unknown error",
            SelftestStatus::ComplUnknownFailure => "Completed with unknown failure",
            SelftestStatus::ComplElectricalFailure => "Completed with electrical failure",
            SelftestStatus::ComplServoFailure => "Completed with servo/seek failure",
            SelftestStatus::ComplReadFailure => "Completed with read failure",
            SelftestStatus::ComplHandlingDamage => "Completed: handling damage",
            SelftestStatus::InProgress => "In progress",
            SelftestStatus::Reserved => "Unknown / reserved state",
        }
    }

    pub fn severity(self) -> StatusSeverity {
        match self {
            SelftestStatus::Unknown
            | SelftestStatus::CompletedNoError
            | SelftestStatus::InProgress
            | SelftestStatus::Reserved => StatusSeverity::None,
            SelftestStatus::AbortedByHost | SelftestStatus::Interrupted => StatusSeverity::Warning,
            SelftestStatus::FatalOrUnknown
            | SelftestStatus::ComplUnknownFailure
            | SelftestStatus::ComplElectricalFailure
            | SelftestStatus::ComplServoFailure
            | SelftestStatus::ComplReadFailure
            | SelftestStatus::ComplHandlingDamage => StatusSeverity::Error,
        }
    }
}

/// A self-test log entry.
/// The "Self-test execution status" capability uses the same type with `test_num` 0.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelftestEntry {
    /// Starts from 1; whether larger is older or newer depends on the model
    pub test_num: u32,
    /// "Extended offline", "Short offline", ...
    pub test_type: String,
    /// Status text as reported
    pub status_str: String,
    pub status: SelftestStatus,
    /// Remaining percent; None if not applicable
    pub remaining_percent: Option<u8>,
    /// Power-on hours when the test ran
    pub lifetime_hours: u32,
    /// "-" or the LBA, usually hex
    pub lba_of_first_error: String,
}

impl SelftestEntry {
    /// Status text. Falls back to the reported text for statuses we don't recognise.
    pub fn status_str(&self) -> String {
        match self.status {
            SelftestStatus::Unknown => self.status_str.clone(),
            status => status.displayable_name().to_string(),
        }
    }

    pub fn severity(&self) -> StatusSeverity {
        self.status.severity()
    }

    pub fn format_lifetime_hours(&self) -> String {
        NumberLocale::system().format_integer(self.lifetime_hours)
    }
}

impl fmt::Display for SelftestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Test entry {}: {}, status: {}, remaining: ",
            self.test_num,
            self.test_type,
            self.status_str()
        )?;
        match self.remaining_percent {
            Some(p) => write!(f, "{}", p),
            None => f.write_str("-"),
        }
    }
}
