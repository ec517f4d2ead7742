// One block of the "General SMART Values" (capabilities) subsection

use std::fmt;

/// A flag value with its decoded description lines, e.g.
/// `Offline data collection capabilities: (0x7b) SMART execute Offline immediate. ...`
/// Time-interval blocks are stored as durations, not capabilities.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Capability {
    /// Flag value as printed by smartctl, e.g. "0x7b"
    pub reported_flag_value: String,
    /// Parsed flag value. One byte, sometimes two.
    pub flag_value: u16,
    /// Description text exactly as printed
    pub reported_strvalue: String,
    /// Individual capability lines of the block
    pub strvalues: Vec<String>,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.flag_value)?;
        for line in &self.strvalues {
            write!(f, "\n\t{}", line)?;
        }
        Ok(())
    }
}
