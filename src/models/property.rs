// A single parser-extracted property and its classification

use crate::format::{NumberLocale, format_time_length};
use crate::models::{Attribute, Capability, ErrorBlock, SelftestEntry, Statistic, WarningLevel};
use std::fmt;
use std::time::Duration;

/// Top-level output section a property comes from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Section {
    /// Also used when searching in all sections
    #[default]
    Unknown,
    /// Short info (--info)
    Info,
    /// SMART data
    Data,
    /// Application-specific data
    Internal,
}

impl Section {
    pub fn name(self) -> &'static str {
        match self {
            Section::Unknown => "unknown",
            Section::Info => "info",
            Section::Data => "data",
            Section::Internal => "internal",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Subsection of the SMART data section
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SubSection {
    #[default]
    Unknown,
    /// Overall health (-H)
    Health,
    /// General SMART values (-c)
    Capabilities,
    /// Attributes (-A)
    Attributes,
    /// Device statistics (--log=devstat)
    Devstat,
    /// Error log (--log=error)
    ErrorLog,
    /// Self-test log (--log=selftest)
    SelftestLog,
    /// Selective self-test log (--log=selective)
    SelectiveSelftestLog,
    /// SCT temperature status and history (--log=scttemp)
    TemperatureLog,
    /// SCT error recovery control (--log=scterc)
    ErcLog,
    /// SATA phy event counters (--log=sataphy)
    PhyLog,
    /// Log directory (--log=directory)
    DirectoryLog,
}

impl SubSection {
    pub fn name(self) -> &'static str {
        match self {
            SubSection::Unknown => "unknown",
            SubSection::Health => "health",
            SubSection::Capabilities => "capabilities",
            SubSection::Attributes => "attributes",
            SubSection::Devstat => "devstat",
            SubSection::ErrorLog => "error_log",
            SubSection::SelftestLog => "selftest_log",
            SubSection::SelectiveSelftestLog => "selective_selftest_log",
            SubSection::TemperatureLog => "temperature_log",
            SubSection::ErcLog => "erc_log",
            SubSection::PhyLog => "phy_log",
            SubSection::DirectoryLog => "directory_log",
        }
    }
}

impl fmt::Display for SubSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The typed value of a property. Exactly one kind is held at a time.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PropertyValue {
    #[default]
    Empty,
    String(String),
    Integer(i64),
    Bool(bool),
    /// Time intervals, e.g. self-test durations
    TimeLength(Duration),
    Capability(Capability),
    Attribute(Attribute),
    Statistic(Statistic),
    ErrorBlock(ErrorBlock),
    SelftestEntry(SelftestEntry),
}

impl PropertyValue {
    /// Name of the held value kind, used in dumps
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Empty => "empty",
            PropertyValue::String(_) => "string",
            PropertyValue::Integer(_) => "integer",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::TimeLength(_) => "time_length",
            PropertyValue::Capability(_) => "capability",
            PropertyValue::Attribute(_) => "attribute",
            PropertyValue::Statistic(_) => "statistic",
            PropertyValue::ErrorBlock(_) => "error_block",
            PropertyValue::SelftestEntry(_) => "selftest_entry",
        }
    }
}

/// A single property extracted from smartctl output.
///
/// Properties are appended to their device in parse order. Several
/// properties may share a name (e.g. one per attribute row), so they are
/// kept in a list rather than a map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Property {
    /// Name as printed by smartctl
    pub reported_name: String,
    /// Program-identifiable name, e.g. "model_name"
    pub generic_name: String,
    /// User-facing name
    pub displayable_name: String,
    /// Tooltip-style description
    pub description: String,
    pub section: Section,
    /// Only meaningful in the data section
    pub subsection: SubSection,
    /// Value text as printed by smartctl
    pub reported_value: String,
    /// Readable value supplied by the parser; overrides the typed value when set
    pub readable_value: String,
    pub value: PropertyValue,
    pub warning_level: WarningLevel,
    /// Why the warning level was raised (displayable)
    pub warning_reason: String,
    pub show_in_ui: bool,
}

impl Property {
    /// Creates an empty property in `section` named `reported_name`.
    pub fn new(section: Section, reported_name: &str) -> Self {
        let mut p = Self {
            section,
            show_in_ui: true,
            ..Default::default()
        };
        p.set_name(reported_name, "", "");
        p
    }

    /// Sets all three names. Empty generic or readable names fall back to the reported one.
    pub fn set_name(&mut self, reported: &str, generic: &str, readable: &str) {
        self.reported_name = reported.to_string();
        self.generic_name = if generic.is_empty() { reported } else { generic }.to_string();
        self.displayable_name = if readable.is_empty() { reported } else { readable }.to_string();
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    /// Description for display. With `clean`, an empty description stays empty.
    pub fn description(&self, clean: bool) -> &str {
        if clean || !self.description.is_empty() {
            &self.description
        } else {
            "No description available"
        }
    }

    pub fn value_type_name(&self) -> &'static str {
        self.value.type_name()
    }

    /// True if no value has been set
    pub fn is_empty(&self) -> bool {
        matches!(self.value, PropertyValue::Empty)
    }

    /// Formats the value for display.
    /// A parser-supplied `readable_value` always wins. With `add_reported_too`,
    /// scalar values are followed by the reported text in brackets.
    pub fn format_value(&self, add_reported_too: bool) -> String {
        self.format_value_with(add_reported_too, &NumberLocale::system())
    }

    pub fn format_value_with(&self, add_reported_too: bool, locale: &NumberLocale) -> String {
        if !self.readable_value.is_empty() {
            return self.readable_value.clone();
        }

        let scalar = match &self.value {
            PropertyValue::Empty => return "[unknown]".to_string(),
            PropertyValue::String(s) => return s.clone(),
            PropertyValue::Integer(n) => locale.format_integer(*n),
            PropertyValue::Bool(b) => yes_no(*b).to_string(),
            PropertyValue::TimeLength(d) => format_time_length(*d),
            PropertyValue::Capability(c) => return c.to_string(),
            PropertyValue::Attribute(a) => return a.to_string(),
            PropertyValue::Statistic(s) => return s.to_string(),
            PropertyValue::ErrorBlock(b) => return b.to_string(),
            PropertyValue::SelftestEntry(e) => return e.to_string(),
        };

        if add_reported_too {
            format!("{} [{}]", scalar, self.reported_value)
        } else {
            scalar
        }
    }

    /// Full debugging representation, indented by `offset` spaces.
    pub fn dump(&self, offset: usize) -> String {
        let mut out = format!("{:offset$}[{}", "", self.section, offset = offset);
        if self.section == Section::Data {
            out.push_str(", ");
            out.push_str(self.subsection.name());
        }
        out.push_str(&format!(
            "] {}: [{}] ",
            self.generic_name,
            self.value_type_name()
        ));

        let body = match &self.value {
            PropertyValue::Empty => "[empty]".to_string(),
            PropertyValue::String(s) => s.clone(),
            PropertyValue::Integer(n) => format!("{} [{}]", n, self.reported_value),
            PropertyValue::Bool(b) => format!("{} [{}]", yes_no(*b), self.reported_value),
            PropertyValue::TimeLength(d) => {
                format!("{} sec [{}]", d.as_secs(), self.reported_value)
            }
            PropertyValue::Capability(c) => c.to_string(),
            PropertyValue::Attribute(a) => a.to_string(),
            PropertyValue::Statistic(s) => s.to_string(),
            PropertyValue::ErrorBlock(b) => b.to_string(),
            PropertyValue::SelftestEntry(e) => e.to_string(),
        };
        out.push_str(&body);
        out
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump(0))
    }
}

fn yes_no(b: bool) -> &'static str {
    if b { "Yes" } else { "No" }
}
