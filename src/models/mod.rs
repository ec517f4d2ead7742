// Data model for SMART properties reported by smartctl

mod attribute;
mod capability;
mod error_block;
mod property;
mod selftest;
mod statistic;
mod warning;

pub use attribute::{Attribute, AttributeType, FailTime, UpdateType};
pub use capability::Capability;
pub use error_block::ErrorBlock;
pub use property::{Property, PropertyValue, Section, SubSection};
pub use selftest::{SelftestEntry, SelftestStatus, StatusSeverity};
pub use statistic::Statistic;
pub use warning::WarningLevel;
