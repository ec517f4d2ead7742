// Storage devices and parsing of their basic smartctl data

mod device;
mod info_parser;

pub use device::{DetectedType, SmartStatus, StorageDevice};
pub use info_parser::parse_basic_output;
