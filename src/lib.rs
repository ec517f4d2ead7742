//! SMART property model and drive detection on top of smartctl.

pub mod config;
pub mod detect;
pub mod error;
pub mod executor;
pub mod format;
pub mod models;
pub mod storage;
