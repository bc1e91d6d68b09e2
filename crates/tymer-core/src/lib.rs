//! Core domain + application logic for the tymer Pomodoro bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the
//! spreadsheet-like session store live behind ports (traits) implemented in
//! adapter crates.

pub mod chart;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod messaging;
pub mod recorder;
pub mod registry;
pub mod report;
pub mod store;
pub mod timer;

pub use errors::{Error, Result};
