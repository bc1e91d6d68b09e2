//! Messaging port + cross-messenger types.

pub mod port;
pub mod types;
