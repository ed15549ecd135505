//! Utils Module - Helper Functions & Shared Utilities
//!
//! Constants, display formatting and runtime counters shared across the bot.

pub mod constants;
pub mod format;
pub mod telemetry;

pub use constants::*;
pub use format::*;
pub use telemetry::*;
