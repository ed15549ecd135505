//! Core Module - Address Detection & Account Analytics
//!
//! Extraction, classification, holder analysis and reply rendering.
//! Nothing here talks to the network directly; chain access goes through
//! the `ChainReader` port.

pub mod classifier;
pub mod extractor;
pub mod ports;
pub mod presenter;
pub mod token_analyzer;

pub use classifier::*;
pub use extractor::*;
pub use ports::*;
pub use presenter::*;
pub use token_analyzer::*;
