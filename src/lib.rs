//! Solscope Library
//!
//! Chat bot core that spots Solana addresses in messages and answers with:
//! - Wallet balance
//! - Explorer links for programs and data accounts
//! - Holder concentration and bundling heuristics for token mints

pub mod api;
pub mod bot;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use bot::AddressBot;
pub use self::core::{
    AccountClassifier, AddressExtractor, ChainReader, Presenter, ReplySink, TokenAnalyzer,
};
pub use models::{
    AccountKind, AppError, AppResult, BotConfig, Classification, CliArgs, ErrorCode, Reply,
    SolAddress, TokenAnalysis,
};
pub use providers::{DiscordGateway, DiscordRest, SolanaRpcClient};
pub use utils::telemetry::{BotTelemetry, TelemetryStats};
