//! Providers Module - External Data Sources
//!
//! Solana JSON-RPC for chain reads, Discord for the chat surface.

pub mod discord;
pub mod solana;

pub use discord::{DiscordGateway, DiscordRest, GatewayEvent};
pub use solana::SolanaRpcClient;
