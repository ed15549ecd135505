//! Discord adapter: gateway websocket for inbound messages, REST for replies

pub mod gateway;
pub mod rest;
pub mod types;

pub use gateway::DiscordGateway;
pub use rest::DiscordRest;
pub use types::{Embed, EmbedField, GatewayEvent};
