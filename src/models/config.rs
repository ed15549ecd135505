//! Configuration module for Solscope
//!
//! Built once at startup from CLI flags / environment and shared read-only
//! (`Arc<BotConfig>`) with every component. Defaults come from
//! utils/constants.rs.

use clap::Parser;
use regex::Regex;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

use super::errors::{AppError, AppResult};
use crate::utils::constants::{
    ExplorerInfo, DEFAULT_EXPLORERS, DEFAULT_MAX_CONCURRENT_HANDLERS, DEFAULT_SOLANA_RPC_URL,
    DEFAULT_STATUS_TEXT, DISCORD_API_BASE, DISCORD_GATEWAY_URL, DISCORD_INTENTS,
};

/// Command line flags
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Replies to Solana addresses with wallet, contract or token summaries")]
pub struct CliArgs {
    /// Bot Token
    #[arg(short = 't', long = "token", env = "DISCORD_BOT_TOKEN", default_value = "", hide_env_values = true)]
    pub token: String,

    /// Solana RPC Url
    #[arg(long = "rpc", env = "SOLANA_RPC_URL", default_value = DEFAULT_SOLANA_RPC_URL)]
    pub rpc: String,

    /// Port for the HTTP inspection API (disabled when absent)
    #[arg(long, env = "SOLSCOPE_API_PORT")]
    pub api_port: Option<u16>,

    /// Bind host for the HTTP inspection API
    #[arg(long, env = "SOLSCOPE_API_HOST", default_value = "0.0.0.0")]
    pub api_host: String,

    /// Maximum number of messages processed concurrently
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT_HANDLERS)]
    pub max_concurrent: usize,

    /// Timeout for chain RPC calls in seconds (none unless set)
    #[arg(long, env = "SOLANA_RPC_TIMEOUT_SECS")]
    pub rpc_timeout_secs: Option<u64>,

    /// Presence text shown under the bot's name
    #[arg(long, default_value = DEFAULT_STATUS_TEXT)]
    pub status: String,
}

/// Named external viewer: detects embedded addresses and builds outbound links
#[derive(Debug, Clone)]
pub struct ExplorerLink {
    pub name: String,
    pub base_url: String,
    /// Must capture the address in group 1
    pub pattern: Regex,
}

impl ExplorerLink {
    /// Compile a static explorer entry
    pub fn from_info(info: &ExplorerInfo) -> AppResult<Self> {
        let pattern = Regex::new(info.pattern).map_err(|e| {
            AppError::invalid_config(format!("Bad pattern for explorer {}: {}", info.name, e))
        })?;

        Ok(Self {
            name: info.name.to_string(),
            base_url: info.base_url.to_string(),
            pattern,
        })
    }

    /// Full link to `address` on this explorer
    pub fn link_for(&self, address: &str) -> String {
        format!("{}{}", self.base_url, address)
    }

    /// Address captured from the first URL match in `text`, if any
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Build the default explorer table
pub fn default_explorers() -> AppResult<Vec<ExplorerLink>> {
    DEFAULT_EXPLORERS.iter().map(ExplorerLink::from_info).collect()
}

/// Immutable runtime configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Discord bot credential (never logged)
    pub discord_token: String,
    /// Chain JSON-RPC endpoint
    pub rpc_url: String,
    /// Timeout for chain RPC calls; the transport default applies when unset
    pub rpc_timeout: Option<Duration>,
    /// Explorer table, in detection priority order
    pub explorers: Vec<ExplorerLink>,
    /// Gateway websocket URL
    pub gateway_url: String,
    /// Discord REST base URL
    pub api_base: String,
    /// Gateway intents bitfield
    pub intents: u64,
    /// Presence text
    pub status_text: String,
    /// Maximum concurrent message handlers
    pub max_concurrent_handlers: usize,
    /// Inspection API bind address
    pub api_addr: Option<SocketAddr>,
}

impl BotConfig {
    /// Validate CLI flags into a config. A blank token is fatal.
    pub fn from_args(args: CliArgs) -> AppResult<Self> {
        let token = args.token.trim().to_string();
        if token.is_empty() {
            return Err(AppError::missing_token());
        }

        let rpc_url = validate_rpc_url(&args.rpc)?;

        if args.rpc_timeout_secs == Some(0) {
            return Err(AppError::invalid_config("--rpc-timeout-secs must be at least 1"));
        }

        if args.max_concurrent == 0 {
            return Err(AppError::invalid_config("--max-concurrent must be at least 1"));
        }

        let api_addr = match args.api_port {
            Some(port) => Some(
                format!("{}:{}", args.api_host, port)
                    .parse::<SocketAddr>()
                    .map_err(|e| AppError::invalid_config(format!("Invalid API bind address: {}", e)))?,
            ),
            None => None,
        };

        let config = Self {
            discord_token: token,
            rpc_url,
            rpc_timeout: args.rpc_timeout_secs.map(Duration::from_secs),
            explorers: default_explorers()?,
            gateway_url: DISCORD_GATEWAY_URL.to_string(),
            api_base: DISCORD_API_BASE.to_string(),
            intents: DISCORD_INTENTS,
            status_text: args.status,
            max_concurrent_handlers: args.max_concurrent,
            api_addr,
        };

        info!("🔑 Discord token configured (hidden)");
        info!("📡 RPC endpoint: {}", config.masked_rpc_url());

        Ok(config)
    }

    /// RPC URL with any path/query stripped (API keys often live there)
    pub fn masked_rpc_url(&self) -> String {
        match reqwest::Url::parse(&self.rpc_url) {
            Ok(url) => match url.host_str() {
                Some(host) if url.path() != "/" || url.query().is_some() => {
                    format!("{}://{}/***HIDDEN***", url.scheme(), host)
                }
                Some(host) => format!("{}://{}", url.scheme(), host),
                None => self.rpc_url.clone(),
            },
            Err(_) => self.rpc_url.clone(),
        }
    }

}

/// RPC endpoint must be an http(s) URL
fn validate_rpc_url(url: &str) -> AppResult<String> {
    let parsed = reqwest::Url::parse(url.trim())
        .map_err(|e| AppError::invalid_config(format!("Invalid RPC URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(url.trim().to_string()),
        other => Err(AppError::invalid_config(format!(
            "RPC URL must be http(s), got {}",
            other
        ))),
    }
}
