//! Solscope - Solana address lookup bot for Discord
//!
//! Watches chat for wallet, program and token mint addresses (bare or inside
//! Solscan / BullX / Photon links) and replies with a summary embed.

use solscope::api::{self, AppState, SharedChain};
use solscope::utils::constants::{APP_NAME, APP_VERSION};
use solscope::{
    AddressBot, BotConfig, BotTelemetry, CliArgs, DiscordGateway, DiscordRest, SolanaRpcClient,
};

use clap::Parser;
use eyre::Result;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("🚀 {} v{} starting", APP_NAME, APP_VERSION);

    let args = CliArgs::parse();

    // Missing credential halts the process
    let config = match BotConfig::from_args(args) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!(code = e.code_str(), "{}", e.message);
            return Err(e.into());
        }
    };

    let rpc = SolanaRpcClient::from_config(&config)?;
    let rest = DiscordRest::from_config(&config)?;
    let telemetry = Arc::new(BotTelemetry::new());

    if let Some(addr) = config.api_addr {
        let chain: SharedChain = Arc::new(rpc.clone());
        let state = Arc::new(AppState::new(&config, chain, telemetry.clone()));
        tokio::spawn(async move {
            if let Err(e) = api::serve(addr, state).await {
                error!("❌ Inspection API stopped: {}", e);
            }
        });
    }

    let bot = AddressBot::new(&config, rpc, rest, telemetry.clone());
    let events = DiscordGateway::from_config(&config).spawn();

    info!("🤖 Bot is now running. Press CTRL-C to exit.");

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        result = bot.run(events) => {
            if let Err(e) = result {
                error!("❌ Error: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Shutting down gracefully...");
        }
    }

    let stats = telemetry.snapshot();
    info!("📊 Final Statistics:");
    info!("   Messages seen:    {}", stats.messages_seen);
    info!("   Addresses found:  {}", stats.addresses_extracted);
    info!("   Wallets:          {}", stats.wallets);
    info!("   Contracts:        {}", stats.contracts);
    info!("   Tokens:           {}", stats.tokens);
    info!("   Lookup failures:  {}", stats.lookup_failures);
    info!("   Replies sent:     {}", stats.replies_sent);
    info!("   Avg latency:      {:.2}ms", stats.avg_lookup_latency_ms);

    Ok(())
}
