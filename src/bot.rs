//! Bot orchestrator
//!
//! Consumes gateway events and runs every inbound message through
//! extract -> classify -> render -> reply. One task per message, bounded by
//! a semaphore; handlers share only read-only components and the telemetry
//! counters.

use eyre::{eyre, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};

use crate::core::{AccountClassifier, AddressExtractor, ChainReader, Presenter, ReplySink};
use crate::models::{BotConfig, InboundMessage, SolAddress};
use crate::providers::GatewayEvent;
use crate::utils::telemetry::BotTelemetry;

/// Interval of the periodic stats log
const STATS_INTERVAL_SECS: u64 = 60;

/// Read-only pieces every handler needs
pub struct BotContext<C, S> {
    pub extractor: AddressExtractor,
    pub classifier: AccountClassifier<C>,
    pub presenter: Presenter,
    pub sink: S,
    pub telemetry: Arc<BotTelemetry>,
}

/// Main bot struct - drives the message pipeline
pub struct AddressBot<C, S> {
    ctx: Arc<BotContext<C, S>>,
    /// Concurrency limiter
    semaphore: Arc<Semaphore>,
}

impl<C, S> AddressBot<C, S>
where
    C: ChainReader + Clone + 'static,
    S: ReplySink + 'static,
{
    pub fn new(config: &BotConfig, chain: C, sink: S, telemetry: Arc<BotTelemetry>) -> Self {
        let ctx = BotContext {
            extractor: AddressExtractor::from_config(config),
            classifier: AccountClassifier::new(chain),
            presenter: Presenter::from_config(config),
            sink,
            telemetry,
        };

        Self {
            ctx: Arc::new(ctx),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_handlers)),
        }
    }

    pub fn telemetry(&self) -> Arc<BotTelemetry> {
        self.ctx.telemetry.clone()
    }

    /// Consume gateway events until the stream ends or turns fatal
    pub async fn run(&self, mut events: mpsc::Receiver<GatewayEvent>) -> Result<()> {
        info!("🚀 Starting message loop...");

        // Spawn stats printer
        let telemetry = self.ctx.telemetry.clone();
        let stats_task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(STATS_INTERVAL_SECS));
            interval.tick().await;
            loop {
                interval.tick().await;
                info!("📊 Stats | {}", telemetry.snapshot().summary());
            }
        });

        let mut self_id: Option<String> = None;

        let outcome = loop {
            let Some(event) = events.recv().await else {
                break Err(eyre!("Gateway event stream closed"));
            };

            match event {
                GatewayEvent::Ready { user_id, username } => {
                    info!("✅ Bot is now running as {}", username);
                    self_id = Some(user_id);
                }
                GatewayEvent::Message(msg) => {
                    if self_id.as_deref() == Some(msg.author_id.as_str()) {
                        self.ctx.telemetry.record_message();
                        self.ctx.telemetry.record_ignored();
                        continue;
                    }
                    self.dispatch(msg);
                }
                GatewayEvent::Disconnected => {
                    warn!("🔌 Gateway disconnected, waiting for reconnect");
                }
                GatewayEvent::Fatal(reason) => {
                    error!("❌ Gateway failed: {}", reason);
                    break Err(eyre!("Gateway failed: {}", reason));
                }
            }
        };

        stats_task.abort();
        outcome
    }

    /// Spawn a handler task with concurrency limit
    fn dispatch(&self, msg: InboundMessage) {
        let ctx = self.ctx.clone();
        let semaphore = self.semaphore.clone();

        tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(p) => p,
                Err(_) => return,
            };
            ctx.handle_message(&msg).await;
        });
    }

    /// Run one message through the pipeline inline; returns replies sent
    pub async fn handle_message(&self, msg: &InboundMessage) -> usize {
        self.ctx.handle_message(msg).await
    }
}

impl<C, S> BotContext<C, S>
where
    C: ChainReader + Clone,
    S: ReplySink,
{
    pub async fn handle_message(&self, msg: &InboundMessage) -> usize {
        self.telemetry.record_message();

        let addresses = self.extractor.extract(&msg.content);
        if addresses.is_empty() {
            self.telemetry.record_ignored();
            return 0;
        }
        self.telemetry.record_extracted(addresses.len());

        let mut replies = 0;
        for address in &addresses {
            if self.handle_address(msg, address).await {
                replies += 1;
            }
        }
        replies
    }

    /// Lookup failures are logged and dropped; missing accounts are silent
    async fn handle_address(&self, msg: &InboundMessage, address: &SolAddress) -> bool {
        let start = Instant::now();

        let classification = match self.classifier.classify(address).await {
            Ok(c) => c,
            Err(e) => {
                let latency_ms = start.elapsed().as_millis() as u64;
                self.telemetry.record_lookup_error(&e, latency_ms);
                if e.code.is_silent() {
                    debug!(address = %address, code = e.code_str(), "No reply: {}", e.message);
                } else {
                    warn!(address = %address, code = e.code_str(), "Lookup failed: {}", e.message);
                }
                return false;
            }
        };

        self.telemetry
            .record_classified(&classification.kind, start.elapsed().as_millis() as u64);

        let reply = self.presenter.render(&classification);
        match self.sink.send_reply(msg, &reply).await {
            Ok(()) => {
                self.telemetry.record_reply(true);
                info!(
                    address = %address,
                    kind = classification.kind.as_str(),
                    "📨 Replied in {}ms",
                    start.elapsed().as_millis()
                );
                true
            }
            Err(e) => {
                self.telemetry.record_reply(false);
                error!(code = e.code_str(), "Error sending message: {}", e.message);
                false
            }
        }
    }
}
