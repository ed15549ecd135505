//! Telemetry Module
//!
//! Lock-free counters for what the bot has seen and done since start.
//! Privacy-first: counts only, no addresses, message text or user ids.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::models::{AccountKind, AppError, ErrorCode};

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryStats {
    pub messages_seen: u64,
    /// Messages with no address, or authored by the bot itself
    pub messages_ignored: u64,
    pub addresses_extracted: u64,
    pub wallets: u64,
    pub contracts: u64,
    pub tokens: u64,
    pub not_found: u64,
    pub lookup_failures: u64,
    pub holder_parse_failures: u64,
    pub replies_sent: u64,
    pub replies_failed: u64,
    /// Mean classification latency over completed lookups (ms)
    pub avg_lookup_latency_ms: f64,
    pub uptime_secs: u64,
}

impl TelemetryStats {
    /// Lookups that reached a verdict
    pub fn classified(&self) -> u64 {
        self.wallets + self.contracts + self.tokens
    }

    /// One-line summary for the periodic stats log
    pub fn summary(&self) -> String {
        format!(
            "msgs={} ignored={} addrs={} wallets={} contracts={} tokens={} \
             not_found={} lookup_failures={} replies={}/{} avg_latency={:.1}ms",
            self.messages_seen,
            self.messages_ignored,
            self.addresses_extracted,
            self.wallets,
            self.contracts,
            self.tokens,
            self.not_found,
            self.lookup_failures,
            self.replies_sent,
            self.replies_sent + self.replies_failed,
            self.avg_lookup_latency_ms,
        )
    }
}

/// Shared counters, cheap to update from any task
pub struct BotTelemetry {
    messages_seen: AtomicU64,
    messages_ignored: AtomicU64,
    addresses_extracted: AtomicU64,
    wallets: AtomicU64,
    contracts: AtomicU64,
    tokens: AtomicU64,
    not_found: AtomicU64,
    lookup_failures: AtomicU64,
    holder_parse_failures: AtomicU64,
    replies_sent: AtomicU64,
    replies_failed: AtomicU64,
    total_latency_ms: AtomicU64,
    timed_lookups: AtomicU64,
    started: Instant,
}

impl Default for BotTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl BotTelemetry {
    pub fn new() -> Self {
        Self {
            messages_seen: AtomicU64::new(0),
            messages_ignored: AtomicU64::new(0),
            addresses_extracted: AtomicU64::new(0),
            wallets: AtomicU64::new(0),
            contracts: AtomicU64::new(0),
            tokens: AtomicU64::new(0),
            not_found: AtomicU64::new(0),
            lookup_failures: AtomicU64::new(0),
            holder_parse_failures: AtomicU64::new(0),
            replies_sent: AtomicU64::new(0),
            replies_failed: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            timed_lookups: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn record_message(&self) {
        self.messages_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ignored(&self) {
        self.messages_ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_extracted(&self, count: usize) {
        self.addresses_extracted
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Successful classification with its latency
    pub fn record_classified(&self, kind: &AccountKind, latency_ms: u64) {
        let counter = match kind {
            AccountKind::Wallet { .. } => &self.wallets,
            AccountKind::Contract => &self.contracts,
            AccountKind::TokenMint { analysis } => {
                self.holder_parse_failures
                    .fetch_add(analysis.skipped_entries as u64, Ordering::Relaxed);
                &self.tokens
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.record_latency(latency_ms);
    }

    /// Failed classification, bucketed by error code
    pub fn record_lookup_error(&self, error: &AppError, latency_ms: u64) {
        if error.code.is_lookup_failure() {
            self.lookup_failures.fetch_add(1, Ordering::Relaxed);
            self.record_latency(latency_ms);
        } else if error.code == ErrorCode::NotFound {
            self.not_found.fetch_add(1, Ordering::Relaxed);
            self.record_latency(latency_ms);
        }
    }

    pub fn record_reply(&self, delivered: bool) {
        if delivered {
            self.replies_sent.fetch_add(1, Ordering::Relaxed);
        } else {
            self.replies_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_latency(&self, latency_ms: u64) {
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
        self.timed_lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TelemetryStats {
        let timed = self.timed_lookups.load(Ordering::Relaxed);
        let avg_lookup_latency_ms = if timed > 0 {
            self.total_latency_ms.load(Ordering::Relaxed) as f64 / timed as f64
        } else {
            0.0
        };

        TelemetryStats {
            messages_seen: self.messages_seen.load(Ordering::Relaxed),
            messages_ignored: self.messages_ignored.load(Ordering::Relaxed),
            addresses_extracted: self.addresses_extracted.load(Ordering::Relaxed),
            wallets: self.wallets.load(Ordering::Relaxed),
            contracts: self.contracts.load(Ordering::Relaxed),
            tokens: self.tokens.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            lookup_failures: self.lookup_failures.load(Ordering::Relaxed),
            holder_parse_failures: self.holder_parse_failures.load(Ordering::Relaxed),
            replies_sent: self.replies_sent.load(Ordering::Relaxed),
            replies_failed: self.replies_failed.load(Ordering::Relaxed),
            avg_lookup_latency_ms,
            uptime_secs: self.started.elapsed().as_secs(),
        }
    }
}
