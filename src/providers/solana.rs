//! Solana JSON-RPC Provider
//!
//! Minimal reqwest-based client for the two reads the bot needs:
//! 1. getAccountInfo (base64 data) - executable flag, lamports, raw data
//! 2. getTokenLargestAccounts - capped holder sample for a mint
//!
//! No retries and no fallback endpoint: a failed call is reported once and
//! the caller drops the message.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::core::ports::ChainReader;
use crate::models::{
    AccountSnapshot, AppError, AppResult, BotConfig, Commitment, ErrorCode, LargestAccount,
    SolAddress,
};
use crate::utils::constants::USER_AGENT as USER_AGENT_CONST;

// ============================================
// SOLANA RPC TYPES
// ============================================

/// Standard `{ context, value }` wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct RpcContextValue<T> {
    pub value: T,
}

/// Account info in base64 encoding
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolanaAccountInfo {
    pub lamports: u64,
    /// `[data, encoding]`
    pub data: (String, String),
    pub executable: bool,
}

impl SolanaAccountInfo {
    /// Decode into a snapshot; only base64 data is accepted
    pub fn into_snapshot(self) -> AppResult<AccountSnapshot> {
        let (encoded, encoding) = self.data;
        if encoding != "base64" {
            return Err(AppError::invalid_response(format!(
                "Unexpected account data encoding: {}",
                encoding
            )));
        }

        let data = BASE64.decode(encoded.as_bytes()).map_err(|e| {
            AppError::with_source(ErrorCode::RpcInvalidResponse, "Bad base64 account data", e)
        })?;

        Ok(AccountSnapshot {
            executable: self.executable,
            lamports: self.lamports,
            data,
        })
    }
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// JSON-RPC error structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    /// Check if this is a rate limit error
    pub fn is_rate_limit(&self) -> bool {
        self.code == 429 || self.message.to_lowercase().contains("rate limit")
    }

    /// Check if this is an invalid params error (e.g. "not a Token mint")
    pub fn is_invalid_params(&self) -> bool {
        self.code == -32602
    }

    /// Map into a lookup failure for `method`
    pub fn into_app_error(self, method: &str) -> AppError {
        if self.is_rate_limit() {
            return AppError::lookup_failure(format!("{}: rate limited ({})", method, self.message));
        }
        if self.is_invalid_params() {
            debug!(method, "RPC rejected params: {}", self.message);
            return AppError::lookup_failure(format!("{}: invalid params: {}", method, self.message));
        }
        AppError::lookup_failure(format!(
            "{}: RPC error: {} (code: {})",
            method, self.message, self.code
        ))
    }
}

// ============================================
// SOLANA RPC CLIENT
// ============================================

/// Cheap to clone; clones share the connection pool
#[derive(Clone)]
pub struct SolanaRpcClient {
    rpc_url: Arc<str>,
    client: reqwest::Client,
    request_id: Arc<AtomicU64>,
}

impl SolanaRpcClient {
    /// Create new client for an endpoint
    /// `None` keeps the reqwest default (no timeout)
    pub fn new(rpc_url: &str, timeout: Option<Duration>) -> AppResult<Self> {
        Ok(Self {
            rpc_url: Arc::from(rpc_url),
            client: Self::build_client(timeout)?,
            request_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn from_config(config: &BotConfig) -> AppResult<Self> {
        Self::new(&config.rpc_url, config.rpc_timeout)
    }

    /// Build HTTP client with custom headers (gzip enabled)
    fn build_client(timeout: Option<Duration>) -> AppResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        let mut builder = reqwest::Client::builder().default_headers(headers).gzip(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        builder
            .build()
            .map_err(|e| AppError::invalid_config(format!("Failed to build HTTP client: {}", e)))
    }

    /// Execute JSON-RPC call
    async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> AppResult<T> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id
        });

        debug!(method, id, "RPC call");

        let response = self.client.post(&*self.rpc_url).json(&payload).send().await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AppError::lookup_failure(format!("{}: rate limited (HTTP 429)", method)));
        }
        if !status.is_success() {
            return Err(AppError::lookup_failure(format!("{}: HTTP error {}", method, status)));
        }

        let body = response.bytes().await?;
        let json: RpcResponse<T> = serde_json::from_slice(&body)?;

        if let Some(error) = json.error {
            return Err(error.into_app_error(method));
        }

        json.result
            .ok_or_else(|| AppError::invalid_response(format!("{}: no result in response", method)))
    }

    /// Get account info; `None` when the account does not exist
    pub async fn get_account_info(&self, pubkey: &str) -> AppResult<Option<AccountSnapshot>> {
        let params = serde_json::json!([
            pubkey,
            {"encoding": "base64"}
        ]);

        let result: RpcContextValue<Option<SolanaAccountInfo>> =
            self.call("getAccountInfo", params).await?;

        result.value.map(SolanaAccountInfo::into_snapshot).transpose()
    }

    /// Get the largest token accounts for a mint
    pub async fn get_token_largest_accounts(
        &self,
        mint: &str,
        commitment: Commitment,
    ) -> AppResult<Vec<LargestAccount>> {
        let params = serde_json::json!([
            mint,
            {"commitment": commitment.as_str()}
        ]);

        let result: RpcContextValue<Vec<LargestAccount>> =
            self.call("getTokenLargestAccounts", params).await?;

        Ok(result.value)
    }
}

#[async_trait::async_trait]
impl ChainReader for SolanaRpcClient {
    async fn get_account(&self, address: &SolAddress) -> AppResult<Option<AccountSnapshot>> {
        self.get_account_info(address.as_str()).await
    }

    async fn get_largest_accounts(
        &self,
        mint: &SolAddress,
        commitment: Commitment,
    ) -> AppResult<Vec<LargestAccount>> {
        self.get_token_largest_accounts(mint.as_str(), commitment)
            .await
    }
}
