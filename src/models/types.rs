//! Type definitions for Solscope
//! Core data structures flowing through extraction, classification and analysis

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::{AppError, AppResult};
use crate::utils::constants::{is_base58_char, lamports_to_sol, MAX_ADDRESS_LEN, MIN_ADDRESS_LEN};

// ============================================
// ADDRESS
// ============================================

/// Syntactically valid base58 account address.
///
/// Validity is a pure function of the string form; no chain lookup is
/// involved. Construct with [`SolAddress::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SolAddress(String);

impl SolAddress {
    /// Validate and wrap an address string
    pub fn parse(s: &str) -> AppResult<Self> {
        if Self::is_valid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(AppError::invalid_address(format!("Not a base58 address: {}", s)))
        }
    }

    /// Length in [32, 44] and every character in the base58 alphabet
    pub fn is_valid(s: &str) -> bool {
        (MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&s.len()) && s.chars().all(is_base58_char)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SolAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SolAddress {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for SolAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================
// CHAIN DATA
// ============================================

/// Point-in-time view of one account. Never cached.
#[derive(Debug, Clone, Default)]
pub struct AccountSnapshot {
    pub executable: bool,
    pub lamports: u64,
    /// Raw program-owned data
    pub data: Vec<u8>,
}

impl AccountSnapshot {
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn balance_sol(&self) -> f64 {
        lamports_to_sol(self.lamports)
    }
}

/// One entry of the largest-accounts sample, as reported by the chain
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LargestAccount {
    pub address: String,
    /// Base-10 integer in the token's smallest unit
    pub amount: String,
}

/// Commitment level for chain reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

// ============================================
// TOKEN ANALYSIS
// ============================================

/// Holder with its share of the sampled supply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenHolder {
    pub address: String,
    pub amount: u64,
    /// Share of `sampled_supply`, 0..=100
    pub percent: f64,
}

/// Heuristic warnings attached to a token analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SuspiciousFlag {
    HighInsiderOwnership,
    PossibleBundling,
}

impl SuspiciousFlag {
    pub fn description(&self) -> &'static str {
        match self {
            SuspiciousFlag::HighInsiderOwnership => "High insider ownership",
            SuspiciousFlag::PossibleBundling => "Possible bundling detected",
        }
    }
}

impl fmt::Display for SuspiciousFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Holder analytics for one mint.
///
/// All percentages are relative to `sampled_supply`, the sum over the
/// largest-accounts sample, not the mint's authoritative supply.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenAnalysis {
    pub sampled_supply: u64,
    pub decimals: u8,
    /// Number of parsed entries in the sample
    pub holder_count: usize,
    pub top_holders: Vec<TokenHolder>,
    pub insider_percent: f64,
    pub bundling_score: f64,
    pub suspicious_flags: Vec<SuspiciousFlag>,
    /// Entries dropped because their amount did not parse
    pub skipped_entries: usize,
}

// ============================================
// CLASSIFICATION
// ============================================

/// What an address turned out to be
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountKind {
    Wallet { lamports: u64, balance_sol: f64 },
    Contract,
    TokenMint { analysis: Box<TokenAnalysis> },
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Wallet { .. } => "wallet",
            AccountKind::Contract => "contract",
            AccountKind::TokenMint { .. } => "token_mint",
        }
    }
}

/// Result of classifying one address
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub address: SolAddress,
    /// Name of the rule that matched
    pub rule: &'static str,
    #[serde(flatten)]
    pub kind: AccountKind,
}

// ============================================
// OUTBOUND REPLY
// ============================================

/// Platform-neutral reply: title, color, description and ordered fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub title: String,
    pub color: u32,
    pub description: String,
    pub fields: Vec<ReplyField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyField {
    pub name: String,
    pub value: String,
}

impl ReplyField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Inbound chat message, reduced to what the pipeline needs
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub message_id: String,
    pub channel_id: String,
    pub author_id: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    #[test]
    fn test_valid_address() {
        assert!(SolAddress::is_valid(USDC_MINT));
        assert!(SolAddress::is_valid("11111111111111111111111111111111"));
        assert_eq!(SolAddress::parse(USDC_MINT).unwrap().as_str(), USDC_MINT);
    }

    #[test]
    fn test_invalid_length() {
        assert!(!SolAddress::is_valid(&"1".repeat(31)));
        assert!(!SolAddress::is_valid(&"1".repeat(45)));
        assert!(SolAddress::is_valid(&"1".repeat(44)));
    }

    #[test]
    fn test_invalid_charset() {
        for bad in ['0', 'I', 'O', 'l', '-', ' ', 'é'] {
            let mut s = "2".repeat(40);
            s.push(bad);
            assert!(!SolAddress::is_valid(&s), "{:?} accepted", s);
        }
    }

    #[test]
    fn test_parse_error_code() {
        let err = SolAddress::parse("not-an-address").unwrap_err();
        assert_eq!(err.code, crate::models::ErrorCode::InvalidAddress);
    }

    #[test]
    fn test_flag_descriptions() {
        assert_eq!(
            SuspiciousFlag::HighInsiderOwnership.to_string(),
            "High insider ownership"
        );
        assert_eq!(
            SuspiciousFlag::PossibleBundling.to_string(),
            "Possible bundling detected"
        );
    }

    #[test]
    fn test_snapshot_balance() {
        let snap = AccountSnapshot {
            lamports: 2_500_000_000,
            ..Default::default()
        };
        assert!(!snap.has_data());
        assert!((snap.balance_sol() - 2.5).abs() < 1e-9);
    }
}
