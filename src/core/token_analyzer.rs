//! Token Holder Analysis
//!
//! Turns the chain's largest-accounts sample for a mint into supply
//! concentration metrics and heuristic warnings:
//! - sampled supply (sum over the sample, not the mint's real supply)
//! - per-holder share of the sampled supply
//! - insider concentration (top 5 holders)
//! - bundling score (near-equal holdings right after the largest holder)
//!
//! The pure part ([`analyze_holders`]) is separated from the chain reads so it
//! can be tested without a network.

use std::time::Instant;
use tracing::{debug, warn};

use super::ports::ChainReader;
use crate::models::{
    AppError, AppResult, Commitment, LargestAccount, SolAddress, SuspiciousFlag, TokenAnalysis,
    TokenHolder,
};
use crate::utils::constants::{
    BUNDLING_FLAG_SCORE, BUNDLING_RATIO_MAX, BUNDLING_RATIO_MIN, BUNDLING_STEP, BUNDLING_WINDOW,
    INSIDER_FLAG_PERCENT, MINT_DECIMALS_OFFSET, TOP_HOLDER_COUNT,
};

/// Fetches mint data and holder samples, then computes [`TokenAnalysis`]
pub struct TokenAnalyzer<C> {
    chain: C,
}

impl<C: ChainReader> TokenAnalyzer<C> {
    pub fn new(chain: C) -> Self {
        Self { chain }
    }

    /// Full analysis: reads the mint account, then its largest holders
    pub async fn analyze(&self, mint: &SolAddress) -> AppResult<TokenAnalysis> {
        let mint_data = self
            .chain
            .get_account(mint)
            .await?
            .map(|account| account.data)
            .unwrap_or_default();

        self.analyze_with_mint_data(mint, &mint_data).await
    }

    /// Analysis when the mint account bytes were already fetched
    pub async fn analyze_with_mint_data(
        &self,
        mint: &SolAddress,
        mint_data: &[u8],
    ) -> AppResult<TokenAnalysis> {
        let start = Instant::now();
        let decimals = decode_mint_decimals(mint_data);

        let entries = self
            .chain
            .get_largest_accounts(mint, Commitment::Finalized)
            .await
            .map_err(|e| {
                warn!(code = e.code_str(), "Error getting token accounts for {}: {}", mint, e);
                e
            })?;

        let analysis = analyze_holders(&entries, decimals);

        debug!(
            mint = %mint,
            holders = analysis.holder_count,
            insider_percent = analysis.insider_percent,
            bundling_score = analysis.bundling_score,
            latency_ms = start.elapsed().as_millis() as u64,
            "Token analysis complete"
        );

        Ok(analysis)
    }
}

/// Decimals byte of an SPL mint; 0 when the data is too short
pub fn decode_mint_decimals(data: &[u8]) -> u8 {
    data.get(MINT_DECIMALS_OFFSET).copied().unwrap_or(0)
}

/// Parse a base-10 amount of ASCII digits only; `ParseFailure` on anything
/// else, including signs and surrounding whitespace
pub fn parse_amount(entry: &LargestAccount) -> AppResult<u64> {
    let failure = |reason: String| {
        AppError::parse_failure(format!(
            "Error parsing amount for holder {}: {} ({:?})",
            entry.address, reason, entry.amount
        ))
    };

    if !entry.amount.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(failure("expected a leading digit".to_string()));
    }

    entry.amount.parse::<u64>().map_err(|e| failure(e.to_string()))
}

/// Compute holder metrics from a raw largest-accounts sample
pub fn analyze_holders(entries: &[LargestAccount], decimals: u8) -> TokenAnalysis {
    let mut holders = Vec::with_capacity(entries.len());
    let mut skipped_entries = 0;

    for entry in entries {
        match parse_amount(entry) {
            Ok(amount) => holders.push(TokenHolder {
                address: entry.address.clone(),
                amount,
                percent: 0.0,
            }),
            Err(e) => {
                warn!(code = e.code_str(), "{}", e.message);
                skipped_entries += 1;
            }
        }
    }

    // u128 so a sample of large u64 balances cannot overflow
    let sampled_total: u128 = holders.iter().map(|h| h.amount as u128).sum();
    for holder in &mut holders {
        holder.percent = share_percent(holder.amount, sampled_total);
    }

    // Stable: equal amounts keep fetch order
    holders.sort_by(|a, b| b.amount.cmp(&a.amount));

    let top_n = holders.len().min(TOP_HOLDER_COUNT);
    let insider_percent: f64 = holders[..top_n].iter().map(|h| h.percent).sum();
    let bundling_score = bundling_score(&holders);
    let suspicious_flags = suspicious_flags(insider_percent, bundling_score);

    TokenAnalysis {
        sampled_supply: u64::try_from(sampled_total).unwrap_or(u64::MAX),
        decimals,
        holder_count: holders.len(),
        top_holders: holders[..top_n].to_vec(),
        insider_percent,
        bundling_score,
        suspicious_flags,
        skipped_entries,
    }
}

/// `amount / total * 100`, 0 when the total is 0
fn share_percent(amount: u64, total: u128) -> f64 {
    if total == 0 {
        return 0.0;
    }
    amount as f64 / total as f64 * 100.0
}

/// +0.1 for every holder among the next nine after the largest whose balance
/// is within (0.8, 1.2) of the largest. Expects `holders` sorted descending.
pub fn bundling_score(holders: &[TokenHolder]) -> f64 {
    let largest = match holders.first() {
        Some(h) if holders.len() >= 2 && h.amount > 0 => h.amount as f64,
        _ => return 0.0,
    };

    holders
        .iter()
        .skip(1)
        .take(BUNDLING_WINDOW)
        .map(|h| h.amount as f64 / largest)
        .filter(|ratio| *ratio > BUNDLING_RATIO_MIN && *ratio < BUNDLING_RATIO_MAX)
        // Accumulate step by step: 7 * 0.1 would land just above the flag threshold
        .fold(0.0, |score, _| score + BUNDLING_STEP)
}

/// Flags in fixed order: insider ownership, then bundling
pub fn suspicious_flags(insider_percent: f64, bundling_score: f64) -> Vec<SuspiciousFlag> {
    let mut flags = Vec::new();
    if insider_percent > INSIDER_FLAG_PERCENT {
        flags.push(SuspiciousFlag::HighInsiderOwnership);
    }
    if bundling_score > BUNDLING_FLAG_SCORE {
        flags.push(SuspiciousFlag::PossibleBundling);
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(address: &str, amount: &str) -> LargestAccount {
        LargestAccount {
            address: address.to_string(),
            amount: amount.to_string(),
        }
    }

    fn sample(amounts: &[u64]) -> Vec<LargestAccount> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, a)| entry(&format!("holder{}", i), &a.to_string()))
            .collect()
    }

    #[test]
    fn test_equal_holders() {
        let analysis = analyze_holders(&sample(&[100, 100, 100]), 0);
        assert_eq!(analysis.sampled_supply, 300);
        assert_eq!(analysis.holder_count, 3);
        for holder in &analysis.top_holders {
            assert!((holder.percent - 100.0 / 3.0).abs() < 1e-9);
        }
        assert!((analysis.insider_percent - 100.0).abs() < 1e-9);
        assert!((analysis.bundling_score - 0.2).abs() < 1e-9);
        assert_eq!(
            analysis.suspicious_flags,
            vec![SuspiciousFlag::HighInsiderOwnership]
        );
    }

    #[test]
    fn test_sorted_descending_stable() {
        let entries = vec![
            entry("a", "10"),
            entry("b", "50"),
            entry("c", "10"),
            entry("d", "30"),
        ];
        let analysis = analyze_holders(&entries, 0);
        let order: Vec<&str> = analysis
            .top_holders
            .iter()
            .map(|h| h.address.as_str())
            .collect();
        assert_eq!(order, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_top_holders_capped_at_five() {
        let analysis = analyze_holders(&sample(&[9, 8, 7, 6, 5, 4, 3, 2, 1]), 0);
        assert_eq!(analysis.holder_count, 9);
        assert_eq!(analysis.top_holders.len(), 5);
        let expected = (9 + 8 + 7 + 6 + 5) as f64 / 45.0 * 100.0;
        assert!((analysis.insider_percent - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unparsable_amounts_skipped() {
        let entries = vec![
            entry("a", "100"),
            entry("b", "not-a-number"),
            entry("c", "-5"),
            entry("d", "300"),
        ];
        let analysis = analyze_holders(&entries, 2);
        assert_eq!(analysis.holder_count, 2);
        assert_eq!(analysis.skipped_entries, 2);
        assert_eq!(analysis.sampled_supply, 400);
        assert!((analysis.top_holders[0].percent - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_total_gives_zero_percent() {
        let analysis = analyze_holders(&sample(&[0, 0, 0]), 6);
        assert_eq!(analysis.sampled_supply, 0);
        assert!(analysis.top_holders.iter().all(|h| h.percent == 0.0));
        assert_eq!(analysis.insider_percent, 0.0);
        assert_eq!(analysis.bundling_score, 0.0);
        assert!(analysis.suspicious_flags.is_empty());
    }

    #[test]
    fn test_all_parses_failed() {
        let entries = vec![entry("a", "x"), entry("b", "")];
        let analysis = analyze_holders(&entries, 0);
        assert_eq!(analysis.holder_count, 0);
        assert!(analysis.top_holders.is_empty());
        assert_eq!(analysis.insider_percent, 0.0);
    }

    #[test]
    fn test_single_holder_never_bundled() {
        let analysis = analyze_holders(&sample(&[1_000]), 0);
        assert_eq!(analysis.bundling_score, 0.0);
        assert!((analysis.insider_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_bundling_window_limited_to_nine() {
        // 20 equal holders: only indices 1..=9 are examined
        let analysis = analyze_holders(&sample(&[500; 20]), 0);
        assert!((analysis.bundling_score - 0.9).abs() < 1e-9);
        assert!(analysis
            .suspicious_flags
            .contains(&SuspiciousFlag::PossibleBundling));
    }

    #[test]
    fn test_bundling_ratio_bounds_exclusive() {
        // ratio exactly 0.8 does not count, 0.81 does
        let holders = analyze_holders(&sample(&[100, 81, 80]), 0).top_holders;
        assert!((bundling_score(&holders) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_seven_bundled_holders_not_flagged() {
        let analysis = analyze_holders(&sample(&[500; 8]), 0);
        assert!((analysis.bundling_score - 0.7).abs() < 1e-9);
        assert!(!analysis
            .suspicious_flags
            .contains(&SuspiciousFlag::PossibleBundling));
    }

    #[test]
    fn test_insider_flag_threshold_strict() {
        assert!(suspicious_flags(50.0, 0.0).is_empty());
        assert_eq!(
            suspicious_flags(51.0, 0.0),
            vec![SuspiciousFlag::HighInsiderOwnership]
        );
        assert!(suspicious_flags(0.0, 0.7).is_empty());
        assert_eq!(
            suspicious_flags(80.0, 0.8),
            vec![
                SuspiciousFlag::HighInsiderOwnership,
                SuspiciousFlag::PossibleBundling
            ]
        );
    }

    #[test]
    fn test_decode_mint_decimals() {
        let mut data = vec![0u8; 82];
        data[44] = 9;
        assert_eq!(decode_mint_decimals(&data), 9);
        assert_eq!(decode_mint_decimals(&data[..45]), 9);
        assert_eq!(decode_mint_decimals(&data[..44]), 0);
        assert_eq!(decode_mint_decimals(&[]), 0);
    }

    #[test]
    fn test_parse_amount_error_code() {
        let err = parse_amount(&entry("a", "1.5")).unwrap_err();
        assert_eq!(err.code, crate::models::ErrorCode::ParseFailure);
        assert_eq!(parse_amount(&entry("a", "42")).unwrap(), 42);
    }

    #[test]
    fn test_parse_amount_rejects_sign_and_whitespace() {
        for raw in ["+5", " 42 ", "42\n", "-1", ""] {
            let err = parse_amount(&entry("a", raw)).unwrap_err();
            assert_eq!(err.code, crate::models::ErrorCode::ParseFailure, "{:?}", raw);
        }

        let analysis = analyze_holders(&[entry("a", "100"), entry("b", "+100")], 0);
        assert_eq!(analysis.holder_count, 1);
        assert_eq!(analysis.skipped_entries, 1);
        assert_eq!(analysis.sampled_supply, 100);
    }
}
