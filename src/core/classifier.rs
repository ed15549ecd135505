//! Account classification
//!
//! Decides whether an address is a wallet, an executable contract or a token
//! mint. The decision is an ordered rule table evaluated top to bottom; the
//! first rule that matches wins and anything unmatched is a wallet.

use std::time::Instant;
use tracing::debug;

use super::ports::ChainReader;
use super::token_analyzer::TokenAnalyzer;
use crate::models::{
    AccountKind, AccountSnapshot, AppError, AppResult, Classification, SolAddress, TokenAnalysis,
};

/// One row of the decision table
pub struct ClassificationRule {
    pub name: &'static str,
    pub apply: fn(&AccountSnapshot, Option<&TokenAnalysis>) -> Option<AccountKind>,
}

/// Rule names, also reported in [`Classification::rule`]
pub const RULE_TOKEN_MINT: &str = "token_mint";
pub const RULE_EXECUTABLE: &str = "executable";
pub const RULE_DATA_BEARING: &str = "data_bearing";
pub const RULE_WALLET: &str = "wallet";

/// Ordered decision table
pub const CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: RULE_TOKEN_MINT,
        apply: token_mint_rule,
    },
    ClassificationRule {
        name: RULE_EXECUTABLE,
        apply: executable_rule,
    },
    ClassificationRule {
        name: RULE_DATA_BEARING,
        apply: data_bearing_rule,
    },
];

fn token_mint_rule(snapshot: &AccountSnapshot, token: Option<&TokenAnalysis>) -> Option<AccountKind> {
    match token {
        Some(analysis) if snapshot.has_data() => Some(AccountKind::TokenMint {
            analysis: Box::new(analysis.clone()),
        }),
        _ => None,
    }
}

fn executable_rule(snapshot: &AccountSnapshot, _: Option<&TokenAnalysis>) -> Option<AccountKind> {
    snapshot.executable.then_some(AccountKind::Contract)
}

fn data_bearing_rule(snapshot: &AccountSnapshot, _: Option<&TokenAnalysis>) -> Option<AccountKind> {
    snapshot.has_data().then_some(AccountKind::Contract)
}

/// Any account carrying program data is tried as a token mint first.
///
/// Neither the owning program nor the full mint layout is checked, so
/// arbitrary data accounts are attempted too; a failed holder lookup drops
/// them to the data-bearing contract rule.
pub fn is_token_candidate(snapshot: &AccountSnapshot) -> bool {
    snapshot.has_data()
}

/// Run the decision table against an already fetched snapshot
pub fn classify_snapshot(
    address: SolAddress,
    snapshot: &AccountSnapshot,
    token: Option<&TokenAnalysis>,
) -> Classification {
    let (rule, kind) = CLASSIFICATION_RULES
        .iter()
        .find_map(|rule| (rule.apply)(snapshot, token).map(|kind| (rule.name, kind)))
        .unwrap_or_else(|| {
            (
                RULE_WALLET,
                AccountKind::Wallet {
                    lamports: snapshot.lamports,
                    balance_sol: snapshot.balance_sol(),
                },
            )
        });

    Classification {
        address,
        rule,
        kind,
    }
}

/// Fetches account state and classifies it
pub struct AccountClassifier<C> {
    chain: C,
    tokens: TokenAnalyzer<C>,
}

impl<C: ChainReader + Clone> AccountClassifier<C> {
    pub fn new(chain: C) -> Self {
        Self {
            tokens: TokenAnalyzer::new(chain.clone()),
            chain,
        }
    }

    /// Token analyzer sharing this classifier's chain handle
    pub fn token_analyzer(&self) -> &TokenAnalyzer<C> {
        &self.tokens
    }

    /// Classify one address.
    ///
    /// Fails with `NotFound` when the account does not exist and with a
    /// lookup error when the account read fails. A failed token analysis is
    /// not an error; the account is classified by the remaining rules.
    pub async fn classify(&self, address: &SolAddress) -> AppResult<Classification> {
        let start = Instant::now();

        let snapshot = self
            .chain
            .get_account(address)
            .await?
            .ok_or_else(|| AppError::not_found(address.as_str()))?;

        let token = if is_token_candidate(&snapshot) {
            match self
                .tokens
                .analyze_with_mint_data(address, &snapshot.data)
                .await
            {
                Ok(analysis) => Some(analysis),
                Err(e) => {
                    debug!(code = e.code_str(), "{} is not an analyzable mint: {}", address, e);
                    None
                }
            }
        } else {
            None
        };

        let classification = classify_snapshot(address.clone(), &snapshot, token.as_ref());

        debug!(
            address = %address,
            rule = classification.rule,
            latency_ms = start.elapsed().as_millis() as u64,
            "Classified as {}",
            classification.kind.as_str()
        );

        Ok(classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::token_analyzer::analyze_holders;
    use crate::models::LargestAccount;

    fn addr() -> SolAddress {
        SolAddress::parse("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v").unwrap()
    }

    fn analysis() -> TokenAnalysis {
        analyze_holders(
            &[LargestAccount {
                address: "h".to_string(),
                amount: "10".to_string(),
            }],
            0,
        )
    }

    #[test]
    fn test_plain_account_is_wallet() {
        let snapshot = AccountSnapshot {
            lamports: 1_234_500_000,
            ..Default::default()
        };
        let c = classify_snapshot(addr(), &snapshot, None);
        assert_eq!(c.rule, RULE_WALLET);
        match c.kind {
            AccountKind::Wallet { lamports, balance_sol } => {
                assert_eq!(lamports, 1_234_500_000);
                assert!((balance_sol - 1.2345).abs() < 1e-9);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_executable_is_contract() {
        let snapshot = AccountSnapshot {
            executable: true,
            ..Default::default()
        };
        assert_eq!(classify_snapshot(addr(), &snapshot, None).rule, RULE_EXECUTABLE);
    }

    #[test]
    fn test_data_with_analysis_is_token() {
        let snapshot = AccountSnapshot {
            data: vec![1; 82],
            ..Default::default()
        };
        let token = analysis();
        let c = classify_snapshot(addr(), &snapshot, Some(&token));
        assert_eq!(c.rule, RULE_TOKEN_MINT);
        assert!(matches!(c.kind, AccountKind::TokenMint { .. }));
    }

    #[test]
    fn test_token_rule_precedes_executable() {
        let snapshot = AccountSnapshot {
            executable: true,
            data: vec![1; 36],
            ..Default::default()
        };
        let token = analysis();
        assert_eq!(
            classify_snapshot(addr(), &snapshot, Some(&token)).rule,
            RULE_TOKEN_MINT
        );
    }

    #[test]
    fn test_data_without_analysis_is_contract() {
        let snapshot = AccountSnapshot {
            data: vec![1; 165],
            lamports: 5,
            ..Default::default()
        };
        let c = classify_snapshot(addr(), &snapshot, None);
        assert_eq!(c.rule, RULE_DATA_BEARING);
        assert!(matches!(c.kind, AccountKind::Contract));
    }

    #[test]
    fn test_token_candidate_heuristic() {
        assert!(!is_token_candidate(&AccountSnapshot::default()));
        assert!(is_token_candidate(&AccountSnapshot {
            data: vec![0],
            ..Default::default()
        }));
    }
}
