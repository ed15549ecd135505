//! Address extraction from free-form chat text
//!
//! Explorer URLs win over bare addresses: the first explorer whose pattern
//! matches yields exactly one address and scanning stops there.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::models::{BotConfig, ExplorerLink, SolAddress};
use crate::utils::constants::ADDRESS_PATTERN;

lazy_static! {
    static ref ADDRESS_RE: Regex =
        Regex::new(ADDRESS_PATTERN).expect("address pattern is a valid regex");
}

/// Finds candidate addresses in message text
#[derive(Debug, Clone)]
pub struct AddressExtractor {
    explorers: Arc<[ExplorerLink]>,
}

impl AddressExtractor {
    pub fn new(explorers: Vec<ExplorerLink>) -> Self {
        Self {
            explorers: explorers.into(),
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(config.explorers.clone())
    }

    /// Deduplicated addresses in first-occurrence order
    pub fn extract(&self, text: &str) -> Vec<SolAddress> {
        if let Some(address) = self.extract_from_links(text) {
            return vec![address];
        }

        let mut seen = HashSet::new();
        let mut addresses = Vec::new();

        for candidate in ADDRESS_RE.find_iter(text).map(|m| m.as_str()) {
            if !seen.insert(candidate) {
                continue;
            }
            match SolAddress::parse(candidate) {
                Ok(address) => addresses.push(address),
                Err(e) => debug!(code = e.code_str(), "Dropping candidate {}", candidate),
            }
        }

        addresses
    }

    /// Address embedded in the first matching explorer URL
    fn extract_from_links(&self, text: &str) -> Option<SolAddress> {
        self.explorers.iter().find_map(|explorer| {
            let candidate = explorer.capture(text)?;
            let address = SolAddress::parse(candidate).ok()?;
            debug!("Found {} link for {}", explorer.name, address);
            Some(address)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_explorers;

    const A: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
    const B: &str = "So11111111111111111111111111111111111111112";
    const C: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

    fn extractor() -> AddressExtractor {
        AddressExtractor::new(default_explorers().unwrap())
    }

    fn strs(v: &[SolAddress]) -> Vec<&str> {
        v.iter().map(|a| a.as_str()).collect()
    }

    #[test]
    fn test_bare_addresses_in_order() {
        let text = format!("check {} and {} please", B, A);
        assert_eq!(strs(&extractor().extract(&text)), vec![B, A]);
    }

    #[test]
    fn test_duplicates_removed() {
        let text = format!("{} {} {} {}", A, B, A, B);
        assert_eq!(strs(&extractor().extract(&text)), vec![A, B]);
    }

    #[test]
    fn test_url_takes_priority() {
        let text = format!("{} https://solscan.io/account/{} {}", B, A, C);
        assert_eq!(strs(&extractor().extract(&text)), vec![A]);
    }

    #[test]
    fn test_first_explorer_in_table_wins() {
        // Photon appears first in the text but Solscan is first in the table
        let text = format!(
            "https://photon-sol.tinyastro.io/en/lp/{} https://solscan.io/account/{}",
            B, A
        );
        assert_eq!(strs(&extractor().extract(&text)), vec![A]);
    }

    #[test]
    fn test_bullx_link() {
        let text = format!(
            "https://bullx.io/terminal?chainId=1399811149&address={}",
            C
        );
        assert_eq!(strs(&extractor().extract(&text)), vec![C]);
    }

    #[test]
    fn test_no_addresses() {
        assert!(extractor().extract("gm, no addresses here 0x1234").is_empty());
        assert!(extractor().extract("").is_empty());
    }

    #[test]
    fn test_short_tokens_ignored() {
        assert!(extractor().extract(&"a".repeat(31)).is_empty());
    }

    #[test]
    fn test_long_run_split_by_regex() {
        // 50 base58 chars: first 44 match, remaining 6 are too short
        let text = "2".repeat(50);
        let found = extractor().extract(&text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].as_str().len(), 44);
    }

    #[test]
    fn test_every_result_valid_and_unique() {
        let text = format!("{A} x{A}y 0OIl{B}{C} {C} ::{B}");
        let found = extractor().extract(&text);
        let unique: HashSet<_> = found.iter().collect();
        assert_eq!(unique.len(), found.len());
        assert!(found.iter().all(|a| SolAddress::is_valid(a.as_str())));
    }
}
