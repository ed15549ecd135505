//! Reply rendering
//!
//! Turns a classification into a platform-neutral [`Reply`]. Pure string
//! building, no I/O.

use std::sync::Arc;

use crate::models::{
    AccountKind, BotConfig, Classification, ExplorerLink, Reply, ReplyField, TokenAnalysis,
};
use crate::utils::constants::{COLOR_CONTRACT, COLOR_TOKEN, COLOR_WALLET};
use crate::utils::format::{format_holder_list, format_token_amount};

/// Shown when no sampled amount parsed; Discord rejects empty field values
pub const NO_HOLDERS_TEXT: &str = "No parsable holders in sample";

#[derive(Debug, Clone)]
pub struct Presenter {
    explorers: Arc<[ExplorerLink]>,
}

impl Presenter {
    pub fn new(explorers: Vec<ExplorerLink>) -> Self {
        Self {
            explorers: explorers.into(),
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(config.explorers.clone())
    }

    pub fn render(&self, classification: &Classification) -> Reply {
        let address = classification.address.as_str();
        match &classification.kind {
            AccountKind::Wallet { balance_sol, .. } => self.wallet_reply(address, *balance_sol),
            AccountKind::Contract => self.contract_reply(address),
            AccountKind::TokenMint { analysis } => self.token_reply(address, analysis),
        }
    }

    pub fn wallet_reply(&self, address: &str, balance_sol: f64) -> Reply {
        let mut fields = vec![ReplyField::new(
            "Balance",
            format!("{:.4} SOL", balance_sol),
        )];

        if let Some(explorer) = self.explorers.first() {
            fields.push(ReplyField::new(
                format!("View on {}", explorer.name),
                format!("[Click here]({})", explorer.link_for(address)),
            ));
        }

        Reply {
            title: "Solana Wallet".to_string(),
            color: COLOR_WALLET,
            description: format!("Address: `{}`", address),
            fields,
        }
    }

    pub fn contract_reply(&self, address: &str) -> Reply {
        Reply {
            title: "Solana Contract Explorer".to_string(),
            color: COLOR_CONTRACT,
            description: format!("Explorer links for address: `{}`", address),
            fields: self.explorer_fields(address),
        }
    }

    pub fn token_reply(&self, address: &str, analysis: &TokenAnalysis) -> Reply {
        let top_holders = if analysis.top_holders.is_empty() {
            NO_HOLDERS_TEXT.to_string()
        } else {
            format_holder_list(&analysis.top_holders, analysis.decimals)
        };

        let mut fields = vec![
            ReplyField::new(
                "Supply Distribution",
                format!(
                    "Sampled Supply: {}\nDecimals: {}\nHolder Count: {}",
                    format_token_amount(analysis.sampled_supply, analysis.decimals),
                    analysis.decimals,
                    analysis.holder_count
                ),
            ),
            ReplyField::new("Top Holders", top_holders),
            ReplyField::new(
                "Insider Ownership",
                format!("{:.2}% held by top 5 wallets", analysis.insider_percent),
            ),
            ReplyField::new(
                "Bundling Risk",
                format!("Score: {:.2}/1.0", analysis.bundling_score),
            ),
        ];

        if !analysis.suspicious_flags.is_empty() {
            let warnings: Vec<String> = analysis
                .suspicious_flags
                .iter()
                .map(|flag| format!("• {}", flag))
                .collect();
            fields.push(ReplyField::new("⚠️ Warnings", warnings.join("\n")));
        }

        fields.extend(self.explorer_fields(address));

        Reply {
            title: "Token Analysis".to_string(),
            color: COLOR_TOKEN,
            description: format!("Analysis for token: `{}`", address),
            fields,
        }
    }

    fn explorer_fields(&self, address: &str) -> Vec<ReplyField> {
        self.explorers
            .iter()
            .map(|explorer| {
                ReplyField::new(
                    explorer.name.clone(),
                    format!("[View on {}]({})", explorer.name, explorer.link_for(address)),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::token_analyzer::analyze_holders;
    use crate::models::{default_explorers, LargestAccount, SolAddress};

    const ADDR: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    fn presenter() -> Presenter {
        Presenter::new(default_explorers().unwrap())
    }

    #[test]
    fn test_wallet_reply() {
        let reply = presenter().wallet_reply(ADDR, 1.23456);
        assert_eq!(reply.title, "Solana Wallet");
        assert_eq!(reply.color, 0x00FF00);
        assert_eq!(reply.description, format!("Address: `{}`", ADDR));
        assert_eq!(reply.fields[0], ReplyField::new("Balance", "1.2346 SOL"));
        assert_eq!(reply.fields[1].name, "View on Solscan");
        assert_eq!(
            reply.fields[1].value,
            format!("[Click here](https://solscan.io/account/{})", ADDR)
        );
    }

    #[test]
    fn test_contract_reply_lists_every_explorer() {
        let reply = presenter().contract_reply(ADDR);
        let names: Vec<&str> = reply.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Solscan", "BullX", "Photon"]);
        assert_eq!(
            reply.fields[2].value,
            format!("[View on Photon](https://photon-sol.tinyastro.io/en/lp/{})", ADDR)
        );
    }

    #[test]
    fn test_token_reply_with_warnings() {
        let entries: Vec<LargestAccount> = [900u64, 50, 50]
            .iter()
            .enumerate()
            .map(|(i, a)| LargestAccount {
                address: format!("Holder{}xxxxxxxxxxxxxx", i),
                amount: a.to_string(),
            })
            .collect();
        let analysis = analyze_holders(&entries, 1);
        let reply = presenter().token_reply(ADDR, &analysis);

        assert_eq!(reply.title, "Token Analysis");
        assert_eq!(
            reply.fields[0].value,
            "Sampled Supply: 100\nDecimals: 1\nHolder Count: 3"
        );
        assert!(reply.fields[1].value.starts_with("1. `Holder...xxxx`: 90 (90.00%)\n"));
        assert_eq!(reply.fields[2].value, "100.00% held by top 5 wallets");
        assert_eq!(reply.fields[3].value, "Score: 0.00/1.0");
        assert_eq!(reply.fields[4].name, "⚠️ Warnings");
        assert_eq!(reply.fields[4].value, "• High insider ownership");
        assert_eq!(reply.fields.len(), 5 + 3);
    }

    #[test]
    fn test_token_reply_without_warnings() {
        let analysis = analyze_holders(&[], 0);
        let reply = presenter().token_reply(ADDR, &analysis);
        assert!(reply.fields.iter().all(|f| f.name != "⚠️ Warnings"));
        assert_eq!(reply.fields.len(), 4 + 3);
        assert_eq!(reply.fields[1], ReplyField::new("Top Holders", NO_HOLDERS_TEXT));
        assert!(reply.fields.iter().all(|f| !f.value.is_empty()));
    }

    #[test]
    fn test_token_reply_when_every_amount_fails_to_parse() {
        let entries = vec![LargestAccount {
            address: "HolderBadxxxxxxxxxxxxxx".to_string(),
            amount: "n/a".to_string(),
        }];
        let analysis = analyze_holders(&entries, 6);
        assert_eq!(analysis.holder_count, 0);

        let reply = presenter().token_reply(ADDR, &analysis);
        assert_eq!(reply.fields[1].value, NO_HOLDERS_TEXT);
        assert!(reply.fields.iter().all(|f| !f.value.is_empty()));
    }

    #[test]
    fn test_render_dispatches_on_kind() {
        let classification = Classification {
            address: SolAddress::parse(ADDR).unwrap(),
            rule: "executable",
            kind: AccountKind::Contract,
        };
        assert_eq!(
            presenter().render(&classification).title,
            "Solana Contract Explorer"
        );
    }
}
