//! Port definitions between the analysis core and chain infrastructure
//!
//! The classifier and token analyzer only see `ChainReader`, and the bot only
//! sees `ReplySink`, so tests can swap the network clients for in-memory fakes.

use crate::models::{
    AccountSnapshot, AppResult, Commitment, InboundMessage, LargestAccount, Reply, SolAddress,
};

/// Read-only access to chain account state
#[async_trait::async_trait]
pub trait ChainReader: Send + Sync {
    /// Account state, or `None` when the account does not exist
    async fn get_account(&self, address: &SolAddress) -> AppResult<Option<AccountSnapshot>>;

    /// Capped largest-holder sample for a mint
    async fn get_largest_accounts(
        &self,
        mint: &SolAddress,
        commitment: Commitment,
    ) -> AppResult<Vec<LargestAccount>>;
}

#[async_trait::async_trait]
impl<T: ChainReader + ?Sized> ChainReader for std::sync::Arc<T> {
    async fn get_account(&self, address: &SolAddress) -> AppResult<Option<AccountSnapshot>> {
        (**self).get_account(address).await
    }

    async fn get_largest_accounts(
        &self,
        mint: &SolAddress,
        commitment: Commitment,
    ) -> AppResult<Vec<LargestAccount>> {
        (**self).get_largest_accounts(mint, commitment).await
    }
}

/// Outbound side of the chat platform
#[async_trait::async_trait]
pub trait ReplySink: Send + Sync {
    /// Post `reply` as an answer to `to`
    async fn send_reply(&self, to: &InboundMessage, reply: &Reply) -> AppResult<()>;
}

#[async_trait::async_trait]
impl<T: ReplySink + ?Sized> ReplySink for std::sync::Arc<T> {
    async fn send_reply(&self, to: &InboundMessage, reply: &Reply) -> AppResult<()> {
        (**self).send_reply(to, reply).await
    }
}
