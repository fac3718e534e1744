//! Token ledgers holding the native and staked balances.

use {
    anyhow::Result,
    primitive_types::{H160, U256},
};

mod memory;

pub use memory::InMemoryLedger;

/// A fungible token ledger as seen by the pool.
///
/// `transfer` moves tokens out of the pool's holding account, while
/// `transfer_from` moves tokens on behalf of another account. Every call is
/// atomic; an error means nothing moved.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TokenLedger: Send + Sync {
    async fn transfer(&self, to: H160, amount: U256) -> Result<()>;

    async fn transfer_from(&self, from: H160, to: H160, amount: U256) -> Result<()>;

    async fn balance_of(&self, account: H160) -> Result<U256>;

    /// Issues new tokens. Only the staked asset supports minting.
    async fn mint(&self, to: H160, amount: U256) -> Result<()>;
}
