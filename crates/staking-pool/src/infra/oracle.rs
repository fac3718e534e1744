//! Read access to the fee auction run by an external subsystem.

use {crate::domain::auction::Bid, anyhow::Result};

/// Source of the currently winning auction bid. The pool only reads it; bid
/// lifecycle, rent and epochs are managed elsewhere.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AuctionFeeOracle: Send + Sync {
    async fn top_bid(&self) -> Result<Option<Bid>>;
}

/// Oracle that always reports the same bid.
#[derive(Clone, Debug, Default)]
pub struct StaticOracle(pub Option<Bid>);

#[async_trait::async_trait]
impl AuctionFeeOracle for StaticOracle {
    async fn top_bid(&self) -> Result<Option<Bid>> {
        Ok(self.0)
    }
}
