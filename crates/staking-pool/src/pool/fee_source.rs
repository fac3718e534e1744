use {
    crate::{
        domain::{Error, fee},
        infra::oracle::AuctionFeeOracle,
    },
    primitive_types::U256,
    std::{fmt, sync::Arc},
};

/// Where the manager fee credited on buys comes from. Exactly one source is
/// configured per deployment.
#[derive(Clone)]
pub enum FeeSource {
    /// The pool's own dynamic fee.
    Formula,
    /// The swap fee carried by the winning bid of the fee auction.
    Auction(Arc<dyn AuctionFeeOracle>),
}

impl FeeSource {
    pub async fn manager_fee(&self, amount: U256, dynamic_fee_bp: U256) -> Result<U256, Error> {
        match self {
            Self::Formula => fee::calculate_dynamic_fee(amount, dynamic_fee_bp),
            Self::Auction(oracle) => {
                let bid = oracle.top_bid().await.map_err(Error::Oracle)?;
                let swap_fee = bid.map(|bid| bid.payload.swap_fee()).unwrap_or_default();
                tracing::debug!(?bid, swap_fee, "read auction swap fee");
                fee::calculate_dynamic_fee(amount, swap_fee.into())
            }
        }
    }
}

impl fmt::Debug for FeeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Formula => f.write_str("Formula"),
            Self::Auction(_) => f.write_str("Auction"),
        }
    }
}
