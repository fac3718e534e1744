use primitive_types::U256;

/// Failures surfaced by pool operations. Any error aborts the whole
/// operation and leaves the pool state as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("amount must be greater than zero")]
    AmountZero,
    #[error("fee consumes the entire native output")]
    NativeTokenTransferAmountZero,
    #[error("base fee consumes the entire staked output")]
    StakedTokenTransferAmountZero,
    #[error("dynamic fee rounds down to zero")]
    FeeTooLow,
    #[error("minting staked tokens did not increase the pool balance")]
    MintingFailed,
    #[error("utilization is undefined for an empty native reserve")]
    DivisionUndefined,
    #[error("insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: U256, available: U256 },
    #[error("insufficient shares: requested {requested}, held {held}")]
    InsufficientShares { requested: U256, held: U256 },
    #[error("arithmetic overflow")]
    Overflow,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("token ledger call failed")]
    Ledger(#[source] anyhow::Error),
    #[error("auction fee oracle call failed")]
    Oracle(#[source] anyhow::Error),
}

pub(crate) fn checked_add(a: U256, b: U256) -> Result<U256, Error> {
    a.checked_add(b).ok_or(Error::Overflow)
}

pub(crate) fn ensure_nonzero(amount: U256) -> Result<(), Error> {
    if amount.is_zero() {
        return Err(Error::AmountZero);
    }
    Ok(())
}
