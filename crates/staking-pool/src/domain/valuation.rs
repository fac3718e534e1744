//! Native denominated valuation of everything the pool holds.

use {
    super::{
        error::{Error, checked_add},
        fee::calculate_dynamic_fee,
    },
    primitive_types::U256,
};

/// Computes `native + fee(native) + committed - fee(committed)`.
///
/// The native side is grossed up by the dynamic fee rate while the committed
/// (staked + bonded) side is discounted by it. A fee rate above 100% discounts
/// the committed side to zero rather than below it.
pub fn total(native: U256, committed: U256, fee_bp: U256) -> Result<U256, Error> {
    let native_side = checked_add(native, calculate_dynamic_fee(native, fee_bp)?)?;
    let committed_side = committed.saturating_sub(calculate_dynamic_fee(committed, fee_bp)?);
    checked_add(native_side, committed_side)
}
