//! Two-slope dynamic fee curve anchored at the target utilization.
//!
//! Below the target the fee grows linearly from zero and reaches `10_000` bp
//! at the target. From the target onwards a second, steeper slope adds a
//! penalty proportional to the overshoot.

use {
    super::error::{Error, checked_add},
    number::conversions::{BASIS_POINTS, bps_of, mul_div},
    primitive_types::U256,
};

/// Target utilization in basis points, strictly between 0 and 10_000.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetUtilization(u32);

impl TargetUtilization {
    pub fn new(bps: u32) -> Result<Self, Error> {
        if bps == 0 || bps >= BASIS_POINTS {
            return Err(Error::InvalidConfig(format!(
                "target utilization must be within (0, {BASIS_POINTS}) bp, got {bps}"
            )));
        }
        Ok(Self(bps))
    }

    pub fn bps(&self) -> u32 {
        self.0
    }
}

/// Maps a utilization to a fee in basis points.
pub fn quote_fee(utilization: U256, target: TargetUtilization) -> Result<U256, Error> {
    let target_bp = U256::from(target.bps());
    if utilization < target_bp {
        return slope_one(utilization, target_bp);
    }

    // The boundary itself belongs to the second slope.
    let overshoot = utilization - target_bp;
    let penalty = mul_div(
        overshoot,
        BASIS_POINTS.into(),
        U256::from(BASIS_POINTS - target.bps()),
    )
    .ok_or(Error::Overflow)?;
    checked_add(slope_one(target_bp, target_bp)?, penalty)
}

fn slope_one(utilization: U256, target_bp: U256) -> Result<U256, Error> {
    mul_div(utilization, BASIS_POINTS.into(), target_bp).ok_or(Error::Overflow)
}

/// The utilization dependent part of the fee for trading `amount`.
pub fn calculate_dynamic_fee(amount: U256, fee_bp: U256) -> Result<U256, Error> {
    bps_of(amount, fee_bp).ok_or(Error::Overflow)
}

/// Dynamic fee plus the flat base fee.
pub fn calculate_total_fee(amount: U256, fee_bp: U256, base_fee: U256) -> Result<U256, Error> {
    checked_add(calculate_dynamic_fee(amount, fee_bp)?, base_fee)
}
