//! Full precision integer arithmetic on 256-bit amounts.

use primitive_types::{U256, U512};

/// One hundred percent expressed in basis points.
pub const BASIS_POINTS: u32 = 10_000;

/// Computes `floor(a * b / denominator)` with a 512-bit intermediate product.
///
/// Returns `None` if `denominator` is zero or if the quotient does not fit
/// into 256 bits.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    let quotient = a.full_mul(b) / U512::from(denominator);
    U256::try_from(quotient).ok()
}

/// Returns `floor(amount * bps / 10_000)`.
///
/// Basis points above `10_000` are allowed and scale the amount past 100%.
pub fn bps_of(amount: U256, bps: U256) -> Option<U256> {
    mul_div(amount, bps, U256::from(BASIS_POINTS))
}
