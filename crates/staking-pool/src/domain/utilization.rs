//! Ratio of committed (staked + bonded) value to the native reserve.

use {
    super::error::{Error, checked_add},
    number::conversions::{BASIS_POINTS, mul_div},
    primitive_types::U256,
};

/// Returns `floor((staked + bonded) * 10_000 / native)` in basis points.
///
/// The result is not capped at 100%; an over-utilized pool reports values
/// above `10_000`.
pub fn calculate_utilization(staked: U256, bonded: U256, native: U256) -> Result<U256, Error> {
    let committed = checked_add(staked, bonded)?;
    if native.is_zero() {
        return Err(Error::DivisionUndefined);
    }
    if committed.is_zero() {
        return Err(Error::AmountZero);
    }
    mul_div(committed, BASIS_POINTS.into(), native).ok_or(Error::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utilization_in_basis_points() {
        let utilization = calculate_utilization(300.into(), 200.into(), 1000.into()).unwrap();
        assert_eq!(utilization, 5000.into());

        let utilization = calculate_utilization(1.into(), U256::zero(), 3.into()).unwrap();
        assert_eq!(utilization, 3333.into());
    }

    #[test]
    fn over_utilization_is_representable() {
        let utilization = calculate_utilization(2500.into(), 500.into(), 1000.into()).unwrap();
        assert_eq!(utilization, 30_000.into());
    }

    #[test]
    fn large_balances_do_not_overflow() {
        let half = U256::MAX / 2;
        let utilization = calculate_utilization(half, half, U256::MAX).unwrap();
        assert_eq!(utilization, 9999.into());
    }

    #[test]
    fn scaling_invariance() {
        let (staked, bonded, native) = (U256::from(1234), U256::from(567), U256::from(8901));
        let base = calculate_utilization(staked, bonded, native).unwrap();
        for k in [2u64, 7, 1_000, 1_000_000_007] {
            let k = U256::from(k);
            let scaled = calculate_utilization(staked * k, bonded * k, native * k).unwrap();
            assert!(scaled.abs_diff(base) <= U256::one(), "k = {k}");
        }
    }

    #[test]
    fn undefined_inputs() {
        assert!(matches!(
            calculate_utilization(1.into(), 1.into(), U256::zero()),
            Err(Error::DivisionUndefined)
        ));
        assert!(matches!(
            calculate_utilization(U256::zero(), U256::zero(), 1.into()),
            Err(Error::AmountZero)
        ));
        assert!(matches!(
            calculate_utilization(U256::MAX, 1.into(), 1.into()),
            Err(Error::Overflow)
        ));
    }
}
