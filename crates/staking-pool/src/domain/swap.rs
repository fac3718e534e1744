//! Conversions between the native and the staked asset.

use {
    super::{
        error::{Error, checked_add, ensure_nonzero},
        fee::calculate_dynamic_fee,
    },
    primitive_types::U256,
};

/// Outcome of selling staked tokens for native tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SellQuote {
    pub dynamic_fee: U256,
    /// Dynamic plus base fee.
    pub fee: U256,
    pub native_out: U256,
}

/// Quotes selling `amount` staked tokens at the given dynamic fee.
///
/// Trades whose dynamic fee rounds down to zero are rejected instead of
/// being executed fee free.
pub fn sell(amount: U256, fee_bp: U256, base_fee: U256) -> Result<SellQuote, Error> {
    ensure_nonzero(amount)?;
    let dynamic_fee = calculate_dynamic_fee(amount, fee_bp)?;
    if dynamic_fee.is_zero() {
        return Err(Error::FeeTooLow);
    }
    let fee = checked_add(dynamic_fee, base_fee)?;
    let native_out = amount
        .checked_sub(fee)
        .filter(|out| !out.is_zero())
        .ok_or(Error::NativeTokenTransferAmountZero)?;
    Ok(SellQuote {
        dynamic_fee,
        fee,
        native_out,
    })
}

/// Outcome of buying staked tokens with native tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuyQuote {
    pub manager_fee: U256,
    pub staked_out: U256,
    /// Staked tokens that have to be minted because the pool holds fewer
    /// than `staked_out`.
    pub shortfall: U256,
}

/// Quotes buying staked tokens with `amount` native tokens.
///
/// The buyer receives `amount + manager_fee - base_fee`, where the manager
/// fee comes from the pool's configured fee source.
pub fn buy(
    amount: U256,
    manager_fee: U256,
    base_fee: U256,
    staked_balance: U256,
) -> Result<BuyQuote, Error> {
    ensure_nonzero(amount)?;
    let staked_out = checked_add(amount, manager_fee)?
        .checked_sub(base_fee)
        .filter(|out| !out.is_zero())
        .ok_or(Error::StakedTokenTransferAmountZero)?;
    Ok(BuyQuote {
        manager_fee,
        staked_out,
        shortfall: staked_out.saturating_sub(staked_balance),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sell_charges_dynamic_and_base_fee() {
        let quote = sell(910.into(), 100.into(), 100.into()).unwrap();
        assert_eq!(
            quote,
            SellQuote {
                dynamic_fee: 9.into(),
                fee: 109.into(),
                native_out: 801.into(),
            }
        );
    }

    #[test]
    fn sell_rejects_fee_free_trades() {
        assert!(matches!(
            sell(99.into(), 100.into(), 100.into()),
            Err(Error::FeeTooLow)
        ));
        assert!(matches!(
            sell(1000.into(), U256::zero(), U256::zero()),
            Err(Error::FeeTooLow)
        ));
    }

    #[test]
    fn sell_rejects_outputs_eaten_by_fees() {
        assert!(matches!(
            sell(200.into(), 100.into(), 198.into()),
            Err(Error::NativeTokenTransferAmountZero)
        ));
        assert!(matches!(
            sell(200.into(), 100.into(), 1000.into()),
            Err(Error::NativeTokenTransferAmountZero)
        ));
        assert!(matches!(
            sell(100.into(), 20_000.into(), U256::zero()),
            Err(Error::NativeTokenTransferAmountZero)
        ));
    }

    #[test]
    fn buy_credits_manager_fee_and_charges_base_fee() {
        let quote = buy(1000.into(), 10.into(), 100.into(), U256::zero()).unwrap();
        assert_eq!(
            quote,
            BuyQuote {
                manager_fee: 10.into(),
                staked_out: 910.into(),
                shortfall: 910.into(),
            }
        );
    }

    #[test]
    fn buy_shortfall_only_covers_missing_balance() {
        let quote = buy(1000.into(), 10.into(), 100.into(), 600.into()).unwrap();
        assert_eq!(quote.shortfall, 310.into());

        let quote = buy(1000.into(), 10.into(), 100.into(), 5000.into()).unwrap();
        assert_eq!(quote.shortfall, U256::zero());
    }

    #[test]
    fn buy_rejects_zero_and_consumed_outputs() {
        assert!(matches!(
            buy(U256::zero(), 10.into(), U256::zero(), U256::zero()),
            Err(Error::AmountZero)
        ));
        assert!(matches!(
            buy(50.into(), U256::zero(), 100.into(), U256::zero()),
            Err(Error::StakedTokenTransferAmountZero)
        ));
        assert!(matches!(
            buy(90.into(), 10.into(), 100.into(), U256::zero()),
            Err(Error::StakedTokenTransferAmountZero)
        ));
    }

    #[test]
    fn round_trip_destroys_value() {
        let bought = buy(1000.into(), 10.into(), 100.into(), U256::zero()).unwrap();
        let sold = sell(bought.staked_out, 100.into(), 100.into()).unwrap();
        assert_eq!(sold.native_out, 801.into());
        assert!(sold.native_out < 1000.into());
    }
}
