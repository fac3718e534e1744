//! Share based accounting of liquidity provided in the native asset.

use {
    super::error::{Error, checked_add, ensure_nonzero},
    number::conversions::mul_div,
    primitive_types::{H160, U256},
    std::collections::BTreeMap,
};

/// Shares minted for depositing `amount` native tokens.
///
/// The first deposit into a pool without shares mints 1:1 and never values
/// the pool. Afterwards shares are minted in proportion to `total`, the pool
/// valuation before the deposit is added.
pub fn shares_for_deposit(
    amount: U256,
    supply: U256,
    total: impl FnOnce() -> Result<U256, Error>,
) -> Result<U256, Error> {
    ensure_nonzero(amount)?;
    if supply.is_zero() {
        return Ok(amount);
    }
    mul_div(amount, supply, total()?).ok_or(Error::DivisionUndefined)
}

/// Native tokens paid out for burning shares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Redemption {
    pub amount: U256,
    /// Pro-rata claim before it was capped to the native reserve.
    pub claim: U256,
}

impl Redemption {
    pub fn is_clamped(&self) -> bool {
        self.claim > self.amount
    }
}

/// Computes the payout for burning `shares` out of `supply`.
///
/// A claim larger than the native reserve is capped to the whole reserve.
pub fn redeem(shares: U256, supply: U256, total: U256, native: U256) -> Result<Redemption, Error> {
    ensure_nonzero(shares)?;
    let claim = mul_div(shares, total, supply).ok_or(Error::DivisionUndefined)?;
    Ok(Redemption {
        amount: claim.min(native),
        claim,
    })
}

/// Display metadata of the share token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for ShareMetadata {
    fn default() -> Self {
        Self {
            name: "Staking Pool Share".to_owned(),
            symbol: "SPS".to_owned(),
            decimals: 18,
        }
    }
}

/// Balances of the pool's own share token.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShareLedger {
    supply: U256,
    balances: BTreeMap<H160, U256>,
}

impl ShareLedger {
    pub fn supply(&self) -> U256 {
        self.supply
    }

    pub fn balance_of(&self, account: H160) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    pub fn mint(&mut self, to: H160, amount: U256) -> Result<(), Error> {
        let balance = checked_add(self.balance_of(to), amount)?;
        self.supply = checked_add(self.supply, amount)?;
        self.balances.insert(to, balance);
        Ok(())
    }

    pub fn burn(&mut self, from: H160, amount: U256) -> Result<(), Error> {
        let balance = self.debit(from, amount)?;
        self.supply -= amount;
        self.set_balance(from, balance);
        Ok(())
    }

    pub fn transfer(&mut self, from: H160, to: H160, amount: U256) -> Result<(), Error> {
        let balance = self.debit(from, amount)?;
        self.set_balance(from, balance);
        let balance = checked_add(self.balance_of(to), amount)?;
        self.set_balance(to, balance);
        Ok(())
    }

    fn debit(&self, from: H160, amount: U256) -> Result<U256, Error> {
        let held = self.balance_of(from);
        held.checked_sub(amount).ok_or(Error::InsufficientShares {
            requested: amount,
            held,
        })
    }

    fn set_balance(&mut self, account: H160, balance: U256) {
        if balance.is_zero() {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, balance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_deposit_mints_one_to_one() {
        let shares = shares_for_deposit(1000.into(), U256::zero(), || {
            unreachable!("bootstrap deposits do not value the pool")
        });
        assert_eq!(shares.unwrap(), 1000.into());
    }

    #[test]
    fn proportional_deposit() {
        // total of 1000 native at a 1% dynamic fee
        assert_eq!(
            shares_for_deposit(1000.into(), 1000.into(), || Ok(1010.into())).unwrap(),
            990.into()
        );
    }

    #[test]
    fn deposit_into_worthless_pool_is_undefined() {
        assert!(matches!(
            shares_for_deposit(1000.into(), 1000.into(), || Ok(U256::zero())),
            Err(Error::DivisionUndefined)
        ));
    }

    #[test]
    fn withdrawal_is_clamped_to_native_reserve() {
        let redemption = redeem(990.into(), 990.into(), 993.into(), 984.into()).unwrap();
        assert_eq!(redemption.claim, 993.into());
        assert_eq!(redemption.amount, 984.into());
        assert!(redemption.is_clamped());
    }

    #[test]
    fn partial_withdrawal() {
        let redemption = redeem(100.into(), 1000.into(), 1010.into(), 1000.into()).unwrap();
        assert_eq!(redemption.amount, 101.into());
        assert!(!redemption.is_clamped());
    }

    #[test]
    fn zero_amounts_are_rejected() {
        assert!(matches!(
            shares_for_deposit(U256::zero(), 1.into(), || Ok(1.into())),
            Err(Error::AmountZero)
        ));
        assert!(matches!(
            redeem(U256::zero(), 1.into(), 1.into(), 1.into()),
            Err(Error::AmountZero)
        ));
    }

    #[test]
    fn share_ledger_accounting() {
        let (alice, bob) = (H160([1; 20]), H160([2; 20]));
        let mut shares = ShareLedger::default();

        shares.mint(alice, 1000.into()).unwrap();
        shares.transfer(alice, bob, 400.into()).unwrap();
        shares.burn(bob, 100.into()).unwrap();

        assert_eq!(shares.balance_of(alice), 600.into());
        assert_eq!(shares.balance_of(bob), 300.into());
        assert_eq!(shares.supply(), 900.into());

        assert!(matches!(
            shares.burn(bob, 301.into()),
            Err(Error::InsufficientShares { .. })
        ));
        assert!(matches!(
            shares.transfer(alice, bob, 601.into()),
            Err(Error::InsufficientShares { .. })
        ));

        shares.burn(alice, 600.into()).unwrap();
        assert_eq!(shares.balance_of(alice), U256::zero());
        assert_eq!(shares.supply(), 300.into());
    }
}
