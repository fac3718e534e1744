use {
    super::{
        error::{Error, checked_add},
        fee::{self, TargetUtilization},
        liquidity::ShareLedger,
        utilization, valuation,
    },
    number::serialization::HexOrDecimalU256,
    primitive_types::U256,
    serde::Serialize,
    serde_with::serde_as,
};

/// Immutable pool parameters fixed at deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parameters {
    pub target_utilization: TargetUtilization,
    /// Flat fee charged on every trade, in the traded asset's smallest unit.
    pub base_fee: U256,
}

/// Mutable pool state. Every operation reads and commits it as a whole.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub native_balance: U256,
    pub staked_balance: U256,
    pub bonded_balance: U256,
    pub dynamic_fee_bp: U256,
    pub shares: ShareLedger,
}

impl State {
    pub fn new(initial_dynamic_fee_bp: U256) -> Self {
        Self {
            native_balance: U256::zero(),
            staked_balance: U256::zero(),
            bonded_balance: U256::zero(),
            dynamic_fee_bp: initial_dynamic_fee_bp,
            shares: ShareLedger::default(),
        }
    }

    /// Staked plus bonded value, the numerator of the utilization.
    pub fn committed(&self) -> Result<U256, Error> {
        checked_add(self.staked_balance, self.bonded_balance)
    }

    pub fn utilization(&self) -> Result<U256, Error> {
        utilization::calculate_utilization(
            self.staked_balance,
            self.bonded_balance,
            self.native_balance,
        )
    }

    /// Recomputes and stores the dynamic fee from the current balances.
    ///
    /// While utilization is undefined (no native reserve or nothing
    /// committed) the stored fee is kept, which is how a freshly deployed
    /// pool trades at its initial fee.
    pub fn refresh_fee(&mut self, target: TargetUtilization) -> Result<U256, Error> {
        match self.utilization() {
            Ok(utilization) => self.dynamic_fee_bp = fee::quote_fee(utilization, target)?,
            Err(Error::AmountZero | Error::DivisionUndefined) => (),
            Err(err) => return Err(err),
        }
        Ok(self.dynamic_fee_bp)
    }

    /// Pool valuation at the stored dynamic fee.
    pub fn total(&self) -> Result<U256, Error> {
        valuation::total(self.native_balance, self.committed()?, self.dynamic_fee_bp)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            native_balance: self.native_balance,
            staked_balance: self.staked_balance,
            bonded_balance: self.bonded_balance,
            dynamic_fee_bp: self.dynamic_fee_bp,
            share_supply: self.shares.supply(),
        }
    }
}

/// Serializable view of the pool balances.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde_as(as = "HexOrDecimalU256")]
    pub native_balance: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub staked_balance: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub bonded_balance: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub dynamic_fee_bp: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub share_supply: U256,
}
