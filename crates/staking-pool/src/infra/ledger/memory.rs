use {
    super::TokenLedger,
    anyhow::{Context, Result, anyhow, ensure},
    primitive_types::{H160, U256},
    std::{collections::HashMap, sync::Mutex},
};

/// Process local ledger used by the simulator and in tests.
#[derive(Debug)]
pub struct InMemoryLedger {
    token: H160,
    holder: H160,
    mintable: bool,
    balances: Mutex<HashMap<H160, U256>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger for `token` whose `transfer` calls debit
    /// `holder`.
    pub fn new(token: H160, holder: H160) -> Self {
        Self {
            token,
            holder,
            mintable: false,
            balances: Default::default(),
        }
    }

    pub fn mintable(self) -> Self {
        Self {
            mintable: true,
            ..self
        }
    }

    /// Credits `account` out of thin air, e.g. to fund a trader or to
    /// simulate a direct transfer into the pool.
    pub fn credit(&self, account: H160, amount: U256) -> Result<()> {
        let mut balances = self.lock()?;
        let balance = balances.entry(account).or_default();
        *balance = balance
            .checked_add(amount)
            .with_context(|| format!("balance of {account:?} overflows"))?;
        Ok(())
    }

    pub fn balance(&self, account: H160) -> Result<U256> {
        Ok(self.lock()?.get(&account).copied().unwrap_or_default())
    }

    fn move_balance(&self, from: H160, to: H160, amount: U256) -> Result<()> {
        let mut balances = self.lock()?;
        let available = balances.get(&from).copied().unwrap_or_default();
        ensure!(
            available >= amount,
            "insufficient {:?} balance for {from:?}: has {available}, needs {amount}",
            self.token
        );
        balances.insert(from, available - amount);
        let balance = balances.entry(to).or_default();
        *balance = balance
            .checked_add(amount)
            .with_context(|| format!("balance of {to:?} overflows"))?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<H160, U256>>> {
        self.balances
            .lock()
            .map_err(|_| anyhow!("ledger for {:?} is poisoned", self.token))
    }
}

#[async_trait::async_trait]
impl TokenLedger for InMemoryLedger {
    async fn transfer(&self, to: H160, amount: U256) -> Result<()> {
        self.move_balance(self.holder, to, amount)
    }

    async fn transfer_from(&self, from: H160, to: H160, amount: U256) -> Result<()> {
        self.move_balance(from, to, amount)
    }

    async fn balance_of(&self, account: H160) -> Result<U256> {
        self.balance(account)
    }

    async fn mint(&self, to: H160, amount: U256) -> Result<()> {
        ensure!(self.mintable, "token {:?} is not mintable", self.token);
        self.credit(to, amount)
    }
}
