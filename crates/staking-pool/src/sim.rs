//! Scenario files replayed by the `pool-sim` binary.

use {
    crate::{
        domain::{Error, Snapshot},
        infra::ledger::InMemoryLedger,
        pool::Pool,
    },
    anyhow::{Context, Result},
    number::serialization::HexOrDecimalU256,
    primitive_types::{H160, U256},
    serde::{Deserialize, Serialize},
    serde_with::serde_as,
    std::path::Path,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Scenario {
    #[serde(rename = "step", default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub async fn load(path: &Path) -> Result<Self> {
        let data = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("I/O error while reading {path:?}"))?;
        toml::from_str(&data).with_context(|| format!("TOML syntax error while reading {path:?}"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Token {
    Native,
    Staked,
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case", deny_unknown_fields)]
pub enum Step {
    /// Credits tokens to an account outside of the pool, e.g. to fund a
    /// trader or to simulate a direct transfer into the pool.
    Fund {
        account: H160,
        token: Token,
        #[serde_as(as = "HexOrDecimalU256")]
        amount: U256,
    },
    Deposit {
        caller: H160,
        #[serde_as(as = "HexOrDecimalU256")]
        amount: U256,
    },
    Withdraw {
        caller: H160,
        #[serde_as(as = "HexOrDecimalU256")]
        shares: U256,
    },
    Buy {
        caller: H160,
        #[serde_as(as = "HexOrDecimalU256")]
        amount: U256,
    },
    Sell {
        caller: H160,
        #[serde_as(as = "HexOrDecimalU256")]
        amount: U256,
    },
    TransferShares {
        from: H160,
        to: H160,
        #[serde_as(as = "HexOrDecimalU256")]
        amount: U256,
    },
    Bond {
        #[serde_as(as = "HexOrDecimalU256")]
        amount: U256,
    },
    Unbond {
        #[serde_as(as = "HexOrDecimalU256")]
        amount: U256,
    },
    Sync,
    RefreshFee,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fund { .. } => "fund",
            Self::Deposit { .. } => "deposit",
            Self::Withdraw { .. } => "withdraw",
            Self::Buy { .. } => "buy",
            Self::Sell { .. } => "sell",
            Self::TransferShares { .. } => "transfer-shares",
            Self::Bond { .. } => "bond",
            Self::Unbond { .. } => "unbond",
            Self::Sync => "sync",
            Self::RefreshFee => "refresh-fee",
        }
    }
}

/// Outcome of a single replayed step.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub step: usize,
    pub op: &'static str,
    #[serde_as(as = "Option<HexOrDecimalU256>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub state: Snapshot,
}

impl Report {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Replays scenario steps against a pool backed by in-memory ledgers.
pub struct Simulator {
    pub pool: Pool,
    pub native: std::sync::Arc<InMemoryLedger>,
    pub staked: std::sync::Arc<InMemoryLedger>,
}

impl Simulator {
    pub async fn run(&self, scenario: &Scenario) -> Vec<Report> {
        let mut reports = Vec::with_capacity(scenario.steps.len());
        for (index, step) in scenario.steps.iter().enumerate() {
            let result = self.apply(step).await;
            if let Err(err) = &result {
                tracing::debug!(step = index, op = step.name(), ?err, "step failed");
            }
            let (value, error) = match result {
                Ok(value) => (value, None),
                Err(err) => (None, Some(format!("{:#}", anyhow::Error::from(err)))),
            };
            reports.push(Report {
                step: index,
                op: step.name(),
                value,
                error,
                state: self.pool.state().await,
            });
        }
        reports
    }

    async fn apply(&self, step: &Step) -> Result<Option<U256>, Error> {
        let value = match *step {
            Step::Fund {
                account,
                token,
                amount,
            } => {
                let ledger = match token {
                    Token::Native => &self.native,
                    Token::Staked => &self.staked,
                };
                ledger.credit(account, amount).map_err(Error::Ledger)?;
                None
            }
            Step::Deposit { caller, amount } => {
                Some(self.pool.provide_liquidity(caller, amount).await?)
            }
            Step::Withdraw { caller, shares } => {
                Some(self.pool.remove_liquidity(caller, shares).await?)
            }
            Step::Buy { caller, amount } => Some(self.pool.buy(caller, amount).await?),
            Step::Sell { caller, amount } => Some(self.pool.sell(caller, amount).await?),
            Step::TransferShares { from, to, amount } => {
                self.pool.transfer_shares(from, to, amount).await?;
                None
            }
            Step::Bond { amount } => {
                self.pool.bond(amount).await?;
                None
            }
            Step::Unbond { amount } => {
                self.pool.unbond(amount).await?;
                None
            }
            Step::Sync => {
                self.pool.sync().await?;
                None
            }
            Step::RefreshFee => Some(self.pool.refresh_fee().await?),
        };
        Ok(value)
    }
}
