//! The pool service: serializes every operation on the shared state and
//! talks to the token ledgers.
//!
//! Each mutating operation holds the state lock for its whole duration and
//! follows the same sequence: refresh the dynamic fee, validate, apply the
//! effects to the pool state and only then call into the ledgers (pulls
//! before pushes). If any step fails the state is restored to what it was
//! when the operation started, and tokens already pulled from the caller
//! are sent back.

use {
    crate::{
        domain::{
            Error,
            Parameters,
            ShareMetadata,
            Snapshot,
            State,
            error::{checked_add, ensure_nonzero},
            fee,
            liquidity::{self, Redemption},
            swap::{self, BuyQuote, SellQuote},
        },
        infra::ledger::TokenLedger,
    },
    primitive_types::{H160, U256},
    std::sync::Arc,
    tokio::sync::Mutex,
};

mod fee_source;

pub use fee_source::FeeSource;

/// Deployment time configuration of a pool.
#[derive(Clone, Debug)]
pub struct Config {
    pub parameters: Parameters,
    pub initial_dynamic_fee_bp: U256,
    /// Account holding the pool's native and staked tokens.
    pub pool_account: H160,
    /// Account holding the staked tokens the pool has bonded.
    pub bonding_account: H160,
    pub native_token: H160,
    pub staked_token: H160,
    pub share: ShareMetadata,
}

/// Ledgers of the two assets the pool trades.
#[derive(Clone)]
pub struct Ledgers {
    pub native: Arc<dyn TokenLedger>,
    pub staked: Arc<dyn TokenLedger>,
}

pub struct Pool {
    config: Config,
    ledgers: Ledgers,
    fee_source: FeeSource,
    state: Mutex<State>,
}

impl Pool {
    pub fn new(config: Config, ledgers: Ledgers, fee_source: FeeSource) -> Self {
        let state = State::new(config.initial_dynamic_fee_bp);
        Self {
            config,
            ledgers,
            fee_source,
            state: Mutex::new(state),
        }
    }

    /// Deposits `amount` native tokens from `caller` and returns the number
    /// of shares minted for them.
    pub async fn provide_liquidity(&self, caller: H160, amount: U256) -> Result<U256, Error> {
        let mut state = self.state.lock().await;
        let snapshot = state.clone();
        let result = self.provide_liquidity_locked(&mut state, caller, amount).await;
        restore_on_error(&mut state, snapshot, result, "provide_liquidity")
    }

    async fn provide_liquidity_locked(
        &self,
        state: &mut State,
        caller: H160,
        amount: U256,
    ) -> Result<U256, Error> {
        let shares = self.deposit_quote(state, amount)?;
        tracing::debug!(
            ?caller,
            %amount,
            %shares,
            fee_bp = %state.dynamic_fee_bp,
            "computed deposit"
        );

        state.native_balance = checked_add(state.native_balance, amount)?;
        state.shares.mint(caller, shares)?;

        self.ledgers
            .native
            .transfer_from(caller, self.config.pool_account, amount)
            .await
            .map_err(Error::Ledger)?;

        tracing::info!(?caller, %amount, %shares, "provided liquidity");
        Ok(shares)
    }

    /// Burns `shares` held by `caller` and pays out their value in native
    /// tokens. Returns the amount paid out.
    pub async fn remove_liquidity(&self, caller: H160, shares: U256) -> Result<U256, Error> {
        let mut state = self.state.lock().await;
        let snapshot = state.clone();
        let result = self.remove_liquidity_locked(&mut state, caller, shares).await;
        restore_on_error(&mut state, snapshot, result, "remove_liquidity")
    }

    async fn remove_liquidity_locked(
        &self,
        state: &mut State,
        caller: H160,
        shares: U256,
    ) -> Result<U256, Error> {
        let redemption = self.redeem_quote(state, caller, shares)?;
        if redemption.is_clamped() {
            tracing::warn!(
                ?caller,
                claim = %redemption.claim,
                paid = %redemption.amount,
                "withdrawal capped to the native reserve"
            );
        }

        state.native_balance -= redemption.amount;
        state.shares.burn(caller, shares)?;

        self.ledgers
            .native
            .transfer(caller, redemption.amount)
            .await
            .map_err(Error::Ledger)?;

        tracing::info!(?caller, %shares, amount = %redemption.amount, "removed liquidity");
        Ok(redemption.amount)
    }

    /// Sells `amount` staked tokens from `caller` for native tokens. Returns
    /// the native amount paid out.
    pub async fn sell(&self, caller: H160, amount: U256) -> Result<U256, Error> {
        let mut state = self.state.lock().await;
        let snapshot = state.clone();
        let result = self.sell_locked(&mut state, caller, amount).await;
        restore_on_error(&mut state, snapshot, result, "sell")
    }

    async fn sell_locked(&self, state: &mut State, caller: H160, amount: U256) -> Result<U256, Error> {
        let quote = self.sell_quote(state, amount)?;
        tracing::debug!(?caller, %amount, ?quote, "computed sell");

        state.staked_balance = checked_add(state.staked_balance, amount)?;
        state.native_balance -= quote.native_out;

        self.ledgers
            .staked
            .transfer_from(caller, self.config.pool_account, amount)
            .await
            .map_err(Error::Ledger)?;
        if let Err(err) = self.ledgers.native.transfer(caller, quote.native_out).await {
            self.refund(&*self.ledgers.staked, caller, amount).await;
            return Err(Error::Ledger(err));
        }

        tracing::info!(?caller, %amount, native_out = %quote.native_out, "sold staked tokens");
        Ok(quote.native_out)
    }

    /// Buys staked tokens with `amount` native tokens from `caller`, minting
    /// whatever the pool lacks. Returns the staked amount paid out.
    pub async fn buy(&self, caller: H160, amount: U256) -> Result<U256, Error> {
        let mut state = self.state.lock().await;
        let snapshot = state.clone();
        let result = self.buy_locked(&mut state, caller, amount).await;
        restore_on_error(&mut state, snapshot, result, "buy")
    }

    async fn buy_locked(&self, state: &mut State, caller: H160, amount: U256) -> Result<U256, Error> {
        let quote = self.buy_quote(state, amount).await?;
        tracing::debug!(?caller, %amount, ?quote, "computed buy");

        state.staked_balance = checked_add(state.staked_balance, quote.shortfall)? - quote.staked_out;
        state.native_balance = checked_add(state.native_balance, amount)?;

        self.ledgers
            .native
            .transfer_from(caller, self.config.pool_account, amount)
            .await
            .map_err(Error::Ledger)?;
        if let Err(err) = self.deliver_staked(caller, &quote).await {
            self.refund(&*self.ledgers.native, caller, amount).await;
            return Err(err);
        }

        tracing::info!(?caller, %amount, staked_out = %quote.staked_out, "bought staked tokens");
        Ok(quote.staked_out)
    }

    async fn deliver_staked(&self, caller: H160, quote: &BuyQuote) -> Result<(), Error> {
        if !quote.shortfall.is_zero() {
            self.mint_shortfall(quote.shortfall).await?;
        }
        self.ledgers
            .staked
            .transfer(caller, quote.staked_out)
            .await
            .map_err(Error::Ledger)
    }

    /// Sends tokens pulled from `caller` back after a later ledger call of
    /// the same operation failed.
    async fn refund(&self, ledger: &dyn TokenLedger, caller: H160, amount: U256) {
        match ledger.transfer(caller, amount).await {
            Ok(()) => tracing::info!(?caller, %amount, "refunded aborted operation"),
            Err(err) => {
                tracing::error!(?caller, %amount, ?err, "failed to refund aborted operation")
            }
        }
    }

    /// Mints `shortfall` staked tokens 1:1 into the pool account and checks
    /// that the ledger balance actually grew.
    async fn mint_shortfall(&self, shortfall: U256) -> Result<(), Error> {
        let pool = self.config.pool_account;
        let staked = &self.ledgers.staked;
        let before = staked.balance_of(pool).await.map_err(Error::Ledger)?;
        staked.mint(pool, shortfall).await.map_err(Error::Ledger)?;
        let after = staked.balance_of(pool).await.map_err(Error::Ledger)?;
        if after <= before {
            tracing::error!(%before, %after, %shortfall, "staked token mint had no effect");
            return Err(Error::MintingFailed);
        }
        tracing::debug!(%shortfall, "minted staked tokens");
        Ok(())
    }

    /// Overwrites the native and staked balances with what the ledgers
    /// report for the pool account.
    pub async fn sync(&self) -> Result<Snapshot, Error> {
        let mut state = self.state.lock().await;
        let pool = self.config.pool_account;
        let native = self
            .ledgers
            .native
            .balance_of(pool)
            .await
            .map_err(Error::Ledger)?;
        let staked = self
            .ledgers
            .staked
            .balance_of(pool)
            .await
            .map_err(Error::Ledger)?;

        if native != state.native_balance || staked != state.staked_balance {
            tracing::info!(
                native_before = %state.native_balance,
                native_after = %native,
                staked_before = %state.staked_balance,
                staked_after = %staked,
                "synced drifted balances"
            );
        }
        state.native_balance = native;
        state.staked_balance = staked;
        Ok(state.snapshot())
    }

    /// Moves `amount` staked tokens from the pool account to the bonding
    /// account. Bonded value keeps counting towards utilization.
    pub async fn bond(&self, amount: U256) -> Result<Snapshot, Error> {
        let mut state = self.state.lock().await;
        let snapshot = state.clone();
        let result = self.bond_locked(&mut state, amount).await;
        restore_on_error(&mut state, snapshot, result, "bond")
    }

    async fn bond_locked(&self, state: &mut State, amount: U256) -> Result<Snapshot, Error> {
        ensure_nonzero(amount)?;
        if amount > state.staked_balance {
            return Err(Error::InsufficientLiquidity {
                requested: amount,
                available: state.staked_balance,
            });
        }

        state.staked_balance -= amount;
        state.bonded_balance = checked_add(state.bonded_balance, amount)?;

        self.ledgers
            .staked
            .transfer(self.config.bonding_account, amount)
            .await
            .map_err(Error::Ledger)?;

        tracing::info!(%amount, bonded = %state.bonded_balance, "bonded staked tokens");
        Ok(state.snapshot())
    }

    /// Returns `amount` bonded staked tokens to the pool account.
    pub async fn unbond(&self, amount: U256) -> Result<Snapshot, Error> {
        let mut state = self.state.lock().await;
        let snapshot = state.clone();
        let result = self.unbond_locked(&mut state, amount).await;
        restore_on_error(&mut state, snapshot, result, "unbond")
    }

    async fn unbond_locked(&self, state: &mut State, amount: U256) -> Result<Snapshot, Error> {
        ensure_nonzero(amount)?;
        if amount > state.bonded_balance {
            return Err(Error::InsufficientLiquidity {
                requested: amount,
                available: state.bonded_balance,
            });
        }

        state.bonded_balance -= amount;
        state.staked_balance = checked_add(state.staked_balance, amount)?;

        self.ledgers
            .staked
            .transfer_from(self.config.bonding_account, self.config.pool_account, amount)
            .await
            .map_err(Error::Ledger)?;

        tracing::info!(%amount, bonded = %state.bonded_balance, "unbonded staked tokens");
        Ok(state.snapshot())
    }

    /// Recomputes the dynamic fee from the current balances and stores it.
    pub async fn refresh_fee(&self) -> Result<U256, Error> {
        let mut state = self.state.lock().await;
        let fee_bp = state.refresh_fee(self.config.parameters.target_utilization)?;
        tracing::debug!(%fee_bp, "refreshed dynamic fee");
        Ok(fee_bp)
    }

    /// Moves pool shares between accounts.
    pub async fn transfer_shares(&self, from: H160, to: H160, amount: U256) -> Result<(), Error> {
        self.state.lock().await.shares.transfer(from, to, amount)
    }

    pub async fn preview_deposit(&self, amount: U256) -> Result<U256, Error> {
        let mut state = self.state.lock().await.clone();
        self.deposit_quote(&mut state, amount)
    }

    pub async fn preview_redeem(&self, caller: H160, shares: U256) -> Result<U256, Error> {
        let mut state = self.state.lock().await.clone();
        Ok(self.redeem_quote(&mut state, caller, shares)?.amount)
    }

    pub async fn preview_sell(&self, amount: U256) -> Result<U256, Error> {
        let mut state = self.state.lock().await.clone();
        Ok(self.sell_quote(&mut state, amount)?.native_out)
    }

    pub async fn preview_buy(&self, amount: U256) -> Result<U256, Error> {
        let mut state = self.state.lock().await.clone();
        Ok(self.buy_quote(&mut state, amount).await?.staked_out)
    }

    pub async fn state(&self) -> Snapshot {
        self.state.lock().await.snapshot()
    }

    /// Pool valuation at the currently stored dynamic fee.
    pub async fn total(&self) -> Result<U256, Error> {
        self.state.lock().await.total()
    }

    pub async fn utilization(&self) -> Result<U256, Error> {
        self.state.lock().await.utilization()
    }

    pub async fn dynamic_fee_bp(&self) -> U256 {
        self.state.lock().await.dynamic_fee_bp
    }

    pub async fn calculate_dynamic_fee(&self, amount: U256) -> Result<U256, Error> {
        fee::calculate_dynamic_fee(amount, self.dynamic_fee_bp().await)
    }

    pub async fn calculate_total_fee(&self, amount: U256) -> Result<U256, Error> {
        fee::calculate_total_fee(
            amount,
            self.dynamic_fee_bp().await,
            self.config.parameters.base_fee,
        )
    }

    pub async fn share_balance_of(&self, account: H160) -> U256 {
        self.state.lock().await.shares.balance_of(account)
    }

    pub async fn share_supply(&self) -> U256 {
        self.state.lock().await.shares.supply()
    }

    pub fn share_metadata(&self) -> &ShareMetadata {
        &self.config.share
    }

    fn deposit_quote(&self, state: &mut State, amount: U256) -> Result<U256, Error> {
        ensure_nonzero(amount)?;
        state.refresh_fee(self.config.parameters.target_utilization)?;
        liquidity::shares_for_deposit(amount, state.shares.supply(), || state.total())
    }

    fn redeem_quote(&self, state: &mut State, caller: H160, shares: U256) -> Result<Redemption, Error> {
        ensure_nonzero(shares)?;
        let held = state.shares.balance_of(caller);
        if held < shares {
            return Err(Error::InsufficientShares {
                requested: shares,
                held,
            });
        }
        state.refresh_fee(self.config.parameters.target_utilization)?;
        liquidity::redeem(
            shares,
            state.shares.supply(),
            state.total()?,
            state.native_balance,
        )
    }

    fn sell_quote(&self, state: &mut State, amount: U256) -> Result<SellQuote, Error> {
        ensure_nonzero(amount)?;
        state.refresh_fee(self.config.parameters.target_utilization)?;
        let quote = swap::sell(
            amount,
            state.dynamic_fee_bp,
            self.config.parameters.base_fee,
        )?;
        if quote.native_out > state.native_balance {
            return Err(Error::InsufficientLiquidity {
                requested: quote.native_out,
                available: state.native_balance,
            });
        }
        Ok(quote)
    }

    async fn buy_quote(&self, state: &mut State, amount: U256) -> Result<BuyQuote, Error> {
        ensure_nonzero(amount)?;
        state.refresh_fee(self.config.parameters.target_utilization)?;
        let manager_fee = self
            .fee_source
            .manager_fee(amount, state.dynamic_fee_bp)
            .await?;
        swap::buy(
            amount,
            manager_fee,
            self.config.parameters.base_fee,
            state.staked_balance,
        )
    }
}

/// Puts the state back to `snapshot` if the operation failed.
fn restore_on_error<T>(
    state: &mut State,
    snapshot: State,
    result: Result<T, Error>,
    operation: &'static str,
) -> Result<T, Error> {
    if let Err(err) = &result {
        if *state != snapshot {
            tracing::warn!(operation, ?err, "operation failed after effects; restoring pool state");
        } else {
            tracing::debug!(operation, ?err, "operation rejected");
        }
        *state = snapshot;
    }
    result
}
