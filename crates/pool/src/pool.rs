//! The lending pool
//!
//! Single-actor orchestrator over reserves, positions, the oracle and the
//! transfer backend. Every public operation follows the same shape:
//! snapshot the state, run the operation, and restore the snapshot on any
//! error, so a failed operation leaves no trace. Reserve mutations always
//! accrue first, mutate second and rerate last.

use std::collections::BTreeSet;
use std::sync::Arc;

use lentra_core::{AssetId, Clock, RateMode, UserId, MAX_AMOUNT};
use lentra_math::percent_mul;
use lentra_oracle::PriceOracle;
use lentra_reserve::{RateStrategy, Reserve, ReserveConfig, UserPosition};
use lentra_risk::{
    available_collateral_to_liquidate, max_liquidatable_debt, AccountSummary, RiskEngine,
    HEALTH_FACTOR_LIQUIDATION_THRESHOLD,
};
use serde_json::Value;
use tracing::info;

use crate::error::PoolError;
use crate::flashloan::FlashLoanReceiver;
use crate::state::{PoolConfig, PoolState};
use crate::transfer::AssetTransfer;
use crate::validation::{
    check_amount, check_available_liquidity, check_borrow_mode, check_reserve_usable,
};

pub struct LendingPool {
    state: PoolState,
    oracle: Arc<dyn PriceOracle>,
    transfer: Arc<dyn AssetTransfer>,
    clock: Arc<dyn Clock>,
    risk: RiskEngine,
    /// Reserves currently inside an operation. Cleared before flash-loan
    /// callbacks so the pool is re-entrant there.
    entered: BTreeSet<AssetId>,
}

impl LendingPool {
    pub fn new(
        config: PoolConfig,
        oracle: Arc<dyn PriceOracle>,
        transfer: Arc<dyn AssetTransfer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let risk = RiskEngine::new(oracle.clone());
        Self {
            state: PoolState::new(config),
            oracle,
            transfer,
            clock,
            risk,
            entered: BTreeSet::new(),
        }
    }

    // ---- admin -----------------------------------------------------------

    /// List a new asset.
    pub fn init_reserve(
        &mut self,
        asset: AssetId,
        config: ReserveConfig,
        strategy: RateStrategy,
        market_stable_rate: u128,
    ) -> Result<(), PoolError> {
        if self.state.reserves.contains_key(&asset) {
            return Err(PoolError::ReserveAlreadyListed { asset });
        }
        let now = self.clock.now();
        info!(%asset, "reserve listed");
        self.state.reserves.insert(
            asset.clone(),
            Reserve::new(asset, config, strategy, market_stable_rate, now),
        );
        Ok(())
    }

    pub fn update_reserve_config(
        &mut self,
        asset: &AssetId,
        config: ReserveConfig,
    ) -> Result<(), PoolError> {
        self.state.reserve_mut(asset)?.config = config;
        Ok(())
    }

    /// Reseed the stable leg of the rate model for one asset.
    pub fn set_market_stable_rate(&mut self, asset: &AssetId, rate: u128) -> Result<(), PoolError> {
        let snapshot = self.state.clone();
        let result = (|| {
            let now = self.clock.now();
            let reserve = self.state.reserve_mut(asset)?;
            reserve.accrue(now)?;
            reserve.market_stable_rate = rate;
            reserve.update_rates(now)?;
            Ok(())
        })();
        self.rollback_on_err(&result, snapshot);
        result
    }

    pub fn set_pool_config(&mut self, config: PoolConfig) {
        self.state.config = config;
    }

    // ---- core operations -------------------------------------------------

    /// Supply `amount` of `asset` from `depositor`'s wallet, crediting the
    /// deposit to `on_behalf_of` when given.
    pub fn deposit(
        &mut self,
        asset: &AssetId,
        depositor: &UserId,
        on_behalf_of: Option<&UserId>,
        amount: u128,
    ) -> Result<(), PoolError> {
        let snapshot = self.state.clone();
        let result = self.deposit_inner(asset, depositor, on_behalf_of, amount);
        self.rollback_on_err(&result, snapshot);
        result
    }

    fn deposit_inner(
        &mut self,
        asset: &AssetId,
        depositor: &UserId,
        on_behalf_of: Option<&UserId>,
        amount: u128,
    ) -> Result<(), PoolError> {
        check_amount(amount)?;
        self.enter(asset)?;
        let now = self.clock.now();

        let reserve = self.state.reserve_mut(asset)?;
        check_reserve_usable(reserve, true)?;
        reserve.accrue(now)?;
        let liquidity_index = reserve.liquidity_index;

        self.transfer.pull(asset, depositor, amount)?;

        let beneficiary = on_behalf_of.unwrap_or(depositor);
        self.state
            .position_mut(beneficiary, asset)
            .deposit(amount, liquidity_index)?;

        let reserve = self.state.reserve_mut(asset)?;
        reserve.add_liquidity(amount)?;
        reserve.update_rates(now)?;

        info!(%asset, user = %beneficiary, amount, "deposit");
        self.exit(asset);
        Ok(())
    }

    /// Withdraw up to the full deposit balance, paying out to `to` (the
    /// depositor's own wallet when not given). `MAX_AMOUNT` withdraws
    /// everything. Returns the amount paid out.
    pub fn withdraw(
        &mut self,
        asset: &AssetId,
        user: &UserId,
        to: Option<&UserId>,
        amount: u128,
    ) -> Result<u128, PoolError> {
        let snapshot = self.state.clone();
        let result = self.withdraw_inner(asset, user, to, amount);
        self.rollback_on_err(&result, snapshot);
        result
    }

    fn withdraw_inner(
        &mut self,
        asset: &AssetId,
        user: &UserId,
        to: Option<&UserId>,
        amount: u128,
    ) -> Result<u128, PoolError> {
        self.enter(asset)?;
        let now = self.clock.now();

        let reserve = self.state.reserve_mut(asset)?;
        check_reserve_usable(reserve, false)?;
        reserve.accrue(now)?;
        let liquidity_index = reserve.liquidity_index;
        let available = reserve.available_liquidity;

        let position = self.state.position(user, asset);
        let balance = position.deposit_balance(liquidity_index)?;
        let requested = if amount == MAX_AMOUNT { balance } else { amount };
        check_amount(requested)?;
        if requested > balance {
            return Err(PoolError::InvalidAmount);
        }
        check_available_liquidity(asset, available, requested)?;

        let was_collateral = position.use_as_collateral;
        self.state
            .position_mut(user, asset)
            .withdraw(requested, liquidity_index)?;
        let reserve = self.state.reserve_mut(asset)?;
        reserve.remove_liquidity(requested)?;
        reserve.update_rates(now)?;

        // a collateral decrease must not push the account under water
        if was_collateral {
            self.check_still_healthy(user, now)?;
        }

        self.transfer.push(asset, to.unwrap_or(user), requested)?;
        info!(%asset, %user, amount = requested, "withdraw");
        self.exit(asset);
        Ok(requested)
    }

    /// Draw `amount` of `asset` against `on_behalf_of`'s collateral (the
    /// caller's own when not given). Funds go to the caller's wallet.
    pub fn borrow(
        &mut self,
        asset: &AssetId,
        caller: &UserId,
        on_behalf_of: Option<&UserId>,
        amount: u128,
        mode: RateMode,
    ) -> Result<(), PoolError> {
        let snapshot = self.state.clone();
        let result = self.borrow_inner(asset, caller, on_behalf_of, amount, mode);
        self.rollback_on_err(&result, snapshot);
        result
    }

    fn borrow_inner(
        &mut self,
        asset: &AssetId,
        caller: &UserId,
        on_behalf_of: Option<&UserId>,
        amount: u128,
        mode: RateMode,
    ) -> Result<(), PoolError> {
        check_amount(amount)?;
        self.enter(asset)?;
        let now = self.clock.now();

        let reserve = self.state.reserve(asset)?;
        check_reserve_usable(reserve, true)?;
        check_borrow_mode(reserve, mode)?;

        let borrower = on_behalf_of.unwrap_or(caller);
        if borrower != caller && !reserve.config.credit_delegation_enabled {
            return Err(PoolError::BorrowingDisabled {
                asset: asset.clone(),
            });
        }

        let reserve = self.state.reserve_mut(asset)?;
        reserve.accrue(now)?;
        let available = reserve.available_liquidity;
        check_available_liquidity(asset, available, amount)?;

        self.open_debt(asset, borrower, amount, mode, now)?;

        let reserve = self.state.reserve_mut(asset)?;
        reserve.remove_liquidity(amount)?;
        reserve.update_rates(now)?;

        self.transfer.push(asset, caller, amount)?;
        info!(%asset, user = %borrower, amount, %mode, "borrow");
        self.exit(asset);
        Ok(())
    }

    /// Collateral-checked debt mint, shared by `borrow` and the flash-loan
    /// fallback. Does not move liquidity or funds.
    fn open_debt(
        &mut self,
        asset: &AssetId,
        borrower: &UserId,
        amount: u128,
        mode: RateMode,
        now: u64,
    ) -> Result<(), PoolError> {
        let summary = self.summary_of(borrower, now)?;
        if summary.total_collateral_value == 0 {
            return Err(PoolError::CollateralBalanceIsZero);
        }
        if summary.health_factor < HEALTH_FACTOR_LIQUIDATION_THRESHOLD {
            return Err(PoolError::HealthFactorBelowThreshold {
                health_factor: summary.health_factor,
            });
        }
        let decimals = self.state.reserve(asset)?.config.decimals;
        let borrow_value = self.risk.asset_value(asset, amount, decimals)?;
        if borrow_value > summary.available_borrows_value {
            return Err(PoolError::CollateralCannotCoverNewBorrow);
        }

        let reserve = self.state.reserve(asset)?;
        let stable_rate = reserve.stable_borrow_rate;
        let variable_index = reserve.variable_borrow_index;

        match mode {
            RateMode::Stable => {
                self.state
                    .position_mut(borrower, asset)
                    .borrow_stable(amount, stable_rate, now)?;
                self.state
                    .reserve_mut(asset)?
                    .mint_stable_debt(amount, stable_rate, now)?;
            }
            RateMode::Variable => {
                let scaled = self
                    .state
                    .position_mut(borrower, asset)
                    .borrow_variable(amount, variable_index)?;
                self.state
                    .reserve_mut(asset)?
                    .add_scaled_variable_debt(scaled)?;
            }
            RateMode::None => return Err(PoolError::InvalidInterestRateMode),
        }
        Ok(())
    }

    /// Repay debt of the selected mode. `MAX_AMOUNT` repays everything;
    /// repaying on behalf of another user requires an explicit amount.
    /// Returns the amount actually retired.
    pub fn repay(
        &mut self,
        asset: &AssetId,
        payer: &UserId,
        on_behalf_of: Option<&UserId>,
        amount: u128,
        mode: RateMode,
    ) -> Result<u128, PoolError> {
        let snapshot = self.state.clone();
        let result = self.repay_inner(asset, payer, on_behalf_of, amount, mode);
        self.rollback_on_err(&result, snapshot);
        result
    }

    fn repay_inner(
        &mut self,
        asset: &AssetId,
        payer: &UserId,
        on_behalf_of: Option<&UserId>,
        amount: u128,
        mode: RateMode,
    ) -> Result<u128, PoolError> {
        check_amount(amount)?;
        if mode == RateMode::None {
            return Err(PoolError::InvalidInterestRateMode);
        }
        let borrower = on_behalf_of.unwrap_or(payer);
        if borrower != payer && amount == MAX_AMOUNT {
            return Err(PoolError::NoExplicitAmountOnBehalf);
        }
        self.enter(asset)?;
        let now = self.clock.now();

        let reserve = self.state.reserve_mut(asset)?;
        check_reserve_usable(reserve, false)?;
        reserve.accrue(now)?;
        let variable_index = reserve.variable_borrow_index;

        let position = self.state.position(borrower, asset);
        let debt = match mode {
            RateMode::Stable => position.stable_debt(now)?,
            RateMode::Variable => position.variable_debt(variable_index)?,
            RateMode::None => unreachable!(),
        };
        if debt == 0 {
            return Err(PoolError::NoDebtOfSelectedType);
        }
        let repaid = amount.min(debt);

        self.transfer.pull(asset, payer, repaid)?;

        match mode {
            RateMode::Stable => {
                let user_rate = position.stable_rate;
                self.state
                    .position_mut(borrower, asset)
                    .repay_stable(repaid, now)?;
                self.state
                    .reserve_mut(asset)?
                    .burn_stable_debt(repaid, user_rate, now)?;
            }
            RateMode::Variable => {
                let burned = self
                    .state
                    .position_mut(borrower, asset)
                    .repay_variable(repaid, variable_index)?;
                self.state
                    .reserve_mut(asset)?
                    .remove_scaled_variable_debt(burned);
            }
            RateMode::None => unreachable!(),
        }

        let reserve = self.state.reserve_mut(asset)?;
        reserve.add_liquidity(repaid)?;
        reserve.update_rates(now)?;

        info!(%asset, user = %borrower, amount = repaid, %mode, "repay");
        self.exit(asset);
        Ok(repaid)
    }

    /// Flip the collateral flag on a deposit. Disabling must leave the
    /// account healthy.
    pub fn set_use_as_collateral(
        &mut self,
        asset: &AssetId,
        user: &UserId,
        enabled: bool,
    ) -> Result<(), PoolError> {
        let snapshot = self.state.clone();
        let result = self.set_use_as_collateral_inner(asset, user, enabled);
        self.rollback_on_err(&result, snapshot);
        result
    }

    fn set_use_as_collateral_inner(
        &mut self,
        asset: &AssetId,
        user: &UserId,
        enabled: bool,
    ) -> Result<(), PoolError> {
        self.enter(asset)?;
        let now = self.clock.now();

        let reserve = self.state.reserve_mut(asset)?;
        check_reserve_usable(reserve, false)?;
        reserve.accrue(now)?;

        if self.state.position(user, asset).scaled_deposit == 0 {
            return Err(PoolError::CollateralBalanceIsZero);
        }
        self.state.position_mut(user, asset).use_as_collateral = enabled;

        if !enabled {
            self.check_still_healthy(user, now)?;
        }
        self.exit(asset);
        Ok(())
    }

    /// Repay part of an underwater borrower's debt and seize collateral
    /// plus the bonus. With `receive_deposit` the liquidator takes over the
    /// deposit instead of receiving underlying. Returns `(debt covered,
    /// collateral seized)`.
    #[allow(clippy::too_many_arguments)]
    pub fn liquidation_call(
        &mut self,
        collateral_asset: &AssetId,
        debt_asset: &AssetId,
        borrower: &UserId,
        liquidator: &UserId,
        debt_to_cover: u128,
        receive_deposit: bool,
    ) -> Result<(u128, u128), PoolError> {
        let snapshot = self.state.clone();
        let result = self.liquidation_call_inner(
            collateral_asset,
            debt_asset,
            borrower,
            liquidator,
            debt_to_cover,
            receive_deposit,
        );
        self.rollback_on_err(&result, snapshot);
        result
    }

    fn liquidation_call_inner(
        &mut self,
        collateral_asset: &AssetId,
        debt_asset: &AssetId,
        borrower: &UserId,
        liquidator: &UserId,
        debt_to_cover: u128,
        receive_deposit: bool,
    ) -> Result<(u128, u128), PoolError> {
        check_amount(debt_to_cover)?;
        self.enter(collateral_asset)?;
        if debt_asset != collateral_asset {
            self.enter(debt_asset)?;
        }
        let now = self.clock.now();

        let reserve = self.state.reserve_mut(collateral_asset)?;
        check_reserve_usable(reserve, false)?;
        reserve.accrue(now)?;
        let collateral_index = reserve.liquidity_index;
        let collateral_decimals = reserve.config.decimals;
        let liquidation_bonus = reserve.config.liquidation_bonus;
        let collateral_usable = reserve.config.usage_as_collateral_enabled;

        let reserve = self.state.reserve_mut(debt_asset)?;
        check_reserve_usable(reserve, false)?;
        reserve.accrue(now)?;
        let variable_index = reserve.variable_borrow_index;
        let debt_decimals = reserve.config.decimals;

        let summary = self.summary_of(borrower, now)?;
        if !summary.is_liquidatable() {
            return Err(PoolError::HealthFactorNotBelowThreshold);
        }

        let collateral_position = self.state.position(borrower, collateral_asset);
        if collateral_position.scaled_deposit == 0
            || !collateral_position.use_as_collateral
            || !collateral_usable
        {
            return Err(PoolError::CollateralCannotBeLiquidated);
        }

        let debt_position = self.state.position(borrower, debt_asset);
        let stable_debt = debt_position.stable_debt(now)?;
        let variable_debt = debt_position.variable_debt(variable_index)?;
        let total_debt = stable_debt
            .checked_add(variable_debt)
            .ok_or(lentra_math::MathError::Overflow)?;
        if total_debt == 0 {
            return Err(PoolError::CurrencyNotBorrowedByUser);
        }

        let max_debt = max_liquidatable_debt(total_debt, self.state.config.close_factor_bps)?;
        let requested_debt = debt_to_cover.min(max_debt);

        let debt_price = self.oracle.asset_price(debt_asset)?;
        let collateral_price = self.oracle.asset_price(collateral_asset)?;
        let collateral_balance = collateral_position.deposit_balance(collateral_index)?;

        let outcome = available_collateral_to_liquidate(
            requested_debt,
            debt_price,
            debt_decimals,
            collateral_price,
            collateral_decimals,
            liquidation_bonus,
            collateral_balance,
        )?;

        if !receive_deposit {
            let available = self.state.reserve(collateral_asset)?.available_liquidity;
            check_available_liquidity(collateral_asset, available, outcome.collateral_to_seize)?;
        }

        self.transfer
            .pull(debt_asset, liquidator, outcome.debt_to_cover)?;

        // retire variable debt first, stable with the remainder
        let variable_part = outcome.debt_to_cover.min(variable_debt);
        if variable_part > 0 {
            let burned = self
                .state
                .position_mut(borrower, debt_asset)
                .repay_variable(variable_part, variable_index)?;
            self.state
                .reserve_mut(debt_asset)?
                .remove_scaled_variable_debt(burned);
        }
        let stable_part = outcome.debt_to_cover - variable_part;
        if stable_part > 0 {
            let user_rate = debt_position.stable_rate;
            self.state
                .position_mut(borrower, debt_asset)
                .repay_stable(stable_part, now)?;
            self.state
                .reserve_mut(debt_asset)?
                .burn_stable_debt(stable_part, user_rate, now)?;
        }
        let reserve = self.state.reserve_mut(debt_asset)?;
        reserve.add_liquidity(outcome.debt_to_cover)?;
        reserve.update_rates(now)?;

        self.state
            .position_mut(borrower, collateral_asset)
            .withdraw(outcome.collateral_to_seize, collateral_index)?;
        if receive_deposit {
            self.state
                .position_mut(liquidator, collateral_asset)
                .deposit(outcome.collateral_to_seize, collateral_index)?;
        } else {
            self.state
                .reserve_mut(collateral_asset)?
                .remove_liquidity(outcome.collateral_to_seize)?;
            self.transfer
                .push(collateral_asset, liquidator, outcome.collateral_to_seize)?;
        }
        self.state
            .reserve_mut(collateral_asset)?
            .update_rates(now)?;

        info!(
            collateral = %collateral_asset,
            debt = %debt_asset,
            user = %borrower,
            %liquidator,
            debt_covered = outcome.debt_to_cover,
            collateral_seized = outcome.collateral_to_seize,
            receive_deposit,
            "liquidation"
        );
        self.exit(debt_asset);
        self.exit(collateral_asset);
        Ok((outcome.debt_to_cover, outcome.collateral_to_seize))
    }

    /// Draw uncollateralized liquidity for the duration of one callback.
    ///
    /// `modes[i]` selects the fallback for asset `i`: `None` means the loan
    /// must be repaid in full or the whole operation fails; a borrow mode
    /// converts any repayment shortfall into regular debt for
    /// `on_behalf_of`, collateral checks included.
    #[allow(clippy::too_many_arguments)]
    pub fn flash_loan(
        &mut self,
        receiver: &mut dyn FlashLoanReceiver,
        assets: &[AssetId],
        amounts: &[u128],
        modes: &[RateMode],
        initiator: &UserId,
        on_behalf_of: &UserId,
        params: &Value,
    ) -> Result<(), PoolError> {
        let snapshot = self.state.clone();
        let account = receiver.account();
        let mut outstanding: Vec<(AssetId, u128)> = Vec::new();
        let result = self.flash_loan_inner(
            receiver,
            assets,
            amounts,
            modes,
            initiator,
            on_behalf_of,
            params,
            &mut outstanding,
        );
        if result.is_err() {
            // the state snapshot restores the reserves; drawn funds still
            // sitting in the receiver wallet are clawed back best-effort
            for (asset, amount) in &outstanding {
                let _ = self.transfer.pull_up_to(asset, &account, *amount);
            }
        }
        self.rollback_on_err(&result, snapshot);
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn flash_loan_inner(
        &mut self,
        receiver: &mut dyn FlashLoanReceiver,
        assets: &[AssetId],
        amounts: &[u128],
        modes: &[RateMode],
        initiator: &UserId,
        on_behalf_of: &UserId,
        params: &Value,
        outstanding: &mut Vec<(AssetId, u128)>,
    ) -> Result<(), PoolError> {
        if assets.is_empty() || assets.len() != amounts.len() || assets.len() != modes.len() {
            return Err(PoolError::InvalidAmount);
        }
        let account = receiver.account();
        let now = self.clock.now();
        let premium_bps = u128::from(self.state.config.flash_loan_premium_bps);

        // draw phase: push everything out, no locks kept across the callback
        let mut premiums = Vec::with_capacity(assets.len());
        for (asset, &amount) in assets.iter().zip(amounts) {
            if self.entered.contains(asset) {
                return Err(PoolError::ReentrantReserveAccess {
                    asset: asset.clone(),
                });
            }
            check_amount(amount)?;
            let reserve = self.state.reserve_mut(asset)?;
            check_reserve_usable(reserve, true)?;
            reserve.accrue(now)?;
            check_available_liquidity(asset, reserve.available_liquidity, amount)?;
            let reserve = self.state.reserve_mut(asset)?;
            reserve.remove_liquidity(amount)?;
            premiums.push(percent_mul(amount, premium_bps)?);
            self.transfer.push(asset, &account, amount)?;
            outstanding.push((asset.clone(), amount));
        }

        if !receiver.execute_operation(self, assets, amounts, &premiums, initiator, params) {
            return Err(PoolError::FlashLoanRepaymentFailed);
        }

        // settlement phase: re-read everything, the callback may have
        // touched any reserve
        for ((asset, &amount), (&premium, &mode)) in assets
            .iter()
            .zip(amounts)
            .zip(premiums.iter().zip(modes))
        {
            let due = amount
                .checked_add(premium)
                .ok_or(lentra_math::MathError::Overflow)?;
            let pulled = self.transfer.pull_up_to(asset, &account, due)?;
            if let Some(entry) = outstanding.iter_mut().find(|(a, _)| a == asset) {
                entry.1 = entry.1.saturating_sub(pulled);
            }

            let reserve = self.state.reserve_mut(asset)?;
            reserve.accrue(now)?;
            reserve.add_liquidity(pulled)?;

            if pulled < due {
                if mode == RateMode::None {
                    return Err(PoolError::FlashLoanRepaymentFailed);
                }
                let reserve = self.state.reserve(asset)?;
                check_borrow_mode(reserve, mode)?;
                if on_behalf_of != initiator && !reserve.config.credit_delegation_enabled {
                    return Err(PoolError::BorrowingDisabled {
                        asset: asset.clone(),
                    });
                }
                let shortfall = due - pulled;
                self.open_debt(asset, on_behalf_of, shortfall, mode, now)?;
            }

            if premium > 0 {
                match self.state.config.premium_receiver.clone() {
                    Some(collector) => {
                        let index = self.state.reserve(asset)?.liquidity_index;
                        self.state
                            .position_mut(&collector, asset)
                            .deposit(premium, index)?;
                    }
                    None => {
                        self.state
                            .reserve_mut(asset)?
                            .cumulate_to_liquidity_index(premium, now)?;
                    }
                }
            }

            let reserve = self.state.reserve_mut(asset)?;
            reserve.update_rates(now)?;
            info!(%asset, amount, premium, repaid = pulled, "flash loan settled");
        }
        Ok(())
    }

    // ---- views -----------------------------------------------------------

    pub fn user_account_data(&self, user: &UserId) -> Result<AccountSummary, PoolError> {
        Ok(self.summary_of(user, self.clock.now())?)
    }

    pub fn reserve(&self, asset: &AssetId) -> Result<&Reserve, PoolError> {
        self.state.reserve(asset)
    }

    pub fn user_position(&self, user: &UserId, asset: &AssetId) -> UserPosition {
        self.state.position(user, asset)
    }

    /// Liquidity index projected to now, for balance reads between ops.
    pub fn normalized_income(&self, asset: &AssetId) -> Result<u128, PoolError> {
        Ok(self.state.reserve(asset)?.normalized_income(self.clock.now())?)
    }

    /// Variable borrow index projected to now.
    pub fn normalized_debt(&self, asset: &AssetId) -> Result<u128, PoolError> {
        Ok(self.state.reserve(asset)?.normalized_debt(self.clock.now())?)
    }

    pub fn config(&self) -> &PoolConfig {
        &self.state.config
    }

    // ---- internals -------------------------------------------------------

    fn summary_of(&self, user: &UserId, now: u64) -> Result<AccountSummary, PoolError> {
        let positions = self.state.positions_of(user);
        Ok(self
            .risk
            .account_summary(&self.state.reserves, &positions, now)?)
    }

    fn check_still_healthy(&self, user: &UserId, now: u64) -> Result<(), PoolError> {
        let summary = self.summary_of(user, now)?;
        if summary.total_debt_value > 0
            && summary.health_factor < HEALTH_FACTOR_LIQUIDATION_THRESHOLD
        {
            return Err(PoolError::TransferNotAllowed);
        }
        Ok(())
    }

    fn enter(&mut self, asset: &AssetId) -> Result<(), PoolError> {
        if !self.entered.insert(asset.clone()) {
            return Err(PoolError::ReentrantReserveAccess {
                asset: asset.clone(),
            });
        }
        Ok(())
    }

    fn exit(&mut self, asset: &AssetId) {
        self.entered.remove(asset);
    }

    fn rollback_on_err<T>(&mut self, result: &Result<T, PoolError>, snapshot: PoolState) {
        if result.is_err() {
            self.state = snapshot;
        }
        // locks never outlive an operation
        self.entered.clear();
    }
}
