//! Per-asset reserve ledger
//!
//! Holds the index accumulators, the debt aggregates and the current rates.
//! The indices are monotonically non-decreasing; total liquidity is always
//! `availableLiquidity + totalStableDebt + totalVariableDebt`.

use alloy_primitives::U256;
use lentra_core::AssetId;
use lentra_math::{
    compounded_interest, linear_interest, ray_div, ray_mul, MathError, RAY,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{RateStrategy, ReserveConfig};
use crate::rates::compute_rates;

/// Mutable per-asset ledger.
///
/// Created once at market initialization, never destroyed. All amounts are
/// raw underlying units (`10^decimals`); indices and rates are RAY.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserve {
    pub asset: AssetId,
    pub config: ReserveConfig,
    pub strategy: RateStrategy,

    pub available_liquidity: u128,
    pub liquidity_index: u128,
    pub variable_borrow_index: u128,

    pub principal_stable_debt: u128,
    pub average_stable_rate: u128,
    pub scaled_variable_debt: u128,

    pub liquidity_rate: u128,
    pub variable_borrow_rate: u128,
    pub stable_borrow_rate: u128,
    /// Market-wide base rate seeding the stable leg of the rate model.
    pub market_stable_rate: u128,

    pub last_update: u64,
    pub stable_debt_last_update: u64,
}

impl Reserve {
    pub fn new(
        asset: AssetId,
        config: ReserveConfig,
        strategy: RateStrategy,
        market_stable_rate: u128,
        now: u64,
    ) -> Self {
        Self {
            asset,
            config,
            strategy,
            available_liquidity: 0,
            liquidity_index: RAY,
            variable_borrow_index: RAY,
            principal_stable_debt: 0,
            average_stable_rate: 0,
            scaled_variable_debt: 0,
            liquidity_rate: 0,
            variable_borrow_rate: 0,
            stable_borrow_rate: market_stable_rate,
            market_stable_rate,
            last_update: now,
            stable_debt_last_update: now,
        }
    }

    /// Advance both indices to `now`.
    ///
    /// Idempotent: zero elapsed time changes nothing. The liquidity index
    /// grows linearly (the index already encodes rate history); the variable
    /// borrow index compounds per second.
    pub fn accrue(&mut self, now: u64) -> Result<(), MathError> {
        let elapsed = now.saturating_sub(self.last_update);
        if elapsed == 0 {
            return Ok(());
        }

        if self.liquidity_rate > 0 {
            let factor = linear_interest(self.liquidity_rate, elapsed)?;
            self.liquidity_index = ray_mul(factor, self.liquidity_index)?;
        }
        if self.scaled_variable_debt > 0 {
            let factor = compounded_interest(self.variable_borrow_rate, elapsed)?;
            self.variable_borrow_index = ray_mul(factor, self.variable_borrow_index)?;
        }
        self.last_update = now;

        debug!(
            asset = %self.asset,
            elapsed,
            liquidity_index = self.liquidity_index,
            variable_borrow_index = self.variable_borrow_index,
            "reserve accrued"
        );
        Ok(())
    }

    /// Total stable debt: principal compounded at the *average* contract
    /// rate since the last stable-debt rebase (not the current market rate).
    pub fn total_stable_debt(&self, now: u64) -> Result<u128, MathError> {
        if self.principal_stable_debt == 0 {
            return Ok(0);
        }
        let elapsed = now.saturating_sub(self.stable_debt_last_update);
        let factor = compounded_interest(self.average_stable_rate, elapsed)?;
        ray_mul(self.principal_stable_debt, factor)
    }

    /// Total variable debt at the stored index. Call after `accrue`.
    pub fn total_variable_debt(&self) -> Result<u128, MathError> {
        ray_mul(self.scaled_variable_debt, self.variable_borrow_index)
    }

    /// `availableLiquidity + totalStableDebt + totalVariableDebt`.
    pub fn total_liquidity(&self, now: u64) -> Result<u128, MathError> {
        self.available_liquidity
            .checked_add(self.total_stable_debt(now)?)
            .and_then(|acc| acc.checked_add(self.total_variable_debt().ok()?))
            .ok_or(MathError::Overflow)
    }

    /// Borrowed fraction of total liquidity, RAY in `[0, RAY]`.
    pub fn utilization(&self, now: u64) -> Result<u128, MathError> {
        let stable = self.total_stable_debt(now)?;
        let variable = self.total_variable_debt()?;
        let total_debt = stable.checked_add(variable).ok_or(MathError::Overflow)?;
        if total_debt == 0 {
            return Ok(0);
        }
        let total_liquidity = self
            .available_liquidity
            .checked_add(total_debt)
            .ok_or(MathError::Overflow)?;
        ray_div(total_debt, total_liquidity)
    }

    /// Liquidity index projected to `now` without mutating (for balance
    /// reads between accruals).
    pub fn normalized_income(&self, now: u64) -> Result<u128, MathError> {
        if self.liquidity_rate == 0 {
            return Ok(self.liquidity_index);
        }
        let elapsed = now.saturating_sub(self.last_update);
        ray_mul(
            linear_interest(self.liquidity_rate, elapsed)?,
            self.liquidity_index,
        )
    }

    /// Variable borrow index projected to `now` without mutating.
    pub fn normalized_debt(&self, now: u64) -> Result<u128, MathError> {
        if self.variable_borrow_rate == 0 {
            return Ok(self.variable_borrow_index);
        }
        let elapsed = now.saturating_sub(self.last_update);
        ray_mul(
            compounded_interest(self.variable_borrow_rate, elapsed)?,
            self.variable_borrow_index,
        )
    }

    /// Recompute utilization and the three rates from the current totals.
    /// Always the last step of a mutation.
    pub fn update_rates(&mut self, now: u64) -> Result<(), MathError> {
        let total_stable = self.total_stable_debt(now)?;
        let total_variable = self.total_variable_debt()?;
        let utilization = self.utilization(now)?;

        let rates = compute_rates(
            &self.strategy,
            self.market_stable_rate,
            utilization,
            total_stable,
            total_variable,
            self.average_stable_rate,
            self.config.reserve_factor,
        )?;
        self.liquidity_rate = rates.liquidity_rate;
        self.stable_borrow_rate = rates.stable_borrow_rate;
        self.variable_borrow_rate = rates.variable_borrow_rate;

        debug!(
            asset = %self.asset,
            utilization,
            liquidity_rate = self.liquidity_rate,
            stable_borrow_rate = self.stable_borrow_rate,
            variable_borrow_rate = self.variable_borrow_rate,
            "reserve rerated"
        );
        Ok(())
    }

    pub fn add_liquidity(&mut self, amount: u128) -> Result<(), MathError> {
        self.available_liquidity = self
            .available_liquidity
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        Ok(())
    }

    /// Caller must have checked `amount <= available_liquidity`.
    pub fn remove_liquidity(&mut self, amount: u128) -> Result<(), MathError> {
        self.available_liquidity = self
            .available_liquidity
            .checked_sub(amount)
            .ok_or(MathError::Overflow)?;
        Ok(())
    }

    /// Rebase the stable aggregate for a draw of `amount` locked at
    /// `rate_at_draw`, blending the average rate by principal weight.
    pub fn mint_stable_debt(
        &mut self,
        amount: u128,
        rate_at_draw: u128,
        now: u64,
    ) -> Result<(), MathError> {
        let compounded = self.total_stable_debt(now)?;
        let new_principal = compounded.checked_add(amount).ok_or(MathError::Overflow)?;

        if new_principal == 0 {
            self.average_stable_rate = 0;
        } else {
            let weighted = U256::from(self.average_stable_rate) * U256::from(compounded)
                + U256::from(rate_at_draw) * U256::from(amount);
            // floor division, matching the original's blended-rate math
            self.average_stable_rate = u128::try_from(weighted / U256::from(new_principal))
                .map_err(|_| MathError::Overflow)?;
        }
        self.principal_stable_debt = new_principal;
        self.stable_debt_last_update = now;
        Ok(())
    }

    /// Rebase the stable aggregate for a repayment at the user's contract
    /// rate. Accumulation error can push the total debt or the blended rate
    /// negative; in either case the whole stable aggregate resets to zero.
    pub fn burn_stable_debt(
        &mut self,
        amount: u128,
        user_rate: u128,
        now: u64,
    ) -> Result<(), MathError> {
        let compounded = self.total_stable_debt(now)?;
        self.stable_debt_last_update = now;

        if amount >= compounded {
            self.principal_stable_debt = 0;
            self.average_stable_rate = 0;
            return Ok(());
        }

        let weighted_total = U256::from(self.average_stable_rate) * U256::from(compounded);
        let weighted_repaid = U256::from(user_rate) * U256::from(amount);
        if weighted_repaid > weighted_total {
            self.principal_stable_debt = 0;
            self.average_stable_rate = 0;
            return Ok(());
        }

        let new_principal = compounded - amount;
        self.average_stable_rate =
            u128::try_from((weighted_total - weighted_repaid) / U256::from(new_principal))
                .map_err(|_| MathError::Overflow)?;
        self.principal_stable_debt = new_principal;
        Ok(())
    }

    /// Record freshly minted scaled variable debt (already divided by the
    /// post-accrual index).
    pub fn add_scaled_variable_debt(&mut self, scaled: u128) -> Result<(), MathError> {
        self.scaled_variable_debt = self
            .scaled_variable_debt
            .checked_add(scaled)
            .ok_or(MathError::Overflow)?;
        Ok(())
    }

    /// Burn scaled variable debt, saturating dust from rounding.
    pub fn remove_scaled_variable_debt(&mut self, scaled: u128) {
        self.scaled_variable_debt = self.scaled_variable_debt.saturating_sub(scaled);
    }

    /// Credit `amount` to depositors by growing the liquidity index, used
    /// for flash-loan premiums.
    pub fn cumulate_to_liquidity_index(&mut self, amount: u128, now: u64) -> Result<(), MathError> {
        let total_liquidity = self.total_liquidity(now)?;
        if total_liquidity == 0 || amount == 0 {
            return Ok(());
        }
        let ratio = ray_div(amount, total_liquidity)?;
        self.liquidity_index = ray_mul(
            ratio.checked_add(RAY).ok_or(MathError::Overflow)?,
            self.liquidity_index,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lentra_math::SECONDS_PER_YEAR;

    const T0: u64 = 1_700_000_000;

    fn pct(p: u128) -> u128 {
        RAY / 100 * p
    }

    fn test_reserve() -> Reserve {
        Reserve::new(
            AssetId::new("DAI"),
            ReserveConfig::stablecoin(),
            RateStrategy::stablecoin(),
            pct(3),
            T0,
        )
    }

    #[test]
    fn test_new_reserve_starts_at_unity_indices() {
        let reserve = test_reserve();
        assert_eq!(reserve.liquidity_index, RAY);
        assert_eq!(reserve.variable_borrow_index, RAY);
        assert_eq!(reserve.total_liquidity(T0).unwrap(), 0);
        assert_eq!(reserve.utilization(T0).unwrap(), 0);
    }

    #[test]
    fn test_accrue_zero_elapsed_is_noop() {
        let mut reserve = test_reserve();
        reserve.available_liquidity = 1_000;
        reserve.update_rates(T0).unwrap();

        let before = reserve.clone();
        reserve.accrue(T0).unwrap();
        assert_eq!(reserve, before);
    }

    #[test]
    fn test_accrue_grows_indices_monotonically() {
        let mut reserve = test_reserve();
        reserve.available_liquidity = 500_000;
        reserve.scaled_variable_debt = 500_000;
        reserve.update_rates(T0).unwrap();
        assert!(reserve.liquidity_rate > 0);

        let mut last_liquidity = reserve.liquidity_index;
        let mut last_variable = reserve.variable_borrow_index;
        for step in 1..=4u64 {
            reserve.accrue(T0 + step * 90 * 86_400).unwrap();
            assert!(reserve.liquidity_index > last_liquidity);
            assert!(reserve.variable_borrow_index > last_variable);
            last_liquidity = reserve.liquidity_index;
            last_variable = reserve.variable_borrow_index;
        }
    }

    #[test]
    fn test_conservation_of_total_liquidity() {
        let mut reserve = test_reserve();
        reserve.add_liquidity(1_000_000).unwrap();
        reserve.update_rates(T0).unwrap();

        // borrow 400k variable: liquidity out, scaled debt in
        let scaled = ray_div(400_000, reserve.variable_borrow_index).unwrap();
        reserve.remove_liquidity(400_000).unwrap();
        reserve.add_scaled_variable_debt(scaled).unwrap();
        reserve.update_rates(T0).unwrap();

        let total = reserve.total_liquidity(T0).unwrap();
        let parts = reserve.available_liquidity
            + reserve.total_stable_debt(T0).unwrap()
            + reserve.total_variable_debt().unwrap();
        assert_eq!(total, parts);
        assert_eq!(total, 1_000_000);
    }

    #[test]
    fn test_utilization_bounded() {
        let mut reserve = test_reserve();
        reserve.add_liquidity(1_000).unwrap();
        let scaled = ray_div(1_000, reserve.variable_borrow_index).unwrap();
        reserve.remove_liquidity(1_000).unwrap();
        reserve.add_scaled_variable_debt(scaled).unwrap();

        // everything borrowed: utilization == 1
        assert_eq!(reserve.utilization(T0).unwrap(), RAY);
    }

    #[test]
    fn test_stable_mint_blends_average_rate() {
        let mut reserve = test_reserve();
        reserve.mint_stable_debt(1_000, pct(4), T0).unwrap();
        assert_eq!(reserve.average_stable_rate, pct(4));

        // equal principal at 8%: average moves to 6%
        reserve.mint_stable_debt(1_000, pct(8), T0).unwrap();
        assert_eq!(reserve.average_stable_rate, pct(6));
        assert_eq!(reserve.principal_stable_debt, 2_000);
    }

    #[test]
    fn test_stable_debt_compounds_at_average_rate() {
        let mut reserve = test_reserve();
        reserve.mint_stable_debt(100_000_000, pct(5), T0).unwrap();

        let after_year = reserve.total_stable_debt(T0 + SECONDS_PER_YEAR).unwrap();
        let factor = compounded_interest(pct(5), SECONDS_PER_YEAR).unwrap();
        assert_eq!(after_year, ray_mul(100_000_000, factor).unwrap());
    }

    #[test]
    fn test_stable_repay_clamps_negative_aggregate() {
        let mut reserve = test_reserve();
        reserve.mint_stable_debt(1_000, pct(4), T0).unwrap();

        // a repayment weighted above the aggregate zeroes everything
        reserve.burn_stable_debt(999, pct(90), T0).unwrap();
        assert_eq!(reserve.principal_stable_debt, 0);
        assert_eq!(reserve.average_stable_rate, 0);
    }

    #[test]
    fn test_stable_repay_over_total_clamps_to_zero() {
        let mut reserve = test_reserve();
        reserve.mint_stable_debt(1_000, pct(4), T0).unwrap();

        reserve.burn_stable_debt(5_000, pct(4), T0).unwrap();
        assert_eq!(reserve.principal_stable_debt, 0);
        assert_eq!(reserve.average_stable_rate, 0);
    }

    #[test]
    fn test_premium_cumulation_grows_index_by_ratio() {
        let mut reserve = test_reserve();
        reserve.add_liquidity(1_000_000).unwrap();

        reserve.cumulate_to_liquidity_index(1_000, T0).unwrap();
        // 0.1% of liquidity: index grows by the same fraction
        assert_eq!(reserve.liquidity_index, RAY + RAY / 1_000);
    }

    #[test]
    fn test_reserve_serde_roundtrip() {
        let reserve = test_reserve();
        let json = serde_json::to_string(&reserve).unwrap();
        let back: Reserve = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reserve);
    }
}
