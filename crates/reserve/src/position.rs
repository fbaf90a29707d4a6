//! Per-(user, asset) balance and debt bookkeeping

use alloy_primitives::U256;
use lentra_math::{compounded_interest, ray_div, ray_mul, MathError};
use serde::{Deserialize, Serialize};

/// One user's footprint in one reserve.
///
/// The deposit balance is scaled by the liquidity index at mint time, so the
/// underlying balance grows for free as the index grows. Stable debt keeps
/// its own principal, contract rate and timestamp; variable debt is scaled
/// by the variable borrow index like deposits are by the liquidity index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPosition {
    pub scaled_deposit: u128,
    pub use_as_collateral: bool,

    pub principal_stable_debt: u128,
    /// Contract rate locked at draw time, re-blended on each new draw.
    pub stable_rate: u128,
    pub stable_rate_last_updated: u64,

    pub scaled_variable_debt: u128,
}

impl UserPosition {
    /// Underlying deposit balance at the given liquidity index.
    pub fn deposit_balance(&self, liquidity_index: u128) -> Result<u128, MathError> {
        ray_mul(self.scaled_deposit, liquidity_index)
    }

    /// Underlying variable debt at the given variable borrow index.
    pub fn variable_debt(&self, variable_borrow_index: u128) -> Result<u128, MathError> {
        ray_mul(self.scaled_variable_debt, variable_borrow_index)
    }

    /// Stable debt compounded at the user's contract rate since the last
    /// draw or repayment.
    pub fn stable_debt(&self, now: u64) -> Result<u128, MathError> {
        if self.principal_stable_debt == 0 || self.stable_rate == 0 {
            return Ok(self.principal_stable_debt);
        }
        if self.stable_rate_last_updated == 0 || self.stable_rate_last_updated == now {
            return Ok(self.principal_stable_debt);
        }
        let elapsed = now.saturating_sub(self.stable_rate_last_updated);
        let factor = compounded_interest(self.stable_rate, elapsed)?;
        ray_mul(self.principal_stable_debt, factor)
    }

    pub fn total_debt(
        &self,
        variable_borrow_index: u128,
        now: u64,
    ) -> Result<u128, MathError> {
        self.variable_debt(variable_borrow_index)?
            .checked_add(self.stable_debt(now)?)
            .ok_or(MathError::Overflow)
    }

    pub fn has_debt(&self) -> bool {
        self.principal_stable_debt > 0 || self.scaled_variable_debt > 0
    }

    pub fn is_empty(&self) -> bool {
        self.scaled_deposit == 0 && !self.has_debt()
    }

    /// Credit a deposit, returning the scaled amount minted. The first
    /// deposit enables collateral usage by default.
    pub fn deposit(&mut self, amount: u128, liquidity_index: u128) -> Result<u128, MathError> {
        let scaled = ray_div(amount, liquidity_index)?;
        if self.scaled_deposit == 0 {
            self.use_as_collateral = true;
        }
        self.scaled_deposit = self
            .scaled_deposit
            .checked_add(scaled)
            .ok_or(MathError::Overflow)?;
        Ok(scaled)
    }

    /// Debit a withdrawal, returning the scaled amount burned. Saturates
    /// rounding dust and clears the collateral flag when the balance hits
    /// zero. Caller validates `amount` against the underlying balance.
    pub fn withdraw(&mut self, amount: u128, liquidity_index: u128) -> Result<u128, MathError> {
        let scaled = ray_div(amount, liquidity_index)?;
        let burned = scaled.min(self.scaled_deposit);
        self.scaled_deposit -= burned;
        if self.scaled_deposit == 0 {
            self.use_as_collateral = false;
        }
        Ok(burned)
    }

    /// Open or extend stable debt at `rate`, blending with any existing
    /// contract rate by compounded-principal weight.
    pub fn borrow_stable(&mut self, amount: u128, rate: u128, now: u64) -> Result<(), MathError> {
        let compounded = self.stable_debt(now)?;
        let new_principal = compounded.checked_add(amount).ok_or(MathError::Overflow)?;
        if new_principal == 0 {
            return Ok(());
        }

        let weighted = U256::from(self.stable_rate) * U256::from(compounded)
            + U256::from(rate) * U256::from(amount);
        self.stable_rate = u128::try_from(weighted / U256::from(new_principal))
            .map_err(|_| MathError::Overflow)?;
        self.principal_stable_debt = new_principal;
        self.stable_rate_last_updated = now;
        Ok(())
    }

    /// Repay stable debt, returning the amount actually retired. A full
    /// repayment resets the contract rate and timestamp.
    pub fn repay_stable(&mut self, amount: u128, now: u64) -> Result<u128, MathError> {
        let compounded = self.stable_debt(now)?;
        let repaid = amount.min(compounded);
        self.principal_stable_debt = compounded - repaid;
        if self.principal_stable_debt == 0 {
            self.stable_rate = 0;
            self.stable_rate_last_updated = 0;
        } else {
            self.stable_rate_last_updated = now;
        }
        Ok(repaid)
    }

    /// Open or extend variable debt, returning the scaled amount minted.
    pub fn borrow_variable(
        &mut self,
        amount: u128,
        variable_borrow_index: u128,
    ) -> Result<u128, MathError> {
        let scaled = ray_div(amount, variable_borrow_index)?;
        self.scaled_variable_debt = self
            .scaled_variable_debt
            .checked_add(scaled)
            .ok_or(MathError::Overflow)?;
        Ok(scaled)
    }

    /// Repay variable debt, returning the scaled amount burned. Saturates
    /// rounding dust.
    pub fn repay_variable(
        &mut self,
        amount: u128,
        variable_borrow_index: u128,
    ) -> Result<u128, MathError> {
        let scaled = ray_div(amount, variable_borrow_index)?;
        let burned = scaled.min(self.scaled_variable_debt);
        self.scaled_variable_debt -= burned;
        Ok(burned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lentra_math::{RAY, SECONDS_PER_YEAR, WAD};

    const T0: u64 = 1_700_000_000;

    fn pct(p: u128) -> u128 {
        RAY / 100 * p
    }

    #[test]
    fn test_first_deposit_enables_collateral() {
        let mut position = UserPosition::default();
        assert!(!position.use_as_collateral);

        let scaled = position.deposit(1_000, RAY).unwrap();
        assert_eq!(scaled, 1_000);
        assert!(position.use_as_collateral);
    }

    #[test]
    fn test_deposit_balance_grows_with_index() {
        let mut position = UserPosition::default();
        position.deposit(1_000_000, RAY).unwrap();

        // index grew 5%: balance follows without any mutation
        let index = RAY + pct(5);
        assert_eq!(position.deposit_balance(index).unwrap(), 1_050_000);
    }

    #[test]
    fn test_full_withdraw_clears_collateral_flag() {
        let mut position = UserPosition::default();
        position.deposit(1_000, RAY).unwrap();

        let burned = position.withdraw(1_000, RAY).unwrap();
        assert_eq!(burned, 1_000);
        assert_eq!(position.scaled_deposit, 0);
        assert!(!position.use_as_collateral);
        assert!(position.is_empty());
    }

    #[test]
    fn test_withdraw_saturates_rounding_dust() {
        let mut position = UserPosition::default();
        position.deposit(1_000, RAY).unwrap();

        // asking for slightly more scaled than held burns only what exists
        let burned = position.withdraw(1_001, RAY).unwrap();
        assert_eq!(burned, 1_000);
        assert_eq!(position.scaled_deposit, 0);
    }

    #[test]
    fn test_stable_borrow_locks_rate_and_blends() {
        let mut position = UserPosition::default();
        position.borrow_stable(1_000, pct(4), T0).unwrap();
        assert_eq!(position.stable_rate, pct(4));
        assert_eq!(position.stable_rate_last_updated, T0);

        position.borrow_stable(1_000, pct(8), T0).unwrap();
        assert_eq!(position.stable_rate, pct(6));
        assert_eq!(position.principal_stable_debt, 2_000);
    }

    #[test]
    fn test_stable_debt_compounds_at_contract_rate() {
        let mut position = UserPosition::default();
        position.borrow_stable(100_000_000, pct(10), T0).unwrap();

        let later = T0 + SECONDS_PER_YEAR;
        let factor = compounded_interest(pct(10), SECONDS_PER_YEAR).unwrap();
        assert_eq!(
            position.stable_debt(later).unwrap(),
            ray_mul(100_000_000, factor).unwrap()
        );
    }

    #[test]
    fn test_full_stable_repay_resets_rate() {
        let mut position = UserPosition::default();
        position.borrow_stable(1_000, pct(4), T0).unwrap();

        let repaid = position.repay_stable(u128::MAX, T0).unwrap();
        assert_eq!(repaid, 1_000);
        assert_eq!(position.principal_stable_debt, 0);
        assert_eq!(position.stable_rate, 0);
        assert_eq!(position.stable_rate_last_updated, 0);
    }

    #[test]
    fn test_partial_stable_repay_keeps_rate() {
        let mut position = UserPosition::default();
        position.borrow_stable(1_000 * WAD, pct(4), T0).unwrap();

        // a day of 4% interest capitalizes into the remaining principal
        let later = T0 + 86_400;
        position.repay_stable(400 * WAD, later).unwrap();
        assert_eq!(position.stable_rate, pct(4));
        assert_eq!(position.stable_rate_last_updated, later);
        assert!(position.principal_stable_debt > 600 * WAD);
    }

    #[test]
    fn test_variable_debt_tracks_index() {
        let mut position = UserPosition::default();
        let minted = position.borrow_variable(1_000_000, RAY).unwrap();
        assert_eq!(minted, 1_000_000);

        let index = RAY + pct(10);
        assert_eq!(position.variable_debt(index).unwrap(), 1_100_000);

        let burned = position.repay_variable(550_000, index).unwrap();
        assert_eq!(position.variable_debt(index).unwrap(), 550_000);
        assert!(burned < 550_000);
    }

    #[test]
    fn test_total_debt_sums_both_modes() {
        let mut position = UserPosition::default();
        position.borrow_stable(300, pct(4), T0).unwrap();
        position.borrow_variable(700, RAY).unwrap();

        assert_eq!(position.total_debt(RAY, T0).unwrap(), 1_000);
        assert!(position.has_debt());
        assert!(!position.is_empty());
    }
}
