//! Account health evaluation
//!
//! Folds a user's positions over every reserve into base-currency totals.
//! Oracle prices are quoted in base-currency WAD per whole token, so a
//! balance in raw units converts as `balance * price / 10^decimals`.

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy_primitives::U256;
use lentra_core::AssetId;
use lentra_math::{percent_mul, wad_div, MathError, WAD};
use lentra_oracle::PriceOracle;
use lentra_reserve::{Reserve, UserPosition};
use tracing::debug;

use crate::error::RiskError;

/// Health factor at which a position becomes liquidatable, WAD.
pub const HEALTH_FACTOR_LIQUIDATION_THRESHOLD: u128 = WAD;

/// Base-currency view of one user's account across all reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSummary {
    /// Collateral value counting only flagged, collateral-enabled reserves.
    pub total_collateral_value: u128,
    pub total_debt_value: u128,
    /// Collateral-weighted average LTV, in bps.
    pub average_ltv: u128,
    /// Collateral-weighted average liquidation threshold, in bps.
    pub current_liquidation_threshold: u128,
    /// Borrowing headroom left under the average LTV.
    pub available_borrows_value: u128,
    /// WAD; `u128::MAX` when the account has no debt.
    pub health_factor: u128,
}

impl AccountSummary {
    pub fn is_liquidatable(&self) -> bool {
        self.health_factor < HEALTH_FACTOR_LIQUIDATION_THRESHOLD
    }
}

/// Pre-commit gatekeeper for account health.
///
/// Stateless over the pool: every evaluation reads the reserves and the
/// user's positions fresh, projecting balances to `now` without mutating.
pub struct RiskEngine {
    oracle: Arc<dyn PriceOracle>,
}

impl RiskEngine {
    pub fn new(oracle: Arc<dyn PriceOracle>) -> Self {
        Self { oracle }
    }

    /// Compute the full account summary for one user.
    pub fn account_summary(
        &self,
        reserves: &BTreeMap<AssetId, Reserve>,
        positions: &BTreeMap<AssetId, UserPosition>,
        now: u64,
    ) -> Result<AccountSummary, RiskError> {
        let mut total_collateral: u128 = 0;
        let mut total_debt: u128 = 0;
        // bps-weighted collateral sums, divided out at the end
        let mut weighted_ltv = U256::ZERO;
        let mut weighted_threshold = U256::ZERO;

        for (asset, position) in positions {
            if position.is_empty() {
                continue;
            }
            let Some(reserve) = reserves.get(asset) else {
                continue;
            };
            let price = self.oracle.asset_price(asset)?;
            let unit = 10u128.pow(u32::from(reserve.config.decimals));

            if position.scaled_deposit > 0
                && position.use_as_collateral
                && reserve.config.usage_as_collateral_enabled
            {
                let balance = position.deposit_balance(reserve.normalized_income(now)?)?;
                let value = base_value(balance, price, unit)?;
                total_collateral = total_collateral
                    .checked_add(value)
                    .ok_or(MathError::Overflow)?;
                weighted_ltv += U256::from(value) * U256::from(reserve.config.ltv);
                weighted_threshold +=
                    U256::from(value) * U256::from(reserve.config.liquidation_threshold);
            }

            if position.has_debt() {
                let debt = position.total_debt(reserve.normalized_debt(now)?, now)?;
                let value = base_value(debt, price, unit)?;
                total_debt = total_debt.checked_add(value).ok_or(MathError::Overflow)?;
            }
        }

        let (average_ltv, current_liquidation_threshold) = if total_collateral == 0 {
            (0, 0)
        } else {
            (
                u128::try_from(weighted_ltv / U256::from(total_collateral))
                    .map_err(|_| MathError::Overflow)?,
                u128::try_from(weighted_threshold / U256::from(total_collateral))
                    .map_err(|_| MathError::Overflow)?,
            )
        };

        let health_factor = if total_debt == 0 {
            u128::MAX
        } else {
            wad_div(
                percent_mul(total_collateral, current_liquidation_threshold)?,
                total_debt,
            )?
        };

        let borrow_capacity = percent_mul(total_collateral, average_ltv)?;
        let available_borrows_value = borrow_capacity.saturating_sub(total_debt);

        debug!(
            total_collateral,
            total_debt, average_ltv, health_factor, "account evaluated"
        );

        Ok(AccountSummary {
            total_collateral_value: total_collateral,
            total_debt_value: total_debt,
            average_ltv,
            current_liquidation_threshold,
            available_borrows_value,
            health_factor,
        })
    }

    /// Base-currency value of `amount` raw units of `asset`.
    pub fn asset_value(
        &self,
        asset: &AssetId,
        amount: u128,
        decimals: u8,
    ) -> Result<u128, RiskError> {
        let price = self.oracle.asset_price(asset)?;
        Ok(base_value(amount, price, 10u128.pow(u32::from(decimals)))?)
    }
}

fn base_value(amount: u128, price: u128, unit: u128) -> Result<u128, MathError> {
    let value = U256::from(amount) * U256::from(price) / U256::from(unit);
    u128::try_from(value).map_err(|_| MathError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lentra_math::RAY;
    use lentra_oracle::MockOracle;
    use lentra_reserve::{RateStrategy, ReserveConfig};

    const T0: u64 = 1_700_000_000;
    const UNIT: u128 = 1_000_000_000_000_000_000;

    fn setup() -> (RiskEngine, BTreeMap<AssetId, Reserve>) {
        let oracle = MockOracle::new();
        oracle.set_price(AssetId::new("DAI"), WAD);
        oracle.set_price(AssetId::new("WETH"), 2_000 * WAD);

        let mut reserves = BTreeMap::new();
        reserves.insert(
            AssetId::new("DAI"),
            Reserve::new(
                AssetId::new("DAI"),
                ReserveConfig::stablecoin(),
                RateStrategy::stablecoin(),
                RAY / 100 * 3,
                T0,
            ),
        );
        reserves.insert(
            AssetId::new("WETH"),
            Reserve::new(
                AssetId::new("WETH"),
                ReserveConfig::volatile(),
                RateStrategy::volatile(),
                RAY / 100 * 5,
                T0,
            ),
        );
        (RiskEngine::new(Arc::new(oracle)), reserves)
    }

    #[test]
    fn test_empty_account_has_max_health() {
        let (engine, reserves) = setup();
        let positions = BTreeMap::new();

        let summary = engine.account_summary(&reserves, &positions, T0).unwrap();
        assert_eq!(summary.total_collateral_value, 0);
        assert_eq!(summary.total_debt_value, 0);
        assert_eq!(summary.health_factor, u128::MAX);
        assert!(!summary.is_liquidatable());
    }

    #[test]
    fn test_collateral_only_account() {
        let (engine, reserves) = setup();
        let mut positions = BTreeMap::new();
        let mut position = UserPosition::default();
        // 2 WETH at 2000 = 4000 base
        position.deposit(2 * UNIT, RAY).unwrap();
        positions.insert(AssetId::new("WETH"), position);

        let summary = engine.account_summary(&reserves, &positions, T0).unwrap();
        assert_eq!(summary.total_collateral_value, 4_000 * WAD);
        assert_eq!(summary.average_ltv, 7_000);
        assert_eq!(summary.current_liquidation_threshold, 7_500);
        // headroom = 4000 * 70%
        assert_eq!(summary.available_borrows_value, 2_800 * WAD);
        assert_eq!(summary.health_factor, u128::MAX);
    }

    #[test]
    fn test_health_factor_weighs_threshold() {
        let (engine, reserves) = setup();
        let mut positions = BTreeMap::new();

        let mut weth = UserPosition::default();
        weth.deposit(UNIT, RAY).unwrap(); // 2000 collateral
        positions.insert(AssetId::new("WETH"), weth);

        let mut dai = UserPosition::default();
        dai.borrow_variable(1_000 * UNIT, RAY).unwrap(); // 1000 debt
        positions.insert(AssetId::new("DAI"), dai);

        let summary = engine.account_summary(&reserves, &positions, T0).unwrap();
        assert_eq!(summary.total_collateral_value, 2_000 * WAD);
        assert_eq!(summary.total_debt_value, 1_000 * WAD);
        // HF = 2000 * 0.75 / 1000 = 1.5
        assert_eq!(summary.health_factor, WAD * 3 / 2);
        assert!(!summary.is_liquidatable());
    }

    #[test]
    fn test_underwater_account_is_liquidatable() {
        let (engine, reserves) = setup();
        let mut positions = BTreeMap::new();

        let mut weth = UserPosition::default();
        weth.deposit(UNIT, RAY).unwrap();
        positions.insert(AssetId::new("WETH"), weth);

        let mut dai = UserPosition::default();
        dai.borrow_variable(1_600 * UNIT, RAY).unwrap();
        positions.insert(AssetId::new("DAI"), dai);

        let summary = engine.account_summary(&reserves, &positions, T0).unwrap();
        // HF = 2000 * 0.75 / 1600 < 1
        assert!(summary.health_factor < WAD);
        assert!(summary.is_liquidatable());
        assert_eq!(summary.available_borrows_value, 0);
    }

    #[test]
    fn test_unflagged_collateral_not_counted() {
        let (engine, reserves) = setup();
        let mut positions = BTreeMap::new();

        let mut weth = UserPosition::default();
        weth.deposit(UNIT, RAY).unwrap();
        weth.use_as_collateral = false;
        positions.insert(AssetId::new("WETH"), weth);

        let summary = engine.account_summary(&reserves, &positions, T0).unwrap();
        assert_eq!(summary.total_collateral_value, 0);
        assert_eq!(summary.average_ltv, 0);
    }

    #[test]
    fn test_missing_price_propagates() {
        let (engine, mut reserves) = setup();
        reserves.insert(
            AssetId::new("XYZ"),
            Reserve::new(
                AssetId::new("XYZ"),
                ReserveConfig::volatile(),
                RateStrategy::volatile(),
                0,
                T0,
            ),
        );
        let mut positions = BTreeMap::new();
        let mut position = UserPosition::default();
        position.deposit(UNIT, RAY).unwrap();
        positions.insert(AssetId::new("XYZ"), position);

        let result = engine.account_summary(&reserves, &positions, T0);
        assert!(matches!(result, Err(RiskError::Oracle(_))));
    }

    #[test]
    fn test_asset_value_rescales_decimals() {
        let (engine, _) = setup();
        // 6-decimal asset priced at 1 base unit per token
        let value = engine
            .asset_value(&AssetId::new("DAI"), 5 * UNIT, 18)
            .unwrap();
        assert_eq!(value, 5 * WAD);
    }
}
