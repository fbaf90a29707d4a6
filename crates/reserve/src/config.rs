//! Reserve configuration and interest-rate strategy parameters

use lentra_math::RAY;
use serde::{Deserialize, Serialize};

/// Per-reserve risk parameters and gates.
///
/// Percentages are in the 2-digit base (10000 = 100.00%). The liquidation
/// bonus is expressed above 100%: 10500 means the liquidator receives +5%.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveConfig {
    /// Decimal precision of the underlying asset.
    pub decimals: u8,
    /// Maximum loan-to-value, in bps.
    pub ltv: u16,
    /// Collateral value discount applied for liquidation eligibility, in bps.
    pub liquidation_threshold: u16,
    /// Liquidator reward above par, in bps (e.g. 10500 = +5%).
    pub liquidation_bonus: u16,
    /// Share of borrow interest withheld from depositors, in bps.
    pub reserve_factor: u16,
    pub active: bool,
    pub frozen: bool,
    pub borrowing_enabled: bool,
    pub stable_borrowing_enabled: bool,
    pub usage_as_collateral_enabled: bool,
    /// Allows opening debt on behalf of another user.
    pub credit_delegation_enabled: bool,
}

impl ReserveConfig {
    /// Typical stablecoin listing: 75% LTV, 80% threshold, +5% bonus.
    pub fn stablecoin() -> Self {
        Self {
            decimals: 18,
            ltv: 7_500,
            liquidation_threshold: 8_000,
            liquidation_bonus: 10_500,
            reserve_factor: 1_000,
            active: true,
            frozen: false,
            borrowing_enabled: true,
            stable_borrowing_enabled: true,
            usage_as_collateral_enabled: true,
            credit_delegation_enabled: false,
        }
    }

    /// Typical volatile-asset listing: 70% LTV, 75% threshold, +10% bonus.
    pub fn volatile() -> Self {
        Self {
            decimals: 18,
            ltv: 7_000,
            liquidation_threshold: 7_500,
            liquidation_bonus: 11_000,
            reserve_factor: 2_000,
            active: true,
            frozen: false,
            borrowing_enabled: true,
            stable_borrowing_enabled: false,
            usage_as_collateral_enabled: true,
            credit_delegation_enabled: false,
        }
    }
}

/// Kinked rate-curve parameters, all RAY-scaled.
///
/// Below the optimal utilization both borrow rates climb along slope 1;
/// above it the excess utilization is priced on slope 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateStrategy {
    pub optimal_utilization: u128,
    pub base_variable_borrow_rate: u128,
    pub variable_rate_slope1: u128,
    pub variable_rate_slope2: u128,
    pub stable_rate_slope1: u128,
    pub stable_rate_slope2: u128,
}

impl RateStrategy {
    /// Utilization headroom above the kink.
    pub fn excess_utilization(&self) -> u128 {
        RAY.saturating_sub(self.optimal_utilization)
    }

    /// Stablecoin curve: kink at 90%, 4% slope 1, 60% slope 2.
    pub fn stablecoin() -> Self {
        Self {
            optimal_utilization: ray_pct(90),
            base_variable_borrow_rate: 0,
            variable_rate_slope1: ray_pct(4),
            variable_rate_slope2: ray_pct(60),
            stable_rate_slope1: ray_pct(2),
            stable_rate_slope2: ray_pct(60),
        }
    }

    /// Volatile-asset curve: kink at 65%, 8% slope 1, 100% slope 2.
    pub fn volatile() -> Self {
        Self {
            optimal_utilization: ray_pct(65),
            base_variable_borrow_rate: 0,
            variable_rate_slope1: ray_pct(8),
            variable_rate_slope2: ray_pct(100),
            stable_rate_slope1: ray_pct(10),
            stable_rate_slope2: ray_pct(100),
        }
    }
}

/// Whole percent as a RAY fraction.
const fn ray_pct(pct: u128) -> u128 {
    RAY / 100 * pct
}
