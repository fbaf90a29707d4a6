//! Utilization-driven interest-rate model
//!
//! A pure function from utilization and reserve parameters to the three
//! reserve rates. The variable and stable curves share the kink shape; the
//! stable curve is seeded from the market stable rate instead of the base
//! rate. The liquidity rate is the debt-weighted overall borrow rate times
//! utilization, net of the reserve factor.

use lentra_math::{
    percent_mul, ray_div, ray_mul, wad_to_ray, MathError, PERCENTAGE_FACTOR,
};

use crate::config::RateStrategy;

/// Output of a rate recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputedRates {
    pub liquidity_rate: u128,
    pub stable_borrow_rate: u128,
    pub variable_borrow_rate: u128,
}

/// Recompute the three reserve rates. Called after every principal change,
/// never before.
#[allow(clippy::too_many_arguments)]
pub fn compute_rates(
    strategy: &RateStrategy,
    market_stable_rate: u128,
    utilization: u128,
    total_stable_debt: u128,
    total_variable_debt: u128,
    average_stable_rate: u128,
    reserve_factor: u16,
) -> Result<ComputedRates, MathError> {
    let mut stable_rate = market_stable_rate;
    let mut variable_rate = strategy.base_variable_borrow_rate;

    if utilization > strategy.optimal_utilization {
        let excess_ratio = ray_div(
            utilization - strategy.optimal_utilization,
            strategy.excess_utilization(),
        )?;
        stable_rate = stable_rate
            .checked_add(strategy.stable_rate_slope1)
            .and_then(|r| r.checked_add(ray_mul(excess_ratio, strategy.stable_rate_slope2).ok()?))
            .ok_or(MathError::Overflow)?;
        variable_rate = variable_rate
            .checked_add(strategy.variable_rate_slope1)
            .and_then(|r| {
                r.checked_add(ray_mul(excess_ratio, strategy.variable_rate_slope2).ok()?)
            })
            .ok_or(MathError::Overflow)?;
    } else {
        let kink_ratio = ray_div(utilization, strategy.optimal_utilization.max(1))?;
        stable_rate = stable_rate
            .checked_add(ray_mul(strategy.stable_rate_slope1, kink_ratio)?)
            .ok_or(MathError::Overflow)?;
        variable_rate = variable_rate
            .checked_add(ray_mul(strategy.variable_rate_slope1, kink_ratio)?)
            .ok_or(MathError::Overflow)?;
    }

    let overall = overall_borrow_rate(
        total_stable_debt,
        total_variable_debt,
        variable_rate,
        average_stable_rate,
    )?;
    let liquidity_rate = percent_mul(
        ray_mul(overall, utilization)?,
        PERCENTAGE_FACTOR - u128::from(reserve_factor),
    )?;

    Ok(ComputedRates {
        liquidity_rate,
        stable_borrow_rate: stable_rate,
        variable_borrow_rate: variable_rate,
    })
}

/// Debt-weighted average of the variable rate and the average stable rate.
pub fn overall_borrow_rate(
    total_stable_debt: u128,
    total_variable_debt: u128,
    variable_rate: u128,
    average_stable_rate: u128,
) -> Result<u128, MathError> {
    let total_debt = total_stable_debt
        .checked_add(total_variable_debt)
        .ok_or(MathError::Overflow)?;
    if total_debt == 0 {
        return Ok(0);
    }

    let weighted_variable = ray_mul(wad_to_ray(total_variable_debt)?, variable_rate)?;
    let weighted_stable = ray_mul(wad_to_ray(total_stable_debt)?, average_stable_rate)?;

    ray_div(
        weighted_variable
            .checked_add(weighted_stable)
            .ok_or(MathError::Overflow)?,
        wad_to_ray(total_debt)?,
    )
}
