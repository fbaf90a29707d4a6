//! Linear and compounded interest factors
//!
//! Both factors are RAY-scaled multipliers applied to an index or a
//! principal. Deposits use linear interest (the index already encodes rate
//! history); debt compounds per second using a 2nd-order Taylor expansion of
//! `(1 + r/YEAR)^t`, which is cheap, monotonic and bounded-error for
//! realistic `r * t`.

use alloy_primitives::U256;

use crate::scaled::{ray_mul, RAY};
use crate::MathError;

/// 365 days, matching the original market's year convention.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// `RAY + rate * elapsed / YEAR`.
pub fn linear_interest(rate: u128, elapsed: u64) -> Result<u128, MathError> {
    let accrued = rate
        .checked_mul(u128::from(elapsed))
        .ok_or(MathError::Overflow)?
        / u128::from(SECONDS_PER_YEAR);
    RAY.checked_add(accrued).ok_or(MathError::Overflow)
}

/// Taylor approximation of `(1 + rate/YEAR)^elapsed`:
///
/// `RAY + r*t + r²*t*(t-1)/2 + r³*t*(t-1)*(t-2)/6` with `r = rate / YEAR`.
pub fn compounded_interest(rate: u128, elapsed: u64) -> Result<u128, MathError> {
    if elapsed == 0 {
        return Ok(RAY);
    }

    let exp = u128::from(elapsed);
    let exp_minus_one = exp - 1;
    let exp_minus_two = exp.saturating_sub(2);

    let rate_per_second = rate / u128::from(SECONDS_PER_YEAR);
    let base_power_two = ray_mul(rate_per_second, rate_per_second)?;
    let base_power_three = ray_mul(base_power_two, rate_per_second)?;

    let first_term = rate_per_second
        .checked_mul(exp)
        .ok_or(MathError::Overflow)?;
    let second_term = u256_to_u128(
        U256::from(exp) * U256::from(exp_minus_one) * U256::from(base_power_two)
            / U256::from(2u8),
    )?;
    let third_term = u256_to_u128(
        U256::from(exp)
            * U256::from(exp_minus_one)
            * U256::from(exp_minus_two)
            * U256::from(base_power_three)
            / U256::from(6u8),
    )?;

    RAY.checked_add(first_term)
        .and_then(|acc| acc.checked_add(second_term))
        .and_then(|acc| acc.checked_add(third_term))
        .ok_or(MathError::Overflow)
}

fn u256_to_u128(value: U256) -> Result<u128, MathError> {
    u128::try_from(value).map_err(|_| MathError::Overflow)
}
