//! Liquidation pricing
//!
//! Pure conversion math between the debt asset being repaid and the
//! collateral asset being seized, including the liquidator's bonus. The
//! pool orchestrates the actual liquidation call; this module only prices
//! it.

use alloy_primitives::U256;
use lentra_math::{percent_mul, MathError, PERCENTAGE_FACTOR};

/// Share of a user's debt in one asset a single liquidation may cover.
pub const DEFAULT_CLOSE_FACTOR_BPS: u16 = 5_000;

/// Priced seizure for a liquidation call.
///
/// When the user's collateral cannot cover the requested debt plus bonus,
/// `debt_to_cover` is scaled back so the seizure fits the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeizureOutcome {
    pub collateral_to_seize: u128,
    pub debt_to_cover: u128,
}

/// Largest debt repayment a liquidator may make against `total_debt`.
pub fn max_liquidatable_debt(total_debt: u128, close_factor_bps: u16) -> Result<u128, MathError> {
    percent_mul(total_debt, u128::from(close_factor_bps))
}

/// Collateral units bought by repaying `debt_to_cover` units of the debt
/// asset, bonus included.
///
/// `seize = debt_to_cover * debt_price * 10^coll_dec / (coll_price *
/// 10^debt_dec)`, then scaled by the liquidation bonus (bps above par).
pub fn collateral_to_seize(
    debt_to_cover: u128,
    debt_price: u128,
    debt_decimals: u8,
    collateral_price: u128,
    collateral_decimals: u8,
    liquidation_bonus_bps: u16,
) -> Result<u128, MathError> {
    if collateral_price == 0 {
        return Err(MathError::DivisionByZero);
    }
    let debt_unit = U256::from(10u128.pow(u32::from(debt_decimals)));
    let collateral_unit = U256::from(10u128.pow(u32::from(collateral_decimals)));

    let numerator = U256::from(debt_to_cover)
        * U256::from(debt_price)
        * collateral_unit
        * U256::from(liquidation_bonus_bps);
    let denominator =
        U256::from(collateral_price) * debt_unit * U256::from(PERCENTAGE_FACTOR);

    let seize = (numerator + denominator / U256::from(2u8)) / denominator;
    u128::try_from(seize).map_err(|_| MathError::Overflow)
}

/// Price a seizure capped by the user's actual collateral balance.
///
/// If the bonus-inflated seizure exceeds `collateral_balance`, the whole
/// balance is seized and the covered debt is recomputed backwards from it.
#[allow(clippy::too_many_arguments)]
pub fn available_collateral_to_liquidate(
    debt_to_cover: u128,
    debt_price: u128,
    debt_decimals: u8,
    collateral_price: u128,
    collateral_decimals: u8,
    liquidation_bonus_bps: u16,
    collateral_balance: u128,
) -> Result<SeizureOutcome, MathError> {
    let wanted = collateral_to_seize(
        debt_to_cover,
        debt_price,
        debt_decimals,
        collateral_price,
        collateral_decimals,
        liquidation_bonus_bps,
    )?;

    if wanted <= collateral_balance {
        return Ok(SeizureOutcome {
            collateral_to_seize: wanted,
            debt_to_cover,
        });
    }

    if debt_price == 0 {
        return Err(MathError::DivisionByZero);
    }
    let debt_unit = U256::from(10u128.pow(u32::from(debt_decimals)));
    let collateral_unit = U256::from(10u128.pow(u32::from(collateral_decimals)));

    // invert the seizure formula for the full balance
    let numerator = U256::from(collateral_balance)
        * U256::from(collateral_price)
        * debt_unit
        * U256::from(PERCENTAGE_FACTOR);
    let denominator =
        U256::from(debt_price) * collateral_unit * U256::from(liquidation_bonus_bps);
    let effective_debt = numerator / denominator;

    Ok(SeizureOutcome {
        collateral_to_seize: collateral_balance,
        debt_to_cover: u128::try_from(effective_debt).map_err(|_| MathError::Overflow)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lentra_math::WAD;

    const UNIT: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_close_factor_halves_debt() {
        assert_eq!(
            max_liquidatable_debt(1_000, DEFAULT_CLOSE_FACTOR_BPS).unwrap(),
            500
        );
        assert_eq!(max_liquidatable_debt(0, DEFAULT_CLOSE_FACTOR_BPS).unwrap(), 0);
    }

    #[test]
    fn test_seizure_same_decimals_with_bonus() {
        // repay 1000 DAI at price 1, seize WETH at price 2000, +5% bonus
        let seized = collateral_to_seize(1_000 * UNIT, WAD, 18, 2_000 * WAD, 18, 10_500).unwrap();
        // 1000 / 2000 * 1.05 = 0.525 WETH
        assert_eq!(seized, 525 * UNIT / 1_000);
    }

    #[test]
    fn test_seizure_rescales_decimals() {
        // repay 1000 USDC (6 decimals) at price 1, seize 18-decimal
        // collateral at price 1, no bonus
        let seized = collateral_to_seize(1_000_000_000, WAD, 6, WAD, 18, 10_000).unwrap();
        assert_eq!(seized, 1_000 * UNIT);
    }

    #[test]
    fn test_seizure_capped_by_balance_recomputes_debt() {
        // liquidator wants 0.525 WETH but user only holds 0.42
        let outcome = available_collateral_to_liquidate(
            1_000 * UNIT,
            WAD,
            18,
            2_000 * WAD,
            18,
            10_500,
            420 * UNIT / 1_000,
        )
        .unwrap();

        assert_eq!(outcome.collateral_to_seize, 420 * UNIT / 1_000);
        // 0.42 * 2000 / 1.05 = 800 DAI actually covered
        assert_eq!(outcome.debt_to_cover, 800 * UNIT);
    }

    #[test]
    fn test_seizure_within_balance_untouched() {
        let outcome = available_collateral_to_liquidate(
            1_000 * UNIT,
            WAD,
            18,
            2_000 * WAD,
            18,
            10_500,
            10 * UNIT,
        )
        .unwrap();
        assert_eq!(outcome.debt_to_cover, 1_000 * UNIT);
        assert_eq!(outcome.collateral_to_seize, 525 * UNIT / 1_000);
    }

    #[test]
    fn test_zero_collateral_price_rejected() {
        let result = collateral_to_seize(1_000, WAD, 18, 0, 18, 10_500);
        assert!(matches!(result, Err(MathError::DivisionByZero)));
    }
}
