//! Half-up multiply/divide at WAD, RAY and percentage scales

use alloy_primitives::U256;

use crate::MathError;

/// 18-digit unit scale.
pub const WAD: u128 = 10u128.pow(18);
pub const HALF_WAD: u128 = WAD / 2;

/// 27-digit high-precision scale.
pub const RAY: u128 = 10u128.pow(27);
pub const HALF_RAY: u128 = RAY / 2;

/// 2-digit percentage base: 10000 = 100.00%.
pub const PERCENTAGE_FACTOR: u128 = 10_000;
pub const HALF_PERCENT: u128 = PERCENTAGE_FACTOR / 2;

/// Ratio between the RAY and WAD scales.
pub const WAD_RAY_RATIO: u128 = 10u128.pow(9);

/// `round_half_up(a * b / denominator)` with a 256-bit intermediate.
pub fn mul_div_half_up(a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    let result = (U256::from(a) * U256::from(b) + U256::from(denominator / 2))
        / U256::from(denominator);
    u128::try_from(result).map_err(|_| MathError::Overflow)
}

/// `round_half_up(a * b / WAD)`.
pub fn wad_mul(a: u128, b: u128) -> Result<u128, MathError> {
    mul_div_half_up(a, b, WAD)
}

/// `round_half_up(a * WAD / b)`.
pub fn wad_div(a: u128, b: u128) -> Result<u128, MathError> {
    mul_div_half_up(a, WAD, b)
}

/// `round_half_up(a * b / RAY)`.
pub fn ray_mul(a: u128, b: u128) -> Result<u128, MathError> {
    mul_div_half_up(a, b, RAY)
}

/// `round_half_up(a * RAY / b)`.
pub fn ray_div(a: u128, b: u128) -> Result<u128, MathError> {
    mul_div_half_up(a, RAY, b)
}

/// `round_half_up(a * bps / 10000)`, `bps` in the percentage base.
pub fn percent_mul(a: u128, bps: u128) -> Result<u128, MathError> {
    mul_div_half_up(a, bps, PERCENTAGE_FACTOR)
}

/// `round_half_up(a * 10000 / bps)`.
pub fn percent_div(a: u128, bps: u128) -> Result<u128, MathError> {
    mul_div_half_up(a, PERCENTAGE_FACTOR, bps)
}

/// Widen a WAD value to RAY. Exact; errors only on overflow.
pub fn wad_to_ray(a: u128) -> Result<u128, MathError> {
    a.checked_mul(WAD_RAY_RATIO).ok_or(MathError::Overflow)
}

/// Narrow a RAY value to WAD with half-up rounding.
pub fn ray_to_wad(a: u128) -> Result<u128, MathError> {
    a.checked_add(WAD_RAY_RATIO / 2)
        .ok_or(MathError::Overflow)
        .map(|x| x / WAD_RAY_RATIO)
}

/// Rescale between arbitrary decimal precisions, half-up when narrowing.
pub fn rescale(x: u128, from_decimals: u8, to_decimals: u8) -> Result<u128, MathError> {
    if from_decimals == to_decimals {
        return Ok(x);
    }
    if to_decimals > from_decimals {
        let factor = 10u128
            .checked_pow(u32::from(to_decimals - from_decimals))
            .ok_or(MathError::Overflow)?;
        x.checked_mul(factor).ok_or(MathError::Overflow)
    } else {
        let factor = 10u128
            .checked_pow(u32::from(from_decimals - to_decimals))
            .ok_or(MathError::Overflow)?;
        mul_div_half_up(x, 1, factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wad_mul_identity() {
        assert_eq!(wad_mul(WAD, 12345).unwrap(), 12345);
        assert_eq!(wad_mul(0, WAD).unwrap(), 0);
    }

    #[test]
    fn test_wad_mul_rounds_half_up() {
        // 3 * 0.5 = 1.5 -> 2
        assert_eq!(wad_mul(3, HALF_WAD).unwrap(), 2);
        // 1 * 0.4999... floors to 0
        assert_eq!(wad_mul(1, HALF_WAD - 1).unwrap(), 0);
    }

    #[test]
    fn test_wad_div_rounds_half_up() {
        // 1 / 3 at WAD scale: 0.333... -> last digit 3
        assert_eq!(wad_div(1, 3).unwrap(), 333_333_333_333_333_333);
        // 2 / 3 -> 0.666...7 rounds up
        assert_eq!(wad_div(2, 3).unwrap(), 666_666_666_666_666_667);
    }

    #[test]
    fn test_ray_roundtrip() {
        let x = 123_456_789_u128;
        let r = wad_to_ray(x).unwrap();
        assert_eq!(r, x * WAD_RAY_RATIO);
        assert_eq!(ray_to_wad(r).unwrap(), x);
    }

    #[test]
    fn test_ray_to_wad_rounds() {
        assert_eq!(ray_to_wad(WAD_RAY_RATIO / 2).unwrap(), 1);
        assert_eq!(ray_to_wad(WAD_RAY_RATIO / 2 - 1).unwrap(), 0);
    }

    #[test]
    fn test_percent_ops() {
        // 50.00% of 200
        assert_eq!(percent_mul(200, 5_000).unwrap(), 100);
        // +5% liquidation bonus convention: 10500 bps
        assert_eq!(percent_mul(1_000, 10_500).unwrap(), 1_050);
        assert_eq!(percent_div(1_050, 10_500).unwrap(), 1_000);
    }

    #[test]
    fn test_rescale_between_decimals() {
        // 18 -> 8 narrows with half-up
        assert_eq!(rescale(1_500_000_000_050_000_000, 18, 8).unwrap(), 150_000_000);
        assert_eq!(rescale(1_999_999_995_000_000_000, 18, 8).unwrap(), 200_000_000);
        // 8 -> 18 widens exactly
        assert_eq!(rescale(150_000_000, 8, 18).unwrap(), 1_500_000_000_000_000_000);
        // same scale is the identity
        assert_eq!(rescale(42, 6, 6).unwrap(), 42);
    }

    #[test]
    fn test_overflow_detected() {
        assert_eq!(wad_mul(u128::MAX, u128::MAX), Err(MathError::Overflow));
        assert_eq!(wad_to_ray(u128::MAX), Err(MathError::Overflow));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(wad_div(1, 0), Err(MathError::DivisionByZero));
        assert_eq!(ray_div(1, 0), Err(MathError::DivisionByZero));
        assert_eq!(percent_div(1, 0), Err(MathError::DivisionByZero));
    }
}
