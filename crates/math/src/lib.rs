//! Lentra Math - Scaled-integer fixed-point arithmetic
//!
//! All ratios, rates and prices in the engine are scaled integers:
//! - WAD: 18 decimal digits (token amounts in the numeraire, prices)
//! - RAY: 27 decimal digits (rates, indices, utilization)
//! - Percentage: 4 digits, 10000 = 100.00% (risk parameters, fees)
//!
//! No floating point is used anywhere. Rounding is half-up and deterministic:
//! two independent implementations fed the same inputs must produce
//! byte-identical ledger states. Intermediates go through `U256`, and any
//! result that does not fit `u128` is an `Overflow` error, never a wrap.

pub mod error;
pub mod interest;
pub mod scaled;

pub use error::MathError;
pub use interest::{compounded_interest, linear_interest, SECONDS_PER_YEAR};
pub use scaled::{
    mul_div_half_up, percent_div, percent_mul, ray_div, ray_mul, ray_to_wad, rescale, wad_div,
    wad_mul, wad_to_ray, HALF_PERCENT, HALF_RAY, HALF_WAD, PERCENTAGE_FACTOR, RAY, WAD,
    WAD_RAY_RATIO,
};
