//! Lentra Reserve - Per-asset ledger and interest accrual
//!
//! One `Reserve` exists per listed asset. Every state-changing operation on
//! a reserve follows the same transition: accrue (advance the liquidity and
//! variable borrow indices to now), mutate (apply the principal delta), then
//! rerate (recompute utilization and the three rates). Interest is lazy: a
//! pure function of the stored indices, the stored timestamps and now.
//!
//! `UserPosition` holds the per-(user, asset) side: scaled deposit balance,
//! stable debt principal with its locked-in rate, and scaled variable debt.

pub mod config;
pub mod position;
pub mod rates;
pub mod reserve;

pub use config::{RateStrategy, ReserveConfig};
pub use position::UserPosition;
pub use rates::{compute_rates, overall_borrow_rate, ComputedRates};
pub use reserve::Reserve;
