//! Lentra Core - Domain types
//!
//! This crate contains the fundamental types used across Lentra:
//! - `AssetId` / `UserId`: Type-safe identifiers for reserves and accounts
//! - `RateMode`: Interest rate mode selector for borrow/repay operations
//! - `Clock`: Time source abstraction (system clock or manual test clock)

pub mod clock;
pub mod ids;
pub mod rate_mode;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ids::{AssetId, UserId};
pub use rate_mode::RateMode;

/// Sentinel amount meaning "the full current balance" for withdraw and repay.
pub const MAX_AMOUNT: u128 = u128::MAX;
