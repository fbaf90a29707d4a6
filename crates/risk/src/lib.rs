//! Lentra Risk - Account health evaluation and liquidation math
//!
//! The risk engine folds a user's positions across every reserve into a
//! single `AccountSummary`: base-currency collateral and debt values, the
//! blended LTV and liquidation threshold, and the health factor. The
//! liquidation module prices collateral seizures from that summary.

pub mod engine;
pub mod error;
pub mod liquidation;

pub use engine::{AccountSummary, RiskEngine, HEALTH_FACTOR_LIQUIDATION_THRESHOLD};
pub use error::RiskError;
pub use liquidation::{
    available_collateral_to_liquidate, collateral_to_seize, max_liquidatable_debt, SeizureOutcome,
    DEFAULT_CLOSE_FACTOR_BPS,
};
