//! Oracle error types

use thiserror::Error;

/// Oracle-related errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// No price feed for the asset
    #[error("No price feed for asset: {asset}")]
    AssetNotListed { asset: String },

    /// Price data is stale (older than threshold)
    #[error("Stale price for {asset}: last update {last_update}, threshold {threshold_secs}s")]
    StalePrice {
        asset: String,
        last_update: u64,
        threshold_secs: u64,
    },

    /// Price data is invalid (zero or out of range)
    #[error("Invalid price for {asset}: {reason}")]
    InvalidPrice { asset: String, reason: String },
}
