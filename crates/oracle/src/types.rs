//! Core oracle types

use lentra_core::AssetId;

use crate::OracleError;

/// Price feed interface consumed by the risk engine.
///
/// Implementations must be deterministic for a given point in time: the
/// engine calls this once per touched asset per operation and expects the
/// same answer within one atomic operation.
pub trait PriceOracle: Send + Sync {
    /// Current price of one whole unit of `asset`, WAD-scaled, in the
    /// market numeraire.
    fn asset_price(&self, asset: &AssetId) -> Result<u128, OracleError>;

    /// Prices for multiple assets at once.
    fn asset_prices(&self, assets: &[AssetId]) -> Vec<Result<u128, OracleError>> {
        assets.iter().map(|a| self.asset_price(a)).collect()
    }
}
