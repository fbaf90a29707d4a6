//! Mock oracle for tests
//!
//! Stores fixed WAD prices that can be updated programmatically, which is
//! how liquidation tests shock prices.

use std::collections::HashMap;
use std::sync::RwLock;

use lentra_core::AssetId;

use crate::error::OracleError;
use crate::types::PriceOracle;

/// Fixed-price oracle for unit and integration tests.
pub struct MockOracle {
    prices: RwLock<HashMap<AssetId, u128>>,
}

impl MockOracle {
    /// Create a new empty mock oracle.
    pub fn new() -> Self {
        Self {
            prices: RwLock::new(HashMap::new()),
        }
    }

    /// Set a fixed WAD price for an asset.
    pub fn set_price(&self, asset: AssetId, price: u128) {
        let mut prices = self.prices.write().unwrap_or_else(|e| e.into_inner());
        prices.insert(asset, price);
    }

    /// Remove a price (to exercise the missing-feed error path).
    pub fn remove_price(&self, asset: &AssetId) {
        let mut prices = self.prices.write().unwrap_or_else(|e| e.into_inner());
        prices.remove(asset);
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceOracle for MockOracle {
    fn asset_price(&self, asset: &AssetId) -> Result<u128, OracleError> {
        let prices = self.prices.read().unwrap_or_else(|e| e.into_inner());
        let price = prices
            .get(asset)
            .copied()
            .ok_or_else(|| OracleError::AssetNotListed {
                asset: asset.to_string(),
            })?;
        if price == 0 {
            return Err(OracleError::InvalidPrice {
                asset: asset.to_string(),
                reason: "zero price".to_string(),
            });
        }
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAD: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_set_and_get_price() {
        let oracle = MockOracle::new();
        oracle.set_price(AssetId::new("DAI"), WAD);

        assert_eq!(oracle.asset_price(&AssetId::new("DAI")).unwrap(), WAD);
    }

    #[test]
    fn test_missing_feed_is_hard_error() {
        let oracle = MockOracle::new();
        let result = oracle.asset_price(&AssetId::new("UNKNOWN"));
        assert!(matches!(result, Err(OracleError::AssetNotListed { .. })));
    }

    #[test]
    fn test_zero_price_rejected() {
        let oracle = MockOracle::new();
        oracle.set_price(AssetId::new("BAD"), 0);
        let result = oracle.asset_price(&AssetId::new("BAD"));
        assert!(matches!(result, Err(OracleError::InvalidPrice { .. })));
    }

    #[test]
    fn test_batch_prices() {
        let oracle = MockOracle::new();
        oracle.set_price(AssetId::new("DAI"), WAD);

        let results = oracle.asset_prices(&[AssetId::new("DAI"), AssetId::new("WETH")]);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
