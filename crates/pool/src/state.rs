//! Pool state: reserves, positions and pool-level configuration
//!
//! The whole state is `Clone`; public operations snapshot it on entry and
//! restore it on any error, which is what makes every operation atomic.

use std::collections::BTreeMap;

use lentra_core::{AssetId, UserId};
use lentra_reserve::{Reserve, UserPosition};
use serde::{Deserialize, Serialize};

use crate::error::PoolError;

/// Pool-level knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Flash-loan premium, in bps of the drawn amount.
    pub flash_loan_premium_bps: u16,
    /// Share of a user's per-asset debt one liquidation may cover, in bps.
    pub close_factor_bps: u16,
    /// When set, flash-loan premiums are minted as a deposit to this user
    /// instead of being cumulated into the liquidity index.
    pub premium_receiver: Option<UserId>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            flash_loan_premium_bps: 9,
            close_factor_bps: lentra_risk::DEFAULT_CLOSE_FACTOR_BPS,
            premium_receiver: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolState {
    pub config: PoolConfig,
    pub reserves: BTreeMap<AssetId, Reserve>,
    pub positions: BTreeMap<UserId, BTreeMap<AssetId, UserPosition>>,
}

impl PoolState {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            reserves: BTreeMap::new(),
            positions: BTreeMap::new(),
        }
    }

    /// Unknown assets surface as inactive reserves.
    pub fn reserve(&self, asset: &AssetId) -> Result<&Reserve, PoolError> {
        self.reserves.get(asset).ok_or(PoolError::InactiveReserve {
            asset: asset.clone(),
        })
    }

    pub fn reserve_mut(&mut self, asset: &AssetId) -> Result<&mut Reserve, PoolError> {
        self.reserves
            .get_mut(asset)
            .ok_or(PoolError::InactiveReserve {
                asset: asset.clone(),
            })
    }

    /// Read-only position lookup; absent positions read as empty.
    pub fn position(&self, user: &UserId, asset: &AssetId) -> UserPosition {
        self.positions
            .get(user)
            .and_then(|per_asset| per_asset.get(asset))
            .cloned()
            .unwrap_or_default()
    }

    pub fn position_mut(&mut self, user: &UserId, asset: &AssetId) -> &mut UserPosition {
        self.positions
            .entry(user.clone())
            .or_default()
            .entry(asset.clone())
            .or_default()
    }

    /// All of one user's positions, empty map if the user is unknown.
    pub fn positions_of(&self, user: &UserId) -> BTreeMap<AssetId, UserPosition> {
        self.positions.get(user).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PoolConfig::default();
        assert_eq!(config.flash_loan_premium_bps, 9);
        assert_eq!(config.close_factor_bps, 5_000);
        assert!(config.premium_receiver.is_none());
    }

    #[test]
    fn test_unknown_reserve_is_inactive() {
        let state = PoolState::default();
        let result = state.reserve(&AssetId::new("DAI"));
        assert!(matches!(result, Err(PoolError::InactiveReserve { .. })));
    }

    #[test]
    fn test_absent_position_reads_empty() {
        let state = PoolState::default();
        let position = state.position(&UserId::new("ALICE"), &AssetId::new("DAI"));
        assert!(position.is_empty());
    }
}
