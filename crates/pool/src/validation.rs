//! Pre-flight gate checks for pool operations
//!
//! Pure predicates over reserve configuration and amounts. Health-factor
//! checks live in the pool itself because they need the oracle.

use lentra_core::{AssetId, RateMode};
use lentra_reserve::Reserve;

use crate::error::PoolError;

/// Reserve must be active; mutations that add exposure also require it
/// not frozen.
pub fn check_reserve_usable(reserve: &Reserve, require_unfrozen: bool) -> Result<(), PoolError> {
    if !reserve.config.active {
        return Err(PoolError::InactiveReserve {
            asset: reserve.asset.clone(),
        });
    }
    if require_unfrozen && reserve.config.frozen {
        return Err(PoolError::FrozenReserve {
            asset: reserve.asset.clone(),
        });
    }
    Ok(())
}

pub fn check_amount(amount: u128) -> Result<(), PoolError> {
    if amount == 0 {
        return Err(PoolError::InvalidAmount);
    }
    Ok(())
}

pub fn check_available_liquidity(
    asset: &AssetId,
    available: u128,
    requested: u128,
) -> Result<(), PoolError> {
    if requested > available {
        return Err(PoolError::InsufficientLiquidity {
            asset: asset.clone(),
            available,
            requested,
        });
    }
    Ok(())
}

/// Borrow-mode gates: the mode must be explicit and enabled on the reserve.
pub fn check_borrow_mode(reserve: &Reserve, mode: RateMode) -> Result<(), PoolError> {
    if !reserve.config.borrowing_enabled {
        return Err(PoolError::BorrowingDisabled {
            asset: reserve.asset.clone(),
        });
    }
    match mode {
        RateMode::None => Err(PoolError::InvalidInterestRateMode),
        RateMode::Stable if !reserve.config.stable_borrowing_enabled => {
            Err(PoolError::StableBorrowingDisabled {
                asset: reserve.asset.clone(),
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lentra_core::AssetId;
    use lentra_reserve::{RateStrategy, ReserveConfig};

    fn reserve_with(config: ReserveConfig) -> Reserve {
        Reserve::new(
            AssetId::new("DAI"),
            config,
            RateStrategy::stablecoin(),
            0,
            0,
        )
    }

    #[test]
    fn test_inactive_reserve_rejected() {
        let mut config = ReserveConfig::stablecoin();
        config.active = false;
        let reserve = reserve_with(config);

        assert!(matches!(
            check_reserve_usable(&reserve, false),
            Err(PoolError::InactiveReserve { .. })
        ));
    }

    #[test]
    fn test_frozen_reserve_blocks_new_exposure_only() {
        let mut config = ReserveConfig::stablecoin();
        config.frozen = true;
        let reserve = reserve_with(config);

        // frozen still allows withdraw/repay paths
        assert!(check_reserve_usable(&reserve, false).is_ok());
        assert!(matches!(
            check_reserve_usable(&reserve, true),
            Err(PoolError::FrozenReserve { .. })
        ));
    }

    #[test]
    fn test_zero_amount_rejected() {
        assert!(matches!(check_amount(0), Err(PoolError::InvalidAmount)));
        assert!(check_amount(1).is_ok());
    }

    #[test]
    fn test_borrow_mode_gates() {
        let reserve = reserve_with(ReserveConfig::stablecoin());
        assert!(check_borrow_mode(&reserve, RateMode::Variable).is_ok());
        assert!(check_borrow_mode(&reserve, RateMode::Stable).is_ok());
        assert!(matches!(
            check_borrow_mode(&reserve, RateMode::None),
            Err(PoolError::InvalidInterestRateMode)
        ));

        // volatile preset has stable borrowing off
        let volatile = reserve_with(ReserveConfig::volatile());
        assert!(matches!(
            check_borrow_mode(&volatile, RateMode::Stable),
            Err(PoolError::StableBorrowingDisabled { .. })
        ));

        let mut config = ReserveConfig::stablecoin();
        config.borrowing_enabled = false;
        let disabled = reserve_with(config);
        assert!(matches!(
            check_borrow_mode(&disabled, RateMode::Variable),
            Err(PoolError::BorrowingDisabled { .. })
        ));
    }

    #[test]
    fn test_liquidity_check() {
        let asset = AssetId::new("DAI");
        assert!(check_available_liquidity(&asset, 100, 100).is_ok());
        assert!(matches!(
            check_available_liquidity(&asset, 100, 101),
            Err(PoolError::InsufficientLiquidity {
                available: 100,
                requested: 101,
                ..
            })
        ));
    }
}
