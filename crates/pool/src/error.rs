//! Pool operation errors

use lentra_core::AssetId;
use lentra_math::MathError;
use lentra_oracle::OracleError;
use lentra_risk::RiskError;
use thiserror::Error;

use crate::transfer::TransferError;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("reserve {asset} is not active")]
    InactiveReserve { asset: AssetId },

    #[error("reserve {asset} is already listed")]
    ReserveAlreadyListed { asset: AssetId },

    #[error("reserve {asset} is frozen")]
    FrozenReserve { asset: AssetId },

    #[error("insufficient liquidity in {asset}: {available} available, {requested} requested")]
    InsufficientLiquidity {
        asset: AssetId,
        available: u128,
        requested: u128,
    },

    #[error("transfer not allowed: account would become undercollateralized")]
    TransferNotAllowed,

    #[error("borrowing is disabled for {asset}")]
    BorrowingDisabled { asset: AssetId },

    #[error("stable borrowing is disabled for {asset}")]
    StableBorrowingDisabled { asset: AssetId },

    #[error("invalid interest rate mode")]
    InvalidInterestRateMode,

    #[error("no debt of the selected rate mode to repay")]
    NoDebtOfSelectedType,

    #[error("explicit amount required when repaying on behalf of another user")]
    NoExplicitAmountOnBehalf,

    #[error("collateral balance is zero")]
    CollateralBalanceIsZero,

    #[error("collateral cannot cover the new borrow")]
    CollateralCannotCoverNewBorrow,

    #[error("health factor below liquidation threshold: {health_factor}")]
    HealthFactorBelowThreshold { health_factor: u128 },

    #[error("health factor is not below the liquidation threshold")]
    HealthFactorNotBelowThreshold,

    #[error("the selected collateral cannot be liquidated")]
    CollateralCannotBeLiquidated,

    #[error("user has no debt in the selected currency")]
    CurrencyNotBorrowedByUser,

    #[error("flash loan was not repaid")]
    FlashLoanRepaymentFailed,

    #[error("reentrant access to reserve {asset}")]
    ReentrantReserveAccess { asset: AssetId },

    #[error("math error: {0}")]
    Math(#[from] MathError),

    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),
}

impl From<RiskError> for PoolError {
    fn from(err: RiskError) -> Self {
        match err {
            RiskError::Oracle(e) => PoolError::Oracle(e),
            RiskError::Math(e) => PoolError::Math(e),
        }
    }
}
