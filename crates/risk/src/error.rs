//! Risk engine errors

use lentra_math::MathError;
use lentra_oracle::OracleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("math error: {0}")]
    Math(#[from] MathError),
}
