//! Lentra Pool - Lending pool orchestration
//!
//! Ties the reserves, positions, risk engine, oracle and transfer backend
//! together behind a single `LendingPool`. Operations are atomic: the pool
//! snapshots its state on entry and restores it on any error.

pub mod error;
pub mod flashloan;
pub mod pool;
pub mod state;
pub mod transfer;
pub mod validation;

pub use error::PoolError;
pub use flashloan::FlashLoanReceiver;
pub use pool::LendingPool;
pub use state::{PoolConfig, PoolState};
pub use transfer::{AssetTransfer, LedgerTransfer, TransferError};
