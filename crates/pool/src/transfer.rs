//! Underlying asset movement
//!
//! The pool never holds balances itself; it instructs an `AssetTransfer`
//! backend to move underlying units between user wallets and the pool
//! vault. `LedgerTransfer` is the in-memory backend used by tests and
//! local deployments.

use std::collections::BTreeMap;
use std::sync::RwLock;

use lentra_core::{AssetId, UserId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("insufficient funds: {user} holds {available} {asset}, {requested} requested")]
    InsufficientFunds {
        asset: AssetId,
        user: UserId,
        available: u128,
        requested: u128,
    },

    #[error("transfer backend unavailable: {0}")]
    Backend(String),
}

/// Moves underlying units between user wallets and the pool vault.
pub trait AssetTransfer: Send + Sync {
    /// Pay `amount` out of the pool vault to `to`.
    fn push(&self, asset: &AssetId, to: &UserId, amount: u128) -> Result<(), TransferError>;

    /// Collect `amount` from `from` into the pool vault. Fails whole if the
    /// wallet cannot cover it.
    fn pull(&self, asset: &AssetId, from: &UserId, amount: u128) -> Result<(), TransferError>;

    /// Collect up to `amount` from `from`, returning what was actually
    /// collected. Used by flash-loan settlement.
    fn pull_up_to(
        &self,
        asset: &AssetId,
        from: &UserId,
        amount: u128,
    ) -> Result<u128, TransferError>;
}

/// In-memory wallet ledger.
#[derive(Debug, Default)]
pub struct LedgerTransfer {
    wallets: RwLock<BTreeMap<(UserId, AssetId), u128>>,
}

impl LedgerTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a wallet out of thin air (test funding).
    pub fn mint(&self, asset: &AssetId, user: &UserId, amount: u128) {
        let mut wallets = self.wallets.write().unwrap_or_else(|e| e.into_inner());
        *wallets.entry((user.clone(), asset.clone())).or_default() += amount;
    }

    pub fn balance_of(&self, asset: &AssetId, user: &UserId) -> u128 {
        let wallets = self.wallets.read().unwrap_or_else(|e| e.into_inner());
        wallets
            .get(&(user.clone(), asset.clone()))
            .copied()
            .unwrap_or(0)
    }
}

impl AssetTransfer for LedgerTransfer {
    fn push(&self, asset: &AssetId, to: &UserId, amount: u128) -> Result<(), TransferError> {
        let mut wallets = self.wallets.write().unwrap_or_else(|e| e.into_inner());
        *wallets.entry((to.clone(), asset.clone())).or_default() += amount;
        Ok(())
    }

    fn pull(&self, asset: &AssetId, from: &UserId, amount: u128) -> Result<(), TransferError> {
        let mut wallets = self.wallets.write().unwrap_or_else(|e| e.into_inner());
        let balance = wallets.entry((from.clone(), asset.clone())).or_default();
        if *balance < amount {
            return Err(TransferError::InsufficientFunds {
                asset: asset.clone(),
                user: from.clone(),
                available: *balance,
                requested: amount,
            });
        }
        *balance -= amount;
        Ok(())
    }

    fn pull_up_to(
        &self,
        asset: &AssetId,
        from: &UserId,
        amount: u128,
    ) -> Result<u128, TransferError> {
        let mut wallets = self.wallets.write().unwrap_or_else(|e| e.into_inner());
        let balance = wallets.entry((from.clone(), asset.clone())).or_default();
        let pulled = amount.min(*balance);
        *balance -= pulled;
        Ok(pulled)
    }
}
