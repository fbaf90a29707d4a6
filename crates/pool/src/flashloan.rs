//! Flash-loan receiver interface
//!
//! The pool pushes the drawn funds to the receiver's wallet, hands control
//! over with all reserve locks released, and settles afterwards from
//! whatever the wallet then holds.

use lentra_core::{AssetId, UserId};

use crate::pool::LendingPool;

/// Borrower-side hook for a flash loan.
pub trait FlashLoanReceiver {
    /// Wallet the drawn funds are pushed to and repayment is pulled from.
    fn account(&self) -> UserId;

    /// Runs between draw and settlement. The pool is fully re-entrant
    /// here: deposits, withdrawals, borrows and nested flash loans are all
    /// allowed. Return `false` to abort the whole operation.
    fn execute_operation(
        &mut self,
        pool: &mut LendingPool,
        assets: &[AssetId],
        amounts: &[u128],
        premiums: &[u128],
        initiator: &UserId,
        params: &serde_json::Value,
    ) -> bool;
}
