#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod tx;

pub use tx::*;

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// `take_best` was called on a pool that holds no transactions.
    #[error("Pool is empty")]
    Empty,
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(#[from] InvalidTransactionError),
}

/// Errors for transactions that are rejected before entering the pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTransactionError {
    /// A transaction with the same hash is already held by the pool.
    #[error("Transaction with hash {hash:#x} is already in the pool")]
    DuplicateHash { hash: TxHash },

    /// Fee bounds must be non-negative; only the *effective* tip may go below zero
    /// once the base fee overtakes the fee cap.
    #[error("Negative fee bound (fee cap: {fee_cap}, max tip: {max_tip})")]
    NegativeFeeBound { fee_cap: FeeUnit, max_tip: FeeUnit },
}

pub type PoolResult<T> = Result<T, PoolError>;

/// Represents a complete fee-market transaction pool.
///
/// The pool orders its transactions by the tip they would pay the block producer
/// under the pool's current base fee. Both the production pool and the
/// full-rebuild reference pool implement this trait so that identical call
/// scripts can be replayed against either for differential testing.
pub trait TransactionPool: Send + Sync {
    /// Add a new transaction to the pool.
    ///
    /// The transaction is rejected if its hash is already present or if either
    /// fee bound is negative.
    fn add_transaction(&self, tx: PoolTx) -> PoolResult<TxHash>;

    /// Removes and returns the transaction paying the highest effective tip under
    /// the current base fee.
    ///
    /// Ties are broken deterministically: higher fee cap first, then lower hash.
    /// Note that the winner may no longer be *eligible* (its fee cap may have
    /// fallen below the base fee); filtering those out is the caller's job, the
    /// pool only maintains the total order.
    fn take_best(&self) -> PoolResult<PoolTx>;

    /// Updates the base fee against which all effective tips are computed.
    fn set_base_fee(&self, base_fee: FeeUnit);

    /// The base fee the pool is currently ordered against.
    fn base_fee(&self) -> FeeUnit;

    /// Check if the pool contains a transaction with the given hash.
    fn contains(&self, hash: TxHash) -> bool;

    /// Get the total number of transactions in the pool.
    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}
