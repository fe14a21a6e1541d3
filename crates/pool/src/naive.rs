use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use feepool_api::{
    FeeUnit, InvalidTransactionError, PoolError, PoolResult, PoolTx, TransactionPool, TxHash,
};
use parking_lot::RwLock;

use crate::ordering::PriorityKey;

/// Full-rebuild reference pool.
///
/// Keeps a single index keyed by the literal effective tip, so every base-fee
/// change recomputes every key: O(n log n) per change versus the production
/// pool's O(k log n). Obviously correct and deliberately slow; it exists so that
/// identical call scripts can be replayed against both pools in differential
/// tests and benchmarks. Shares no state with [`Pool`](crate::pool::Pool).
#[derive(Debug)]
pub struct NaivePool {
    inner: Arc<RwLock<NaiveState>>,
}

#[derive(Debug, Default)]
struct NaiveState {
    base_fee: FeeUnit,
    by_tip: BTreeMap<PriorityKey, PoolTx>,
    hashes: HashSet<TxHash>,
}

impl NaivePool {
    /// Creates an empty pool ordered against the given base fee.
    pub fn new(base_fee: FeeUnit) -> Self {
        Self { inner: Arc::new(RwLock::new(NaiveState { base_fee, ..Default::default() })) }
    }
}

impl TransactionPool for NaivePool {
    fn add_transaction(&self, tx: PoolTx) -> PoolResult<TxHash> {
        if tx.fee_cap() < 0 || tx.max_tip() < 0 {
            return Err(InvalidTransactionError::NegativeFeeBound {
                fee_cap: tx.fee_cap(),
                max_tip: tx.max_tip(),
            }
            .into());
        }

        let hash = tx.hash();
        let mut state = self.inner.write();

        if state.hashes.contains(&hash) {
            return Err(InvalidTransactionError::DuplicateHash { hash }.into());
        }

        let key = PriorityKey::by_effective_tip(&tx, state.base_fee);
        state.by_tip.insert(key, tx);
        state.hashes.insert(hash);
        Ok(hash)
    }

    fn take_best(&self) -> PoolResult<PoolTx> {
        let mut state = self.inner.write();
        let (key, tx) =
            state.by_tip.last_key_value().map(|(k, tx)| (*k, *tx)).ok_or(PoolError::Empty)?;
        state.by_tip.remove(&key);
        state.hashes.remove(&tx.hash());
        Ok(tx)
    }

    fn set_base_fee(&self, base_fee: FeeUnit) {
        let mut state = self.inner.write();
        state.base_fee = base_fee;

        // rekey everything
        let txs: Vec<PoolTx> = state.by_tip.values().copied().collect();
        state.by_tip =
            txs.into_iter().map(|tx| (PriorityKey::by_effective_tip(&tx, base_fee), tx)).collect();
    }

    fn base_fee(&self) -> FeeUnit {
        self.inner.read().base_fee
    }

    fn contains(&self, hash: TxHash) -> bool {
        self.inner.read().hashes.contains(&hash)
    }

    fn size(&self) -> usize {
        self.inner.read().by_tip.len()
    }
}

impl Clone for NaivePool {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_in_tip_order() {
        let pool = NaivePool::new(0);
        pool.add_transaction(PoolTx::new(100, 5, 1)).unwrap();
        pool.add_transaction(PoolTx::new(50, 40, 2)).unwrap();
        pool.add_transaction(PoolTx::new(80, 20, 3)).unwrap();

        assert_eq!(pool.take_best().unwrap().hash(), 2);
        assert_eq!(pool.take_best().unwrap().hash(), 3);
        assert_eq!(pool.take_best().unwrap().hash(), 1);
        assert!(matches!(pool.take_best(), Err(PoolError::Empty)));
    }

    #[test]
    fn rebuild_reorders_under_new_base_fee() {
        let pool = NaivePool::new(10);
        pool.add_transaction(PoolTx::new(50, 20, 1)).unwrap(); // tip 20 at base 10
        pool.add_transaction(PoolTx::new(40, 25, 2)).unwrap(); // tip 25 at base 10

        // at base fee 30, tx 1 tips min(20, 20) = 20 and tx 2 tips min(10, 25) = 10
        pool.set_base_fee(30);
        assert_eq!(pool.take_best().unwrap().hash(), 1);
        assert_eq!(pool.take_best().unwrap().hash(), 2);
    }

    #[test]
    fn rejects_duplicates_like_the_production_pool() {
        let pool = NaivePool::new(0);
        pool.add_transaction(PoolTx::new(50, 20, 1)).unwrap();
        assert!(pool.add_transaction(PoolTx::new(70, 10, 1)).is_err());
        assert_eq!(pool.size(), 1);
    }
}
