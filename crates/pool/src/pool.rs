use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use feepool_api::{
    FeeUnit, InvalidTransactionError, PoolError, PoolResult, PoolTx, TransactionPool, TxHash,
};
use metrics::{counter, gauge};
use parking_lot::RwLock;
use tracing::trace;

use crate::metrics::{
    TRANSACTIONS_ADDED_TOTAL, TRANSACTIONS_CURRENT, TRANSACTIONS_REJECTED_TOTAL,
    TRANSACTIONS_REMOVED_TOTAL,
};
use crate::ordering::{compare_by_tip, PriorityKey, Regime, ThresholdKey};

/// Fee-market transaction pool with incremental base-fee reclassification.
///
/// Transactions are partitioned into two tip-ordered regime indices whose keys
/// do not depend on the base fee, plus a threshold index over the full set. When
/// the base fee moves, only the transactions whose regime flips need rekeying,
/// and those form one contiguous range of the threshold index: a base-fee move
/// from `lo` to `hi` flips exactly the entries with threshold in `[lo, hi)`.
/// This makes [`set_base_fee`](TransactionPool::set_base_fee) O(k log n) in the
/// number of flipped entries instead of the O(n log n) full rebuild performed by
/// [`NaivePool`](crate::naive::NaivePool).
#[derive(Debug)]
pub struct Pool {
    inner: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    /// The base fee all effective tips are computed against. Only changes
    /// through `set_base_fee`.
    base_fee: FeeUnit,

    /// Entries whose tip is pinned at `max_tip` (base fee at or below their
    /// threshold). Keyed by `max_tip`.
    capped: BTreeMap<PriorityKey, PoolTx>,

    /// Entries whose tip tracks `fee_cap - base_fee`. Keyed by `fee_cap`.
    uncapped: BTreeMap<PriorityKey, PoolTx>,

    /// All entries ordered by regime-flip threshold; never partitioned.
    thresholds: BTreeMap<ThresholdKey, PoolTx>,

    /// Hashes of all held transactions, for O(1) duplicate rejection.
    hashes: HashSet<TxHash>,
}

impl State {
    fn insert(&mut self, tx: PoolTx) {
        let regime = Regime::of(&tx, self.base_fee);
        let key = PriorityKey::for_regime(&tx, regime);
        match regime {
            Regime::Capped => self.capped.insert(key, tx),
            Regime::Uncapped => self.uncapped.insert(key, tx),
        };
        self.thresholds.insert(ThresholdKey::new(&tx), tx);
        self.hashes.insert(tx.hash());
    }

    fn take_best(&mut self) -> Option<PoolTx> {
        let capped_head = self.capped.last_key_value().map(|(k, tx)| (*k, *tx));
        let uncapped_head = self.uncapped.last_key_value().map(|(k, tx)| (*k, *tx));

        // Each head is its regime's maximum under the effective-tip order, so
        // the overall best is whichever of the two heads wins the comparison.
        let winner = match (capped_head, uncapped_head) {
            (None, None) => return None,
            (Some((key, tx)), None) => {
                self.capped.remove(&key);
                tx
            }
            (None, Some((key, tx))) => {
                self.uncapped.remove(&key);
                tx
            }
            (Some((capped_key, capped)), Some((uncapped_key, uncapped))) => {
                if compare_by_tip(&capped, &uncapped, self.base_fee).is_ge() {
                    self.capped.remove(&capped_key);
                    capped
                } else {
                    self.uncapped.remove(&uncapped_key);
                    uncapped
                }
            }
        };

        self.thresholds.remove(&ThresholdKey::new(&winner));
        self.hashes.remove(&winner.hash());
        Some(winner)
    }

    /// Restores the regime partition after a base-fee change. Returns the
    /// number of entries whose regime flipped.
    fn set_base_fee(&mut self, base_fee: FeeUnit) -> usize {
        let old = self.base_fee;
        self.base_fee = base_fee;

        let moved: Vec<PoolTx> = if old < base_fee {
            // thresholds in [old, base_fee): Capped -> Uncapped
            self.thresholds
                .range(ThresholdKey::floor(old)..ThresholdKey::floor(base_fee))
                .map(|(_, tx)| *tx)
                .collect()
        } else if base_fee < old {
            // thresholds in [base_fee, old): Uncapped -> Capped
            self.thresholds
                .range(ThresholdKey::floor(base_fee)..ThresholdKey::floor(old))
                .map(|(_, tx)| *tx)
                .collect()
        } else {
            return 0;
        };

        for tx in &moved {
            if old < base_fee {
                let removed = self.capped.remove(&PriorityKey::for_regime(tx, Regime::Capped));
                debug_assert!(removed.is_some(), "flipped entry missing from capped index");
                self.uncapped.insert(PriorityKey::for_regime(tx, Regime::Uncapped), *tx);
            } else {
                let removed = self.uncapped.remove(&PriorityKey::for_regime(tx, Regime::Uncapped));
                debug_assert!(removed.is_some(), "flipped entry missing from uncapped index");
                self.capped.insert(PriorityKey::for_regime(tx, Regime::Capped), *tx);
            }
        }

        moved.len()
    }
}

impl Pool {
    /// Creates an empty pool ordered against the given base fee.
    pub fn new(base_fee: FeeUnit) -> Self {
        crate::metrics::describe();
        Self { inner: Arc::new(RwLock::new(State { base_fee, ..Default::default() })) }
    }

    /// Recomputes the regime rule for every held transaction and cross-checks
    /// index cardinalities. Panics on the first violation.
    ///
    /// Diagnostic aid for tests; every public operation is expected to leave the
    /// pool in a state where this passes.
    pub fn assert_invariants(&self) {
        let state = self.inner.read();

        assert_eq!(
            state.capped.len() + state.uncapped.len(),
            state.thresholds.len(),
            "regime indices and threshold index disagree on cardinality"
        );
        assert_eq!(state.hashes.len(), state.thresholds.len());

        for tx in state.capped.values() {
            assert!(
                tx.fee_cap() - state.base_fee >= tx.max_tip(),
                "capped entry violates regime rule at base fee {}: {tx:?}",
                state.base_fee,
            );
        }
        for tx in state.uncapped.values() {
            assert!(
                tx.fee_cap() - state.base_fee < tx.max_tip(),
                "uncapped entry violates regime rule at base fee {}: {tx:?}",
                state.base_fee,
            );
        }
        for tx in state.thresholds.values() {
            assert!(state.hashes.contains(&tx.hash()));
        }
    }
}

impl TransactionPool for Pool {
    fn add_transaction(&self, tx: PoolTx) -> PoolResult<TxHash> {
        if tx.fee_cap() < 0 || tx.max_tip() < 0 {
            counter!(TRANSACTIONS_REJECTED_TOTAL, 1);
            return Err(InvalidTransactionError::NegativeFeeBound {
                fee_cap: tx.fee_cap(),
                max_tip: tx.max_tip(),
            }
            .into());
        }

        let hash = tx.hash();
        let mut state = self.inner.write();

        if state.hashes.contains(&hash) {
            counter!(TRANSACTIONS_REJECTED_TOTAL, 1);
            return Err(InvalidTransactionError::DuplicateHash { hash }.into());
        }

        state.insert(tx);
        trace!(target: "pool", hash = format!("{hash:#x}"), "Transaction added to the pool.");

        counter!(TRANSACTIONS_ADDED_TOTAL, 1);
        gauge!(TRANSACTIONS_CURRENT, state.thresholds.len() as f64);
        Ok(hash)
    }

    fn take_best(&self) -> PoolResult<PoolTx> {
        let mut state = self.inner.write();
        let tx = state.take_best().ok_or(PoolError::Empty)?;

        trace!(
            target: "pool",
            hash = format!("{:#x}", tx.hash()),
            tip = tx.effective_tip(state.base_fee),
            "Transaction taken from the pool."
        );

        counter!(TRANSACTIONS_REMOVED_TOTAL, 1);
        gauge!(TRANSACTIONS_CURRENT, state.thresholds.len() as f64);
        Ok(tx)
    }

    fn set_base_fee(&self, base_fee: FeeUnit) {
        let mut state = self.inner.write();
        let old = state.base_fee;
        let moved = state.set_base_fee(base_fee);
        trace!(target: "pool", %old, new = %base_fee, moved, "Base fee updated.");
    }

    fn base_fee(&self) -> FeeUnit {
        self.inner.read().base_fee
    }

    fn contains(&self, hash: TxHash) -> bool {
        self.inner.read().hashes.contains(&hash)
    }

    fn size(&self) -> usize {
        self.inner.read().thresholds.len()
    }
}

impl Clone for Pool {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}
