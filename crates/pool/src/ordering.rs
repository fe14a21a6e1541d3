use std::cmp::Ordering;

use feepool_api::{FeeUnit, PoolTx, TxHash};

/// Which of the two tip formulas currently governs a transaction's effective tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// `fee_cap - base_fee >= max_tip`: the tip is pinned at `max_tip` and does
    /// not move with the base fee.
    Capped,
    /// `fee_cap - base_fee < max_tip`: the tip is `fee_cap - base_fee` and
    /// shrinks as the base fee rises.
    Uncapped,
}

impl Regime {
    /// Classifies a transaction under the given base fee. A transaction is
    /// [`Capped`](Self::Capped) while the base fee has not passed its threshold.
    pub fn of(tx: &PoolTx, base_fee: FeeUnit) -> Self {
        if base_fee <= tx.basefee_threshold() {
            Regime::Capped
        } else {
            Regime::Uncapped
        }
    }
}

/// Ordering key for the tip-ordered indices.
///
/// For the regime indices `rank` is base-fee-independent (`max_tip` for capped
/// entries, `fee_cap` for uncapped ones): within a regime at a fixed base fee
/// this orders entries exactly by effective tip, and stays correct as the base
/// fee moves because all uncapped tips shift by the same amount. The reference
/// pool instead keys by the literal effective tip and must rebuild on every
/// base-fee change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityKey {
    rank: FeeUnit,
    fee_cap: FeeUnit,
    hash: TxHash,
}

impl PriorityKey {
    /// Key for a transaction held in the given regime's index.
    pub fn for_regime(tx: &PoolTx, regime: Regime) -> Self {
        let rank = match regime {
            Regime::Capped => tx.max_tip(),
            Regime::Uncapped => tx.fee_cap(),
        };
        Self { rank, fee_cap: tx.fee_cap(), hash: tx.hash() }
    }

    /// Key ranking by the literal effective tip under `base_fee`. Used by the
    /// full-rebuild reference pool.
    pub fn by_effective_tip(tx: &PoolTx, base_fee: FeeUnit) -> Self {
        Self { rank: tx.effective_tip(base_fee), fee_cap: tx.fee_cap(), hash: tx.hash() }
    }
}

// The maximum key is the best candidate: highest rank, then highest fee cap,
// then lowest hash.
impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then(self.fee_cap.cmp(&other.fee_cap))
            .then(other.hash.cmp(&self.hash))
    }
}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compares two transactions by effective tip under `base_fee`, with the pool's
/// deterministic tie-break: higher fee cap first, then lower hash. `Greater`
/// means `a` is the better candidate.
///
/// Agrees with [`PriorityKey`] within a single regime; used to pick between the
/// heads of the two regime indices where the base-fee-independent ranks are not
/// comparable with each other.
pub fn compare_by_tip(a: &PoolTx, b: &PoolTx, base_fee: FeeUnit) -> Ordering {
    a.effective_tip(base_fee)
        .cmp(&b.effective_tip(base_fee))
        .then(a.fee_cap().cmp(&b.fee_cap()))
        .then(b.hash().cmp(&a.hash()))
}

/// Key for the threshold index, ordered by ascending regime-flip threshold.
///
/// The index holds every transaction in the pool regardless of regime; a
/// base-fee move from `lo` to `hi` affects exactly the entries with threshold in
/// the half-open range `[lo, hi)`, queried with [`ThresholdKey::floor`] bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ThresholdKey {
    threshold: FeeUnit,
    fee_cap: FeeUnit,
    hash: TxHash,
}

impl ThresholdKey {
    pub fn new(tx: &PoolTx) -> Self {
        Self { threshold: tx.basefee_threshold(), fee_cap: tx.fee_cap(), hash: tx.hash() }
    }

    /// The smallest possible key with the given threshold. Two floors delimit
    /// the half-open threshold range `[lo, hi)`.
    pub fn floor(threshold: FeeUnit) -> Self {
        Self { threshold, fee_cap: FeeUnit::MIN, hash: TxHash::MIN }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn regime_boundary_is_capped() {
        // threshold = 40 - 30 = 10
        let tx = PoolTx::new(40, 30, 1);
        assert_eq!(Regime::of(&tx, 9), Regime::Capped);
        assert_eq!(Regime::of(&tx, 10), Regime::Capped);
        assert_eq!(Regime::of(&tx, 11), Regime::Uncapped);
    }

    #[test]
    fn priority_key_max_is_best() {
        let low_tip = PriorityKey::by_effective_tip(&PoolTx::new(100, 5, 1), 0);
        let high_tip = PriorityKey::by_effective_tip(&PoolTx::new(50, 40, 2), 0);
        assert!(high_tip > low_tip);
    }

    #[test]
    fn priority_key_tie_break() {
        let base_fee = 0;

        // same tip, different fee cap: higher cap wins
        let a = PriorityKey::by_effective_tip(&PoolTx::new(80, 20, 1), base_fee);
        let b = PriorityKey::by_effective_tip(&PoolTx::new(60, 20, 2), base_fee);
        assert!(a > b);

        // same tip and cap: lower hash wins
        let c = PriorityKey::by_effective_tip(&PoolTx::new(80, 20, 3), base_fee);
        let d = PriorityKey::by_effective_tip(&PoolTx::new(80, 20, 7), base_fee);
        assert!(c > d);
    }

    #[test]
    fn regime_key_matches_effective_tip_order_within_regime() {
        let base_fee = 25;
        // all uncapped under base fee 25 (thresholds below 25)
        let txs = [PoolTx::new(30, 20, 1), PoolTx::new(45, 40, 2), PoolTx::new(27, 10, 3)];

        for a in &txs {
            for b in &txs {
                assert_eq!(Regime::of(a, base_fee), Regime::Uncapped);
                let by_key = PriorityKey::for_regime(a, Regime::Uncapped)
                    .cmp(&PriorityKey::for_regime(b, Regime::Uncapped));
                assert_eq!(by_key, compare_by_tip(a, b, base_fee));
            }
        }
    }

    #[test]
    fn threshold_range_is_half_open() {
        let txs = [
            PoolTx::new(19, 10, 1), // threshold 9
            PoolTx::new(30, 20, 2), // threshold 10
            PoolTx::new(34, 20, 3), // threshold 14
            PoolTx::new(40, 25, 4), // threshold 15
        ];

        let index: BTreeMap<ThresholdKey, PoolTx> =
            txs.iter().map(|tx| (ThresholdKey::new(tx), *tx)).collect();

        let in_range: Vec<TxHash> = index
            .range(ThresholdKey::floor(10)..ThresholdKey::floor(15))
            .map(|(_, tx)| tx.hash())
            .collect();

        assert_eq!(in_range, vec![2, 3]);
    }
}
