/// Transaction identifier used for pool membership and deterministic tie-breaking.
pub type TxHash = u64;

/// Unit of fee values. Signed because the effective tip of a transaction whose fee
/// cap has been overtaken by the base fee is negative, and the pool must still
/// produce a total order over such entries.
pub type FeeUnit = i64;

/// A fee-market transaction as seen by the pool. Immutable once created.
///
/// The transaction commits to two per-gas-unit bounds: `fee_cap`, the maximum
/// total price it will pay, and `max_tip`, the maximum tip it will pay the block
/// producer on top of the base fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolTx {
    fee_cap: FeeUnit,
    max_tip: FeeUnit,
    hash: TxHash,
}

impl PoolTx {
    pub fn new(fee_cap: FeeUnit, max_tip: FeeUnit, hash: TxHash) -> Self {
        Self { fee_cap, max_tip, hash }
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// The maximum total price per gas unit this transaction will pay.
    pub fn fee_cap(&self) -> FeeUnit {
        self.fee_cap
    }

    /// The maximum tip per gas unit this transaction will pay the block producer.
    pub fn max_tip(&self) -> FeeUnit {
        self.max_tip
    }

    /// The tip per gas unit the block producer earns from this transaction at the
    /// given base fee: `min(fee_cap - base_fee, max_tip)`.
    ///
    /// Negative when the base fee exceeds the fee cap; see [`Self::is_eligible`].
    pub fn effective_tip(&self, base_fee: FeeUnit) -> FeeUnit {
        (self.fee_cap - base_fee).min(self.max_tip)
    }

    /// The base fee at which this transaction's tip stops being pinned at
    /// `max_tip` and starts tracking `fee_cap - base_fee` instead: the tip is
    /// capped while `base_fee <= basefee_threshold()`.
    pub fn basefee_threshold(&self) -> FeeUnit {
        self.fee_cap - self.max_tip
    }

    /// Whether this transaction can still pay for inclusion at the given base fee.
    pub fn is_eligible(&self, base_fee: FeeUnit) -> bool {
        self.fee_cap >= base_fee
    }
}
