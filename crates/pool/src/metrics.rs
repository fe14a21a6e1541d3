//! Metrics for tracking transaction pool operations and state, scoped under
//! `tx_pool`. These track pool management operations, not inclusion latency.

use metrics::{describe_counter, describe_gauge};

pub(crate) const TRANSACTIONS_ADDED_TOTAL: &str = "tx_pool_transactions_added_total";
pub(crate) const TRANSACTIONS_REMOVED_TOTAL: &str = "tx_pool_transactions_removed_total";
pub(crate) const TRANSACTIONS_REJECTED_TOTAL: &str = "tx_pool_transactions_rejected_total";
pub(crate) const TRANSACTIONS_CURRENT: &str = "tx_pool_transactions_current";

/// Registers metric descriptions with the installed recorder. Safe to call more
/// than once.
pub(crate) fn describe() {
    describe_counter!(TRANSACTIONS_ADDED_TOTAL, "The number of transactions added to the pool.");
    describe_counter!(
        TRANSACTIONS_REMOVED_TOTAL,
        "The number of transactions taken out of the pool."
    );
    describe_counter!(
        TRANSACTIONS_REJECTED_TOTAL,
        "The number of transactions rejected on submission."
    );
    describe_gauge!(TRANSACTIONS_CURRENT, "The current number of transactions waiting in the pool.");
}
