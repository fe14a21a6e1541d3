#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod metrics;
pub mod naive;
pub mod ordering;
pub mod pool;

pub use feepool_api::{
    FeeUnit, InvalidTransactionError, PoolError, PoolResult, PoolTx, TransactionPool, TxHash,
};
pub use naive::NaivePool;
pub use pool::Pool;
