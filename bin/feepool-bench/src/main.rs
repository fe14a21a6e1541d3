use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::Parser;
use feepool::{FeeUnit, NaivePool, Pool, PoolTx, TransactionPool};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Fee-market pool benchmark: incremental reclassification vs full \
                            rebuild", long_about = None)]
struct Args {
    /// rng seed for the generated workload
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// number of simulated block rounds
    #[arg(long, default_value_t = 100)]
    rounds: u32,

    #[arg(long, default_value_t = 30)]
    initial_base_fee: FeeUnit,

    /// floor the base fee never drops below
    #[arg(long, default_value_t = 10)]
    min_base_fee: FeeUnit,

    /// maximum +/- base-fee movement per round
    #[arg(long, default_value_t = 5)]
    fluctuation: FeeUnit,

    /// transactions pre-populated before the first round
    #[arg(long, default_value_t = 10_000)]
    initial_txs: usize,

    /// transactions added each round
    #[arg(long, default_value_t = 100)]
    adds_per_round: usize,

    /// transactions taken each round
    #[arg(long, default_value_t = 100)]
    pops_per_round: usize,

    /// exclusive upper bound on generated fee caps
    #[arg(long, default_value_t = 200)]
    max_fee_cap: FeeUnit,

    /// exclusive upper bound on generated tips
    #[arg(long, default_value_t = 100)]
    max_tip: FeeUnit,

    /// gas charged per accepted transaction
    #[arg(long, default_value_t = 1)]
    gas_used: FeeUnit,
}

fn generate_txs(rng: &mut StdRng, args: &Args, count: usize) -> Vec<PoolTx> {
    (0..count)
        .map(|_| {
            let fee_cap = rng.gen_range(0..args.max_fee_cap);
            let max_tip = rng.gen_range(0..args.max_tip);
            PoolTx::new(fee_cap, max_tip, rng.gen())
        })
        .collect()
}

/// Drives one pool through the full workload and returns the total fee earned.
///
/// Extracted transactions whose fee cap fell below the base fee are thrown back
/// into the pool unrewarded; the pool only maintains the tip order, eligibility
/// is the producer's call.
fn run_rounds<P: TransactionPool>(pool: &P, args: &Args) -> Result<FeeUnit> {
    let mut rng = StdRng::seed_from_u64(args.seed);

    for tx in generate_txs(&mut rng, args, args.initial_txs) {
        pool.add_transaction(tx)?;
    }

    let mut base_fee = args.initial_base_fee;
    let mut fee_earned = 0;

    for _ in 0..args.rounds {
        for tx in generate_txs(&mut rng, args, args.adds_per_round) {
            pool.add_transaction(tx)?;
        }

        base_fee = (base_fee + rng.gen_range(-args.fluctuation..=args.fluctuation))
            .max(args.min_base_fee);
        pool.set_base_fee(base_fee);

        for _ in 0..args.pops_per_round {
            let tx = pool.take_best()?;
            if !tx.is_eligible(base_fee) {
                pool.add_transaction(tx)?;
                continue;
            }
            fee_earned += tx.effective_tip(base_fee) * args.gas_used;
        }
    }

    Ok(fee_earned)
}

fn timed<P: TransactionPool>(pool: &P, args: &Args) -> Result<(FeeUnit, Duration)> {
    let started = Instant::now();
    let fee = run_rounds(pool, args)?;
    Ok((fee, started.elapsed()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!(seed = args.seed, rounds = args.rounds, initial_txs = args.initial_txs, "Starting.");

    let naive = NaivePool::new(args.initial_base_fee);
    let (naive_fee, naive_elapsed) = timed(&naive, &args)?;
    info!(fee_earned = naive_fee, elapsed = ?naive_elapsed, "Naive full-rebuild pool finished.");

    let fast = Pool::new(args.initial_base_fee);
    let (fast_fee, fast_elapsed) = timed(&fast, &args)?;
    info!(fee_earned = fast_fee, elapsed = ?fast_elapsed, "Incremental pool finished.");

    if naive_fee != fast_fee {
        bail!("pools diverged: naive earned {naive_fee}, incremental earned {fast_fee}");
    }

    info!("Both pools earned the same total fee.");
    Ok(())
}
