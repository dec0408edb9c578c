use std::{
    collections::HashMap,
    fmt,
    fs::{create_dir_all, File},
    io::Write,
    sync::mpsc,
    thread,
};

mod acc;
mod algo;
mod exp;

use acc::Accumulator;
use algo::{JumpHash, JumpHashXXH3};
use clap::Parser;
use exp::{Collisions, Experiment, Regularity, Remaps};
use tracing::info;
use tracing_subscriber::EnvFilter;

const RESULT_DIR: &str = "results";
const DEFAULT_ALGORITHMS: [Algorithm; 2] = [Algorithm::JumpHash, Algorithm::JumpHashXXH3];

#[derive(Parser, Debug)]
enum Command {
    /// Tests the uniformity of the distribution of buckets using a chi-squared
    /// test.
    Regularity {
        #[clap(short, long, value_parser = clap::value_parser!(i32).range(1..))]
        buckets: i32,
        #[clap(short, long, default_value_t = 8, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(8..))]
        input_size_bytes: usize,
        #[clap(short, long, default_values_t=DEFAULT_ALGORITHMS)]
        algorithms: Vec<Algorithm>,
        /// Stops once this many keys have been hashed with every algorithm.
        #[clap(short, long)]
        max_keys: Option<u64>,
    },

    /// Compares the number of collisions with the expected value if the
    /// distribution is uniform. The number of collisions is related to the L2
    /// distance to the uniform distribution, so this is another way to test for
    /// regularity.
    Collisions {
        #[clap(short, long, value_parser = clap::value_parser!(i32).range(1..))]
        buckets: i32,
        #[clap(short, long, default_value_t = 8, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(8..))]
        input_size_bytes: usize,
        #[clap(short, long, default_values_t=DEFAULT_ALGORITHMS)]
        algorithms: Vec<Algorithm>,
        /// Stops once this many keys have been hashed with every algorithm.
        #[clap(short, long)]
        max_keys: Option<u64>,
    },

    /// Compares the fraction of keys remapped when adding the n-th bucket with
    /// 1/n, and counts remaps that do not land on the new bucket.
    Remaps {
        #[clap(short = 'b', long, value_parser = clap::value_parser!(i32).range(2..))]
        max_buckets: i32,
        #[clap(short, long, default_value_t = 8, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(8..))]
        input_size_bytes: usize,
        #[clap(short, long, default_values_t=DEFAULT_ALGORITHMS)]
        algorithms: Vec<Algorithm>,
        /// Stops once this many keys have been hashed with every algorithm.
        #[clap(short, long)]
        max_keys: Option<u64>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Algorithm {
    JumpHash,
    JumpHashXXH3,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Algorithm::JumpHash => "jump-hash",
                Algorithm::JumpHashXXH3 => "jump-hash-xxh3",
            }
        )
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match Command::parse() {
        Command::Regularity {
            buckets,
            input_size_bytes,
            algorithms,
            max_keys,
        } => {
            let output_dir = format!("{RESULT_DIR}/regularity");
            create_dir_all(&output_dir).unwrap();
            let mut output = File::create(format!(
                "{output_dir}/{input_size_bytes}_bytes_to_{buckets}_buckets"
            ))
            .unwrap();
            let experiment = Regularity::new(buckets, input_size_bytes);
            run_experiment(&mut output, experiment, algorithms, max_keys);
        }
        Command::Collisions {
            buckets,
            input_size_bytes,
            algorithms,
            max_keys,
        } => {
            let output_dir = format!("{RESULT_DIR}/collisions");
            create_dir_all(&output_dir).unwrap();
            let mut output = File::create(format!(
                "{output_dir}/{input_size_bytes}_bytes_to_{buckets}_buckets"
            ))
            .unwrap();
            let experiment = Collisions::new(buckets, input_size_bytes);
            run_experiment(&mut output, experiment, algorithms, max_keys);
        }
        Command::Remaps {
            max_buckets,
            input_size_bytes,
            algorithms,
            max_keys,
        } => {
            let output_dir = format!("{RESULT_DIR}/remaps");
            create_dir_all(&output_dir).unwrap();
            let mut output = File::create(format!(
                "{output_dir}/{input_size_bytes}_bytes_up_to_{max_buckets}_buckets"
            ))
            .unwrap();
            let experiment = Remaps::new(max_buckets, input_size_bytes);
            run_experiment(&mut output, experiment, algorithms, max_keys);
        }
    }
}

fn run_experiment<E>(
    output: &mut impl Write,
    experiment: E,
    algorithms: Vec<Algorithm>,
    max_keys: Option<u64>,
) where
    E: Experiment + Clone + Send + 'static,
    <E as Experiment>::Accumulator: Send,
{
    const STEP_SIZE: u64 = 1_000_000;

    assert!(!algorithms.is_empty());

    let num_threads = usize::from(thread::available_parallelism().unwrap())
        .saturating_sub(1)
        .max(1);
    info!(num_threads, ?algorithms, ?max_keys, "starting experiment");

    let (tx, rx) = mpsc::channel();
    for _ in 0..num_threads {
        let thread_tx = tx.clone();
        let thread_experiment = experiment.clone();
        let thread_algorithms = algorithms.clone();
        thread::spawn(move || loop {
            for algorithm in &thread_algorithms {
                let step = match algorithm {
                    Algorithm::JumpHash => (
                        format!("{}", JumpHash),
                        thread_experiment.accumulate(&JumpHash, STEP_SIZE),
                    ),
                    Algorithm::JumpHashXXH3 => (
                        format!("{}", JumpHashXXH3),
                        thread_experiment.accumulate(&JumpHashXXH3, STEP_SIZE),
                    ),
                };
                // The receiver is gone once the experiment is complete.
                if thread_tx.send(step).is_err() {
                    return;
                }
            }
        });
    }
    drop(tx);

    let mut accumulators = HashMap::new();
    for (algo, step_accumulator) in rx {
        let algo_accumulator = accumulators
            .entry(algo.clone())
            .or_insert_with(|| experiment.new_accumulator());
        algo_accumulator.merge(&step_accumulator);

        output
            .write_fmt(format_args!("{{\"algo\": \"{algo}\""))
            .unwrap();
        experiment.write_summary(output, algo_accumulator).unwrap();
        output.write_fmt(format_args!("}}\n")).unwrap();
        output.flush().unwrap();
        info!(
            "Processed {:e} keys for {}",
            algo_accumulator.num_iterations() as f64,
            algo
        );

        if let Some(max_keys) = max_keys {
            if accumulators.len() == algorithms.len()
                && accumulators
                    .values()
                    .all(|accumulator| accumulator.num_iterations() >= max_keys)
            {
                info!(max_keys, "experiment complete");
                break;
            }
        }
    }
}
