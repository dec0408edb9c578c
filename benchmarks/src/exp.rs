use std::io;

use rand::{thread_rng, RngCore};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::{
    acc::{Accumulator, NumOccurrences, NumRemaps},
    algo::Algorithm,
};

pub(crate) trait Experiment {
    type Accumulator: Accumulator;

    fn new_accumulator(&self) -> Self::Accumulator;

    fn run(&self, accumulator: &mut Self::Accumulator, algorithm: &impl Algorithm);

    fn accumulate(&self, algorithm: &impl Algorithm, num_iterations: u64) -> Self::Accumulator {
        let mut accumulator = self.new_accumulator();
        for _ in 0..num_iterations {
            self.run(&mut accumulator, algorithm);
        }
        accumulator
    }

    fn write_summary(
        &self,
        output: &mut impl io::Write,
        accumulator: &Self::Accumulator,
    ) -> Result<(), std::io::Error>;
}

fn random_key(input_size_bytes: usize) -> Vec<u8> {
    let mut bytes = vec![0; input_size_bytes];
    thread_rng().fill_bytes(&mut bytes);
    bytes
}

#[derive(Clone, Debug)]
pub(crate) struct Regularity {
    buckets: i32,
    input_size_bytes: usize,
}

impl Regularity {
    pub(crate) fn new(buckets: i32, input_size_bytes: usize) -> Self {
        Self {
            buckets,
            input_size_bytes,
        }
    }
}

impl Experiment for Regularity {
    type Accumulator = NumOccurrences;

    fn new_accumulator(&self) -> Self::Accumulator {
        NumOccurrences::new(usize::try_from(self.buckets).unwrap())
    }

    #[inline]
    fn run(&self, accumulator: &mut Self::Accumulator, algorithm: &impl Algorithm) {
        let bucket = algorithm.hash(&random_key(self.input_size_bytes), self.buckets);
        accumulator.record(bucket);
    }

    fn write_summary(
        &self,
        output: &mut impl io::Write,
        accumulator: &Self::Accumulator,
    ) -> Result<(), std::io::Error> {
        let num_keys = accumulator.num_iterations();
        let num_buckets = accumulator.counts().len();
        let l1_distance = accumulator
            .counts()
            .iter()
            .map(|&c| c as f64 / num_keys as f64)
            .map(|p| (p - 1.0 / num_buckets as f64).abs())
            .sum::<f64>();
        let l2_distance = accumulator
            .counts()
            .iter()
            .map(|&c| c as f64 / num_keys as f64)
            .map(|p| (p - 1.0 / num_buckets as f64).powi(2))
            .sum::<f64>()
            .sqrt();
        let p_value = chi_squared_uniformity_test_p_value(accumulator.counts());
        output.write_fmt(format_args!(
            ", \"num keys\": {num_keys}\
            , \"l1 distance\": {l1_distance:e}\
            , \"l2 distance\": {l2_distance:e}\
            , \"p-value\": {p_value}"
        ))
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Collisions {
    buckets: i32,
    input_size_bytes: usize,
}

impl Collisions {
    pub(crate) fn new(buckets: i32, input_size_bytes: usize) -> Self {
        Self {
            buckets,
            input_size_bytes,
        }
    }
}

impl Experiment for Collisions {
    type Accumulator = NumOccurrences;

    fn new_accumulator(&self) -> Self::Accumulator {
        NumOccurrences::new(usize::try_from(self.buckets).unwrap())
    }

    #[inline]
    fn run(&self, accumulator: &mut Self::Accumulator, algorithm: &impl Algorithm) {
        let bucket = algorithm.hash(&random_key(self.input_size_bytes), self.buckets);
        accumulator.record(bucket);
    }

    fn write_summary(
        &self,
        output: &mut impl io::Write,
        accumulator: &Self::Accumulator,
    ) -> Result<(), std::io::Error> {
        let num_keys = accumulator.num_iterations();
        let num_collisions = accumulator
            .counts()
            .iter()
            .filter(|&&c| c > 1)
            .map(|&c| c as f64)
            .map(|c| c * (c - 1.0) / 2.0)
            .sum::<f64>();
        let c_hat = num_collisions / (num_keys as f64 * (num_keys as f64 - 1.0) / 2.0);
        let normalized_c_hat = c_hat * accumulator.counts().len() as f64;
        output.write_fmt(format_args!(
            ", \"num keys\": {num_keys}\
            , \"num collisions\": {num_collisions:e}\
            , \"c hat\": {c_hat:e}\
            , \"normalized c hat\": {normalized_c_hat:e}"
        ))
    }
}

/// Measures, for each bucket count `n`, the fraction of keys that move when
/// growing from `n - 1` to `n` buckets, which should be close to `1/n`.
#[derive(Clone, Debug)]
pub(crate) struct Remaps {
    max_buckets: i32,
    input_size_bytes: usize,
}

impl Remaps {
    pub(crate) fn new(max_buckets: i32, input_size_bytes: usize) -> Self {
        Self {
            max_buckets,
            input_size_bytes,
        }
    }
}

impl Experiment for Remaps {
    type Accumulator = NumRemaps;

    fn new_accumulator(&self) -> Self::Accumulator {
        NumRemaps::new(usize::try_from(self.max_buckets).unwrap())
    }

    #[inline]
    fn run(&self, accumulator: &mut Self::Accumulator, algorithm: &impl Algorithm) {
        let key = random_key(self.input_size_bytes);
        accumulator.record((1..=self.max_buckets).map(|buckets| algorithm.hash(&key, buckets)));
    }

    fn write_summary(
        &self,
        output: &mut impl io::Write,
        accumulator: &Self::Accumulator,
    ) -> Result<(), std::io::Error> {
        let num_keys = accumulator.num_iterations();
        let misplaced_remaps = accumulator.misplaced_remaps();
        // Ratio of the observed remap fraction to 1/n.
        let (min_ratio, max_ratio) = accumulator
            .remaps()
            .iter()
            .enumerate()
            .skip(2)
            .map(|(buckets, &r)| r as f64 / num_keys as f64 * buckets as f64)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), ratio| {
                (min.min(ratio), max.max(ratio))
            });
        output.write_fmt(format_args!(
            ", \"num keys\": {num_keys}\
            , \"misplaced remaps\": {misplaced_remaps}\
            , \"min remap ratio\": {min_ratio}\
            , \"max remap ratio\": {max_ratio}"
        ))
    }
}

fn chi_squared_uniformity_test_p_value(num_occurrences: &[u64]) -> f64 {
    let expected_count = num_occurrences.iter().sum::<u64>() as f64 / num_occurrences.len() as f64;

    let statistic = num_occurrences
        .iter()
        .map(|&o| (o as f64 - expected_count).powi(2) / expected_count)
        .sum::<f64>();

    let degrees_of_freedom = num_occurrences.len() as f64 - 1.0;

    1.0 - ChiSquared::new(degrees_of_freedom).unwrap().cdf(statistic)
}

#[cfg(test)]
mod tests {
    use super::{chi_squared_uniformity_test_p_value, Experiment, Regularity, Remaps};
    use crate::algo::JumpHash;

    #[test]
    fn uniform_counts_are_not_rejected() {
        assert!(chi_squared_uniformity_test_p_value(&[1000, 1000, 1000, 1000]) > 0.99);
        assert!(chi_squared_uniformity_test_p_value(&[4000, 0, 0, 0]) < 0.01);
    }

    #[test]
    fn jump_hash_is_regular() {
        let experiment = Regularity::new(8, 8);
        let accumulator = experiment.accumulate(&JumpHash, 80_000);
        let mut summary = Vec::new();
        experiment
            .write_summary(&mut summary, &accumulator)
            .unwrap();
        assert!(String::from_utf8(summary).unwrap().contains("\"num keys\": 80000"));
        assert!(accumulator.counts().iter().all(|&c| (9_000..11_000).contains(&c)));
    }

    #[test]
    fn jump_hash_only_remaps_to_the_new_bucket() {
        let accumulator = Remaps::new(200, 8).accumulate(&JumpHash, 1000);
        assert_eq!(accumulator.misplaced_remaps(), 0);
    }
}
