pub(crate) trait Accumulator {
    fn num_iterations(&self) -> u64;

    fn merge(&mut self, other: &Self);
}

/// Number of keys hashed to each bucket.
#[derive(Clone, Debug)]
pub(crate) struct NumOccurrences {
    counts: Vec<u64>,
    num_iterations: u64,
}

impl NumOccurrences {
    pub(crate) fn new(num_buckets: usize) -> Self {
        Self {
            counts: vec![0; num_buckets],
            num_iterations: 0,
        }
    }

    #[inline]
    pub(crate) fn record(&mut self, bucket: i32) {
        self.counts[bucket as usize] += 1;
        self.num_iterations += 1;
    }

    pub(crate) fn counts(&self) -> &[u64] {
        &self.counts
    }
}

impl Accumulator for NumOccurrences {
    fn num_iterations(&self) -> u64 {
        self.num_iterations
    }

    fn merge(&mut self, other: &Self) {
        assert_eq!(self.counts.len(), other.counts.len());
        self.counts
            .iter_mut()
            .zip(&other.counts)
            .for_each(|(c, o)| *c += o);
        self.num_iterations += other.num_iterations;
    }
}

/// Number of keys remapped when growing to each bucket count, and number of
/// remaps that did not land on the new bucket.
#[derive(Clone, Debug)]
pub(crate) struct NumRemaps {
    // Indexed by bucket count.
    remaps: Vec<u64>,
    misplaced_remaps: u64,
    num_iterations: u64,
}

impl NumRemaps {
    pub(crate) fn new(max_buckets: usize) -> Self {
        Self {
            remaps: vec![0; max_buckets + 1],
            misplaced_remaps: 0,
            num_iterations: 0,
        }
    }

    /// Records the buckets of a single key for bucket counts `1, 2, 3, ...`.
    pub(crate) fn record(&mut self, buckets: impl IntoIterator<Item = i32>) {
        let mut last = 0;
        for (num_buckets, bucket) in (1..).zip(buckets) {
            if bucket != last {
                self.remaps[num_buckets as usize] += 1;
                if bucket != num_buckets - 1 {
                    self.misplaced_remaps += 1;
                }
                last = bucket;
            }
        }
        self.num_iterations += 1;
    }

    pub(crate) fn remaps(&self) -> &[u64] {
        &self.remaps
    }

    pub(crate) fn misplaced_remaps(&self) -> u64 {
        self.misplaced_remaps
    }
}

impl Accumulator for NumRemaps {
    fn num_iterations(&self) -> u64 {
        self.num_iterations
    }

    fn merge(&mut self, other: &Self) {
        assert_eq!(self.remaps.len(), other.remaps.len());
        self.remaps
            .iter_mut()
            .zip(&other.remaps)
            .for_each(|(r, o)| *r += o);
        self.misplaced_remaps += other.misplaced_remaps;
        self.num_iterations += other.num_iterations;
    }
}

#[cfg(test)]
mod tests {
    use super::{Accumulator, NumOccurrences, NumRemaps};

    #[test]
    fn merged_occurrences() {
        let mut acc = NumOccurrences::new(3);
        acc.record(0);
        acc.record(2);
        let mut other = NumOccurrences::new(3);
        other.record(2);
        acc.merge(&other);
        assert_eq!(acc.counts(), &[1, 0, 2]);
        assert_eq!(acc.num_iterations(), 3);
    }

    #[test]
    fn remaps_are_counted_per_bucket_count() {
        let mut acc = NumRemaps::new(4);
        acc.record([0, 1, 1, 3]);
        acc.record([0, 0, 2, 1]);
        assert_eq!(acc.remaps(), &[0, 0, 1, 1, 2]);
        assert_eq!(acc.misplaced_remaps(), 1);
        assert_eq!(acc.num_iterations(), 2);
    }
}
