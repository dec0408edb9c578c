// Unless explicitly stated otherwise all files in this repository are licensed under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2024 Datadog, Inc.

const MULTIPLIER: u64 = 2862933555777941757;

/// 64-bit linear congruential generator driving the jump recurrence.
///
/// Its output must stay bit-for-bit identical to the other Jump Consistent
/// Hash implementations, so neither the constants nor the bit extraction can
/// change.
#[derive(Clone, Debug)]
pub(crate) struct LinearCongruentialGenerator {
    state: u64,
}

impl LinearCongruentialGenerator {
    #[inline]
    pub(crate) const fn new(seed: i64) -> Self {
        Self { state: seed as u64 }
    }

    /// Advances the state and returns a value of `(0, 1]`.
    ///
    /// The only exception is when the top 31 bits of the new state are all
    /// set: the 32-bit increment then wraps and the draw is `-1.0`, exactly as
    /// in the reference implementations.
    #[inline]
    pub(crate) fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(1);
        let top_bits = (self.state >> 33) as i32;
        f64::from(top_bits.wrapping_add(1)) / f64::from(1_u32 << 31)
    }
}
