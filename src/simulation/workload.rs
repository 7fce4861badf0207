//! Wait and busy-loop primitives.

use std::hint::black_box;
use std::time::Duration;

use rand::Rng;

/// Closed interval of seconds a simulated stage waits for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl WaitRange {
    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Draw a duration uniformly from the range.
    pub fn sample(&self) -> Duration {
        Duration::from_secs_f64(rand::thread_rng().gen_range(self.min_secs..=self.max_secs))
    }
}

/// Sleep for a duration drawn from `range`, returning what was slept.
pub async fn random_wait(range: WaitRange) -> Duration {
    let wait = range.sample();
    tokio::time::sleep(wait).await;
    wait
}

/// A whole number of seconds drawn uniformly from `0..=max_secs`.
pub fn random_whole_secs(max_secs: u64) -> Duration {
    Duration::from_secs(rand::thread_rng().gen_range(0..=max_secs))
}

/// Spin through `iterations` cubes. The sum only exists to keep the loop
/// from being optimized away; callers discard it.
pub fn cpu_burn(iterations: u64) -> u64 {
    let mut acc = 0u64;
    for i in 0..iterations {
        acc = acc.wrapping_add(black_box(i.wrapping_mul(i).wrapping_mul(i)));
    }
    acc
}
