use rand::prelude::*;

use super::job::{Job, ProcessId};
use crate::core::Ticks;

/// Generates `count` jobs with staggered arrivals, reproducible per `seed`.
///
/// Fields stay inside the ranges the input parser accepts: bursts of 1..=10,
/// criticality 1..=10, priority 1..=10. About a third of the jobs have no
/// deadline and about a quarter are periodic.
pub fn random_jobs(count: usize, seed: u64) -> Vec<Job> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut arrival_time: Ticks = 0;
    let mut jobs = Vec::with_capacity(count);

    for index in 0..count {
        if index > 0 {
            arrival_time += rng.random_range(0..=3);
        }
        let burst_time = rng.random_range(1..=10);
        let deadline = if rng.random_bool(0.3) {
            0
        } else {
            arrival_time + burst_time + rng.random_range(0..=20)
        };
        let period = if rng.random_bool(0.25) {
            rng.random_range(5..=20)
        } else {
            0
        };

        jobs.push(Job {
            id: (index + 1) as ProcessId,
            arrival_time,
            burst_time,
            deadline,
            criticality: rng.random_range(1..=10),
            period,
            base_priority: rng.random_range(1..=10),
        });
    }

    jobs
}
