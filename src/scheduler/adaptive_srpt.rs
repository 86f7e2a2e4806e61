use average::Mean;

use super::{MIN_QUANTUM, Policy, ProcKey, SelectionKey, SimCtx, Ticks};
use crate::config::PolicyConfig;

/// Shortest remaining time first. One quantum is shared by the whole ready
/// set per decision: the rounded midpoint of the mean and median remaining
/// times.
#[derive(Debug, Default)]
pub struct AdaptiveSrptPolicy;

pub fn shared_quantum(remaining: impl IntoIterator<Item = Ticks>) -> Ticks {
    let mut times: Vec<Ticks> = remaining.into_iter().collect();
    if times.is_empty() {
        return MIN_QUANTUM;
    }
    times.sort_unstable();

    let mean = times
        .iter()
        .map(|&t| t as f64)
        .collect::<Mean>()
        .mean();
    let mid = times.len() / 2;
    let median = if times.len() % 2 == 0 {
        (times[mid - 1] + times[mid]) as f64 / 2.0
    } else {
        times[mid] as f64
    };

    (((mean + median) / 2.0).round() as Ticks).max(MIN_QUANTUM)
}

impl Policy for AdaptiveSrptPolicy {
    const NAME: &'static str = "Adaptive SRPT";

    fn init(_config: &PolicyConfig, _ctx: &SimCtx) -> Self {
        Self
    }

    fn key_for(&self, ctx: &SimCtx, proc: ProcKey) -> SelectionKey {
        SelectionKey::from(ctx.process(proc).remaining_time)
    }

    fn quantum_for(&self, ctx: &SimCtx, _proc: ProcKey) -> Ticks {
        shared_quantum(ctx.active_processes().map(|p| p.remaining_time))
    }
}
