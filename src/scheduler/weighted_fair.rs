use super::{MIN_QUANTUM, Policy, ProcKey, SelectionKey, SimCtx, Ticks};
use crate::{config::PolicyConfig, core::Process};

pub const NICE_MIN: i32 = -20;
pub const NICE_MAX: i32 = 19;

/// Higher criticality maps to a lower nice value.
pub fn nice_for(criticality: u8) -> i32 {
    (NICE_MAX - 3 * i32::from(criticality)).clamp(NICE_MIN, NICE_MAX)
}

/// Linear approximation of the kernel's nice-to-weight table.
pub fn weight_for(criticality: u8) -> f64 {
    1024.0 / (0.8 * f64::from(nice_for(criticality)) + 1024.0)
}

fn weight_of(process: &Process) -> f64 {
    weight_for(process.job.criticality)
}

/// Virtual-runtime ordering with slices proportional to each process's
/// share of the active load.
#[derive(Debug)]
pub struct WeightedFairPolicy {
    min_granularity: f64,
    base_latency: f64,
}

/// Total weight of arrived, unfinished processes, summed in ascending order
/// so the result does not depend on run queue layout.
pub fn active_weight(ctx: &SimCtx) -> f64 {
    let mut weights: Vec<f64> = ctx.active_processes().map(weight_of).collect();
    weights.sort_unstable_by(f64::total_cmp);
    weights.into_iter().sum()
}

impl WeightedFairPolicy {

    fn target_latency(&self, active: usize) -> f64 {
        (self.min_granularity * active as f64).max(self.base_latency)
    }
}

impl Policy for WeightedFairPolicy {
    const NAME: &'static str = "CFS";

    fn init(config: &PolicyConfig, _ctx: &SimCtx) -> Self {
        Self {
            min_granularity: config.weighted_fair.min_granularity,
            base_latency: config.weighted_fair.base_latency,
        }
    }

    fn key_for(&self, ctx: &SimCtx, proc: ProcKey) -> SelectionKey {
        SelectionKey::ascending(ctx.process(proc).vruntime)
    }

    fn quantum_for(&self, ctx: &SimCtx, proc: ProcKey) -> Ticks {
        let weight = weight_of(ctx.process(proc));
        let slice = (weight / active_weight(ctx)) * self.target_latency(ctx.active_count());
        (slice.max(1.0).floor() as Ticks).max(MIN_QUANTUM)
    }

    // Heavier processes accrue virtual time more slowly
    fn on_process_ran(&mut self, ctx: &mut SimCtx, proc: ProcKey, executed: Ticks) {
        let process = ctx.process_mut(proc);
        process.vruntime += executed as f64 / weight_of(process);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::SchedCore, sim::Job};

    fn job(id: u32, burst: Ticks, criticality: u8) -> Job {
        Job {
            criticality,
            ..Job::new(id, 0, burst)
        }
    }

    fn admitted(jobs: Vec<Job>) -> SchedCore<WeightedFairPolicy> {
        let mut core = SchedCore::new(jobs, &PolicyConfig::default());
        let keys = core.ctx.keys_in_input_order().to_vec();
        for proc in keys {
            core.admit(proc);
        }
        core
    }

    #[test]
    fn nice_mapping_clamps() {
        assert_eq!(nice_for(1), 16);
        assert_eq!(nice_for(7), -2);
        assert_eq!(nice_for(10), -11);
        assert_eq!(nice_for(0), NICE_MAX);
        assert_eq!(nice_for(13), NICE_MIN);
        assert_eq!(nice_for(200), NICE_MIN);
    }

    #[test]
    fn weight_grows_with_criticality() {
        for criticality in 1..10 {
            assert!(weight_for(criticality + 1) > weight_for(criticality));
        }
        assert!((weight_for(7) - 1024.0 / (1024.0 - 1.6)).abs() < 1e-12);
    }

    #[test]
    fn heavier_process_accrues_vruntime_more_slowly() {
        let mut core = admitted(vec![job(1, 10, 9), job(2, 10, 2)]);
        let keys = core.ctx.keys_in_input_order().to_vec();
        for &proc in &keys {
            core.policy.on_process_ran(&mut core.ctx, proc, 4);
        }
        let heavy = core.ctx.process(keys[0]).vruntime;
        let light = core.ctx.process(keys[1]).vruntime;
        assert!(heavy > 0.0);
        assert!(heavy < light);
    }

    #[test]
    fn lone_process_gets_the_whole_latency_window() {
        let mut core = admitted(vec![job(1, 100, 5)]);
        let proc = core.select().unwrap();
        assert_eq!(core.policy.quantum_for(&core.ctx, proc), 20);
    }

    #[test]
    fn equal_weights_split_the_window() {
        let mut core = admitted(vec![job(1, 100, 5), job(2, 100, 5)]);
        let proc = core.select().unwrap();
        assert_eq!(core.policy.quantum_for(&core.ctx, proc), 10);
    }

    #[test]
    fn window_stretches_with_many_processes() {
        let jobs = (1..=40).map(|id| job(id, 100, 5)).collect();
        let mut core = admitted(jobs);
        let proc = core.select().unwrap();
        // 40 active processes: window is 40 ticks, an even share is 1
        assert_eq!(core.policy.quantum_for(&core.ctx, proc), 1);
    }

    #[test]
    fn total_weight_tracks_active_set() {
        let mut core = admitted(vec![job(1, 2, 5), job(2, 50, 5)]);
        assert_eq!(active_weight(&core.ctx), weight_for(5) + weight_for(5));

        // Process 1 runs to completion in its first slice
        let dispatch = core.dispatch_next().unwrap();
        assert!(dispatch.completed);
        assert_eq!(active_weight(&core.ctx), weight_for(5));

        let proc = core.select().unwrap();
        assert_eq!(core.policy.quantum_for(&core.ctx, proc), 20);
    }

    #[test]
    fn survivor_gets_full_window_after_mixed_weights_retire() {
        for criticalities in [[1, 2, 3], [1, 4, 7], [10, 3, 6]] {
            let jobs = vec![
                job(1, 2, criticalities[0]),
                job(2, 2, criticalities[1]),
                job(3, 100, criticalities[2]),
            ];
            let mut core = admitted(jobs);

            let mut alone = Vec::new();
            while !core.ctx.all_completed() {
                let was_alone = core.ctx.completed_processes() == 2;
                let dispatch = core.dispatch_next().unwrap();
                if was_alone {
                    alone.push(dispatch.quantum);
                }
            }
            assert!(!alone.is_empty());
            assert!(
                alone.iter().all(|&quantum| quantum == 20),
                "{criticalities:?}: {alone:?}"
            );
        }
    }

    #[test]
    fn lowest_vruntime_is_selected() {
        let mut core = admitted(vec![job(1, 30, 5), job(2, 30, 5)]);
        let first = core.dispatch_next().unwrap();
        assert_eq!(first.id, 1);
        let second = core.dispatch_next().unwrap();
        assert_eq!(second.id, 2);
    }
}
