use super::{MIN_QUANTUM, Policy, ProcKey, SelectionKey, SimCtx, Ticks};
use crate::{
    config::{DynamicPriorityConfig, PolicyConfig},
    core::Process,
};

/// Multi-factor priority with a time quantum that grows with priority and
/// shrinks under load.
///
/// Priority is a weighted sum of four components in `[0, 1]`: criticality,
/// deadline urgency, aging and manual priority. Both priority and quantum
/// depend on the clock, so queued keys are refreshed before every decision.
#[derive(Debug)]
pub struct DynamicPriorityPolicy {
    config: DynamicPriorityConfig,
}

impl DynamicPriorityPolicy {
    pub fn new(config: DynamicPriorityConfig) -> Self {
        Self { config }
    }

    pub fn priority(&self, process: &Process, now: Ticks) -> f64 {
        let c = &self.config;
        c.criticality_weight * criticality_component(process)
            + c.deadline_weight * deadline_component(process, now)
            + c.aging_weight * self.aging_component(process, now)
            + c.priority_weight * manual_component(process)
    }

    fn aging_component(&self, process: &Process, now: Ticks) -> f64 {
        (process.waited_so_far(now) as f64 / self.config.aging_horizon).min(1.0)
    }
}

fn criticality_component(process: &Process) -> f64 {
    (f64::from(process.job.criticality) / 10.0).clamp(0.0, 1.0)
}

fn deadline_component(process: &Process, now: Ticks) -> f64 {
    if !process.job.has_deadline() {
        return 0.0;
    }
    match process.job.deadline.checked_sub(now) {
        Some(0) | None => 1.0,
        Some(time_to_deadline) => 1.0 / (1.0 + time_to_deadline as f64),
    }
}

fn manual_component(process: &Process) -> f64 {
    (f64::from(process.job.base_priority) / 10.0).clamp(0.0, 1.0)
}

impl Policy for DynamicPriorityPolicy {
    const NAME: &'static str = "DPS-DTQ";

    fn init(config: &PolicyConfig, _ctx: &SimCtx) -> Self {
        Self::new(config.dynamic_priority.clone())
    }

    fn key_for(&self, ctx: &SimCtx, proc: ProcKey) -> SelectionKey {
        SelectionKey::descending(self.priority(ctx.process(proc), ctx.now))
    }

    fn quantum_for(&self, ctx: &SimCtx, proc: ProcKey) -> Ticks {
        let priority = self.priority(ctx.process(proc), ctx.now);
        let load_factor = ctx.active_count() as f64 / ctx.total_processes() as f64;
        let quantum = self.config.base_quantum * (1.0 + priority) * (1.0 - 0.5 * load_factor);
        (quantum.floor() as Ticks).max(MIN_QUANTUM)
    }

    fn rekey_before_decision(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::SchedCore, sim::Job};

    fn policy() -> DynamicPriorityPolicy {
        DynamicPriorityPolicy::new(DynamicPriorityConfig::default())
    }

    fn process(job: Job) -> Process {
        Process::new(job)
    }

    #[test]
    fn deadline_urgency() {
        let mut job = Job::new(1, 0, 5);
        assert_eq!(deadline_component(&process(job.clone()), 3), 0.0);

        job.deadline = 10;
        let p = process(job);
        assert_eq!(deadline_component(&p, 10), 1.0);
        assert_eq!(deadline_component(&p, 12), 1.0);
        assert_eq!(deadline_component(&p, 6), 0.2);
    }

    #[test]
    fn aging_saturates() {
        let policy = policy();
        let p = process(Job::new(1, 0, 5));
        assert_eq!(policy.aging_component(&p, 0), 0.0);
        assert_eq!(policy.aging_component(&p, 4), 0.4);
        assert_eq!(policy.aging_component(&p, 30), 1.0);
    }

    #[test]
    fn priority_combines_weighted_components() {
        let policy = policy();
        let job = Job {
            deadline: 20,
            criticality: 7,
            base_priority: 5,
            ..Job::new(1, 0, 8)
        };
        // criticality 0.7, urgency 1/21, aging 0, manual 0.5
        let expected = 0.35 * 0.7 + 0.30 / 21.0 + 0.10 * 0.5;
        assert!((policy.priority(&process(job), 0) - expected).abs() < 1e-12);
    }

    #[test]
    fn manual_priority_is_clamped() {
        let high = process(Job {
            base_priority: 19,
            ..Job::new(1, 0, 1)
        });
        let low = process(Job {
            base_priority: -20,
            ..Job::new(2, 0, 1)
        });
        assert_eq!(manual_component(&high), 1.0);
        assert_eq!(manual_component(&low), 0.0);
    }

    #[test]
    fn highest_priority_runs_first() {
        let jobs = vec![
            Job {
                criticality: 2,
                ..Job::new(1, 0, 5)
            },
            Job {
                criticality: 9,
                ..Job::new(2, 0, 5)
            },
        ];
        let mut core = SchedCore::<DynamicPriorityPolicy>::new(jobs, &PolicyConfig::default());
        let keys = core.ctx.keys_in_input_order().to_vec();
        for proc in keys {
            core.admit(proc);
        }
        assert_eq!(core.dispatch_next().unwrap().id, 2);
    }

    #[test]
    fn quantum_shrinks_under_load() {
        let jobs = (1..=4)
            .map(|id| Job {
                criticality: 10,
                base_priority: 10,
                ..Job::new(id, 0, 50)
            })
            .collect();
        let mut core = SchedCore::<DynamicPriorityPolicy>::new(jobs, &PolicyConfig::default());
        let keys = core.ctx.keys_in_input_order().to_vec();

        core.admit(keys[0]);
        let proc = core.select().unwrap();
        // priority 0.45, load 1/4: 4 * 1.45 * 0.875 = 5.075
        assert_eq!(core.policy.quantum_for(&core.ctx, proc), 5);

        core.ctx.clear_current();
        core.ctx.mark_runnable(proc);
        let key = core.policy.key_for(&core.ctx, proc);
        core.ctx.enqueue(proc, key);
        for &other in &keys[1..] {
            core.admit(other);
        }
        let proc = core.select().unwrap();
        // load 4/4: 4 * 1.45 * 0.5 = 2.9
        assert_eq!(core.policy.quantum_for(&core.ctx, proc), 2);
    }

    #[test]
    fn aging_lets_a_waiting_process_overtake() {
        let jobs = vec![
            Job {
                criticality: 5,
                ..Job::new(1, 0, 40)
            },
            Job {
                criticality: 4,
                ..Job::new(2, 0, 4)
            },
        ];
        let mut core = SchedCore::<DynamicPriorityPolicy>::new(jobs, &PolicyConfig::default());
        let keys = core.ctx.keys_in_input_order().to_vec();
        for proc in keys {
            core.admit(proc);
        }

        // 0.175 against 0.14; process 1 gets a 2-tick slice
        assert_eq!(core.dispatch_next().unwrap().id, 1);
        // Process 2 has aged by 2 ticks: 0.14 + 0.05 beats 0.175
        assert_eq!(core.dispatch_next().unwrap().id, 2);
    }
}
