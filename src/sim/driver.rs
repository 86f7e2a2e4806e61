use log::{info, trace};
use rustc_hash::FxHashSet;

use super::job::Job;
use crate::{
    config::{PolicyConfig, PolicyKind},
    core::{Process, ProcKey, SchedCore, SchedCoreEvent, Ticks},
    error::SimError,
    gantt::GanttChart,
    metrics::Metrics,
    scheduler::{AdaptiveSrptPolicy, DynamicPriorityPolicy, Policy, WeightedFairPolicy},
};

/// Everything a finished run produces.
#[derive(Debug, Clone)]
pub struct SimOutcome {
    pub policy: PolicyKind,
    /// Final process states, in input order.
    pub processes: Vec<Process>,
    pub gantt: GanttChart,
    pub metrics: Metrics,
    pub total_time: Ticks,
}

/// Drives arrivals into a `SchedCore` and records what the CPU did.
pub struct Sim<P: Policy> {
    pub core: SchedCore<P>,
    // Sorted by (arrival_time, id)
    arrivals: Vec<ProcKey>,
    arrival_cursor: usize,
    gantt: GanttChart,
    starvation_threshold: Ticks,
}

impl<P: Policy> Sim<P> {
    pub fn new(jobs: Vec<Job>, config: &PolicyConfig) -> Self {
        let core = SchedCore::<P>::new(jobs, config);

        let mut arrivals = core.ctx.keys_in_input_order().to_vec();
        arrivals.sort_by_key(|&proc| {
            let job = &core.ctx.process(proc).job;
            (job.arrival_time, job.id)
        });

        Self {
            core,
            arrivals,
            arrival_cursor: 0,
            gantt: GanttChart::with_capacity_limit(config.max_gantt_intervals),
            starvation_threshold: config.starvation_threshold,
        }
    }

    pub fn now(&self) -> Ticks {
        self.core.ctx.now
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.core.ctx.all_completed()
    }

    pub fn gantt(&self) -> &GanttChart {
        &self.gantt
    }

    /// Advances the simulation by one decision: admit arrivals, then either
    /// dispatch a process or idle until the next arrival.
    pub fn step(&mut self) -> Vec<SchedCoreEvent> {
        let mut events = self.handle_arrivals();
        if self.all_jobs_completed() {
            return events;
        }

        match self.core.dispatch_next() {
            Some(dispatch) => {
                events.push(SchedCoreEvent::Dispatched {
                    id: dispatch.id,
                    start: dispatch.start,
                    end: dispatch.end(),
                    quantum: dispatch.quantum,
                });
                if dispatch.completed {
                    events.push(SchedCoreEvent::ProcessRetired {
                        id: dispatch.id,
                        at: dispatch.end(),
                    });
                }
            }
            None => {
                let now = self.now();
                let Some(next) = self.next_arrival() else {
                    debug_assert!(false, "Run queue empty with no arrivals pending");
                    return events;
                };
                trace!("t={now} idle until {next}");
                self.core.ctx.advance_time(next.saturating_sub(now));
                events.push(SchedCoreEvent::CpuIdle {
                    start: now,
                    end: next,
                });
            }
        }

        events
    }

    /// Admits every job that has arrived by now, including those that
    /// arrived while the previous slice was running.
    fn handle_arrivals(&mut self) -> Vec<SchedCoreEvent> {
        let now = self.now();
        let mut events = Vec::new();

        while let Some(&proc) = self.arrivals.get(self.arrival_cursor) {
            let job = &self.core.ctx.process(proc).job;
            if job.arrival_time > now {
                break;
            }
            events.push(SchedCoreEvent::ProcessAdmitted {
                id: job.id,
                at: job.arrival_time,
            });
            self.core.admit(proc);
            self.arrival_cursor += 1;
        }

        events
    }

    fn next_arrival(&self) -> Option<Ticks> {
        self.arrivals
            .get(self.arrival_cursor)
            .map(|&proc| self.core.ctx.process(proc).job.arrival_time)
    }

    /// Runs to completion and computes the metrics.
    pub fn run(mut self, policy: PolicyKind) -> Result<SimOutcome, SimError> {
        info!(
            "{}: simulating {} processes",
            P::NAME,
            self.core.ctx.total_processes()
        );

        while !self.all_jobs_completed() {
            let events = self.step();
            if events.is_empty() {
                break;
            }
            for event in &events {
                self.gantt.record_event(event)?;
            }
        }

        let total_time = self.now();
        let dispatches = self.core.observer().steps();
        let processes = self.core.ctx.into_processes();
        let metrics = Metrics::from_processes(&processes, total_time, self.starvation_threshold);
        info!(
            "{}: finished at t={total_time} after {dispatches} dispatches",
            P::NAME
        );

        Ok(SimOutcome {
            policy,
            processes,
            gantt: self.gantt,
            metrics,
            total_time,
        })
    }
}

/// Rejects workloads the event loop cannot run.
pub fn validate_jobs(jobs: &[Job]) -> Result<(), SimError> {
    if jobs.is_empty() {
        return Err(SimError::EmptyWorkload);
    }

    let mut seen = FxHashSet::default();
    let mut total_burst: Ticks = 0;
    let mut latest_arrival: Ticks = 0;
    for job in jobs {
        if job.burst_time == 0 {
            return Err(SimError::ZeroBurst { id: job.id });
        }
        if !(1..=10).contains(&job.criticality) {
            return Err(SimError::CriticalityOutOfRange {
                id: job.id,
                criticality: job.criticality,
            });
        }
        if !seen.insert(job.id) {
            return Err(SimError::DuplicateProcessId(job.id));
        }
        total_burst = total_burst
            .checked_add(job.burst_time)
            .ok_or(SimError::HorizonOverflow)?;
        latest_arrival = latest_arrival.max(job.arrival_time);
    }

    // Every completion happens no later than this
    latest_arrival
        .checked_add(total_burst)
        .map(|_| ())
        .ok_or(SimError::HorizonOverflow)
}

/// Replays `jobs` under `policy` and returns the final process states, the
/// gantt intervals and the metrics.
pub fn simulate(
    jobs: Vec<Job>,
    policy: PolicyKind,
    config: &PolicyConfig,
) -> Result<SimOutcome, SimError> {
    config.validate()?;
    validate_jobs(&jobs)?;

    match policy {
        PolicyKind::WeightedFair => Sim::<WeightedFairPolicy>::new(jobs, config).run(policy),
        PolicyKind::DynamicPriority => Sim::<DynamicPriorityPolicy>::new(jobs, config).run(policy),
        PolicyKind::AdaptiveSrpt => Sim::<AdaptiveSrptPolicy>::new(jobs, config).run(policy),
    }
}
