use log::{debug, trace};

use super::{
    event::Dispatch,
    observer::Observer,
    state::{ProcKey, SimCtx},
};
use crate::{
    config::PolicyConfig,
    scheduler::{MIN_QUANTUM, Policy},
    sim::job::Job,
};

/// The dispatch mechanism: owns the simulated machine and asks the policy
/// which process runs next and for how long.
pub struct SchedCore<P: Policy> {
    pub ctx: SimCtx,
    pub policy: P,
    observer: Observer,
}

impl<P: Policy> SchedCore<P> {
    pub fn new(jobs: Vec<Job>, config: &PolicyConfig) -> Self {
        let ctx = SimCtx::new(jobs);
        let policy = P::init(config, &ctx);
        Self {
            ctx,
            policy,
            observer: Observer::new(),
        }
    }

    /// Moves an arrived process into the run queue.
    pub fn admit(&mut self, proc: ProcKey) {
        self.ctx.mark_runnable(proc);
        let key = self.policy.key_for(&self.ctx, proc);
        self.ctx.enqueue(proc, key);

        trace!(
            "t={} admitted process {} with key {:.4}",
            self.ctx.now,
            self.ctx.process(proc).id(),
            key.0
        );
    }

    /// Picks the next process and installs it on the CPU.
    pub fn select(&mut self) -> Option<ProcKey> {
        if self.policy.rekey_before_decision() {
            let fresh: Vec<_> = self
                .ctx
                .run_queue
                .members()
                .map(|proc| {
                    let id = self.ctx.process(proc).id();
                    (proc, id, self.policy.key_for(&self.ctx, proc))
                })
                .collect();
            self.ctx.run_queue.rekey(fresh);
        }

        let proc = self.ctx.run_queue.extract_min()?;
        self.ctx.set_running(proc);
        Some(proc)
    }

    /// Runs one dispatch step: select, size the slice, execute, then either
    /// retire the process or put it back with a fresh key.
    ///
    /// Returns `None` when nothing is runnable.
    pub fn dispatch_next(&mut self) -> Option<Dispatch> {
        let proc = self.select()?;
        let quantum = self.policy.quantum_for(&self.ctx, proc).max(MIN_QUANTUM);

        let start = self.ctx.now;
        let executed = self.ctx.process_mut(proc).dispatch(start, quantum);
        self.policy.on_process_ran(&mut self.ctx, proc, executed);
        self.ctx.advance_time(executed);
        self.ctx.clear_current();

        let process = self.ctx.process(proc);
        let id = process.id();
        let completed = process.remaining_time == 0;
        debug!(
            "t={start} dispatch process {id}: quantum {quantum}, ran {executed}, {} left",
            process.remaining_time
        );

        if completed {
            // Still flagged Running until mark_completed
            self.ctx.mark_completed(proc);
            self.policy.on_process_retired(&self.ctx, proc);
            trace!("t={} retired process {id}", self.ctx.now);
        } else {
            self.ctx.mark_runnable(proc);
            let key = self.policy.key_for(&self.ctx, proc);
            self.ctx.enqueue(proc, key);
        }

        self.observer.observe(&self.ctx);

        Some(Dispatch {
            id,
            start,
            quantum,
            executed,
            completed,
        })
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}
