use keyed_priority_queue::KeyedPriorityQueue;
use slotmap::{SlotMap, new_key_type};
use std::cmp::Ordering;

use crate::sim::job::{Job, ProcessId};

pub type Ticks = u64;
new_key_type! {
    /// Handle into the process arena. The run queue stores these, never copies.
    pub struct ProcKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    // Not yet arrived
    Pending,
    Runnable,
    Running,
    Completed,
}

/// One job plus its mutable simulation state.
#[derive(Debug, Clone)]
pub struct Process {
    pub job: Job,
    pub state: ProcessState,
    pub remaining_time: Ticks,
    /// Weight-normalized CPU time; only the weighted-fair policy advances it.
    pub vruntime: f64,
    pub first_dispatch_time: Option<Ticks>,
    pub completion_time: Option<Ticks>,
}

impl Process {
    pub fn new(job: Job) -> Self {
        Self {
            remaining_time: job.burst_time,
            job,
            state: ProcessState::Pending,
            vruntime: 0.0,
            first_dispatch_time: None,
            completion_time: None,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.job.id
    }

    pub fn has_started(&self) -> bool {
        self.first_dispatch_time.is_some()
    }

    /// Runs the process for up to `quantum` ticks starting at `now` and
    /// returns the ticks actually executed.
    pub fn dispatch(&mut self, now: Ticks, quantum: Ticks) -> Ticks {
        debug_assert!(quantum > 0, "Process {} dispatched with empty quantum", self.id());
        debug_assert!(
            self.remaining_time > 0,
            "Process {} dispatched with no remaining work",
            self.id()
        );

        let executed = quantum.min(self.remaining_time);
        if self.first_dispatch_time.is_none() {
            self.first_dispatch_time = Some(now);
        }
        self.remaining_time -= executed;
        if self.remaining_time == 0 {
            self.completion_time = Some(now.saturating_add(executed));
        }
        executed
    }

    /// Time spent ready but not running up to `now`.
    pub fn waited_so_far(&self, now: Ticks) -> Ticks {
        let served = self.job.burst_time - self.remaining_time;
        now.saturating_sub(self.job.arrival_time)
            .saturating_sub(served)
    }

    pub fn turnaround(&self) -> Option<Ticks> {
        self.completion_time
            .map(|done| done - self.job.arrival_time)
    }

    pub fn waiting(&self) -> Option<Ticks> {
        self.turnaround()
            .map(|turnaround| turnaround - self.job.burst_time)
    }

    pub fn response(&self) -> Option<Ticks> {
        self.first_dispatch_time
            .map(|start| start - self.job.arrival_time)
    }

    /// `None` when the job has no deadline or has not finished yet.
    pub fn met_deadline(&self) -> Option<bool> {
        if !self.job.has_deadline() {
            return None;
        }
        self.completion_time
            .map(|done| done <= self.job.deadline)
    }
}

/// Ordering key produced by a policy. Smaller keys run first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionKey(pub f64);

impl SelectionKey {
    pub fn ascending(value: f64) -> Self {
        Self(value)
    }

    pub fn descending(value: f64) -> Self {
        Self(-value)
    }
}

impl From<Ticks> for SelectionKey {
    fn from(ticks: Ticks) -> Self {
        Self(ticks as f64)
    }
}

/// Heap priority of a queued process: the policy key, ties broken by the
/// lowest process id.
#[derive(Debug, Clone, Copy)]
struct Rank {
    key: SelectionKey,
    id: ProcessId,
}

// KeyedPriorityQueue is a max-heap, so the smallest (key, id) must compare greatest
impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .0
            .total_cmp(&self.key.0)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Rank {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Rank {}

/// The selection structure: every arrived, unfinished, not-running process.
///
/// Backed by a binary heap, so insert and extract are O(log m) whatever
/// order the keys arrive in.
#[derive(Debug)]
pub struct RunQueue {
    entries: KeyedPriorityQueue<ProcKey, Rank>,
}

impl RunQueue {
    pub fn new() -> Self {
        Self {
            entries: KeyedPriorityQueue::new(),
        }
    }

    pub fn insert(&mut self, proc: ProcKey, id: ProcessId, key: SelectionKey) {
        let previous = self.entries.push(proc, Rank { key, id });
        debug_assert!(previous.is_none(), "Process {id} already present in run queue");
    }

    pub fn extract_min(&mut self) -> Option<ProcKey> {
        self.entries.pop().map(|(proc, _)| proc)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, proc: ProcKey) -> bool {
        self.entries.get_priority(&proc).is_some()
    }

    pub fn members(&self) -> impl Iterator<Item = ProcKey> + '_ {
        self.entries.iter().map(|(proc, _)| *proc)
    }

    /// Replaces the keys of queued processes in place.
    pub fn rekey(&mut self, fresh: impl IntoIterator<Item = (ProcKey, ProcessId, SelectionKey)>) {
        for (proc, id, key) in fresh {
            let updated = self.entries.set_priority(&proc, Rank { key, id });
            debug_assert!(updated.is_ok(), "Rekeying process {id}, which is not queued");
        }
    }
}

impl Default for RunQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulated machine: the clock, the process arena, the run queue and the
/// single CPU's current occupant.
#[derive(Debug)]
pub struct SimCtx {
    pub now: Ticks,
    pub processes: SlotMap<ProcKey, Process>,
    pub run_queue: RunQueue,
    pub current: Option<ProcKey>,

    // Input order, used to hand results back the way they came in
    order: Vec<ProcKey>,
    completed: usize,
}

impl SimCtx {
    pub fn new(jobs: Vec<Job>) -> Self {
        let mut processes = SlotMap::with_capacity_and_key(jobs.len());
        let order = jobs
            .into_iter()
            .map(|job| processes.insert(Process::new(job)))
            .collect();

        Self {
            now: 0,
            processes,
            run_queue: RunQueue::new(),
            current: None,
            order,
            completed: 0,
        }
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    pub fn process(&self, proc: ProcKey) -> &Process {
        &self.processes[proc]
    }

    pub fn process_mut(&mut self, proc: ProcKey) -> &mut Process {
        &mut self.processes[proc]
    }

    pub fn keys_in_input_order(&self) -> &[ProcKey] {
        &self.order
    }

    pub fn total_processes(&self) -> usize {
        self.order.len()
    }

    pub fn completed_processes(&self) -> usize {
        self.completed
    }

    pub fn all_completed(&self) -> bool {
        self.completed == self.order.len()
    }

    /// Arrived and unfinished: everything queued plus the running process.
    pub fn active_processes(&self) -> impl Iterator<Item = &Process> + '_ {
        self.run_queue
            .members()
            .chain(self.current)
            .map(|proc| &self.processes[proc])
    }

    pub fn active_count(&self) -> usize {
        self.run_queue.len() + usize::from(self.current.is_some())
    }

    pub fn enqueue(&mut self, proc: ProcKey, key: SelectionKey) {
        let process = &self.processes[proc];
        debug_assert!(
            process.state == ProcessState::Runnable,
            "Process {} must be Runnable when enqueued",
            process.id()
        );
        self.run_queue.insert(proc, process.id(), key);
    }

    pub fn mark_runnable(&mut self, proc: ProcKey) {
        let process = self.process_mut(proc);
        debug_assert!(
            process.state != ProcessState::Completed,
            "Completed process {} cannot be runnable",
            process.id()
        );
        process.state = ProcessState::Runnable;
    }

    pub fn set_running(&mut self, proc: ProcKey) {
        debug_assert!(
            !self.run_queue.contains(proc),
            "Running process must not be enqueued"
        );
        debug_assert!(self.current.is_none(), "CPU already running a process");

        self.current = Some(proc);
        self.process_mut(proc).state = ProcessState::Running;
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }

    pub fn mark_completed(&mut self, proc: ProcKey) {
        debug_assert!(
            !self.run_queue.contains(proc),
            "Completing a process that is still enqueued"
        );

        let process = self.process_mut(proc);
        debug_assert!(
            process.state == ProcessState::Running && process.remaining_time == 0,
            "Process {} must have been running to completion",
            process.id()
        );
        process.state = ProcessState::Completed;
        self.completed += 1;
    }

    /// Consumes the context, returning processes in input order.
    pub fn into_processes(mut self) -> Vec<Process> {
        self.order
            .iter()
            .filter_map(|&proc| self.processes.remove(proc))
            .collect()
    }
}
