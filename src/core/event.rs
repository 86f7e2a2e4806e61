use crate::{core::Ticks, sim::job::ProcessId};

#[derive(Debug, Clone, PartialEq)]
pub enum SchedCoreEvent {
    ProcessAdmitted {
        id: ProcessId,
        at: Ticks,
    },
    Dispatched {
        id: ProcessId,
        start: Ticks,
        end: Ticks,
        quantum: Ticks,
    },
    ProcessRetired {
        id: ProcessId,
        at: Ticks,
    },
    // Nothing runnable between `start` and `end`
    CpuIdle {
        start: Ticks,
        end: Ticks,
    },
}

/// Outcome of one dispatch step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub id: ProcessId,
    pub start: Ticks,
    pub quantum: Ticks,
    pub executed: Ticks,
    pub completed: bool,
}

impl Dispatch {
    pub fn end(&self) -> Ticks {
        self.start + self.executed
    }
}
