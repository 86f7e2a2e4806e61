use crate::core::state::Ticks;

pub type ProcessId = u32;

/// Static description of one job, as read from an input file.
///
/// `deadline` is an absolute simulated time (0 = none) and `period` is
/// informational (0 = aperiodic). `base_priority` is the niceness or manual
/// priority column, interpreted by the policy that reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: ProcessId,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub deadline: Ticks,
    pub criticality: u8,
    pub period: Ticks,
    pub base_priority: i32,
}

impl Job {
    pub fn new(id: ProcessId, arrival_time: Ticks, burst_time: Ticks) -> Self {
        Self {
            id,
            arrival_time,
            burst_time,
            deadline: 0,
            criticality: 5,
            period: 0,
            base_priority: 0,
        }
    }

    /// Builds a job from the seven-column record
    /// `(id, arrival, burst, deadline, criticality, period, priority)`.
    pub fn from_record(
        (id, arrival_time, burst_time, deadline, criticality, period, base_priority): (
            ProcessId,
            Ticks,
            Ticks,
            Ticks,
            u8,
            Ticks,
            i32,
        ),
    ) -> Self {
        Self {
            id,
            arrival_time,
            burst_time,
            deadline,
            criticality,
            period,
            base_priority,
        }
    }

    pub fn has_deadline(&self) -> bool {
        self.deadline > 0
    }
}
