use std::fmt;

use crate::{
    core::{SchedCoreEvent, Ticks},
    error::SimError,
    sim::job::ProcessId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GanttSubject {
    Process(ProcessId),
    Idle,
}

impl fmt::Display for GanttSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Process(id) => write!(f, "P{id}"),
            Self::Idle => f.write_str("I"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GanttInterval {
    pub subject: GanttSubject,
    pub start: Ticks,
    pub end: Ticks,
}

impl GanttInterval {
    pub fn duration(&self) -> Ticks {
        self.end - self.start
    }
}

/// Ordered record of what occupied the CPU, one interval per dispatch.
/// Back-to-back idle spans are merged into one interval.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GanttChart {
    intervals: Vec<GanttInterval>,
    capacity: Option<usize>,
}

impl GanttChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: Option<usize>) -> Self {
        Self {
            intervals: Vec::new(),
            capacity,
        }
    }

    pub fn record(
        &mut self,
        subject: GanttSubject,
        start: Ticks,
        end: Ticks,
    ) -> Result<(), SimError> {
        if start >= end {
            return Ok(());
        }
        debug_assert!(
            self.intervals.last().is_none_or(|last| last.end == start),
            "Gantt interval starting at {start} leaves a gap"
        );

        if let Some(last) = self.intervals.last_mut() {
            if subject == GanttSubject::Idle && last.subject == GanttSubject::Idle {
                last.end = end;
                return Ok(());
            }
        }

        if let Some(capacity) = self.capacity {
            if self.intervals.len() >= capacity {
                return Err(SimError::GanttCapacityExceeded { capacity });
            }
        }
        self.intervals.push(GanttInterval {
            subject,
            start,
            end,
        });
        Ok(())
    }

    /// Feeds a core event into the chart; non-CPU events are ignored.
    pub fn record_event(&mut self, event: &SchedCoreEvent) -> Result<(), SimError> {
        match *event {
            SchedCoreEvent::Dispatched { id, start, end, .. } => {
                self.record(GanttSubject::Process(id), start, end)
            }
            SchedCoreEvent::CpuIdle { start, end } => self.record(GanttSubject::Idle, start, end),
            _ => Ok(()),
        }
    }

    pub fn intervals(&self) -> &[GanttInterval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn total_time(&self) -> Ticks {
        self.intervals.last().map_or(0, |last| last.end)
    }

    pub fn busy_time(&self) -> Ticks {
        self.intervals
            .iter()
            .filter(|interval| interval.subject != GanttSubject::Idle)
            .map(GanttInterval::duration)
            .sum()
    }

    /// True when the intervals tile `[0, total_time)` without gaps.
    pub fn is_contiguous(&self) -> bool {
        let starts_at_zero = self.intervals.first().is_none_or(|first| first.start == 0);
        starts_at_zero
            && self
                .intervals
                .windows(2)
                .all(|pair| pair[0].end == pair[1].start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_spans_coalesce() {
        let mut chart = GanttChart::new();
        chart.record(GanttSubject::Idle, 0, 1).unwrap();
        chart.record(GanttSubject::Idle, 1, 2).unwrap();
        chart.record(GanttSubject::Idle, 2, 5).unwrap();
        chart.record(GanttSubject::Process(1), 5, 7).unwrap();
        chart.record(GanttSubject::Idle, 7, 8).unwrap();

        assert_eq!(
            chart.intervals(),
            &[
                GanttInterval {
                    subject: GanttSubject::Idle,
                    start: 0,
                    end: 5,
                },
                GanttInterval {
                    subject: GanttSubject::Process(1),
                    start: 5,
                    end: 7,
                },
                GanttInterval {
                    subject: GanttSubject::Idle,
                    start: 7,
                    end: 8,
                },
            ]
        );
        assert!(chart.is_contiguous());
        assert_eq!(chart.total_time(), 8);
        assert_eq!(chart.busy_time(), 2);
    }

    #[test]
    fn consecutive_dispatches_stay_separate() {
        let mut chart = GanttChart::new();
        chart.record(GanttSubject::Process(2), 0, 3).unwrap();
        chart.record(GanttSubject::Process(2), 3, 4).unwrap();
        assert_eq!(chart.len(), 2);
    }

    #[test]
    fn empty_spans_are_dropped() {
        let mut chart = GanttChart::new();
        chart.record(GanttSubject::Process(1), 4, 4).unwrap();
        assert!(chart.is_empty());
        assert_eq!(chart.total_time(), 0);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut chart = GanttChart::with_capacity_limit(Some(2));
        chart.record(GanttSubject::Process(1), 0, 1).unwrap();
        chart.record(GanttSubject::Idle, 1, 2).unwrap();
        // Coalescing does not consume capacity
        chart.record(GanttSubject::Idle, 2, 3).unwrap();

        let err = chart.record(GanttSubject::Process(1), 3, 4).unwrap_err();
        assert!(matches!(err, SimError::GanttCapacityExceeded { capacity: 2 }));
        assert_eq!(chart.len(), 2);
    }

    #[test]
    fn core_events_map_to_intervals() {
        let mut chart = GanttChart::new();
        let events = [
            SchedCoreEvent::CpuIdle { start: 0, end: 2 },
            SchedCoreEvent::ProcessAdmitted { id: 4, at: 2 },
            SchedCoreEvent::Dispatched {
                id: 4,
                start: 2,
                end: 6,
                quantum: 5,
            },
            SchedCoreEvent::ProcessRetired { id: 4, at: 6 },
        ];
        for event in &events {
            chart.record_event(event).unwrap();
        }

        let subjects: Vec<String> = chart
            .intervals()
            .iter()
            .map(|i| i.subject.to_string())
            .collect();
        assert_eq!(subjects, vec!["I", "P4"]);
    }
}
