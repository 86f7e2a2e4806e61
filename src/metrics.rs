use average::{Mean, Variance};

use crate::core::{Process, Ticks};

/// Per-process timings a finished run yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessTimes {
    pub turnaround: Ticks,
    pub waiting: Ticks,
    pub response: Ticks,
}

impl ProcessTimes {
    /// `None` until the process has completed.
    pub fn of(process: &Process) -> Option<Self> {
        Some(Self {
            turnaround: process.turnaround()?,
            waiting: process.waiting()?,
            response: process.response()?,
        })
    }
}

/// Aggregate scheduling metrics over one run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metrics {
    pub avg_turnaround: f64,
    pub avg_waiting: f64,
    pub avg_response: f64,
    pub throughput: f64,
    /// Jain's index over turnaround times; 0 when every turnaround is 0.
    pub fairness: f64,
    pub starvation_count: usize,
    /// `1 / (1 + cv(waiting))`; 1 when nobody waited.
    pub load_balancing_efficiency: f64,
}

impl Metrics {
    /// An empty set of processes yields all-zero metrics.
    pub fn compute(times: &[ProcessTimes], total_time: Ticks, starvation_threshold: Ticks) -> Self {
        if times.is_empty() {
            return Self::default();
        }

        let turnaround = || times.iter().map(|t| t.turnaround as f64);
        let waiting = || times.iter().map(|t| t.waiting as f64);

        Self {
            avg_turnaround: turnaround().collect::<Mean>().mean(),
            avg_waiting: waiting().collect::<Mean>().mean(),
            avg_response: times
                .iter()
                .map(|t| t.response as f64)
                .collect::<Mean>()
                .mean(),
            throughput: if total_time == 0 {
                0.0
            } else {
                times.len() as f64 / total_time as f64
            },
            fairness: jain_fairness(turnaround()),
            starvation_count: times
                .iter()
                .filter(|t| t.waiting > starvation_threshold)
                .count(),
            load_balancing_efficiency: load_balancing_efficiency(waiting()),
        }
    }

    /// Unfinished processes are skipped.
    pub fn from_processes(
        processes: &[Process],
        total_time: Ticks,
        starvation_threshold: Ticks,
    ) -> Self {
        let times: Vec<ProcessTimes> = processes.iter().filter_map(ProcessTimes::of).collect();
        Self::compute(&times, total_time, starvation_threshold)
    }
}

/// `(Σx)² / (n·Σx²)`, in `[1/n, 1]` for non-negative input. Returns 0 when
/// the sum of squares is 0.
pub fn jain_fairness(values: impl IntoIterator<Item = f64>) -> f64 {
    let (n, sum, sum_sq) = values
        .into_iter()
        .fold((0usize, 0.0, 0.0), |(n, sum, sum_sq), x| {
            (n + 1, sum + x, sum_sq + x * x)
        });
    if n == 0 || sum_sq == 0.0 {
        return 0.0;
    }
    (sum * sum) / (n as f64 * sum_sq)
}

/// `1 / (1 + stddev/mean)` over population statistics; 1 when the mean is 0.
pub fn load_balancing_efficiency(waiting: impl IntoIterator<Item = f64>) -> f64 {
    let stats: Variance = waiting.into_iter().collect();
    let mean = stats.mean();
    if stats.len() == 0 || mean == 0.0 {
        return 1.0;
    }
    let std_dev = stats.population_variance().max(0.0).sqrt();
    1.0 / (1.0 + std_dev / mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times(rows: &[(Ticks, Ticks, Ticks)]) -> Vec<ProcessTimes> {
        rows.iter()
            .map(|&(turnaround, waiting, response)| ProcessTimes {
                turnaround,
                waiting,
                response,
            })
            .collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn averages_and_throughput() {
        let metrics = Metrics::compute(&times(&[(8, 0, 0), (10, 6, 2), (4, 2, 2)]), 14, 20);
        assert!(close(metrics.avg_turnaround, 22.0 / 3.0));
        assert!(close(metrics.avg_waiting, 8.0 / 3.0));
        assert!(close(metrics.avg_response, 4.0 / 3.0));
        assert!(close(metrics.throughput, 3.0 / 14.0));
        assert_eq!(metrics.starvation_count, 0);
    }

    #[test]
    fn fairness_bounds() {
        assert!(close(jain_fairness([5.0, 5.0, 5.0]), 1.0));
        assert!(close(jain_fairness([9.0, 0.0, 0.0]), 1.0 / 3.0));
        let mixed = jain_fairness([1.0, 4.0, 9.0, 2.0]);
        assert!(mixed > 0.25 && mixed < 1.0);
    }

    #[test]
    fn fairness_of_all_zero_is_zero() {
        assert_eq!(jain_fairness([0.0, 0.0]), 0.0);
        assert_eq!(jain_fairness(std::iter::empty()), 0.0);
    }

    #[test]
    fn efficiency_special_cases_zero_mean() {
        assert_eq!(load_balancing_efficiency([0.0, 0.0, 0.0]), 1.0);
        assert_eq!(load_balancing_efficiency([3.0, 3.0]), 1.0);
    }

    #[test]
    fn efficiency_uses_population_deviation() {
        // mean 2, population stddev 2
        assert!(close(load_balancing_efficiency([0.0, 4.0]), 0.5));
    }

    #[test]
    fn starvation_is_strictly_above_threshold() {
        let metrics = Metrics::compute(&times(&[(30, 20, 0), (40, 21, 0), (5, 0, 0)]), 60, 20);
        assert_eq!(metrics.starvation_count, 1);
    }

    #[test]
    fn empty_input_is_all_zero() {
        assert_eq!(Metrics::compute(&[], 0, 20), Metrics::default());
    }
}
