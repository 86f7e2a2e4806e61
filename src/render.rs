//! Text renderings of a finished run: gantt chart and CSV tables.

use std::fmt::Write as _;

use crate::{
    core::Process,
    gantt::{GanttChart, GanttSubject},
    metrics::Metrics,
    sim::SimOutcome,
};

/// Three-row ASCII chart, two columns per tick, with time markers below.
pub fn gantt_chart(chart: &GanttChart) -> String {
    let intervals = chart.intervals();
    if intervals.is_empty() {
        return String::from("(empty)\n");
    }

    let mut border = String::from(" ");
    for interval in intervals {
        border.push_str(&"--".repeat(interval.duration() as usize));
        border.push(' ');
    }

    let mut labels = String::from("|");
    for interval in intervals {
        let label = match interval.subject {
            GanttSubject::Process(id) => format!("P{id}"),
            GanttSubject::Idle => String::from("I "),
        };
        let cells = vec![label; interval.duration() as usize];
        labels.push_str(&cells.join(" "));
        labels.push('|');
    }

    let mut markers = String::new();
    for interval in intervals {
        let _ = write!(markers, "{:2}", interval.start);
        let gap = (interval.duration() * 2).saturating_sub(1) as usize;
        markers.push_str(&" ".repeat(gap));
    }
    let _ = write!(markers, "{:2}", chart.total_time());

    format!("{border}\n{labels}\n{border}\n{markers}\n")
}

pub fn process_table(processes: &[Process]) -> String {
    let mut out = String::from(
        "ProcessID,ArrivalTime,BurstTime,CompletionTime,TurnaroundTime,WaitingTime,\
         ResponseTime,Deadline,Criticality,Period,Priority,DeadlineMet\n",
    );
    for process in processes {
        let job = &process.job;
        let met = match process.met_deadline() {
            Some(true) => "yes",
            Some(false) => "no",
            None => "-",
        };
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            job.id,
            job.arrival_time,
            job.burst_time,
            process.completion_time.unwrap_or(0),
            process.turnaround().unwrap_or(0),
            process.waiting().unwrap_or(0),
            process.response().unwrap_or(0),
            job.deadline,
            job.criticality,
            job.period,
            job.base_priority,
            met
        );
    }
    out
}

fn metric_rows(metrics: &Metrics) -> [(&'static str, String); 7] {
    [
        ("Average Turnaround Time", format!("{:.2}", metrics.avg_turnaround)),
        ("Average Waiting Time", format!("{:.2}", metrics.avg_waiting)),
        ("Average Response Time", format!("{:.2}", metrics.avg_response)),
        ("Throughput", format!("{:.2}", metrics.throughput)),
        ("Fairness Index", format!("{:.2}", metrics.fairness)),
        ("Starvation Count", metrics.starvation_count.to_string()),
        (
            "Load Balancing Efficiency",
            format!("{:.2}", metrics.load_balancing_efficiency),
        ),
    ]
}

pub fn metrics_table(metrics: &Metrics) -> String {
    let mut out = String::from("Metric,Value\n");
    for (name, value) in metric_rows(metrics) {
        let _ = writeln!(out, "{name},{value}");
    }
    out
}

/// One column per run, in the order given.
pub fn comparison_table(outcomes: &[SimOutcome]) -> String {
    let mut out = String::from("Metric");
    for outcome in outcomes {
        let _ = write!(out, ",{}", outcome.policy);
    }
    out.push('\n');

    let columns: Vec<_> = outcomes
        .iter()
        .map(|outcome| metric_rows(&outcome.metrics))
        .collect();
    for row in 0..7 {
        out.push_str(columns.first().map_or("", |rows| rows[row].0));
        for rows in &columns {
            let _ = write!(out, ",{}", rows[row].1);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gantt_rows_line_up() {
        let mut chart = GanttChart::new();
        chart.record(GanttSubject::Idle, 0, 1).unwrap();
        chart.record(GanttSubject::Process(1), 1, 3).unwrap();

        let text = gantt_chart(&chart);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], " -- ---- ");
        assert_eq!(lines[1], "|I |P1 P1|");
        assert_eq!(lines[2], lines[0]);
        assert_eq!(lines[3], " 0  1    3");
    }

    #[test]
    fn metrics_csv_has_seven_rows() {
        let metrics = Metrics {
            avg_turnaround: 7.333,
            throughput: 0.25,
            fairness: 1.0,
            starvation_count: 2,
            ..Metrics::default()
        };
        let text = metrics_table(&metrics);
        assert_eq!(text.lines().count(), 8);
        assert!(text.contains("Average Turnaround Time,7.33\n"));
        assert!(text.contains("Starvation Count,2\n"));
    }
}
