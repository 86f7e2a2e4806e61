//! Plain-text process lists.
//!
//! The format is a process count followed by one whitespace-separated
//! record per process:
//!
//! ```text
//! 3
//! 1 0 8 20 7 0 5
//! 2 2 4 15 9 0 8
//! 3 4 2 10 6 10 3
//! ```
//!
//! Columns are `id arrival burst deadline criticality period priority`.

use std::{fmt::Write as _, fs, path::Path, str::FromStr};

use crate::{
    core::Ticks,
    error::InputError,
    sim::job::{Job, ProcessId},
};

pub const MAX_PROCESSES: usize = 100;

const FIELDS_PER_RECORD: usize = 7;

pub const DEFAULT_INPUT: &str = "\
10
1 0 8 20 7 0 5
2 2 4 15 9 0 8
3 4 2 10 6 10 3
4 6 6 25 3 0 4
5 8 5 0 5 12 6
6 10 3 18 8 0 7
7 12 7 30 4 15 5
8 14 1 17 10 0 9
9 16 9 0 2 20 2
10 18 4 25 7 0 6
";

pub fn parse_jobs(source: &str) -> Result<Vec<Job>, InputError> {
    let mut tokens = source.split_whitespace();

    let count_token = tokens.next().ok_or(InputError::MissingCount)?;
    let count: usize = count_token
        .parse()
        .map_err(|_| InputError::BadCount(count_token.to_owned()))?;
    if !(1..=MAX_PROCESSES).contains(&count) {
        return Err(InputError::CountOutOfRange {
            count,
            max: MAX_PROCESSES,
        });
    }

    (1..=count)
        .map(|record| {
            let fields: Vec<&str> = tokens.by_ref().take(FIELDS_PER_RECORD).collect();
            if fields.len() < FIELDS_PER_RECORD {
                return Err(InputError::TruncatedRecord { record });
            }
            parse_record(record, &fields)
        })
        .collect()
}

fn parse_record(record: usize, fields: &[&str]) -> Result<Job, InputError> {
    let id: ProcessId = parse_field(record, "id", fields[0])?;
    let arrival_time: Ticks = parse_field(record, "arrival time", fields[1])?;
    let burst_time: Ticks = parse_field(record, "burst time", fields[2])?;
    let deadline: Ticks = parse_field(record, "deadline", fields[3])?;
    let criticality: u8 = parse_field(record, "criticality", fields[4])?;
    let period: Ticks = parse_field(record, "period", fields[5])?;
    let base_priority: i32 = parse_field(record, "priority", fields[6])?;

    if burst_time == 0 {
        return Err(bad_field(record, "burst time", fields[2]));
    }
    if !(1..=10).contains(&criticality) {
        return Err(bad_field(record, "criticality", fields[4]));
    }
    if !(-20..=19).contains(&base_priority) {
        return Err(bad_field(record, "priority", fields[6]));
    }

    Ok(Job::from_record((
        id,
        arrival_time,
        burst_time,
        deadline,
        criticality,
        period,
        base_priority,
    )))
}

fn parse_field<T: FromStr>(
    record: usize,
    field: &'static str,
    value: &str,
) -> Result<T, InputError> {
    value.parse().map_err(|_| bad_field(record, field, value))
}

fn bad_field(record: usize, field: &'static str, value: &str) -> InputError {
    InputError::BadField {
        record,
        field,
        value: value.to_owned(),
    }
}

pub fn read_jobs(path: impl AsRef<Path>) -> Result<Vec<Job>, InputError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_jobs(&source)
}

pub fn format_jobs(jobs: &[Job]) -> String {
    let mut out = format!("{}\n", jobs.len());
    for job in jobs {
        let _ = writeln!(
            out,
            "{} {} {} {} {} {} {}",
            job.id,
            job.arrival_time,
            job.burst_time,
            job.deadline,
            job.criticality,
            job.period,
            job.base_priority
        );
    }
    out
}

pub fn write_jobs(path: impl AsRef<Path>, jobs: &[Job]) -> Result<(), InputError> {
    write_text(path.as_ref(), &format_jobs(jobs))
}

pub fn write_default_input(path: impl AsRef<Path>) -> Result<(), InputError> {
    write_text(path.as_ref(), DEFAULT_INPUT)
}

fn write_text(path: &Path, text: &str) -> Result<(), InputError> {
    fs::write(path, text).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::random_jobs;

    #[test]
    fn default_input_parses() {
        let jobs = parse_jobs(DEFAULT_INPUT).unwrap();
        assert_eq!(jobs.len(), 10);
        assert_eq!(
            jobs[2],
            Job {
                id: 3,
                arrival_time: 4,
                burst_time: 2,
                deadline: 10,
                criticality: 6,
                period: 10,
                base_priority: 3,
            }
        );
        assert_eq!(jobs[8].deadline, 0);
    }

    #[test]
    fn layout_is_whitespace_insensitive() {
        let jobs = parse_jobs("2 1 0 3 0 5 0 -4\n\n  2 1 1 0 5 0 2").unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].base_priority, -4);
        assert_eq!(jobs[1].arrival_time, 1);
    }

    #[test]
    fn count_errors() {
        assert!(matches!(parse_jobs("   "), Err(InputError::MissingCount)));
        assert!(matches!(parse_jobs("ten"), Err(InputError::BadCount(_))));
        assert!(matches!(
            parse_jobs("0"),
            Err(InputError::CountOutOfRange { count: 0, .. })
        ));
        assert!(matches!(
            parse_jobs("101"),
            Err(InputError::CountOutOfRange {
                count: 101,
                max: 100
            })
        ));
    }

    #[test]
    fn record_errors() {
        assert!(matches!(
            parse_jobs("2\n1 0 8 20 7 0 5\n2 2 4"),
            Err(InputError::TruncatedRecord { record: 2 })
        ));
        assert!(matches!(
            parse_jobs("1\n1 -1 8 20 7 0 5"),
            Err(InputError::BadField { record: 1, field: "arrival time", .. })
        ));
        assert!(matches!(
            parse_jobs("1\n1 0 0 20 7 0 5"),
            Err(InputError::BadField { field: "burst time", .. })
        ));
        assert!(matches!(
            parse_jobs("1\n1 0 3 20 11 0 5"),
            Err(InputError::BadField { field: "criticality", .. })
        ));
        assert!(matches!(
            parse_jobs("1\n1 0 3 20 5 0 25"),
            Err(InputError::BadField { field: "priority", .. })
        ));
    }

    #[test]
    fn formatted_jobs_parse_back() {
        let jobs = random_jobs(12, 3);
        assert_eq!(parse_jobs(&format_jobs(&jobs)).unwrap(), jobs);
    }

    #[test]
    fn default_file_is_written_and_read() {
        let name = format!("sched_sim_input_{}.txt", std::process::id());
        let path = std::env::temp_dir().join(name);
        write_default_input(&path).unwrap();
        let jobs = read_jobs(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(jobs, parse_jobs(DEFAULT_INPUT).unwrap());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_jobs("/nonexistent/sched_sim/input.txt").unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
    }
}
