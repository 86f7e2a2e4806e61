use std::{fmt, io, path::PathBuf};

use crate::sim::job::ProcessId;

/// Reasons a simulation run is refused before its first tick.
#[derive(Debug)]
pub enum SimError {
    EmptyWorkload,
    ZeroBurst { id: ProcessId },
    DuplicateProcessId(ProcessId),
    CriticalityOutOfRange { id: ProcessId, criticality: u8 },
    // Latest arrival plus total burst does not fit in the clock
    HorizonOverflow,
    InvalidConfig(ConfigError),
    GanttCapacityExceeded { capacity: usize },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyWorkload => write!(f, "workload contains no processes"),
            Self::ZeroBurst { id } => write!(f, "process {id} has a burst time of zero"),
            Self::DuplicateProcessId(id) => write!(f, "process id {id} appears more than once"),
            Self::CriticalityOutOfRange { id, criticality } => write!(
                f,
                "process {id} has criticality {criticality}, expected 1..=10"
            ),
            Self::HorizonOverflow => {
                write!(f, "latest arrival plus total burst time overflows the clock")
            }
            Self::InvalidConfig(err) => write!(f, "invalid policy configuration: {err}"),
            Self::GanttCapacityExceeded { capacity } => {
                write!(f, "gantt chart exceeded its capacity of {capacity} intervals")
            }
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidConfig(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for SimError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfig(err)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Parse(toml::de::Error),
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
    ZeroWeightSum,
    WeightSum(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Parse(err) => write!(f, "malformed config: {err}"),
            Self::OutOfRange {
                field,
                value,
                expected,
            } => write!(f, "{field} = {value}, expected {expected}"),
            Self::ZeroWeightSum => write!(f, "dynamic priority weights sum to zero"),
            Self::WeightSum(sum) => {
                write!(f, "dynamic priority weights sum to {sum}, expected 1")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err)
    }
}

/// Failures reading or writing a process list file.
#[derive(Debug)]
pub enum InputError {
    Io { path: PathBuf, source: io::Error },
    MissingCount,
    BadCount(String),
    CountOutOfRange { count: usize, max: usize },
    TruncatedRecord { record: usize },
    BadField {
        record: usize,
        field: &'static str,
        value: String,
    },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::MissingCount => write!(f, "input is empty, expected a process count"),
            Self::BadCount(token) => write!(f, "process count {token:?} is not a number"),
            Self::CountOutOfRange { count, max } => {
                write!(f, "invalid number of processes: {count} (must be between 1 and {max})")
            }
            Self::TruncatedRecord { record } => {
                write!(f, "record {record} has fewer than seven fields")
            }
            Self::BadField {
                record,
                field,
                value,
            } => write!(f, "record {record}: {field} {value:?} is invalid"),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
