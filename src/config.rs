use serde::Deserialize;
use std::{fmt, fs, path::Path, str::FromStr};

use crate::{core::state::Ticks, error::ConfigError};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    WeightedFair,
    DynamicPriority,
    AdaptiveSrpt,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [
        PolicyKind::WeightedFair,
        PolicyKind::DynamicPriority,
        PolicyKind::AdaptiveSrpt,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::WeightedFair => "CFS",
            Self::DynamicPriority => "DPS-DTQ",
            Self::AdaptiveSrpt => "Adaptive SRPT",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cfs" | "weighted-fair" => Ok(Self::WeightedFair),
            "dps-dtq" | "dps" | "dynamic-priority" => Ok(Self::DynamicPriority),
            "srpt" | "adaptive-srpt" => Ok(Self::AdaptiveSrpt),
            other => Err(format!("unknown policy {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeightedFairConfig {
    /// Smallest share of the latency window one process may receive.
    pub min_granularity: f64,
    /// Latency window when few processes are active.
    pub base_latency: f64,
}

impl Default for WeightedFairConfig {
    fn default() -> Self {
        Self {
            min_granularity: 1.0,
            base_latency: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DynamicPriorityConfig {
    pub base_quantum: f64,
    pub criticality_weight: f64,
    pub deadline_weight: f64,
    pub aging_weight: f64,
    pub priority_weight: f64,
    /// Waiting time at which the aging component saturates at 1.
    pub aging_horizon: f64,
}

impl Default for DynamicPriorityConfig {
    fn default() -> Self {
        Self {
            base_quantum: 4.0,
            criticality_weight: 0.35,
            deadline_weight: 0.30,
            aging_weight: 0.25,
            priority_weight: 0.10,
            aging_horizon: 10.0,
        }
    }
}

impl DynamicPriorityConfig {
    fn weights(&self) -> [(&'static str, f64); 4] {
        [
            ("dynamic_priority.criticality_weight", self.criticality_weight),
            ("dynamic_priority.deadline_weight", self.deadline_weight),
            ("dynamic_priority.aging_weight", self.aging_weight),
            ("dynamic_priority.priority_weight", self.priority_weight),
        ]
    }
}

/// Tunables for every policy plus the run-level knobs shared by all of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    pub weighted_fair: WeightedFairConfig,
    pub dynamic_priority: DynamicPriorityConfig,
    /// Waiting time above which a process counts as starved.
    pub starvation_threshold: Ticks,
    /// Upper bound on recorded gantt intervals; unbounded when absent.
    pub max_gantt_intervals: Option<usize>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            weighted_fair: WeightedFairConfig::default(),
            dynamic_priority: DynamicPriorityConfig::default(),
            starvation_threshold: 20,
            max_gantt_intervals: None,
        }
    }
}

impl PolicyConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let wf = &self.weighted_fair;
        non_negative("weighted_fair.min_granularity", wf.min_granularity)?;
        positive("weighted_fair.base_latency", wf.base_latency)?;

        let dp = &self.dynamic_priority;
        positive("dynamic_priority.base_quantum", dp.base_quantum)?;
        positive("dynamic_priority.aging_horizon", dp.aging_horizon)?;

        let mut sum = 0.0;
        for (field, weight) in dp.weights() {
            non_negative(field, weight)?;
            sum += weight;
        }
        if sum == 0.0 {
            return Err(ConfigError::ZeroWeightSum);
        }
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum(sum));
        }

        if self.max_gantt_intervals == Some(0) {
            return Err(ConfigError::OutOfRange {
                field: "max_gantt_intervals",
                value: 0.0,
                expected: "at least 1",
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "a finite value > 0",
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "a finite value >= 0",
        })
    }
}
