pub mod config;
pub mod core;
pub mod error;
pub mod gantt;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod render;
pub mod scheduler;
pub mod sim;

pub use config::{PolicyConfig, PolicyKind};
pub use error::{ConfigError, InputError, SimError};
pub use gantt::{GanttChart, GanttInterval, GanttSubject};
pub use metrics::Metrics;
pub use scheduler::Policy;
pub use sim::{Job, ProcessId, Sim, SimOutcome, simulate};
