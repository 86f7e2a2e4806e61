pub mod driver;
pub mod job;
pub mod workload;

pub use driver::{Sim, SimOutcome, simulate, validate_jobs};
pub use job::{Job, ProcessId};
pub use workload::random_jobs;
