pub mod driver;
pub mod event;
pub mod observer;
pub mod state;

pub use driver::SchedCore;
pub use event::{Dispatch, SchedCoreEvent};
pub use state::{ProcKey, Process, ProcessState, RunQueue, SelectionKey, SimCtx, Ticks};
