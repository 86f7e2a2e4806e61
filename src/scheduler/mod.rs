pub mod adaptive_srpt;
pub mod dynamic_priority;
pub mod weighted_fair;

use crate::{
    config::PolicyConfig,
    core::{
        Ticks,
        state::{ProcKey, SelectionKey, SimCtx},
    },
};
pub use adaptive_srpt::AdaptiveSrptPolicy;
pub use dynamic_priority::DynamicPriorityPolicy;
pub use weighted_fair::WeightedFairPolicy;

/// Smallest slice any policy may grant.
pub const MIN_QUANTUM: Ticks = 1;

/// A scheduling policy: how queued processes are ordered and how long the
/// selected one may run.
///
/// The core calls `key_for` whenever a process enters the run queue and
/// `quantum_for` once per decision, with the selected process already
/// installed as `ctx.current`. `on_process_ran` follows every slice and
/// `on_process_retired` every completion.
pub trait Policy {
    const NAME: &'static str;

    fn init(config: &PolicyConfig, ctx: &SimCtx) -> Self;

    fn key_for(&self, ctx: &SimCtx, proc: ProcKey) -> SelectionKey;

    fn quantum_for(&self, ctx: &SimCtx, proc: ProcKey) -> Ticks;

    /// Keys that depend on the clock must be recomputed before each decision.
    fn rekey_before_decision(&self) -> bool {
        false
    }

    fn on_process_ran(&mut self, _ctx: &mut SimCtx, _proc: ProcKey, _executed: Ticks) {}

    fn on_process_retired(&mut self, _ctx: &SimCtx, _proc: ProcKey) {}
}
