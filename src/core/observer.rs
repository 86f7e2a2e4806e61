use super::state::{ProcessState, SimCtx};

/// Checks machine invariants after every dispatch in debug builds.
#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, ctx: &SimCtx) {
        self.step += 1;
        if !cfg!(debug_assertions) {
            return;
        }

        debug_assert!(
            ctx.current.is_none(),
            "CPU must be released between dispatch steps"
        );

        for proc in ctx.run_queue.members() {
            let process = ctx.process(proc);
            let id = process.id();
            debug_assert_eq!(
                process.state,
                ProcessState::Runnable,
                "Queued process {id} must be Runnable"
            );
            debug_assert!(
                process.remaining_time > 0,
                "Queued process {id} has no remaining work"
            );
            debug_assert!(
                process.job.arrival_time <= ctx.now,
                "Process {id} queued before its arrival"
            );
        }

        let mut completed = 0;
        for (proc, process) in ctx.processes.iter() {
            let id = process.id();
            match process.state {
                ProcessState::Completed => {
                    completed += 1;
                    debug_assert_eq!(
                        process.remaining_time, 0,
                        "Completed process {id} still has work"
                    );
                    debug_assert!(
                        process.completion_time.is_some(),
                        "Completed process {id} has no completion time"
                    );
                }
                ProcessState::Runnable => debug_assert!(
                    ctx.run_queue.contains(proc),
                    "Runnable process {id} missing from run queue"
                ),
                ProcessState::Running => {
                    debug_assert!(false, "Process {id} left Running after its slice")
                }
                ProcessState::Pending => debug_assert!(
                    !process.has_started(),
                    "Pending process {id} has already run"
                ),
            }
        }
        debug_assert_eq!(completed, ctx.completed_processes());
    }
}
