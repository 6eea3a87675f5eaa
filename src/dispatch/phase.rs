//! C4 — phase-offset dispatcher.
//!
//! Each task carries its own `next_run_ms` due time, seeded from a
//! registration-time phase offset and advanced by exactly `period_ms`
//! each time the task runs — not by `now_ms + period_ms`, which would
//! drift the schedule forward every time the superloop is a little late.
//! Staggering tasks via distinct phase offsets is how the caller avoids
//! collisions between tasks of different periods.
//!
//! Grounded in `original_source/phase_offset.c`.

use crate::config::MAX_TASKS;
use crate::dispatch::Dispatch;
use crate::error::RegisterError;
use crate::sync;
use crate::task::TaskFn;
use crate::time;

/// What happens to a task's due time when the superloop discovers it is
/// already overdue by more than one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchUpPolicy {
    /// Replay every missed activation back-to-back
    /// (`next_run_ms += period_ms` each time it runs). The default, and
    /// the original C behavior.
    Replay,
    /// Drop every missed activation and resume from the next future
    /// boundary (`next_run_ms = now_ms + period_ms`). Appropriate for
    /// rate-limited, non-cumulative work.
    SkipToFuture,
}

#[derive(Clone, Copy)]
struct PhaseTaskSlot {
    f: TaskFn,
    period_ms: u32,
    next_run_ms: u32,
}

/// Phase-offset scheduler: each task has its own due time, advanced by a
/// fixed period on every run.
pub struct PhaseScheduler {
    tasks: [Option<PhaseTaskSlot>; MAX_TASKS],
    count: usize,
    now_ms: u32,
    started: bool,
    catch_up: CatchUpPolicy,
}

impl PhaseScheduler {
    pub const fn new() -> Self {
        PhaseScheduler {
            tasks: [None; MAX_TASKS],
            count: 0,
            now_ms: 0,
            started: false,
            catch_up: CatchUpPolicy::Replay,
        }
    }

    pub const fn with_catch_up_policy(mut self, policy: CatchUpPolicy) -> Self {
        self.catch_up = policy;
        self
    }

    /// Registers a task at a given period and phase offset. `slice_ms` is
    /// accepted for symmetry and bounds-checked, but not enforced at
    /// runtime — see `pending::PendingScheduler::register`.
    pub fn register_with_phase(
        &mut self,
        f: TaskFn,
        period_ms: u32,
        slice_ms: u32,
        phase_offset_ms: u32,
    ) -> Result<usize, RegisterError> {
        if self.started {
            return Err(RegisterError::Invalid);
        }
        if period_ms == 0 || slice_ms > period_ms {
            return Err(RegisterError::Invalid);
        }
        if self.count >= MAX_TASKS {
            return Err(RegisterError::Full);
        }
        let id = self.count;
        self.tasks[id] = Some(PhaseTaskSlot {
            f,
            period_ms,
            next_run_ms: phase_offset_ms,
        });
        self.count += 1;
        Ok(id)
    }

    /// Registers a task with no phase offset (`phase_offset_ms = 0`).
    pub fn register(&mut self, f: TaskFn, period_ms: u32, slice_ms: u32) -> Result<usize, RegisterError> {
        self.register_with_phase(f, period_ms, slice_ms, 0)
    }

    pub fn start(&mut self) {
        self.started = true;
    }

    pub fn now_ms(&self) -> u32 {
        self.now_ms
    }

    pub fn next_run_ms(&self, id: usize) -> Option<u32> {
        self.tasks.get(id).and_then(|t| t.as_ref()).map(|t| t.next_run_ms)
    }
}

impl Default for PhaseScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatch for PhaseScheduler {
    fn tick(&mut self) {
        self.now_ms = self.now_ms.wrapping_add(1);
    }

    fn has_work(&self) -> bool {
        let now_ms = self.now_ms;
        self.tasks
            .iter()
            .take(self.count)
            .flatten()
            .any(|t| time::is_due(now_ms, t.next_run_ms))
    }

    fn drain(&mut self) {
        let now_ms = self.now_ms;
        let catch_up = self.catch_up;
        for i in 0..self.count {
            let due = sync::critical_section(|_cs| {
                let task = self.tasks[i].as_mut().expect("registered slot");
                if time::is_due(now_ms, task.next_run_ms) {
                    let f = task.f;
                    match catch_up {
                        CatchUpPolicy::Replay => task.next_run_ms = task.next_run_ms.wrapping_add(task.period_ms),
                        CatchUpPolicy::SkipToFuture => task.next_run_ms = now_ms.wrapping_add(task.period_ms),
                    }
                    Some(f)
                } else {
                    None
                }
            });
            if let Some(f) = due {
                f(now_ms);
            }
        }
    }
}
