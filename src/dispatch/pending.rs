//! C3 — pending-counter dispatcher.
//!
//! The tick handler counts elapsed periods into a per-task saturating
//! counter; the superloop drains whatever has accumulated. A task that
//! could not run for several periods in a row (because the superloop was
//! busy, or asleep too long) gets replayed that many times back-to-back —
//! coalesced, not dropped, until the counter saturates.
//!
//! Grounded in `original_source/scheduler.c`.

use crate::config::{MAX_TASKS, PENDING_SATURATION};
use crate::dispatch::Dispatch;
use crate::error::RegisterError;
use crate::sync;
use crate::task::TaskFn;

#[derive(Clone, Copy)]
struct PendingTaskSlot {
    f: TaskFn,
    period_ms: u32,
    accumulator_ms: u32,
    pending: u16,
}

/// Pending-counter scheduler: one saturating counter per task, filled by
/// the tick handler and drained by the superloop.
pub struct PendingScheduler {
    tasks: [Option<PendingTaskSlot>; MAX_TASKS],
    count: usize,
    now_ms: u32,
    started: bool,
}

impl PendingScheduler {
    pub const fn new() -> Self {
        PendingScheduler {
            tasks: [None; MAX_TASKS],
            count: 0,
            now_ms: 0,
            started: false,
        }
    }

    /// Registers a task with the given period. `slice_ms` is accepted for
    /// symmetry with the other disciplines' registration calls but is not
    /// enforced here — pending-counter tasks self-limit via
    /// `slice::expired`, the dispatcher never measures their runtime.
    pub fn register(&mut self, f: TaskFn, period_ms: u32, slice_ms: u32) -> Result<usize, RegisterError> {
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
        self.tasks[id] = Some(PendingTaskSlot {
            f,
            period_ms,
            accumulator_ms: 0,
            pending: 0,
        });
        self.count += 1;
        Ok(id)
    }

    /// Marks registration closed; called once by `kernel::run`
    /// before entering the superloop.
    pub fn start(&mut self) {
        self.started = true;
    }

    /// Current tick count as seen by this scheduler's own bookkeeping.
    pub fn now_ms(&self) -> u32 {
        self.now_ms
    }

    /// The task at `id`'s current saturating pending count, for tests and
    /// diagnostics.
    pub fn pending_count(&self, id: usize) -> Option<u16> {
        self.tasks.get(id).and_then(|t| t.as_ref()).map(|t| t.pending)
    }
}

impl Default for PendingScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatch for PendingScheduler {
    fn tick(&mut self) {
        self.now_ms = self.now_ms.wrapping_add(1);
        for slot in self.tasks.iter_mut().take(self.count) {
            if let Some(task) = slot {
                task.accumulator_ms += 1;
                if task.accumulator_ms >= task.period_ms {
                    task.accumulator_ms = 0;
                    if task.pending < PENDING_SATURATION {
                        task.pending += 1;
                    }
                }
            }
        }
    }

    fn has_work(&self) -> bool {
        self.tasks
            .iter()
            .take(self.count)
            .flatten()
            .any(|t| t.pending > 0)
    }

    fn drain(&mut self) {
        for i in 0..self.count {
            let (f, mut run_count) = sync::critical_section(|_cs| {
                let task = self.tasks[i].as_mut().expect("registered slot");
                let run_count = task.pending;
                task.pending = 0;
                (task.f, run_count)
            });
            while run_count > 0 {
                f(self.now_ms);
                run_count -= 1;
            }
        }
    }
}
