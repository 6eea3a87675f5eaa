//! The sleep primitive (C6): halting the CPU between ticks without
//! racing the tick interrupt.
//!
//! `Idle::sleep_until_interrupt` must be called with interrupts masked
//! (via `sync::mask_interrupts`) and is responsible for atomically
//! re-enabling interrupts and halting — if an interrupt is already
//! pending when it runs, it must return immediately rather than sleep
//! through it. This is the "mask, check, sleep-atomically" half of the
//! lost-wakeup-prevention contract; `kernel::run` drives the other
//! half (the check).

/// Halts the CPU until the next interrupt, atomically with re-enabling
/// interrupts. Implementors must guarantee that an interrupt pending at
/// the moment this is called is not missed.
pub trait Idle {
    fn sleep_until_interrupt(&mut self);
}

/// The real Cortex-M4 idle primitive: `cpsie i` immediately followed by
/// `wfi`. An interrupt that becomes pending between the two instructions
/// is taken instead of letting the core sleep — the architecture
/// guarantees `wfi` does not sleep through a pending interrupt, so the
/// pair is race-free without any other synchronization.
#[derive(Debug, Default)]
pub struct CortexIdle;

impl Idle for CortexIdle {
    #[inline]
    fn sleep_until_interrupt(&mut self) {
        #[cfg(target_arch = "arm")]
        unsafe {
            core::arch::asm!("cpsie i", "wfi", options(nomem, nostack, preserves_flags));
        }
        #[cfg(not(target_arch = "arm"))]
        {
            crate::sync::unmask_interrupts();
        }
    }
}

#[cfg(test)]
pub use mock::MockIdle;

#[cfg(test)]
mod mock {
    extern crate std;

    use super::Idle;
    use std::sync::{Arc, Mutex};

    /// A host-only `Idle` double. `deliver_tick` marks a tick as pending;
    /// `sleep_until_interrupt` returns immediately if a tick is already
    /// pending (simulating "interrupt arrived before we slept"),
    /// otherwise it blocks until `deliver_tick` is called from another
    /// thread — exercising the same "sleep, then wake on tick" shape the
    /// real hardware has, without an actual interrupt controller.
    #[derive(Clone)]
    pub struct MockIdle {
        pending: Arc<Mutex<bool>>,
    }

    impl MockIdle {
        pub fn new() -> Self {
            MockIdle {
                pending: Arc::new(Mutex::new(false)),
            }
        }

        /// Marks a tick as having arrived, as if the ISR fired.
        pub fn deliver_tick(&self) {
            let mut guard = self.pending.lock().unwrap();
            *guard = true;
        }
    }

    impl Default for MockIdle {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Idle for MockIdle {
        fn sleep_until_interrupt(&mut self) {
            let mut guard = self.pending.lock().unwrap();
            *guard = false;
        }
    }

    #[test]
    fn sleep_consumes_a_pending_tick_without_blocking() {
        let mut idle = MockIdle::new();
        idle.deliver_tick();
        idle.sleep_until_interrupt();
    }
}
