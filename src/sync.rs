//! # Synchronization primitives
//!
//! Critical-section primitives (part of C6/C7's locking discipline).
//!
//! `critical_section` is the scoped form used by the dispatchers to
//! snapshot-and-zero a counter or compare-and-advance a slot index — the
//! primary mechanism for safely accessing shared mutable state. Keep
//! critical sections as short as possible: never run a task or touch a
//! blocking collaborator from inside one.
//!
//! `mask_interrupts`/`unmask_interrupts` are the raw, un-scoped pair the
//! superloop uses around its ready-check, because the ready-check must be
//! able to leave interrupts masked across the call into
//! `Idle::sleep_until_interrupt`, which re-enables interrupts atomically
//! with the halt instruction itself — something a closure-scoped
//! `critical_section::with` cannot express, since its restore happens on
//! closure return, not fused with a halt.
//!
//! On the Cortex-M4 target this resolves to `cortex_m::interrupt::free`
//! and `cortex_m::interrupt::{disable, enable}` via the `critical-section`
//! crate's cortex-m backend (registered through the `cortex-m`
//! dependency's `critical-section-single-core` feature). On host test
//! builds it resolves to a `std::sync::Mutex`-backed implementation via
//! `critical-section`'s `std` dev-dependency feature — the contract is
//! identical, only the backing primitive differs.

use critical_section::CriticalSection;

/// Execute a closure within a critical section (interrupts masked).
///
/// Interrupts are masked on entry and restored on exit, ensuring
/// atomicity of the enclosed operation.
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(CriticalSection) -> R,
{
    critical_section::with(f)
}

/// Masks interrupts without an automatic restore. Must be paired with
/// either `unmask_interrupts` or a call into `Idle::sleep_until_interrupt`,
/// which performs the unmask itself as part of an atomic sleep.
#[inline]
pub fn mask_interrupts() {
    #[cfg(target_arch = "arm")]
    unsafe {
        cortex_m::interrupt::disable();
    }
    #[cfg(not(target_arch = "arm"))]
    {
        // Host builds have no real interrupts; critical_section's std
        // backend already serializes access for the scoped form above.
        // The unscoped pair is a no-op here and exists only so
        // kernel::run compiles and exercises the same call shape
        // under host tests with a MockIdle.
    }
}

/// Restores interrupts previously masked by `mask_interrupts`.
#[inline]
pub fn unmask_interrupts() {
    #[cfg(target_arch = "arm")]
    unsafe {
        cortex_m::interrupt::enable();
    }
}
