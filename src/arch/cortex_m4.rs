//! # Cortex-M4 port layer
//!
//! Hardware-specific code for the ARM Cortex-M4 (Thumb-2) processor: the
//! tick source's timer configuration and the atomic idle primitive. There
//! is no context-switch machinery here — tasks are called directly by a
//! dispatcher and return normally, so there is nothing to save or
//! restore between them.
//!
//! ## Interrupt priority
//!
//! The tick ISR is set to the lowest priority so it never blocks a
//! higher-priority, latency-sensitive application interrupt; it still
//! always eventually runs, since nothing else in this design holds
//! interrupts masked for more than a handful of instructions.

use cortex_m::peripheral::syst::SystClkSource;

use crate::config::{SYSTEM_CLOCK_HZ, TICK_HZ};

// ---------------------------------------------------------------------------
// SysTick configuration
// ---------------------------------------------------------------------------

/// Configure the SysTick timer as the tick source.
///
/// Sets up SysTick to fire at `TICK_HZ`. Each tick invokes `SysTick()`
/// below, which advances the crate-wide tick counter and the active
/// dispatcher's own bookkeeping.
pub fn configure_systick(syst: &mut cortex_m::peripheral::SYST) {
    let reload = SYSTEM_CLOCK_HZ / TICK_HZ - 1;
    syst.set_reload(reload);
    syst.clear_current();
    syst.set_clock_source(SystClkSource::Core);
    syst.enable_counter();
    syst.enable_interrupt();
}

// ---------------------------------------------------------------------------
// Interrupt priority configuration
// ---------------------------------------------------------------------------

/// Set SysTick to the lowest interrupt priority.
pub fn set_interrupt_priorities() {
    unsafe {
        // System Handler Priority Register 3 (SHPR3): 0xE000_ED20.
        // Bits [31:24] = SysTick priority.
        let shpr3: *mut u32 = 0xE000_ED20 as *mut u32;
        let val = core::ptr::read_volatile(shpr3);
        let val = val | (0xFF << 24);
        core::ptr::write_volatile(shpr3, val);
    }
}

// ---------------------------------------------------------------------------
// SysTick handler
// ---------------------------------------------------------------------------

/// SysTick exception handler — the tick source's only writer.
///
/// Advances the crate-wide tick counter for task-side slice self-checks,
/// then feeds the same tick to the active dispatcher. Runs to completion
/// quickly: no task is ever called from here.
#[no_mangle]
pub unsafe extern "C" fn SysTick() {
    crate::tick::on_hardware_tick();
    crate::kernel::on_tick();
}
