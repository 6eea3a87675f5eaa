//! # Configuration
//!
//! Compile-time constants governing the scheduler and system behavior.
//! All limits are fixed at compile time — no dynamic allocation.

/// Maximum number of tasks any dispatcher can register.
/// Bounds the static task-table arrays.
pub const MAX_TASKS: usize = 8;

/// Maximum number of slots the offline planner can materialize into a
/// schedule table. A hyperperiod that would require more slots than this
/// is rejected with `PlannerError::SlotTableFull`.
pub const MAX_SLOTS: usize = 128;

/// Hardware tick period in milliseconds. The tick source fires once per
/// this many milliseconds; all `period_ms`/`slice_ms` values are
/// multiples of this.
pub const TICK_MS: u32 = 1;

/// SysTick frequency in Hz, derived from `TICK_MS`.
pub const TICK_HZ: u32 = 1000 / TICK_MS;

/// Ceiling for the pending-counter discipline's saturating per-task
/// counter. A task whose activations accumulate past this value simply
/// stops counting further overruns; see `dispatch::pending`.
pub const PENDING_SATURATION: u16 = u16::MAX;

/// System clock frequency in Hz (default for STM32F4 at 16 MHz HSI).
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;
