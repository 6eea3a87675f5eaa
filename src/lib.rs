//! # tickloop
//!
//! A deterministic cooperative periodic task scheduler for a
//! resource-constrained microcontroller: a single CPU, a 1 kHz hardware
//! tick, bounded dispatch latency, and low-power sleep between ticks.
//! No preemption — a task is just a function called by a dispatcher and
//! expected to return promptly; long work self-limits with the slice
//! self-check (`slice::expired`) instead of being timed out.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    Application Tasks                    │
//! ├────────────────────────────────────────────────────────┤
//! │                 Kernel API (kernel.rs)                  │
//! │           init() · register() · run()                  │
//! ├──────────────┬────────────────────┬───────────────────┤
//! │  Dispatch     │   Tick source      │  Sync / Idle      │
//! │  dispatch/*   │   tick.rs          │  sync.rs, idle.rs │
//! │  ─ tick()     │   ─ now()          │  ─ critical_section│
//! │  ─ has_work() │   ─ on_hardware_tick│  ─ mask/unmask    │
//! │  ─ drain()    │                    │  ─ Idle trait     │
//! ├──────────────┴────────────────────┴───────────────────┤
//! │              Task Model (task.rs, slice.rs)             │
//! │           TaskFn · slice self-check                     │
//! ├────────────────────────────────────────────────────────┤
//! │            Arch Port (arch/cortex_m4.rs)                │
//! │            SysTick configuration only                   │
//! ├────────────────────────────────────────────────────────┤
//! │         ARM Cortex-M4 Hardware (Thumb-2)                │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Three dispatch disciplines
//!
//! Exactly one is compiled in, selected by a `discipline-*` Cargo
//! feature (`discipline-pending` is the default):
//!
//! - **Pending-counter** (`dispatch::pending`): the tick handler counts
//!   elapsed periods into a per-task saturating counter; the superloop
//!   drains whatever accumulated, replaying coalesced activations.
//! - **Phase-offset** (`dispatch::phase`): each task tracks its own due
//!   time, advanced by a fixed period every run — no drift, no shared
//!   per-task counter.
//! - **Offline table** (`dispatch::offline`): a planner computes the
//!   hyperperiod and a conflict-free slot table once at startup; the
//!   superloop just walks it.
//!
//! ## Memory model
//!
//! - No heap, no `alloc` — pure `core`, plus `critical-section` for the
//!   masking/mutex abstraction.
//! - Fixed-size task tables (`[Option<_>; config::MAX_TASKS]`).
//! - No per-task stack: tasks are called directly, not context-switched.

#![no_std]

pub mod arch;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod idle;
pub mod kernel;
pub mod slice;
pub mod sync;
pub mod task;
pub mod tick;
pub mod time;
