//! # Example firmware
//!
//! Registers three periodic tasks and starts the scheduler. Which
//! discipline runs is chosen at compile time by a `discipline-*` Cargo
//! feature; the task periods/slices below match the reference scenarios
//! each discipline was validated against.
//!
//! Toggling an LED is this firmware's stand-in for "do some work" — a
//! real board would write to a GPIO register here (C8's `Gpio`
//! collaborator is intentionally out of scope for this crate).

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use panic_halt as _;

use tickloop::kernel;

static mut LED_STATE: bool = false;

fn toggle_led() {
    unsafe {
        LED_STATE = !LED_STATE;
    }
}

fn fast_task(_now_ms: u32) {
    toggle_led();
}

fn medium_task(_now_ms: u32) {
    toggle_led();
}

fn slow_task(_now_ms: u32) {
    toggle_led();
}

#[entry]
fn main() -> ! {
    let cp = cortex_m::Peripherals::take().unwrap();
    kernel::init();

    #[cfg(feature = "discipline-pending")]
    {
        kernel::register(fast_task, 10, 1).expect("register fast_task");
        kernel::register(medium_task, 100, 5).expect("register medium_task");
        kernel::register(slow_task, 500, 20).expect("register slow_task");
    }

    #[cfg(feature = "discipline-phase")]
    {
        kernel::register_with_phase(fast_task, 10, 1, 0).expect("register fast_task");
        kernel::register_with_phase(medium_task, 100, 5, 2).expect("register medium_task");
        kernel::register_with_phase(slow_task, 500, 20, 10).expect("register slow_task");
    }

    #[cfg(feature = "discipline-offline")]
    {
        kernel::register(fast_task, 10, 2).expect("register fast_task");
        kernel::register(medium_task, 50, 5).expect("register medium_task");
        kernel::register(slow_task, 100, 10).expect("register slow_task");
        kernel::build_schedule().expect("build offline schedule");
    }

    kernel::run(cp)
}
