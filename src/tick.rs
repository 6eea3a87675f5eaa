//! The tick source (C1): a single free-running millisecond counter,
//! mutated only by the hardware tick interrupt and readable by anyone,
//! including running tasks performing a slice self-check (C7).

use core::sync::atomic::{AtomicU32, Ordering};

static NOW_MS: AtomicU32 = AtomicU32::new(0);

/// Current tick count, in milliseconds since start. Readable from any
/// context, including from inside a task body.
#[inline]
pub fn now() -> u32 {
    NOW_MS.load(Ordering::Relaxed)
}

/// Advances the tick counter by one hardware tick and returns the new
/// value. Called exactly once per tick, only from the tick ISR — never
/// from task code or from the superloop.
#[inline]
pub fn on_hardware_tick() -> u32 {
    NOW_MS.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    // NOW_MS is a single process-wide static shared by every test binary
    // thread; assert only the monotonic relationship, not an exact
    // delta, since other tests may advance it concurrently.
    #[test]
    fn advances_monotonically() {
        let before = now();
        let after = on_hardware_tick();
        assert!(after > before);
        assert!(now() >= after);
    }
}
