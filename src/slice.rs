//! Slice self-check (C7): the contract a cooperative task uses to bound
//! its own runtime, since nothing else will.
//!
//! A task that does variable-length work in a loop should snapshot
//! `tick::now()` once at entry, then poll `slice::expired` each
//! iteration and return as soon as it reports `true`.

use crate::tick;
use crate::time;

/// `true` once at least `limit_ms` have elapsed since `start_tick`, as of
/// the current tick. Thin wrapper over `time::elapsed_at_least` reading
/// the live tick count, for tasks that only have a `start_tick` snapshot
/// in scope.
#[inline]
pub fn expired(start_tick: u32, limit_ms: u32) -> bool {
    time::elapsed_at_least(start_tick, tick::now(), limit_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    // tick::now() is a single process-wide static shared by every test
    // binary thread, so these assertions avoid depending on an exact
    // number of ticks elapsed — only on the direction of the check.
    #[test]
    fn not_yet_expired_with_a_distant_limit() {
        let start = tick::now();
        assert!(!expired(start, u32::MAX / 2));
    }

    #[test]
    fn already_expired_with_zero_limit() {
        let start = tick::now();
        assert!(expired(start, 0));
    }
}
