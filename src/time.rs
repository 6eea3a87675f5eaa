//! Wraparound-safe tick arithmetic.
//!
//! The tick counter is a free-running `u32` that wraps roughly every 49.7
//! days at a 1 kHz tick. Every comparison against it goes through signed
//! subtraction so a wrap never produces a spurious "not due yet" result.

/// `true` once `now_ms` has reached or passed `target_ms`, correct across
/// a `u32` wraparound of either value.
#[inline]
pub fn is_due(now_ms: u32, target_ms: u32) -> bool {
    (now_ms.wrapping_sub(target_ms) as i32) >= 0
}

/// `true` once at least `limit_ms` have elapsed since `start_ms`, as of
/// `now_ms`. Used by both the pending-counter accumulator and the C7
/// slice self-check.
#[inline]
pub fn elapsed_at_least(start_ms: u32, now_ms: u32, limit_ms: u32) -> bool {
    (now_ms.wrapping_sub(start_ms) as i32) >= limit_ms as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_exactly_at_target() {
        assert!(is_due(100, 100));
    }

    #[test]
    fn not_due_before_target() {
        assert!(!is_due(99, 100));
    }

    #[test]
    fn due_after_target() {
        assert!(is_due(500, 100));
    }

    #[test]
    fn due_survives_wraparound() {
        let now_ms: u32 = 5; // wrapped past u32::MAX
        let target_ms: u32 = u32::MAX - 2;
        assert!(is_due(now_ms, target_ms));
    }

    #[test]
    fn elapsed_at_least_boundary() {
        assert!(elapsed_at_least(1_000, 1_010, 10));
        assert!(!elapsed_at_least(1_000, 1_009, 10));
    }

    #[test]
    fn elapsed_at_least_wraps() {
        let start_ms = u32::MAX - 4;
        let now_ms = 5u32; // 10 ticks after start_ms, having wrapped
        assert!(elapsed_at_least(start_ms, now_ms, 10));
        assert!(!elapsed_at_least(start_ms, now_ms, 11));
    }
}
