//! Time helpers shared by the drivers.

use setpoint_traits::Clock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Longest uninterrupted sleep a driver takes before re-checking its stop flag.
pub const SHUTDOWN_POLL: Duration = Duration::from_millis(25);

/// Sleep for `total` in slices of at most [`SHUTDOWN_POLL`].
///
/// Returns `false` as soon as `stop` is observed set, `true` if the full
/// duration elapsed.
pub fn sleep_unless<C: Clock + ?Sized>(clock: &C, total: Duration, stop: &AtomicBool) -> bool {
    let mut left = total;
    while !left.is_zero() {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let slice = left.min(SHUTDOWN_POLL);
        clock.sleep(slice);
        left = left.saturating_sub(slice);
    }
    !stop.load(Ordering::Relaxed)
}

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
#[inline]
pub fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
