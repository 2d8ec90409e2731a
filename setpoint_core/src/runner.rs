//! Synchronous driver: a fixed number of cycles, no timers.
//!
//! Used for replaying recorded snapshots and in tests where the scheduled
//! loop's pacing would only get in the way.

use setpoint_traits::ReadingSource;

use crate::controller::TrimRespondController;
use crate::error::ResetError;
use crate::scheduler::CycleEvent;
use crate::status::CycleStatus;

/// Activate `controller` and run up to `n` cycles back to back.
///
/// Stops early once `source` reports exhaustion. Source faults are recorded
/// in the returned events and do not end the run.
pub fn run_cycles<S>(controller: &mut TrimRespondController, source: &mut S, n: u64) -> Vec<CycleEvent>
where
    S: ReadingSource + ?Sized,
{
    controller.activate();
    let mut events = Vec::new();
    for cycle in 1..=n {
        if source.is_exhausted() {
            tracing::debug!(cycle, "reading source exhausted");
            break;
        }
        let outcome = match source.sample() {
            Ok(snapshot) => match controller.cycle(&snapshot) {
                CycleStatus::Adjusted(report) => Ok(report),
                CycleStatus::Idle => Err(ResetError::State("controller inactive".into())),
            },
            Err(e) => {
                tracing::warn!(cycle, error = %e, "reading source failed; cycle skipped");
                Err(ResetError::Source(e.to_string()))
            }
        };
        events.push(CycleEvent { cycle, outcome });
    }
    events
}
