//! Background control loop.
//!
//! Spawns one thread that owns the controller and its `ReadingSource`, waits
//! the initial delay, activates the controller, then runs exactly one cycle
//! per interval (up to `max_cycles`, if set). Each cycle's outcome is pushed
//! to a bounded channel.
//!
//! The handle owns the only shutdown flag. Dropping it (or calling `stop`)
//! signals the thread and joins it; sleeps are sliced so that happens within
//! roughly `util::SHUTDOWN_POLL`.
use crossbeam_channel as xch;
use setpoint_traits::{Clock, ReadingSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

pub use crossbeam_channel::RecvTimeoutError;

use crate::config::ScheduleCfg;
use crate::controller::TrimRespondController;
use crate::error::{ConfigError, ResetError, Result};
use crate::status::{CycleReport, CycleStatus};
use crate::util::sleep_unless;

/// Events buffered before the loop starts dropping them.
const EVENT_CAPACITY: usize = 1024;

/// Outcome of one scheduled cycle, numbered from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleEvent {
    pub cycle: u64,
    pub outcome: std::result::Result<CycleReport, ResetError>,
}

pub struct ControlLoop {
    rx: xch::Receiver<CycleEvent>,
    cycles: Arc<AtomicU64>,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<TrimRespondController>>,
}

impl ControlLoop {
    pub fn spawn<S, C>(
        mut controller: TrimRespondController,
        mut source: S,
        schedule: ScheduleCfg,
        clock: C,
    ) -> Result<Self>
    where
        S: ReadingSource + Send + 'static,
        C: Clock + Send + Sync + 'static,
    {
        if schedule.interval.is_zero() {
            return Err(eyre::Report::new(ConfigError::ZeroInterval));
        }
        let (tx, rx) = xch::bounded(EVENT_CAPACITY);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let cycles = Arc::new(AtomicU64::new(0));
        let cycles_clone = cycles.clone();

        let join_handle = std::thread::spawn(move || {
            if !sleep_unless(&clock, schedule.initial_delay, &shutdown_clone) {
                tracing::debug!("control loop stopped during initial delay");
                return controller;
            }
            controller.activate();
            tracing::info!(
                interval_ms = crate::util::millis(schedule.interval),
                setpoint = controller.setpoint(),
                "control loop started"
            );

            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("control loop received shutdown signal");
                    break;
                }
                if source.is_exhausted() {
                    tracing::info!("reading source exhausted");
                    break;
                }

                let outcome = match source.sample() {
                    Ok(snapshot) => match controller.cycle(&snapshot) {
                        CycleStatus::Adjusted(report) => Ok(report),
                        CycleStatus::Idle => Err(ResetError::State("controller inactive".into())),
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, "reading source failed; cycle skipped");
                        Err(ResetError::Source(e.to_string()))
                    }
                };
                let cycle = cycles_clone.fetch_add(1, Ordering::Relaxed) + 1;

                match tx.try_send(CycleEvent { cycle, outcome }) {
                    Ok(()) => {}
                    Err(xch::TrySendError::Full(_)) => {
                        tracing::trace!(cycle, "event channel full; event dropped");
                    }
                    Err(xch::TrySendError::Disconnected(_)) => {
                        tracing::debug!("control loop consumer disconnected, exiting thread");
                        break;
                    }
                }

                if schedule.max_cycles.is_some_and(|max| cycle >= max) {
                    tracing::debug!(cycle, "cycle limit reached");
                    break;
                }
                if !sleep_unless(&clock, schedule.interval, &shutdown_clone) {
                    break;
                }
            }
            controller.deactivate();
            tracing::info!(
                cycles = cycles_clone.load(Ordering::Relaxed),
                setpoint = controller.setpoint(),
                "control loop stopped"
            );
            controller
        });

        Ok(Self {
            rx,
            cycles,
            shutdown,
            join_handle: Some(join_handle),
        })
    }

    /// Ask the loop to finish after its current cycle without joining it.
    ///
    /// Keep calling `next_timeout` until `Disconnected` to see every cycle
    /// that ran, then `stop` to get the controller back.
    pub fn request_stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait up to `timeout` for the next event. `Disconnected` means the loop
    /// has ended and every event has been drained.
    pub fn next_timeout(&self, timeout: Duration) -> std::result::Result<CycleEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Cycles run so far, including ones whose events were dropped.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Signal shutdown, join the thread and hand back the controller with
    /// its final setpoint.
    pub fn stop(mut self) -> Result<TrimRespondController> {
        self.shutdown.store(true, Ordering::Relaxed);
        let handle = self
            .join_handle
            .take()
            .ok_or_else(|| eyre::Report::new(ResetError::State("control loop already joined".into())))?;
        handle
            .join()
            .map_err(|_| eyre::Report::new(ResetError::State("control loop thread panicked".into())))
    }
}

impl Drop for ControlLoop {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(_) => {
                    tracing::trace!("control loop thread joined");
                }
                Err(e) => {
                    tracing::warn!(?e, "control loop thread panicked during shutdown");
                }
            }
        }
    }
}
