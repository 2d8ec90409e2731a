#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Adaptive setpoint and start-time engine (I/O-free).
//!
//! Two independent algorithm families share this crate:
//!
//! - **Trim and respond**: rank terminal-unit readings, ignore the top
//!   outliers, count requests, then nudge a plant setpoint by one bounded step
//!   per cycle (`request`, `bound`, `controller`).
//! - **Optimal start**: learn three smoothed coefficients from past warm-ups
//!   and predict how early equipment must start (`estimator`), with a
//!   nearest-history interpolation alternative (`interpolate`).
//!
//! Readings come in through `setpoint_traits::ReadingSource`; the engine
//! never fetches data or schedules itself. `scheduler::ControlLoop` and
//! `runner::run_cycles` are optional drivers for hosts that want one.

pub mod bound;
pub mod builder;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod error;
pub mod estimator;
pub mod interpolate;
pub mod mocks;
pub mod request;
pub mod runner;
pub mod scheduler;
pub mod status;
pub mod util;

pub use bound::{Ceiling, DynamicBound};
pub use builder::ControllerBuilder;
pub use config::{BoundCfg, EstimatorCfg, InterpolationCfg, ScheduleCfg, TrimRespondCfg};
pub use controller::{AdjustmentResult, ControlState, Direction, TrimRespondController, apply_step};
pub use error::{ConfigError, DegenerateInput, ResetError};
pub use estimator::{
    AdaptiveLinearEstimator, Coefficients, CurrentConditions, ForgettingFactor,
    HistoricalObservation, UpdateSummary,
};
pub use interpolate::NearestHistoryEstimator;
pub use request::{RequestCounter, RequestTally};
pub use status::{CycleReport, CycleStatus};
pub use runner::run_cycles;
pub use scheduler::{ControlLoop, CycleEvent};
