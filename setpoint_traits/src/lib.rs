//! Seams between the setpoint engine and the outside world.
//!
//! The engine never fetches data or sleeps on its own; a `ReadingSource`
//! supplies one snapshot per control cycle and a `Clock` paces the loop.

pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Readings gathered for a single control cycle.
///
/// `readings` holds one value per terminal unit (damper position fraction,
/// zone temperature, ...). `condition` is the external condition that drives a
/// dynamic ceiling, typically outside-air temperature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub readings: Vec<f64>,
    pub condition: Option<f64>,
}

impl Snapshot {
    pub fn new(readings: Vec<f64>) -> Self {
        Self {
            readings,
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: f64) -> Self {
        self.condition = Some(condition);
        self
    }
}

pub trait ReadingSource {
    fn sample(&mut self) -> Result<Snapshot, Box<dyn std::error::Error + Send + Sync>>;

    /// A finite source (e.g. a replayed recording) returns `true` once it has
    /// nothing left to give. Drivers stop instead of sampling again.
    fn is_exhausted(&self) -> bool {
        false
    }
}

impl<S: ReadingSource + ?Sized> ReadingSource for Box<S> {
    fn sample(&mut self) -> Result<Snapshot, Box<dyn std::error::Error + Send + Sync>> {
        (**self).sample()
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}
