//! Test and helper sources for setpoint_core

use setpoint_traits::{ReadingSource, Snapshot};

/// Returns the same snapshot every cycle.
#[derive(Debug, Clone, Default)]
pub struct FixedSource(pub Snapshot);

impl ReadingSource for FixedSource {
    fn sample(&mut self) -> Result<Snapshot, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.0.clone())
    }
}

/// A source that always errors; useful for exercising fault reporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingSource;

impl ReadingSource for FailingSource {
    fn sample(&mut self) -> Result<Snapshot, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("failing source")))
    }
}
