//! What one control cycle did.

use crate::controller::AdjustmentResult;
use crate::request::RequestTally;

/// Everything decided during a single active cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub tally: RequestTally,
    /// Condition the ceiling was evaluated under, if any.
    pub condition: Option<f64>,
    pub effective_max: f64,
    pub adjustment: AdjustmentResult,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleStatus {
    /// Controller inactive; readings were not consulted and nothing moved.
    Idle,
    Adjusted(CycleReport),
}

impl CycleStatus {
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            Self::Idle => None,
            Self::Adjusted(r) => Some(r),
        }
    }
}
