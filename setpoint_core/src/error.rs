use thiserror::Error;

/// Invalid configuration, detected once at construction time.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("condition_high ({high}) must be greater than condition_low ({low})")]
    InvertedConditionRange { low: f64, high: f64 },
    #[error("min ({min}) must not exceed max ({max})")]
    InvertedBounds { min: f64, max: f64 },
    #[error("initial setpoint {initial} lies outside [{min}, {max}]")]
    InitialOutOfBounds { initial: f64, min: f64, max: f64 },
    #[error("forgetting factor {0} must be in (0, 1]")]
    ForgettingFactorOutOfRange(f64),
    #[error("late start limit ({low}) must not exceed early start limit ({high})")]
    InvertedStartLimits { low: f64, high: f64 },
    #[error("max step magnitude must be >= 0, got {0}")]
    NegativeStepLimit(f64),
    #[error("ignore count must be >= 0, got {0}")]
    NegativeIgnoreCount(i64),
    #[error("{0} must be finite")]
    NonFinite(&'static str),
    #[error("cycle interval must be non-zero")]
    ZeroInterval,
    #[error("missing {0}")]
    Missing(&'static str),
}

/// An input the start-time model cannot divide by.
///
/// Reported per observation (which is then skipped) or per estimate; never
/// turned into NaN or infinity inside the estimator state.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum DegenerateInput {
    #[error("occupied setpoint equals zone temperature ({0})")]
    SetpointEqualsZoneTemp(f64),
    #[error("occupied setpoint equals outdoor temperature ({0})")]
    SetpointEqualsOutdoorTemp(f64),
    #[error("outdoor coefficient is zero")]
    ZeroOutdoorCoefficient,
    #[error("{0} is not finite")]
    NonFinite(&'static str),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResetError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("degenerate input: {0}")]
    Degenerate(#[from] DegenerateInput),
    #[error("reading source error: {0}")]
    Source(String),
    #[error("invalid state: {0}")]
    State(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
