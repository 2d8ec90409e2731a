//! Concrete `ReadingSource` implementations.
//!
//! - `SyntheticSource`: uniform random readings, for demos and soak runs.
//! - `ReplaySource`: recorded snapshots played back in order.
pub mod error;
pub mod replay;
pub mod synthetic;

pub use error::SourceError;
pub use replay::ReplaySource;
pub use synthetic::{Range, SyntheticSource};
