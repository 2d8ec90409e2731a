//! Recorded snapshots played back in order.
//!
//! CSV fixtures carry one snapshot per row:
//!
//! ```text
//! condition,r1,r2,r3
//! 62.5,0.41,0.88,0.93
//! ,0.40,0.91
//! ```
//!
//! An empty `condition` cell means no condition for that cycle. Rows may have
//! different lengths; empty reading cells are skipped.

use setpoint_traits::{ReadingSource, Snapshot};
use std::path::Path;

use crate::error::{Result, SourceError};

#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    frames: Vec<Snapshot>,
    pos: usize,
    looped: bool,
}

impl ReplaySource {
    pub fn new(frames: Vec<Snapshot>) -> Self {
        Self {
            frames,
            pos: 0,
            looped: false,
        }
    }

    /// Start over after the last frame instead of running dry.
    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    pub fn from_csv(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let frames = Self::read_frames(file)?;
        tracing::debug!(frames = frames.len(), path = %path.display(), "replay fixture loaded");
        Ok(Self::new(frames))
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        Ok(Self::new(Self::read_frames(reader)?))
    }

    fn read_frames<R: std::io::Read>(reader: R) -> Result<Vec<Snapshot>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let first = rdr.headers()?.get(0).unwrap_or_default().to_string();
        if first != "condition" {
            return Err(SourceError::Fixture(format!(
                "first column must be 'condition', got '{first}'"
            )));
        }

        let mut frames = Vec::new();
        for (idx, rec) in rdr.records().enumerate() {
            let rec = rec?;
            let line = idx + 2;
            let mut cells = rec.iter();
            let condition = match cells.next() {
                None | Some("") => None,
                Some(c) => Some(parse_cell(c, line)?),
            };
            let readings = cells
                .filter(|c| !c.is_empty())
                .map(|c| parse_cell(c, line))
                .collect::<Result<Vec<f64>>>()?;
            frames.push(Snapshot { readings, condition });
        }
        Ok(frames)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn parse_cell(cell: &str, line: usize) -> Result<f64> {
    cell.parse::<f64>()
        .map_err(|e| SourceError::Fixture(format!("row {line}: '{cell}': {e}")))
}

impl ReadingSource for ReplaySource {
    fn sample(&mut self) -> std::result::Result<Snapshot, Box<dyn std::error::Error + Send + Sync>> {
        if self.pos >= self.frames.len() {
            if self.looped && !self.frames.is_empty() {
                self.pos = 0;
            } else {
                return Err(Box::new(SourceError::Exhausted));
            }
        }
        let frame = self.frames[self.pos].clone();
        self.pos += 1;
        Ok(frame)
    }

    fn is_exhausted(&self) -> bool {
        if self.looped {
            self.frames.is_empty()
        } else {
            self.pos >= self.frames.len()
        }
    }
}
