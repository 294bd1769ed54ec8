use serde::{Deserialize, Serialize};

/// Cells per side of the zone grid.
pub const GRID_SIZE: usize = 5;

type Cells = [[u32; GRID_SIZE]; GRID_SIZE];

/// Outcome counters for one (pitcher hand, pitch type) pairing, bucketed
/// over a 5x5 zone grid.
///
/// Counters are zero-initialized on first sight of the pairing, never reset,
/// and only ever incremented; a grid seeded from a prior season keeps
/// accumulating on top of its old counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatGrid {
    pub singles: Cells,
    pub doubles: Cells,
    pub triples: Cells,
    pub homers: Cells,
    /// Swings and misses.
    pub misses: Cells,
    /// In-play outs, weighted by how many outs the play produced.
    pub outs: Cells,
    pub fouls: Cells,
    /// Any swing: misses, fouls, and balls in play.
    pub swings: Cells,
    /// Every pitch seen at the bucket, swung at or not.
    pub total: Cells,
}

impl HeatGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total pitches recorded across all buckets.
    pub fn pitches(&self) -> u64 {
        self.total
            .iter()
            .flat_map(|row| row.iter())
            .map(|&n| n as u64)
            .sum()
    }
}
