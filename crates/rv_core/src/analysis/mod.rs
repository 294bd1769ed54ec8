//! Batter-level rollups over the augmented pitch stream.
//!
//! Consumes only the augmented output columns — never the registry or the
//! tables — so it can run long after a pass, on its own.

pub mod leaderboard;

pub use leaderboard::{build_leaderboard, write_leaderboard, AnalysisError, BatterLine};
