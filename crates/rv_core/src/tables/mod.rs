//! Immutable run-expectancy lookup tables.
//!
//! Both tables are produced offline by the `table_builder` pipeline and
//! loaded once before any processing. Keys outside the trained domain are
//! reported as lookup misses by the engine; the season pass decides whether
//! that skips the row or aborts (see [`crate::season::UnknownStatePolicy`]).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{GameState, HitType};

#[derive(Error, Debug)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("table is empty: {path}")]
    Empty { path: String },
}

/// One serialized count-table row: a count/base state and its mean remaining
/// runs over the training data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountEntry {
    pub outs: u8,
    pub balls: u8,
    pub strikes: u8,
    pub first: bool,
    pub second: bool,
    pub third: bool,
    pub runs: f64,
}

/// One serialized hit-table row: mean runs scored when a given hit happens
/// from a given base-out state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitEntry {
    pub hit: HitType,
    pub first: bool,
    pub second: bool,
    pub third: bool,
    pub outs: u8,
    pub runs: f64,
}

/// (outs, balls, strikes, bases) -> expected remaining runs in the
/// half-inning. Read-only for the lifetime of a pass.
#[derive(Debug, Clone, Default)]
pub struct CountTable {
    entries: FxHashMap<GameState, f64>,
}

impl CountTable {
    pub fn from_entries(entries: impl IntoIterator<Item = CountEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| {
                (
                    GameState::new(e.outs, e.balls, e.strikes, e.first, e.second, e.third),
                    e.runs,
                )
            })
            .collect();
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self, TableError> {
        let reader = BufReader::new(File::open(path)?);
        let entries: Vec<CountEntry> = serde_json::from_reader(reader)?;
        if entries.is_empty() {
            return Err(TableError::Empty {
                path: path.display().to_string(),
            });
        }
        let table = Self::from_entries(entries);
        log::info!("Loaded count table: {} states from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn get(&self, state: &GameState) -> Option<f64> {
        self.entries.get(state).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitKey {
    pub hit: HitType,
    pub first: bool,
    pub second: bool,
    pub third: bool,
    pub outs: u8,
}

/// (hit type, bases, outs) -> expected runs scored on that hit.
#[derive(Debug, Clone, Default)]
pub struct HitTable {
    entries: FxHashMap<HitKey, f64>,
}

impl HitTable {
    pub fn from_entries(entries: impl IntoIterator<Item = HitEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| {
                (
                    HitKey {
                        hit: e.hit,
                        first: e.first,
                        second: e.second,
                        third: e.third,
                        outs: e.outs,
                    },
                    e.runs,
                )
            })
            .collect();
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self, TableError> {
        let reader = BufReader::new(File::open(path)?);
        let entries: Vec<HitEntry> = serde_json::from_reader(reader)?;
        if entries.is_empty() {
            return Err(TableError::Empty {
                path: path.display().to_string(),
            });
        }
        let table = Self::from_entries(entries);
        log::info!("Loaded hit table: {} states from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn get(&self, hit: HitType, state: &GameState) -> Option<f64> {
        self.entries
            .get(&HitKey {
                hit,
                first: state.first,
                second: state.second,
                third: state.third,
                outs: state.outs,
            })
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_count_table_lookup() {
        let table = CountTable::from_entries(vec![CountEntry {
            outs: 1,
            balls: 2,
            strikes: 1,
            first: true,
            second: false,
            third: false,
            runs: 0.84,
        }]);

        let hit = GameState::new(1, 2, 1, true, false, false);
        let miss = GameState::new(0, 0, 0, false, false, false);
        assert_eq!(table.get(&hit), Some(0.84));
        assert_eq!(table.get(&miss), None);
    }

    #[test]
    fn test_hit_table_lookup() {
        let table = HitTable::from_entries(vec![HitEntry {
            hit: HitType::Double,
            first: false,
            second: true,
            third: false,
            outs: 2,
            runs: 1.12,
        }]);

        let state = GameState::new(2, 0, 1, false, true, false);
        assert_eq!(table.get(HitType::Double, &state), Some(1.12));
        assert_eq!(table.get(HitType::Single, &state), None);
    }

    #[test]
    fn test_load_rejects_empty_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[]").unwrap();

        let result = CountTable::load(file.path());
        assert!(matches!(result, Err(TableError::Empty { .. })));
    }

    #[test]
    fn test_load_round_trip() {
        let entries = vec![
            CountEntry {
                outs: 0,
                balls: 0,
                strikes: 0,
                first: false,
                second: false,
                third: false,
                runs: 0.51,
            },
            CountEntry {
                outs: 2,
                balls: 3,
                strikes: 2,
                first: true,
                second: true,
                third: true,
                runs: 0.77,
            },
        ];

        let mut file = tempfile::NamedTempFile::new().unwrap();
        serde_json::to_writer(&mut file, &entries).unwrap();
        file.flush().unwrap();

        let table = CountTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get(&GameState::new(2, 3, 2, true, true, true)),
            Some(0.77)
        );
    }
}
