//! Swing/take decision leaderboards.
//!
//! A pitch counts toward a batter's line only when all three value columns
//! are present: rows valued against an empty bucket carry no decision
//! information. Value added/lost splits on whether the chosen action was the
//! better one at that pitch.

use std::fs::{rename, File};
use std::path::Path;

use rustc_hash::FxHashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column: {name}")]
    MissingColumn { name: String },
}

/// The batter offered at the pitch.
fn swung(pitch_result: &str) -> bool {
    matches!(pitch_result, "IP" | "SS" | "F" | "FT" | "MB")
}

/// The batter let the pitch go by.
fn took(pitch_result: &str) -> bool {
    matches!(pitch_result, "B" | "SL" | "BID")
}

/// One batter's aggregated decision value over a season.
#[derive(Debug, Clone, Default)]
pub struct BatterLine {
    pub batter_id: u32,
    /// Completed plate appearances, used for the minimum-PA filter.
    pub plate_appearances: u64,
    /// Pitches carrying decision values.
    pub pitches: u64,
    pub swings: u64,
    pub takes: u64,
    /// Sum of (swing − prior) on swings where swinging was the better call.
    pub swing_value_added: f64,
    /// Sum of (swing − prior) on swings where it was not.
    pub swing_value_lost: f64,
    /// Sum of (take − prior) on takes where taking was the better call.
    pub take_value_added: f64,
    /// Sum of (take − prior) on takes where it was not.
    pub take_value_lost: f64,
    /// Sum of the chosen action's value over the prior, all decisions.
    pub net_value: f64,
}

impl BatterLine {
    /// Net decision value normalized per 100 decided pitches.
    pub fn net_per_100(&self) -> f64 {
        let decisions = self.swings + self.takes;
        if decisions == 0 {
            return 0.0;
        }
        self.net_value / decisions as f64 * 100.0
    }
}

struct AugmentedColumns {
    batter_id: usize,
    pitch_result: usize,
    pa_result: usize,
    prior: usize,
    swing: usize,
    take: usize,
}

impl AugmentedColumns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, AnalysisError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| AnalysisError::MissingColumn {
                    name: name.to_string(),
                })
        };
        Ok(Self {
            batter_id: find("batterId")?,
            pitch_result: find("pitchResult")?,
            pa_result: find("paResult")?,
            prior: find("runExpPrior")?,
            swing: find("runExpSwing")?,
            take: find("runExpTake")?,
        })
    }
}

/// Aggregate an augmented pitch stream into per-batter lines, sorted by net
/// decision value, best first. Batters under `min_pa` completed plate
/// appearances are dropped when a threshold is given.
pub fn build_leaderboard(
    input: &Path,
    min_pa: Option<u64>,
) -> Result<Vec<BatterLine>, AnalysisError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(input)?;
    let headers = reader.headers()?.clone();
    let cols = AugmentedColumns::from_headers(&headers)?;

    let mut lines: FxHashMap<u32, BatterLine> = FxHashMap::default();

    for result in reader.records() {
        let record = result?;
        let Some(batter_id) = record
            .get(cols.batter_id)
            .and_then(|f| f.trim().parse::<u32>().ok())
        else {
            continue;
        };

        let line = lines.entry(batter_id).or_insert_with(|| BatterLine {
            batter_id,
            ..BatterLine::default()
        });

        if record
            .get(cols.pa_result)
            .is_some_and(|f| !f.trim().is_empty())
        {
            line.plate_appearances += 1;
        }

        let parse = |i: usize| {
            record
                .get(i)
                .and_then(|f| f.trim().parse::<f64>().ok())
        };
        let (Some(prior), Some(swing), Some(take)) =
            (parse(cols.prior), parse(cols.swing), parse(cols.take))
        else {
            continue;
        };

        let pitch_result = record.get(cols.pitch_result).unwrap_or("").trim();
        let d_swing = swing - prior;
        let d_take = take - prior;
        let should_swing = swing > take;

        line.pitches += 1;
        if swung(pitch_result) {
            line.swings += 1;
            if should_swing {
                line.swing_value_added += d_swing;
            } else {
                line.swing_value_lost += d_swing;
            }
            line.net_value += d_swing;
        } else if took(pitch_result) {
            line.takes += 1;
            if swing < take {
                line.take_value_added += d_take;
            } else {
                line.take_value_lost += d_take;
            }
            line.net_value += d_take;
        }
    }

    let mut lines: Vec<BatterLine> = lines
        .into_values()
        .filter(|line| min_pa.map_or(true, |min| line.plate_appearances >= min))
        .collect();
    lines.sort_by(|a, b| {
        b.net_value
            .partial_cmp(&a.net_value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    log::info!("Leaderboard built: {} batters from {}", lines.len(), input.display());
    Ok(lines)
}

/// Write a leaderboard as CSV, atomically.
pub fn write_leaderboard(output: &Path, lines: &[BatterLine]) -> Result<(), AnalysisError> {
    let temp_path = output.with_extension("tmp");
    let file = File::create(&temp_path)?;

    {
        let mut writer = csv::Writer::from_writer(&file);
        writer.write_record([
            "batterId",
            "pa",
            "pitches",
            "swings",
            "takes",
            "swingValueAdded",
            "swingValueLost",
            "takeValueAdded",
            "takeValueLost",
            "netValue",
            "netPer100",
        ])?;
        for line in lines {
            writer.write_record([
                line.batter_id.to_string(),
                line.plate_appearances.to_string(),
                line.pitches.to_string(),
                line.swings.to_string(),
                line.takes.to_string(),
                format!("{:.2}", line.swing_value_added),
                format!("{:.2}", line.swing_value_lost),
                format!("{:.2}", line.take_value_added),
                format!("{:.2}", line.take_value_lost),
                format!("{:.2}", line.net_value),
                format!("{:.4}", line.net_per_100()),
            ])?;
        }
        writer.flush()?;
    }

    file.sync_all()?;
    rename(&temp_path, output)?;
    Ok(())
}
