//! Table Builder - Play-by-Play CSV → Run-Expectancy Table Pipeline
//!
//! Offline, one-time statistics job. Reads a season's play-by-play rows and
//! produces the two JSON lookup tables `rv_core` loads before a pass:
//!
//! - **Count table**: every row is tagged with its half-inning's total runs
//!   (`runsHome` summed over the (gameString, inning, side) group, missing
//!   values as zero); the table is the mean of that total per
//!   (outs, balls, strikes, bases) state.
//! - **Hit table**: rows whose plate-appearance result is a hit; the table
//!   is the mean `runsHome` per (hit type, bases, outs) state.
//!
//! Artifacts are deterministically sorted entry lists plus a metadata record
//! with a SHA-256 checksum for integrity verification.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use rv_core::model::{GameState, HitType};
use rv_core::tables::{CountEntry, HitEntry};

/// Build provenance for a table artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMetadata {
    pub schema_version: String,
    /// SHA-256 of the written artifact bytes, hex encoded.
    pub checksum: String,
    pub created_at: String,
    /// Play-by-play rows that contributed to the table.
    pub source_rows: u64,
    /// Distinct states in the table.
    pub entries: usize,
}

/// Per-run parse counters.
#[derive(Debug, Clone, Default)]
pub struct ParseStats {
    pub total_rows: u64,
    pub parsed: u64,
    pub failed: u64,
}

struct PlayRow {
    /// (gameString, inning, side) flattened into one key.
    half_inning: String,
    state: GameState,
    pa_result: String,
    runs_home: f64,
}

struct PlayColumns {
    game: usize,
    inning: usize,
    side: usize,
    outs: usize,
    balls: usize,
    strikes: usize,
    first: usize,
    second: usize,
    third: usize,
    pa_result: usize,
    runs_home: usize,
}

impl PlayColumns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .with_context(|| format!("play-by-play file is missing column '{}'", name))
        };
        Ok(Self {
            game: find("gameString")?,
            inning: find("inning")?,
            side: find("side")?,
            outs: find("outs")?,
            balls: find("balls")?,
            strikes: find("strikes")?,
            first: find("manOnFirst")?,
            second: find("manOnSecond")?,
            third: find("manOnThird")?,
            pa_result: find("paResult")?,
            runs_home: find("runsHome")?,
        })
    }
}

fn parse_rows(csv_path: &Path) -> Result<(Vec<PlayRow>, ParseStats)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open play-by-play file: {}", csv_path.display()))?;
    let headers = reader.headers()?.clone();
    let cols = PlayColumns::from_headers(&headers)?;

    let mut rows = Vec::new();
    let mut stats = ParseStats::default();

    for result in reader.records() {
        stats.total_rows += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                stats.failed += 1;
                eprintln!("Warning: Line {} - CSV parse error: {}", stats.total_rows, e);
                continue;
            }
        };

        let field = |i: usize| record.get(i).unwrap_or("").trim();
        let parse_u8 = |i: usize| field(i).parse::<u8>();

        let (outs, balls, strikes) =
            match (parse_u8(cols.outs), parse_u8(cols.balls), parse_u8(cols.strikes)) {
                (Ok(o), Ok(b), Ok(s)) => (o, b, s),
                _ => {
                    stats.failed += 1;
                    eprintln!("Warning: Line {} - invalid count fields, skipping", stats.total_rows);
                    continue;
                }
            };

        let inning = field(cols.inning);
        if inning.is_empty() {
            stats.failed += 1;
            continue;
        }

        // Missing runsHome means no runs scored on the row.
        let runs_home = field(cols.runs_home).parse::<f64>().unwrap_or(0.0);

        rows.push(PlayRow {
            half_inning: format!(
                "{}|{}|{}",
                field(cols.game),
                inning,
                field(cols.side)
            ),
            state: GameState::new(
                outs,
                balls,
                strikes,
                field(cols.first) == "TRUE",
                field(cols.second) == "TRUE",
                field(cols.third) == "TRUE",
            ),
            pa_result: field(cols.pa_result).to_string(),
            runs_home,
        });
        stats.parsed += 1;
    }

    if rows.is_empty() {
        anyhow::bail!("No valid play-by-play rows parsed from CSV");
    }

    Ok((rows, stats))
}

fn count_entries(rows: &[PlayRow]) -> Vec<CountEntry> {
    // Total runs per half-inning, then the mean of that total per state.
    let mut half_totals: FxHashMap<&str, f64> = FxHashMap::default();
    for row in rows {
        *half_totals.entry(&row.half_inning).or_default() += row.runs_home;
    }

    let mut sums: FxHashMap<GameState, (f64, u64)> = FxHashMap::default();
    for row in rows {
        let total = half_totals[row.half_inning.as_str()];
        let slot = sums.entry(row.state).or_default();
        slot.0 += total;
        slot.1 += 1;
    }

    let mut entries: Vec<CountEntry> = sums
        .into_iter()
        .map(|(state, (sum, n))| CountEntry {
            outs: state.outs,
            balls: state.balls,
            strikes: state.strikes,
            first: state.first,
            second: state.second,
            third: state.third,
            runs: sum / n as f64,
        })
        .collect();
    entries.sort_by_key(|e| (e.outs, e.balls, e.strikes, e.first, e.second, e.third));
    entries
}

fn hit_entries(rows: &[PlayRow]) -> Vec<HitEntry> {
    let mut sums: FxHashMap<(HitType, bool, bool, bool, u8), (f64, u64)> = FxHashMap::default();
    for row in rows {
        let Some(hit) = HitType::from_code(&row.pa_result) else {
            continue;
        };
        let key = (
            hit,
            row.state.first,
            row.state.second,
            row.state.third,
            row.state.outs,
        );
        let slot = sums.entry(key).or_default();
        slot.0 += row.runs_home;
        slot.1 += 1;
    }

    let mut entries: Vec<HitEntry> = sums
        .into_iter()
        .map(|((hit, first, second, third, outs), (sum, n))| HitEntry {
            hit,
            first,
            second,
            third,
            outs,
            runs: sum / n as f64,
        })
        .collect();
    entries.sort_by_key(|e| (e.hit.code(), e.first, e.second, e.third, e.outs));
    entries
}

fn write_artifact<T: Serialize>(
    out_path: &Path,
    entries: &[T],
    schema_version: &str,
    source_rows: u64,
) -> Result<TableMetadata> {
    let json = serde_json::to_vec_pretty(entries).context("Failed to serialize table entries")?;

    let mut hasher = Sha256::new();
    hasher.update(&json);
    let checksum = format!("{:x}", hasher.finalize());

    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
        }
    }
    fs::write(out_path, &json)
        .with_context(|| format!("Failed to write table file: {}", out_path.display()))?;

    Ok(TableMetadata {
        schema_version: schema_version.to_string(),
        checksum,
        created_at: chrono::Utc::now().to_rfc3339(),
        source_rows,
        entries: entries.len(),
    })
}

/// Build the count-state run-expectancy table.
///
/// Pipeline: play-by-play CSV → half-inning run totals → per-state means →
/// sorted JSON entry list + metadata.
pub fn build_count_table(
    csv_path: &Path,
    out_path: &Path,
    schema_version: &str,
) -> Result<TableMetadata> {
    println!("Parsing play-by-play: {}", csv_path.display());
    let (rows, stats) = parse_rows(csv_path)?;
    println!(
        "Parsed {} rows (failed: {}, total: {})",
        stats.parsed, stats.failed, stats.total_rows
    );

    let entries = count_entries(&rows);
    write_artifact(out_path, &entries, schema_version, stats.parsed)
}

/// Build the hit-type run-expectancy table.
///
/// Pipeline: play-by-play CSV → hit rows only → per-(hit, bases, outs)
/// means → sorted JSON entry list + metadata.
pub fn build_hit_table(
    csv_path: &Path,
    out_path: &Path,
    schema_version: &str,
) -> Result<TableMetadata> {
    println!("Parsing play-by-play: {}", csv_path.display());
    let (rows, stats) = parse_rows(csv_path)?;
    println!(
        "Parsed {} rows (failed: {}, total: {})",
        stats.parsed, stats.failed, stats.total_rows
    );

    let entries = hit_entries(&rows);
    write_artifact(out_path, &entries, schema_version, stats.parsed)
}

/// Verify a table artifact against its recorded checksum.
pub fn verify_table(table_path: &Path, checksum: &str) -> Result<bool> {
    let bytes = fs::read(table_path)
        .with_context(|| format!("Failed to read table file: {}", table_path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()) == checksum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rv_core::tables::{CountTable, HitTable};
    use std::io::Write;

    const HEADER: &str = "gameString,inning,side,outs,balls,strikes,\
                          manOnFirst,manOnSecond,manOnThird,paResult,runsHome";

    fn write_pbp(dir: &tempfile::TempDir, rows: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join("pbp.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        path
    }

    #[test]
    fn test_count_table_means_half_inning_totals() {
        let dir = tempfile::tempdir().unwrap();
        // Two half-innings: the first scores 2 in total, the second 0. The
        // 0-0-0 empty state appears once in each, so its mean is 1.0.
        let input = write_pbp(
            &dir,
            &[
                "g1,1,T,0,0,0,FALSE,FALSE,FALSE,,0",
                "g1,1,T,0,0,1,FALSE,FALSE,FALSE,HR,2",
                "g1,1,B,0,0,0,FALSE,FALSE,FALSE,,",
                "g1,1,B,0,0,1,FALSE,FALSE,FALSE,K,0",
            ],
        );
        let out = dir.path().join("count.json");

        let meta = build_count_table(&input, &out, "v1").unwrap();
        assert_eq!(meta.source_rows, 4);
        assert_eq!(meta.entries, 2);
        assert!(verify_table(&out, &meta.checksum).unwrap());

        let table = CountTable::load(&out).unwrap();
        let empty = GameState::new(0, 0, 0, false, false, false);
        assert_eq!(table.get(&empty), Some(1.0));
        let one_strike = GameState::new(0, 0, 1, false, false, false);
        assert_eq!(table.get(&one_strike), Some(1.0));
    }

    #[test]
    fn test_hit_table_means_by_hit_and_state() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pbp(
            &dir,
            &[
                "g1,1,T,1,0,0,TRUE,FALSE,FALSE,S,1",
                "g1,2,T,1,0,0,TRUE,FALSE,FALSE,S,0",
                "g1,3,T,1,0,0,TRUE,FALSE,FALSE,D,2",
                "g1,4,T,1,0,0,TRUE,FALSE,FALSE,K,0",
            ],
        );
        let out = dir.path().join("hits.json");

        let meta = build_hit_table(&input, &out, "v1").unwrap();
        assert_eq!(meta.entries, 2);

        let table = HitTable::load(&out).unwrap();
        let state = GameState::new(1, 0, 0, true, false, false);
        assert_eq!(table.get(HitType::Single, &state), Some(0.5));
        assert_eq!(table.get(HitType::Double, &state), Some(2.0));
        assert_eq!(table.get(HitType::Triple, &state), None);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pbp(
            &dir,
            &[
                "g1,1,T,zero,0,0,FALSE,FALSE,FALSE,,0",
                "g1,1,T,0,0,0,FALSE,FALSE,FALSE,,1",
            ],
        );
        let out = dir.path().join("count.json");

        let meta = build_count_table(&input, &out, "v1").unwrap();
        assert_eq!(meta.source_rows, 1);
    }

    #[test]
    fn test_verify_detects_tampering() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pbp(&dir, &["g1,1,T,0,0,0,FALSE,FALSE,FALSE,,1"]);
        let out = dir.path().join("count.json");

        let meta = build_count_table(&input, &out, "v1").unwrap();
        std::fs::write(&out, b"[]").unwrap();
        assert!(!verify_table(&out, &meta.checksum).unwrap());
    }
}
