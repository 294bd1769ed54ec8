//! Season orchestration: a single strictly ordered pass over a season's
//! pitch stream.
//!
//! For every row the orchestrator first values the pitch against the
//! batter's CURRENT profile, emits the row with the three value columns
//! appended, and only then folds the pitch's own outcome into the profile.
//! That ordering keeps a pitch's outcome out of its own valuation; it also
//! means early-season pitches are valued against sparse or absent data.
//! That cold start is intended — warm-start a pass from a prior registry
//! when cross-season memory is wanted.
//!
//! The augmented output is written row by row to a temp sibling and renamed
//! into place at the end of the pass, so an interrupted pass never leaves a
//! truncated file under the output name.

pub mod error;
mod row;

pub use error::SeasonError;

use std::fs::{rename, File};
use std::path::Path;

use crate::engine::RunExpectancy;
use crate::error::EngineError;
use crate::model::PitchEvent;
use crate::registry::BatterRegistry;

use row::Columns;

/// What to do when a pitch's count/base state has no table entry.
///
/// The tables are trained on all legal states, so a miss normally means the
/// tables and the stream disagree; failing loudly is the default. `SkipRow`
/// keeps streaming and drops only the offending row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownStatePolicy {
    #[default]
    Fail,
    SkipRow,
}

/// Counters for one pass over a pitch stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassStats {
    /// Data rows read from the stream.
    pub rows: u64,
    /// Rows dropped whole: malformed fields, or unknown states under
    /// [`UnknownStatePolicy::SkipRow`].
    pub skipped: u64,
    /// Rows written to the augmented output.
    pub emitted: u64,
    /// Rows that carried swing and take values.
    pub valued: u64,
    /// Rows where the batter had a profile but the bucket had no swings.
    pub no_data: u64,
    /// Rows folded into a batter profile.
    pub observed: u64,
}

struct RowValues {
    prior: f64,
    swing: Option<f64>,
    take: Option<f64>,
}

/// Owns the batter registry for the duration of a pass and threads the
/// run-expectancy engine over the stream.
pub struct Season {
    run_exp: RunExpectancy,
    registry: BatterRegistry,
    policy: UnknownStatePolicy,
}

impl Season {
    /// Start cold: every batter begins the pass with no history.
    pub fn new(run_exp: RunExpectancy) -> Self {
        Self::with_registry(run_exp, BatterRegistry::new())
    }

    /// Warm start from a previously persisted registry.
    pub fn with_registry(run_exp: RunExpectancy, registry: BatterRegistry) -> Self {
        Self {
            run_exp,
            registry,
            policy: UnknownStatePolicy::default(),
        }
    }

    pub fn with_unknown_state_policy(mut self, policy: UnknownStatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn registry(&self) -> &BatterRegistry {
        &self.registry
    }

    /// Hand the registry back at pass end, for persistence.
    pub fn into_registry(self) -> BatterRegistry {
        self.registry
    }

    /// Stream `input`, append `runExpPrior`/`runExpSwing`/`runExpTake` to
    /// every surviving row, and write the augmented stream to `output`.
    pub fn process_file(&mut self, input: &Path, output: &Path) -> Result<PassStats, SeasonError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(input)?;
        let headers = reader.headers()?.clone();
        let cols = Columns::from_headers(&headers)?;

        let temp_path = output.with_extension("tmp");
        let file = File::create(&temp_path)?;
        let mut stats = PassStats::default();

        {
            let mut writer = csv::Writer::from_writer(&file);

            let mut out_headers = headers.clone();
            out_headers.push_field("runExpPrior");
            out_headers.push_field("runExpSwing");
            out_headers.push_field("runExpTake");
            writer.write_record(&out_headers)?;

            for result in reader.records() {
                let record = result?;
                stats.rows += 1;

                let Some(event) = row::parse_event(&record, &cols) else {
                    stats.skipped += 1;
                    continue;
                };

                let Some(values) = self.value_row(&event)? else {
                    stats.skipped += 1;
                    continue;
                };

                let mut out = record.clone();
                out.push_field(&format_value(Some(values.prior)));
                out.push_field(&format_value(values.swing));
                out.push_field(&format_value(values.take));
                writer.write_record(&out)?;
                stats.emitted += 1;
                if values.swing.is_some() {
                    stats.valued += 1;
                }
                if values.swing.is_none() && values.take.is_none() && self.has_profile(&event) {
                    stats.no_data += 1;
                }

                self.observe(&event);
                stats.observed += 1;
            }

            writer.flush()?;
        }

        file.sync_all()?;
        rename(&temp_path, output)?;

        log::info!(
            "Augmented pass complete: {} rows, {} emitted, {} valued, {} skipped, {} batters",
            stats.rows,
            stats.emitted,
            stats.valued,
            stats.skipped,
            self.registry.len()
        );
        Ok(stats)
    }

    /// Stream `input` into the registry only: no valuation, no output file.
    /// Used to seed a warm start for a later pass.
    pub fn process_season(&mut self, input: &Path) -> Result<PassStats, SeasonError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(input)?;
        let headers = reader.headers()?.clone();
        let cols = Columns::from_headers(&headers)?;

        let mut stats = PassStats::default();
        for result in reader.records() {
            let record = result?;
            stats.rows += 1;

            let Some(event) = row::parse_event(&record, &cols) else {
                stats.skipped += 1;
                continue;
            };

            self.observe(&event);
            stats.observed += 1;
        }

        log::info!(
            "Training pass complete: {} rows, {} observed, {} skipped, {} batters",
            stats.rows,
            stats.observed,
            stats.skipped,
            self.registry.len()
        );
        Ok(stats)
    }

    fn has_profile(&self, event: &PitchEvent) -> bool {
        !event.state.is_inning_over() && self.registry.contains(event.batter_id)
    }

    /// Value one pitch against the batter's current profile. `Ok(None)`
    /// means the row is dropped under the unknown-state policy.
    fn value_row(&self, event: &PitchEvent) -> Result<Option<RowValues>, SeasonError> {
        let prior = match self.run_exp.expected_runs(event.state) {
            Ok(v) => v,
            Err(e) => return self.on_lookup_miss(e),
        };

        let mut swing = None;
        let mut take = None;

        if !event.state.is_inning_over() {
            if let Some(profile) = self.registry.profile(event.batter_id) {
                match self.run_exp.value_if_swing(
                    event.state,
                    event.px,
                    event.pz,
                    &event.pitch_type,
                    event.pitcher_hand,
                    profile,
                ) {
                    Ok(Some(s)) => {
                        match self
                            .run_exp
                            .value_if_take(event.state, event.called_strike_prob)
                        {
                            Ok(t) => {
                                swing = Some(s);
                                take = Some(t);
                            }
                            Err(e) => return self.on_lookup_miss(e),
                        }
                    }
                    // No swings recorded at the bucket: both values are
                    // indeterminate for this row.
                    Ok(None) => {}
                    Err(e @ EngineError::InvalidState { .. }) => {
                        // Advancement could not reproduce the table's run
                        // value; only the swing valuation is lost.
                        log::warn!("swing valuation dropped for batter {}: {e}", event.batter_id);
                        match self
                            .run_exp
                            .value_if_take(event.state, event.called_strike_prob)
                        {
                            Ok(t) => take = Some(t),
                            Err(e) => return self.on_lookup_miss(e),
                        }
                    }
                    Err(e) => return self.on_lookup_miss(e),
                }
            }
        }

        Ok(Some(RowValues { prior, swing, take }))
    }

    fn on_lookup_miss(&self, error: EngineError) -> Result<Option<RowValues>, SeasonError> {
        match self.policy {
            UnknownStatePolicy::SkipRow => {
                log::warn!("skipping row outside the trained table domain: {error}");
                Ok(None)
            }
            UnknownStatePolicy::Fail => Err(error.into()),
        }
    }

    fn observe(&mut self, event: &PitchEvent) {
        self.registry.profile_mut(event.batter_id).observe(
            event.px,
            event.pz,
            &event.pitch_type,
            &event.pitch_result,
            &event.pa_result,
            event.pitcher_hand,
        );
    }
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{toy_count_table, toy_hit_table};
    use crate::tables::{CountTable, HitTable};
    use std::io::Write;

    const HEADER: &str = "batterId,px,pz,pitchType,pitchResult,paResult,outs,balls,strikes,\
                          manOnFirst,manOnSecond,manOnThird,probCalledStrike,pitcherHand";

    fn engine() -> RunExpectancy {
        RunExpectancy::new(toy_count_table(), toy_hit_table(|_| 0.4))
    }

    fn write_stream(dir: &tempfile::TempDir, rows: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join("pitches.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        path
    }

    fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader.records().map(|r| r.unwrap()).collect()
    }

    // Same batter, same bucket throughout.
    fn pitch(pitch_result: &str, pa_result: &str) -> String {
        format!("7,0.0,2.6,FF,{pitch_result},{pa_result},0,0,0,FALSE,FALSE,FALSE,0.5,R")
    }

    #[test]
    fn test_first_pitch_has_prior_but_no_decision_values() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_stream(&dir, &[&pitch("IP", "S"), &pitch("SS", "")]);
        let output = dir.path().join("augmented.csv");

        let mut season = Season::new(engine());
        let stats = season.process_file(&input, &output).unwrap();

        assert_eq!(stats.rows, 2);
        assert_eq!(stats.emitted, 2);
        assert_eq!(stats.valued, 1);

        let rows = read_rows(&output);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 17);

        // Cold start: prior present, swing/take blank.
        assert!(!rows[0][14].is_empty());
        assert_eq!(&rows[0][15], "");
        assert_eq!(&rows[0][16], "");

        // Second pitch sees the first one's outcome.
        assert!(!rows[1][15].is_empty());
        assert!(!rows[1][16].is_empty());
    }

    #[test]
    fn test_malformed_row_is_dropped_whole() {
        let dir = tempfile::tempdir().unwrap();
        let bad = "7,oops,2.6,FF,IP,S,0,0,0,FALSE,FALSE,FALSE,0.5,R";
        let input = write_stream(&dir, &[bad, &pitch("IP", "S")]);
        let output = dir.path().join("augmented.csv");

        let mut season = Season::new(engine());
        let stats = season.process_file(&input, &output).unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.emitted, 1);
        // The malformed row fed nothing into the profile either: the good
        // row is this batter's first, so it gets no decision values.
        let rows = read_rows(&output);
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][15], "");
    }

    #[test]
    fn test_unknown_state_fails_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_stream(&dir, &[&pitch("B", "")]);
        let output = dir.path().join("augmented.csv");

        let mut season = Season::new(RunExpectancy::new(
            CountTable::default(),
            HitTable::default(),
        ));
        let result = season.process_file(&input, &output);
        assert!(matches!(
            result,
            Err(SeasonError::Engine(EngineError::UnknownState { .. }))
        ));
        // The pass failed before the atomic rename: no output file.
        assert!(!output.exists());
    }

    #[test]
    fn test_unknown_state_skips_under_policy() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_stream(&dir, &[&pitch("B", ""), &pitch("SL", "")]);
        let output = dir.path().join("augmented.csv");

        let mut season = Season::new(RunExpectancy::new(
            CountTable::default(),
            HitTable::default(),
        ))
        .with_unknown_state_policy(UnknownStatePolicy::SkipRow);

        let stats = season.process_file(&input, &output).unwrap();
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.emitted, 0);
        assert!(read_rows(&output).is_empty());
    }

    #[test]
    fn test_inning_over_rows_keep_prior_only() {
        let dir = tempfile::tempdir().unwrap();
        let ended = "7,0.0,2.6,FF,B,,3,0,0,FALSE,FALSE,FALSE,0.5,R";
        let input = write_stream(&dir, &[&pitch("IP", "S"), ended]);
        let output = dir.path().join("augmented.csv");

        let mut season = Season::new(engine());
        season.process_file(&input, &output).unwrap();

        let rows = read_rows(&output);
        assert_eq!(&rows[1][14], "0");
        assert_eq!(&rows[1][15], "");
        assert_eq!(&rows[1][16], "");
    }

    #[test]
    fn test_training_pass_builds_registry_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_stream(&dir, &[&pitch("IP", "S"), &pitch("SS", "")]);

        let mut season = Season::new(engine());
        let stats = season.process_season(&input).unwrap();

        assert_eq!(stats.observed, 2);
        assert_eq!(stats.emitted, 0);
        let registry = season.into_registry();
        assert!(registry.contains(7));
    }

    #[test]
    fn test_warm_start_values_from_the_first_pitch() {
        let dir = tempfile::tempdir().unwrap();
        let train = write_stream(&dir, &[&pitch("IP", "S"), &pitch("SS", "")]);

        let mut trainer = Season::new(engine());
        trainer.process_season(&train).unwrap();
        let registry = trainer.into_registry();

        let dir2 = tempfile::tempdir().unwrap();
        let input = write_stream(&dir2, &[&pitch("F", "")]);
        let output = dir2.path().join("augmented.csv");

        let mut season = Season::with_registry(engine(), registry);
        let stats = season.process_file(&input, &output).unwrap();

        assert_eq!(stats.valued, 1);
        let rows = read_rows(&output);
        assert!(!rows[0][15].is_empty());
    }

    #[test]
    fn test_valuation_ignores_later_pitches_but_not_earlier_ones() {
        let engine_for = engine;
        let probe_index = 2; // third pitch of the batter

        let value_of_probe = |rows: &[String]| -> String {
            let dir = tempfile::tempdir().unwrap();
            let refs: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
            let input = write_stream(&dir, &refs);
            let output = dir.path().join("augmented.csv");
            let mut season = Season::new(engine_for());
            season.process_file(&input, &output).unwrap();
            read_rows(&output)[probe_index][15].to_string()
        };

        let early_a = pitch("IP", "S");
        let early_b = pitch("F", "");
        // A taken two-strike pitch: at two strikes a foul in the history
        // (count holds) and a miss (strikeout) value very differently.
        let probe = "7,0.0,2.6,FF,SL,,0,0,2,FALSE,FALSE,FALSE,0.5,R".to_string();
        let late_a = pitch("SS", "");
        let late_b = pitch("IP", "D");

        let baseline = value_of_probe(&[
            early_a.clone(),
            early_b.clone(),
            probe.clone(),
            late_a.clone(),
        ]);

        // Replacing everything after the probe changes nothing about it.
        let with_other_future = value_of_probe(&[
            early_a.clone(),
            early_b.clone(),
            probe.clone(),
            late_b.clone(),
        ]);
        assert_eq!(baseline, with_other_future);

        // Swapping a pitch across the probe does change its valuation.
        let with_other_history =
            value_of_probe(&[early_a, late_a, probe, early_b]);
        assert_ne!(baseline, with_other_history);
    }
}
