//! Per-batter outcome profiles: location-bucketed swing-outcome counters and
//! the conditional probabilities derived from them.

pub mod codes;
pub mod grid;
pub mod location;

pub use grid::{HeatGrid, GRID_SIZE};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::model::Handedness;

/// The outcome categories a swing is valued over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingOutcome {
    Single,
    Double,
    Triple,
    Homer,
    Miss,
    Out,
    Foul,
}

/// One batter's accumulated pitch history, split by pitcher hand and pitch
/// type. Grids are created lazily on the first observed pitch of a pairing;
/// reads never materialize a grid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatterProfile {
    pub vs_left: FxHashMap<String, HeatGrid>,
    pub vs_right: FxHashMap<String, HeatGrid>,
}

impl BatterProfile {
    pub fn new() -> Self {
        Self::default()
    }

    fn grids(&self, hand: Handedness) -> &FxHashMap<String, HeatGrid> {
        match hand {
            Handedness::Left => &self.vs_left,
            Handedness::Right => &self.vs_right,
        }
    }

    fn grids_mut(&mut self, hand: Handedness) -> &mut FxHashMap<String, HeatGrid> {
        match hand {
            Handedness::Left => &mut self.vs_left,
            Handedness::Right => &mut self.vs_right,
        }
    }

    pub fn grid(&self, hand: Handedness, pitch_type: &str) -> Option<&HeatGrid> {
        self.grids(hand).get(pitch_type)
    }

    /// Number of (hand, pitch type) grids accumulated so far.
    pub fn grid_count(&self) -> usize {
        self.vs_left.len() + self.vs_right.len()
    }

    /// Fold one observed pitch into the profile.
    ///
    /// Pitches with an ignored pitch type, pitch result, or plate-appearance
    /// result are dropped without touching any counter. Otherwise the bucket
    /// always counts the pitch; a swing-type result bumps the swing channel,
    /// then at most one of foul/miss (fouls win over misses), then at most
    /// one of the out/hit channels (out subtypes checked before hit codes).
    pub fn observe(
        &mut self,
        px: f64,
        pz: f64,
        pitch_type: &str,
        pitch_result: &str,
        pa_result: &str,
        hand: Handedness,
    ) {
        if codes::is_ignored_pitch_type(pitch_type)
            || codes::is_ignored_pitch_result(pitch_result)
            || codes::is_ignored_pa_result(pa_result)
        {
            return;
        }

        let (i, j) = location::bucket(px, pz);
        let grid = self
            .grids_mut(hand)
            .entry(pitch_type.to_string())
            .or_default();

        grid.total[i][j] += 1;
        if codes::is_swing(pitch_result) {
            grid.swings[i][j] += 1;
        }
        if codes::is_foul(pitch_result) {
            grid.fouls[i][j] += 1;
        } else if codes::is_miss(pitch_result) {
            grid.misses[i][j] += 1;
        }
        if let Some(weight) = codes::out_weight(pa_result) {
            grid.outs[i][j] += weight;
        } else {
            match pa_result {
                "S" => grid.singles[i][j] += 1,
                "D" => grid.doubles[i][j] += 1,
                "T" => grid.triples[i][j] += 1,
                "HR" => grid.homers[i][j] += 1,
                _ => {}
            }
        }
    }

    /// P(outcome | swing) at the pitch's bucket, or `None` when no swings
    /// have been recorded there (or the pairing has no grid at all). The
    /// missing value is deliberate: absence of data is not a zero
    /// probability.
    pub fn outcome_probability(
        &self,
        outcome: SwingOutcome,
        px: f64,
        pz: f64,
        pitch_type: &str,
        hand: Handedness,
    ) -> Option<f64> {
        let grid = self.grid(hand, pitch_type)?;
        let (i, j) = location::bucket(px, pz);
        let swings = grid.swings[i][j];
        if swings == 0 {
            return None;
        }
        let count = match outcome {
            SwingOutcome::Single => grid.singles[i][j],
            SwingOutcome::Double => grid.doubles[i][j],
            SwingOutcome::Triple => grid.triples[i][j],
            SwingOutcome::Homer => grid.homers[i][j],
            SwingOutcome::Miss => grid.misses[i][j],
            SwingOutcome::Out => grid.outs[i][j],
            SwingOutcome::Foul => grid.fouls[i][j],
        };
        Some(count as f64 / swings as f64)
    }

    /// P(swing) at the pitch's bucket: swings over all pitches seen there.
    pub fn swing_rate(
        &self,
        px: f64,
        pz: f64,
        pitch_type: &str,
        hand: Handedness,
    ) -> Option<f64> {
        let grid = self.grid(hand, pitch_type)?;
        let (i, j) = location::bucket(px, pz);
        let total = grid.total[i][j];
        if total == 0 {
            return None;
        }
        Some(grid.swings[i][j] as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PX: f64 = 0.0;
    const PZ: f64 = 2.6;

    fn bucket_of() -> (usize, usize) {
        location::bucket(PX, PZ)
    }

    #[test]
    fn test_ignored_codes_touch_nothing() {
        let mut profile = BatterProfile::new();
        profile.observe(PX, PZ, "PO", "B", "", Handedness::Right);
        profile.observe(PX, PZ, "FF", "HBP", "", Handedness::Right);
        profile.observe(PX, PZ, "FF", "IP", "NO_PLAY", Handedness::Right);
        assert_eq!(profile.grid_count(), 0);
    }

    #[test]
    fn test_observe_counts_channels() {
        let mut profile = BatterProfile::new();
        profile.observe(PX, PZ, "FF", "IP", "S", Handedness::Left);
        profile.observe(PX, PZ, "FF", "SS", "", Handedness::Left);
        profile.observe(PX, PZ, "FF", "B", "", Handedness::Left);

        let grid = profile.grid(Handedness::Left, "FF").unwrap();
        let (i, j) = bucket_of();
        assert_eq!(grid.total[i][j], 3);
        assert_eq!(grid.swings[i][j], 2);
        assert_eq!(grid.singles[i][j], 1);
        assert_eq!(grid.misses[i][j], 1);
        assert_eq!(grid.fouls[i][j], 0);
        assert!(profile.grid(Handedness::Right, "FF").is_none());
    }

    #[test]
    fn test_out_channel_accumulates_weights() {
        let mut profile = BatterProfile::new();
        let (i, j) = bucket_of();

        profile.observe(PX, PZ, "SL", "IP", "IP_OUT", Handedness::Right);
        assert_eq!(profile.grid(Handedness::Right, "SL").unwrap().outs[i][j], 1);

        profile.observe(PX, PZ, "SL", "IP", "IP_OUT", Handedness::Right);
        assert_eq!(profile.grid(Handedness::Right, "SL").unwrap().outs[i][j], 2);

        // A double play is worth two outs in one observation.
        profile.observe(PX, PZ, "SL", "IP", "DP", Handedness::Right);
        assert_eq!(profile.grid(Handedness::Right, "SL").unwrap().outs[i][j], 4);
    }

    #[test]
    fn test_foul_probability_dilutes_with_new_swings() {
        let mut profile = BatterProfile::new();
        profile.observe(PX, PZ, "CU", "F", "", Handedness::Right);
        assert_eq!(
            profile.outcome_probability(SwingOutcome::Foul, PX, PZ, "CU", Handedness::Right),
            Some(1.0)
        );

        profile.observe(PX, PZ, "CU", "SS", "", Handedness::Right);
        assert_eq!(
            profile.outcome_probability(SwingOutcome::Foul, PX, PZ, "CU", Handedness::Right),
            Some(0.5)
        );
    }

    #[test]
    fn test_no_swings_is_indeterminate() {
        let mut profile = BatterProfile::new();
        // A taken ball counts toward total but not swings.
        profile.observe(PX, PZ, "FF", "B", "", Handedness::Right);
        assert_eq!(
            profile.outcome_probability(SwingOutcome::Single, PX, PZ, "FF", Handedness::Right),
            None
        );
        assert_eq!(
            profile.swing_rate(PX, PZ, "FF", Handedness::Right),
            Some(0.0)
        );
        // Unseen pitch type: not even a total count.
        assert_eq!(profile.swing_rate(PX, PZ, "CH", Handedness::Right), None);
    }

    #[test]
    fn test_foul_tip_checked_before_miss() {
        let mut profile = BatterProfile::new();
        profile.observe(PX, PZ, "FF", "FT", "", Handedness::Right);
        let grid = profile.grid(Handedness::Right, "FF").unwrap();
        let (i, j) = bucket_of();
        assert_eq!(grid.fouls[i][j], 1);
        assert_eq!(grid.misses[i][j], 0);
    }

    #[test]
    fn test_strikeout_weighs_zero_outs() {
        let mut profile = BatterProfile::new();
        profile.observe(PX, PZ, "FF", "SS", "K", Handedness::Right);
        let grid = profile.grid(Handedness::Right, "FF").unwrap();
        let (i, j) = bucket_of();
        assert_eq!(grid.outs[i][j], 0);
        assert_eq!(grid.misses[i][j], 1);
    }
}
