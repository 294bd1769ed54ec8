//! Decision-value composition: expected runs if the batter swings or takes.

use super::{advance_runners, RunExpectancy};
use crate::error::EngineError;
use crate::heatmap::{BatterProfile, SwingOutcome};
use crate::model::{GameState, Handedness, HitType};

/// Probability source for the triple term of the swing valuation.
///
/// Triples are by far the sparsest hit channel, so the weight applied to the
/// triple consequence is a swappable choice rather than a fixed formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TripleWeighting {
    /// Weight the triple consequence by the observed double rate.
    #[default]
    DoubleRate,
    /// Weight the triple consequence by the observed triple rate.
    TripleRate,
}

impl RunExpectancy {
    /// Expected runs when `hit` lands from `state`: the mean runs the hit
    /// scores plus the expected runs of the resulting fresh-count state.
    ///
    /// The mean run value is rounded to the nearest whole number to resolve
    /// runner advancement.
    pub fn value_on_hit(&self, state: GameState, hit: HitType) -> Result<f64, EngineError> {
        let runs = self
            .hit_table()
            .get(hit, &state)
            .ok_or(EngineError::UnknownHit {
                hit,
                outs: state.outs,
            })?;
        let target = runs.round().max(0.0) as u32;
        let (first, second, third) =
            advance_runners(state.first, state.second, state.third, target, hit)?;
        let after = GameState::fresh_count(state.outs, first, second, third);
        Ok(runs + self.expected_runs(after)?)
    }

    /// Expected runs if the batter swings at this pitch: the sum over swing
    /// outcomes of P(outcome | swing at this location) times the outcome's
    /// run consequence.
    ///
    /// Returns `Ok(None)` when the profile has no swings recorded at this
    /// (hand, pitch type, location) bucket — no data means the value is
    /// indeterminate, not zero.
    pub fn value_if_swing(
        &self,
        state: GameState,
        px: f64,
        pz: f64,
        pitch_type: &str,
        hand: Handedness,
        profile: &BatterProfile,
    ) -> Result<Option<f64>, EngineError> {
        let prob = |outcome| profile.outcome_probability(outcome, px, pz, pitch_type, hand);

        let single = self.value_on_hit(state, HitType::Single)?;
        let Some(p_single) = prob(SwingOutcome::Single) else {
            return Ok(None);
        };
        let double = self.value_on_hit(state, HitType::Double)?;
        let Some(p_double) = prob(SwingOutcome::Double) else {
            return Ok(None);
        };
        let triple = self.value_on_hit(state, HitType::Triple)?;
        let p_triple = match self.triple_weighting() {
            TripleWeighting::DoubleRate => prob(SwingOutcome::Double),
            TripleWeighting::TripleRate => prob(SwingOutcome::Triple),
        };
        let Some(p_triple) = p_triple else {
            return Ok(None);
        };
        let homer = self.value_on_hit(state, HitType::HomeRun)?;
        let Some(p_homer) = prob(SwingOutcome::Homer) else {
            return Ok(None);
        };
        let Some(p_miss) = prob(SwingOutcome::Miss) else {
            return Ok(None);
        };
        let miss = self.on_strike(state)?;
        let Some(p_out) = prob(SwingOutcome::Out) else {
            return Ok(None);
        };
        let out = self.on_out(state)?;
        let Some(p_foul) = prob(SwingOutcome::Foul) else {
            return Ok(None);
        };
        let foul = self.on_foul(state)?;

        Ok(Some(
            p_single * single
                + p_double * double
                + p_triple * triple
                + p_homer * homer
                + p_miss * miss
                + p_out * out
                + p_foul * foul,
        ))
    }

    /// Expected runs if the batter takes this pitch: the called-strike
    /// probability splits the outcome between a strike and a ball.
    pub fn value_if_take(
        &self,
        state: GameState,
        called_strike_prob: f64,
    ) -> Result<f64, EngineError> {
        let strike_runs = self.on_strike(state)?;
        let ball_runs = self.on_ball(state)?;
        Ok(called_strike_prob * strike_runs + (1.0 - called_strike_prob) * ball_runs)
    }
}
