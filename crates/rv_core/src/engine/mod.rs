//! Run-expectancy engine: count transitions, runner advancement, and the
//! swing/take decision values built on top of them.
//!
//! All functions are pure over the two lookup tables. State transitions
//! return the expected remaining runs of the half-inning after the event,
//! plus any runs the event itself scores.

pub mod advancement;
pub mod valuation;

pub use advancement::advance_runners;
pub use valuation::TripleWeighting;

use crate::error::EngineError;
use crate::model::GameState;
use crate::tables::{CountTable, HitTable};

pub struct RunExpectancy {
    count_table: CountTable,
    hit_table: HitTable,
    triple_weighting: TripleWeighting,
}

impl RunExpectancy {
    pub fn new(count_table: CountTable, hit_table: HitTable) -> Self {
        Self {
            count_table,
            hit_table,
            triple_weighting: TripleWeighting::default(),
        }
    }

    pub fn with_triple_weighting(mut self, weighting: TripleWeighting) -> Self {
        self.triple_weighting = weighting;
        self
    }

    pub fn triple_weighting(&self) -> TripleWeighting {
        self.triple_weighting
    }

    pub(crate) fn hit_table(&self) -> &HitTable {
        &self.hit_table
    }

    /// Expected remaining runs in the half-inning from `state`.
    ///
    /// Zero once the third out is recorded, regardless of count or bases.
    pub fn expected_runs(&self, state: GameState) -> Result<f64, EngineError> {
        if state.is_inning_over() {
            return Ok(0.0);
        }
        self.count_table
            .get(&state)
            .ok_or(EngineError::UnknownState { state })
    }

    /// Expected runs after a strike (called or swinging miss).
    ///
    /// A third strike with two outs ends the half-inning; otherwise it ends
    /// the at-bat and the next batter starts with a fresh count.
    pub fn on_strike(&self, state: GameState) -> Result<f64, EngineError> {
        let mut next = state;
        if state.strikes == 2 {
            if state.outs == 2 {
                return Ok(0.0);
            }
            next.outs += 1;
            next.strikes = 0;
            next.balls = 0;
        } else {
            next.strikes += 1;
        }
        self.expected_runs(next)
    }

    /// Expected runs after a ball, including the run a bases-loaded walk
    /// forces in.
    ///
    /// On ball four, forces are resolved against the pre-walk occupancy: the
    /// batter always takes first; a runner already on first pushes second; a
    /// first-and-second pair pushes third; bases loaded scores exactly one
    /// run and stays loaded. Without a runner on first nothing is forced.
    pub fn on_ball(&self, state: GameState) -> Result<f64, EngineError> {
        let mut next = state;
        let mut forced_runs = 0.0;
        if state.balls == 3 {
            if state.first && state.second && state.third {
                forced_runs = 1.0;
            } else if state.first && state.second {
                next.third = true;
            } else if state.first {
                next.second = true;
            }
            next.first = true;
        } else {
            next.balls += 1;
        }
        Ok(forced_runs + self.expected_runs(next)?)
    }

    /// Expected runs after an out recorded on a ball in play.
    pub fn on_out(&self, state: GameState) -> Result<f64, EngineError> {
        if state.outs == 2 {
            return Ok(0.0);
        }
        let mut next = state;
        next.outs += 1;
        self.expected_runs(next)
    }

    /// Expected runs after a foul. Two-strike fouls leave the count alone.
    pub fn on_foul(&self, state: GameState) -> Result<f64, EngineError> {
        let mut next = state;
        if state.strikes < 2 {
            next.strikes += 1;
        }
        self.expected_runs(next)
    }
}
