use thiserror::Error;

use crate::model::{GameState, HitType};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("no run-expectancy entry for count state {state:?}")]
    UnknownState { state: GameState },

    #[error(
        "no runner advancement yields {target} runs for a {hit:?} \
         with occupancy mask {occupied:#05b}"
    )]
    InvalidState {
        occupied: u8,
        target: u32,
        hit: HitType,
    },

    #[error("no hit-value entry for {hit:?} with {outs} outs")]
    UnknownHit { hit: HitType, outs: u8 },
}
