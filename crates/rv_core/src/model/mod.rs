//! Shared state-model types: count/base state, hit types, pitch events.

pub mod game_state;
pub mod pitch;

pub use game_state::{GameState, HitType};
pub use pitch::{Handedness, PitchEvent};
