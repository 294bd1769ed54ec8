use serde::{Deserialize, Serialize};

use super::GameState;

/// Which side the pitcher throws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
}

impl Handedness {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "L" => Some(Handedness::Left),
            "R" => Some(Handedness::Right),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Handedness::Left => "L",
            Handedness::Right => "R",
        }
    }
}

/// One fully parsed pitch row. Consumed per row, never retained.
#[derive(Debug, Clone)]
pub struct PitchEvent {
    pub batter_id: u32,
    /// Horizontal location at the plate, feet from the center line.
    pub px: f64,
    /// Vertical location at the plate, feet above the ground.
    pub pz: f64,
    pub pitch_type: String,
    pub pitch_result: String,
    /// Terminal plate-appearance result; empty for mid-at-bat pitches.
    pub pa_result: String,
    pub pitcher_hand: Handedness,
    pub state: GameState,
    /// Probability this pitch is called a strike if taken. Supplied by the
    /// stream, not computed here.
    pub called_strike_prob: f64,
}
