use serde::{Deserialize, Serialize};

/// Count and base-runner state at the moment a pitch is thrown.
///
/// `outs == 3` is terminal: the half-inning is over, expected runs are zero
/// and the state is never a count-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    pub outs: u8,
    pub balls: u8,
    pub strikes: u8,
    pub first: bool,
    pub second: bool,
    pub third: bool,
}

impl GameState {
    pub fn new(outs: u8, balls: u8, strikes: u8, first: bool, second: bool, third: bool) -> Self {
        Self {
            outs,
            balls,
            strikes,
            first,
            second,
            third,
        }
    }

    /// Three outs end the half-inning.
    pub fn is_inning_over(&self) -> bool {
        self.outs >= 3
    }

    /// Base occupancy as a 3-bit mask: third=bit2, second=bit1, first=bit0.
    pub fn base_mask(&self) -> u8 {
        (self.third as u8) << 2 | (self.second as u8) << 1 | self.first as u8
    }

    /// Same bases, fresh 0-0 count. Used after a ball in play.
    pub fn fresh_count(outs: u8, first: bool, second: bool, third: bool) -> Self {
        Self::new(outs, 0, 0, first, second, third)
    }
}

/// The four hit outcomes a swing can produce in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitType {
    #[serde(rename = "S")]
    Single,
    #[serde(rename = "D")]
    Double,
    #[serde(rename = "T")]
    Triple,
    #[serde(rename = "HR")]
    HomeRun,
}

impl HitType {
    pub const ALL: [HitType; 4] = [
        HitType::Single,
        HitType::Double,
        HitType::Triple,
        HitType::HomeRun,
    ];

    /// Base distance on the occupancy bit scale (single advances one bit,
    /// double two, and so on).
    pub fn base_value(self) -> u32 {
        match self {
            HitType::Single => 1,
            HitType::Double => 2,
            HitType::Triple => 4,
            HitType::HomeRun => 8,
        }
    }

    /// Plate-appearance result code as it appears in the pitch stream.
    pub fn code(self) -> &'static str {
        match self {
            HitType::Single => "S",
            HitType::Double => "D",
            HitType::Triple => "T",
            HitType::HomeRun => "HR",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(HitType::Single),
            "D" => Some(HitType::Double),
            "T" => Some(HitType::Triple),
            "HR" => Some(HitType::HomeRun),
            _ => None,
        }
    }
}
