//! Pitch-result and plate-appearance-result code sets.
//!
//! Codes follow the pitch-stream vocabulary: pitch results such as `SS`
//! (swinging strike), `F`/`FT` (fouls), `IP` (in play), `B` (ball), `SL`
//! (called strike); plate-appearance results such as `K`, `IP_OUT`, `DP`,
//! `S`/`D`/`T`/`HR`.

/// Pitch types that never feed the profile: pitchouts, intentional and
/// automatic balls/strikes, unknown.
pub fn is_ignored_pitch_type(code: &str) -> bool {
    matches!(code, "PO" | "IN" | "AB" | "AS" | "UN")
}

/// Pitch results that never feed the profile: hit-by-pitch, intentional
/// balls, automatic calls, catcher interference, unknown.
pub fn is_ignored_pitch_result(code: &str) -> bool {
    matches!(code, "HBP" | "IB" | "AS" | "AB" | "CI" | "UK")
}

/// Plate-appearance results that never feed the profile: interference calls
/// and no-plays.
pub fn is_ignored_pa_result(code: &str) -> bool {
    matches!(code, "BI" | "CI" | "FI" | "NO_PLAY")
}

/// The batter offered at the pitch.
pub fn is_swing(code: &str) -> bool {
    matches!(code, "SS" | "F" | "FT" | "IP")
}

/// Foul territory, including foul tips.
pub fn is_foul(code: &str) -> bool {
    matches!(code, "F" | "FT")
}

/// Swing and miss.
pub fn is_miss(code: &str) -> bool {
    code == "SS"
}

/// Out-making plate-appearance results and the number of outs each one is
/// worth in the profile's out channel. Strikeouts carry no weight here: the
/// miss channel already accounts for them swing by swing.
pub fn out_weight(code: &str) -> Option<u32> {
    match code {
        "K" => Some(0),
        "IP_OUT" | "FC" | "SH" | "SF" => Some(1),
        "DP" => Some(2),
        "TP" => Some(3),
        _ => None,
    }
}
