//! Pitch-stream row parsing: header resolution and per-row field extraction.

use csv::StringRecord;

use super::SeasonError;
use crate::model::{GameState, Handedness, PitchEvent};

/// Resolved indices of the required pitch-stream columns.
#[derive(Debug, Clone)]
pub(crate) struct Columns {
    batter_id: usize,
    px: usize,
    pz: usize,
    pitch_type: usize,
    pitch_result: usize,
    pa_result: usize,
    outs: usize,
    balls: usize,
    strikes: usize,
    first: usize,
    second: usize,
    third: usize,
    called_strike_prob: usize,
    pitcher_hand: usize,
}

impl Columns {
    pub fn from_headers(headers: &StringRecord) -> Result<Self, SeasonError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| SeasonError::MissingColumn {
                    name: name.to_string(),
                })
        };
        Ok(Self {
            batter_id: find("batterId")?,
            px: find("px")?,
            pz: find("pz")?,
            pitch_type: find("pitchType")?,
            pitch_result: find("pitchResult")?,
            pa_result: find("paResult")?,
            outs: find("outs")?,
            balls: find("balls")?,
            strikes: find("strikes")?,
            first: find("manOnFirst")?,
            second: find("manOnSecond")?,
            third: find("manOnThird")?,
            called_strike_prob: find("probCalledStrike")?,
            pitcher_hand: find("pitcherHand")?,
        })
    }
}

fn parse_finite(field: &str) -> Option<f64> {
    let value = field.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

fn parse_flag(field: &str) -> bool {
    field.trim() == "TRUE"
}

/// Parse one record into a [`PitchEvent`]. `None` means a required field is
/// missing or malformed and the row must be skipped whole — no valuation, no
/// profile update.
pub(crate) fn parse_event(record: &StringRecord, cols: &Columns) -> Option<PitchEvent> {
    let batter_id = record.get(cols.batter_id)?.trim().parse::<u32>().ok()?;
    let px = parse_finite(record.get(cols.px)?)?;
    let pz = parse_finite(record.get(cols.pz)?)?;
    let outs = record.get(cols.outs)?.trim().parse::<u8>().ok()?;
    let balls = record.get(cols.balls)?.trim().parse::<u8>().ok()?;
    let strikes = record.get(cols.strikes)?.trim().parse::<u8>().ok()?;
    let first = parse_flag(record.get(cols.first)?);
    let second = parse_flag(record.get(cols.second)?);
    let third = parse_flag(record.get(cols.third)?);
    let called_strike_prob = record
        .get(cols.called_strike_prob)?
        .trim()
        .parse::<f64>()
        .ok()?;
    let pitcher_hand = Handedness::from_code(record.get(cols.pitcher_hand)?.trim())?;

    Some(PitchEvent {
        batter_id,
        px,
        pz,
        pitch_type: record.get(cols.pitch_type)?.trim().to_string(),
        pitch_result: record.get(cols.pitch_result)?.trim().to_string(),
        pa_result: record.get(cols.pa_result)?.trim().to_string(),
        pitcher_hand,
        state: GameState::new(outs, balls, strikes, first, second, third),
        called_strike_prob,
    })
}
