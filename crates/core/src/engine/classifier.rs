use crate::domain::risk::{RiskBand, RiskScore};
use crate::error::PlanError;

// Inclusive upper bounds of the lower bands.
const CONSERVATIVE_MAX: u8 = 3;
const MODERATE_MAX: u8 = 7;

/// Maps a raw 1..=10 risk score to its band. Out-of-range scores are `InvalidInput`.
pub fn classify(risk_score: i64) -> Result<RiskBand, PlanError> {
    Ok(band_for(RiskScore::new(risk_score)?))
}

pub fn band_for(score: RiskScore) -> RiskBand {
    match score.value() {
        s if s <= CONSERVATIVE_MAX => RiskBand::Conservative,
        s if s <= MODERATE_MAX => RiskBand::Moderate,
        _ => RiskBand::Aggressive,
    }
}
