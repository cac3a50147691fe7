use crate::error::{ensure_input, PlanError};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_RISK_SCORE: u8 = 1;
pub const MAX_RISK_SCORE: u8 = 10;

/// A validated 1..=10 risk tolerance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RiskScore(u8);

impl RiskScore {
    /// Out-of-range scores are rejected, never clamped.
    pub fn new(score: i64) -> Result<Self, PlanError> {
        ensure_input!(
            (MIN_RISK_SCORE as i64..=MAX_RISK_SCORE as i64).contains(&score),
            "riskScore must be between {MIN_RISK_SCORE} and {MAX_RISK_SCORE} (got {score})"
        );
        Ok(Self(score as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskBand {
    pub const ALL: [RiskBand; 3] = [
        RiskBand::Conservative,
        RiskBand::Moderate,
        RiskBand::Aggressive,
    ];

    /// Label stored alongside saved plans.
    pub fn risk_level(&self) -> &'static str {
        match self {
            Self::Conservative => "Low",
            Self::Moderate => "Moderate",
            Self::Aggressive => "High",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conservative => write!(f, "Conservative"),
            Self::Moderate => write!(f, "Moderate"),
            Self::Aggressive => write!(f, "Aggressive"),
        }
    }
}
