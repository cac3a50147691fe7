use crate::domain::money::Money;
use crate::domain::risk::RiskBand;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// Field names below are consumed verbatim by the presentation and
// persistence layers. Renaming any of them is a breaking change.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerAllocation {
    pub ticker: String,
    /// Target weight as a fraction (0..=1).
    pub percentage: f64,
    pub dollar_amount: Money,
}

/// Value at each horizon (in years) with no further contributions.
pub type ExpectedReturns = BTreeMap<u32, Money>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyProjection {
    pub year: u32,
    pub value: Money,
    pub contributions: Money,
    pub growth: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyContributionResult {
    pub final_value: Money,
    pub total_contributions: Money,
    pub total_growth: Money,
    pub yearly_projections: Vec<YearlyProjection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub allocations: Vec<TickerAllocation>,
    pub expected_returns: ExpectedReturns,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_contribution: Option<MonthlyContributionResult>,
}

/// What the persistence collaborator stores for a saved plan: the plan
/// verbatim plus investment amount, risk label and save time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlanRecord {
    pub id: Uuid,
    pub investment_amount: Money,
    pub risk_level: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub plan: Plan,
}

impl SavedPlanRecord {
    pub fn new(plan: Plan, band: RiskBand, saved_at: DateTime<Utc>) -> Self {
        let investment_amount = plan.allocations.iter().map(|a| a.dollar_amount).sum();
        Self {
            id: Uuid::new_v4(),
            investment_amount,
            risk_level: band.risk_level().to_string(),
            timestamp: saved_at,
            plan,
        }
    }
}
