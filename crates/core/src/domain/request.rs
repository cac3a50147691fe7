use crate::domain::money::Money;
use crate::domain::risk::RiskScore;
use crate::engine::contribution::MAX_TIME_HORIZON_YEARS;
use crate::error::{ensure_input, PlanError};
use serde::{Deserialize, Serialize};

/// Largest accepted initial investment, in dollars.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;
/// Largest accepted monthly contribution, in dollars.
pub const MAX_MONTHLY_CONTRIBUTION: f64 = 1_000_000_000.0;

/// Raw plan request as it arrives from the request boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlanRequest {
    pub amount: f64,
    pub risk_score: i64,
    #[serde(default)]
    pub monthly_contribution: Option<f64>,
    /// Expected annual return in percent (0..=100).
    #[serde(default)]
    pub expected_return: Option<f64>,
    /// Years, 1..=50.
    #[serde(default)]
    pub time_horizon: Option<i64>,
}

/// A request that passed validation. Computation only ever sees this type.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInput {
    pub amount: Money,
    pub risk_score: RiskScore,
    pub contribution: Option<ContributionInput>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContributionInput {
    pub monthly: Money,
    /// Fraction, e.g. 0.07 for 7%.
    pub annual_return_rate: f64,
    pub time_horizon_years: u32,
}

impl PlanRequest {
    pub fn new(amount: f64, risk_score: i64) -> Self {
        Self {
            amount,
            risk_score,
            monthly_contribution: None,
            expected_return: None,
            time_horizon: None,
        }
    }

    pub fn with_contribution(mut self, monthly: f64, expected_return: f64, time_horizon: i64) -> Self {
        self.monthly_contribution = Some(monthly);
        self.expected_return = Some(expected_return);
        self.time_horizon = Some(time_horizon);
        self
    }

    /// Checks every field against its domain and returns the first failure.
    pub fn validate(&self) -> Result<PlanInput, PlanError> {
        let amount = validate_amount(self.amount)?;
        let risk_score = RiskScore::new(self.risk_score)?;

        let monthly = self
            .monthly_contribution
            .map(validate_monthly_contribution)
            .transpose()?;
        let annual_return_rate = self
            .expected_return
            .map(validate_expected_return)
            .transpose()?;
        let time_horizon_years = self.time_horizon.map(validate_time_horizon).transpose()?;

        let contribution = match monthly {
            Some(monthly) if monthly.is_positive() => {
                let annual_return_rate = annual_return_rate.ok_or_else(|| {
                    PlanError::invalid_input(
                        "expectedReturn is required when monthlyContribution is greater than 0",
                    )
                })?;
                let time_horizon_years = time_horizon_years.ok_or_else(|| {
                    PlanError::invalid_input(
                        "timeHorizon is required when monthlyContribution is greater than 0",
                    )
                })?;
                Some(ContributionInput {
                    monthly,
                    annual_return_rate,
                    time_horizon_years,
                })
            }
            _ => None,
        };

        Ok(PlanInput {
            amount,
            risk_score,
            contribution,
        })
    }
}

fn validate_amount(amount: f64) -> Result<Money, PlanError> {
    ensure_input!(
        amount.is_finite() && amount > 0.0,
        "amount must be greater than 0 (got {amount})"
    );
    ensure_input!(
        amount <= MAX_AMOUNT,
        "amount must be at most {MAX_AMOUNT} (got {amount})"
    );
    let money = Money::from_dollars(amount)
        .ok_or_else(|| PlanError::invalid_input("amount must be a finite number"))?;
    ensure_input!(
        money.is_positive(),
        "amount must be at least 0.01 (got {amount})"
    );
    Ok(money)
}

fn validate_monthly_contribution(monthly: f64) -> Result<Money, PlanError> {
    ensure_input!(
        monthly.is_finite() && monthly >= 0.0,
        "monthlyContribution must be 0 or greater (got {monthly})"
    );
    ensure_input!(
        monthly <= MAX_MONTHLY_CONTRIBUTION,
        "monthlyContribution must be at most {MAX_MONTHLY_CONTRIBUTION} (got {monthly})"
    );
    let money = Money::from_dollars(monthly)
        .ok_or_else(|| PlanError::invalid_input("monthlyContribution must be a finite number"))?;
    ensure_input!(
        monthly == 0.0 || money.is_positive(),
        "monthlyContribution must be 0 or at least 0.01 (got {monthly})"
    );
    Ok(money)
}

fn validate_expected_return(percent: f64) -> Result<f64, PlanError> {
    ensure_input!(
        percent.is_finite() && (0.0..=100.0).contains(&percent),
        "expectedReturn must be between 0 and 100 percent (got {percent})"
    );
    Ok(percent / 100.0)
}

fn validate_time_horizon(years: i64) -> Result<u32, PlanError> {
    ensure_input!(
        (1..=MAX_TIME_HORIZON_YEARS as i64).contains(&years),
        "timeHorizon must be between 1 and {MAX_TIME_HORIZON_YEARS} years (got {years})"
    );
    Ok(years as u32)
}
