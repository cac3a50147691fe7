//! Year-by-year projection with a fixed monthly contribution.
//!
//! Compounding is monthly at the effective monthly rate
//! `(1 + annual)^(1/12) - 1`. Each month the balance compounds first and the
//! contribution is added after (month-end deposits). The balance runs in full
//! precision; only the yearly snapshots are rounded to cents.

use crate::domain::money::Money;
use crate::domain::plan::{MonthlyContributionResult, YearlyProjection};
use crate::engine::growth::ensure_return_rate;
use crate::error::{ensure_input, PlanError};

pub const MAX_TIME_HORIZON_YEARS: u32 = 50;
const MONTHS_PER_YEAR: u32 = 12;

pub fn effective_monthly_rate(annual_return_rate: f64) -> f64 {
    (1.0 + annual_return_rate).powf(1.0 / MONTHS_PER_YEAR as f64) - 1.0
}

pub fn project_with_contributions(
    initial_investment: Money,
    monthly_contribution: Money,
    annual_return_rate: f64,
    time_horizon_years: u32,
) -> Result<MonthlyContributionResult, PlanError> {
    ensure_input!(
        initial_investment.cents() >= 0,
        "initial investment must not be negative (got {initial_investment})"
    );
    ensure_input!(
        monthly_contribution.cents() >= 0,
        "monthlyContribution must be 0 or greater (got {monthly_contribution})"
    );
    ensure_return_rate(annual_return_rate)?;
    ensure_input!(
        (1..=MAX_TIME_HORIZON_YEARS).contains(&time_horizon_years),
        "timeHorizon must be between 1 and {MAX_TIME_HORIZON_YEARS} years (got {time_horizon_years})"
    );

    let monthly_rate = effective_monthly_rate(annual_return_rate);
    let deposit = monthly_contribution.as_dollars();
    let overflow = |year: u32| PlanError::invalid_input(format!("projection overflows in year {year}"));
    let yearly_contribution = monthly_contribution
        .checked_mul(MONTHS_PER_YEAR as i64)
        .ok_or_else(|| overflow(1))?;

    let mut balance = initial_investment.as_dollars();
    let mut yearly_projections = Vec::with_capacity(time_horizon_years as usize + 1);
    yearly_projections.push(YearlyProjection {
        year: 0,
        value: initial_investment,
        contributions: Money::ZERO,
        growth: Money::ZERO,
    });

    for year in 1..=time_horizon_years {
        for _ in 0..MONTHS_PER_YEAR {
            balance = balance * (1.0 + monthly_rate) + deposit;
        }

        let value = Money::from_dollars(balance).ok_or_else(|| overflow(year))?;
        let contributions = yearly_contribution
            .checked_mul(year as i64)
            .ok_or_else(|| overflow(year))?;
        let growth = value
            .checked_sub(initial_investment)
            .and_then(|g| g.checked_sub(contributions))
            .ok_or_else(|| overflow(year))?;
        yearly_projections.push(YearlyProjection {
            year,
            value,
            contributions,
            growth,
        });
    }

    // The loop above always pushes at least one year past the origin.
    let last = &yearly_projections[yearly_projections.len() - 1];
    Ok(MonthlyContributionResult {
        final_value: last.value,
        total_contributions: last.contributions,
        total_growth: last.growth,
        yearly_projections,
    })
}
