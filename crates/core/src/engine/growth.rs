use crate::domain::money::Money;
use crate::domain::plan::ExpectedReturns;
use crate::error::{ensure_input, PlanError};

/// Assumed annual return for the no-contribution forecast. A product policy
/// constant, not user input.
pub const ASSUMED_ANNUAL_RETURN: f64 = 0.07;

/// Horizons (years) reported in `expectedReturns`.
pub const EXPECTED_RETURN_HORIZONS: [u32; 4] = [1, 2, 5, 10];

pub(crate) fn ensure_return_rate(annual_return_rate: f64) -> Result<(), PlanError> {
    ensure_input!(
        annual_return_rate.is_finite() && annual_return_rate > -1.0,
        "annual return rate must be greater than -100% (got {annual_return_rate})"
    );
    Ok(())
}

/// Compound value of `initial_investment` at each horizon, no contributions.
///
/// Every horizon compounds independently from the same principal and is only
/// rounded to cents on output.
pub fn project(
    initial_investment: Money,
    annual_return_rate: f64,
    horizons: &[u32],
) -> Result<ExpectedReturns, PlanError> {
    ensure_return_rate(annual_return_rate)?;

    let principal = initial_investment.as_dollars();
    let mut out = ExpectedReturns::new();
    for &years in horizons {
        let value = principal * compound_factor(annual_return_rate, years);
        let value = Money::from_dollars(value).ok_or_else(|| {
            PlanError::invalid_input(format!("projection overflows at {years} years"))
        })?;
        out.insert(years, value);
    }
    Ok(out)
}

fn compound_factor(annual_return_rate: f64, years: u32) -> f64 {
    (1.0 + annual_return_rate).powf(years as f64)
}
