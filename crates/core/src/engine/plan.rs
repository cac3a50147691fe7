use crate::domain::plan::Plan;
use crate::domain::request::{PlanInput, PlanRequest};
use crate::domain::risk::RiskBand;
use crate::engine::allocator::allocate;
use crate::engine::classifier::band_for;
use crate::engine::contribution::project_with_contributions;
use crate::engine::growth::{project, ASSUMED_ANNUAL_RETURN, EXPECTED_RETURN_HORIZONS};
use crate::engine::templates::TemplateSet;
use crate::error::PlanError;

/// Entry point of the engine. Holds the verified templates; stateless otherwise,
/// so one instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct PlanEngine {
    templates: TemplateSet,
}

impl PlanEngine {
    pub fn new(templates: TemplateSet) -> Result<Self, PlanError> {
        templates.verify()?;
        Ok(Self { templates })
    }

    pub fn with_builtin_templates() -> Result<Self, PlanError> {
        Self::new(TemplateSet::builtin()?)
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Validates the request, then assembles the plan.
    pub fn build_plan(&self, request: &PlanRequest) -> Result<Plan, PlanError> {
        let input = request.validate()?;
        self.build_plan_from_input(&input)
    }

    pub fn build_plan_from_input(&self, input: &PlanInput) -> Result<Plan, PlanError> {
        let band = band_for(input.risk_score);
        let allocations = allocate(input.amount, self.templates.template_for(band))?;
        let expected_returns = project(input.amount, ASSUMED_ANNUAL_RETURN, &EXPECTED_RETURN_HORIZONS)?;

        let monthly_contribution = match &input.contribution {
            Some(c) => Some(project_with_contributions(
                input.amount,
                c.monthly,
                c.annual_return_rate,
                c.time_horizon_years,
            )?),
            None => None,
        };

        tracing::debug!(
            amount = %input.amount,
            risk_score = input.risk_score.value(),
            %band,
            allocations_len = allocations.len(),
            with_contributions = monthly_contribution.is_some(),
            "plan built"
        );

        Ok(Plan {
            allocations,
            expected_returns,
            monthly_contribution,
        })
    }

    /// Band for an already validated request.
    pub fn band_for(&self, input: &PlanInput) -> RiskBand {
        band_for(input.risk_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use crate::engine::templates::{AllocationTemplate, TemplateEntry};

    fn engine() -> PlanEngine {
        PlanEngine::with_builtin_templates().unwrap()
    }

    #[test]
    fn moderate_plan_without_contributions() {
        let plan = engine().build_plan(&PlanRequest::new(10_000.0, 5)).unwrap();

        let tickers: Vec<_> = plan.allocations.iter().map(|a| a.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["VTI", "BND", "VXUS", "QQQ", "VNQ"]);
        let total: Money = plan.allocations.iter().map(|a| a.dollar_amount).sum();
        assert_eq!(total, Money::from_cents(1_000_000));

        assert_eq!(plan.expected_returns[&1], Money::from_cents(1_070_000));
        assert_eq!(plan.expected_returns[&10], Money::from_cents(1_967_151));
        assert!(plan.monthly_contribution.is_none());
    }

    #[test]
    fn plan_with_contributions() {
        let request = PlanRequest::new(10_000.0, 2).with_contribution(500.0, 7.0, 10);
        let plan = engine().build_plan(&request).unwrap();

        assert_eq!(plan.allocations[0].ticker, "BND");
        let result = plan.monthly_contribution.unwrap();
        assert_eq!(result.yearly_projections.len(), 11);
        assert_eq!(result.yearly_projections[0].value, Money::from_cents(1_000_000));
        assert_eq!(result.total_contributions, Money::from_cents(6_000_000));
    }

    #[test]
    fn identical_requests_serialize_identically() {
        let engine = engine();
        let request = PlanRequest::new(10_000.33, 9).with_contribution(123.45, 6.5, 25);
        let a = serde_json::to_vec(&engine.build_plan(&request).unwrap()).unwrap();
        let b = serde_json::to_vec(&engine.build_plan(&request).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn adversarial_amounts_reconcile_in_every_band() {
        let engine = engine();
        for amount in [0.01, 0.07, 10_000.33, 99_999.99, 1_234_567.89] {
            for score in 1..=10 {
                let plan = engine.build_plan(&PlanRequest::new(amount, score)).unwrap();
                let total: Money = plan.allocations.iter().map(|a| a.dollar_amount).sum();
                assert_eq!(total, Money::from_dollars(amount).unwrap(), "{amount} {score}");
            }
        }
    }

    #[test]
    fn invalid_requests_fail_without_partial_results() {
        let engine = engine();
        let cases = [
            PlanRequest::new(10_000.0, 11),
            PlanRequest::new(0.0, 5),
            PlanRequest {
                monthly_contribution: Some(100.0),
                ..PlanRequest::new(10_000.0, 5)
            },
        ];
        for request in cases {
            let err = engine.build_plan(&request).unwrap_err();
            assert!(err.is_invalid_input(), "{request:?}: {err}");
        }
    }

    #[test]
    fn oversized_inputs_fail_without_overflowing() {
        let engine = engine();
        let cases = [
            PlanRequest::new(5e16, 5),
            PlanRequest::new(1e17, 5),
            PlanRequest::new(1_000.0, 5).with_contribution(2e15, 7.0, 50),
        ];
        for request in cases {
            let err = engine.build_plan(&request).unwrap_err();
            assert!(err.is_invalid_input(), "{request:?}: {err}");
        }
    }

    #[test]
    fn largest_accepted_inputs_build_or_fail_cleanly() {
        use crate::domain::request::{MAX_AMOUNT, MAX_MONTHLY_CONTRIBUTION};

        let engine = engine();
        let plan = engine.build_plan(&PlanRequest::new(MAX_AMOUNT, 9)).unwrap();
        let total: Money = plan.allocations.iter().map(|a| a.dollar_amount).sum();
        assert_eq!(total, Money::from_dollars(MAX_AMOUNT).unwrap());
        assert!(plan.expected_returns[&10] > plan.expected_returns[&1]);

        let request = PlanRequest::new(MAX_AMOUNT, 9).with_contribution(
            MAX_MONTHLY_CONTRIBUTION,
            100.0,
            50,
        );
        let err = engine.build_plan(&request).unwrap_err();
        assert!(err.reason().contains("overflows"), "{err}");
    }

    #[test]
    fn rejects_broken_templates_as_configuration_errors() {
        let mut templates = TemplateSet::builtin().unwrap();
        templates.moderate = AllocationTemplate::new(vec![TemplateEntry {
            ticker: "VTI".to_string(),
            weight: 0.9,
        }]);
        let err = PlanEngine::new(templates).unwrap_err();
        assert!(matches!(err, PlanError::Configuration(_)), "{err}");
    }

    #[test]
    fn band_follows_validated_score() {
        let engine = engine();
        let input = PlanRequest::new(100.0, 8).validate().unwrap();
        assert_eq!(engine.band_for(&input), RiskBand::Aggressive);
    }
}
