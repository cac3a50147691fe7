use crate::domain::money::{round_half_up, Money};
use crate::domain::plan::TickerAllocation;
use crate::engine::templates::AllocationTemplate;
use crate::error::{ensure_input, PlanError};

/// Splits `initial_investment` across the template's tickers.
///
/// Each share is `weight * amount` rounded half-up to the cent. Whatever the
/// rounding leaves over (positive or negative) goes to the first
/// largest-weight ticker, so the shares always sum to the amount exactly.
/// Output order follows the template.
pub fn allocate(
    initial_investment: Money,
    template: &AllocationTemplate,
) -> Result<Vec<TickerAllocation>, PlanError> {
    ensure_input!(
        initial_investment.is_positive(),
        "amount must be greater than 0 (got {initial_investment})"
    );
    let largest = template
        .largest_weight_index()
        .ok_or_else(|| PlanError::configuration("template has no tickers"))?;

    let total_cents = initial_investment.cents();
    let mut allocations: Vec<TickerAllocation> = template
        .entries()
        .iter()
        .map(|entry| TickerAllocation {
            ticker: entry.ticker.clone(),
            percentage: entry.weight,
            dollar_amount: Money::from_cents(round_half_up(entry.weight * total_cents as f64)),
        })
        .collect();

    let overflow = || PlanError::invalid_input(format!("allocation overflows for {initial_investment}"));
    let allocated = allocations
        .iter()
        .try_fold(Money::ZERO, |acc, a| acc.checked_add(a.dollar_amount))
        .ok_or_else(overflow)?;
    let residual = initial_investment.checked_sub(allocated).ok_or_else(overflow)?;
    if !residual.is_zero() {
        let share = &mut allocations[largest].dollar_amount;
        *share = share.checked_add(residual).ok_or_else(overflow)?;
    }

    Ok(allocations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::risk::RiskBand;
    use crate::engine::templates::{TemplateEntry, TemplateSet};

    fn sum(allocations: &[TickerAllocation]) -> Money {
        allocations.iter().map(|a| a.dollar_amount).sum()
    }

    fn thirds() -> AllocationTemplate {
        AllocationTemplate::new(vec![
            TemplateEntry { ticker: "A".to_string(), weight: 1.0 / 3.0 },
            TemplateEntry { ticker: "B".to_string(), weight: 1.0 / 3.0 },
            TemplateEntry { ticker: "C".to_string(), weight: 1.0 / 3.0 },
        ])
    }

    #[test]
    fn reconciles_adversarial_amounts_for_every_template() {
        let set = TemplateSet::builtin().unwrap();
        let amounts = [1, 2, 3, 7, 99, 101, 1_000_033, 1_000_000, 33_333_333, 123_456_789_01];
        for band in RiskBand::ALL {
            let template = set.template_for(band);
            for cents in amounts {
                let amount = Money::from_cents(cents);
                let allocations = allocate(amount, template).unwrap();
                assert_eq!(sum(&allocations), amount, "{band} {amount}");
            }
        }
    }

    #[test]
    fn reconciles_dense_cent_range_without_negative_shares() {
        let set = TemplateSet::builtin().unwrap();
        for band in RiskBand::ALL {
            let template = set.template_for(band);
            for cents in 1..=5_000 {
                let amount = Money::from_cents(cents);
                let allocations = allocate(amount, template).unwrap();
                assert_eq!(sum(&allocations), amount, "{band} {amount}");
                assert!(
                    allocations.iter().all(|a| a.dollar_amount.cents() >= 0),
                    "{band} {amount}: {allocations:?}"
                );
            }
        }
    }

    #[test]
    fn preserves_template_order() {
        let set = TemplateSet::builtin().unwrap();
        let template = set.template_for(RiskBand::Moderate);
        let allocations = allocate(Money::from_cents(1_000_000), template).unwrap();
        let tickers: Vec<_> = allocations.iter().map(|a| a.ticker.as_str()).collect();
        let expected: Vec<_> = template.entries().iter().map(|e| e.ticker.as_str()).collect();
        assert_eq!(tickers, expected);
        assert_eq!(allocations[0].dollar_amount, Money::from_cents(400_000));
        assert_eq!(allocations[0].percentage, 0.40);
    }

    #[test]
    fn residual_goes_to_first_largest_weight() {
        // 1/3 of 100 cents rounds to 33 each; the spare cent lands on "A".
        let allocations = allocate(Money::from_cents(100), &thirds()).unwrap();
        let cents: Vec<_> = allocations.iter().map(|a| a.dollar_amount.cents()).collect();
        assert_eq!(cents, vec![34, 33, 33]);

        // 2/3 of a cent rounds up to 1 each; "A" gives one back.
        let allocations = allocate(Money::from_cents(2), &thirds()).unwrap();
        let cents: Vec<_> = allocations.iter().map(|a| a.dollar_amount.cents()).collect();
        assert_eq!(cents, vec![0, 1, 1]);
    }

    #[test]
    fn one_cent_lands_on_largest_weight() {
        let set = TemplateSet::builtin().unwrap();
        let allocations =
            allocate(Money::from_cents(1), set.template_for(RiskBand::Aggressive)).unwrap();
        assert_eq!(allocations[0].ticker, "VTI");
        assert_eq!(allocations[0].dollar_amount, Money::from_cents(1));
        assert!(allocations[1..].iter().all(|a| a.dollar_amount.is_zero()));
    }

    #[test]
    fn largest_representable_amount_reconciles() {
        let set = TemplateSet::builtin().unwrap();
        let amount = Money::from_cents(8_999_999_999_999_999_99);
        for band in RiskBand::ALL {
            let allocations = allocate(amount, set.template_for(band)).unwrap();
            assert_eq!(sum(&allocations), amount, "{band}");
        }
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let set = TemplateSet::builtin().unwrap();
        let template = set.template_for(RiskBand::Moderate);
        assert!(allocate(Money::ZERO, template).unwrap_err().is_invalid_input());
        assert!(allocate(Money::from_cents(-500), template)
            .unwrap_err()
            .is_invalid_input());
    }
}
