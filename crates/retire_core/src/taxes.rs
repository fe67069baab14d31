//! Federal bracket arithmetic shared by the taxes module: progressive
//! ordinary-income and capital-gains schedules plus the MAGI/IRMAA lookups
//! the roth-conversion and taxes modules both consult.

use crate::model::{FederalTaxPolicy, TaxBracket};

/// Progressive-bracket tax on `income` given an ascending-threshold schedule.
/// Used for both the ordinary-income and capital-gains schedules, which share
/// the same `{threshold, rate}` shape.
pub fn bracket_tax(income: f64, brackets: &[TaxBracket]) -> f64 {
    if income <= 0.0 || brackets.is_empty() {
        return 0.0;
    }

    let mut tax = 0.0;
    let mut prev_threshold = 0.0;

    for (i, bracket) in brackets.iter().enumerate() {
        let next_threshold = brackets
            .get(i + 1)
            .map(|b| b.threshold)
            .unwrap_or(f64::INFINITY);

        if income <= bracket.threshold {
            break;
        }

        let taxable_in_bracket =
            (income.min(next_threshold) - bracket.threshold.max(prev_threshold)).max(0.0);
        tax += taxable_in_bracket * bracket.rate;
        prev_threshold = bracket.threshold;
    }

    tax
}

/// Federal tax owed on ordinary income after the standard deduction, plus
/// the capital-gains schedule applied independently to realized gains.
pub fn federal_tax_due(
    ordinary_income: f64,
    deductions: f64,
    capital_gains: f64,
    policy: &FederalTaxPolicy,
) -> f64 {
    let taxable_ordinary = (ordinary_income - deductions - policy.standard_deduction).max(0.0);
    bracket_tax(taxable_ordinary, &policy.ordinary_brackets)
        + bracket_tax(capital_gains.max(0.0), &policy.capital_gains_brackets)
}

/// Flat-rate state tax applied to combined taxable ordinary income and
/// capital gains.
pub fn state_tax_due(taxable_ordinary: f64, capital_gains: f64, state_rate: f64) -> f64 {
    (taxable_ordinary.max(0.0) + capital_gains.max(0.0)) * state_rate
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> FederalTaxPolicy {
        FederalTaxPolicy {
            ordinary_brackets: vec![
                TaxBracket { threshold: 0.0, rate: 0.10 },
                TaxBracket { threshold: 10_000.0, rate: 0.12 },
                TaxBracket { threshold: 40_000.0, rate: 0.22 },
                TaxBracket { threshold: 90_000.0, rate: 0.24 },
            ],
            capital_gains_brackets: vec![
                TaxBracket { threshold: 0.0, rate: 0.0 },
                TaxBracket { threshold: 40_000.0, rate: 0.15 },
            ],
            standard_deduction: 0.0,
        }
    }

    #[test]
    fn test_first_bracket_only() {
        let tax = bracket_tax(5_000.0, &policy().ordinary_brackets);
        assert!((tax - 500.0).abs() < 0.01, "got {tax}");
    }

    #[test]
    fn test_multiple_brackets() {
        // $10,000 @ 10% + $30,000 @ 12% + $10,000 @ 22% = $6,800
        let tax = bracket_tax(50_000.0, &policy().ordinary_brackets);
        assert!((tax - 6_800.0).abs() < 0.01, "got {tax}");
    }

    #[test]
    fn test_standard_deduction_reduces_taxable_income() {
        let mut p = policy();
        p.standard_deduction = 15_000.0;
        let tax = federal_tax_due(20_000.0, 0.0, 0.0, &p);
        // only $5,000 taxable at 10%
        assert!((tax - 500.0).abs() < 0.01, "got {tax}");
    }

    #[test]
    fn test_capital_gains_bracket_independent_of_ordinary() {
        let p = policy();
        let tax = federal_tax_due(0.0, 0.0, 50_000.0, &p);
        // $40,000 @ 0% + $10,000 @ 15% = $1,500
        assert!((tax - 1_500.0).abs() < 0.01, "got {tax}");
    }

    #[test]
    fn test_state_tax_flat_rate() {
        let tax = state_tax_due(50_000.0, 10_000.0, 0.05);
        assert!((tax - 3_000.0).abs() < 0.01, "got {tax}");
    }
}
