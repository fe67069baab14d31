//! Reference tables carried in the snapshot: contribution limits, tax
//! policy, Social Security provisional-income brackets, IRMAA, RMD, and
//! guardrail/glidepath interpolation points.

use serde::{Deserialize, Serialize};

pub use super::rmd::{RmdTable, RmdTableEntry};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContributionLimit {
    pub year: u16,
    pub employee_401k: f64,
    pub employer_401k: f64,
    pub hsa_self: f64,
    pub hsa_family: f64,
    pub catch_up_50: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContributionLimitsTable {
    pub entries: Vec<ContributionLimit>,
}

impl ContributionLimitsTable {
    pub fn for_year(&self, year: i16) -> Option<&ContributionLimit> {
        self.entries.iter().find(|e| e.year as i16 == year)
    }
}

/// A single progressive-bracket threshold/rate pair, reused for both
/// ordinary-income and capital-gains schedules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaxBracket {
    pub threshold: f64,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederalTaxPolicy {
    pub ordinary_brackets: Vec<TaxBracket>,
    pub capital_gains_brackets: Vec<TaxBracket>,
    pub standard_deduction: f64,
}

/// Ordered `{threshold, taxable_pct}` tiers applied to provisional income
/// (AGI + tax-exempt interest + half of the SS benefit) to find what fraction
/// of the Social Security benefit itself is taxable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProvisionalIncomeBracket {
    pub threshold: f64,
    pub taxable_pct: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialSecurityProvisionalIncomeBrackets {
    pub tiers: Vec<ProvisionalIncomeBracket>,
}

impl SocialSecurityProvisionalIncomeBrackets {
    /// Taxable fraction of the benefit for a given provisional income, found
    /// by taking the highest tier whose threshold the income has crossed.
    pub fn taxable_pct(&self, provisional_income: f64) -> f64 {
        self.tiers
            .iter()
            .filter(|t| provisional_income >= t.threshold)
            .map(|t| t.taxable_pct)
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IrmaaTier {
    pub magi_threshold: f64,
    pub part_b_surcharge: f64,
    pub part_d_surcharge: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrmaaTable {
    pub tiers: Vec<IrmaaTier>,
}

impl IrmaaTable {
    pub fn surcharge_for_magi(&self, magi: f64) -> (f64, f64) {
        self.tiers
            .iter()
            .filter(|t| magi >= t.magi_threshold)
            .last()
            .map(|t| (t.part_b_surcharge, t.part_d_surcharge))
            .unwrap_or((0.0, 0.0))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GuardrailHealthPoint {
    pub ratio: f64,
    pub factor: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardrailHealthPoints {
    pub points: Vec<GuardrailHealthPoint>,
}

impl GuardrailHealthPoints {
    /// Piecewise-linear interpolation of `factor` at a given health ratio.
    /// Points must be supplied in descending `ratio` order; the ratio
    /// saturates at the extremes.
    pub fn factor_at(&self, ratio: f64) -> f64 {
        let pts = &self.points;
        if pts.is_empty() {
            return 1.0;
        }
        if ratio >= pts[0].ratio {
            return pts[0].factor;
        }
        if ratio <= pts[pts.len() - 1].ratio {
            return pts[pts.len() - 1].factor;
        }
        for w in pts.windows(2) {
            let (hi, lo) = (w[0], w[1]);
            if ratio <= hi.ratio && ratio >= lo.ratio {
                let span = hi.ratio - lo.ratio;
                if span.abs() < f64::EPSILON {
                    return hi.factor;
                }
                let t = (hi.ratio - ratio) / span;
                return hi.factor - t * (hi.factor - lo.factor);
            }
        }
        pts[pts.len() - 1].factor
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InflationRates {
    pub cpi: f64,
    pub medical: f64,
    pub housing: f64,
    pub education: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub contribution_limits: ContributionLimitsTable,
    pub federal_tax_policy: FederalTaxPolicy,
    pub ss_provisional_income_brackets: SocialSecurityProvisionalIncomeBrackets,
    pub irmaa_table: IrmaaTable,
    pub rmd_table: RmdTable,
    pub guardrail_health_points: GuardrailHealthPoints,
    pub inflation_rates: InflationRates,
    pub early_withdrawal_penalty_rate: f64,
}
