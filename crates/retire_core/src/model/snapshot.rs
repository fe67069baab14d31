//! The immutable input bundle consumed by one simulation run.
//!
//! A [`SimulationSnapshot`] is flat, id-referencing collections plus reference
//! tables; the engine resolves ids into read-only lookup maps once per run
//! (see [`crate::input_builder`]). No cycles are traversed during simulation.

use jiff::civil::Date;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::accounts::{CashAccount, Holding, HoldingType, InvestmentAccount};
use super::ids::{CashAccountId, HoldingId, PersonId, StrategyId};
use super::reference::ReferenceTables;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub date_of_birth: Date,
    pub life_expectancy_years: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxFilingStatus {
    Single,
    MarriedFilingJointly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkPeriod {
    pub start: Date,
    pub end: Date,
    pub monthly_salary: f64,
    pub monthly_bonus: f64,
    /// Holding receiving pre-tax employee/employer 401k contributions.
    pub traditional_401k_holding_id: Option<HoldingId>,
    pub employee_401k_contribution_rate: f64,
    pub employer_401k_match_rate: f64,
    pub hsa_holding_id: Option<HoldingId>,
    pub hsa_monthly_contribution: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InflationType {
    Cpi,
    Medical,
    Housing,
    Education,
    None,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GuardrailConfig {
    CapWants {
        withdrawal_rate_limit: f64,
    },
    PortfolioHealth {
        target_balance: f64,
    },
    Guyton {
        baseline_need: f64,
        baseline_want: f64,
        target_balance: f64,
        trigger_rate_increase: f64,
        applied_cut: f64,
        duration_months: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingConfig {
    pub monthly_need: f64,
    pub monthly_want: f64,
    pub monthly_healthcare: f64,
    pub need_inflation: InflationType,
    pub want_inflation: InflationType,
    pub healthcare_inflation: InflationType,
    pub guardrail: Option<GuardrailConfig>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SocialSecurityConfig {
    pub start_date: Date,
    pub monthly_benefit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxTreatment {
    Ordinary,
    CapitalGains,
    TaxExempt,
    None,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PensionConfig {
    pub monthly_amount: f64,
    pub tax_treatment: TaxTreatment,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EventConfig {
    pub date: Date,
    pub amount: f64,
    pub tax_treatment: TaxTreatment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RmdConfig {
    pub start_age: u8,
    pub account_holding_ids: Vec<HoldingId>,
    pub excess_handling: RmdExcessHandling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RmdExcessHandling {
    Spend,
    Taxable,
    Roth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RothConversionConfig {
    pub start_age: u8,
    pub end_age: u8,
    pub source_holding_id: Option<HoldingId>,
    pub target_holding_id: Option<HoldingId>,
    pub max_conversion: f64,
    pub min_conversion: f64,
    pub target_bracket_threshold: f64,
    pub respect_irmaa: bool,
    pub ladder_lead_time_years: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebalanceFrequency {
    Monthly,
    Quarterly,
    Annual,
    Threshold,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalancingConfig {
    pub frequency: RebalanceFrequency,
    pub drift_threshold: f64,
    pub min_trade_amount: f64,
    pub glidepath: Vec<GlidepathPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlidepathPoint {
    pub age: f64,
    pub weights: FxHashMap<HoldingType, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxConfig {
    pub filing_status: TaxFilingStatus,
    pub state_rate: f64,
}

/// A bundle of per-module configuration attached to one person.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonStrategy {
    pub id: StrategyId,
    pub person_id: PersonId,
    pub work_periods: Vec<WorkPeriod>,
    pub spending: Option<SpendingConfig>,
    pub social_security: Option<SocialSecurityConfig>,
    pub pensions: Vec<PensionConfig>,
    pub events: Vec<EventConfig>,
    pub rmd: Option<RmdConfig>,
    pub roth_conversion: Option<RothConversionConfig>,
    pub rebalancing: Option<RebalancingConfig>,
    pub tax: TaxConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: super::ids::StrategyId,
    pub person_strategy_ids: Vec<StrategyId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub scenario: Scenario,
    pub people: Vec<Person>,
    pub person_strategies: Vec<PersonStrategy>,
    pub cash_accounts: Vec<CashAccount>,
    pub investment_accounts: Vec<InvestmentAccount>,
    pub holdings: Vec<Holding>,
    pub reference: ReferenceTables,
}

impl SimulationSnapshot {
    pub fn cash_account_id(&self) -> Option<CashAccountId> {
        self.cash_accounts.first().map(|a| a.id)
    }
}
