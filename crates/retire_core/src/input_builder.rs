//! Snapshot & Settings — derives run settings from a snapshot and a start
//! date, and fails fast with [`SimulationError::EmptyPopulation`] when the
//! scenario references no active people.

use jiff::civil::Date;

use crate::date_math::add_months;
use crate::error::{Result, SimulationError};
use crate::model::{Person, PersonStrategy, SimulationSettings, SimulationSnapshot};

pub struct SimulationInput<'a> {
    pub snapshot: &'a SimulationSnapshot,
    pub settings: SimulationSettings,
}

/// Active person strategies: those whose id is referenced by the scenario.
pub fn active_strategies(snapshot: &SimulationSnapshot) -> Vec<&PersonStrategy> {
    snapshot
        .person_strategies
        .iter()
        .filter(|s| snapshot.scenario.person_strategy_ids.contains(&s.id))
        .collect()
}

/// Active people: those referenced by an active person strategy.
pub fn active_people(snapshot: &SimulationSnapshot) -> Vec<&Person> {
    let strategies = active_strategies(snapshot);
    snapshot
        .people
        .iter()
        .filter(|p| strategies.iter().any(|s| s.person_id == p.id))
        .collect()
}

pub fn build_input(snapshot: &SimulationSnapshot, start_date: Date) -> Result<SimulationInput<'_>> {
    let people = active_people(snapshot);
    if people.is_empty() {
        return Err(SimulationError::EmptyPopulation);
    }

    // +1 year: a person with life_expectancy_years N is alive through the
    // calendar year in which they turn N, not just up to that birthday.
    let end_date = people
        .iter()
        .map(|p| add_months(p.date_of_birth, (p.life_expectancy_years as i32 + 1) * 12))
        .max()
        .expect("non-empty active population");

    let months = crate::date_math::months_between(start_date, end_date).max(1) as u32;

    Ok(SimulationInput {
        snapshot,
        settings: SimulationSettings {
            start_date,
            end_date,
            months,
            step_months: 1,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Scenario, StrategyId};

    fn base_snapshot() -> SimulationSnapshot {
        use crate::model::*;
        SimulationSnapshot {
            scenario: Scenario {
                id: StrategyId(0),
                person_strategy_ids: vec![],
            },
            people: vec![],
            person_strategies: vec![],
            cash_accounts: vec![],
            investment_accounts: vec![],
            holdings: vec![],
            reference: ReferenceTables {
                contribution_limits: ContributionLimitsTable::default(),
                federal_tax_policy: FederalTaxPolicy {
                    ordinary_brackets: vec![],
                    capital_gains_brackets: vec![],
                    standard_deduction: 0.0,
                },
                ss_provisional_income_brackets: SocialSecurityProvisionalIncomeBrackets::default(),
                irmaa_table: IrmaaTable::default(),
                rmd_table: RmdTable::irs_uniform_lifetime_2024(),
                guardrail_health_points: GuardrailHealthPoints::default(),
                inflation_rates: InflationRates::default(),
                early_withdrawal_penalty_rate: 0.1,
            },
        }
    }

    #[test]
    fn test_empty_population_fails() {
        let snapshot = base_snapshot();
        let result = build_input(&snapshot, jiff::civil::date(2020, 1, 1));
        assert!(matches!(result, Err(SimulationError::EmptyPopulation)));
    }

    #[test]
    fn test_two_year_horizon() {
        use crate::model::{Person, PersonId, PersonStrategy, StrategyId, TaxConfig, TaxFilingStatus};
        let mut snapshot = base_snapshot();
        let person_id = PersonId(1);
        snapshot.people.push(Person {
            id: person_id,
            date_of_birth: jiff::civil::date(1990, 1, 1),
            life_expectancy_years: 31,
        });
        let strategy_id = StrategyId(1);
        snapshot.person_strategies.push(PersonStrategy {
            id: strategy_id,
            person_id,
            work_periods: vec![],
            spending: None,
            social_security: None,
            pensions: vec![],
            events: vec![],
            rmd: None,
            roth_conversion: None,
            rebalancing: None,
            tax: TaxConfig {
                filing_status: TaxFilingStatus::Single,
                state_rate: 0.0,
            },
        });
        snapshot.scenario.person_strategy_ids.push(strategy_id);

        let input = build_input(&snapshot, jiff::civil::date(2020, 1, 1)).unwrap();
        assert_eq!(input.settings.months, 24);
    }
}
