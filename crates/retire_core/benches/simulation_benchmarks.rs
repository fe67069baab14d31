//! Criterion benchmarks for the retirement simulation engine.
//!
//! Run with: cargo bench -p retire_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use retire_core::batch::run_batch;
use retire_core::model::*;
use retire_core::scheduler::{run_simulation, RunOptions};

fn reference_tables() -> ReferenceTables {
    ReferenceTables {
        contribution_limits: ContributionLimitsTable {
            entries: vec![ContributionLimit {
                year: 2025,
                employee_401k: 23_500.0,
                employer_401k: 23_500.0,
                hsa_self: 4_300.0,
                hsa_family: 8_550.0,
                catch_up_50: 7_500.0,
            }],
        },
        federal_tax_policy: FederalTaxPolicy {
            ordinary_brackets: vec![
                TaxBracket { threshold: 0.0, rate: 0.10 },
                TaxBracket { threshold: 11_600.0, rate: 0.12 },
                TaxBracket { threshold: 47_150.0, rate: 0.22 },
                TaxBracket { threshold: 100_525.0, rate: 0.24 },
            ],
            capital_gains_brackets: vec![
                TaxBracket { threshold: 0.0, rate: 0.0 },
                TaxBracket { threshold: 47_025.0, rate: 0.15 },
                TaxBracket { threshold: 518_900.0, rate: 0.20 },
            ],
            standard_deduction: 14_600.0,
        },
        ss_provisional_income_brackets: SocialSecurityProvisionalIncomeBrackets {
            tiers: vec![
                ProvisionalIncomeBracket { threshold: 0.0, taxable_pct: 0.0 },
                ProvisionalIncomeBracket { threshold: 25_000.0, taxable_pct: 0.5 },
                ProvisionalIncomeBracket { threshold: 34_000.0, taxable_pct: 0.85 },
            ],
        },
        irmaa_table: IrmaaTable::default(),
        rmd_table: RmdTable::irs_uniform_lifetime_2024(),
        guardrail_health_points: GuardrailHealthPoints {
            points: vec![
                GuardrailHealthPoint { ratio: 1.05, factor: 1.0 },
                GuardrailHealthPoint { ratio: 0.95, factor: 0.75 },
                GuardrailHealthPoint { ratio: 0.85, factor: 0.5 },
                GuardrailHealthPoint { ratio: 0.80, factor: 0.0 },
            ],
        },
        inflation_rates: InflationRates {
            cpi: 0.03,
            medical: 0.05,
            housing: 0.04,
            education: 0.05,
        },
        early_withdrawal_penalty_rate: 0.10,
    }
}

/// A single retiree, one taxable brokerage holding, one traditional bond
/// holding, a guardrail-governed spending plan, and quarterly glidepath
/// rebalancing.
fn basic_snapshot(guardrail: Option<GuardrailConfig>) -> SimulationSnapshot {
    let person_id = PersonId(1);
    let strategy_id = StrategyId(1);
    let cash_account_id = CashAccountId(1);
    let investment_account_id = InvestmentAccountId(1);
    let equity_holding_id = HoldingId(1);
    let bond_holding_id = HoldingId(2);

    SimulationSnapshot {
        scenario: Scenario {
            id: StrategyId(0),
            person_strategy_ids: vec![strategy_id],
        },
        people: vec![Person {
            id: person_id,
            date_of_birth: jiff::civil::date(1960, 1, 1),
            life_expectancy_years: 90,
        }],
        person_strategies: vec![PersonStrategy {
            id: strategy_id,
            person_id,
            work_periods: vec![],
            spending: Some(SpendingConfig {
                monthly_need: 3_000.0,
                monthly_want: 1_500.0,
                monthly_healthcare: 800.0,
                need_inflation: InflationType::Cpi,
                want_inflation: InflationType::Cpi,
                healthcare_inflation: InflationType::Medical,
                guardrail,
            }),
            social_security: Some(SocialSecurityConfig {
                start_date: jiff::civil::date(2027, 1, 1),
                monthly_benefit: 2_200.0,
            }),
            pensions: vec![],
            events: vec![],
            rmd: Some(RmdConfig {
                start_age: 73,
                account_holding_ids: vec![bond_holding_id],
                excess_handling: RmdExcessHandling::Spend,
            }),
            roth_conversion: None,
            rebalancing: Some(RebalancingConfig {
                frequency: RebalanceFrequency::Quarterly,
                drift_threshold: 0.05,
                min_trade_amount: 500.0,
                glidepath: vec![
                    GlidepathPoint {
                        age: 60.0,
                        weights: [(HoldingType::Equity, 0.6), (HoldingType::Bond, 0.4)]
                            .into_iter()
                            .collect(),
                    },
                    GlidepathPoint {
                        age: 85.0,
                        weights: [(HoldingType::Equity, 0.3), (HoldingType::Bond, 0.7)]
                            .into_iter()
                            .collect(),
                    },
                ],
            }),
            tax: TaxConfig {
                filing_status: TaxFilingStatus::Single,
                state_rate: 0.05,
            },
        }],
        cash_accounts: vec![CashAccount {
            id: cash_account_id,
            balance: 20_000.0,
            interest_rate: 0.02,
        }],
        investment_accounts: vec![InvestmentAccount {
            id: investment_account_id,
            name: "brokerage".to_string(),
        }],
        holdings: vec![
            Holding {
                id: equity_holding_id,
                investment_account_id,
                tax_type: HoldingTaxType::Taxable,
                holding_type: HoldingType::Equity,
                balance: 600_000.0,
                contribution_basis_entries: vec![BasisEntry {
                    date: jiff::civil::date(2015, 1, 1),
                    amount: 350_000.0,
                }],
                return_rate: 0.07,
                return_std_dev: 0.15,
                lot_method: LotMethod::Fifo,
            },
            Holding {
                id: bond_holding_id,
                investment_account_id,
                tax_type: HoldingTaxType::Traditional,
                holding_type: HoldingType::Bond,
                balance: 400_000.0,
                contribution_basis_entries: vec![],
                return_rate: 0.03,
                return_std_dev: 0.05,
                lot_method: LotMethod::Fifo,
            },
        ],
        reference: reference_tables(),
    }
}

fn bench_deterministic_30yr(c: &mut Criterion) {
    let snapshot = basic_snapshot(None);
    c.bench_function("deterministic_30yr", |b| {
        b.iter(|| {
            run_simulation(
                black_box(&snapshot),
                jiff::civil::date(2025, 1, 1),
                RunOptions { seed: None, summary_only: false },
            )
        })
    });
}

fn bench_guardrail_30yr(c: &mut Criterion) {
    let snapshot = basic_snapshot(Some(GuardrailConfig::Guyton {
        baseline_need: 3_000.0,
        baseline_want: 1_500.0,
        target_balance: 900_000.0,
        trigger_rate_increase: 0.2,
        applied_cut: 0.1,
        duration_months: 12,
    }));
    c.bench_function("guyton_guardrail_30yr", |b| {
        b.iter(|| {
            run_simulation(
                black_box(&snapshot),
                jiff::civil::date(2025, 1, 1),
                RunOptions { seed: Some(7), summary_only: false },
            )
        })
    });
}

fn bench_summary_only_vs_full(c: &mut Criterion) {
    let snapshot = basic_snapshot(None);
    let mut group = c.benchmark_group("summary_only_comparison");

    group.bench_function("full_explanations", |b| {
        b.iter(|| {
            run_simulation(
                black_box(&snapshot),
                jiff::civil::date(2025, 1, 1),
                RunOptions { seed: Some(11), summary_only: false },
            )
        })
    });

    group.bench_function("summary_only", |b| {
        b.iter(|| {
            run_simulation(
                black_box(&snapshot),
                jiff::civil::date(2025, 1, 1),
                RunOptions { seed: Some(11), summary_only: true },
            )
        })
    });

    group.finish();
}

fn bench_batch_dispatch(c: &mut Criterion) {
    let snapshot = basic_snapshot(None);
    let mut group = c.benchmark_group("batch_dispatch");

    for &run_count in [16, 64, 256].iter() {
        let seeds: Vec<u64> = (1..=run_count as u64).collect();
        let request = BatchRequest {
            start_date: jiff::civil::date(2025, 1, 1),
            seeds,
            summary_only: true,
        };

        group.bench_with_input(BenchmarkId::new("runs", run_count), &request, |b, request| {
            b.iter(|| run_batch(black_box(&snapshot), black_box("bench-scenario"), black_box(request)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_deterministic_30yr,
    bench_guardrail_30yr,
    bench_summary_only_vs_full,
    bench_batch_dispatch,
);
criterion_main!(benches);
