//! Data model re-export hub.

mod accounts;
mod cashflow;
mod explain;
mod ids;
mod intents;
mod ledger;
mod records;
mod reference;
mod results;
mod rmd;
mod snapshot;
mod state;

pub use accounts::{
    BasisEntry, CashAccount, Holding, HoldingTaxType, HoldingType, InvestmentAccount, LotMethod,
};
pub use cashflow::{CashflowCategory, CashflowItem, TaggedCashflowItem};
pub use explain::{ModuleRunExplanation, MonthExplanation};
pub use ids::{CashAccountId, EventId, HoldingId, InvestmentAccountId, PersonId, StrategyId};
pub use intents::{ActionIntent, ActionRecord};
pub use ledger::{MagiHistory, YearLedger};
pub use records::{AccountBalanceSnapshot, MonthlyRecord, YearRecord};
pub use reference::{
    ContributionLimit, ContributionLimitsTable, FederalTaxPolicy, GuardrailHealthPoint,
    GuardrailHealthPoints, InflationRates, IrmaaTable, IrmaaTier, ProvisionalIncomeBracket,
    ReferenceTables, SocialSecurityProvisionalIncomeBrackets, TaxBracket,
};
pub use results::{
    BatchRequest, BatchResult, RunStatus, RunSummary, SimulationResult, SimulationRun,
};
pub use rmd::{RmdTable, RmdTableEntry};
pub use snapshot::{
    EventConfig, GlidepathPoint, GuardrailConfig, InflationType, PensionConfig, Person,
    PersonStrategy, RebalanceFrequency, RebalancingConfig, RmdConfig, RmdExcessHandling,
    Scenario, SimulationSnapshot, SocialSecurityConfig, SpendingConfig, TaxConfig,
    TaxFilingStatus, TaxTreatment, WorkPeriod,
};
pub use state::{
    ContributionKind, GuardrailRuntimeState, SimulationContext, SimulationSettings,
    SimulationState,
};
