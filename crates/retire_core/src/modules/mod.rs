//! The fixed, ordered set of simulation modules.
//!
//! Each module implements [`Module`] as a capability with optional hooks;
//! absent hooks are no-ops via the trait's default bodies. Ordering is a
//! static registry (`MODULE_ORDER`), used for every hook invocation so month
//! order, intent insertion order, and explanation order are all stable.

mod events;
mod income_work;
mod pensions;
mod rebalancing;
mod returns_core;
mod rmd;
mod roth_conversion;
mod social_security;
mod spending;
mod taxes;

pub use events::EventsModule;
pub use income_work::IncomeWorkModule;
pub use pensions::PensionsModule;
pub use rebalancing::RebalancingModule;
pub use returns_core::{MarketReturn, ReturnsCoreModule};
pub use roth_conversion::RothConversionModule;
pub use rmd::RmdModule;
pub use social_security::SocialSecurityModule;
pub use spending::SpendingModule;
pub use taxes::TaxesModule;

use crate::model::{
    ActionIntent, ActionRecord, ModuleRunExplanation, SimulationContext, SimulationState,
    TaggedCashflowItem,
};

/// The common module contract. Every hook has a default no-op body so a
/// module need only override what it contributes.
pub trait Module {
    fn name(&self) -> &'static str;

    fn on_start_of_year(&self, _state: &mut SimulationState, _ctx: &SimulationContext) {}
    fn on_start_of_month(&self, _state: &mut SimulationState, _ctx: &SimulationContext) {}

    fn get_cashflows(
        &self,
        _state: &SimulationState,
        _ctx: &SimulationContext,
    ) -> Vec<TaggedCashflowItem> {
        Vec::new()
    }

    fn on_after_cashflows(
        &self,
        _cashflows: &[TaggedCashflowItem],
        _state: &SimulationState,
        _ctx: &SimulationContext,
    ) -> Vec<TaggedCashflowItem> {
        Vec::new()
    }

    fn get_action_intents(
        &self,
        _state: &SimulationState,
        _ctx: &SimulationContext,
    ) -> Vec<ActionIntent> {
        Vec::new()
    }

    fn on_actions_resolved(
        &self,
        _actions: &[ActionRecord],
        _state: &mut SimulationState,
        _ctx: &SimulationContext,
    ) {
    }

    fn on_end_of_month(&self, _state: &mut SimulationState, _ctx: &SimulationContext) {}

    /// Overridden only by the returns module: applies the month's market
    /// return and returns the before/after snapshot for `on_market_returns`.
    fn produce_market_returns(&self, _state: &mut SimulationState) -> Option<Vec<MarketReturn>> {
        None
    }

    fn on_market_returns(
        &self,
        _returns: &[MarketReturn],
        _state: &mut SimulationState,
        _ctx: &SimulationContext,
    ) {
    }

    fn on_end_of_year(&self, _state: &mut SimulationState, _ctx: &SimulationContext) {}

    /// A writable slot for per-month checkpoints; the scheduler calls this
    /// after each hook phase to collect whatever the module wants recorded.
    fn explain(&self) -> ModuleRunExplanation {
        ModuleRunExplanation {
            module_name: self.name(),
            ..Default::default()
        }
    }
}

/// Builds the fixed, ordered module set for one run. The order here is the
/// order used for every hook invocation across the whole run. `seed` selects
/// stochastic market returns (`Some`) or the deterministic `return_rate` path
/// (`None`) for the returns-core module only; every other module is
/// stateless across runs.
pub fn build_module_registry(seed: Option<u64>) -> Vec<Box<dyn Module>> {
    let returns_core: Box<dyn Module> = match seed {
        Some(seed) => Box::new(ReturnsCoreModule::stochastic(seed)),
        None => Box::new(ReturnsCoreModule::deterministic()),
    };
    vec![
        returns_core,
        Box::new(IncomeWorkModule),
        Box::new(SpendingModule),
        Box::new(SocialSecurityModule),
        Box::new(PensionsModule),
        Box::new(EventsModule),
        Box::new(RmdModule),
        Box::new(RothConversionModule),
        Box::new(RebalancingModule),
        Box::new(TaxesModule),
    ]
}
