//! Action intents emitted by modules and the resolved records produced by
//! the tax-lot engine.

use serde::{Deserialize, Serialize};

use super::ids::HoldingId;
use super::snapshot::TaxTreatment;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ActionIntent {
    Deposit {
        amount: f64,
        priority: i32,
        target_holding_id: Option<HoldingId>,
        from_cash: bool,
    },
    Withdraw {
        amount: f64,
        priority: i32,
        source_holding_id: Option<HoldingId>,
        tax_treatment: Option<TaxTreatment>,
        skip_penalty: bool,
    },
    Convert {
        amount: f64,
        priority: i32,
        source_holding_id: Option<HoldingId>,
        target_holding_id: Option<HoldingId>,
    },
}

impl ActionIntent {
    pub fn priority(&self) -> i32 {
        match self {
            ActionIntent::Deposit { priority, .. }
            | ActionIntent::Withdraw { priority, .. }
            | ActionIntent::Convert { priority, .. } => *priority,
        }
    }

    pub fn amount(&self) -> f64 {
        match self {
            ActionIntent::Deposit { amount, .. }
            | ActionIntent::Withdraw { amount, .. }
            | ActionIntent::Convert { amount, .. } => *amount,
        }
    }
}

/// The result of resolving and executing an [`ActionIntent`].
/// `resolved_amount <= intent.amount()`, clamped by availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    pub intent: ActionIntent,
    pub resolved_amount: f64,
    pub ordinary_income: f64,
    pub capital_gains: f64,
    pub penalty: f64,
}
