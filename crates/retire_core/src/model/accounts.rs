//! Cash accounts and investment holdings.
//!
//! A holding's `contribution_basis_entries` record after-tax money added to the
//! holding (deposits, Roth conversions); withdrawals consume them per the
//! configured [`LotMethod`](crate::model::LotMethod) to determine cost basis
//! and, for Roth holdings, seasoning.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::ids::{CashAccountId, HoldingId, InvestmentAccountId};

/// A liquid cash account. The first in `snapshot.cash_accounts` order absorbs
/// overdraft from withdrawals that exceed another account's balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashAccount {
    pub id: CashAccountId,
    pub balance: f64,
    pub interest_rate: f64,
}

/// Tax treatment of a holding, governing withdrawal and contribution tax rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingTaxType {
    Taxable,
    Traditional,
    Roth,
    Hsa,
}

/// Asset class of a holding, used to compare against a glidepath target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingType {
    Equity,
    Bond,
    CashEquivalent,
    RealEstate,
    Other,
}

/// How basis lots are selected when a taxable holding is partially liquidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotMethod {
    Fifo,
    Lifo,
    AverageCost,
}

/// A single `{date, amount}` record of after-tax money added to a holding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BasisEntry {
    pub date: Date,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub id: HoldingId,
    pub investment_account_id: InvestmentAccountId,
    pub tax_type: HoldingTaxType,
    pub holding_type: HoldingType,
    pub balance: f64,
    pub contribution_basis_entries: Vec<BasisEntry>,
    pub return_rate: f64,
    pub return_std_dev: f64,
    pub lot_method: LotMethod,
}

impl Holding {
    /// Sum of all basis entries, i.e. total after-tax principal currently in
    /// the holding.
    pub fn total_basis(&self) -> f64 {
        self.contribution_basis_entries
            .iter()
            .map(|e| e.amount)
            .sum()
    }

    /// Basis whose seasoning clock (`months_between(entry.date, at) >= 60`)
    /// has elapsed, i.e. penalty-free for Roth purposes.
    pub fn seasoned_basis(&self, at: Date) -> f64 {
        self.contribution_basis_entries
            .iter()
            .filter(|e| crate::date_math::months_between(e.date, at) >= 60)
            .map(|e| e.amount)
            .sum()
    }
}

/// Groups holdings that share a brokerage/retirement-account wrapper. The
/// wrapper itself carries no balance; balances live on the holdings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentAccount {
    pub id: InvestmentAccountId,
    pub name: String,
}
