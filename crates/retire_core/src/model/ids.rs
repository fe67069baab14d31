//! Unique identifiers for snapshot entities
//!
//! Each entity type has its own ID newtype to keep id spaces from being mixed
//! up at the call site (a `HoldingId` cannot be passed where a `PersonId` is
//! expected).

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);
    };
}

id_type!(PersonId);
id_type!(StrategyId);
id_type!(CashAccountId);
id_type!(InvestmentAccountId);
id_type!(HoldingId);
id_type!(EventId);
