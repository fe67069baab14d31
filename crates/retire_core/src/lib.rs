//! Retirement planning simulation engine.
//!
//! This crate advances a household's accounts and holdings month by month
//! across a fixed, ordered set of simulation modules (market returns,
//! income, spending, Social Security, pensions, one-time events, RMDs, Roth
//! conversions, rebalancing, and taxes), resolving each month's cashflows and
//! account actions through a shared tax-lot engine. A [`scheduler::run_simulation`]
//! call drives a single run to completion; [`batch::run_batch`] fans a
//! scenario out across seeded runs for Monte Carlo analysis.
//!
//! # Example
//!
//! ```ignore
//! use retire_core::scheduler::{run_simulation, RunOptions};
//!
//! let result = run_simulation(&snapshot, start_date, RunOptions::default())?;
//! println!("ending balance: {}", result.summary.ending_balance);
//! ```

#![warn(clippy::all)]

pub mod batch;
pub mod date_math;
pub mod error;
pub mod input_builder;
pub mod model;
pub mod modules;
pub mod scheduler;
pub mod tax_lot;
pub mod taxes;

pub use error::{MissingReferenceKind, Result, SimulationError};
pub use scheduler::{run_simulation, RunOptions};
