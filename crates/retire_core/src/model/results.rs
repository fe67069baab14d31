//! Output contracts: the per-run result, the run envelope, and batch labels.

use serde::{Deserialize, Serialize};

use super::explain::MonthExplanation;
use super::records::{MonthlyRecord, YearRecord};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub ending_balance: f64,
    pub min_balance: f64,
    pub max_balance: f64,
    pub guardrail_factor_avg: Option<f64>,
    pub guardrail_factor_min: Option<f64>,
    pub guardrail_factor_below_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationResult {
    pub timeline: Vec<YearRecord>,
    pub monthly_timeline: Vec<MonthlyRecord>,
    pub explanations: Option<Vec<MonthExplanation>>,
    pub summary: RunSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRun {
    pub id: String,
    pub scenario_id: String,
    pub started_at: jiff::Timestamp,
    pub finished_at: jiff::Timestamp,
    pub status: RunStatus,
    pub error_message: Option<String>,
    pub result: Option<SimulationResult>,
    /// Echoes the input snapshot back to the caller; left `None` by the
    /// engine itself (the snapshot the caller already holds is the source of
    /// truth) and populated only by a caller that wants a self-contained run
    /// record, e.g. for display or for attaching to a saved run.
    pub snapshot: Option<super::SimulationSnapshot>,
    /// `Some` only for stochastic batch runs, labeling which seed/index
    /// produced this run.
    pub run_index: Option<u32>,
    pub seed: Option<u64>,
}

impl SimulationRun {
    pub fn success(
        id: String,
        scenario_id: String,
        started_at: jiff::Timestamp,
        finished_at: jiff::Timestamp,
        result: SimulationResult,
    ) -> Self {
        SimulationRun {
            id,
            scenario_id,
            started_at,
            finished_at,
            status: RunStatus::Success,
            error_message: None,
            result: Some(result),
            snapshot: None,
            run_index: None,
            seed: None,
        }
    }

    pub fn error(
        id: String,
        scenario_id: String,
        started_at: jiff::Timestamp,
        finished_at: jiff::Timestamp,
        message: String,
    ) -> Self {
        SimulationRun {
            id,
            scenario_id,
            started_at,
            finished_at,
            status: RunStatus::Error,
            error_message: Some(message),
            result: None,
            snapshot: None,
            run_index: None,
            seed: None,
        }
    }

    pub fn with_batch_label(mut self, run_index: u32, seed: u64) -> Self {
        self.run_index = Some(run_index);
        self.seed = Some(seed);
        self
    }

    pub fn with_snapshot(mut self, snapshot: super::SimulationSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub start_date: jiff::civil::Date,
    pub seeds: Vec<u64>,
    pub summary_only: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResult {
    pub runs: Vec<SimulationRun>,
}
