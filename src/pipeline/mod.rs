//! Per-entity model selection, forecasting and year-over-year change.
//!
//! For each entity the series is cleaned and split, every catalog strategy
//! is scored on the validation window, the best one is refit on the full
//! series, and its forecast is compared against the prior year.

mod catalog;
mod change;
mod evaluator;
mod forecaster;
mod runner;

pub use catalog::Strategy;
pub use change::{
    compute_change, ChangeAnnotations, ChangeSeries, ChangeWindow, Deadline, DeadlineMarker,
    MonthDay,
};
pub use evaluator::{
    evaluate, evaluate_strategy, rank, score, BestModelChoice, ScoreRecord, ScoreTable,
    StrategyOutcome, StrategyRecord,
};
pub use forecaster::{refit_and_forecast, ForecastResult};
pub use runner::{to_json, EntityReport, Pipeline, SeriesPoint};
