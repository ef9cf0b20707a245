//! # trendcast
//!
//! Model selection and forecasting for weekly search-interest series.
//!
//! Each entity's series is cleaned, ten forecasting strategies are scored
//! on a held-out year, the best one is refit and forecast a year ahead, and
//! the forecast is compared with the same calendar window of the prior
//! year.
//!
//! ```no_run
//! use chrono::{TimeZone, Utc};
//! use trendcast::prelude::*;
//!
//! let start = Utc.with_ymd_and_hms(2019, 1, 6, 0, 0, 0).unwrap();
//! let values: Vec<f64> = (0..230).map(|i| 40.0 + (i % 52) as f64).collect();
//!
//! let mut store = SeriesStore::new();
//! store.insert("harvard", TimeSeries::weekly(start, values)?);
//!
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let report = pipeline.run_entity(&store, "harvard")?;
//! println!("{} ({:.2}% MAPE)", report.best.strategy, report.best.mape);
//! # Ok::<(), trendcast::ForecastError>(())
//! ```

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod preprocess;
pub mod seasonality;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::core::{Forecast, SeriesStore, TimeSeries};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::Forecaster;
    pub use crate::pipeline::{EntityReport, Pipeline, Strategy};
    pub use crate::preprocess::{sanitize, split};
    pub use crate::utils::{calculate_metrics, AccuracyMetrics};
}
