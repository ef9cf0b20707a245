//! Core data structures: series, forecasts and the per-entity series store.

mod forecast;
mod store;
mod time_series;

pub use forecast::Forecast;
pub use store::SeriesStore;
pub use time_series::{TimeSeries, WEEKS_PER_YEAR};
