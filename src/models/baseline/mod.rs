//! Baseline forecasting models.

mod moving_average;
mod seasonal_naive;

pub use moving_average::{MovingAverage, MovingAverageKind};
pub use seasonal_naive::SeasonalNaive;
