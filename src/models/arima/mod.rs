//! Seasonal ARIMA models.
//!
//! This module provides:
//! - ARIMA(p, d, q)(P, D, Q)\[s\] estimated by conditional sum of squares
//! - AutoARIMA for bounded order selection
//! - Differencing and integration helpers shared with other models

mod auto_arima;
pub mod diff;
mod model;

pub use auto_arima::{AutoARIMA, AutoARIMAConfig};
pub use diff::{difference, integrate, seasonal_difference};
pub use model::{Coefficients, ModelOrder, ARIMA};
