//! Exponential smoothing models.
//!
//! This module provides exponential smoothing forecasting methods:
//! - Simple Exponential Smoothing (SES), optionally on a differenced series
//! - Holt-Winters (additive seasonality, short periods only)
//! - Non-seasonal ETS and automatic ETS selection

mod auto_ets;
mod differenced_ses;
mod ets;
mod holt_winters;
mod ses;

pub use auto_ets::AutoETS;
pub use differenced_ses::DifferencedSes;
pub use ets::{EtsParams, TrendType, ETS};
pub use holt_winters::{HoltWinters, MAX_SEASONAL_PERIOD};
pub use ses::SimpleExponentialSmoothing;
