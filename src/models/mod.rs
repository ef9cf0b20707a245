//! Forecasting models.

mod traits;

pub mod arima;
pub mod baseline;
pub mod exponential;
pub mod neural;
pub mod regression;
pub mod stl_ets;

pub use arima::{AutoARIMA, ARIMA};
pub use baseline::{MovingAverage, SeasonalNaive};
pub use exponential::{AutoETS, DifferencedSes, HoltWinters};
pub use neural::{Nnar, NnarConfig};
pub use regression::{FourierRegression, Tslm};
pub use stl_ets::StlEts;
pub use traits::{BoxedForecaster, Forecaster};
