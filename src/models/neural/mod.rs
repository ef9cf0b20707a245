//! Neural network forecasting models.

mod nnar;

pub use nnar::{Nnar, NnarConfig};
