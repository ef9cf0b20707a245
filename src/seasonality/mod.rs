//! Seasonal-trend decomposition.

mod stl;

pub use stl::{STLResult, SeasonalWindow, STL};
