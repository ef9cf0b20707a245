//! Linear regression strategies on deterministic trend and season terms.

mod design;
mod fourier;
mod tslm;

pub use fourier::FourierRegression;
pub use tslm::Tslm;
