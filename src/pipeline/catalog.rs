//! The ordered catalog of forecasting strategies.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::models::arima::AutoARIMA;
use crate::models::baseline::{MovingAverage, SeasonalNaive};
use crate::models::exponential::{DifferencedSes, HoltWinters};
use crate::models::neural::Nnar;
use crate::models::regression::{FourierRegression, Tslm};
use crate::models::stl_ets::StlEts;
use crate::models::BoxedForecaster;

/// A forecasting strategy of the catalog.
///
/// Declaration order is catalog order, which also breaks ties when two
/// strategies score the same.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Strategy {
    SeasonalNaive,
    DifferencedSes,
    Tslm,
    MovingAverage,
    CenteredMovingAverage,
    HoltWinters,
    StlEts,
    AutoArima,
    Nnar,
    FourierRegression,
}

impl Strategy {
    /// Every strategy in catalog order.
    pub const ALL: [Strategy; 10] = [
        Strategy::SeasonalNaive,
        Strategy::DifferencedSes,
        Strategy::Tslm,
        Strategy::MovingAverage,
        Strategy::CenteredMovingAverage,
        Strategy::HoltWinters,
        Strategy::StlEts,
        Strategy::AutoArima,
        Strategy::Nnar,
        Strategy::FourierRegression,
    ];

    /// Zero-based position in the catalog.
    pub fn position(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::SeasonalNaive => "SeasonalNaive",
            Strategy::DifferencedSes => "DifferencedSES",
            Strategy::Tslm => "TSLM",
            Strategy::MovingAverage => "MovingAverage",
            Strategy::CenteredMovingAverage => "CenteredMovingAverage",
            Strategy::HoltWinters => "HoltWinters",
            Strategy::StlEts => "STL+ETS",
            Strategy::AutoArima => "AutoARIMA",
            Strategy::Nnar => "NNAR",
            Strategy::FourierRegression => "FourierRegression",
        }
    }

    /// Look a strategy up by its display name.
    pub fn from_name(name: &str) -> Option<Strategy> {
        Strategy::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Unfitted model for `entity`, configured from `config`.
    ///
    /// Evaluation and the final refit both build through here, so the model
    /// scored on the validation window is the model used for the forecast.
    pub fn build(self, config: &PipelineConfig, entity: &str) -> BoxedForecaster {
        let period = config.period;
        match self {
            Strategy::SeasonalNaive => Box::new(SeasonalNaive::new(period)),
            Strategy::DifferencedSes => {
                let alpha = config.ses_alpha(entity);
                if config.ses.reintegrate {
                    Box::new(DifferencedSes::reintegrated(alpha, period))
                } else {
                    Box::new(DifferencedSes::new(alpha, period))
                }
            }
            Strategy::Tslm => Box::new(Tslm::new(period)),
            Strategy::MovingAverage => {
                Box::new(MovingAverage::trailing(config.moving_average_order))
            }
            Strategy::CenteredMovingAverage => {
                Box::new(MovingAverage::centered(config.moving_average_order))
            }
            Strategy::HoltWinters => Box::new(HoltWinters::new(period)),
            Strategy::StlEts => Box::new(StlEts::new(period)),
            Strategy::AutoArima => Box::new(AutoARIMA::with_config(config.arima_config())),
            Strategy::Nnar => Box::new(Nnar::new(period, config.nnar.clone())),
            Strategy::FourierRegression => match config.fourier_harmonics {
                Some(k) => Box::new(FourierRegression::harmonics(period, k)),
                None => Box::new(FourierRegression::new(period)),
            },
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_is_declaration_order() {
        for (i, strategy) in Strategy::ALL.iter().enumerate() {
            assert_eq!(strategy.position(), i);
        }
        assert!(Strategy::SeasonalNaive < Strategy::FourierRegression);
    }

    #[test]
    fn names_round_trip() {
        for strategy in Strategy::ALL {
            assert_eq!(Strategy::from_name(strategy.name()), Some(strategy));
            assert_eq!(strategy.to_string(), strategy.name());
        }
        assert_eq!(Strategy::from_name("Prophet"), None);
    }

    #[test]
    fn factory_builds_unfitted_models() {
        let config = PipelineConfig::default();
        for strategy in Strategy::ALL {
            let model = strategy.build(&config, "harvard");
            assert!(!model.is_fitted(), "{} starts fitted", strategy);
        }
    }

    #[test]
    fn factory_uses_entity_alpha() {
        let mut config = PipelineConfig::default();
        config.ses.alpha_overrides.insert("yale".to_string(), 0.2);
        let model = Strategy::DifferencedSes.build(&config, "yale");
        assert_eq!(model.name(), "DifferencedSES");
    }

    #[test]
    fn fourier_harmonics_drop_the_dummies() {
        use crate::core::TimeSeries;
        use chrono::{TimeZone, Utc};

        let start = Utc.with_ymd_and_hms(2019, 1, 6, 0, 0, 0).unwrap();
        let values: Vec<f64> = (0..156)
            .map(|i| 40.0 + 0.1 * i as f64 + ((i * 7) % 52) as f64 * 0.2)
            .collect();
        let series = TimeSeries::weekly(start, values).unwrap();

        let mut config = PipelineConfig::default();
        let mut tslm = Strategy::Tslm.build(&config, "mit");
        let mut aliased = Strategy::FourierRegression.build(&config, "mit");
        config.fourier_harmonics = Some(2);
        let mut smooth = Strategy::FourierRegression.build(&config, "mit");

        tslm.fit(&series).unwrap();
        aliased.fit(&series).unwrap();
        smooth.fit(&series).unwrap();
        let tslm = tslm.predict(52).unwrap();
        let aliased = aliased.predict(52).unwrap();
        let smooth = smooth.predict(52).unwrap();

        let gap = |a: &[f64], b: &[f64]| {
            a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max)
        };
        assert!(gap(tslm.primary(), aliased.primary()) < 1e-6);
        assert!(gap(tslm.primary(), smooth.primary()) > 1e-3);
    }
}
