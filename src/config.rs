//! Pipeline configuration.
//!
//! Every field has a default, so a TOML document only needs the values it
//! changes:
//!
//! ```toml
//! parallel = false
//!
//! [ses]
//! alpha = 0.3
//! alpha_overrides = { stanford = 0.6 }
//!
//! [change.window]
//! start = { month = 9, day = 1 }
//! end = { month = 12, day = 31 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::WEEKS_PER_YEAR;
use crate::error::{ForecastError, Result};
use crate::models::arima::AutoARIMAConfig;
use crate::models::neural::NnarConfig;
use crate::pipeline::{ChangeWindow, Deadline};

/// Settings of the differenced SES strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SesConfig {
    /// Smoothing parameter used when an entity has no override.
    pub alpha: f64,
    /// Undo both differences before returning the forecast.
    pub reintegrate: bool,
    /// Per-entity smoothing parameters.
    pub alpha_overrides: BTreeMap<String, f64>,
}

impl Default for SesConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            reintegrate: false,
            alpha_overrides: BTreeMap::new(),
        }
    }
}

/// Year-over-year change analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeConfig {
    pub window: ChangeWindow,
    pub deadlines: Vec<Deadline>,
}

impl Default for ChangeConfig {
    fn default() -> Self {
        Self {
            window: ChangeWindow::default(),
            deadlines: Deadline::defaults(),
        }
    }
}

/// Top-level settings of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Seasonal period in weeks.
    pub period: usize,
    /// Length of the validation window.
    pub n_valid: usize,
    /// Steps forecast after refitting on the full series.
    pub horizon: usize,
    /// Order of both moving-average strategies.
    pub moving_average_order: usize,
    /// Sine/cosine pairs of a dummy-free Fourier regression. Unset keeps
    /// the dummies plus one harmonic pair.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fourier_harmonics: Option<usize>,
    /// Fit entities and strategies on the rayon pool.
    pub parallel: bool,
    pub ses: SesConfig,
    pub nnar: NnarConfig,
    pub arima: AutoARIMAConfig,
    pub change: ChangeConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            period: WEEKS_PER_YEAR,
            n_valid: WEEKS_PER_YEAR,
            horizon: WEEKS_PER_YEAR,
            moving_average_order: 12,
            fourier_harmonics: None,
            parallel: true,
            ses: SesConfig::default(),
            nnar: NnarConfig::default(),
            arima: AutoARIMAConfig::default(),
            change: ChangeConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig =
            toml::from_str(content).map_err(|e| ForecastError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ForecastError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| ForecastError::Config(e.to_string()))
    }

    /// Smoothing parameter for `entity`, falling back to the default alpha.
    pub fn ses_alpha(&self, entity: &str) -> f64 {
        self.ses
            .alpha_overrides
            .get(entity)
            .copied()
            .unwrap_or(self.ses.alpha)
    }

    /// AutoARIMA bounds with the seasonal period filled in.
    pub fn arima_config(&self) -> AutoARIMAConfig {
        self.arima.clone().with_seasonal_period(self.period)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("period", self.period),
            ("n_valid", self.n_valid),
            ("horizon", self.horizon),
            ("moving_average_order", self.moving_average_order),
            ("nnar.hidden", self.nnar.hidden),
            ("nnar.repeats", self.nnar.repeats),
            ("nnar.epochs", self.nnar.epochs),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ForecastError::Config(format!("{} must be positive", name)));
            }
        }

        if let Some(k) = self.fourier_harmonics {
            if k == 0 || 2 * k > self.period {
                return Err(ForecastError::Config(format!(
                    "fourier_harmonics must be in 1..={}, got {}",
                    self.period / 2,
                    k
                )));
            }
        }

        check_alpha("ses.alpha", self.ses.alpha)?;
        for (entity, &alpha) in &self.ses.alpha_overrides {
            check_alpha(&format!("ses.alpha_overrides.{}", entity), alpha)?;
        }

        if self.nnar.lags + self.nnar.seasonal_lags == 0 {
            return Err(ForecastError::Config(
                "nnar needs at least one lag".to_string(),
            ));
        }
        if !(self.nnar.learning_rate.is_finite() && self.nnar.learning_rate > 0.0) {
            return Err(ForecastError::Config(
                "nnar.learning_rate must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.nnar.momentum) {
            return Err(ForecastError::Config(
                "nnar.momentum must be in [0, 1)".to_string(),
            ));
        }

        self.change.window.validate()?;
        for deadline in &self.change.deadlines {
            deadline.date.validate()?;
        }

        Ok(())
    }
}

fn check_alpha(name: &str, alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(ForecastError::Config(format!(
            "{} must be in (0, 1), got {}",
            name, alpha
        )))
    }
}
