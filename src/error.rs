//! Error types for the trendcast pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while preparing, fitting or analysing series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// No series is registered for the entity.
    #[error("no series registered for entity '{entity}'")]
    MissingData { entity: String },

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// A positional window falls outside the series.
    #[error("window [{start}, {end}] out of range for series of length {len}")]
    Range { start: usize, end: usize, len: usize },

    /// Forecast and historical change windows cannot be aligned.
    #[error("alignment error: {0}")]
    Alignment(String),

    /// A forecasting strategy failed to produce a usable model.
    #[error("model fit failed for {strategy}: {reason}")]
    ModelFit { strategy: String, reason: String },

    /// The strategy is not defined for the given input.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid pipeline configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),

    /// A report could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ForecastError {
    /// Wrap any error raised while fitting `strategy` into a `ModelFit` error.
    pub fn model_fit(strategy: impl Into<String>, source: &ForecastError) -> Self {
        match source {
            ForecastError::ModelFit { .. } => source.clone(),
            other => ForecastError::ModelFit {
                strategy: strategy.into(),
                reason: other.to_string(),
            },
        }
    }
}
