//! Per-entity storage of weekly series.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use std::collections::BTreeMap;

/// Holds one weekly series per entity key.
///
/// Keys iterate in sorted order so batch runs visit entities
/// deterministically.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    series: BTreeMap<String, TimeSeries>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the series for `entity`.
    pub fn insert(&mut self, entity: impl Into<String>, series: TimeSeries) {
        self.series.insert(entity.into(), series);
    }

    /// Look up the series of an entity.
    pub fn load(&self, entity: &str) -> Result<&TimeSeries> {
        self.series
            .get(entity)
            .ok_or_else(|| ForecastError::MissingData {
                entity: entity.to_string(),
            })
    }

    /// Inclusive positional window `[start, end]` of a series.
    pub fn window(series: &TimeSeries, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end || end >= series.len() {
            return Err(ForecastError::Range {
                start,
                end,
                len: series.len(),
            });
        }
        series.slice(start, end + 1)
    }

    /// Entity keys in sorted order.
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl FromIterator<(String, TimeSeries)> for SeriesStore {
    fn from_iter<I: IntoIterator<Item = (String, TimeSeries)>>(iter: I) -> Self {
        Self {
            series: iter.into_iter().collect(),
        }
    }
}
