//! Year-over-year change of a forecast against the prior year.
//!
//! A calendar window (a pair of month/day dates) is located inside the
//! forecast horizon, the same window one year earlier is cut from the
//! history, and the two are differenced point by point.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::pipeline::forecaster::ForecastResult;

/// A calendar date without a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Result<Self> {
        let md = Self { month, day };
        md.validate()?;
        Ok(md)
    }

    /// Check the date exists in a leap year.
    pub fn validate(&self) -> Result<()> {
        if NaiveDate::from_ymd_opt(2000, self.month, self.day).is_none() {
            return Err(ForecastError::Config(format!(
                "invalid month/day {:02}-{:02}",
                self.month, self.day
            )));
        }
        Ok(())
    }

    /// The date in `year`; February 29 falls back to February 28 outside leap years.
    pub fn in_year(&self, year: i32) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
            .or_else(|| {
                (self.month == 2 && self.day == 29)
                    .then(|| NaiveDate::from_ymd_opt(year, 2, 28))
                    .flatten()
            })
            .ok_or_else(|| {
                ForecastError::TimestampError(format!(
                    "{:02}-{:02} does not exist in {}",
                    self.month, self.day, year
                ))
            })
    }

    fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }
}

/// Inclusive calendar window; an end before the start wraps into the next year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeWindow {
    /// Year of the window start. Located from the forecast dates when unset.
    pub year: Option<i32>,
    pub start: MonthDay,
    pub end: MonthDay,
}

impl Default for ChangeWindow {
    fn default() -> Self {
        Self {
            year: None,
            start: MonthDay { month: 8, day: 1 },
            end: MonthDay { month: 1, day: 1 },
        }
    }
}

impl ChangeWindow {
    pub fn new(start: MonthDay, end: MonthDay) -> Self {
        Self {
            year: None,
            start,
            end,
        }
    }

    /// Pin the window to the instance starting in `year`.
    pub fn in_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn wraps(&self) -> bool {
        self.end < self.start
    }

    pub fn validate(&self) -> Result<()> {
        self.start.validate()?;
        self.end.validate()
    }

    /// Concrete start and end dates of the instance starting in `year`.
    pub fn dates(&self, year: i32) -> Result<(NaiveDate, NaiveDate)> {
        let end_year = if self.wraps() { year + 1 } else { year };
        Ok((self.start.in_year(year)?, self.end.in_year(end_year)?))
    }

    /// Pick the window instance lying entirely within a run of dates.
    ///
    /// A pinned year must itself be covered. Otherwise the earliest covered
    /// instance wins.
    pub fn locate(&self, dates: &[NaiveDate]) -> Result<(NaiveDate, NaiveDate)> {
        let (first, last) = match (dates.first(), dates.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => {
                return Err(ForecastError::Alignment(
                    "forecast holds no dates".to_string(),
                ))
            }
        };

        if let Some(year) = self.year {
            let (start, end) = self.dates(year)?;
            if first <= start && end <= last {
                return Ok((start, end));
            }
            return Err(ForecastError::Alignment(format!(
                "window {}..{} lies outside the forecast {}..{}",
                start, end, first, last
            )));
        }

        for year in first.year()..=last.year() {
            let (start, end) = self.dates(year)?;
            if first <= start && end <= last {
                return Ok((start, end));
            }
        }

        Err(ForecastError::Alignment(format!(
            "no {:02}-{:02}..{:02}-{:02} window lies within the forecast {}..{}",
            self.start.month, self.start.day, self.end.month, self.end.day, first, last
        )))
    }
}

/// A labelled date drawn on the change chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    pub label: String,
    pub date: MonthDay,
}

impl Deadline {
    pub fn new(label: impl Into<String>, date: MonthDay) -> Self {
        Self {
            label: label.into(),
            date,
        }
    }

    /// Early decision (November 1) and regular decision (January 1).
    pub fn defaults() -> Vec<Deadline> {
        vec![
            Deadline::new("Early decision", MonthDay { month: 11, day: 1 }),
            Deadline::new("Regular decision", MonthDay { month: 1, day: 1 }),
        ]
    }
}

/// A deadline resolved to a concrete date inside the change window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlineMarker {
    pub label: String,
    pub date: NaiveDate,
}

/// Presentation hints for the change chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChangeAnnotations {
    pub deadlines: Vec<DeadlineMarker>,
    /// Horizontal reference line.
    pub baseline: f64,
}

/// Forecast minus prior-year values over the change window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeSeries {
    pub entity: String,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    /// Forecast timestamps inside the window.
    pub timestamps: Vec<DateTime<Utc>>,
    pub forecast: Vec<f64>,
    pub prior_year: Vec<f64>,
    /// `forecast - prior_year` by position.
    pub difference: Vec<f64>,
    pub annotations: ChangeAnnotations,
}

impl ChangeSeries {
    pub fn len(&self) -> usize {
        self.difference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.difference.is_empty()
    }

    /// Resolve deadline markers to the window's calendar.
    ///
    /// Each marker lands on the first occurrence of its month/day on or
    /// after the window start.
    pub fn with_deadlines(mut self, deadlines: &[Deadline]) -> Result<Self> {
        let start_year = self.window_start.year();
        let start = MonthDay::of(self.window_start);
        self.annotations.deadlines = deadlines
            .iter()
            .map(|d| {
                let year = if d.date >= start {
                    start_year
                } else {
                    start_year + 1
                };
                Ok(DeadlineMarker {
                    label: d.label.clone(),
                    date: d.date.in_year(year)?,
                })
            })
            .collect::<Result<_>>()?;
        Ok(self)
    }
}

/// Difference the forecast over `window` against the same window a year earlier.
///
/// Points are paired by position, so both sides must hold the same number
/// of observations.
pub fn compute_change(
    entity: &str,
    forecast: &ForecastResult,
    history: &TimeSeries,
    window: &ChangeWindow,
) -> Result<ChangeSeries> {
    if forecast.timestamps.len() != forecast.values.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: forecast.timestamps.len(),
            got: forecast.values.len(),
        });
    }

    let dates: Vec<NaiveDate> = forecast.timestamps.iter().map(|t| t.date_naive()).collect();
    let (start, end) = window.locate(&dates)?;

    let (timestamps, current): (Vec<DateTime<Utc>>, Vec<f64>) = forecast
        .timestamps
        .iter()
        .zip(forecast.values.iter())
        .filter(|(t, _)| (start..=end).contains(&t.date_naive()))
        .map(|(t, v)| (*t, *v))
        .unzip();
    if current.is_empty() {
        return Err(ForecastError::Alignment(format!(
            "no forecast points between {} and {}",
            start, end
        )));
    }

    let year = Months::new(12);
    let prior_start = start.checked_sub_months(year).ok_or_else(|| {
        ForecastError::TimestampError(format!("cannot shift {} back one year", start))
    })?;
    let prior_end = end.checked_sub_months(year).ok_or_else(|| {
        ForecastError::TimestampError(format!("cannot shift {} back one year", end))
    })?;

    let covered = match (history.timestamps().first(), history.timestamps().last()) {
        (Some(first), Some(last)) => {
            first.date_naive() <= prior_start && prior_end <= last.date_naive()
        }
        _ => false,
    };
    if !covered {
        return Err(ForecastError::Alignment(format!(
            "history does not cover {}..{}",
            prior_start, prior_end
        )));
    }

    let prior_year: Vec<f64> = history
        .iter()
        .filter(|(t, _)| (prior_start..=prior_end).contains(&t.date_naive()))
        .map(|(_, v)| v)
        .collect();
    if prior_year.is_empty() {
        return Err(ForecastError::Alignment(format!(
            "history has no points between {} and {}",
            prior_start, prior_end
        )));
    }
    if prior_year.len() != current.len() {
        return Err(ForecastError::Alignment(format!(
            "forecast window holds {} points, prior year {}",
            current.len(),
            prior_year.len()
        )));
    }

    let difference = current
        .iter()
        .zip(prior_year.iter())
        .map(|(f, h)| f - h)
        .collect();

    Ok(ChangeSeries {
        entity: entity.to_string(),
        window_start: start,
        window_end: end,
        timestamps,
        forecast: current,
        prior_year,
        difference,
        annotations: ChangeAnnotations::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Strategy;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    fn history(start: DateTime<Utc>, weeks: usize) -> TimeSeries {
        let values = (0..weeks).map(|i| 10.0 + i as f64).collect();
        TimeSeries::weekly(start, values).unwrap()
    }

    fn forecast_after(series: &TimeSeries, values: Vec<f64>) -> ForecastResult {
        ForecastResult {
            entity: "harvard".to_string(),
            strategy: Strategy::SeasonalNaive,
            timestamps: series.future_timestamps(values.len()).unwrap(),
            values,
        }
    }

    #[test]
    fn default_window_wraps_year() {
        let window = ChangeWindow::default();
        assert!(window.wraps());
        let (start, end) = window.dates(2023).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2023, 8, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn month_day_validation() {
        assert!(MonthDay::new(2, 29).is_ok());
        assert!(MonthDay::new(2, 30).is_err());
        assert!(MonthDay::new(13, 1).is_err());
        let leap = MonthDay::new(2, 29).unwrap();
        assert_eq!(
            leap.in_year(2023).unwrap(),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
    }

    #[test]
    fn locate_prefers_fully_covered_instance() {
        // Weekly dates from 2023-03-05 for 52 weeks cover Aug 2023 - Jan 2024
        let start = NaiveDate::from_ymd_opt(2023, 3, 5).unwrap();
        let dates: Vec<NaiveDate> = (0..52).map(|i| start + Duration::weeks(i)).collect();
        let (s, e) = ChangeWindow::default().locate(&dates).unwrap();
        assert_eq!(s, NaiveDate::from_ymd_opt(2023, 8, 1).unwrap());
        assert_eq!(e, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn locate_rejects_partly_covered_windows() {
        // 2023-10-01 .. 2024-09-22 cuts into both the 2023 and the 2024 instance
        let start = NaiveDate::from_ymd_opt(2023, 10, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..52).map(|i| start + Duration::weeks(i)).collect();
        assert!(matches!(
            ChangeWindow::default().locate(&dates),
            Err(ForecastError::Alignment(_))
        ));
        assert!(matches!(
            ChangeWindow::default().locate(&[]),
            Err(ForecastError::Alignment(_))
        ));
    }

    #[test]
    fn forecast_starting_mid_window_is_alignment_error() {
        // Forecast runs from 2023-10-01, past the August start of the window
        let start = Utc.with_ymd_and_hms(2022, 10, 2, 0, 0, 0).unwrap();
        let series = history(start, 52);
        let forecast = forecast_after(&series, vec![1.0; 52]);
        assert_eq!(
            forecast.timestamps[0].date_naive(),
            NaiveDate::from_ymd_opt(2023, 10, 1).unwrap()
        );

        let result = compute_change("brown", &forecast, &series, &ChangeWindow::default());
        assert!(matches!(result, Err(ForecastError::Alignment(_))));
    }

    #[test]
    fn pinned_year_is_used() {
        let start = NaiveDate::from_ymd_opt(2021, 3, 7).unwrap();
        let dates: Vec<NaiveDate> = (0..104).map(|i| start + Duration::weeks(i)).collect();

        let window = ChangeWindow::default().in_year(2022);
        let (s, e) = window.locate(&dates).unwrap();
        assert_eq!(s, NaiveDate::from_ymd_opt(2022, 8, 1).unwrap());
        assert_eq!(e, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());

        let outside = ChangeWindow::default().in_year(2023);
        assert!(matches!(
            outside.locate(&dates),
            Err(ForecastError::Alignment(_))
        ));
    }

    #[test]
    fn change_against_prior_year() {
        // Last observation 2023-03-19; prior-year values run 197..218
        let start = Utc.with_ymd_and_hms(2019, 1, 6, 0, 0, 0).unwrap();
        let series = history(start, 220);
        let forecast = forecast_after(&series, vec![1000.0; 52]);

        let change =
            compute_change("harvard", &forecast, &series, &ChangeWindow::default()).unwrap();

        // 154 inclusive days hold exactly 22 weekly points
        assert_eq!(change.len(), 22);
        assert_eq!(change.prior_year.len(), 22);
        assert_eq!(
            change.window_start,
            NaiveDate::from_ymd_opt(2023, 8, 1).unwrap()
        );
        for ((d, f), h) in change
            .difference
            .iter()
            .zip(change.forecast.iter())
            .zip(change.prior_year.iter())
        {
            assert_relative_eq!(*d, f - h);
        }
        assert!(change.difference.iter().all(|d| *d > 0.0));
        assert_eq!(change.annotations.baseline, 0.0);
    }

    #[test]
    fn deadlines_resolve_inside_window() {
        let start = Utc.with_ymd_and_hms(2019, 1, 6, 0, 0, 0).unwrap();
        let series = history(start, 220);
        let forecast = forecast_after(&series, vec![50.0; 52]);

        let change = compute_change("yale", &forecast, &series, &ChangeWindow::default())
            .unwrap()
            .with_deadlines(&Deadline::defaults())
            .unwrap();

        let markers = &change.annotations.deadlines;
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].label, "Early decision");
        assert_eq!(markers[0].date, NaiveDate::from_ymd_opt(2023, 11, 1).unwrap());
        assert_eq!(markers[1].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn short_history_is_alignment_error() {
        // History starts 2022-10-02, so the prior-year window is only partly covered
        let start = Utc.with_ymd_and_hms(2022, 10, 2, 0, 0, 0).unwrap();
        let series = history(start, 23);
        let forecast = forecast_after(&series, vec![1.0; 52]);

        let result = compute_change("mit", &forecast, &series, &ChangeWindow::default());
        assert!(matches!(result, Err(ForecastError::Alignment(_))));
    }

    #[test]
    fn missing_prior_year_is_alignment_error() {
        let start = Utc.with_ymd_and_hms(2023, 1, 8, 0, 0, 0).unwrap();
        let series = history(start, 10);
        let forecast = forecast_after(&series, vec![1.0; 52]);

        let result = compute_change("mit", &forecast, &series, &ChangeWindow::default());
        assert!(matches!(result, Err(ForecastError::Alignment(_))));
    }
}
