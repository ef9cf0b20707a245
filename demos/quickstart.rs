//! Run the pipeline over a few synthetic entities and print the results.
//!
//! ```sh
//! RUST_LOG=trendcast=debug cargo run --example quickstart
//! ```

use chrono::{TimeZone, Utc};
use tracing_subscriber::EnvFilter;
use trendcast::prelude::*;
use trendcast::pipeline::StrategyOutcome;

fn synthetic(n: usize, level: f64, amplitude: f64, slope: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let season = (2.0 * std::f64::consts::PI * (i as f64 - 30.0) / 52.0).cos();
            (level + slope * i as f64 + amplitude * season).round().max(0.0)
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let start = Utc.with_ymd_and_hms(2019, 1, 6, 0, 0, 0).unwrap();
    let mut store = SeriesStore::new();
    store.insert("harvard", TimeSeries::weekly(start, synthetic(230, 55.0, 30.0, 0.02))?);
    store.insert("mit", TimeSeries::weekly(start, synthetic(230, 35.0, 20.0, 0.08))?);
    store.insert("yale", TimeSeries::weekly(start, synthetic(230, 20.0, 25.0, -0.03))?);

    let pipeline = Pipeline::new(PipelineConfig::default())?;
    for (entity, result) in pipeline.run_batch(&store) {
        let report = match result {
            Ok(report) => report,
            Err(e) => {
                println!("{}: failed: {}", entity, e);
                continue;
            }
        };

        println!("== {} ==", entity);
        for record in &report.scores.records {
            match &record.outcome {
                StrategyOutcome::Scored { mape, .. } => {
                    println!("  {:<24} {:>8.2}%", record.strategy, mape)
                }
                StrategyOutcome::Failed { reason } => {
                    println!("  {:<24} failed ({})", record.strategy, reason)
                }
                StrategyOutcome::Skipped { reason } => {
                    println!("  {:<24} skipped ({})", record.strategy, reason)
                }
            }
        }
        println!("  best: {} ({:.2}%)", report.best.strategy, report.best.mape);

        let change = &report.change;
        let mean_change = change.difference.iter().sum::<f64>() / change.len() as f64;
        println!(
            "  change {}..{}: {:+.1} on average over {} weeks",
            change.window_start,
            change.window_end,
            mean_change,
            change.len()
        );
        for marker in &change.annotations.deadlines {
            println!("  {}: {}", marker.label, marker.date);
        }
    }

    Ok(())
}
