//! Batch forecast over a handful of synthetic CPI series.
//!
//! Run with `RUST_LOG=cpi_forecast=debug` to see each pipeline stage.

use cpi_forecast::prelude::*;

fn synthetic_cpi(start: YearMonth, n: usize, inflation: f64, seasonal: f64) -> Vec<RawObservation> {
    let mut level = 100.0;
    (0..n)
        .map(|i| {
            let t = i as f64;
            level *= 1.0 + inflation / 12.0;
            let wobble = 0.15 * ((t * 1.3).sin() + (t * 0.7).cos());
            let season = seasonal * (2.0 * std::f64::consts::PI * t / 12.0).sin();
            RawObservation::present(start.add_months(i as i64).first_day(), level + season + wobble)
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::level_filters::LevelFilter::INFO.into()),
        )
        .init();

    let provider = InMemoryProvider::new()
        .with_series("US", synthetic_cpi(YearMonth::new(2005, 1)?, 180, 0.025, 0.3))
        .with_series("JP", synthetic_cpi(YearMonth::new(2008, 1)?, 144, 0.005, 0.1))
        .with_series("DE", synthetic_cpi(YearMonth::new(2010, 1)?, 120, 0.018, 0.0))
        .with_series("XX", synthetic_cpi(YearMonth::new(2022, 1)?, 18, 0.05, 0.0));

    let config = PipelineConfig::default()
        .with_horizon(12)
        .with_search(
            SearchConfig::default()
                .with_max_orders(3, 1, 3)
                .with_seasonal_orders(1, 1, 1)
                .with_strategy(SearchStrategy::Stepwise),
        );

    let ids: Vec<&str> = provider.ids().collect();
    let results = run_batch(&provider, &ids, &config);

    println!("\n{}", "=".repeat(60));
    println!("{:<6} {:<28} {:>10} {:>8}", "Series", "Model", "AICc", "LB p");
    println!("{}", "=".repeat(60));
    for (id, result) in &results {
        match result {
            Ok(r) => println!(
                "{:<6} {:<28} {:>10.2} {:>8.3}",
                id,
                r.order_label(),
                r.model.aicc(),
                r.residual_report.ljung_box_p_value()
            ),
            Err(e) => println!("{:<6} failed: {}", id, e),
        }
    }

    if let Some(Ok(us)) = results.get("US") {
        println!("\nUS forecast:");
        us.table.write_csv(std::io::stdout())?;
    }

    Ok(())
}
