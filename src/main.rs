use anyhow::{Context, Result};
use kestrel_curves::cli::CliOverrides;
use kestrel_curves::config::BenchConfig;
use kestrel_curves::harness::{run_benchmark, BenchReport};
use kestrel_curves::profiler::StageProfiler;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let cli = match CliOverrides::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            error!("[cli] {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run(cli) {
        error!("Benchmark error: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: CliOverrides) -> Result<()> {
    let mut config = match &cli.config_path {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::default(),
    };
    if !cli.overrides.is_empty() {
        info!("CLI overrides: {}", cli.overrides.applied_fields().join(", "));
    }
    config.apply_overrides(&cli.overrides);

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut profiler = StageProfiler::new();
    let outcome = run_benchmark(&config, &mut rng, &mut profiler).context("benchmark pass failed")?;

    for stage in profiler.summaries() {
        info!("[curve_bench] {:<24} {:>10.3} ms", stage.label, stage.last_ms);
    }
    for strategy in &outcome.strategies {
        info!(
            "[curve_bench] {:<12} rotations={} max_deviation={:e}",
            strategy.strategy.label(),
            strategy.rotations,
            strategy.max_deviation
        );
    }

    if let Some(path) = &cli.report_path {
        write_report(path, &BenchReport::new(&config, outcome, &profiler))?;
        info!("Report written to {}", path.display());
    }
    Ok(())
}

fn write_report(path: &Path, report: &BenchReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_vec_pretty(report).context("serializing benchmark report")?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}
