//! Simulate command implementation
//!
//! Runs a forecast with both runners and prints the comparison.

use std::io::Write;

use tracing::info;

use forecast_engine::{
    PortfolioAllocation, PortfolioForecaster, SimulationRequest, SimulationResponse,
    SimulationResult,
};

use crate::config::{CliConfig, OutputFormat};
use crate::history;
use crate::Result;

/// Parses a `TICKER=WEIGHT` holding.
pub fn parse_stock(value: &str) -> std::result::Result<(String, f64), String> {
    let (ticker, weight) = value
        .split_once('=')
        .ok_or_else(|| format!("expected TICKER=WEIGHT, got {:?}", value))?;
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(format!("missing ticker in {:?}", value));
    }
    let weight: f64 = weight
        .trim()
        .parse()
        .map_err(|_| format!("invalid weight in {:?}", value))?;
    Ok((ticker.to_uppercase(), weight))
}

/// Inputs of one simulation
#[derive(Debug, Clone)]
pub struct SimulateArgs {
    pub capital: f64,
    pub stocks: Vec<(String, f64)>,
    pub days: usize,
    pub simulations: usize,
}

/// Run the simulate command
pub fn run(args: &SimulateArgs, config: &CliConfig) -> Result<()> {
    let allocation = PortfolioAllocation::new(
        args.stocks
            .iter()
            .map(|(ticker, weight)| (ticker.as_str(), *weight)),
    )?;
    let request = SimulationRequest::new(args.capital, allocation, args.days, args.simulations)?;

    info!(
        capital = request.initial_capital(),
        allocation = %request.allocation(),
        days = request.days_to_predict(),
        simulations = request.num_simulations(),
        "Starting simulation"
    );

    let market = history::market_model(
        config.history_dir.as_deref(),
        request.allocation(),
        config.default_distribution()?,
    )?;
    let forecaster = PortfolioForecaster::new(config.engine_config()?)?;
    let result = forecaster.forecast(&request, &market)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render(&result, config.format, &mut out)?;
    out.flush()?;

    info!("Simulation complete");
    Ok(())
}

/// Writes `result` in `format`.
pub fn render<W: Write>(result: &SimulationResult, format: OutputFormat, out: &mut W) -> Result<()> {
    match format {
        OutputFormat::Table => render_table(result, out),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &SimulationResponse::from(result))?;
            writeln!(out)?;
            Ok(())
        }
        OutputFormat::Csv => render_csv(result, out),
    }
}

fn render_table<W: Write>(result: &SimulationResult, out: &mut W) -> Result<()> {
    let rows = [
        ("Sequential", result.sequential()),
        ("Parallel", result.parallel()),
    ];

    writeln!(out, "┌────────────┬──────────────────┬──────────────────┬────────────┬─────────┐")?;
    writeln!(out, "│ Runner     │ Mean             │ Std Dev          │ Time (ms)  │ Workers │")?;
    writeln!(out, "├────────────┼──────────────────┼──────────────────┼────────────┼─────────┤")?;
    for (name, stats) in rows {
        writeln!(
            out,
            "│ {:<10} │ {:>16.2} │ {:>16.2} │ {:>10.3} │ {:>7} │",
            name,
            stats.mean(),
            stats.std_dev(),
            stats.execution_time_ms(),
            stats.workers()
        )?;
    }
    writeln!(out, "└────────────┴──────────────────┴──────────────────┴────────────┴─────────┘")?;

    let comparison = result.comparison();
    match comparison.speedup {
        Some(speedup) => writeln!(
            out,
            "Speedup: {:.2}x ({:.1}% faster)",
            speedup, comparison.improvement_pct
        )?,
        None => writeln!(out, "Speedup: n/a")?,
    }
    writeln!(out, "Trajectories returned: {}", result.trajectories().len())?;
    Ok(())
}

fn render_csv<W: Write>(result: &SimulationResult, out: &mut W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    let days = result.trajectories().first().map_or(0, |t| t.len());
    let mut header = vec!["trajectory".to_string()];
    header.extend((0..days).map(|day| format!("day_{}", day)));
    writer.write_record(&header)?;

    for (idx, trajectory) in result.trajectories().iter().enumerate() {
        let mut row = vec![idx.to_string()];
        row.extend(trajectory.values().iter().map(|v| format!("{:.2}", v)));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}
