//! End-to-end properties of the forecasting engine.

use std::collections::VecDeque;

use approx::assert_relative_eq;
use forecast_engine::mc::{
    partition_trials, value_portfolio, ParallelRunner, PricePath, SequentialRunner,
    SimulationRunner, TrialKernel,
};
use forecast_engine::model::{
    MarketModel, PortfolioAllocation, RawSimulationRequest, ReturnDistribution, SimulationRequest,
};
use forecast_engine::rng::{RandomSource, SeedSource};
use forecast_engine::stats::summarize_values;
use forecast_engine::{EngineConfig, EngineError, PortfolioForecaster};

/// Replays fixed uniform draws; normals are always zero.
struct Scripted {
    uniforms: VecDeque<f64>,
}

impl Scripted {
    fn new(uniforms: &[f64]) -> Self {
        Self {
            uniforms: uniforms.iter().copied().collect(),
        }
    }
}

impl RandomSource for Scripted {
    fn uniform(&mut self) -> f64 {
        self.uniforms.pop_front().unwrap_or(0.0)
    }

    fn standard_normal(&mut self) -> f64 {
        0.0
    }
}

fn sixty_forty() -> PortfolioAllocation {
    PortfolioAllocation::new([("A", 60.0), ("B", 40.0)]).unwrap()
}

// ============================================================================
// Batch shape
// ============================================================================

#[test]
fn test_both_runners_produce_full_batches() {
    let request = SimulationRequest::new(10_000.0, sixty_forty(), 30, 257).unwrap();
    let market = MarketModel::default();
    let seeds = SeedSource::new(1);

    let runners: [Box<dyn SimulationRunner>; 2] = [
        Box::new(SequentialRunner),
        Box::new(ParallelRunner::new(4).unwrap()),
    ];
    for runner in &runners {
        let batch = runner.run(&request, &market, &seeds).unwrap();
        assert_eq!(batch.len(), 257, "{}", runner.name());
        for trajectory in batch.trajectories() {
            assert_eq!(trajectory.len(), 31);
            assert_eq!(trajectory.initial_value(), Some(10_000.0));
            assert!(trajectory.values().iter().all(|v| v.is_finite() && *v > 0.0));
        }
    }
}

// ============================================================================
// Valuation formula
// ============================================================================

#[test]
fn test_sixty_forty_single_day_valuation() {
    // Uniform on [0, 1) returns the scripted draw unchanged.
    let request = SimulationRequest::new(10_000.0, sixty_forty(), 1, 1).unwrap();
    let market = MarketModel::new(ReturnDistribution::uniform(0.0, 1.0).unwrap());
    let kernel = TrialKernel::new(&request, &market).unwrap();

    let batch = kernel.run_trials(1, &mut Scripted::new(&[0.10, 0.05])).unwrap();
    let trajectory = &batch.trajectories()[0];

    assert_eq!(trajectory.len(), 2);
    assert_eq!(trajectory[0], 10_000.0);
    assert_relative_eq!(
        trajectory[1],
        10_000.0 * 0.6 * 1.10 + 10_000.0 * 0.4 * 1.05,
        epsilon = 1e-9
    );
}

#[test]
fn test_holdings_compound_independently() {
    let allocation = sixty_forty();
    let paths = [
        PricePath::new("A", vec![0.10, 0.10]).unwrap(),
        PricePath::new("B", vec![-0.50, 1.00]).unwrap(),
    ];
    let trajectory = value_portfolio(10_000.0, &allocation, &paths).unwrap();

    // No rebalancing: B halves then doubles back to its initial 4000.
    assert_relative_eq!(trajectory[1], 6_600.0 + 2_000.0, epsilon = 1e-9);
    assert_relative_eq!(trajectory[2], 7_260.0 + 4_000.0, epsilon = 1e-9);
}

#[test]
fn test_zero_volatility_is_deterministic() {
    let drift: f64 = 0.001;
    let request = SimulationRequest::new(1_000.0, sixty_forty(), 10, 5).unwrap();
    let market = MarketModel::new(ReturnDistribution::log_normal(drift, 0.0).unwrap());

    let batch = SequentialRunner
        .run(&request, &market, &SeedSource::new(9))
        .unwrap();
    let expected = 1_000.0 * (drift * 10.0).exp();
    for value in batch.final_values() {
        assert_relative_eq!(value, expected, max_relative = 1e-12);
    }
}

// ============================================================================
// Validation before any trial
// ============================================================================

fn raw(capital: f64, days: usize, n: usize) -> RawSimulationRequest {
    RawSimulationRequest {
        initial_capital: capital,
        stock_weights: [("AAPL".to_string(), 100.0)].into_iter().collect(),
        days_to_predict: days,
        num_simulations: n,
    }
}

#[test]
fn test_invalid_requests_are_rejected() {
    let cases = [
        (raw(10_000.0, 30, 0), "num_simulations"),
        (raw(10_000.0, 0, 100), "days_to_predict"),
        (raw(0.0, 30, 100), "initial_capital"),
        (raw(-100.0, 30, 100), "initial_capital"),
    ];
    for (raw, field) in cases {
        match SimulationRequest::try_from(raw) {
            Err(EngineError::InvalidParameter { name, .. }) => assert_eq!(name, field),
            other => panic!("expected InvalidParameter for {}, got {:?}", field, other),
        }
    }
}

#[test]
fn test_invalid_allocation_is_rejected() {
    let mut bad = raw(10_000.0, 30, 100);
    bad.stock_weights.clear();
    assert!(matches!(
        SimulationRequest::try_from(bad),
        Err(EngineError::InvalidParameter { .. })
    ));
}

#[test]
fn test_runners_draw_no_seed_for_invalid_market() {
    let request = SimulationRequest::new(10_000.0, sixty_forty(), 5, 10).unwrap();
    let market = MarketModel::new(ReturnDistribution::LogNormal {
        drift: 0.0,
        volatility: -0.1,
    });
    let seeds = SeedSource::new(0);

    assert!(SequentialRunner.run(&request, &market, &seeds).is_err());
    assert!(ParallelRunner::new(2)
        .unwrap()
        .run(&request, &market, &seeds)
        .is_err());
    assert_eq!(seeds.issued(), 0);
}

// ============================================================================
// Partitioning and statistics
// ============================================================================

#[test]
fn test_seven_trials_over_four_workers() {
    let ranges = partition_trials(7, 4);
    let mut indices: Vec<usize> = ranges.into_iter().flatten().collect();
    indices.sort_unstable();
    assert_eq!(indices, (0..7).collect::<Vec<_>>());
}

#[test]
fn test_reference_statistics() {
    let s = summarize_values([100.0, 200.0, 300.0]).unwrap();
    assert_relative_eq!(s.mean, 200.0);
    assert_relative_eq!(s.std_dev, 100.0);
}

// ============================================================================
// Facade
// ============================================================================

#[test]
fn test_forecast_caps_display_and_reports_times() {
    let config = EngineConfig::builder()
        .workers(4)
        .display_limit(30)
        .seed(12)
        .build()
        .unwrap();
    let forecaster = PortfolioForecaster::new(config).unwrap();
    let request = SimulationRequest::new(10_000.0, sixty_forty(), 30, 1_000).unwrap();

    let result = forecaster
        .forecast(&request, &forecaster.default_market())
        .unwrap();

    assert_eq!(result.trajectories().len(), 30);
    assert!(result.trajectories().iter().all(|t| t.len() == 31));
    assert!(result.sequential_execution_time_ms() >= 0.0);
    assert!(result.parallel_execution_time_ms() >= 0.0);
    assert!(result.sequential_std_dev() > 0.0);
    assert!(result.parallel_std_dev() > 0.0);
    assert_eq!(result.parallel().workers(), 4);
}

#[test]
fn test_forecast_with_fewer_trials_than_display_limit() {
    let config = EngineConfig::builder().workers(2).seed(5).build().unwrap();
    let forecaster = PortfolioForecaster::new(config).unwrap();
    let request = SimulationRequest::new(500.0, sixty_forty(), 3, 1).unwrap();

    let result = forecaster
        .forecast(&request, &forecaster.default_market())
        .unwrap();

    assert_eq!(result.trajectories().len(), 1);
    assert_eq!(result.sequential_std_dev(), 0.0);
    assert_eq!(result.parallel().workers(), 1);
}

#[cfg(feature = "serde")]
#[test]
fn test_response_uses_client_field_names() {
    use forecast_engine::SimulationResponse;

    let config = EngineConfig::builder().workers(2).seed(5).build().unwrap();
    let forecaster = PortfolioForecaster::new(config).unwrap();
    let request: SimulationRequest = serde_json::from_str(
        r#"{"initialCapital":1000.0,"stockWeights":{"AAPL":60.0,"MSFT":40.0},"daysToPredict":5,"numSimulations":40}"#,
    )
    .unwrap();

    let result = forecaster
        .forecast(&request, &forecaster.default_market())
        .unwrap();
    let json = serde_json::to_value(SimulationResponse::from(&result)).unwrap();

    for key in [
        "sequentialMean",
        "sequentialStdDev",
        "sequentialExecutionTime",
        "parallelMean",
        "parallelStdDev",
        "parallelExecutionTime",
        "allSimulations",
    ] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(json["allSimulations"].as_array().unwrap().len(), 30);
}
