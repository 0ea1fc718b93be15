//! End-to-end accumulation and summary tests against closed forms.
//!
//! # Test Categories
//!
//! 1. **Closed forms**: lump sum `L·g^T`, recurring `c·(g^(T+1) − g)/(g − 1)`
//! 2. **Discounting**: identity at zero rates, exact one-year factor
//! 3. **Percentiles**: constant ensembles
//! 4. **Reproducibility**: seeds, thread counts, calendar aggregation

use approx::assert_relative_eq;
use corrsim_core::correlation::CorrelationStructure;
use corrsim_core::types::{month_windows, parse_date};
use corrsim_engine::accumulate::{
    run_accumulation, AccumulationConfig, ContributionSpec, GrowthSpec, PathEnsemble,
};
use corrsim_engine::aggregate::{reduce_along_time, Reduction, Window};
use corrsim_engine::batch::TimeBatch;
use corrsim_engine::copula::CopulaSampler;
use corrsim_engine::rng::SimRng;
use corrsim_engine::summary::{discount, percentiles, summarize, DiscountConfig, DiscountTiming};
use corrsim_engine::transform::{transform_time_batch, ColumnSpec};
use corrsim_models::marginals::{DriftScaling, Parametric, ZeroInflated};

const G: f64 = 1.0064;
const T: usize = 240;

fn constant_growth(paths: usize) -> GrowthSpec {
    GrowthSpec::Precomputed {
        factors: TimeBatch::filled(T, paths, G),
    }
}

fn run(growth: GrowthSpec, contribution: ContributionSpec, paths: usize) -> PathEnsemble {
    let config = AccumulationConfig::builder()
        .time_steps(T)
        .path_count(paths)
        .seed(42)
        .growth(growth)
        .contribution(contribution)
        .build()
        .unwrap();
    run_accumulation(config).unwrap()
}

// ============================================================================
// Closed Forms
// ============================================================================

#[test]
fn test_lump_sum_closed_form() {
    let ensemble = run(constant_growth(4), ContributionSpec::LumpSum { amount: 6.0 }, 4);

    let expected = 6.0 * G.powi(T as i32);
    for &b in ensemble.terminal() {
        assert_relative_eq!(b, expected, max_relative = 1e-12);
    }
    // Full history is retained.
    assert_eq!(ensemble.steps(), T);
    assert_relative_eq!(ensemble.balances().get(119, 0), 6.0 * G.powi(120), max_relative = 1e-12);
}

#[test]
fn test_lump_sum_from_annual_rate() {
    let growth = GrowthSpec::Deterministic {
        annual_rate: 0.08,
        periods_per_year: 12,
    };
    let ensemble = run(growth, ContributionSpec::LumpSum { amount: 6.0 }, 2);
    assert_relative_eq!(ensemble.terminal()[0], 6.0 * 1.08_f64.powi(20), max_relative = 1e-10);
}

#[test]
fn test_recurring_closed_form() {
    let c = 182.6;
    let ensemble = run(constant_growth(3), ContributionSpec::Recurring { amount: c }, 3);

    // Each contribution grows for the period it is made in.
    let expected = c * (G.powi(T as i32 + 1) - G) / (G - 1.0);
    for &b in ensemble.terminal() {
        assert_relative_eq!(b, expected, max_relative = 1e-10);
    }
}

#[test]
fn test_modes_share_stepping_primitive() {
    // A lump sum plus recurring contributions is the sum of the two runs.
    let lump = run(constant_growth(1), ContributionSpec::LumpSum { amount: 100.0 }, 1);
    let recurring = run(constant_growth(1), ContributionSpec::Recurring { amount: 10.0 }, 1);

    let mut amounts = vec![10.0; T];
    amounts[0] += 100.0;
    let combined = run(
        constant_growth(1),
        ContributionSpec::Precomputed {
            amounts: TimeBatch::from_vec(T, 1, amounts).unwrap(),
        },
        1,
    );

    assert_relative_eq!(
        combined.terminal()[0],
        lump.terminal()[0] + recurring.terminal()[0],
        max_relative = 1e-12
    );
}

// ============================================================================
// Discounting
// ============================================================================

#[test]
fn test_discount_identity() {
    let ensemble = run(constant_growth(5), ContributionSpec::Recurring { amount: 1.0 }, 5);
    let identity = DiscountConfig::monthly(0.0, 0.0).unwrap();
    assert_eq!(&discount(ensemble.balances(), &identity), ensemble.balances());
}

#[test]
fn test_present_value_of_lump_sum() {
    // Growing at the discount rate keeps the present value at its first step.
    let growth = GrowthSpec::Deterministic {
        annual_rate: 0.05,
        periods_per_year: 12,
    };
    let ensemble = run(growth, ContributionSpec::LumpSum { amount: 1_000.0 }, 10);
    let config = DiscountConfig::monthly(0.05, 0.0).unwrap();
    let table = summarize(&ensemble, &[5.0, 50.0, 95.0], Some(&config)).unwrap();

    // Step 0 is undiscounted and already holds one period of growth.
    let first = 1_000.0 * 1.05_f64.powf(1.0 / 12.0);
    let pv = table.present_value.unwrap();
    for t in 0..T {
        for &value in pv.row(t) {
            assert_relative_eq!(value, first, max_relative = 1e-10);
        }
    }
    assert_eq!(pv.row(0), table.nominal.row(0));
}

#[test]
fn test_present_value_of_lump_sum_end_of_period() {
    let growth = GrowthSpec::Deterministic {
        annual_rate: 0.05,
        periods_per_year: 12,
    };
    let ensemble = run(growth, ContributionSpec::LumpSum { amount: 1_000.0 }, 10);
    let config = DiscountConfig::monthly(0.05, 0.0)
        .unwrap()
        .with_timing(DiscountTiming::EndOfPeriod);
    let table = summarize(&ensemble, &[50.0], Some(&config)).unwrap();

    let pv = table.present_value.unwrap();
    for t in 0..T {
        assert_relative_eq!(pv.row(t)[0], 1_000.0, max_relative = 1e-10);
    }
}

// ============================================================================
// Percentiles
// ============================================================================

#[test]
fn test_constant_ensemble_percentiles() {
    let k = 42.5;
    let ensemble = PathEnsemble::new(TimeBatch::filled(12, 1_000, k), None);
    let levels = [0.0, 5.0, 25.0, 50.0, 75.0, 95.0, 100.0];

    let table = summarize(&ensemble, &levels, None).unwrap();
    for t in 0..12 {
        assert!(table.nominal.row(t).iter().all(|&v| v == k));
    }
    assert_eq!(percentiles(ensemble.terminal(), &levels).unwrap(), vec![k; 7]);
}

#[test]
fn test_stochastic_percentiles_ordered() {
    let growth = GrowthSpec::Stochastic {
        log_returns: Parametric::student_t(0.0004, 0.008, 4.0).unwrap().into(),
        days_per_period: 21.0,
        drift_scaling: DriftScaling::Linear,
    };
    let ensemble = run(growth, ContributionSpec::Recurring { amount: 182.6 }, 2_000);
    let table = summarize(&ensemble, &[5.0, 50.0, 95.0], None).unwrap();

    for t in 0..T {
        let row = table.nominal.row(t);
        assert!(row[0] <= row[1] && row[1] <= row[2]);
    }
    let terminal = table.nominal.terminal();
    assert!(terminal[0] < terminal[2]);
    assert!(terminal.iter().all(|v| v.is_finite() && *v > 0.0));
}

// ============================================================================
// Reproducibility
// ============================================================================

#[test]
fn test_same_seed_same_ensemble_any_thread_count() {
    let growth = || GrowthSpec::Stochastic {
        log_returns: Parametric::normal(0.0003, 0.01).unwrap().into(),
        days_per_period: 21.0,
        drift_scaling: DriftScaling::SquareRoot,
    };
    let contribution = || ContributionSpec::Sampled {
        marginal: Parametric::uniform(50.0, 150.0).unwrap().into(),
    };

    let parallel = run(growth(), contribution(), 5_000);
    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| run(growth(), contribution(), 5_000));

    assert_eq!(parallel, single);
}

#[test]
fn test_daily_gated_expenses_feed_monthly_contributions() {
    // One gated daily expense per path, correlated with nothing else.
    let start = parse_date("2024-01-01").unwrap();
    let windows = month_windows(start, 12).unwrap();
    let days: usize = windows.iter().sum();
    assert_eq!(days, 366);

    let structure = CorrelationStructure::identity(2).unwrap();
    let mut rng = SimRng::from_seed(8);
    let uniforms = CopulaSampler::new(&structure).sample_time_batch(days, 500, &mut rng);

    let expense = ZeroInflated::new(0.9, Parametric::log_normal(2.0, 0.5).unwrap().into()).unwrap();
    let daily = transform_time_batch(&uniforms, &[ColumnSpec::gated(0, 1, expense)])
        .unwrap()
        .column(0)
        .unwrap();
    let monthly = reduce_along_time(&daily, &Window::Lengths(windows), Reduction::Sum).unwrap();
    assert_eq!(monthly.steps(), 12);

    let outflow = monthly.map_with_step(|_, v| -v);
    let config = AccumulationConfig::builder()
        .time_steps(12)
        .path_count(500)
        .seed(1)
        .growth(GrowthSpec::Deterministic {
            annual_rate: 0.0,
            periods_per_year: 12,
        })
        .contribution(ContributionSpec::Precomputed { amounts: outflow })
        .build()
        .unwrap();
    let ensemble = run_accumulation(config).unwrap();

    // With zero growth the terminal balance is minus the year's total spend.
    let total: f64 = daily.as_slice().iter().sum();
    let terminal: f64 = ensemble.terminal().iter().sum();
    assert_relative_eq!(terminal, -total, max_relative = 1e-9);
}
