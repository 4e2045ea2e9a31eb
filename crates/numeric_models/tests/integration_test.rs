//! Integration tests for distributions across precisions, threads and settings.

use approx::assert_relative_eq;
use infra_config::Settings;
use numeric_core::prelude::*;
use numeric_models::prelude::*;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_extreme_shape_quantile_at_128_digits() {
    init_tracing();
    let ctx = MathContext::new(128, RoundingMode::HalfEven).unwrap();
    let dist = GammaDistribution::with_context(dec("0.000841625"), dec("173.0983576"), &ctx).unwrap();
    let confidence = dec("0.999");

    let q = dist.quantile(&ctx, &confidence).unwrap();
    let expected = dec(
        "36.112458958589812603364605615477228990810959308984329693019681278755457126729831",
    );
    assert!(
        (&q - &expected).abs() < Decimal::new(1, -70),
        "quantile {} differs from {}",
        q,
        expected
    );

    let back = dist.cdf(&ctx, &q).unwrap();
    assert!((&back - &confidence).abs() < Decimal::new(1, -120));
}

#[test]
fn test_extreme_shape_moments_and_logs() {
    let dist = GammaDistribution::new(dec("0.000841625"), dec("173.0983576")).unwrap();
    let ctx = MathContext::DECIMAL64;
    assert_eq!(dist.mean(&ctx).unwrap(), dec("0.1456839052151"));
    assert_eq!(dist.variance(&ctx).unwrap(), dec("25.21764472148788"));
    assert_relative_eq!(
        dist.ln_gamma_alpha().to_f64(),
        7.079_690_794_306_369,
        max_relative = 1e-14
    );
}

#[test]
fn test_cdf_is_monotone_across_magnitudes() {
    let dist = GammaDistribution::new(dec("0.000841625"), dec("173.0983576")).unwrap();
    let ctx = MathContext::working(30);
    let mut previous = Decimal::zero();
    for exponent in -12..=3 {
        let x = Decimal::new(1, exponent);
        let p = dist.cdf(&ctx, &x).unwrap();
        assert!(p >= previous, "cdf({}) = {} fell below {}", x, p, previous);
        assert!(p <= Decimal::one());
        previous = p;
    }
}

#[test]
fn test_quantile_round_trips_through_cdf() {
    let ctx = MathContext::working(25);
    let tolerance = Decimal::new(1, -22);
    let gamma = GammaDistribution::new(dec("4.5"), dec("0.75")).unwrap();
    let normal = NormalDistribution::new(dec("-2"), dec("3.5")).unwrap();
    for c in ["0.001", "0.1", "0.5", "0.9", "0.999"] {
        let c = dec(c);
        let x = gamma.quantile(&ctx, &c).unwrap();
        assert!((&gamma.cdf(&ctx, &x).unwrap() - &c).abs() < tolerance);
        let x = normal.quantile(&ctx, &c).unwrap();
        assert!((&normal.cdf(&ctx, &x).unwrap() - &c).abs() < tolerance);
    }
}

#[test]
fn test_boundaries() {
    let ctx = MathContext::DECIMAL64;
    let dist = GammaDistribution::new(Decimal::from(2), Decimal::from(3)).unwrap();
    assert!(dist.cdf(&ctx, &Decimal::zero()).unwrap().is_zero());
    assert!(dist.pdf(&ctx, &Decimal::zero()).unwrap().is_zero());
    assert!(dist.pdf(&ctx, &dec("-1")).unwrap().is_zero());
    assert!(dist.quantile(&ctx, &Decimal::zero()).unwrap().is_zero());
    assert_eq!(dist.cdf(&ctx, &Decimal::from(1000)).unwrap(), Decimal::one());

    let normal = NormalDistribution::standard();
    assert_eq!(normal.cdf(&ctx, &Decimal::from(50)).unwrap(), Decimal::one());
    assert!(normal.cdf(&ctx, &Decimal::from(-50)).unwrap().is_positive());
}

#[test]
fn test_exhausted_budget_reports_failure() {
    let dist = GammaDistribution::new(Decimal::from(2), Decimal::from(3))
        .unwrap()
        .with_config(QuantileConfig {
            max_iterations: 3,
            warmup_iterations: 3,
            warmup_digits: None,
            max_expansions: 64,
        });
    let result = dist.quantile(&MathContext::working(40), &dec("0.5"));
    assert!(matches!(result, Err(DistributionError::Approximation(_))));
}

#[test]
fn test_shared_across_threads() {
    init_tracing();
    let dist = GammaDistribution::new(Decimal::from(2), Decimal::from(3)).unwrap();
    let ctx = MathContext::working(20);
    let expected = dist.quantile(&ctx, &dec("0.99")).unwrap();

    let results: Vec<Decimal> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| dist.quantile(&ctx, &dec("0.99")).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for result in results {
        assert_eq!(result, expected);
    }
    assert!((&expected - &dec("19.915056203981436808")).abs() <= Decimal::new(1, -17));
}

#[test]
fn test_defaults_from_settings() {
    let settings = Settings::from_toml(
        r#"
        [precision]
        digits = 20
        rounding = "HALF_UP"

        [approximation]
        max_iterations = 800
        "#,
    )
    .unwrap();
    let defaults = EngineDefaults::from_settings(&settings).unwrap();
    assert_eq!(defaults.context.precision(), 20);
    assert_eq!(defaults.quantile.max_iterations, 800);

    let dist = NormalDistribution::standard().with_config(defaults.quantile);
    let z = dist.quantile(&defaults.context, &dec("0.975")).unwrap();
    assert!((&z - &dec("1.9599639845400542355")).abs() <= Decimal::new(1, -18));
}
