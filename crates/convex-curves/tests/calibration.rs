//! Integration tests: multi-block calibration, bundles and builder caching.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use approx::assert_relative_eq;
use convex_core::prelude::*;
use convex_curves::bundle::BuildingBlockBundle;
use convex_curves::prelude::*;
use convex_curves::repository::{
    CalibrationBlock, CalibrationRepository, MulticurveBuildingRepository,
};
use convex_math::interpolation::{InterpolationMethod, InterpolatorSpec};
use convex_math::solvers::RootFinderMethod;

use common::{LIBOR, OIS};

/// Delegates to the default repository and counts block calibrations.
#[derive(Debug, Default)]
struct CountingRepository {
    calls: AtomicUsize,
}

impl CountingRepository {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CalibrationRepository for CountingRepository {
    fn calibrate_block(
        &self,
        block: &CalibrationBlock,
        known: &ParameterProvider,
        known_bundle: &BuildingBlockBundle,
        quote: &dyn ParSpreadCalculator,
        sensitivity: &dyn ParSpreadSensitivityCalculator,
        config: &CalibrationConfig,
    ) -> CurveResult<(ParameterProvider, BuildingBlockBundle)> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        MulticurveBuildingRepository.calibrate_block(
            block,
            known,
            known_bundle,
            quote,
            sensitivity,
            config,
        )
    }
}

/// A copy of `setup` with the quote of node `label` on `curve` moved by `shift`.
fn with_shifted_quote(
    setup: &DiscountingSetup,
    curve: &str,
    label: &str,
    shift: f64,
) -> DiscountingSetup {
    let mut shifted = setup.copy();
    let nodes = setup.nodes()[curve].clone();
    shifted.remove_nodes(curve);
    for node in nodes {
        let mut definition = node.definition;
        if node.label == label {
            match &mut definition {
                InstrumentDefinition::Deposit(d) => d.rate += shift,
                InstrumentDefinition::Fra(f) => f.rate += shift,
                InstrumentDefinition::Swap(s) => s.fixed_rate += shift,
                other => panic!("no rate to shift on {other:?}"),
            }
        }
        shifted.with_node(curve, definition, node.label).unwrap();
    }
    shifted
}

fn parameters(curves: &CalibratedCurves, name: &str) -> Vec<f64> {
    curves.provider().curve(name).unwrap().parameters().to_vec()
}

#[test]
fn test_ois_curve_reprices_its_nodes() {
    let valuation = common::valuation();
    let builder = common::ois_setup(valuation).get_builder().unwrap();
    let curves = builder.build_curves(valuation, &FixingSet::new()).unwrap();

    common::assert_nodes_reprice(&builder, &curves, &MarketQuoteCalculator::default(), valuation);

    let ois = curves.provider().discounting_curve(Currency::USD).unwrap();
    assert_eq!(ois.name(), OIS);
    assert!(Arc::ptr_eq(
        ois,
        curves.provider().overnight_curve(&common::sofr()).unwrap()
    ));
    assert_eq!(ois.number_of_parameters(), 3);
    let entry = curves.bundle().get(OIS).unwrap();
    assert_eq!(entry.matrix().shape(), (3, 3));
}

#[test]
fn test_deposit_and_one_year_ois_curve() {
    let valuation = common::valuation();
    let mut setup = DiscountingSetup::new();
    setup.building([OIS]).unwrap();
    setup
        .using(OIS)
        .unwrap()
        .for_discounting(Currency::USD)
        .unwrap()
        .for_overnight_index([common::sofr()])
        .with_interpolator(common::monotone_cubic())
        .unwrap();
    setup
        .with_node(OIS, common::deposit(valuation, 2, 0.015), "2D")
        .unwrap()
        .with_node(OIS, common::ois(valuation, 1, 0.018), "1Y")
        .unwrap();
    let builder = setup.get_builder().unwrap();
    let curves = builder.build_curves(valuation, &FixingSet::new()).unwrap();

    common::assert_nodes_reprice(&builder, &curves, &MarketQuoteCalculator::default(), valuation);
    let curve = curves.provider().discounting_curve(Currency::USD).unwrap();
    assert_eq!(curve.number_of_parameters(), 2);
    let one_year = curve.discount_factor(1.0).unwrap();
    assert!(one_year < 1.0 && one_year > 0.97);
    assert_eq!(curves.bundle().get(OIS).unwrap().matrix().shape(), (2, 2));
}

#[test]
fn test_two_block_build_reprices_every_node() {
    let valuation = common::valuation();
    let builder = common::two_block_setup(valuation).get_builder().unwrap();
    let curves = builder.build_curves(valuation, &FixingSet::new()).unwrap();

    common::assert_nodes_reprice(&builder, &curves, &MarketQuoteCalculator::default(), valuation);
    let libor = curves.provider().ibor_curve(&common::libor_3m()).unwrap();
    assert_eq!(libor.name(), LIBOR);
    assert_eq!(libor.spread_base(), Some(OIS));
}

#[test]
fn test_first_block_is_independent_of_later_blocks() {
    let valuation = common::valuation();
    let alone = common::ois_setup(valuation)
        .get_builder()
        .unwrap()
        .build_curves(valuation, &FixingSet::new())
        .unwrap();
    let both = common::two_block_setup(valuation)
        .get_builder()
        .unwrap()
        .build_curves(valuation, &FixingSet::new())
        .unwrap();

    assert_eq!(parameters(&alone, OIS), parameters(&both, OIS));
    assert_eq!(
        alone.bundle().get(OIS).unwrap().matrix(),
        both.bundle().get(OIS).unwrap().matrix()
    );
}

#[test]
fn test_spread_curve_adds_its_parameters_to_the_base() {
    let valuation = common::valuation();
    let builder = common::two_block_setup(valuation).get_builder().unwrap();
    let curves = builder.build_curves(valuation, &FixingSet::new()).unwrap();

    let ois = curves.provider().curve(OIS).unwrap();
    let libor = curves.provider().curve(LIBOR).unwrap();
    assert_eq!(libor.node_times().len(), 3);
    for (t, spread) in libor.node_times().iter().zip(libor.parameters()) {
        assert_relative_eq!(
            libor.zero_rate(*t).unwrap(),
            ois.zero_rate(*t).unwrap() + spread,
            epsilon = 1e-14
        );
    }
}

#[test]
fn test_bundle_layout_chains_earlier_blocks() {
    let valuation = common::valuation();
    let builder = common::two_block_setup(valuation).get_builder().unwrap();
    let curves = builder.build_curves(valuation, &FixingSet::new()).unwrap();
    let bundle = curves.bundle();

    assert_eq!(bundle.curve_names().collect::<Vec<_>>(), vec![LIBOR, OIS]);
    let ois = bundle.get(OIS).unwrap();
    assert_eq!(ois.block().curves().collect::<Vec<_>>(), vec![(OIS, 0, 3)]);

    let libor = bundle.get(LIBOR).unwrap();
    assert_eq!(
        libor.block().curves().collect::<Vec<_>>(),
        vec![(OIS, 0, 3), (LIBOR, 3, 3)]
    );
    assert_eq!(libor.matrix().shape(), (3, 6));
}

#[test]
fn test_bundle_matches_finite_differences() {
    let valuation = common::valuation();
    let setup = common::two_block_setup(valuation);
    let base = setup
        .get_builder()
        .unwrap()
        .build_curves(valuation, &FixingSet::new())
        .unwrap();
    let shift = 1e-5;

    // Column 1 is the OIS 1Y quote, column 4 the LIBOR 1Y quote.
    for (curve, label, column) in [(OIS, "1Y", 1), (LIBOR, "1Y", 4)] {
        let bumped = with_shifted_quote(&setup, curve, label, shift)
            .get_builder()
            .unwrap()
            .build_curves(valuation, &FixingSet::new())
            .unwrap();
        for name in [OIS, LIBOR] {
            let entry = base.bundle().get(name).unwrap();
            let before = parameters(&base, name);
            let after = parameters(&bumped, name);
            for row in 0..3 {
                let expected = if name == OIS && column >= 3 {
                    0.0
                } else {
                    entry.matrix()[(row, column)]
                };
                let observed = (after[row] - before[row]) / shift;
                assert!(
                    (observed - expected).abs() < 1e-3,
                    "∂{name}[{row}]/∂quote[{column}]: {observed} vs {expected}"
                );
            }
        }
    }
}

#[test]
fn test_builder_caches_by_valuation_date() {
    let valuation = common::valuation();
    let repository = Arc::new(CountingRepository::default());
    let builder = common::ois_setup(valuation)
        .get_builder_with_repository(Arc::clone(&repository) as Arc<dyn CalibrationRepository>)
        .unwrap();
    assert!(builder.cached(valuation).is_none());

    let first = builder.build_curves(valuation, &FixingSet::new()).unwrap();
    let second = builder.build_curves(valuation, &FixingSet::new()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(repository.calls(), 1);
    assert!(Arc::ptr_eq(&first, &builder.cached(valuation).unwrap()));

    let next_day = valuation.add_days(1);
    builder.build_curves(next_day, &FixingSet::new()).unwrap();
    assert_eq!(repository.calls(), 2);

    builder.invalidate_cache();
    assert!(builder.cached(valuation).is_none());
    let third = builder.build_curves(valuation, &FixingSet::new()).unwrap();
    assert_eq!(repository.calls(), 3);
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(parameters(&first, OIS), parameters(&third, OIS));
}

#[test]
fn test_concurrent_builds_calibrate_once() {
    let valuation = common::valuation();
    let repository = Arc::new(CountingRepository::default());
    let builder = common::ois_setup(valuation)
        .get_builder_with_repository(Arc::clone(&repository) as Arc<dyn CalibrationRepository>)
        .unwrap();

    let results: Vec<Arc<CalibratedCurves>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| builder.build_curves(valuation, &FixingSet::new()).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(repository.calls(), 1);
    for curves in &results[1..] {
        assert!(Arc::ptr_eq(&results[0], curves));
    }
}

#[test]
fn test_definitions_for_curves_is_pure() {
    let valuation = common::valuation();
    let builder = common::two_block_setup(valuation).get_builder().unwrap();
    let curves = builder.build_curves(valuation, &FixingSet::new()).unwrap();

    let later = valuation.add_days(400);
    let definitions = builder.definitions_for_curves(later);
    assert_eq!(definitions, builder.definitions_for_curves(valuation));
    for (curve, nodes) in builder.nodes() {
        let expected: Vec<_> = nodes.iter().map(|node| node.definition.clone()).collect();
        assert_eq!(definitions[curve], expected);
    }

    assert!(Arc::ptr_eq(&curves, &builder.cached(valuation).unwrap()));
    assert!(builder.cached(later).is_none());
}

#[test]
fn test_non_convergence_is_a_calibration_error_and_not_cached() {
    let valuation = common::valuation();
    let mut setup = common::ois_setup(valuation);
    setup
        .root_finding_maximum_steps(1)
        .root_finding_absolute_tolerance(0.0)
        .root_finding_relative_tolerance(0.0);
    let builder = setup.get_builder().unwrap();

    let error = builder.build_curves(valuation, &FixingSet::new()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Calibration);
    assert!(matches!(error, CurveError::CalibrationFailure { .. }));
    assert!(builder.cached(valuation).is_none());
}

#[test]
fn test_broyden_calibrates_the_same_curve() {
    let valuation = common::valuation();
    let newton = common::two_block_setup(valuation)
        .get_builder()
        .unwrap()
        .build_curves(valuation, &FixingSet::new())
        .unwrap();

    let mut setup = common::two_block_setup(valuation);
    setup.root_finding_method(RootFinderMethod::Broyden);
    let builder = setup.get_builder().unwrap();
    let broyden = builder.build_curves(valuation, &FixingSet::new()).unwrap();

    common::assert_nodes_reprice(&builder, &broyden, &MarketQuoteCalculator::default(), valuation);
    for name in [OIS, LIBOR] {
        for (a, b) in parameters(&newton, name).iter().zip(parameters(&broyden, name)) {
            assert_relative_eq!(*a, b, epsilon = 1e-8);
        }
    }
}

#[test]
fn test_known_curve_and_bundle_feed_later_setups() {
    let valuation = common::valuation();
    let ois_curves = common::ois_setup(valuation)
        .get_builder()
        .unwrap()
        .build_curves(valuation, &FixingSet::new())
        .unwrap();

    let mut setup = DiscountingSetup::new();
    setup
        .building([LIBOR])
        .unwrap()
        .with_known_data(ois_curves.provider())
        .with_known_bundle(ois_curves.bundle());
    setup
        .using(LIBOR)
        .unwrap()
        .for_index([common::libor_3m()])
        .unwrap()
        .with_interpolator(common::linear())
        .unwrap()
        .as_spread_over(OIS)
        .unwrap();
    let full = common::two_block_setup(valuation);
    for node in &full.nodes()[LIBOR] {
        setup
            .with_node(LIBOR, node.definition.clone(), node.label.clone())
            .unwrap();
    }
    let curves = setup
        .get_builder()
        .unwrap()
        .build_curves(valuation, &FixingSet::new())
        .unwrap();

    let reference = full
        .get_builder()
        .unwrap()
        .build_curves(valuation, &FixingSet::new())
        .unwrap();
    assert_eq!(parameters(&curves, LIBOR), parameters(&reference, LIBOR));
    assert_eq!(
        curves.bundle().get(LIBOR).unwrap().matrix(),
        reference.bundle().get(LIBOR).unwrap().matrix()
    );
}

#[test]
fn test_setup_rejects_inconsistent_configuration() {
    let valuation = common::valuation();

    let mut setup = common::ois_setup(valuation);
    let error = setup.building([LIBOR]).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Configuration);

    let mut setup = DiscountingSetup::new();
    assert!(setup.then_building([OIS]).is_err());

    let mut setup = common::ois_setup(valuation);
    setup.with_node(LIBOR, common::libor_swap(valuation, 1, 0.02), "1Y").unwrap();
    assert_eq!(
        setup.get_builder().unwrap_err().kind(),
        ErrorKind::Configuration
    );

    let mut setup = common::ois_setup(valuation);
    setup.remove_nodes(OIS);
    assert_eq!(
        setup.get_builder().unwrap_err().kind(),
        ErrorKind::Configuration
    );
}

#[test]
fn test_copied_setup_is_independent() {
    let valuation = common::valuation();
    let original = common::ois_setup(valuation);
    let mut copy = original.copy();
    copy.with_node(OIS, common::ois(valuation, 3, 0.021), "3Y").unwrap();
    copy.root_finding_maximum_steps(7);

    assert_eq!(original.nodes()[OIS].len(), 3);
    assert_eq!(copy.nodes()[OIS].len(), 4);
    assert_ne!(original.calibration_config().maximum_steps, 7);
}

#[test]
fn test_interpolation_on_discount_factors_and_periodic_yields() {
    let valuation = common::valuation();
    let reference = common::ois_setup(valuation)
        .get_builder()
        .unwrap()
        .build_curves(valuation, &FixingSet::new())
        .unwrap();
    let reference_curve = reference.provider().curve(OIS).unwrap();

    for periodic in [false, true] {
        let mut setup = DiscountingSetup::new();
        setup.building([OIS]).unwrap();
        let config = setup
            .using(OIS)
            .unwrap()
            .for_discounting(Currency::USD)
            .unwrap()
            .for_overnight_index([common::sofr()]);
        if periodic {
            config
                .with_interpolator(common::linear())
                .unwrap()
                .periodic_interpolation_on_yield(2)
                .unwrap();
        } else {
            config
                .with_interpolator(InterpolatorSpec::new(InterpolationMethod::LogLinear))
                .unwrap()
                .continuous_interpolation_on_discount_factors()
                .unwrap();
        }
        for node in &common::ois_setup(valuation).nodes()[OIS] {
            setup
                .with_node(OIS, node.definition.clone(), node.label.clone())
                .unwrap();
        }
        let builder = setup.get_builder().unwrap();
        let curves = builder.build_curves(valuation, &FixingSet::new()).unwrap();
        common::assert_nodes_reprice(&builder, &curves, &MarketQuoteCalculator::default(), valuation);

        // Both shapes interpolate through the same node discount factors.
        let curve = curves.provider().curve(OIS).unwrap();
        for t in reference_curve.node_times() {
            assert_relative_eq!(
                curve.discount_factor(*t).unwrap(),
                reference_curve.discount_factor(*t).unwrap(),
                epsilon = 1e-9
            );
        }
    }
}

#[test]
fn test_fixed_node_dates() {
    let valuation = common::valuation();
    let mut setup = DiscountingSetup::new();
    setup.building([OIS]).unwrap();
    setup
        .using(OIS)
        .unwrap()
        .for_discounting(Currency::USD)
        .unwrap()
        .for_overnight_index([common::sofr()])
        .with_interpolator(common::linear())
        .unwrap()
        .using_node_dates([
            valuation.add_days(30),
            valuation.add_days(400),
            valuation.add_days(800),
        ])
        .unwrap();
    for node in &common::ois_setup(valuation).nodes()[OIS] {
        setup
            .with_node(OIS, node.definition.clone(), node.label.clone())
            .unwrap();
    }
    let builder = setup.get_builder().unwrap();
    let curves = builder.build_curves(valuation, &FixingSet::new()).unwrap();

    common::assert_nodes_reprice(&builder, &curves, &MarketQuoteCalculator::default(), valuation);
    let curve = curves.provider().curve(OIS).unwrap();
    assert_relative_eq!(curve.node_times()[0], 30.0 / 365.0, epsilon = 1e-12);
}
