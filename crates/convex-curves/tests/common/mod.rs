//! Market data shared by the integration tests.

#![allow(dead_code)]

use convex_core::prelude::*;
use convex_curves::prelude::*;
use convex_math::extrapolation::ExtrapolationMethod;
use convex_math::interpolation::{InterpolationMethod, InterpolatorSpec};

pub const OIS: &str = "USD-OIS";
pub const LIBOR: &str = "USD-LIBOR-3M";

pub fn valuation() -> Date {
    Date::from_ymd(2025, 1, 15).unwrap()
}

pub fn sofr() -> OvernightIndex {
    OvernightIndex::new("SOFR", Currency::USD, 0, DayCountConvention::Act360)
}

pub fn libor_3m() -> IborIndex {
    IborIndex::new(
        "USD LIBOR 3M",
        Currency::USD,
        Tenor::months(3),
        2,
        DayCountConvention::Act360,
    )
}

pub fn linear() -> InterpolatorSpec {
    InterpolatorSpec::new(InterpolationMethod::Linear)
}

pub fn monotone_cubic() -> InterpolatorSpec {
    InterpolatorSpec::new(InterpolationMethod::MonotoneCubic)
        .with_extrapolation(ExtrapolationMethod::Linear, ExtrapolationMethod::Linear)
}

pub fn deposit(valuation: Date, days: i64, rate: f64) -> DepositDefinition {
    DepositDefinition::new(
        Currency::USD,
        valuation,
        valuation.add_days(days),
        rate,
        DayCountConvention::Act360,
    )
    .unwrap()
}

pub fn ois(valuation: Date, years: u32, rate: f64) -> SwapDefinition {
    SwapDefinition::overnight(
        sofr(),
        valuation,
        Tenor::years(years),
        rate,
        Tenor::years(1),
        DayCountConvention::Act360,
    )
    .unwrap()
}

pub fn libor_swap(valuation: Date, years: u32, rate: f64) -> SwapDefinition {
    SwapDefinition::ibor(
        libor_3m(),
        valuation.add_days(2),
        Tenor::years(years),
        rate,
        Tenor::SIX_MONTHS,
        DayCountConvention::Thirty360,
    )
    .unwrap()
}

/// Adds the USD-OIS discounting curve, with its nodes, to `setup`.
pub fn configure_ois<M: CurveModel>(setup: &mut CurveSetup<M>, valuation: Date) {
    setup
        .using(OIS)
        .unwrap()
        .for_discounting(Currency::USD)
        .unwrap()
        .for_overnight_index([sofr()])
        .with_interpolator(monotone_cubic())
        .unwrap();
    setup
        .with_node(OIS, deposit(valuation, 2, 0.015), "2D")
        .unwrap()
        .with_node(OIS, ois(valuation, 1, 0.018), "1Y")
        .unwrap()
        .with_node(OIS, ois(valuation, 2, 0.020), "2Y")
        .unwrap();
}

/// Single-block setup with only the OIS curve.
pub fn ois_setup(valuation: Date) -> DiscountingSetup {
    let mut setup = DiscountingSetup::new();
    setup.building([OIS]).unwrap();
    configure_ois(&mut setup, valuation);
    setup
}

/// OIS in the first block, LIBOR 3M as a spread over it in the second.
pub fn two_block_setup(valuation: Date) -> DiscountingSetup {
    let mut setup = DiscountingSetup::new();
    setup.building_first([OIS]).unwrap().then_building([LIBOR]).unwrap();
    configure_ois(&mut setup, valuation);
    setup
        .using(LIBOR)
        .unwrap()
        .for_index([libor_3m()])
        .unwrap()
        .with_interpolator(linear())
        .unwrap()
        .as_spread_over(OIS)
        .unwrap();
    let fra = FraDefinition::new(libor_3m(), valuation.add_days(2), 0.021).unwrap();
    setup
        .with_node(LIBOR, fra, "FRA 0x3")
        .unwrap()
        .with_node(LIBOR, libor_swap(valuation, 1, 0.022), "1Y")
        .unwrap()
        .with_node(LIBOR, libor_swap(valuation, 2, 0.0235), "2Y")
        .unwrap();
    setup
}

/// Asserts that every node of `curves` reprices to its quote.
pub fn assert_nodes_reprice<M: CurveModel>(
    builder: &CurveBuilder<M>,
    curves: &CalibratedCurves,
    calculator: &MarketQuoteCalculator,
    valuation: Date,
) {
    let tolerance = builder.calibration_config().absolute_tolerance;
    for (curve, nodes) in builder.nodes() {
        for node in nodes {
            let derivative = node
                .definition
                .to_derivative(valuation, &FixingSet::new())
                .unwrap();
            let spread = calculator
                .par_spread(&derivative, curves.provider())
                .unwrap();
            assert!(
                spread.abs() <= tolerance,
                "{curve} {} reprices with spread {spread:e}",
                node.label
            );
        }
    }
}
