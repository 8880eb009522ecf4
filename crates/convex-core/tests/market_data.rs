//! Integration tests for the market data primitives used by curve calibration.

use approx::assert_relative_eq;
use convex_core::prelude::*;
use proptest::prelude::*;

fn sofr() -> OvernightIndex {
    OvernightIndex::new("SOFR", Currency::USD, 1, DayCountConvention::Act360)
}

#[test]
fn test_swap_schedule_dates_from_tenors() {
    let spot = Date::parse("2025-01-31").unwrap();
    let six_months: Tenor = "6M".parse().unwrap();
    let end = six_months.add_to(spot).unwrap();
    assert_eq!(end, Date::from_ymd(2025, 7, 31).unwrap());

    // End of month clamps
    let one_month: Tenor = "1M".parse().unwrap();
    assert_eq!(
        one_month.add_to(spot).unwrap(),
        Date::from_ymd(2025, 2, 28).unwrap()
    );
}

#[test]
fn test_accrual_fractions_by_convention() {
    let start = Date::from_ymd(2025, 1, 15).unwrap();
    let end = Date::from_ymd(2026, 1, 15).unwrap();
    assert_relative_eq!(DayCountConvention::Act360.year_fraction(start, end), 365.0 / 360.0);
    assert_relative_eq!(DayCountConvention::Act365Fixed.year_fraction(start, end), 1.0);
    assert_relative_eq!(DayCountConvention::Thirty360.year_fraction(start, end), 1.0);
}

#[test]
fn test_fixings_by_index() {
    let d = |day| Date::from_ymd(2025, 6, day).unwrap();
    let fixings = FixingSet::new().with_series(
        sofr(),
        FixingSeries::new().with_fixing(d(2), 0.0431).with_fixing(d(3), 0.0433),
    );
    let key = Index::from(sofr());
    assert_eq!(fixings.fixing(&key, d(3)), Some(0.0433));
    assert_eq!(fixings.fixing(&key, d(4)), None);
    assert_eq!(
        fixings.get(&key).and_then(|s| s.latest_on_or_before(d(9))),
        Some((d(3), 0.0433))
    );
}

#[test]
fn test_legal_entity_reference_data() {
    let entity = LegalEntity::new("DBR", "BUNDESREPUBLIK")
        .with_rating("Moody's", "Aaa")
        .with_sector(Sector::Government)
        .with_region(Region::country("Germany", "DE", Currency::EUR));
    assert_eq!(entity.rating_by("MOODY'S"), Some("Aaa"));
    let region = entity.region.as_ref().unwrap();
    assert!(region.countries.contains("DE"));
    assert!(region.currencies.contains(&Currency::EUR));
}

proptest! {
    #[test]
    fn prop_add_days_round_trip(offset in -5000i64..5000) {
        let base = Date::from_ymd(2025, 3, 14).unwrap();
        let moved = base.add_days(offset);
        prop_assert_eq!(moved - base, offset);
    }
}
