//! # Convex Curves
//!
//! Multi-curve rates and credit curve calibration for the Convex library.
//!
//! This crate provides:
//!
//! - **Setup**: A fluent [`CurveSetup`] grouping curves into sequential blocks
//!   of jointly-solved units, with per-curve roles and shapes
//! - **Builder**: An immutable [`CurveBuilder`] calibrating the setup at any
//!   valuation date, cached per date
//! - **Curves**: Interpolated (on yield, discount factors or periodic yield),
//!   functional (Nelson-Siegel, Svensson, or registered forms) and spread curves
//! - **Models**: Discounting, forward with futures convexity, Hull-White and
//!   issuer variants
//! - **Sensitivities**: A building-block bundle of `∂parameters/∂quotes` chained
//!   across blocks
//!
//! ## Quick Start
//!
//! ```rust
//! use convex_core::prelude::*;
//! use convex_curves::prelude::*;
//! use convex_math::extrapolation::ExtrapolationMethod;
//! use convex_math::interpolation::{InterpolationMethod, InterpolatorSpec};
//!
//! let valuation = Date::from_ymd(2025, 1, 15).unwrap();
//! let sofr = OvernightIndex::new("SOFR", Currency::USD, 0, DayCountConvention::Act360);
//!
//! let mut setup = DiscountingSetup::new();
//! setup.building(["USD-OIS"]).unwrap();
//! setup
//!     .using("USD-OIS")
//!     .unwrap()
//!     .for_discounting(Currency::USD)
//!     .unwrap()
//!     .for_overnight_index([sofr.clone()])
//!     .with_interpolator(
//!         InterpolatorSpec::new(InterpolationMethod::MonotoneCubic)
//!             .with_extrapolation(ExtrapolationMethod::Linear, ExtrapolationMethod::Linear),
//!     )
//!     .unwrap();
//!
//! let deposit = DepositDefinition::new(
//!     Currency::USD,
//!     valuation,
//!     valuation.add_days(2),
//!     0.015,
//!     DayCountConvention::Act360,
//! )
//! .unwrap();
//! let ois = SwapDefinition::overnight(
//!     sofr,
//!     valuation,
//!     Tenor::years(1),
//!     0.018,
//!     Tenor::years(1),
//!     DayCountConvention::Act360,
//! )
//! .unwrap();
//! setup.with_node("USD-OIS", deposit, "2D").unwrap();
//! setup.with_node("USD-OIS", ois, "1Y").unwrap();
//!
//! let builder = setup.get_builder().unwrap();
//! let curves = builder.build_curves(valuation, &FixingSet::new()).unwrap();
//! let curve = curves.provider().discounting_curve(Currency::USD).unwrap();
//! assert!(curve.discount_factor(1.0).unwrap() < 1.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::doc_markdown)]

pub mod builder;
pub mod bundle;
pub mod calculators;
pub mod config;
pub mod curves;
pub mod error;
pub mod functional_form;
pub mod fx;
pub mod generators;
pub mod instruments;
pub mod issuer;
pub mod models;
pub mod provider;
pub mod repository;
pub mod setup;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::builder::{CalibratedCurves, CurveBuilder};
    pub use crate::bundle::{BuildingBlock, BuildingBlockBundle, BundleEntry};
    pub use crate::calculators::{
        FuturesConvexity, HullWhiteParameters, MarketQuoteCalculator, ParSpreadCalculator,
        ParSpreadSensitivityCalculator,
    };
    pub use crate::config::CalibrationConfig;
    pub use crate::curves::{Curve, CurveValueKind, FunctionalCurve, InterpolatedCurve, SpreadCurve};
    pub use crate::error::{CurveError, CurveResult, ErrorKind};
    pub use crate::fx::FxMatrix;
    pub use crate::instruments::{
        BondDefinition, DepositDefinition, FraDefinition, FutureDefinition, InstrumentDefinition,
        NodeTimeCalculator, SwapDefinition,
    };
    pub use crate::issuer::{IssuerKey, IssuerMatcher, LegalEntityFilter, Matcher};
    pub use crate::models::{CurveModel, Discounting, ForwardConvexity, HullWhite, Issuer};
    pub use crate::provider::{CurveRoles, DiscountingId, ParameterProvider};
    pub use crate::setup::{
        CurveNode, CurveSetup, CurveTypeConfig, DiscountingSetup, ForwardConvexitySetup,
        HullWhiteSetup, IssuerSetup,
    };
}

// Re-export commonly used types at crate root
pub use builder::{CalibratedCurves, CurveBuilder};
pub use config::CalibrationConfig;
pub use error::{CurveError, CurveResult, ErrorKind};
pub use setup::CurveSetup;
