//! Market data types consumed by curve calibration.
//!
//! - [`Date`]: Calendar date
//! - [`Tenor`]: Period length such as `3M`
//! - [`Currency`]: ISO currency codes
//! - [`IborIndex`], [`OvernightIndex`], [`Index`]: Rate indices
//! - [`FixingSeries`], [`FixingSet`]: Historical index fixings
//! - [`LegalEntity`]: Issuer reference data

mod currency;
mod date;
mod fixings;
mod index;
mod legal_entity;
mod tenor;

pub use currency::Currency;
pub use date::Date;
pub use fixings::{FixingSeries, FixingSet};
pub use index::{IborIndex, Index, OvernightIndex};
pub use legal_entity::{AgencyRating, LegalEntity, Region, Sector};
pub use tenor::{Tenor, TenorUnit};
