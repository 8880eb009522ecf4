//! # Convex Core
//!
//! Market data primitives for the Convex curve calibration engine.
//!
//! - **Types**: `Date`, `Tenor`, `Currency`, rate indices, fixing series and
//!   legal entities
//! - **Day Count Conventions**: accrual fractions for coupons and indices
//!
//! ## Example
//!
//! ```rust
//! use convex_core::prelude::*;
//!
//! let index = IborIndex::new(
//!     "USD LIBOR 3M",
//!     Currency::USD,
//!     Tenor::months(3),
//!     2,
//!     DayCountConvention::Act360,
//! );
//! let start = Date::from_ymd(2025, 1, 15).unwrap();
//! assert_eq!(index.accrual_end(start).unwrap(), Date::from_ymd(2025, 4, 15).unwrap());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::return_self_not_must_use)]

pub mod daycounts;
pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::daycounts::DayCountConvention;
    pub use crate::error::{ConvexError, ConvexResult};
    pub use crate::types::{
        Currency, Date, FixingSeries, FixingSet, IborIndex, Index, LegalEntity, OvernightIndex,
        Region, Sector, Tenor,
    };
}

// Re-export commonly used types at crate root
pub use error::{ConvexError, ConvexResult};
pub use types::{Currency, Date, Tenor};
