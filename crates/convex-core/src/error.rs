//! Error types for market data primitives.
//!
//! Errors raised while parsing or manipulating dates, tenors, conventions
//! and reference data.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type ConvexResult<T> = Result<T, ConvexError>;

/// The error type for core market data operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvexError {
    /// Error in date calculations or invalid date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// A tenor string could not be parsed.
    #[error("Invalid tenor: {value}")]
    InvalidTenor {
        /// The offending text.
        value: String,
    },

    /// Unknown ISO currency code.
    #[error("Unknown currency code: {code}")]
    UnknownCurrency {
        /// The offending code.
        code: String,
    },

    /// Unknown day count convention name.
    #[error("Unknown day count convention: {name}")]
    UnknownDayCount {
        /// The offending name.
        name: String,
    },

    /// Generic invalid input.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of what's wrong.
        reason: String,
    },
}

impl ConvexError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an invalid tenor error.
    #[must_use]
    pub fn invalid_tenor(value: impl Into<String>) -> Self {
        Self::InvalidTenor {
            value: value.into(),
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConvexError::invalid_date("2024-02-30 is not a valid date");
        assert!(err.to_string().contains("Invalid date"));
    }

    #[test]
    fn test_tenor_error() {
        let err = ConvexError::invalid_tenor("3Q");
        assert_eq!(err.to_string(), "Invalid tenor: 3Q");
    }
}
