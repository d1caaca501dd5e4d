//! Error types for date math resolution.

use thiserror::Error;

/// Everything that can go wrong while resolving a date math expression.
///
/// All errors are terminal and surfaced synchronously at the point of
/// detection; the resolver never skips a malformed token or substitutes a
/// default for invalid (as opposed to absent) input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateMathError {
    /// The expression has no valid interpretation and no more specific
    /// error applies (out-of-range arithmetic, nonexistent local times).
    #[error("malformed date math expression: {0}")]
    Malformed(String),

    /// Anchor text does not conform to the configured pattern.
    #[error("failed to parse anchor '{text}' with pattern '{pattern}'")]
    AnchorParse { text: String, pattern: String },

    /// The math expression ended where an operator, magnitude, or unit was
    /// still expected.
    #[error("truncated date math expression '{expression}'")]
    Truncated { expression: String },

    /// A character other than `+`, `-`, or `/` where an operator belongs.
    #[error("operator '{operator}' not supported in date math expression '{expression}'")]
    UnsupportedOperator { operator: char, expression: String },

    /// A unit character with no entry in the unit table.
    #[error("unit '{unit}' not supported in date math expression '{expression}'")]
    UnsupportedUnit { unit: char, expression: String },

    /// Rounding `/` combined with a magnitude other than 1.
    #[error("rounding `/` can only be used on single unit types in '{expression}'")]
    InvalidRounding { expression: String },

    /// The anchor pattern itself could not be compiled.
    #[error("invalid anchor pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

pub type Result<T> = std::result::Result<T, DateMathError>;
