//! The math engine: parse and apply chained offset and rounding operations.
//!
//! A math expression is a sequence of operations with no separators, each
//! an operator (`+`, `-`, `/`), an optional decimal magnitude (default 1),
//! and a single-character unit from the unit table. Operations apply
//! strictly left to right, each result feeding the next:
//!
//! ```text
//! -6M+6y      six months back, then six years forward
//! +1d/d       one day forward, then truncated to start of day
//! ```
//!
//! `/` truncates to the start of the unit and only accepts magnitude 1.
//! The expression must be consumed entirely; no leftover characters are
//! tolerated and no malformed token is skipped.

use crate::error::{DateMathError, Result};
use crate::timestamp::Timestamp;
use crate::unit::Unit;

/// Apply a math expression to a starting timestamp.
///
/// This is a forced math application: at least one operation is required,
/// so an empty expression is [`DateMathError::Truncated`]. The resolver is
/// the layer that treats an absent math suffix as a no-op.
///
/// # Errors
///
/// [`DateMathError::Truncated`] when the expression ends before a required
/// token, [`DateMathError::UnsupportedOperator`] and
/// [`DateMathError::UnsupportedUnit`] for unrecognized characters,
/// [`DateMathError::InvalidRounding`] for `/` with a magnitude other than 1,
/// and [`DateMathError::Malformed`] for magnitudes beyond the numeric range.
pub fn apply_math(expression: &str, start: Timestamp) -> Result<Timestamp> {
    let chars: Vec<char> = expression.chars().collect();
    if chars.is_empty() {
        return Err(truncated(expression));
    }

    let mut time = start;
    let mut i = 0;
    while i < chars.len() {
        let operator = chars[i];
        i += 1;

        let (round, sign) = match operator {
            '/' => (true, 1),
            '+' => (false, 1),
            '-' => (false, -1),
            other => {
                return Err(DateMathError::UnsupportedOperator {
                    operator: other,
                    expression: expression.to_string(),
                })
            }
        };

        if i >= chars.len() {
            return Err(truncated(expression));
        }

        // A digit run is read even after `/`, so `/2d` reports an invalid
        // rounding rather than an unknown unit.
        let magnitude = if chars[i].is_ascii_digit() {
            let from = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i >= chars.len() {
                return Err(truncated(expression));
            }
            let digits: String = chars[from..i].iter().collect();
            digits.parse::<i64>().map_err(|_| {
                DateMathError::Malformed(format!("magnitude '{digits}' out of range in '{expression}'"))
            })?
        } else {
            1
        };

        if round && magnitude != 1 {
            return Err(DateMathError::InvalidRounding {
                expression: expression.to_string(),
            });
        }

        let unit_char = chars[i];
        i += 1;
        let unit = Unit::from_code(unit_char).ok_or_else(|| DateMathError::UnsupportedUnit {
            unit: unit_char,
            expression: expression.to_string(),
        })?;

        time = if round {
            time.truncate(unit)?
        } else {
            time.shift(sign * magnitude, unit)?
        };
    }

    Ok(time)
}

fn truncated(expression: &str) -> DateMathError {
    DateMathError::Truncated {
        expression: expression.to_string(),
    }
}
