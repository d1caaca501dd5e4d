//! The unit table: single-character codes for calendar and clock units.

use serde::Serialize;

/// A calendar or clock unit addressable from a date math expression.
///
/// Each unit is named by a single-character code. The mapping is fixed:
///
/// | code | unit |
/// |------|------|
/// | `y` | years |
/// | `M` | months |
/// | `w` | weeks |
/// | `d` | days |
/// | `H`, `h` | hours |
/// | `m` | minutes |
/// | `s` | seconds |
///
/// Both `H` and `h` name hours — there is no am/pm distinction at this
/// layer, only plain hour increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Unit {
    Years,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
}

/// Every unit, largest first. Handy for exhaustive table-driven tests.
pub const ALL_UNITS: [Unit; 7] = [
    Unit::Years,
    Unit::Months,
    Unit::Weeks,
    Unit::Days,
    Unit::Hours,
    Unit::Minutes,
    Unit::Seconds,
];

impl Unit {
    /// Look up a unit by its single-character code.
    pub fn from_code(code: char) -> Option<Unit> {
        match code {
            'y' => Some(Unit::Years),
            'M' => Some(Unit::Months),
            'w' => Some(Unit::Weeks),
            'd' => Some(Unit::Days),
            'H' | 'h' => Some(Unit::Hours),
            'm' => Some(Unit::Minutes),
            's' => Some(Unit::Seconds),
            _ => None,
        }
    }

    /// The canonical code for this unit (`Hours` prints as `h`).
    pub fn code(self) -> char {
        match self {
            Unit::Years => 'y',
            Unit::Months => 'M',
            Unit::Weeks => 'w',
            Unit::Days => 'd',
            Unit::Hours => 'h',
            Unit::Minutes => 'm',
            Unit::Seconds => 's',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_hour_codes_map_to_hours() {
        assert_eq!(Unit::from_code('H'), Some(Unit::Hours));
        assert_eq!(Unit::from_code('h'), Some(Unit::Hours));
    }

    #[test]
    fn test_unknown_codes_are_rejected() {
        for c in ['x', 'q', 'Y', 'D', 'S', '1', ' '] {
            assert_eq!(Unit::from_code(c), None, "code '{c}' should be unknown");
        }
    }

    #[test]
    fn test_canonical_codes_round_trip() {
        for unit in ALL_UNITS {
            assert_eq!(Unit::from_code(unit.code()), Some(unit));
        }
    }
}
