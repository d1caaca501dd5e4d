//! Compiled anchor patterns and literal date-time parsing.
//!
//! An anchor pattern is caller-supplied and may be partial (`yyyy.MM` with
//! no day). Parsing is two-phase: extract exactly the fields the pattern
//! names, fill every absent field with a fixed default (1970-01-01
//! 00:00:00.000), then bind the result to the configured zone. This keeps
//! partially-specified anchors deterministic instead of inheriting fields
//! from the current date.

use chrono::{NaiveDate, TimeZone};
use chrono_tz::Tz;

use crate::error::{DateMathError, Result};
use crate::timestamp::Timestamp;

/// A datetime field a pattern token can supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Millis,
}

/// One element of a compiled pattern: a fixed-width numeric field or a
/// literal separator matched verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternItem {
    Field(Field, usize),
    Literal(char),
}

/// The compiled form of an anchor pattern string.
///
/// Supported tokens: `yyyy` (year), `MM` (month), `dd` (day of month),
/// `HH`/`hh` (hour 0-23; no am/pm at this layer), `mm` (minute), `ss`
/// (second), `SSS` (milliseconds). Any non-letter character is a literal
/// separator. This is deliberately not a general date-format parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorFormat {
    pattern: String,
    items: Vec<PatternItem>,
}

/// Fields extracted from anchor text, prior to defaulting.
#[derive(Debug, Default)]
struct ParsedFields {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    millis: Option<u32>,
}

impl ParsedFields {
    fn set(&mut self, field: Field, value: u32) {
        match field {
            Field::Year => self.year = Some(value as i32),
            Field::Month => self.month = Some(value),
            Field::Day => self.day = Some(value),
            Field::Hour => self.hour = Some(value),
            Field::Minute => self.minute = Some(value),
            Field::Second => self.second = Some(value),
            Field::Millis => self.millis = Some(value),
        }
    }
}

impl AnchorFormat {
    /// Compile a pattern string.
    ///
    /// # Errors
    ///
    /// Returns [`DateMathError::InvalidPattern`] for an unrecognized letter
    /// run (unknown letter or wrong width) or a field named twice.
    pub fn compile(pattern: &str) -> Result<AnchorFormat> {
        let mut items = Vec::new();
        let mut seen: Vec<Field> = Vec::new();
        let mut chars = pattern.chars().peekable();

        while let Some(&c) = chars.peek() {
            if !c.is_ascii_alphabetic() {
                chars.next();
                items.push(PatternItem::Literal(c));
                continue;
            }

            let mut run = 0;
            while chars.peek() == Some(&c) {
                chars.next();
                run += 1;
            }

            let (field, width) = match (c, run) {
                ('y', 4) => (Field::Year, 4),
                ('M', 2) => (Field::Month, 2),
                ('d', 2) => (Field::Day, 2),
                ('H', 2) | ('h', 2) => (Field::Hour, 2),
                ('m', 2) => (Field::Minute, 2),
                ('s', 2) => (Field::Second, 2),
                ('S', 3) => (Field::Millis, 3),
                _ => {
                    return Err(DateMathError::InvalidPattern {
                        pattern: pattern.to_string(),
                        message: format!("unsupported token '{}'", c.to_string().repeat(run)),
                    })
                }
            };

            if seen.contains(&field) {
                return Err(DateMathError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: format!("field {field:?} appears more than once"),
                });
            }
            seen.push(field);
            items.push(PatternItem::Field(field, width));
        }

        Ok(AnchorFormat {
            pattern: pattern.to_string(),
            items,
        })
    }

    /// The source pattern this format was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parse anchor text against this format and bind it to `zone`.
    ///
    /// Fields the pattern does not name default to year 1970, month 1,
    /// day 1, hour 0, minute 0, second 0, sub-second 0.
    ///
    /// # Errors
    ///
    /// Returns [`DateMathError::AnchorParse`] if the text does not conform
    /// to the pattern or names an invalid calendar date, and
    /// [`DateMathError::Malformed`] if the resulting local time does not
    /// exist in `zone` (DST gap).
    pub fn parse_in(&self, text: &str, zone: Tz) -> Result<Timestamp> {
        let mismatch = || DateMathError::AnchorParse {
            text: text.to_string(),
            pattern: self.pattern.clone(),
        };
        let fields = self.extract(text).ok_or_else(mismatch)?;

        let naive = NaiveDate::from_ymd_opt(
            fields.year.unwrap_or(1970),
            fields.month.unwrap_or(1),
            fields.day.unwrap_or(1),
        )
        .and_then(|date| {
            date.and_hms_milli_opt(
                fields.hour.unwrap_or(0),
                fields.minute.unwrap_or(0),
                fields.second.unwrap_or(0),
                fields.millis.unwrap_or(0),
            )
        })
        .ok_or_else(mismatch)?;

        zone.from_local_datetime(&naive)
            .earliest()
            .map(Timestamp::new)
            .ok_or_else(|| {
                DateMathError::Malformed(format!(
                    "anchor '{text}' names a local time that does not exist in {zone}"
                ))
            })
    }

    /// Phase 1: walk the compiled items over the text, collecting whatever
    /// fields the pattern supplies. `None` on any mismatch or leftover
    /// input.
    fn extract(&self, text: &str) -> Option<ParsedFields> {
        let mut fields = ParsedFields::default();
        let mut rest = text;

        for item in &self.items {
            match *item {
                PatternItem::Literal(c) => {
                    rest = rest.strip_prefix(c)?;
                }
                PatternItem::Field(field, width) => {
                    if rest.len() < width || !rest.is_char_boundary(width) {
                        return None;
                    }
                    let (digits, tail) = rest.split_at(width);
                    if !digits.bytes().all(|b| b.is_ascii_digit()) {
                        return None;
                    }
                    fields.set(field, digits.parse().ok()?);
                    rest = tail;
                }
            }
        }

        rest.is_empty().then_some(fields)
    }
}
