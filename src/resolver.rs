//! The top-level expression resolver and its immutable configuration.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;

use crate::anchor::AnchorFormat;
use crate::error::Result;
use crate::math;
use crate::timestamp::Timestamp;

/// The default anchor pattern.
pub const DEFAULT_PATTERN: &str = "yyyy.MM.dd";

/// The default keyword marking "use the current time".
pub const DEFAULT_NOW_KEYWORD: &str = "now";

/// The anchor delimiter separating anchor text from math operations.
const MATH_DELIMITER: &str = "||";

/// The injected "current time" capability.
///
/// The resolver never reads the wall clock directly; the caller supplies
/// this at configuration time, which is what makes `now`-relative
/// expressions deterministic under test.
pub type NowSource = Arc<dyn Fn() -> Timestamp + Send + Sync>;

/// Resolves date math expressions into timezone-bound timestamps.
///
/// Immutable after construction and free of per-call state, so a single
/// parser can be shared across threads and reused for many resolutions.
/// Built via [`DateMathParser::builder`]; every field has a default.
///
/// An expression takes one of two forms:
///
/// - `<anchorText>||<mathOps>` — literal anchor text parsed against the
///   configured pattern, followed by zero or more chained operations.
///   Without `||` the whole string is anchor text and no math applies.
/// - `<nowKeyword><mathOps>` — the reserved keyword (default `now`)
///   standing in for the current time.
///
/// ```
/// use datemath::DateMathParser;
///
/// let parser = DateMathParser::builder().build().unwrap();
/// let t = parser.resolve("2024.03.05||+1d/d").unwrap();
/// assert_eq!((t.year(), t.month(), t.day()), (2024, 3, 6));
/// assert_eq!((t.hour(), t.minute()), (0, 0));
/// ```
pub struct DateMathParser {
    zone: Tz,
    now_keyword: String,
    now: NowSource,
    format: AnchorFormat,
}

impl DateMathParser {
    /// A parser with every field at its default.
    pub fn new() -> Result<DateMathParser> {
        Self::builder().build()
    }

    /// Start building a parser.
    pub fn builder() -> DateMathParserBuilder {
        DateMathParserBuilder::default()
    }

    /// The configured anchor pattern.
    pub fn pattern(&self) -> &str {
        self.format.pattern()
    }

    /// The zone resolved timestamps are bound to.
    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Resolve a date math expression into a timestamp.
    ///
    /// # Errors
    ///
    /// Any [`DateMathError`](crate::DateMathError) from the anchor parser
    /// or the math engine, unchanged.
    pub fn resolve(&self, expression: &str) -> Result<Timestamp> {
        if let Some(rest) = expression.strip_prefix(self.now_keyword.as_str()) {
            return apply_if_present(rest.trim(), (self.now)());
        }

        match expression.find(MATH_DELIMITER) {
            None => self.parse_anchor(expression),
            Some(index) => {
                let start = self.parse_anchor(&expression[..index])?;
                apply_if_present(&expression[index + MATH_DELIMITER.len()..], start)
            }
        }
    }

    /// Parse literal anchor text against the configured pattern and zone.
    pub fn parse_anchor(&self, text: &str) -> Result<Timestamp> {
        self.format.parse_in(text, self.zone)
    }
}

/// An empty math suffix is a no-op; anything else is a forced application.
fn apply_if_present(math_expression: &str, start: Timestamp) -> Result<Timestamp> {
    if math_expression.is_empty() {
        Ok(start)
    } else {
        math::apply_math(math_expression, start)
    }
}

impl fmt::Debug for DateMathParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateMathParser")
            .field("pattern", &self.pattern())
            .field("zone", &self.zone)
            .field("now_keyword", &self.now_keyword)
            .finish_non_exhaustive()
    }
}

// ── Builder ─────────────────────────────────────────────────────────────

/// Builder for [`DateMathParser`]. Every field has a default: pattern
/// `yyyy.MM.dd`, zone UTC, keyword `now`, wall clock in UTC.
pub struct DateMathParserBuilder {
    pattern: String,
    zone: Tz,
    now_keyword: String,
    now: Option<NowSource>,
}

impl Default for DateMathParserBuilder {
    fn default() -> DateMathParserBuilder {
        DateMathParserBuilder {
            pattern: DEFAULT_PATTERN.to_string(),
            zone: chrono_tz::UTC,
            now_keyword: DEFAULT_NOW_KEYWORD.to_string(),
            now: None,
        }
    }
}

impl DateMathParserBuilder {
    /// The anchor pattern (see [`AnchorFormat`] for the token set).
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// The zone anchors are interpreted in and results are bound to.
    pub fn zone(mut self, zone: Tz) -> Self {
        self.zone = zone;
        self
    }

    /// The keyword marking "use the current time".
    pub fn now_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.now_keyword = keyword.into();
        self
    }

    /// The "current time" source. Supply a fixed-value stub for
    /// deterministic tests.
    pub fn now_source(mut self, now: impl Fn() -> Timestamp + Send + Sync + 'static) -> Self {
        self.now = Some(Arc::new(now));
        self
    }

    /// Compile the pattern and produce the parser.
    ///
    /// # Errors
    ///
    /// Returns [`DateMathError::InvalidPattern`](crate::DateMathError::InvalidPattern)
    /// if the pattern does not compile.
    pub fn build(self) -> Result<DateMathParser> {
        let format = AnchorFormat::compile(&self.pattern)?;
        let now = self
            .now
            .unwrap_or_else(|| Arc::new(|| Timestamp::from_utc(Utc::now())));
        Ok(DateMathParser {
            zone: self.zone,
            now_keyword: self.now_keyword,
            now,
            format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DateMathError;
    use chrono::TimeZone;

    fn eastern() -> Tz {
        "America/New_York".parse().unwrap()
    }

    /// Parser fixture matching the reference scenarios: custom pattern,
    /// Eastern zone, current time stubbed at 2011-10-05T14:48:00Z.
    fn stubbed_parser() -> DateMathParser {
        DateMathParser::builder()
            .pattern("yyyy-MM-dd HH-ss")
            .zone(eastern())
            .now_source(|| Timestamp::from_utc(Utc.with_ymd_and_hms(2011, 10, 5, 14, 48, 0).unwrap()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_anchored_expression_with_math() {
        let t = stubbed_parser().resolve("1998-09-18 16-43||-4d").unwrap();
        assert_eq!(t.day(), 14);
    }

    #[test]
    fn test_now_minus_4d() {
        let t = stubbed_parser().resolve("now-4d").unwrap();
        assert_eq!(t.day(), 1);
    }

    #[test]
    fn test_now_minus_6m_plus_6y() {
        let t = stubbed_parser().resolve("now-6M+6y").unwrap();
        assert_eq!(t.month(), 4);
        assert_eq!(t.year(), 2017);
    }

    #[test]
    fn test_now_minus_4d_rounded_to_day() {
        let t = stubbed_parser().resolve("now-4d/d").unwrap();
        assert_eq!(t.hour(), 0);
        assert_eq!(t.minute(), 0);
    }

    #[test]
    fn test_now_alone_is_the_current_time() {
        let t = stubbed_parser().resolve("now").unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2011, 10, 5));
        assert_eq!((t.hour(), t.minute()), (14, 48));
    }

    #[test]
    fn test_whitespace_after_now_keyword_is_trimmed() {
        let parser = stubbed_parser();
        assert_eq!(parser.resolve("now -4d").unwrap(), parser.resolve("now-4d").unwrap());
    }

    #[test]
    fn test_empty_math_suffix_is_identity() {
        let parser = DateMathParser::builder().build().unwrap();
        assert_eq!(
            parser.resolve("2024.03.05").unwrap(),
            parser.resolve("2024.03.05||").unwrap()
        );
    }

    #[test]
    fn test_anchor_without_delimiter_applies_no_math() {
        let parser = DateMathParser::builder().build().unwrap();
        let t = parser.resolve("2024.03.05").unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2024, 3, 5));
        assert_eq!((t.hour(), t.minute(), t.second()), (0, 0, 0));
    }

    #[test]
    fn test_default_configuration() {
        let parser = DateMathParser::new().unwrap();
        assert_eq!(parser.pattern(), DEFAULT_PATTERN);
        assert_eq!(parser.zone(), chrono_tz::UTC);
        // The default now source reads the wall clock; just prove it runs.
        parser.resolve("now").unwrap();
    }

    #[test]
    fn test_custom_now_keyword() {
        let parser = DateMathParser::builder()
            .now_keyword("current")
            .now_source(|| Timestamp::from_utc(Utc.with_ymd_and_hms(2011, 10, 5, 14, 48, 0).unwrap()))
            .build()
            .unwrap();
        let t = parser.resolve("current-4d").unwrap();
        assert_eq!(t.day(), 1);
        // The default keyword is now plain anchor text and fails the pattern
        let err = parser.resolve("now-4d").unwrap_err();
        assert!(matches!(err, DateMathError::AnchorParse { .. }));
    }

    #[test]
    fn test_anchor_errors_carry_text_and_pattern() {
        let parser = DateMathParser::builder().build().unwrap();
        let err = parser.resolve("not a date").unwrap_err();
        assert_eq!(
            err,
            DateMathError::AnchorParse {
                text: "not a date".to_string(),
                pattern: DEFAULT_PATTERN.to_string(),
            }
        );
    }

    #[test]
    fn test_math_errors_bubble_up_unchanged() {
        let parser = DateMathParser::builder().build().unwrap();
        let err = parser.resolve("2024.03.05||*1d").unwrap_err();
        assert!(matches!(err, DateMathError::UnsupportedOperator { operator: '*', .. }));
        let err = parser.resolve("2024.03.05||+4").unwrap_err();
        assert!(matches!(err, DateMathError::Truncated { .. }));
    }

    #[test]
    fn test_invalid_pattern_fails_at_build_time() {
        let err = DateMathParser::builder().pattern("yyy.MM").build().unwrap_err();
        assert!(matches!(err, DateMathError::InvalidPattern { .. }));
    }

    #[test]
    fn test_parser_is_shareable_across_threads() {
        let parser = std::sync::Arc::new(stubbed_parser());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let parser = std::sync::Arc::clone(&parser);
                std::thread::spawn(move || parser.resolve("now-4d").unwrap().day())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    }
}
