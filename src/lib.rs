//! # datemath
//!
//! Elasticsearch-style date math expression resolution.
//!
//! A date math expression names an absolute point in time as either literal
//! anchor text followed by `||` and chained relative operations, or the
//! reserved `now` keyword followed by the same operations:
//!
//! ```text
//! 2024.03.05||+1M/d    anchor, plus one month, truncated to start of day
//! now-6M+6y            current time, back six months, forward six years
//! ```
//!
//! Resolution is a pure synchronous computation: the configuration is
//! immutable, the only external effect is the injected "current time"
//! source, and every parse failure surfaces to the caller as a structured
//! error.
//!
//! ```
//! use datemath::DateMathParser;
//!
//! let parser = DateMathParser::builder().build().unwrap();
//! let t = parser.resolve("2024.03.05||+1d").unwrap();
//! assert_eq!((t.year(), t.month(), t.day()), (2024, 3, 6));
//! ```
//!
//! ## Modules
//!
//! - [`unit`] — single-character unit codes → calendar/time units
//! - [`timestamp`] — timezone-bound instants with offsetting and rounding
//! - [`anchor`] — compiled patterns and literal anchor parsing
//! - [`math`] — the math-expression grammar and its application
//! - [`resolver`] — the configured entry point
//! - [`error`] — error types

pub mod anchor;
pub mod error;
pub mod math;
pub mod resolver;
pub mod timestamp;
pub mod unit;

pub use anchor::AnchorFormat;
pub use error::{DateMathError, Result};
pub use math::apply_math;
pub use resolver::{
    DateMathParser, DateMathParserBuilder, NowSource, DEFAULT_NOW_KEYWORD, DEFAULT_PATTERN,
};
pub use timestamp::Timestamp;
pub use unit::Unit;
