//! UCUM: text codec for the Unified Code for Units of Measure.
//!
//! This crate renders unit objects as UCUM expressions and parses UCUM
//! expressions back into units, in three variants: case-sensitive,
//! case-insensitive and print (output only).
//!
//! # Quick Start
//!
//! ```rust
//! use ucum_codec::{Prefix, UcumFormat, Variant};
//! use ucum_codec::symbols::catalog::{HOUR, METER};
//!
//! let codec = UcumFormat::new(Variant::CaseSensitive);
//!
//! let speed = METER.prefixed(Prefix::Kilo).divide(&HOUR);
//! assert_eq!(codec.format(&speed).unwrap(), "km/h");
//!
//! let parsed = codec.parse("km/h").unwrap();
//! assert_eq!(parsed, speed);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Units, prefixes and the converters between them
//! - [`symbols`]: Symbol tables and the built-in unit catalogue
//! - [`codec`]: Formatting, parsing and prefix classification
//! - [`error`]: Error types
//! - [`limits`]: Bounds applied while parsing
//!
//! # Security
//!
//! The parser accepts untrusted input:
//! - Input length, parenthesis nesting and exponents are bounded
//! - Exponents are bounded after combining nested groups, and numeric
//!   factors may not grow past a fixed size when raised to a power
//! - Every failure reports the byte offset of the offending token

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod symbols;

// Re-export commonly used types at crate root
pub use codec::{format_unit, parse_unit, Formatter, ParsePosition, Parser, UcumFormat};
pub use error::{ErrorCode, FormatError, LexError, ParseError};
pub use model::{Converter, Prefix, ProductUnit, Unit};
pub use symbols::{Resolved, SymbolMap, SymbolMapBuilder, Variant};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
