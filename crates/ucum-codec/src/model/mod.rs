//! Unit model types.
//!
//! This module contains the algebraic representation of units:
//! - Converters (identity, scale factors, prefixes, offsets, logarithms)
//! - Prefixes (metric and binary)
//! - Units (base, alternate, product, transformed, annotated)

pub mod converter;
pub mod prefix;
pub mod unit;

pub use converter::Converter;
pub use prefix::Prefix;
pub use unit::{ProductUnit, Unit};
