//! UCUM text codec.
//!
//! [`UcumFormat`] pairs a [`Variant`] with a symbol table and exposes both
//! directions: [`Formatter`] renders units, [`Parser`] reads them back.
//! Only the case-sensitive and case-insensitive variants can be parsed;
//! the print variant is output only.

pub mod classify;
pub mod format;
pub mod lexer;
pub mod parse;

pub use classify::classify;
pub use format::Formatter;
pub use parse::{ParsePosition, Parser};

use crate::error::{FormatError, ParseError};
use crate::model::Unit;
use crate::symbols::{SymbolMap, Variant};

/// A UCUM codec for one variant.
#[derive(Debug, Clone, Copy)]
pub struct UcumFormat<'a> {
    variant: Variant,
    symbols: &'a SymbolMap,
}

impl UcumFormat<'static> {
    /// Creates a codec over the built-in symbol table of `variant`.
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            symbols: SymbolMap::for_variant(variant),
        }
    }
}

impl<'a> UcumFormat<'a> {
    /// Creates a codec over a custom symbol table.
    pub fn with_symbols(variant: Variant, symbols: &'a SymbolMap) -> Self {
        Self { variant, symbols }
    }

    /// Returns the variant this codec reads and writes.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Returns the symbol table used to resolve and render symbols.
    pub fn symbols(&self) -> &'a SymbolMap {
        self.symbols
    }

    /// Renders `unit` as text.
    pub fn format(&self, unit: &Unit) -> Result<String, FormatError> {
        Formatter::new(self.variant, self.symbols).format(unit)
    }

    /// Parses a complete expression.
    pub fn parse(&self, input: &str) -> Result<Unit, ParseError> {
        Parser::new(self.variant, self.symbols).parse(input)
    }

    /// Parses an expression starting at `position.index` and advances the
    /// cursor past it.
    pub fn parse_at(&self, input: &str, position: &mut ParsePosition) -> Result<Unit, ParseError> {
        Parser::new(self.variant, self.symbols).parse_at(input, position)
    }
}

/// Formats `unit` with the built-in table of `variant`.
pub fn format_unit(unit: &Unit, variant: Variant) -> Result<String, FormatError> {
    UcumFormat::new(variant).format(unit)
}

/// Parses `input` with the built-in table of `variant`.
pub fn parse_unit(input: &str, variant: Variant) -> Result<Unit, ParseError> {
    UcumFormat::new(variant).parse(input)
}
