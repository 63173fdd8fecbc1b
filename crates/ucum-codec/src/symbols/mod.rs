//! Symbol tables mapping units and prefixes to their UCUM symbols.
//!
//! A [`SymbolMap`] is built once per [`Variant`] and never mutated
//! afterwards. Every labelled entry is symmetric: the formatter emits the
//! symbol and the parser resolves the same symbol back to the unit.

pub mod catalog;

use std::fmt;

use rustc_hash::FxHashMap;

use crate::model::{Converter, Prefix, Unit};

/// The textual style of a unit expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Case-sensitive UCUM codes (`mL`, `Pa`).
    CaseSensitive,
    /// Upper-case UCUM codes for case-insensitive systems (`ML`, `PAL`).
    CaseInsensitive,
    /// Human-readable print symbols (`μm`, `°C`); format only.
    Print,
}

impl Variant {
    /// All variants, in declaration order.
    pub const ALL: [Variant; 3] = [Variant::CaseSensitive, Variant::CaseInsensitive, Variant::Print];

    /// Returns a short name for the variant.
    pub fn name(self) -> &'static str {
        match self {
            Variant::CaseSensitive => "case-sensitive",
            Variant::CaseInsensitive => "case-insensitive",
            Variant::Print => "print",
        }
    }

    /// Returns true if expressions in this variant can be parsed.
    pub fn is_parseable(self) -> bool {
        !matches!(self, Variant::Print)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A symbol resolved against a [`SymbolMap`].
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    /// The symbol names a unit directly.
    Unit(&'a Unit),
    /// The symbol is a prefix glued to a prefixable unit symbol.
    Prefixed { prefix: Prefix, unit: &'a Unit },
}

impl Resolved<'_> {
    /// Builds the unit the symbol denotes.
    pub fn to_unit(&self) -> Unit {
        match self {
            Resolved::Unit(unit) => (*unit).clone(),
            Resolved::Prefixed { prefix, unit } => unit.prefixed(*prefix),
        }
    }
}

#[derive(Debug, Clone)]
struct SymbolEntry {
    unit: Unit,
    prefixable: bool,
}

/// Bidirectional unit and prefix symbol registry for one variant.
#[derive(Debug, Clone, Default)]
pub struct SymbolMap {
    unit_symbols: FxHashMap<Unit, String>,
    symbol_units: FxHashMap<String, SymbolEntry>,
    prefix_symbols: FxHashMap<Prefix, String>,
    symbol_prefixes: FxHashMap<String, Prefix>,
    /// Longest prefix symbol in bytes.
    max_prefix_len: usize,
}

impl SymbolMap {
    /// Starts building a symbol map.
    pub fn builder() -> SymbolMapBuilder {
        SymbolMapBuilder::new()
    }

    /// Returns the built-in UCUM table for a variant.
    ///
    /// The table is built on first use and shared for the process lifetime.
    pub fn for_variant(variant: Variant) -> &'static SymbolMap {
        catalog::symbol_map(variant)
    }

    /// Returns the symbol of a unit with an explicit entry.
    pub fn symbol_for(&self, unit: &Unit) -> Option<&str> {
        self.unit_symbols.get(unit).map(String::as_str)
    }

    /// Returns the prefix a converter stands for, if this map has a symbol
    /// for it.
    pub fn prefix_for(&self, converter: &Converter) -> Option<Prefix> {
        Prefix::from_converter(converter).filter(|prefix| self.prefix_symbols.contains_key(prefix))
    }

    /// Returns the symbol of a prefix.
    pub fn prefix_symbol(&self, prefix: Prefix) -> Option<&str> {
        self.prefix_symbols.get(&prefix).map(String::as_str)
    }

    /// Returns the unit registered under `symbol`.
    pub fn unit_for_symbol(&self, symbol: &str) -> Option<&Unit> {
        self.symbol_units.get(symbol).map(|entry| &entry.unit)
    }

    /// Returns the prefix registered under `symbol`.
    pub fn prefix_for_symbol(&self, symbol: &str) -> Option<Prefix> {
        self.symbol_prefixes.get(symbol).copied()
    }

    /// Returns true if `symbol` names a unit that accepts prefixes.
    pub fn is_prefixable(&self, symbol: &str) -> bool {
        self.symbol_units
            .get(symbol)
            .is_some_and(|entry| entry.prefixable)
    }

    /// Resolves a terminal symbol.
    ///
    /// A full unit match wins; otherwise the longest prefix that leaves a
    /// registered prefixable unit symbol is used.
    pub fn resolve(&self, symbol: &str) -> Option<Resolved<'_>> {
        if let Some(entry) = self.symbol_units.get(symbol) {
            return Some(Resolved::Unit(&entry.unit));
        }
        let longest = self.max_prefix_len.min(symbol.len().saturating_sub(1));
        for len in (1..=longest).rev() {
            if !symbol.is_char_boundary(len) {
                continue;
            }
            let (head, tail) = symbol.split_at(len);
            let Some(&prefix) = self.symbol_prefixes.get(head) else {
                continue;
            };
            if let Some(entry) = self.symbol_units.get(tail) {
                if entry.prefixable {
                    return Some(Resolved::Prefixed {
                        prefix,
                        unit: &entry.unit,
                    });
                }
            }
        }
        None
    }

    /// Iterates over labelled units and their symbols.
    pub fn units(&self) -> impl Iterator<Item = (&Unit, &str)> {
        self.unit_symbols
            .iter()
            .map(|(unit, symbol)| (unit, symbol.as_str()))
    }

    /// Iterates over prefixes and their symbols.
    pub fn prefixes(&self) -> impl Iterator<Item = (Prefix, &str)> {
        self.prefix_symbols
            .iter()
            .map(|(prefix, symbol)| (*prefix, symbol.as_str()))
    }

    /// Returns the number of labelled units.
    pub fn len(&self) -> usize {
        self.unit_symbols.len()
    }

    /// Returns true if no unit is labelled.
    pub fn is_empty(&self) -> bool {
        self.unit_symbols.is_empty()
    }
}

/// Builder for a [`SymbolMap`].
///
/// # Example
///
/// ```rust
/// use ucum_codec::{Prefix, SymbolMap, Unit};
///
/// let meter = Unit::base("m");
/// let symbols = SymbolMap::builder()
///     .label_metric(meter.clone(), "m")
///     .prefix(Prefix::Kilo, "k")
///     .build();
///
/// assert_eq!(symbols.symbol_for(&meter), Some("m"));
/// assert_eq!(symbols.resolve("km").map(|r| r.to_unit()), Some(meter.prefixed(Prefix::Kilo)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SymbolMapBuilder {
    map: SymbolMap,
}

impl SymbolMapBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels a unit that does not accept prefixes.
    pub fn label(self, unit: Unit, symbol: impl Into<String>) -> Self {
        self.entry(unit, symbol.into(), false)
    }

    /// Labels a metric unit; prefixes may be glued to its symbol.
    pub fn label_metric(self, unit: Unit, symbol: impl Into<String>) -> Self {
        self.entry(unit, symbol.into(), true)
    }

    /// Registers an extra parse-only symbol for a unit.
    ///
    /// The alias accepts prefixes if the unit's labelled symbol does.
    pub fn alias(mut self, unit: Unit, symbol: impl Into<String>) -> Self {
        let prefixable = self
            .map
            .unit_symbols
            .get(&unit)
            .and_then(|labelled| self.map.symbol_units.get(labelled))
            .is_some_and(|entry| entry.prefixable);
        self.map
            .symbol_units
            .insert(symbol.into(), SymbolEntry { unit, prefixable });
        self
    }

    /// Labels a prefix.
    pub fn prefix(mut self, prefix: Prefix, symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        self.map.max_prefix_len = self.map.max_prefix_len.max(symbol.len());
        if let Some(previous) = self.map.prefix_symbols.insert(prefix, symbol.clone()) {
            self.map.symbol_prefixes.remove(&previous);
        }
        self.map.symbol_prefixes.insert(symbol, prefix);
        self
    }

    /// Finishes the map.
    pub fn build(self) -> SymbolMap {
        self.map
    }

    fn entry(mut self, unit: Unit, symbol: String, prefixable: bool) -> Self {
        if let Some(previous) = self.map.unit_symbols.insert(unit.clone(), symbol.clone()) {
            self.map.symbol_units.remove(&previous);
        }
        self.map
            .symbol_units
            .insert(symbol, SymbolEntry { unit, prefixable });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SymbolMap {
        let meter = Unit::base("m");
        let annum = Unit::base("a");
        SymbolMap::builder()
            .label_metric(meter.clone(), "m")
            .label(annum, "a")
            .label_metric(Unit::base("mol"), "mol")
            .prefix(Prefix::Milli, "m")
            .prefix(Prefix::Deka, "da")
            .prefix(Prefix::Deci, "d")
            .prefix(Prefix::Atto, "a")
            .build()
    }

    #[test]
    fn test_full_match_wins() {
        let symbols = sample();
        assert_eq!(symbols.resolve("mol"), Some(Resolved::Unit(&Unit::base("mol"))));
        assert_eq!(symbols.resolve("m"), Some(Resolved::Unit(&Unit::base("m"))));
    }

    #[test]
    fn test_longest_prefix_wins() {
        let symbols = sample();
        let meter = Unit::base("m");
        assert_eq!(
            symbols.resolve("dam"),
            Some(Resolved::Prefixed {
                prefix: Prefix::Deka,
                unit: &meter,
            })
        );
        assert_eq!(
            symbols.resolve("mm"),
            Some(Resolved::Prefixed {
                prefix: Prefix::Milli,
                unit: &meter,
            })
        );
    }

    #[test]
    fn test_non_metric_units_reject_prefixes() {
        let symbols = sample();
        assert_eq!(symbols.resolve("da"), None);
        assert_eq!(symbols.resolve("ma"), None);
        assert!(symbols.resolve("am").is_some());
    }

    #[test]
    fn test_relabel_replaces_inverse_entry() {
        let meter = Unit::base("m");
        let symbols = SymbolMap::builder()
            .label(meter.clone(), "meter")
            .label(meter.clone(), "m")
            .build();
        assert_eq!(symbols.symbol_for(&meter), Some("m"));
        assert_eq!(symbols.unit_for_symbol("meter"), None);
    }

    #[test]
    fn test_alias_inherits_prefixable() {
        let liter = Unit::base("L");
        let symbols = SymbolMap::builder()
            .label_metric(liter.clone(), "L")
            .alias(liter.clone(), "l")
            .prefix(Prefix::Milli, "m")
            .build();
        assert_eq!(symbols.symbol_for(&liter), Some("L"));
        assert_eq!(symbols.resolve("ml").map(|r| r.to_unit()), Some(liter.prefixed(Prefix::Milli)));
    }

    #[test]
    fn test_prefix_for_requires_symbol() {
        let symbols = sample();
        assert_eq!(symbols.prefix_for(&Converter::PowerOfTen(-3)), Some(Prefix::Milli));
        assert_eq!(symbols.prefix_for(&Converter::PowerOfTen(3)), None);
        assert_eq!(symbols.prefix_for(&Converter::Multiply(0.001)), None);
    }

    #[test]
    fn test_non_ascii_prefix_symbols() {
        let meter = Unit::base("m");
        let symbols = SymbolMap::builder()
            .label_metric(meter.clone(), "m")
            .prefix(Prefix::Micro, "μ")
            .build();
        assert_eq!(symbols.resolve("μm").map(|r| r.to_unit()), Some(meter.prefixed(Prefix::Micro)));
        assert_eq!(symbols.resolve("μ"), None);
    }
}
