//! Unit to text rendering.
//!
//! Formatting tries an ordered list of strategies; the first one producing
//! a symbol wins. The order matters: the kilogram rule has to run before
//! the generic system-unit fallback.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed};
use tracing::trace;

use crate::codec::classify::classify;
use crate::error::FormatError;
use crate::model::{Converter, Prefix, Unit};
use crate::symbols::catalog::{GRAM, KILOGRAM};
use crate::symbols::{Resolved, SymbolMap, Variant};

type Strategy = fn(&Formatter<'_>, &Unit) -> Result<Option<String>, FormatError>;

const STRATEGIES: [(&str, Strategy); 6] = [
    ("lookup", lookup),
    ("transformed", transformed),
    ("kilogram", kilogram),
    ("product", product),
    ("system", system),
    ("symbol", bare_symbol),
];

/// Renders units in one variant using a symbol table.
#[derive(Debug, Clone, Copy)]
pub struct Formatter<'a> {
    variant: Variant,
    symbols: &'a SymbolMap,
}

impl<'a> Formatter<'a> {
    /// Creates a formatter.
    pub fn new(variant: Variant, symbols: &'a SymbolMap) -> Self {
        Self { variant, symbols }
    }

    /// Returns the variant this formatter writes.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Formats a unit.
    ///
    /// Fails with [`FormatError::UnsupportedUnit`] rather than emitting a
    /// lossy symbol when no strategy applies.
    pub fn format(&self, unit: &Unit) -> Result<String, FormatError> {
        if let Unit::Annotated { actual, annotation } = unit {
            return self.format_annotated(actual, annotation);
        }
        for (name, strategy) in STRATEGIES {
            if let Some(symbol) = strategy(self, unit)? {
                trace!(strategy = name, kind = unit.kind(), %symbol, "formatted unit");
                return Ok(symbol);
            }
        }
        Err(FormatError::UnsupportedUnit { kind: unit.kind() })
    }

    fn format_annotated(&self, actual: &Unit, annotation: &str) -> Result<String, FormatError> {
        let base = self.format(actual)?;
        if self.variant == Variant::Print {
            return Ok(if base.is_empty() {
                annotation.to_string()
            } else {
                format!("{base}({annotation})")
            });
        }
        if annotation.contains('}') {
            return Err(FormatError::InvalidAnnotation {
                annotation: annotation.to_string(),
            });
        }
        Ok(if is_compound(&base) {
            format!("({base}){{{annotation}}}")
        } else {
            format!("{base}{{{annotation}}}")
        })
    }

    /// Formats a nested unit, turning "no strategy applies" into `None` so
    /// the caller can fall through to the next strategy.
    fn format_part(&self, unit: &Unit) -> Result<Option<String>, FormatError> {
        match self.format(unit) {
            Ok(symbol) => Ok(Some(symbol)),
            Err(FormatError::UnsupportedUnit { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Appends the textual form of `converter` to `buf`, which holds the
    /// symbol of the unit being converted. `continued` is false when that
    /// unit is the dimensionless unit.
    fn append_converter(
        &self,
        buf: &mut String,
        converter: &Converter,
        continued: bool,
    ) -> Result<(), FormatError> {
        let converter = classify(&converter.canonical());
        if converter.is_identity() {
            return Ok(());
        }
        if let Some(prefix) = self.symbols.prefix_for(&converter) {
            if self.glue_prefix(buf, prefix) {
                return Ok(());
            }
        }
        match &converter {
            Converter::Multiply(factor) => {
                let integer = BigRational::from_float(*factor)
                    .filter(|value| value.is_positive() && value.is_integer())
                    .ok_or(FormatError::NonIntegerFactor { factor: *factor })?;
                append_factor(buf, integer.numer(), &BigInt::one(), continued);
            }
            Converter::Composite { inner, outer } if !converter.is_linear() => {
                self.append_converter(buf, inner, continued)?;
                self.append_converter(buf, outer, continued)?;
            }
            linear if linear.is_linear() => {
                let factor = linear
                    .exact_factor()
                    .filter(Signed::is_positive)
                    .ok_or_else(|| FormatError::UnsupportedFactor {
                        factor: linear.name(),
                    })?;
                append_factor(buf, factor.numer(), factor.denom(), continued);
            }
            other => {
                let inner = if buf.is_empty() { "1" } else { buf.as_str() };
                *buf = format!("{}({})", other.name(), inner);
            }
        }
        Ok(())
    }

    /// Glues a prefix symbol in front of `buf` if the result parses back to
    /// the same prefix on the same unit.
    fn glue_prefix(&self, buf: &mut String, prefix: Prefix) -> bool {
        if !self.symbols.is_prefixable(buf) {
            return false;
        }
        let Some(prefix_symbol) = self.symbols.prefix_symbol(prefix) else {
            return false;
        };
        let glued = format!("{prefix_symbol}{buf}");
        let expected = self.symbols.unit_for_symbol(buf);
        match self.symbols.resolve(&glued) {
            Some(Resolved::Prefixed { prefix: found, unit }) if found == prefix && Some(unit) == expected => {
                *buf = glued;
                true
            }
            _ => false,
        }
    }

    /// Moves a prefix-sized transform of the kilogram onto the gram, so
    /// that `mg` gets a prefix instead of a factor on `kg`. Other factors
    /// stay on the kilogram (`kg.2`).
    fn rebase(&self, parent: &Unit, converter: &Converter) -> (Unit, Converter) {
        if *parent == *KILOGRAM && converter.is_linear() && self.symbols.symbol_for(&GRAM).is_some() {
            let rebased = classify(&converter.then(&Prefix::Kilo.converter()).canonical());
            if rebased.is_identity() || self.symbols.prefix_for(&rebased).is_some() {
                return (GRAM.clone(), rebased);
            }
        }
        (parent.clone(), converter.clone())
    }
}

fn lookup(f: &Formatter<'_>, unit: &Unit) -> Result<Option<String>, FormatError> {
    Ok(f.symbols.symbol_for(unit).map(str::to_string))
}

fn transformed(f: &Formatter<'_>, unit: &Unit) -> Result<Option<String>, FormatError> {
    let Unit::Transformed { parent, converter } = unit else {
        return Ok(None);
    };
    let (parent, converter) = f.rebase(parent, converter);

    if let Converter::Composite { inner, outer } = &converter {
        let head = parent.transform((**outer).clone());
        if let Some(symbol) = f.symbols.symbol_for(&head) {
            let mut buf = symbol.to_string();
            f.append_converter(&mut buf, inner, true)?;
            return Ok(Some(buf));
        }
    }

    let Some(mut buf) = f.format_part(&parent)? else {
        return Ok(None);
    };
    f.append_converter(&mut buf, &converter, !parent.is_one())?;
    Ok(Some(buf))
}

fn kilogram(f: &Formatter<'_>, unit: &Unit) -> Result<Option<String>, FormatError> {
    if !unit.is_system_unit() || unit.system_unit() != *KILOGRAM {
        return Ok(None);
    }
    let Some(gram) = f.symbols.symbol_for(&GRAM) else {
        return Ok(None);
    };
    let mut buf = gram.to_string();
    f.append_converter(&mut buf, &Prefix::Kilo.converter(), true)?;
    Ok(Some(buf))
}

fn product(f: &Formatter<'_>, unit: &Unit) -> Result<Option<String>, FormatError> {
    let Unit::Product(product) = unit else {
        return Ok(None);
    };
    if product.is_empty() {
        return Ok(Some(String::new()));
    }

    let mut numerator = Vec::new();
    let mut denominator = Vec::new();
    for (factor, exponent) in product.factors() {
        let Some(symbol) = f.format_part(factor)? else {
            return Ok(None);
        };
        let magnitude = exponent.unsigned_abs();
        let needs_group = is_compound(&symbol)
            || (magnitude > 1
                && (matches!(factor, Unit::Annotated { .. })
                    || symbol.ends_with(|c: char| c.is_ascii_digit())));
        let mut element = if needs_group { format!("({symbol})") } else { symbol };
        if magnitude > 1 {
            element.push_str(&magnitude.to_string());
        }
        if *exponent > 0 {
            numerator.push(element);
        } else {
            denominator.push(element);
        }
    }

    let mut buf = if numerator.is_empty() {
        "1".to_string()
    } else {
        numerator.join(".")
    };
    match denominator.len() {
        0 => {}
        1 => {
            buf.push('/');
            buf.push_str(&denominator[0]);
        }
        _ => {
            buf.push_str("/(");
            buf.push_str(&denominator.join("."));
            buf.push(')');
        }
    }
    Ok(Some(buf))
}

fn system(f: &Formatter<'_>, unit: &Unit) -> Result<Option<String>, FormatError> {
    if unit.is_system_unit() {
        return Ok(None);
    }
    let Some(converter) = unit.converter_to_system() else {
        return Ok(None);
    };
    let system_unit = unit.system_unit();
    let Some(mut buf) = f.format_part(&system_unit)? else {
        return Ok(None);
    };
    f.append_converter(&mut buf, &converter, !system_unit.is_one())?;
    Ok(Some(buf))
}

fn bare_symbol(_: &Formatter<'_>, unit: &Unit) -> Result<Option<String>, FormatError> {
    Ok(unit.symbol().map(str::to_string))
}

/// Appends `.p/q`, omitting a part equal to one.
fn append_factor(buf: &mut String, numer: &BigInt, denom: &BigInt, continued: bool) {
    if is_compound(buf) {
        *buf = format!("({buf})");
    }
    if !numer.is_one() {
        if continued {
            buf.push('.');
        }
        buf.push_str(&numer.to_string());
    }
    if !denom.is_one() {
        buf.push('/');
        buf.push_str(&denom.to_string());
    }
}

/// Returns true if `symbol` has a `.` or `/` outside any grouping.
fn is_compound(symbol: &str) -> bool {
    let mut depth = 0usize;
    for c in symbol.chars() {
        match c {
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => depth = depth.saturating_sub(1),
            '.' | '/' if depth == 0 => return true,
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::catalog::{
        CELSIUS, COULOMB, HOUR, JOULE, KELVIN, LITER, METER, MINUTE, MOLE, NEWTON, PERCENT, SECOND,
    };

    fn cs() -> Formatter<'static> {
        Formatter::new(Variant::CaseSensitive, SymbolMap::for_variant(Variant::CaseSensitive))
    }

    fn fmt(unit: &Unit) -> String {
        cs().format(unit).unwrap()
    }

    #[test]
    fn test_kilogram_and_gram() {
        assert_eq!(fmt(&KILOGRAM), "kg");
        assert_eq!(fmt(&GRAM), "g");
        assert_eq!(fmt(&GRAM.prefixed(Prefix::Milli)), "mg");
        assert_eq!(fmt(&KILOGRAM.transform(Converter::PowerOfTen(-6))), "mg");
        assert_eq!(fmt(&KILOGRAM.transform(Converter::PowerOfTen(3))), "Mg");
        assert_eq!(fmt(&KILOGRAM.transform(Converter::rational(3, 1))), "kg.3");
    }

    #[test]
    fn test_product_parenthesisation() {
        let unit = JOULE.divide(&KELVIN).divide(&MOLE);
        assert_eq!(fmt(&unit), "J/(K.mol)");
        assert_eq!(fmt(&METER.divide(&SECOND)), "m/s");
        assert_eq!(fmt(&SECOND.inverse()), "1/s");
    }

    #[test]
    fn test_exponent_omission() {
        assert_eq!(fmt(&METER.pow(2)), "m2");
        assert_eq!(fmt(&METER.divide(&SECOND.pow(2))), "m/s2");
        assert_eq!(fmt(&METER.multiply(&SECOND)), "m.s");
        assert_eq!(fmt(&KILOGRAM.multiply(&METER).divide(&SECOND.pow(2))), "kg.m/s2");
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(fmt(&METER.prefixed(Prefix::Kilo)), "km");
        assert_eq!(fmt(&METER.transform(Converter::Multiply(1000.0))), "km");
        assert_eq!(fmt(&METER.transform(Converter::Multiply(0.001))), "mm");
        assert_eq!(fmt(&METER.prefixed(Prefix::Deka)), "dam");
        assert_eq!(fmt(&LITER.prefixed(Prefix::Milli)), "mL");
        assert_eq!(fmt(&METER.prefixed(Prefix::Micro)), "um");
        assert_eq!(fmt(&CELSIUS.prefixed(Prefix::Milli)), "mCel");
    }

    #[test]
    fn test_prefix_on_non_metric_unit_is_numeric() {
        assert_eq!(fmt(&HOUR.prefixed(Prefix::Kilo)), "h.1000");
        assert_eq!(fmt(&MINUTE.prefixed(Prefix::Milli)), "min/1000");
        assert_eq!(fmt(&METER.pow(2).prefixed(Prefix::Kilo)), "m2.1000");
        assert_eq!(fmt(&METER.divide(&SECOND).prefixed(Prefix::Kilo)), "(m/s).1000");
    }

    #[test]
    fn test_factors() {
        assert_eq!(fmt(&METER.transform(Converter::rational(60, 1))), "m.60");
        assert_eq!(fmt(&METER.transform(Converter::rational(1, 60))), "m/60");
        assert_eq!(fmt(&METER.transform(Converter::rational(3, 2))), "m.3/2");
        assert_eq!(fmt(&Unit::one().transform(Converter::rational(1000, 1))), "1000");
        assert_eq!(fmt(&Unit::one().transform(Converter::rational(1, 1000))), "/1000");
        assert_eq!(fmt(&Unit::one()), "");
    }

    #[test]
    fn test_non_integer_multiply_fails() {
        let err = cs()
            .format(&METER.transform(Converter::Multiply(2.5)))
            .unwrap_err();
        assert_eq!(err, FormatError::NonIntegerFactor { factor: 2.5 });
    }

    #[test]
    fn test_table_entries_win() {
        assert_eq!(fmt(&NEWTON), "N");
        assert_eq!(fmt(&HOUR), "h");
        assert_eq!(fmt(&CELSIUS), "Cel");
        assert_eq!(fmt(&PERCENT), "%");
        assert_eq!(fmt(&METER.pow(3).transform(Converter::PowerOfTen(-3))), "L");
    }

    #[test]
    fn test_annotations() {
        let rbc = LITER.annotate("RBC");
        assert_eq!(fmt(&rbc), "L{RBC}");
        let print = Formatter::new(Variant::Print, SymbolMap::for_variant(Variant::Print));
        assert_eq!(print.format(&rbc).unwrap(), "L(RBC)");
        assert_eq!(print.format(&Unit::one().annotate("tot")).unwrap(), "tot");
        assert_eq!(fmt(&Unit::one().annotate("tot")), "{tot}");
        assert_eq!(fmt(&METER.divide(&SECOND).annotate("x")), "(m/s){x}");
        assert_eq!(fmt(&METER.annotate("x").pow(2)), "(m{x})2");
        assert_eq!(
            cs().format(&METER.annotate("a}b")),
            Err(FormatError::InvalidAnnotation {
                annotation: "a}b".to_string()
            })
        );
    }

    #[test]
    fn test_other_variants() {
        let ci = Formatter::new(
            Variant::CaseInsensitive,
            SymbolMap::for_variant(Variant::CaseInsensitive),
        );
        assert_eq!(ci.format(&KILOGRAM).unwrap(), "KG");
        assert_eq!(ci.format(&METER.prefixed(Prefix::Mega)).unwrap(), "MAM");
        assert_eq!(ci.format(&COULOMB.prefixed(Prefix::Milli)).unwrap(), "MC");

        let print = Formatter::new(Variant::Print, SymbolMap::for_variant(Variant::Print));
        assert_eq!(print.format(&METER.prefixed(Prefix::Micro)).unwrap(), "μm");
        assert_eq!(print.format(&CELSIUS).unwrap(), "°C");
    }

    #[test]
    fn test_unknown_units() {
        let empty = SymbolMap::default();
        let formatter = Formatter::new(Variant::CaseSensitive, &empty);
        assert_eq!(formatter.format(&Unit::base("x")).unwrap(), "x");
        assert_eq!(
            formatter.format(&Unit::base("")),
            Err(FormatError::UnsupportedUnit { kind: "BaseUnit" })
        );
        assert_eq!(
            formatter.format(&Unit::base("").multiply(&METER)),
            Err(FormatError::UnsupportedUnit { kind: "ProductUnit" })
        );
    }

    #[test]
    fn test_non_linear_fallback() {
        let bel = Unit::one().transform(Converter::Logarithmic { base: 10.0 });
        assert_eq!(fmt(&bel), "lg(1)");
    }

    #[test]
    fn test_is_compound() {
        assert!(is_compound("m/s"));
        assert!(is_compound("m.s"));
        assert!(!is_compound("(m/s)"));
        assert!(!is_compound("m{a.b}"));
        assert!(!is_compound("[in_i]"));
    }
}
