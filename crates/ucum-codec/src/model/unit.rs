//! The algebraic unit value type.
//!
//! Units are immutable values built from base units with `multiply`,
//! `divide`, `pow`, `transform` and `annotate`. Every unit reaches exactly
//! one system unit by following its parent links.

use std::hash::{Hash, Hasher};

use num_rational::BigRational;
use rustc_hash::FxHasher;

use crate::model::{Converter, Prefix};

/// A unit of measure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Unit {
    /// An atomic dimension such as the metre or the second.
    Base { symbol: String },

    /// A system unit with its own symbol, dimensionally equal to `parent`
    /// (the steradian over `rad2`, the newton over `kg.m/s2`).
    Alternate { parent: Box<Unit>, symbol: String },

    /// A product of units raised to integer powers. The empty product is
    /// the dimensionless unit.
    Product(ProductUnit),

    /// A unit derived from `parent`; `converter` maps values of this unit
    /// onto `parent`.
    Transformed {
        parent: Box<Unit>,
        converter: Converter,
    },

    /// A unit carrying free-text metadata that does not affect its value.
    Annotated { actual: Box<Unit>, annotation: String },
}

/// Factors of a product unit with their exponents.
///
/// Factors are merged (no unit appears twice) and never carry a zero
/// exponent. Equality and hashing ignore factor order.
#[derive(Debug, Clone, Default)]
pub struct ProductUnit {
    factors: Vec<(Unit, i32)>,
}

impl ProductUnit {
    /// Returns the factors in encounter order.
    pub fn factors(&self) -> &[(Unit, i32)] {
        &self.factors
    }

    /// Returns the number of distinct factors.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Returns true for the dimensionless unit.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Returns the exponent of `unit` in this product.
    pub fn exponent_of(&self, unit: &Unit) -> Option<i32> {
        self.factors
            .iter()
            .find(|(factor, _)| factor == unit)
            .map(|(_, exponent)| *exponent)
    }
}

impl PartialEq for ProductUnit {
    fn eq(&self, other: &Self) -> bool {
        self.factors.len() == other.factors.len()
            && self
                .factors
                .iter()
                .all(|(unit, exponent)| other.exponent_of(unit) == Some(*exponent))
    }
}

impl Eq for ProductUnit {}

impl Hash for ProductUnit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-independent: sum the per-factor hashes.
        let mut combined: u64 = 0;
        for (unit, exponent) in &self.factors {
            let mut hasher = FxHasher::default();
            unit.hash(&mut hasher);
            exponent.hash(&mut hasher);
            combined = combined.wrapping_add(hasher.finish());
        }
        self.factors.len().hash(state);
        combined.hash(state);
    }
}

impl Unit {
    /// The dimensionless unit.
    pub fn one() -> Unit {
        Unit::Product(ProductUnit::default())
    }

    /// Creates a base unit.
    pub fn base(symbol: impl Into<String>) -> Unit {
        Unit::Base {
            symbol: symbol.into(),
        }
    }

    /// Creates a system unit with its own symbol over `parent`.
    pub fn alternate(parent: Unit, symbol: impl Into<String>) -> Unit {
        Unit::Alternate {
            parent: Box::new(parent),
            symbol: symbol.into(),
        }
    }

    /// Returns true for the dimensionless unit.
    pub fn is_one(&self) -> bool {
        matches!(self, Unit::Product(product) if product.is_empty())
    }

    /// Returns the name of the unit's variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Unit::Base { .. } => "BaseUnit",
            Unit::Alternate { .. } => "AlternateUnit",
            Unit::Product(_) => "ProductUnit",
            Unit::Transformed { .. } => "TransformedUnit",
            Unit::Annotated { .. } => "AnnotatedUnit",
        }
    }

    /// Returns the unit's intrinsic symbol, if it has a non-empty one.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Unit::Base { symbol } | Unit::Alternate { symbol, .. } if !symbol.is_empty() => {
                Some(symbol.as_str())
            }
            _ => None,
        }
    }

    /// Derives a unit from this one; `converter` maps the new unit's values
    /// onto this unit.
    ///
    /// Transforms nest so that the parent chain is preserved, except for
    /// pure numbers, whose linear converters fold into one.
    pub fn transform(&self, converter: Converter) -> Unit {
        if converter.is_identity() {
            return self.clone();
        }
        if self.is_one() {
            return Unit::Transformed {
                parent: Box::new(Unit::one()),
                converter,
            };
        }
        if let Some(existing) = self.pure_number() {
            if converter.is_linear() {
                return Unit::one().transform(converter.then(existing));
            }
        }
        Unit::Transformed {
            parent: Box::new(self.clone()),
            converter,
        }
    }

    /// Applies a prefix (`Kilo` turns the metre into the kilometre).
    pub fn prefixed(&self, prefix: Prefix) -> Unit {
        self.transform(prefix.converter())
    }

    /// Scales the unit by an exact factor (`m.1000`).
    pub fn scale(&self, factor: BigRational) -> Unit {
        self.transform(Converter::factor(factor))
    }

    /// Attaches an annotation.
    pub fn annotate(&self, annotation: impl Into<String>) -> Unit {
        Unit::Annotated {
            actual: Box::new(self.clone()),
            annotation: annotation.into(),
        }
    }

    /// Multiplies two units.
    pub fn multiply(&self, other: &Unit) -> Unit {
        if self.is_one() {
            return other.clone();
        }
        if other.is_one() {
            return self.clone();
        }
        if let Some(converter) = other.pure_number() {
            return self.transform(converter.clone());
        }
        if let Some(converter) = self.pure_number() {
            return other.transform(converter.clone());
        }

        let mut factors = self.factors();
        for (unit, exponent) in other.factors() {
            match factors.iter_mut().find(|(existing, _)| *existing == unit) {
                Some((_, existing)) => *existing = existing.saturating_add(exponent),
                None => factors.push((unit, exponent)),
            }
        }
        Unit::from_factors(factors)
    }

    /// Divides this unit by another.
    pub fn divide(&self, other: &Unit) -> Unit {
        self.multiply(&other.inverse())
    }

    /// Returns the reciprocal unit.
    pub fn inverse(&self) -> Unit {
        self.pow(-1)
    }

    /// Raises the unit to an integer power.
    pub fn pow(&self, exponent: i32) -> Unit {
        match exponent {
            0 => return Unit::one(),
            1 => return self.clone(),
            _ => {}
        }
        if let Some(raised) = self.pure_number().and_then(|converter| converter.pow(exponent)) {
            return Unit::one().transform(raised);
        }
        let factors = match self {
            Unit::Product(product) => product
                .factors
                .iter()
                .map(|(unit, e)| (unit.clone(), e.saturating_mul(exponent)))
                .collect(),
            other => vec![(other.clone(), exponent)],
        };
        Unit::from_factors(factors)
    }

    /// Returns the system unit reached by following parent links.
    pub fn system_unit(&self) -> Unit {
        match self {
            Unit::Base { .. } | Unit::Alternate { .. } => self.clone(),
            Unit::Product(product) => product
                .factors
                .iter()
                .fold(Unit::one(), |acc, (unit, exponent)| {
                    acc.multiply(&unit.system_unit().pow(*exponent))
                }),
            Unit::Transformed { parent, .. } => parent.system_unit(),
            Unit::Annotated { actual, .. } => actual.system_unit(),
        }
    }

    /// Returns true if the unit is its own system unit.
    pub fn is_system_unit(&self) -> bool {
        match self {
            Unit::Base { .. } | Unit::Alternate { .. } => true,
            Unit::Product(product) => product.factors.iter().all(|(unit, _)| unit.is_system_unit()),
            Unit::Transformed { .. } => false,
            Unit::Annotated { actual, .. } => actual.is_system_unit(),
        }
    }

    /// Returns the converter from this unit to its system unit.
    ///
    /// Products only compose linear factor converters; `None` is returned
    /// when a factor carries a non-linear one.
    pub fn converter_to_system(&self) -> Option<Converter> {
        match self {
            Unit::Base { .. } | Unit::Alternate { .. } => Some(Converter::Identity),
            Unit::Transformed { parent, converter } => {
                Some(converter.then(&parent.converter_to_system()?))
            }
            Unit::Annotated { actual, .. } => actual.converter_to_system(),
            Unit::Product(product) => {
                let mut combined = Converter::Identity;
                for (unit, exponent) in &product.factors {
                    let converter = unit.converter_to_system()?;
                    if converter.is_identity() {
                        continue;
                    }
                    combined = combined.then(&converter.pow(*exponent)?);
                }
                Some(combined)
            }
        }
    }

    /// Returns true if both units denote the same scale of the same system
    /// unit, regardless of how they were built.
    pub fn is_equivalent(&self, other: &Unit) -> bool {
        if self == other {
            return true;
        }
        self.system_unit() == other.system_unit()
            && match (self.converter_to_system(), other.converter_to_system()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
    }

    /// Returns the converter of a dimensionless scaled unit (`%`, `10.1000`).
    fn pure_number(&self) -> Option<&Converter> {
        match self {
            Unit::Transformed { parent, converter } if parent.is_one() && converter.is_linear() => {
                Some(converter)
            }
            _ => None,
        }
    }

    fn factors(&self) -> Vec<(Unit, i32)> {
        match self {
            Unit::Product(product) => product.factors.clone(),
            other => vec![(other.clone(), 1)],
        }
    }

    fn from_factors(mut factors: Vec<(Unit, i32)>) -> Unit {
        factors.retain(|(_, exponent)| *exponent != 0);
        if factors.len() == 1 && factors[0].1 == 1 {
            if let Some((unit, _)) = factors.pop() {
                return unit;
            }
        }
        Unit::Product(ProductUnit { factors })
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use super::*;

    fn meter() -> Unit {
        Unit::base("m")
    }

    fn second() -> Unit {
        Unit::base("s")
    }

    #[test]
    fn test_one_is_neutral() {
        assert_eq!(meter().multiply(&Unit::one()), meter());
        assert_eq!(Unit::one().multiply(&meter()), meter());
        assert!(meter().divide(&meter()).is_one());
        assert!(meter().pow(0).is_one());
    }

    #[test]
    fn test_product_merges_and_collapses() {
        let area = meter().multiply(&meter());
        match &area {
            Unit::Product(product) => assert_eq!(product.exponent_of(&meter()), Some(2)),
            other => panic!("expected product, got {:?}", other),
        }
        assert_eq!(area.divide(&meter()), meter());
    }

    #[test]
    fn test_product_equality_ignores_order() {
        let a = meter().divide(&second());
        let b = second().inverse().multiply(&meter());
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_transform_nests_and_identity_is_noop() {
        let km = meter().prefixed(Prefix::Kilo);
        assert_eq!(
            km,
            Unit::Transformed {
                parent: Box::new(meter()),
                converter: Converter::Multiply(1000.0),
            }
        );
        assert_eq!(meter().transform(Converter::Identity), meter());

        let nested = km.transform(Converter::rational(2, 1));
        match nested {
            Unit::Transformed { parent, .. } => assert_eq!(*parent, km),
            other => panic!("expected transformed, got {:?}", other),
        }
    }

    #[test]
    fn test_pure_numbers_fold() {
        let thousand = Unit::one().scale(BigRational::from_integer(BigInt::from(1000)));
        let million = thousand.multiply(&thousand);
        assert_eq!(
            million,
            Unit::Transformed {
                parent: Box::new(Unit::one()),
                converter: Converter::PowerOfTen(6),
            }
        );
        assert_eq!(
            meter().multiply(&thousand),
            meter().transform(Converter::PowerOfTen(3))
        );
        assert_eq!(
            thousand.inverse(),
            Unit::one().transform(Converter::PowerOfTen(-3))
        );
    }

    #[test]
    fn test_system_unit() {
        let kg = Unit::base("kg");
        let gram = kg.transform(Converter::rational(1, 1000));
        let per_gram = meter().divide(&gram);
        assert_eq!(per_gram.system_unit(), meter().divide(&kg));
        assert!(!per_gram.is_system_unit());
        assert_eq!(
            per_gram.converter_to_system(),
            Some(Converter::PowerOfTen(3))
        );

        let newton = Unit::alternate(kg.multiply(&meter()).divide(&second().pow(2)), "N");
        assert!(newton.is_system_unit());
        assert_eq!(newton.system_unit(), newton);
    }

    #[test]
    fn test_equivalent_units() {
        let kg = Unit::base("kg");
        let gram = kg.transform(Converter::rational(1, 1000));
        assert_ne!(gram.prefixed(Prefix::Kilo), kg);
        assert!(gram.prefixed(Prefix::Kilo).is_equivalent(&kg));
        assert!(!gram.is_equivalent(&kg));
    }

    #[test]
    fn test_annotations_distinguish_units() {
        let a = meter().annotate("RBC");
        assert_ne!(a, meter());
        assert_ne!(a, meter().annotate("WBC"));
        assert_eq!(a.system_unit(), meter());
        assert_eq!(a.kind(), "AnnotatedUnit");
    }
}
