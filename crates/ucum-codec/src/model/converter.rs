//! Value converters between a unit and its parent unit.
//!
//! A converter maps a quantity expressed in one unit onto its parent unit,
//! e.g. the kilometre carries `PowerOfTen(3)` because `1 km = 1000 m`.
//! Linear converters compare by value, so `Multiply(1000.0)` and
//! `PowerOfTen(3)` are the same converter.

use std::hash::{Hash, Hasher};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// A value-preserving transform between two units.
#[derive(Debug, Clone)]
pub enum Converter {
    /// Leaves values unchanged.
    Identity,

    /// Multiplies by a floating-point factor.
    Multiply(f64),

    /// Multiplies by an exact ratio `dividend / divisor`.
    Rational(BigRational),

    /// Multiplies by `10^exponent` (metric prefixes).
    PowerOfTen(i32),

    /// Multiplies by `base^exponent` (binary prefixes use base 2).
    PowerOfInt { base: u32, exponent: i32 },

    /// Adds a constant offset (temperature scales).
    Offset(BigRational),

    /// Takes the logarithm in the given base.
    Logarithmic { base: f64 },

    /// Raises the given base to the value (inverse of `Logarithmic`).
    Exponential { base: f64 },

    /// Applies `inner`, then `outer`.
    Composite {
        inner: Box<Converter>,
        outer: Box<Converter>,
    },
}

impl Converter {
    /// Returns the canonical linear converter for an exact factor.
    ///
    /// One maps to `Identity`, exact powers of ten to `PowerOfTen`, everything
    /// else to `Rational`.
    pub fn factor(value: BigRational) -> Converter {
        if value.is_one() {
            Converter::Identity
        } else if let Some(exponent) = power_of_ten_exponent(&value) {
            Converter::PowerOfTen(exponent)
        } else {
            Converter::Rational(value)
        }
    }

    /// Creates an exact `dividend / divisor` converter.
    ///
    /// # Panics
    ///
    /// Panics if `divisor` is zero.
    pub fn rational(dividend: impl Into<BigInt>, divisor: impl Into<BigInt>) -> Converter {
        Converter::Rational(BigRational::new(dividend.into(), divisor.into()))
    }

    /// Creates a floating-point multiplier.
    pub fn multiply(factor: f64) -> Converter {
        Converter::Multiply(factor)
    }

    /// Creates an additive offset, collapsing a zero offset to `Identity`.
    pub fn offset(offset: BigRational) -> Converter {
        if offset.is_zero() {
            Converter::Identity
        } else {
            Converter::Offset(offset)
        }
    }

    /// Returns true for converters that only scale values.
    pub fn is_linear(&self) -> bool {
        match self {
            Converter::Identity
            | Converter::Multiply(_)
            | Converter::Rational(_)
            | Converter::PowerOfTen(_)
            | Converter::PowerOfInt { .. } => true,
            Converter::Composite { inner, outer } => inner.is_linear() && outer.is_linear(),
            Converter::Offset(_) | Converter::Logarithmic { .. } | Converter::Exponential { .. } => {
                false
            }
        }
    }

    /// Returns true if the converter leaves every value unchanged.
    pub fn is_identity(&self) -> bool {
        match self {
            Converter::Identity => true,
            Converter::PowerOfTen(exponent) => *exponent == 0,
            Converter::PowerOfInt { base, exponent } => *exponent == 0 || *base == 1,
            Converter::Offset(offset) => offset.is_zero(),
            other => other.exact_factor().is_some_and(|factor| factor.is_one()),
        }
    }

    /// Returns the exact scale factor of a linear converter.
    ///
    /// Floating factors contribute the exact binary value of the float, so
    /// `Multiply(0.001)` is not equal to `10^-3`.
    pub fn exact_factor(&self) -> Option<BigRational> {
        match self {
            Converter::Identity => Some(BigRational::one()),
            Converter::Multiply(factor) => BigRational::from_float(*factor),
            Converter::Rational(ratio) => Some(ratio.clone()),
            Converter::PowerOfTen(exponent) => Some(integer_power(10, *exponent)),
            Converter::PowerOfInt { base, exponent } => Some(integer_power(*base, *exponent)),
            Converter::Composite { inner, outer } => {
                Some(inner.exact_factor()? * outer.exact_factor()?)
            }
            Converter::Offset(_) | Converter::Logarithmic { .. } | Converter::Exponential { .. } => {
                None
            }
        }
    }

    /// Returns the scale factor of a linear converter as an `f64`.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Converter::Multiply(factor) => Some(*factor),
            Converter::PowerOfTen(exponent) => pow10_f64(*exponent),
            Converter::Composite { inner, outer } => Some(inner.to_f64()? * outer.to_f64()?),
            other => other.exact_factor()?.to_f64(),
        }
    }

    /// Folds exact linear converters into their canonical form.
    ///
    /// Floating linear chains collapse to a single `Multiply`; `PowerOfInt`
    /// and non-linear converters are returned unchanged.
    pub fn canonical(&self) -> Converter {
        match self {
            Converter::Rational(_) | Converter::Composite { .. } if self.is_linear() => {
                if self.involves_float() {
                    self.to_f64().map_or_else(|| self.clone(), Converter::Multiply)
                } else {
                    self.exact_factor().map_or_else(|| self.clone(), Converter::factor)
                }
            }
            _ => self.clone(),
        }
    }

    /// Composes two converters: `self` is applied first, then `outer`.
    pub fn then(&self, outer: &Converter) -> Converter {
        if self.is_identity() {
            return outer.clone();
        }
        if outer.is_identity() {
            return self.clone();
        }
        if self.is_linear() && outer.is_linear() {
            if self.involves_float() || outer.involves_float() {
                if let (Some(a), Some(b)) = (self.to_f64(), outer.to_f64()) {
                    return Converter::Multiply(a * b);
                }
            } else if let (Some(a), Some(b)) = (self.exact_factor(), outer.exact_factor()) {
                return Converter::factor(a * b);
            }
        }
        if let (Converter::Offset(a), Converter::Offset(b)) = (self, outer) {
            return Converter::offset(a + b);
        }
        Converter::Composite {
            inner: Box::new(self.clone()),
            outer: Box::new(outer.clone()),
        }
    }

    /// Returns the converter undoing this one.
    pub fn inverse(&self) -> Converter {
        match self {
            Converter::Identity => Converter::Identity,
            Converter::Multiply(factor) => Converter::Multiply(1.0 / factor),
            Converter::Rational(ratio) => {
                if ratio.is_zero() {
                    Converter::Multiply(f64::INFINITY)
                } else {
                    Converter::Rational(ratio.recip())
                }
            }
            Converter::PowerOfTen(exponent) => Converter::PowerOfTen(exponent.saturating_neg()),
            Converter::PowerOfInt { base, exponent } => Converter::PowerOfInt {
                base: *base,
                exponent: exponent.saturating_neg(),
            },
            Converter::Offset(offset) => Converter::Offset(-offset),
            Converter::Logarithmic { base } => Converter::Exponential { base: *base },
            Converter::Exponential { base } => Converter::Logarithmic { base: *base },
            Converter::Composite { inner, outer } => Converter::Composite {
                inner: Box::new(outer.inverse()),
                outer: Box::new(inner.inverse()),
            },
        }
    }

    /// Raises a linear converter to an integer power.
    ///
    /// Returns `None` for non-linear converters, which have no meaningful
    /// power in a product of units.
    pub fn pow(&self, exponent: i32) -> Option<Converter> {
        if exponent == 0 {
            return Some(Converter::Identity);
        }
        match self {
            Converter::PowerOfTen(e) => e.checked_mul(exponent).map(Converter::PowerOfTen),
            Converter::PowerOfInt { base, exponent: e } => {
                e.checked_mul(exponent).map(|e| Converter::PowerOfInt { base: *base, exponent: e })
            }
            Converter::Multiply(factor) => Some(Converter::Multiply(factor.powi(exponent))),
            other if other.is_linear() => {
                if other.involves_float() {
                    return Some(Converter::Multiply(other.to_f64()?.powi(exponent)));
                }
                let factor = other.exact_factor()?;
                if factor.is_zero() && exponent < 0 {
                    return None;
                }
                let magnitude = exponent.unsigned_abs();
                let raised = BigRational::new(factor.numer().pow(magnitude), factor.denom().pow(magnitude));
                Some(Converter::factor(if exponent < 0 { raised.recip() } else { raised }))
            }
            _ => None,
        }
    }

    /// Applies the converter to a floating-point value.
    pub fn convert(&self, value: f64) -> f64 {
        match self {
            Converter::Identity => value,
            Converter::Offset(offset) => value + offset.to_f64().unwrap_or(f64::NAN),
            Converter::Logarithmic { base } => value.log(*base),
            Converter::Exponential { base } => base.powf(value),
            Converter::Composite { inner, outer } => outer.convert(inner.convert(value)),
            linear => value * linear.to_f64().unwrap_or(f64::NAN),
        }
    }

    /// Short name used when a converter has to be spelled out as a function.
    pub fn name(&self) -> String {
        match self {
            Converter::Identity => "id".to_string(),
            Converter::Logarithmic { base } => log_name("lg", "ld", "ln", "log", *base),
            Converter::Exponential { base } => log_name("exp10", "exp2", "exp", "exp", *base),
            Converter::Offset(offset) => format!("offset{}", offset.to_f64().unwrap_or(f64::NAN)),
            Converter::Composite { inner, outer } => format!("{}.{}", outer.name(), inner.name()),
            linear => format!("mul{}", linear.to_f64().unwrap_or(f64::NAN)),
        }
    }

    fn involves_float(&self) -> bool {
        match self {
            Converter::Multiply(_) => true,
            Converter::Composite { inner, outer } => inner.involves_float() || outer.involves_float(),
            _ => false,
        }
    }
}

fn log_name(ten: &str, two: &str, natural: &str, other: &str, base: f64) -> String {
    if base == 10.0 {
        ten.to_string()
    } else if base == 2.0 {
        two.to_string()
    } else if base == std::f64::consts::E {
        natural.to_string()
    } else {
        format!("{other}{base}")
    }
}

impl PartialEq for Converter {
    fn eq(&self, other: &Self) -> bool {
        match (self.exact_factor(), other.exact_factor()) {
            (Some(a), Some(b)) => return a == b,
            (Some(_), None) | (None, Some(_)) => return false,
            (None, None) => {}
        }
        match (self, other) {
            (Converter::Multiply(a), Converter::Multiply(b)) => a.to_bits() == b.to_bits(),
            (Converter::Offset(a), Converter::Offset(b)) => a == b,
            (Converter::Logarithmic { base: a }, Converter::Logarithmic { base: b })
            | (Converter::Exponential { base: a }, Converter::Exponential { base: b }) => {
                a.to_bits() == b.to_bits()
            }
            (
                Converter::Composite { inner: a, outer: b },
                Converter::Composite { inner: c, outer: d },
            ) => a == c && b == d,
            _ => false,
        }
    }
}

impl Eq for Converter {}

impl Hash for Converter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if let Some(factor) = self.exact_factor() {
            0u8.hash(state);
            factor.hash(state);
            return;
        }
        match self {
            Converter::Multiply(factor) => {
                1u8.hash(state);
                factor.to_bits().hash(state);
            }
            Converter::Offset(offset) => {
                2u8.hash(state);
                offset.hash(state);
            }
            Converter::Logarithmic { base } => {
                3u8.hash(state);
                base.to_bits().hash(state);
            }
            Converter::Exponential { base } => {
                4u8.hash(state);
                base.to_bits().hash(state);
            }
            Converter::Composite { inner, outer } => {
                5u8.hash(state);
                inner.hash(state);
                outer.hash(state);
            }
            _ => 6u8.hash(state),
        }
    }
}

/// Returns `base^exponent` as an exact rational.
pub(crate) fn integer_power(base: u32, exponent: i32) -> BigRational {
    let magnitude = BigInt::from(base).pow(exponent.unsigned_abs());
    if exponent >= 0 {
        BigRational::from_integer(magnitude)
    } else if magnitude.is_zero() {
        BigRational::zero()
    } else {
        BigRational::new(BigInt::one(), magnitude)
    }
}

/// Returns the correctly rounded `f64` nearest to `10^exponent`.
pub(crate) fn pow10_f64(exponent: i32) -> Option<f64> {
    format!("1e{exponent}").parse().ok()
}

/// Returns `e` if `value == 10^e` exactly.
fn power_of_ten_exponent(value: &BigRational) -> Option<i32> {
    if !value.is_positive() {
        return None;
    }
    let (rest, negative) = if value.denom().is_one() {
        (value.numer().clone(), false)
    } else if value.numer().is_one() {
        (value.denom().clone(), true)
    } else {
        return None;
    };
    // 10^e has floor(e * log2(10)) + 1 bits.
    let estimate = (rest.bits().saturating_sub(1) as f64 / std::f64::consts::LOG2_10).ceil() as i64;
    let exponent = (estimate - 1..=estimate + 1)
        .filter_map(|e| u32::try_from(e).ok())
        .find(|e| BigInt::from(10u32).pow(*e) == rest)?;
    let exponent = i32::try_from(exponent).ok()?;
    Some(if negative { -exponent } else { exponent })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(numer: i64, denom: i64) -> BigRational {
        BigRational::new(BigInt::from(numer), BigInt::from(denom))
    }

    #[test]
    fn test_factor_canonical_forms() {
        assert!(matches!(Converter::factor(ratio(1, 1)), Converter::Identity));
        assert!(matches!(Converter::factor(ratio(1000, 1)), Converter::PowerOfTen(3)));
        assert!(matches!(Converter::factor(ratio(1, 100)), Converter::PowerOfTen(-2)));
        assert!(matches!(Converter::factor(ratio(60, 1)), Converter::Rational(_)));
        assert!(matches!(Converter::factor(ratio(20, 1)), Converter::Rational(_)));
        assert!(matches!(Converter::factor(integer_power(10, 400)), Converter::PowerOfTen(400)));
        assert!(matches!(Converter::factor(integer_power(10, -400)), Converter::PowerOfTen(-400)));
        let near = integer_power(10, 400) * ratio(2, 1);
        assert!(matches!(Converter::factor(near), Converter::Rational(_)));
    }

    #[test]
    fn test_zero_powers_are_identity() {
        assert!(Converter::PowerOfTen(0).is_identity());
        assert!(!Converter::PowerOfTen(1_000_000_000).is_identity());
        assert!(Converter::PowerOfInt { base: 2, exponent: 0 }.is_identity());
        assert!(!Converter::PowerOfInt { base: 2, exponent: 10 }.is_identity());
    }

    #[test]
    fn test_linear_equality_is_by_value() {
        assert_eq!(Converter::Multiply(1000.0), Converter::PowerOfTen(3));
        assert_eq!(Converter::rational(1000, 1), Converter::PowerOfTen(3));
        assert_eq!(
            Converter::PowerOfInt { base: 2, exponent: 10 },
            Converter::rational(1024, 1)
        );
        // 0.001 has no exact binary representation
        assert_ne!(Converter::Multiply(0.001), Converter::PowerOfTen(-3));
        assert_ne!(Converter::PowerOfTen(3), Converter::Logarithmic { base: 10.0 });
    }

    #[test]
    fn test_hash_consistent_with_eq() {
        use std::collections::hash_map::DefaultHasher;

        fn hash_of(c: &Converter) -> u64 {
            let mut hasher = DefaultHasher::new();
            c.hash(&mut hasher);
            hasher.finish()
        }

        assert_eq!(hash_of(&Converter::Multiply(1000.0)), hash_of(&Converter::PowerOfTen(3)));
        assert_eq!(hash_of(&Converter::Identity), hash_of(&Converter::PowerOfTen(0)));
    }

    #[test]
    fn test_then_folds_linear_chains() {
        let kilo = Converter::PowerOfTen(3);
        let milli = Converter::PowerOfTen(-3);
        assert!(kilo.then(&milli).is_identity());
        assert_eq!(kilo.then(&Converter::rational(60, 1)), Converter::rational(60000, 1));

        let mixed = Converter::Multiply(0.5).then(&Converter::PowerOfTen(1));
        assert!(matches!(mixed, Converter::Multiply(f) if f == 5.0));
    }

    #[test]
    fn test_then_keeps_nonlinear_composite() {
        let log = Converter::Logarithmic { base: 10.0 };
        let composite = Converter::PowerOfTen(1).then(&log);
        match composite {
            Converter::Composite { inner, outer } => {
                assert_eq!(*inner, Converter::PowerOfTen(1));
                assert_eq!(*outer, log);
            }
            other => panic!("expected composite, got {:?}", other),
        }
    }

    #[test]
    fn test_offsets_merge() {
        let a = Converter::offset(ratio(27315, 100));
        let b = Converter::offset(ratio(-27315, 100));
        assert!(a.then(&b).is_identity());
    }

    #[test]
    fn test_inverse() {
        assert_eq!(Converter::PowerOfTen(3).inverse(), Converter::PowerOfTen(-3));
        assert_eq!(Converter::rational(1, 60).inverse(), Converter::rational(60, 1));
        assert_eq!(
            Converter::Logarithmic { base: 10.0 }.inverse(),
            Converter::Exponential { base: 10.0 }
        );
        let celsius = Converter::offset(ratio(27315, 100));
        assert!((celsius.inverse().convert(celsius.convert(20.0)) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_pow() {
        assert_eq!(Converter::PowerOfTen(3).pow(2), Some(Converter::PowerOfTen(6)));
        assert_eq!(Converter::rational(60, 1).pow(-2), Some(Converter::rational(1, 3600)));
        assert_eq!(Converter::Offset(ratio(1, 1)).pow(2), None);
        assert_eq!(Converter::Logarithmic { base: 10.0 }.pow(0), Some(Converter::Identity));
    }

    #[test]
    fn test_canonical() {
        assert!(matches!(Converter::rational(1000, 1).canonical(), Converter::PowerOfTen(3)));
        assert!(matches!(
            Converter::PowerOfInt { base: 2, exponent: 10 }.canonical(),
            Converter::PowerOfInt { .. }
        ));
        let chain = Converter::Composite {
            inner: Box::new(Converter::rational(1, 10)),
            outer: Box::new(Converter::rational(1, 100)),
        };
        assert!(matches!(chain.canonical(), Converter::PowerOfTen(-3)));
    }

    #[test]
    fn test_convert() {
        assert_eq!(Converter::PowerOfTen(3).convert(2.5), 2500.0);
        assert!((Converter::Logarithmic { base: 10.0 }.convert(1000.0) - 3.0).abs() < 1e-12);
        assert!((Converter::offset(ratio(27315, 100)).convert(0.0) - 273.15).abs() < 1e-12);
    }

    #[test]
    fn test_pow10_f64_matches_literals() {
        assert_eq!(pow10_f64(-3), Some(0.001));
        assert_eq!(pow10_f64(24), Some(1e24));
        assert_eq!(pow10_f64(-30), Some(1e-30));
    }
}
