//! Metric and binary unit prefixes.

use crate::model::Converter;

/// A multiplicative scale marker glued to a unit symbol (`k` in `km`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix {
    Quetta,
    Ronna,
    Yotta,
    Zetta,
    Exa,
    Peta,
    Tera,
    Giga,
    Mega,
    Kilo,
    Hecto,
    Deka,
    Deci,
    Centi,
    Milli,
    Micro,
    Nano,
    Pico,
    Femto,
    Atto,
    Zepto,
    Yocto,
    Ronto,
    Quecto,
    Kibi,
    Mebi,
    Gibi,
    Tebi,
}

impl Prefix {
    /// SI prefixes from 10^30 down to 10^-30.
    pub const METRIC: [Prefix; 24] = [
        Prefix::Quetta,
        Prefix::Ronna,
        Prefix::Yotta,
        Prefix::Zetta,
        Prefix::Exa,
        Prefix::Peta,
        Prefix::Tera,
        Prefix::Giga,
        Prefix::Mega,
        Prefix::Kilo,
        Prefix::Hecto,
        Prefix::Deka,
        Prefix::Deci,
        Prefix::Centi,
        Prefix::Milli,
        Prefix::Micro,
        Prefix::Nano,
        Prefix::Pico,
        Prefix::Femto,
        Prefix::Atto,
        Prefix::Zepto,
        Prefix::Yocto,
        Prefix::Ronto,
        Prefix::Quecto,
    ];

    /// IEC binary prefixes.
    pub const BINARY: [Prefix; 4] = [Prefix::Kibi, Prefix::Mebi, Prefix::Gibi, Prefix::Tebi];

    /// Returns `(base, exponent)` such that the prefix scales by `base^exponent`.
    pub fn power(self) -> (u32, i32) {
        match self {
            Prefix::Quetta => (10, 30),
            Prefix::Ronna => (10, 27),
            Prefix::Yotta => (10, 24),
            Prefix::Zetta => (10, 21),
            Prefix::Exa => (10, 18),
            Prefix::Peta => (10, 15),
            Prefix::Tera => (10, 12),
            Prefix::Giga => (10, 9),
            Prefix::Mega => (10, 6),
            Prefix::Kilo => (10, 3),
            Prefix::Hecto => (10, 2),
            Prefix::Deka => (10, 1),
            Prefix::Deci => (10, -1),
            Prefix::Centi => (10, -2),
            Prefix::Milli => (10, -3),
            Prefix::Micro => (10, -6),
            Prefix::Nano => (10, -9),
            Prefix::Pico => (10, -12),
            Prefix::Femto => (10, -15),
            Prefix::Atto => (10, -18),
            Prefix::Zepto => (10, -21),
            Prefix::Yocto => (10, -24),
            Prefix::Ronto => (10, -27),
            Prefix::Quecto => (10, -30),
            Prefix::Kibi => (2, 10),
            Prefix::Mebi => (2, 20),
            Prefix::Gibi => (2, 30),
            Prefix::Tebi => (2, 40),
        }
    }

    /// Returns the converter applied by this prefix.
    pub fn converter(self) -> Converter {
        match self.power() {
            (10, exponent) => Converter::PowerOfTen(exponent),
            (base, exponent) => Converter::PowerOfInt { base, exponent },
        }
    }

    /// Recognises a prefix converter.
    ///
    /// Only `PowerOfTen` and `PowerOfInt` converters are considered; run
    /// multiply converters through the classifier first.
    pub fn from_converter(converter: &Converter) -> Option<Prefix> {
        let power = match converter {
            Converter::PowerOfTen(exponent) => (10, *exponent),
            Converter::PowerOfInt { base, exponent } => (*base, *exponent),
            _ => return None,
        };
        Self::METRIC
            .iter()
            .chain(Self::BINARY.iter())
            .copied()
            .find(|prefix| prefix.power() == power)
    }

    /// Returns the lowercase English name of the prefix.
    pub fn name(self) -> &'static str {
        match self {
            Prefix::Quetta => "quetta",
            Prefix::Ronna => "ronna",
            Prefix::Yotta => "yotta",
            Prefix::Zetta => "zetta",
            Prefix::Exa => "exa",
            Prefix::Peta => "peta",
            Prefix::Tera => "tera",
            Prefix::Giga => "giga",
            Prefix::Mega => "mega",
            Prefix::Kilo => "kilo",
            Prefix::Hecto => "hecto",
            Prefix::Deka => "deka",
            Prefix::Deci => "deci",
            Prefix::Centi => "centi",
            Prefix::Milli => "milli",
            Prefix::Micro => "micro",
            Prefix::Nano => "nano",
            Prefix::Pico => "pico",
            Prefix::Femto => "femto",
            Prefix::Atto => "atto",
            Prefix::Zepto => "zepto",
            Prefix::Yocto => "yocto",
            Prefix::Ronto => "ronto",
            Prefix::Quecto => "quecto",
            Prefix::Kibi => "kibi",
            Prefix::Mebi => "mebi",
            Prefix::Gibi => "gibi",
            Prefix::Tebi => "tebi",
        }
    }
}
