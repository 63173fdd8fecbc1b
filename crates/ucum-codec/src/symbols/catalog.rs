//! Built-in UCUM units and the per-variant symbol tables.
//!
//! The kilogram is the base unit of mass and has no table entry; the gram
//! is the prefixable unit and `kg` is always written as a prefixed gram.

use lazy_static::lazy_static;
use tracing::debug;

use crate::model::{Converter, Prefix, Unit};
use crate::symbols::{SymbolMap, Variant};

lazy_static! {
    /// The dimensionless unit.
    pub static ref ONE: Unit = Unit::one();

    pub static ref METER: Unit = Unit::base("m");
    pub static ref SECOND: Unit = Unit::base("s");
    pub static ref KILOGRAM: Unit = Unit::base("kg");
    pub static ref RADIAN: Unit = Unit::base("rad");
    pub static ref KELVIN: Unit = Unit::base("K");
    pub static ref COULOMB: Unit = Unit::base("C");
    pub static ref CANDELA: Unit = Unit::base("cd");
    pub static ref MOLE: Unit = Unit::base("mol");
    pub static ref BIT: Unit = Unit::base("bit");

    pub static ref GRAM: Unit = KILOGRAM.transform(Converter::rational(1, 1000));

    pub static ref STERADIAN: Unit = Unit::alternate(RADIAN.pow(2), "sr");
    pub static ref HERTZ: Unit = Unit::alternate(SECOND.inverse(), "Hz");
    pub static ref NEWTON: Unit = Unit::alternate(
        KILOGRAM.multiply(&METER).divide(&SECOND.pow(2)),
        "N"
    );
    pub static ref PASCAL: Unit = Unit::alternate(NEWTON.divide(&METER.pow(2)), "Pa");
    pub static ref JOULE: Unit = Unit::alternate(NEWTON.multiply(&METER), "J");
    pub static ref WATT: Unit = Unit::alternate(JOULE.divide(&SECOND), "W");
    pub static ref AMPERE: Unit = Unit::alternate(COULOMB.divide(&SECOND), "A");
    pub static ref VOLT: Unit = Unit::alternate(JOULE.divide(&COULOMB), "V");
    pub static ref FARAD: Unit = Unit::alternate(COULOMB.divide(&VOLT), "F");
    pub static ref OHM: Unit = Unit::alternate(VOLT.divide(&AMPERE), "Ohm");
    pub static ref SIEMENS: Unit = Unit::alternate(OHM.inverse(), "S");
    pub static ref WEBER: Unit = Unit::alternate(VOLT.multiply(&SECOND), "Wb");
    pub static ref TESLA: Unit = Unit::alternate(WEBER.divide(&METER.pow(2)), "T");
    pub static ref HENRY: Unit = Unit::alternate(WEBER.divide(&AMPERE), "H");

    pub static ref CELSIUS: Unit = KELVIN.transform(Converter::offset(
        num_rational::BigRational::new(27315.into(), 100.into())
    ));
    pub static ref LITER: Unit = METER.pow(3).transform(Converter::rational(1, 1000));

    pub static ref MINUTE: Unit = SECOND.transform(Converter::rational(60, 1));
    pub static ref HOUR: Unit = MINUTE.transform(Converter::rational(60, 1));
    pub static ref DAY: Unit = HOUR.transform(Converter::rational(24, 1));
    pub static ref WEEK: Unit = DAY.transform(Converter::rational(7, 1));
    pub static ref YEAR: Unit = DAY.transform(Converter::rational(1461, 4));
    pub static ref MONTH: Unit = YEAR.transform(Converter::rational(1, 12));

    pub static ref INCH: Unit = METER.transform(Converter::rational(254, 10000));
    pub static ref FOOT: Unit = INCH.transform(Converter::rational(12, 1));
    pub static ref MILE: Unit = FOOT.transform(Converter::rational(5280, 1));
    pub static ref POUND: Unit = GRAM.transform(Converter::rational(45359237, 100000));

    pub static ref PERCENT: Unit = ONE.transform(Converter::rational(1, 100));
    pub static ref PPM: Unit = ONE.transform(Converter::rational(1, 1_000_000));
    pub static ref BYTE: Unit = BIT.transform(Converter::rational(8, 1));

    static ref CASE_SENSITIVE: SymbolMap = build(Variant::CaseSensitive);
    static ref CASE_INSENSITIVE: SymbolMap = build(Variant::CaseInsensitive);
    static ref PRINT: SymbolMap = build(Variant::Print);
}

/// One catalogue row: unit, case-sensitive, case-insensitive and print
/// symbols, and whether prefixes apply.
struct UnitRow {
    unit: &'static Unit,
    cs: &'static str,
    ci: &'static str,
    print: &'static str,
    metric: bool,
}

impl UnitRow {
    fn symbol(&self, variant: Variant) -> &'static str {
        match variant {
            Variant::CaseSensitive => self.cs,
            Variant::CaseInsensitive => self.ci,
            Variant::Print => self.print,
        }
    }
}

fn unit_rows() -> Vec<UnitRow> {
    fn row(unit: &'static Unit, cs: &'static str, ci: &'static str, print: &'static str, metric: bool) -> UnitRow {
        UnitRow {
            unit,
            cs,
            ci,
            print,
            metric,
        }
    }

    vec![
        row(&METER, "m", "M", "m", true),
        row(&SECOND, "s", "S", "s", true),
        row(&GRAM, "g", "G", "g", true),
        row(&RADIAN, "rad", "RAD", "rad", true),
        row(&KELVIN, "K", "K", "K", true),
        row(&COULOMB, "C", "C", "C", true),
        row(&CANDELA, "cd", "CD", "cd", true),
        row(&MOLE, "mol", "MOL", "mol", true),
        row(&STERADIAN, "sr", "SR", "sr", true),
        row(&HERTZ, "Hz", "HZ", "Hz", true),
        row(&NEWTON, "N", "N", "N", true),
        row(&PASCAL, "Pa", "PAL", "Pa", true),
        row(&JOULE, "J", "J", "J", true),
        row(&WATT, "W", "W", "W", true),
        row(&AMPERE, "A", "A", "A", true),
        row(&VOLT, "V", "V", "V", true),
        row(&FARAD, "F", "F", "F", true),
        row(&OHM, "Ohm", "OHM", "Ω", true),
        row(&SIEMENS, "S", "SIE", "S", true),
        row(&WEBER, "Wb", "WB", "Wb", true),
        row(&TESLA, "T", "T", "T", true),
        row(&HENRY, "H", "H", "H", true),
        row(&CELSIUS, "Cel", "CEL", "°C", true),
        row(&LITER, "L", "L", "L", true),
        row(&MINUTE, "min", "MIN", "min", false),
        row(&HOUR, "h", "HR", "h", false),
        row(&DAY, "d", "D", "d", false),
        row(&WEEK, "wk", "WK", "wk", false),
        row(&MONTH, "mo", "MO", "mo", false),
        row(&YEAR, "a", "ANN", "a", false),
        row(&INCH, "[in_i]", "[IN_I]", "in", false),
        row(&FOOT, "[ft_i]", "[FT_I]", "ft", false),
        row(&MILE, "[mi_i]", "[MI_I]", "mi", false),
        row(&POUND, "[lb_av]", "[LB_AV]", "lb", false),
        row(&PERCENT, "%", "%", "%", false),
        row(&PPM, "[ppm]", "[PPM]", "ppm", false),
        row(&BIT, "bit", "BIT", "bit", true),
        row(&BYTE, "By", "BY", "B", true),
    ]
}

/// Prefix symbols: case-sensitive, case-insensitive, print.
const PREFIX_SYMBOLS: [(Prefix, &str, Option<&str>, &str); 28] = [
    (Prefix::Quetta, "Q", None, "Q"),
    (Prefix::Ronna, "R", None, "R"),
    (Prefix::Yotta, "Y", Some("YA"), "Y"),
    (Prefix::Zetta, "Z", Some("ZA"), "Z"),
    (Prefix::Exa, "E", Some("EX"), "E"),
    (Prefix::Peta, "P", Some("PT"), "P"),
    (Prefix::Tera, "T", Some("TR"), "T"),
    (Prefix::Giga, "G", Some("GA"), "G"),
    (Prefix::Mega, "M", Some("MA"), "M"),
    (Prefix::Kilo, "k", Some("K"), "k"),
    (Prefix::Hecto, "h", Some("H"), "h"),
    (Prefix::Deka, "da", Some("DA"), "da"),
    (Prefix::Deci, "d", Some("D"), "d"),
    (Prefix::Centi, "c", Some("C"), "c"),
    (Prefix::Milli, "m", Some("M"), "m"),
    (Prefix::Micro, "u", Some("U"), "μ"),
    (Prefix::Nano, "n", Some("N"), "n"),
    (Prefix::Pico, "p", Some("P"), "p"),
    (Prefix::Femto, "f", Some("F"), "f"),
    (Prefix::Atto, "a", Some("A"), "a"),
    (Prefix::Zepto, "z", Some("ZO"), "z"),
    (Prefix::Yocto, "y", Some("YO"), "y"),
    (Prefix::Ronto, "r", None, "r"),
    (Prefix::Quecto, "q", None, "q"),
    (Prefix::Kibi, "Ki", Some("KIB"), "Ki"),
    (Prefix::Mebi, "Mi", Some("MIB"), "Mi"),
    (Prefix::Gibi, "Gi", Some("GIB"), "Gi"),
    (Prefix::Tebi, "Ti", Some("TIB"), "Ti"),
];

fn build(variant: Variant) -> SymbolMap {
    let mut builder = SymbolMap::builder();
    for row in unit_rows() {
        let symbol = row.symbol(variant);
        builder = if row.metric {
            builder.label_metric(row.unit.clone(), symbol)
        } else {
            builder.label(row.unit.clone(), symbol)
        };
    }
    if variant == Variant::CaseSensitive {
        builder = builder.alias(LITER.clone(), "l");
    }
    for (prefix, cs, ci, print) in PREFIX_SYMBOLS {
        let symbol = match variant {
            Variant::CaseSensitive => Some(cs),
            Variant::CaseInsensitive => ci,
            Variant::Print => Some(print),
        };
        if let Some(symbol) = symbol {
            builder = builder.prefix(prefix, symbol);
        }
    }
    let map = builder.build();
    debug!(
        %variant,
        units = map.len(),
        prefixes = map.prefixes().count(),
        "built symbol table"
    );
    map
}

/// Returns the shared built-in table for a variant.
pub fn symbol_map(variant: Variant) -> &'static SymbolMap {
    match variant {
        Variant::CaseSensitive => &*CASE_SENSITIVE,
        Variant::CaseInsensitive => &*CASE_INSENSITIVE,
        Variant::Print => &*PRINT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Resolved;

    #[test]
    fn test_tables_are_symmetric() {
        for variant in Variant::ALL {
            let map = symbol_map(variant);
            for (unit, symbol) in map.units() {
                assert_eq!(map.unit_for_symbol(symbol), Some(unit), "{variant}: {symbol}");
            }
            for (prefix, symbol) in map.prefixes() {
                assert_eq!(map.prefix_for_symbol(symbol), Some(prefix), "{variant}: {symbol}");
            }
        }
    }

    #[test]
    fn test_every_row_is_labelled() {
        let rows = unit_rows().len();
        for variant in Variant::ALL {
            assert_eq!(symbol_map(variant).len(), rows, "{variant}");
        }
    }

    #[test]
    fn test_kilogram_has_no_entry() {
        for variant in Variant::ALL {
            assert_eq!(symbol_map(variant).symbol_for(&KILOGRAM), None);
        }
        assert!(GRAM.prefixed(Prefix::Kilo).is_equivalent(&KILOGRAM));
    }

    #[test]
    fn test_case_insensitive_resolution() {
        let map = symbol_map(Variant::CaseInsensitive);
        assert_eq!(map.resolve("PAL"), Some(Resolved::Unit(&PASCAL)));
        assert_eq!(
            map.resolve("MAM"),
            Some(Resolved::Prefixed {
                prefix: Prefix::Mega,
                unit: &METER,
            })
        );
        assert_eq!(
            map.resolve("DA"),
            Some(Resolved::Prefixed {
                prefix: Prefix::Deci,
                unit: &AMPERE,
            })
        );
        assert_eq!(
            map.resolve("DAA"),
            Some(Resolved::Prefixed {
                prefix: Prefix::Deka,
                unit: &AMPERE,
            })
        );
    }

    #[test]
    fn test_candela_is_not_centiday() {
        let map = symbol_map(Variant::CaseSensitive);
        assert_eq!(map.resolve("cd"), Some(Resolved::Unit(&CANDELA)));
        assert_eq!(map.resolve("cmin"), None);
    }

    #[test]
    fn test_derived_units_reach_base_units() {
        let newton_system = KILOGRAM.multiply(&METER).divide(&SECOND.pow(2));
        assert_eq!(JOULE.system_unit(), *JOULE);
        assert_eq!(HOUR.system_unit(), *SECOND);
        assert_eq!(HOUR.converter_to_system(), Some(Converter::rational(3600, 1)));
        assert_eq!(LITER.system_unit(), METER.pow(3));
        assert_eq!(POUND.system_unit(), *KILOGRAM);
        assert!(NEWTON.is_system_unit());
        match &*NEWTON {
            Unit::Alternate { parent, .. } => assert_eq!(**parent, newton_system),
            other => panic!("expected alternate unit, got {:?}", other),
        }
    }
}
