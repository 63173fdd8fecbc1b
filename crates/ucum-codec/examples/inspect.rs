//! Simple inspector for UCUM expressions.
//!
//! With arguments, each one is parsed as a case-sensitive expression and
//! rendered in every variant. Without arguments a few catalogue units are
//! shown instead.

use ucum_codec::symbols::catalog::{CELSIUS, HOUR, JOULE, KELVIN, KILOGRAM, METER, MOLE, SECOND};
use ucum_codec::{Prefix, UcumFormat, Unit, Variant};

fn describe(unit: &Unit) -> String {
    let system = UcumFormat::new(Variant::CaseSensitive)
        .format(&unit.system_unit())
        .unwrap_or_else(|e| format!("<{}>", e));
    match unit.converter_to_system() {
        Some(converter) if converter.is_identity() => format!("system unit {}", system),
        Some(converter) => format!("{} of {}", converter.name(), system),
        None => format!("non-linear over {}", system),
    }
}

fn show(label: &str, unit: &Unit) {
    println!("\n=== {} ===", label);
    println!("Kind: {}", unit.kind());
    println!("Scale: {}", describe(unit));
    for variant in Variant::ALL {
        match UcumFormat::new(variant).format(unit) {
            Ok(text) => println!("  {:<17} {}", variant.name(), text),
            Err(e) => println!("  {:<17} error: {}", variant.name(), e),
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() {
        let samples = [
            ("kilogram", KILOGRAM.clone()),
            ("kilometre per hour", METER.prefixed(Prefix::Kilo).divide(&HOUR)),
            ("molar heat capacity", JOULE.divide(&KELVIN.multiply(&MOLE))),
            ("acceleration", METER.divide(&SECOND.pow(2))),
            ("millidegree Celsius", CELSIUS.prefixed(Prefix::Milli)),
            ("annotated count", Unit::one().annotate("cells")),
        ];
        for (label, unit) in &samples {
            show(label, unit);
        }
        return;
    }

    let codec = UcumFormat::new(Variant::CaseSensitive);
    for text in &args {
        match codec.parse(text) {
            Ok(unit) => show(text, &unit),
            Err(e) => {
                println!("\n=== {} ===", text);
                println!("Error {} at offset {}: {}", e.code().code(), e.offset(), e);
            }
        }
    }
}
