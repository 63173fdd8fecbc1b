//! Recognition of metric prefix factors in floating multipliers.
//!
//! A `Multiply` converter whose factor is exactly the `f64` nearest to a
//! metric prefix factor is rewritten to the matching `PowerOfTen`, so the
//! formatter can glue a prefix symbol instead of writing a number.

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::model::converter::pow10_f64;
use crate::model::{Converter, Prefix};

lazy_static! {
    /// Prefix factors keyed by the bit pattern of their `f64` value.
    static ref PREFIX_FACTORS: FxHashMap<u64, Converter> = {
        let mut table = FxHashMap::default();
        for prefix in Prefix::METRIC {
            let converter = prefix.converter();
            if let Converter::PowerOfTen(exponent) = converter {
                if let Some(factor) = pow10_f64(exponent) {
                    table.insert(factor.to_bits(), converter);
                }
            }
        }
        debug!(entries = table.len(), "built prefix factor table");
        table
    };
}

/// Returns the prefix form of a floating multiplier, or the converter
/// unchanged.
///
/// Matching compares exact bit patterns; there is no tolerance.
pub fn classify(converter: &Converter) -> Converter {
    match converter {
        Converter::Multiply(factor) => PREFIX_FACTORS
            .get(&factor.to_bits())
            .cloned()
            .unwrap_or_else(|| converter.clone()),
        other => other.clone(),
    }
}
