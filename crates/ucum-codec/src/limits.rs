//! Safety limits applied while parsing untrusted expressions.

/// Maximum depth of nested parenthesised terms.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Maximum absolute value of an exponent, including the combined exponent
/// of nested groups such as `((m2)3)4`.
pub const MAX_EXPONENT: u32 = 1000;

/// Maximum size in bits of the exact factors of a unit raised to a power
/// (`(60)100`, `(m.60)100`).
pub const MAX_FACTOR_BITS: u64 = 8192;

/// Maximum length of an expression in bytes.
pub const MAX_INPUT_LEN: usize = 4096;
