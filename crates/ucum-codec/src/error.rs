//! Error types for UCUM formatting and parsing.

use thiserror::Error;

use crate::symbols::Variant;

/// Stable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// U001: Unit cannot be formatted
    Format,
    /// U002: Expression cannot be parsed
    Parse,
    /// U003: Expression cannot be tokenized
    Lex,
    /// U004: Operation not supported by the variant
    UnsupportedOperation,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "U001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::Format => "U001",
            ErrorCode::Parse => "U002",
            ErrorCode::Lex => "U003",
            ErrorCode::UnsupportedOperation => "U004",
        }
    }
}

/// Error while rendering a unit as text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("[U001] unsupported unit: {kind}")]
    UnsupportedUnit { kind: &'static str },

    #[error("[U001] scale factor {factor} is not a positive integer")]
    NonIntegerFactor { factor: f64 },

    #[error("[U001] scale factor {factor} cannot be written as a quotient of positive integers")]
    UnsupportedFactor { factor: String },

    #[error("[U001] annotation {annotation:?} contains a closing brace")]
    InvalidAnnotation { annotation: String },
}

impl FormatError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::Format
    }
}

/// Error while splitting an expression into tokens.
///
/// Offsets are absolute byte offsets into the input string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("[U003] illegal character {character:?} at {offset}")]
    IllegalCharacter { character: char, offset: usize },

    #[error("[U003] unterminated annotation starting at {offset}")]
    UnterminatedAnnotation { offset: usize },

    #[error("[U003] unterminated bracket starting at {offset}")]
    UnterminatedBracket { offset: usize },

    #[error("[U003] unmatched {character:?} at {offset}")]
    UnmatchedClose { character: char, offset: usize },

    #[error("[U003] sign without digits at {offset}")]
    DanglingSign { offset: usize },
}

impl LexError {
    /// Returns the offset the error points at.
    pub fn offset(&self) -> usize {
        match self {
            LexError::IllegalCharacter { offset, .. }
            | LexError::UnterminatedAnnotation { offset }
            | LexError::UnterminatedBracket { offset }
            | LexError::UnmatchedClose { offset, .. }
            | LexError::DanglingSign { offset } => *offset,
        }
    }
}

/// Error while parsing a unit expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("[U002] unknown unit symbol {symbol:?} at {offset}")]
    UnknownSymbol { symbol: String, offset: usize },

    #[error("[U002] unmatched parenthesis at {offset}")]
    UnmatchedParenthesis { offset: usize },

    #[error("[U002] invalid exponent {exponent} at {offset}")]
    InvalidExponent { exponent: String, offset: usize },

    #[error("[U002] invalid factor {factor} at {offset}")]
    InvalidFactor { factor: String, offset: usize },

    #[error("[U002] unexpected {found} at {offset}")]
    UnexpectedToken { found: String, offset: usize },

    #[error("[U002] unexpected end of expression at {offset}")]
    UnexpectedEnd { offset: usize },

    #[error("[U002] nesting deeper than {max} levels at {offset}")]
    NestingTooDeep { max: usize, offset: usize },

    /// `offset` is the first byte past the limit, counted from the start
    /// of the whole input.
    #[error("[U002] expression length {len} exceeds maximum {max} at {offset}")]
    InputTooLong { len: usize, max: usize, offset: usize },

    #[error("[U002] parse position {index} is outside the input")]
    InvalidPosition { index: usize },

    #[error("[U004] the {variant} variant cannot be parsed")]
    UnsupportedOperation { variant: Variant },
}

impl ParseError {
    /// Returns the offset the error points at.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Lex(err) => err.offset(),
            ParseError::UnknownSymbol { offset, .. }
            | ParseError::UnmatchedParenthesis { offset }
            | ParseError::InvalidExponent { offset, .. }
            | ParseError::InvalidFactor { offset, .. }
            | ParseError::UnexpectedToken { offset, .. }
            | ParseError::UnexpectedEnd { offset }
            | ParseError::NestingTooDeep { offset, .. }
            | ParseError::InputTooLong { offset, .. } => *offset,
            ParseError::InvalidPosition { index } => *index,
            ParseError::UnsupportedOperation { .. } => 0,
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ParseError::Lex(_) => ErrorCode::Lex,
            ParseError::UnsupportedOperation { .. } => ErrorCode::UnsupportedOperation,
            _ => ErrorCode::Parse,
        }
    }
}
