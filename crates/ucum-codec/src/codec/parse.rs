//! Recursive-descent parser for UCUM unit expressions.
//!
//! ```text
//! term       ::= ['/'] component (('.' | '/') component)*
//! component  ::= factor [annotation]
//!              | primary [annotation] [exponent] [annotation]
//! primary    ::= [prefix] atomic_symbol | '(' term ')' | annotation
//! factor     ::= digits
//! exponent   ::= ['+' | '-'] digits
//! annotation ::= '{' text '}'
//! ```
//!
//! Evaluation is strictly left to right; exponents bind tighter than `.`
//! and `/`.

use std::borrow::Cow;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use tracing::debug;

use crate::codec::lexer::{Lexer, Token, TokenKind};
use crate::error::{LexError, ParseError};
use crate::limits::{MAX_EXPONENT, MAX_FACTOR_BITS, MAX_INPUT_LEN, MAX_NESTING_DEPTH};
use crate::model::{Converter, Unit};
use crate::symbols::{SymbolMap, Variant};

/// A cursor into a larger text.
///
/// On success `index` is advanced past the parsed expression; on failure
/// `index` is left unchanged and `error_index` points at the problem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParsePosition {
    pub index: usize,
    pub error_index: Option<usize>,
}

impl ParsePosition {
    /// Creates a cursor at `index`.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            error_index: None,
        }
    }
}

/// Parses unit expressions of one variant.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    variant: Variant,
    symbols: &'a SymbolMap,
}

impl<'a> Parser<'a> {
    /// Creates a parser.
    pub fn new(variant: Variant, symbols: &'a SymbolMap) -> Self {
        Self { variant, symbols }
    }

    /// Parses a complete expression.
    ///
    /// The whole input must be consumed; an empty input is the
    /// dimensionless unit.
    pub fn parse(&self, input: &str) -> Result<Unit, ParseError> {
        let mut position = ParsePosition::new(0);
        self.parse_with(input, &mut position, false)
    }

    /// Parses an expression embedded in a larger text, starting at
    /// `position.index`.
    ///
    /// Parsing stops at whitespace, `,`, `;` or any other character or
    /// token that cannot continue the expression.
    pub fn parse_at(&self, input: &str, position: &mut ParsePosition) -> Result<Unit, ParseError> {
        self.parse_with(input, position, true)
    }

    fn parse_with(
        &self,
        input: &str,
        position: &mut ParsePosition,
        embedded: bool,
    ) -> Result<Unit, ParseError> {
        match self.run(input, position.index, embedded) {
            Ok((unit, end)) => {
                position.index = end;
                position.error_index = None;
                Ok(unit)
            }
            Err(err) => {
                debug!(
                    variant = %self.variant,
                    input,
                    offset = err.offset(),
                    error = %err,
                    "failed to parse unit"
                );
                position.error_index = Some(err.offset());
                Err(err)
            }
        }
    }

    fn run(&self, input: &str, start: usize, embedded: bool) -> Result<(Unit, usize), ParseError> {
        if !self.variant.is_parseable() {
            return Err(ParseError::UnsupportedOperation {
                variant: self.variant,
            });
        }
        if start > input.len() || !input.is_char_boundary(start) {
            return Err(ParseError::InvalidPosition { index: start });
        }
        // Embedded expressions are bounded as they are consumed.
        let len = input.len() - start;
        if !embedded && len > MAX_INPUT_LEN {
            return Err(ParseError::InputTooLong {
                len,
                max: MAX_INPUT_LEN,
                offset: start + MAX_INPUT_LEN,
            });
        }

        let mut cursor = Cursor::new(Lexer::new(input, start, embedded), start);
        if cursor.peek().is_none() {
            return match cursor.deferred.take() {
                Some(err) => Err(err.into()),
                None => Ok((Unit::one(), start)),
            };
        }
        let (unit, _) = self.term(&mut cursor, 0)?;
        if embedded {
            return Ok((unit, cursor.consumed_end));
        }
        match cursor.peek().cloned() {
            Some(token) if token.kind == TokenKind::Close => Err(ParseError::UnmatchedParenthesis {
                offset: token.start,
            }),
            Some(token) => Err(unexpected(&token)),
            None => match cursor.deferred.take() {
                Some(err) => Err(err.into()),
                None => Ok((unit, cursor.consumed_end)),
            },
        }
    }

    /// Parses a term. Returns the unit and the largest power any of its
    /// components has been raised to, counting enclosing groups.
    fn term(&self, cursor: &mut Cursor<'_>, depth: usize) -> Result<(Unit, u32), ParseError> {
        let (mut unit, mut power) = if cursor.eat(&TokenKind::Solidus)? {
            let (unit, power) = self.component(cursor, depth)?;
            (unit.inverse(), power)
        } else {
            self.component(cursor, depth)?
        };
        loop {
            let divide = if cursor.eat(&TokenKind::Period)? {
                false
            } else if cursor.eat(&TokenKind::Solidus)? {
                true
            } else {
                return Ok((unit, power));
            };
            let (next, next_power) = self.component(cursor, depth)?;
            unit = if divide {
                unit.divide(&next)
            } else {
                unit.multiply(&next)
            };
            power = power.max(next_power);
        }
    }

    fn component(&self, cursor: &mut Cursor<'_>, depth: usize) -> Result<(Unit, u32), ParseError> {
        let Some(token) = cursor.next()? else {
            return Err(ParseError::UnexpectedEnd {
                offset: cursor.consumed_end,
            });
        };
        let (primary, power) = match &token.kind {
            TokenKind::Integer { digits, sign } => {
                let factor = parse_factor(digits, *sign, token.start)?;
                let unit = Unit::one().scale(factor);
                let unit = match cursor.annotation()? {
                    Some(annotation) => unit.annotate(annotation),
                    None => unit,
                };
                return Ok((unit, 1));
            }
            TokenKind::Symbol(symbol) => (self.resolve(symbol, token.start)?, 1),
            TokenKind::Annotation(annotation) => (Unit::one().annotate(annotation.as_str()), 1),
            TokenKind::Open => {
                if depth >= MAX_NESTING_DEPTH {
                    return Err(ParseError::NestingTooDeep {
                        max: MAX_NESTING_DEPTH,
                        offset: token.start,
                    });
                }
                let inner = self.term(cursor, depth + 1)?;
                match cursor.next()? {
                    Some(close) if close.kind == TokenKind::Close => inner,
                    Some(other) => return Err(unexpected(&other)),
                    None => {
                        return Err(ParseError::UnmatchedParenthesis {
                            offset: token.start,
                        });
                    }
                }
            }
            _ => return Err(unexpected(&token)),
        };
        self.suffixes(cursor, primary, power)
    }

    /// Applies `[annotation] [exponent] [annotation]` to a primary.
    fn suffixes(
        &self,
        cursor: &mut Cursor<'_>,
        mut unit: Unit,
        mut power: u32,
    ) -> Result<(Unit, u32), ParseError> {
        if let Some(annotation) = cursor.annotation()? {
            unit = unit.annotate(annotation);
        }
        let exponent = cursor.take_if(|kind| matches!(kind, TokenKind::Integer { .. }))?;
        if let Some(Token {
            kind: TokenKind::Integer { digits, sign },
            start,
            ..
        }) = exponent
        {
            let invalid = || ParseError::InvalidExponent {
                exponent: format!("{}{}", sign.map(String::from).unwrap_or_default(), digits),
                offset: start,
            };
            let exponent = parse_exponent(&digits, sign).ok_or_else(invalid)?;
            power = power
                .checked_mul(exponent.unsigned_abs())
                .filter(|power| *power <= MAX_EXPONENT)
                .ok_or_else(invalid)?;
            if !factor_fits(&unit, exponent) {
                return Err(invalid());
            }
            unit = unit.pow(exponent);
            if let Some(annotation) = cursor.annotation()? {
                unit = unit.annotate(annotation);
            }
        }
        Ok((unit, power))
    }

    /// Resolves a terminal symbol, with an optional prefix.
    fn resolve(&self, symbol: &str, offset: usize) -> Result<Unit, ParseError> {
        let key = match self.variant {
            Variant::CaseInsensitive => Cow::Owned(symbol.to_ascii_uppercase()),
            _ => Cow::Borrowed(symbol),
        };
        match self.symbols.resolve(&key) {
            Some(resolved) => Ok(resolved.to_unit()),
            None => Err(ParseError::UnknownSymbol {
                symbol: symbol.to_string(),
                offset,
            }),
        }
    }
}

/// Token reader over a [`Lexer`], tracking the end of the last consumed
/// token.
///
/// A lexer error is held back until the parser asks for the token it
/// replaces, so text after the end of an embedded expression is never
/// reported.
struct Cursor<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
    deferred: Option<LexError>,
    start: usize,
    consumed_end: usize,
}

impl<'a> Cursor<'a> {
    fn new(lexer: Lexer<'a>, start: usize) -> Self {
        Self {
            lexer,
            peeked: None,
            deferred: None,
            start,
            consumed_end: start,
        }
    }

    fn peek(&mut self) -> Option<&Token> {
        if self.peeked.is_none() && self.deferred.is_none() {
            match self.lexer.next() {
                Some(Ok(token)) => self.peeked = Some(token),
                Some(Err(err)) => self.deferred = Some(err),
                None => {}
            }
        }
        self.peeked.as_ref()
    }

    fn next(&mut self) -> Result<Option<Token>, ParseError> {
        self.peek();
        let Some(token) = self.peeked.take() else {
            return match self.deferred.take() {
                Some(err) => Err(err.into()),
                None => Ok(None),
            };
        };
        let len = token.end - self.start;
        if len > MAX_INPUT_LEN {
            return Err(ParseError::InputTooLong {
                len,
                max: MAX_INPUT_LEN,
                offset: self.start + MAX_INPUT_LEN,
            });
        }
        self.consumed_end = token.end;
        Ok(Some(token))
    }

    /// Consumes the next token if its kind matches.
    fn take_if(&mut self, accept: impl Fn(&TokenKind) -> bool) -> Result<Option<Token>, ParseError> {
        if self.peek().is_some_and(|token| accept(&token.kind)) {
            self.next()
        } else {
            Ok(None)
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> Result<bool, ParseError> {
        Ok(self.take_if(|found| found == kind)?.is_some())
    }

    fn annotation(&mut self) -> Result<Option<String>, ParseError> {
        Ok(match self.take_if(|kind| matches!(kind, TokenKind::Annotation(_)))? {
            Some(Token {
                kind: TokenKind::Annotation(text),
                ..
            }) => Some(text),
            _ => None,
        })
    }
}

fn unexpected(token: &Token) -> ParseError {
    ParseError::UnexpectedToken {
        found: token.kind.to_string(),
        offset: token.start,
    }
}

fn parse_factor(digits: &str, sign: Option<char>, offset: usize) -> Result<BigRational, ParseError> {
    let invalid = || ParseError::InvalidFactor {
        factor: format!("{}{}", sign.map(String::from).unwrap_or_default(), digits),
        offset,
    };
    if sign.is_some() {
        return Err(invalid());
    }
    let value: BigInt = digits.parse().map_err(|_| invalid())?;
    if value.is_zero() {
        return Err(invalid());
    }
    Ok(BigRational::from_integer(value))
}

fn parse_exponent(digits: &str, sign: Option<char>) -> Option<i32> {
    let magnitude: u32 = digits.parse().ok()?;
    if magnitude > MAX_EXPONENT {
        return None;
    }
    let magnitude = i32::try_from(magnitude).ok()?;
    Some(if sign == Some('-') { -magnitude } else { magnitude })
}

/// Checks that raising the exact factors of `unit` to `exponent` stays
/// within [`MAX_FACTOR_BITS`]. Powers of ten and floats are raised without
/// growing.
fn factor_fits(unit: &Unit, exponent: i32) -> bool {
    let mut bits = 0u64;
    let mut current = unit;
    while let Unit::Transformed { parent, converter } = current {
        if let Converter::Rational(factor) = converter {
            bits = bits.saturating_add(factor.numer().bits().max(factor.denom().bits()));
        }
        current = parent.as_ref();
    }
    bits.saturating_mul(u64::from(exponent.unsigned_abs())) <= MAX_FACTOR_BITS
}
