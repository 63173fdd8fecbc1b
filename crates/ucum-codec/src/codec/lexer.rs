//! Tokenizer for UCUM unit expressions.
//!
//! Token offsets are absolute byte offsets into the full input, so errors
//! raised while parsing from a cursor point into the caller's text.

use std::fmt;

use crate::error::LexError;

/// Kind of a lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// An atomic unit symbol, possibly carrying a prefix (`km`, `[in_i]`).
    Symbol(String),
    /// A run of digits with an optional explicit sign.
    Integer { digits: String, sign: Option<char> },
    /// `.`
    Period,
    /// `/`
    Solidus,
    /// `(`
    Open,
    /// `)`
    Close,
    /// `{...}`; holds the text between the braces.
    Annotation(String),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Symbol(symbol) => write!(f, "symbol {symbol:?}"),
            TokenKind::Integer { digits, sign: Some(sign) } => write!(f, "integer {sign}{digits}"),
            TokenKind::Integer { digits, sign: None } => write!(f, "integer {digits}"),
            TokenKind::Period => f.write_str("'.'"),
            TokenKind::Solidus => f.write_str("'/'"),
            TokenKind::Open => f.write_str("'('"),
            TokenKind::Close => f.write_str("')'"),
            TokenKind::Annotation(text) => write!(f, "annotation {{{text}}}"),
        }
    }
}

/// A token with its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

/// Splits an expression into tokens.
///
/// Tokens are produced on demand, so text after the point where a caller
/// stops reading is never examined. The lexer stops after the first error.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    /// Stop at the first character that cannot start a token instead of
    /// failing.
    embedded: bool,
    /// Exponent digits split off the end of the previous symbol.
    pending: Option<Token>,
    done: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer reading `input` from byte offset `start`.
    pub fn new(input: &'a str, start: usize, embedded: bool) -> Self {
        Self {
            input,
            pos: start,
            embedded,
            pending: None,
            done: false,
        }
    }

    /// Reads tokens until the end of the expression.
    pub fn tokenize(self) -> Result<Vec<Token>, LexError> {
        self.collect()
    }

    fn read(&mut self) -> Result<Option<Token>, LexError> {
        if let Some(token) = self.pending.take() {
            return Ok(Some(token));
        }
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        let start = self.pos;
        let kind = match c {
            '.' => self.single(TokenKind::Period),
            '/' => self.single(TokenKind::Solidus),
            '(' => self.single(TokenKind::Open),
            ')' => self.single(TokenKind::Close),
            '{' => self.annotation()?,
            '}' | ']' => {
                if self.embedded {
                    return Ok(None);
                }
                return Err(LexError::UnmatchedClose {
                    character: c,
                    offset: start,
                });
            }
            '+' | '-' => self.signed_integer(c)?,
            c if c == '[' || is_atom_char(c) => return self.atom().map(Some),
            c => {
                if self.embedded {
                    return Ok(None);
                }
                return Err(LexError::IllegalCharacter {
                    character: c,
                    offset: start,
                });
            }
        };
        Ok(Some(Token {
            kind,
            start,
            end: self.pos,
        }))
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos..)?.chars().next()
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    fn annotation(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        let body = start + 1;
        let Some(close) = self.input[body..].find('}') else {
            return Err(LexError::UnterminatedAnnotation { offset: start });
        };
        self.pos = body + close + 1;
        Ok(TokenKind::Annotation(self.input[body..body + close].to_string()))
    }

    fn signed_integer(&mut self, sign: char) -> Result<TokenKind, LexError> {
        let start = self.pos;
        self.pos += 1;
        let digits = self.digits();
        if digits.is_empty() {
            return Err(LexError::DanglingSign { offset: start });
        }
        Ok(TokenKind::Integer {
            digits: digits.to_string(),
            sign: Some(sign),
        })
    }

    fn digits(&mut self) -> &'a str {
        let start = self.pos;
        let len = self.input[start..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        self.pos += len;
        &self.input[start..start + len]
    }

    /// Reads a run of symbol characters. An all-digit run is an integer;
    /// otherwise trailing digits are split off as an exponent (`m2`).
    fn atom(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '[' {
                let Some(close) = self.input[self.pos..].find(']') else {
                    return Err(LexError::UnterminatedBracket { offset: self.pos });
                };
                self.pos += close + 1;
            } else if is_atom_char(c) {
                self.pos += 1;
            } else {
                break;
            }
        }
        let run = &self.input[start..self.pos];
        let symbol_len = run.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        let exponent = Token {
            kind: TokenKind::Integer {
                digits: run[symbol_len..].to_string(),
                sign: None,
            },
            start: start + symbol_len,
            end: self.pos,
        };
        if symbol_len == 0 {
            return Ok(exponent);
        }
        if symbol_len < run.len() {
            self.pending = Some(exponent);
        }
        Ok(Token {
            kind: TokenKind::Symbol(run[..symbol_len].to_string()),
            start,
            end: start + symbol_len,
        })
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.read().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

/// Characters allowed in an atomic symbol outside square brackets.
fn is_atom_char(c: char) -> bool {
    c.is_ascii_graphic() && !matches!(c, '.' | '/' | '(' | ')' | '{' | '}' | '[' | ']' | '+' | '-' | ',' | ';')
}

/// Tokenizes a whole expression.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input, 0, false).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn symbol(s: &str) -> TokenKind {
        TokenKind::Symbol(s.to_string())
    }

    fn int(digits: &str, sign: Option<char>) -> TokenKind {
        TokenKind::Integer {
            digits: digits.to_string(),
            sign,
        }
    }

    #[test]
    fn test_operators_and_symbols() {
        assert_eq!(
            kinds("J/(K.mol)"),
            vec![
                symbol("J"),
                TokenKind::Solidus,
                TokenKind::Open,
                symbol("K"),
                TokenKind::Period,
                symbol("mol"),
                TokenKind::Close,
            ]
        );
    }

    #[test]
    fn test_exponents_split_from_symbols() {
        assert_eq!(kinds("m2"), vec![symbol("m"), int("2", None)]);
        assert_eq!(kinds("s-1"), vec![symbol("s"), int("1", Some('-'))]);
        assert_eq!(kinds("m+3"), vec![symbol("m"), int("3", Some('+'))]);
        assert_eq!(kinds("1000"), vec![int("1000", None)]);
        assert_eq!(kinds("10*3"), vec![symbol("10*"), int("3", None)]);
    }

    #[test]
    fn test_brackets_are_part_of_symbols() {
        assert_eq!(kinds("[in_i]2"), vec![symbol("[in_i]"), int("2", None)]);
        assert_eq!(kinds("[ppm]"), vec![symbol("[ppm]")]);
        assert_eq!(
            tokenize("[in_i"),
            Err(LexError::UnterminatedBracket { offset: 0 })
        );
    }

    #[test]
    fn test_annotations() {
        assert_eq!(
            kinds("L{RBC}"),
            vec![symbol("L"), TokenKind::Annotation("RBC".to_string())]
        );
        assert_eq!(kinds("{a b}"), vec![TokenKind::Annotation("a b".to_string())]);
        assert_eq!(
            tokenize("m{abc"),
            Err(LexError::UnterminatedAnnotation { offset: 1 })
        );
    }

    #[test]
    fn test_offsets_are_absolute() {
        let tokens = Lexer::new("xx km2", 3, false).tokenize().unwrap();
        assert_eq!(tokens[0].start, 3);
        assert_eq!(tokens[0].end, 5);
        assert_eq!(tokens[1].start, 5);
        assert_eq!(tokens[1].end, 6);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            tokenize("m s"),
            Err(LexError::IllegalCharacter {
                character: ' ',
                offset: 1
            })
        );
        assert_eq!(
            tokenize("m}"),
            Err(LexError::UnmatchedClose {
                character: '}',
                offset: 1
            })
        );
        assert_eq!(tokenize("m-"), Err(LexError::DanglingSign { offset: 1 }));
        assert_eq!(
            tokenize("µm"),
            Err(LexError::IllegalCharacter {
                character: 'µ',
                offset: 0
            })
        );
    }

    #[test]
    fn test_embedded_stops_at_delimiters() {
        let tokens = Lexer::new("km/h, more", 0, true).tokenize().unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].end, 4);

        let tokens = Lexer::new("m;s", 0, true).tokenize().unwrap();
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_tokens_are_read_on_demand() {
        let mut lexer = Lexer::new("m)-x", 0, true);
        assert_eq!(lexer.next().unwrap().unwrap().kind, symbol("m"));
        assert_eq!(lexer.next().unwrap().unwrap().kind, TokenKind::Close);
        assert_eq!(lexer.next(), Some(Err(LexError::DanglingSign { offset: 2 })));
        assert_eq!(lexer.next(), None);

        let mut lexer = Lexer::new("km2", 0, false);
        assert_eq!(lexer.next().unwrap().unwrap().kind, symbol("km"));
        assert_eq!(lexer.next().unwrap().unwrap().kind, int("2", None));
        assert_eq!(lexer.next(), None);
    }
}
