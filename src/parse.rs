use crate::{
    equations::Equation,
    variables::{self, MAX_VARIABLES},
};
use arrayvec::ArrayVec;
use smol_str::SmolStr;
use std::{iter::Peekable, ops::Range};
use thiserror::Error;

/// Parse a linear equation like `2x + 3y = 7` for a system with
/// `num_variables` unknowns.
///
/// Coefficients for variables that are never mentioned are zero, and a
/// variable mentioned more than once has its coefficients summed (so
/// `x + x = 2` is the same as `2x = 2`).
pub fn parse(text: &str, num_variables: usize) -> Result<Equation, ParseError> {
    if num_variables > MAX_VARIABLES {
        return Err(ParseError::TooManyVariables {
            requested: num_variables,
        });
    }

    let found = text.matches('=').count();
    let (left, right) = match text.split_once('=') {
        Some(halves) if found == 1 => halves,
        _ => return Err(ParseError::MissingOrAmbiguousEquals { found }),
    };

    let coefficients = Parser::new(left, num_variables).parse()?;
    let constant = parse_constant(right)?;

    Ok(Equation {
        coefficients,
        constant,
        raw_text: text.into(),
    })
}

/// The right hand side must be a plain number. We let a sign be separated
/// from its digits by whitespace because that's what the keypad produces.
fn parse_constant(src: &str) -> Result<f64, ParseError> {
    let trimmed = src.trim();
    let malformed = || ParseError::MalformedConstant {
        text: trimmed.into(),
    };

    let (negative, digits) = match trimmed.chars().next() {
        Some('-') => (true, trimmed[1..].trim_start()),
        Some('+') => (false, trimmed[1..].trim_start()),
        _ => (false, trimmed),
    };

    // the sign has already been handled, so "--5" or "- +5" are rejected
    if !digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Err(malformed());
    }

    let value: f64 = digits.parse().map_err(|_| malformed())?;

    if !value.is_finite() {
        return Err(malformed());
    }

    Ok(if negative { -value } else { value })
}

/// A parser for the left hand side of an equation.
///
/// The grammar:
///
/// ```text
/// terms          := term (sign term)*
///
/// term           := sign? NUMBER? "*"? IDENTIFIER
///
/// sign           := "+" | "-"
/// ```
#[derive(Debug, Clone)]
struct Parser<'a> {
    tokens: Peekable<Tokens<'a>>,
    num_variables: usize,
    end_of_input: usize,
}

type Coefficients = ArrayVec<[f64; MAX_VARIABLES]>;

impl<'a> Parser<'a> {
    fn new(src: &'a str, num_variables: usize) -> Self {
        Parser {
            tokens: Tokens::new(src).peekable(),
            num_variables,
            end_of_input: src.len(),
        }
    }

    fn parse(mut self) -> Result<Coefficients, ParseError> {
        let mut coefficients: Coefficients =
            (0..self.num_variables).map(|_| 0.0).collect();

        // the first term's sign is optional
        let (index, value) = self.term(1.0)?;
        coefficients[index] += value;

        while let Some(token) = self.tokens.next() {
            let token = token?;

            let sign = match token.kind {
                TokenKind::Plus => 1.0,
                TokenKind::Minus => -1.0,
                other => {
                    return Err(ParseError::UnexpectedToken {
                        found: other,
                        span: token.span,
                        expected: &[TokenKind::Plus, TokenKind::Minus],
                    })
                },
            };

            let (index, value) = self.term(sign)?;
            coefficients[index] += value;
        }

        Ok(coefficients)
    }

    fn peek(&mut self) -> Option<TokenKind> {
        self.tokens
            .peek()
            .and_then(|result| result.as_ref().ok())
            .map(|tok| tok.kind)
    }

    fn advance(&mut self) -> Result<Token<'a>, ParseError> {
        match self.tokens.next() {
            Some(result) => result,
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    /// Parse a single term, returning the column it belongs to and its
    /// signed coefficient.
    fn term(&mut self, mut sign: f64) -> Result<(usize, f64), ParseError> {
        match self.peek() {
            Some(TokenKind::Minus) => {
                let _ = self.advance()?;
                sign = -sign;
            },
            Some(TokenKind::Plus) => {
                let _ = self.advance()?;
            },
            _ => {},
        }

        let magnitude = if self.peek() == Some(TokenKind::Number) {
            self.number()?
        } else {
            1.0
        };

        if self.peek() == Some(TokenKind::Times) {
            let _ = self.advance()?;
        }

        let index = self.variable()?;

        Ok((index, sign * magnitude))
    }

    fn number(&mut self) -> Result<f64, ParseError> {
        let token = self.advance()?;
        debug_assert_eq!(token.kind, TokenKind::Number);

        match token.text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ParseError::MalformedNumber {
                text: token.text.into(),
                span: token.span,
            }),
        }
    }

    fn variable(&mut self) -> Result<usize, ParseError> {
        let token = match self.tokens.next() {
            Some(token) => token?,
            None => {
                return Err(ParseError::UnexpectedToken {
                    found: TokenKind::EndOfInput,
                    span: self.end_of_input..self.end_of_input,
                    expected: &[TokenKind::Identifier],
                })
            },
        };

        if token.kind != TokenKind::Identifier {
            return Err(ParseError::UnexpectedToken {
                found: token.kind,
                span: token.span,
                expected: &[TokenKind::Identifier],
            });
        }

        match variables::index_of(token.text) {
            Some(index) if index < self.num_variables => Ok(index),
            _ => Err(ParseError::UnknownOrOutOfRangeVariable {
                name: token.text.into(),
                num_variables: self.num_variables,
            }),
        }
    }
}

/// Possible errors that may occur while parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("an equation needs exactly one \"=\", but {found} were found")]
    MissingOrAmbiguousEquals { found: usize },
    #[error("\"{text}\" isn't a number")]
    MalformedConstant { text: SmolStr },
    #[error(
        "\"{name}\" isn't one of the {num_variables} variables in this system"
    )]
    UnknownOrOutOfRangeVariable {
        name: SmolStr,
        num_variables: usize,
    },
    #[error("invalid character, {character:?}, at index {index}")]
    InvalidCharacter { character: char, index: usize },
    #[error("\"{text}\" at {span:?} isn't a valid coefficient")]
    MalformedNumber { text: SmolStr, span: Range<usize> },
    #[error("found {found:?} at {span:?} but expected one of {expected:?}")]
    UnexpectedToken {
        found: TokenKind,
        span: Range<usize>,
        expected: &'static [TokenKind],
    },
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("at most {} variables are supported, not {requested}", MAX_VARIABLES)]
    TooManyVariables { requested: usize },
}

#[derive(Debug, Clone, PartialEq)]
struct Tokens<'a> {
    src: &'a str,
    cursor: usize,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self { Tokens { src, cursor: 0 } }

    fn rest(&self) -> &'a str { &self.src[self.cursor..] }

    fn peek(&self) -> Option<char> { self.rest().chars().next() }

    fn peek_nth(&self, n: usize) -> Option<char> { self.rest().chars().nth(n) }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    fn chomp(
        &mut self,
        kind: TokenKind,
    ) -> Option<Result<Token<'a>, ParseError>> {
        let start = self.cursor;
        self.advance()?;
        let end = self.cursor;

        Some(Ok(Token::from_text(self.src, start..end, kind)))
    }

    fn take_while<P>(&mut self, mut predicate: P) -> Range<usize>
    where
        P: FnMut(char) -> bool,
    {
        let start = self.cursor;

        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }

            self.advance();
        }

        start..self.cursor
    }

    fn chomp_digits(&mut self) -> Range<usize> {
        self.take_while(|c| c.is_ascii_digit())
    }

    /// Is the cursor sitting on an exponent (`e5`, `E-5`, `e+05`) rather than
    /// the start of an identifier?
    fn at_exponent(&self) -> bool {
        let digit = |c: Option<char>| c.map_or(false, |c| c.is_ascii_digit());

        match (self.peek(), self.peek_nth(1)) {
            (Some('e'), next) | (Some('E'), next) => match next {
                Some('+') | Some('-') => digit(self.peek_nth(2)),
                other => digit(other),
            },
            _ => false,
        }
    }

    fn chomp_number(&mut self) -> Token<'a> {
        let start = self.cursor;
        self.chomp_digits();

        if self.peek() == Some('.') {
            // skip past the decimal
            self.advance();
            self.chomp_digits();
        }

        if self.at_exponent() {
            // the "e" and its optional sign, then the digits
            self.advance();
            if let Some('+') | Some('-') = self.peek() {
                self.advance();
            }
            self.chomp_digits();
        }

        Token::from_text(self.src, start..self.cursor, TokenKind::Number)
    }

    fn chomp_identifier(&mut self) -> Token<'a> {
        let span = self.take_while(|c| c.is_alphanumeric() || c == '_');

        Token::from_text(self.src, span, TokenKind::Identifier)
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            return match self.peek()? {
                space if space.is_whitespace() => {
                    self.advance();
                    continue;
                },
                '+' => self.chomp(TokenKind::Plus),
                '-' => self.chomp(TokenKind::Minus),
                '*' => self.chomp(TokenKind::Times),
                '_' | 'a'..='z' | 'A'..='Z' => {
                    Some(Ok(self.chomp_identifier()))
                },
                '0'..='9' | '.' => Some(Ok(self.chomp_number())),
                other => Some(Err(ParseError::InvalidCharacter {
                    character: other,
                    index: self.cursor,
                })),
            };
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token<'a> {
    text: &'a str,
    span: Range<usize>,
    kind: TokenKind,
}

impl<'a> Token<'a> {
    fn from_text(
        original_source: &'a str,
        span: Range<usize>,
        kind: TokenKind,
    ) -> Self {
        Token {
            text: &original_source[span.clone()],
            span,
            kind,
        }
    }
}

/// The kinds of token that can appear on the left hand side of an
/// equation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TokenKind {
    Identifier,
    Number,
    Plus,
    Minus,
    Times,
    EndOfInput,
}


#[cfg(test)]
mod parser_tests {
    use super::*;

    macro_rules! parse_test {
        ($name:ident, $src:expr, $num_variables:expr => $coefficients:expr, $constant:expr) => {
            #[test]
            fn $name() {
                let got = parse($src, $num_variables).unwrap();

                let should_be: &[f64] = &$coefficients;
                assert_eq!(got.coefficients(), should_be);
                assert_eq!(got.constant(), $constant);
                assert_eq!(got.raw_text(), $src);
            }
        };
    }

    parse_test!(two_variables, "2x + 3y = 7", 2 => [2.0, 3.0], 7.0);
    parse_test!(implicit_coefficients, "x - y = 0", 2 => [1.0, -1.0], 0.0);
    parse_test!(
        decimals,
        "1.5x - 0.5y + 2z = 10", 3 => [1.5, -0.5, 2.0], 10.0
    );
    parse_test!(repeated_variables_accumulate, "x + x = 2", 2 => [2.0, 0.0], 2.0);
    parse_test!(cancelling_terms, "x - x + y = 1", 2 => [0.0, 1.0], 1.0);
    parse_test!(unmentioned_variables_are_zero, "z = 4", 3 => [0.0, 0.0, 1.0], 4.0);
    parse_test!(leading_minus, "-x + y = 3", 2 => [-1.0, 1.0], 3.0);
    parse_test!(leading_plus, "+2y = 3", 2 => [0.0, 2.0], 3.0);
    parse_test!(explicit_multiplication, "2*x + 3 * y = 1", 2 => [2.0, 3.0], 1.0);
    parse_test!(no_whitespace, "2x-3y=-4", 2 => [2.0, -3.0], -4.0);
    parse_test!(signed_term_after_operator, "x + -2y = 0", 2 => [1.0, -2.0], 0.0);
    parse_test!(exponent_in_coefficient, "1e-5x + y = 1", 2 => [1e-5, 1.0], 1.0);
    parse_test!(exponent_in_constant, "x + y = 2.5e3", 2 => [1.0, 1.0], 2500.0);
    parse_test!(keypad_style_negative_constant, "x + y =  - 5", 2 => [1.0, 1.0], -5.0);
    parse_test!(
        ten_variables,
        "x + 2y + 3z + 4w + 5v + 6u + 7p + 8q + 9r + 10s = 55", 10 =>
        [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0], 55.0
    );

    #[test]
    fn missing_equals() {
        let got = parse("2x + 3y", 2).unwrap_err();

        assert_eq!(got, ParseError::MissingOrAmbiguousEquals { found: 0 });
    }

    #[test]
    fn more_than_one_equals() {
        let got = parse("x = y = 2", 2).unwrap_err();

        assert_eq!(got, ParseError::MissingOrAmbiguousEquals { found: 2 });
    }

    #[test]
    fn constant_must_be_a_number() {
        let got = parse("x + y = seven", 2).unwrap_err();

        assert_eq!(
            got,
            ParseError::MalformedConstant {
                text: "seven".into()
            }
        );
    }

    #[test]
    fn empty_constant_is_not_zero() {
        let got = parse("x + y = ", 2).unwrap_err();

        assert_eq!(got, ParseError::MalformedConstant { text: "".into() });
    }

    #[test]
    fn constant_cant_be_infinite() {
        assert!(matches!(
            parse("x = inf", 2),
            Err(ParseError::MalformedConstant { .. })
        ));
        assert!(matches!(
            parse("x = NaN", 2),
            Err(ParseError::MalformedConstant { .. })
        ));
    }

    #[test]
    fn unknown_variable() {
        let got = parse("2x + 3a = 7", 2).unwrap_err();

        assert_eq!(
            got,
            ParseError::UnknownOrOutOfRangeVariable {
                name: "a".into(),
                num_variables: 2
            }
        );
    }

    #[test]
    fn variable_outside_the_configured_system() {
        let got = parse("x + y + z = 1", 2).unwrap_err();

        assert_eq!(
            got,
            ParseError::UnknownOrOutOfRangeVariable {
                name: "z".into(),
                num_variables: 2
            }
        );
    }

    #[test]
    fn term_without_a_variable() {
        let got = parse("2x + 3 = 7", 2).unwrap_err();

        assert_eq!(
            got,
            ParseError::UnexpectedToken {
                found: TokenKind::EndOfInput,
                span: 7..7,
                expected: &[TokenKind::Identifier],
            }
        );
    }

    #[test]
    fn two_coefficients_in_a_row() {
        let got = parse("2 3x = 7", 2).unwrap_err();

        assert_eq!(
            got,
            ParseError::UnexpectedToken {
                found: TokenKind::Number,
                span: 2..3,
                expected: &[TokenKind::Identifier],
            }
        );
    }

    #[test]
    fn missing_operator_between_terms() {
        let got = parse("x y = 7", 2).unwrap_err();

        assert_eq!(
            got,
            ParseError::UnexpectedToken {
                found: TokenKind::Identifier,
                span: 2..3,
                expected: &[TokenKind::Plus, TokenKind::Minus],
            }
        );
    }

    #[test]
    fn lone_decimal_point_is_not_a_coefficient() {
        let got = parse(".x = 7", 2).unwrap_err();

        assert_eq!(
            got,
            ParseError::MalformedNumber {
                text: ".".into(),
                span: 0..1,
            }
        );
    }

    #[test]
    fn empty_left_hand_side() {
        assert!(matches!(
            parse(" = 7", 2),
            Err(ParseError::UnexpectedToken {
                found: TokenKind::EndOfInput,
                ..
            })
        ));
    }

    #[test]
    fn too_many_variables() {
        let got = parse("x = 1", 11).unwrap_err();

        assert_eq!(got, ParseError::TooManyVariables { requested: 11 });
    }

    #[test]
    fn errors_have_human_readable_messages() {
        let got = parse("x + a = 1", 2).unwrap_err();

        assert_eq!(
            got.to_string(),
            "\"a\" isn't one of the 2 variables in this system"
        );
    }
}
