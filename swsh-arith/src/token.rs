// This file is part of swsh, a POSIX-conformant shell.
// Copyright (C) 2022 WATANABE Yuki
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Tokenization

use std::ops::Range;
use thiserror::Error;

/// Operator
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    /// `?`
    Question,
    /// `:`
    Colon,
    /// `|`
    Bar,
    /// `||`
    BarBar,
    /// `|=`
    BarEqual,
    /// `^`
    Caret,
    /// `^=`
    CaretEqual,
    /// `&`
    And,
    /// `&&`
    AndAnd,
    /// `&=`
    AndEqual,
    /// `=`
    Equal,
    /// `==`
    EqualEqual,
    /// `!`
    Bang,
    /// `!=`
    BangEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `<<`
    LessLess,
    /// `<<=`
    LessLessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `>>`
    GreaterGreater,
    /// `>>=`
    GreaterGreaterEqual,
    /// `+`
    Plus,
    /// `+=`
    PlusEqual,
    /// `-`
    Minus,
    /// `-=`
    MinusEqual,
    /// `*`
    Asterisk,
    /// `*=`
    AsteriskEqual,
    /// `/`
    Slash,
    /// `/=`
    SlashEqual,
    /// `%`
    Percent,
    /// `%=`
    PercentEqual,
    /// `~`
    Tilde,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
}

/// Operators sorted so that a longer operator precedes its prefixes
const OPERATORS: &[(&str, Operator)] = &[
    ("<<=", Operator::LessLessEqual),
    (">>=", Operator::GreaterGreaterEqual),
    ("||", Operator::BarBar),
    ("|=", Operator::BarEqual),
    ("^=", Operator::CaretEqual),
    ("&&", Operator::AndAnd),
    ("&=", Operator::AndEqual),
    ("==", Operator::EqualEqual),
    ("!=", Operator::BangEqual),
    ("<=", Operator::LessEqual),
    ("<<", Operator::LessLess),
    (">=", Operator::GreaterEqual),
    (">>", Operator::GreaterGreater),
    ("+=", Operator::PlusEqual),
    ("-=", Operator::MinusEqual),
    ("*=", Operator::AsteriskEqual),
    ("/=", Operator::SlashEqual),
    ("%=", Operator::PercentEqual),
    ("?", Operator::Question),
    (":", Operator::Colon),
    ("|", Operator::Bar),
    ("^", Operator::Caret),
    ("&", Operator::And),
    ("=", Operator::Equal),
    ("!", Operator::Bang),
    ("<", Operator::Less),
    (">", Operator::Greater),
    ("+", Operator::Plus),
    ("-", Operator::Minus),
    ("*", Operator::Asterisk),
    ("/", Operator::Slash),
    ("%", Operator::Percent),
    ("~", Operator::Tilde),
    ("(", Operator::OpenParen),
    (")", Operator::CloseParen),
];

impl Operator {
    /// Returns the binary operator precedence, or `None` if this is not a
    /// binary operator.
    ///
    /// A larger number binds tighter. The conditional operator `?` is
    /// included because its condition is reduced like a binary operand.
    #[must_use]
    pub fn precedence(self) -> Option<u8> {
        use Operator::*;
        Some(match self {
            Equal | BarEqual | CaretEqual | AndEqual | LessLessEqual | GreaterGreaterEqual
            | PlusEqual | MinusEqual | AsteriskEqual | SlashEqual | PercentEqual => 1,
            Question => 2,
            BarBar => 3,
            AndAnd => 4,
            Bar => 5,
            Caret => 6,
            And => 7,
            EqualEqual | BangEqual => 8,
            Less | LessEqual | Greater | GreaterEqual => 9,
            LessLess | GreaterGreater => 10,
            Plus | Minus => 11,
            Asterisk | Slash | Percent => 12,
            Colon | Bang | Tilde | OpenParen | CloseParen => return None,
        })
    }

    /// Tests whether this operator groups from right to left.
    #[must_use]
    pub fn is_right_associative(self) -> bool {
        self.precedence().is_some_and(|p| p <= 2)
    }

    /// Returns the binary operator a compound assignment applies, if any.
    ///
    /// The plain assignment `=` returns `Some(None)`.
    #[must_use]
    pub fn assignment(self) -> Option<Option<Operator>> {
        use Operator::*;
        Some(match self {
            Equal => None,
            BarEqual => Some(Bar),
            CaretEqual => Some(Caret),
            AndEqual => Some(And),
            LessLessEqual => Some(LessLess),
            GreaterGreaterEqual => Some(GreaterGreater),
            PlusEqual => Some(Plus),
            MinusEqual => Some(Minus),
            AsteriskEqual => Some(Asterisk),
            SlashEqual => Some(Slash),
            PercentEqual => Some(Percent),
            _ => return None,
        })
    }
}

/// Value of a token
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TokenValue<'a> {
    /// Integer constant
    Number(i64),
    /// Variable name
    Identifier(&'a str),
    /// Operator
    Operator(Operator),
    /// End of input
    EndOfInput,
}

/// Token with its location in the expression
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Token<'a> {
    pub value: TokenValue<'a>,
    /// Range of the substring where the token occurs in the parsed expression
    pub location: Range<usize>,
}

/// Cause of a tokenization error
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum TokenError {
    /// A value token contains an invalid character.
    #[error("invalid numeric constant")]
    InvalidNumericConstant,
    /// An expression contains a character that cannot start a token.
    #[error("invalid character")]
    InvalidCharacter,
}

/// Parses an integer constant.
///
/// The prefix `0x` or `0X` selects hexadecimal and a leading `0` selects
/// octal. Surrounding whitespace is not allowed.
pub fn parse_integer(s: &str) -> Option<i64> {
    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x").or(s.strip_prefix("0X")) {
        (hex, 16)
    } else if s.len() > 1 && s.starts_with('0') {
        (&s[1..], 8)
    } else {
        (s, 10)
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    i64::from_str_radix(digits, radix).ok()
}

/// Iterator extracting tokens from a string
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    source: &'a str,
    index: usize,
}

impl<'a> Tokens<'a> {
    /// Creates a tokenizer.
    pub fn new(source: &'a str) -> Self {
        Tokens { source, index: 0 }
    }

    /// Returns the next token.
    pub fn next_token<E>(&mut self) -> Result<Token<'a>, crate::Error<E>> {
        let rest = &self.source[self.index..];
        let trimmed = rest.trim_start_matches([' ', '\t', '\n', '\r']);
        let start = self.index + (rest.len() - trimmed.len());
        self.index = start;

        let Some(first) = trimmed.chars().next() else {
            return Ok(Token {
                value: TokenValue::EndOfInput,
                location: start..start,
            });
        };

        if first.is_ascii_alphanumeric() || first == '_' {
            let len = trimmed
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(trimmed.len());
            let word = &trimmed[..len];
            let location = start..start + len;
            self.index = location.end;
            let value = if first.is_ascii_digit() {
                match parse_integer(word) {
                    Some(number) => TokenValue::Number(number),
                    None => {
                        return Err(crate::Error {
                            cause: crate::ErrorCause::TokenError(
                                TokenError::InvalidNumericConstant,
                            ),
                            location,
                        });
                    }
                }
            } else {
                TokenValue::Identifier(word)
            };
            return Ok(Token { value, location });
        }

        match OPERATORS.iter().find(|(s, _)| trimmed.starts_with(s)) {
            Some(&(s, operator)) => {
                let location = start..start + s.len();
                self.index = location.end;
                Ok(Token {
                    value: TokenValue::Operator(operator),
                    location,
                })
            }
            None => Err(crate::Error {
                cause: crate::ErrorCause::TokenError(TokenError::InvalidCharacter),
                location: start..start + first.len_utf8(),
            }),
        }
    }
}
