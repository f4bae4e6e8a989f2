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

//! Part of the lexer that parses operators.

use super::Lexer;
use crate::parser::error::Result;
use std::fmt;

/// Operator token identifier.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    /// Newline
    Newline,
    /// `&`
    And,
    /// `&&`
    AndAnd,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `;`
    Semicolon,
    /// `;;`
    SemicolonSemicolon,
    /// `<`
    Less,
    /// `<&`
    LessAnd,
    /// `<<`
    LessLess,
    /// `<<-`
    LessLessDash,
    /// `<>`
    LessGreater,
    /// `>`
    Greater,
    /// `>&`
    GreaterAnd,
    /// `>>`
    GreaterGreater,
    /// `>|`
    GreaterBar,
    /// `|`
    Bar,
    /// `||`
    BarBar,
}

/// All operators, longer ones first for the longest match
const OPERATORS: &[(&[u8], Operator)] = &[
    (b"<<-", Operator::LessLessDash),
    (b"&&", Operator::AndAnd),
    (b";;", Operator::SemicolonSemicolon),
    (b"<&", Operator::LessAnd),
    (b"<<", Operator::LessLess),
    (b"<>", Operator::LessGreater),
    (b">&", Operator::GreaterAnd),
    (b">>", Operator::GreaterGreater),
    (b">|", Operator::GreaterBar),
    (b"||", Operator::BarBar),
    (b"\n", Operator::Newline),
    (b"&", Operator::And),
    (b"(", Operator::OpenParen),
    (b")", Operator::CloseParen),
    (b";", Operator::Semicolon),
    (b"<", Operator::Less),
    (b">", Operator::Greater),
    (b"|", Operator::Bar),
];

impl Operator {
    /// Returns the source text of the operator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        use Operator::*;
        match self {
            Newline => "\n",
            And => "&",
            AndAnd => "&&",
            OpenParen => "(",
            CloseParen => ")",
            Semicolon => ";",
            SemicolonSemicolon => ";;",
            Less => "<",
            LessAnd => "<&",
            LessLess => "<<",
            LessLessDash => "<<-",
            LessGreater => "<>",
            Greater => ">",
            GreaterAnd => ">&",
            GreaterGreater => ">>",
            GreaterBar => ">|",
            Bar => "|",
            BarBar => "||",
        }
    }

    /// Tests whether this is a redirection operator.
    #[must_use]
    pub fn is_redirection(self) -> bool {
        use Operator::*;
        matches!(
            self,
            Less | LessAnd
                | LessLess
                | LessLessDash
                | LessGreater
                | Greater
                | GreaterAnd
                | GreaterGreater
                | GreaterBar
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tests whether the byte can start an operator.
#[must_use]
pub fn is_operator_char(byte: u8) -> bool {
    matches!(byte, b'\n' | b'&' | b'(' | b')' | b';' | b'<' | b'>' | b'|')
}

impl Lexer<'_> {
    /// Parses an operator at the current position.
    ///
    /// If an operator is found, it is consumed and returned. Otherwise,
    /// nothing is consumed.
    pub(super) fn operator(&mut self) -> Result<Option<Operator>> {
        match self.peek()? {
            Some(byte) if is_operator_char(byte) => (),
            _ => return Ok(None),
        }
        // Operators never span lines, so the line in the buffer is enough.
        for &(text, op) in OPERATORS {
            let matches = text
                .iter()
                .enumerate()
                .all(|(i, &b)| self.buffer.get(self.next_index + i) == Some(&b));
            if matches {
                for _ in 0..text.len() {
                    self.consume()?;
                }
                return Ok(Some(op));
            }
        }
        Ok(None)
    }
}
