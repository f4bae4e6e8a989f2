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

//! Abstract syntax tree for globbing patterns

use crate::PatternChar;

mod regex;

pub use self::regex::ToRegex;

/// Item of a bracket expression
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketItem {
    /// Single byte
    Char(u8),
    /// Inclusive range of bytes
    Range(u8, u8),
    /// Character class such as `alpha` in `[:alpha:]`
    Class(String),
}

/// Bracket expression
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bracket {
    /// Whether the expression starts with `!` or `^`
    pub complement: bool,
    pub items: Vec<BracketItem>,
}

/// Pattern component
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Atom {
    /// Literal byte
    Char(u8),
    /// `?`
    AnyChar,
    /// `*`
    AnyString,
    /// `[...]`
    Bracket(Bracket),
}

/// Abstract syntax tree for a whole pattern
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Ast {
    pub atoms: Vec<Atom>,
}

const CLASSES: &[&str] = &[
    "alnum", "alpha", "blank", "cntrl", "digit", "graph", "lower", "print", "punct", "space",
    "upper", "xdigit",
];

/// Parses the inside of a bracket expression.
///
/// `chars` starts just after the opening `[`. Returns the expression and the
/// number of pattern characters consumed including the closing `]`, or
/// `None` if the bracket is not closed.
fn parse_bracket(chars: &[PatternChar]) -> Option<(Bracket, usize)> {
    let mut index = 0;
    let complement = matches!(
        chars.first(),
        Some(PatternChar::Normal(b'!') | PatternChar::Normal(b'^'))
    );
    if complement {
        index += 1;
    }

    let mut items = Vec::new();
    let mut first = true;
    loop {
        let pc = *chars.get(index)?;
        match pc {
            PatternChar::Normal(b']') if !first => {
                return Some((Bracket { complement, items }, index + 1));
            }
            PatternChar::Normal(b'[') => {
                // [:class:], [.c.] or [=c=]
                if let Some(&PatternChar::Normal(delimiter @ (b':' | b'.' | b'='))) =
                    chars.get(index + 1)
                {
                    let body_start = index + 2;
                    let end = chars[body_start..].windows(2).position(|w| {
                        w[0] == PatternChar::Normal(delimiter) && w[1] == PatternChar::Normal(b']')
                    });
                    if let Some(len) = end {
                        let body: Vec<u8> = chars[body_start..body_start + len]
                            .iter()
                            .map(|pc| pc.byte())
                            .collect();
                        index = body_start + len + 2;
                        first = false;
                        if delimiter == b':' {
                            let name = String::from_utf8_lossy(&body).into_owned();
                            if !CLASSES.contains(&name.as_str()) {
                                return None;
                            }
                            items.push(BracketItem::Class(name));
                        } else if let [c] = body[..] {
                            items.push(BracketItem::Char(c));
                        } else {
                            return None;
                        }
                        continue;
                    }
                }
                items.push(BracketItem::Char(b'['));
                index += 1;
            }
            _ => {
                let start = pc.byte();
                let is_range = chars.get(index + 1) == Some(&PatternChar::Normal(b'-'))
                    && chars
                        .get(index + 2)
                        .is_some_and(|end| *end != PatternChar::Normal(b']'));
                if is_range {
                    let end = chars[index + 2].byte();
                    if start <= end {
                        items.push(BracketItem::Range(start, end));
                    }
                    index += 3;
                } else {
                    items.push(BracketItem::Char(start));
                    index += 1;
                }
            }
        }
        first = false;
    }
}

impl Ast {
    /// Parses a pattern.
    ///
    /// An unmatched `[` is a literal character.
    pub fn new<I>(pattern: I) -> Self
    where
        I: IntoIterator<Item = PatternChar>,
    {
        let chars: Vec<PatternChar> = pattern.into_iter().collect();
        let mut atoms = Vec::new();
        let mut index = 0;
        while let Some(&pc) = chars.get(index) {
            index += 1;
            let atom = match pc {
                PatternChar::Normal(b'?') => Atom::AnyChar,
                PatternChar::Normal(b'*') => {
                    if atoms.last() == Some(&Atom::AnyString) {
                        continue;
                    }
                    Atom::AnyString
                }
                PatternChar::Normal(b'[') => match parse_bracket(&chars[index..]) {
                    Some((bracket, len)) => {
                        index += len;
                        Atom::Bracket(bracket)
                    }
                    None => Atom::Char(b'['),
                },
                _ => Atom::Char(pc.byte()),
            };
            atoms.push(atom);
        }
        Ast { atoms }
    }

    /// Returns the literal bytes of the pattern if it contains no special
    /// atoms.
    #[must_use]
    pub fn to_literal(&self) -> Option<Vec<u8>> {
        self.atoms
            .iter()
            .map(|atom| match atom {
                Atom::Char(c) => Some(*c),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{with_escape, without_escape};

    #[test]
    fn empty_pattern() {
        let ast = Ast::new(without_escape(b""));
        assert_eq!(ast.atoms, []);
    }

    #[test]
    fn special_atoms() {
        let ast = Ast::new(without_escape(b"a?**c"));
        assert_eq!(
            ast.atoms,
            [Atom::Char(b'a'), Atom::AnyChar, Atom::AnyString, Atom::Char(b'c')]
        );
    }

    #[test]
    fn quoted_specials_are_literal() {
        let ast = Ast::new(with_escape(br"\*\?\["));
        assert_eq!(ast.to_literal(), Some(b"*?[".to_vec()));
    }

    #[test]
    fn bracket_expression() {
        let ast = Ast::new(without_escape(b"[!a-c]x]"));
        assert_eq!(
            ast.atoms,
            [
                Atom::Bracket(Bracket {
                    complement: true,
                    items: vec![BracketItem::Range(b'a', b'c')],
                }),
                Atom::Char(b'x'),
                Atom::Char(b']'),
            ]
        );
    }

    #[test]
    fn bracket_with_leading_close_and_class() {
        let ast = Ast::new(without_escape(b"[]a[:digit:]-]"));
        assert_eq!(
            ast.atoms,
            [Atom::Bracket(Bracket {
                complement: false,
                items: vec![
                    BracketItem::Char(b']'),
                    BracketItem::Char(b'a'),
                    BracketItem::Class("digit".to_string()),
                    BracketItem::Char(b'-'),
                ],
            })]
        );
    }

    #[test]
    fn unclosed_bracket_is_literal() {
        let ast = Ast::new(without_escape(b"[ab"));
        assert_eq!(ast.to_literal(), Some(b"[ab".to_vec()));
    }
}
