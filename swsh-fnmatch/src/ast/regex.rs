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

//! Conversion to regular expression
//!
//! The output is meant for a byte-oriented regex with Unicode support
//! disabled, so every byte outside printable ASCII is written as `\xHH`.

use super::*;
use std::fmt::Result;
use std::fmt::Write;

fn fmt_byte(byte: u8, regex: &mut dyn Write) -> Result {
    if byte.is_ascii_graphic() || byte == b' ' {
        if regex_syntax::is_meta_character(char::from(byte)) {
            regex.write_char('\\')?;
        }
        regex.write_char(char::from(byte))
    } else {
        write!(regex, "\\x{byte:02X}")
    }
}

/// Writes a byte inside a character class, where `-` and `&` are special too.
fn fmt_class_byte(byte: u8, regex: &mut dyn Write) -> Result {
    if byte == b'-' || byte == b'&' || byte == b'~' {
        write!(regex, "\\x{byte:02X}")
    } else {
        fmt_byte(byte, regex)
    }
}

pub trait ToRegex {
    /// Converts this pattern to a regular expression.
    ///
    /// The result is written to `regex`.
    fn fmt_regex(&self, regex: &mut dyn Write) -> Result;

    /// Converts this pattern to a regular expression.
    ///
    /// The result is returned as a string.
    fn to_regex(&self) -> String {
        let mut regex = String::new();
        // Writing to a String never fails.
        let _ = self.fmt_regex(&mut regex);
        regex
    }
}

impl ToRegex for Bracket {
    fn fmt_regex(&self, regex: &mut dyn Write) -> Result {
        regex.write_char('[')?;
        if self.complement {
            regex.write_char('^')?;
        }
        for item in &self.items {
            match item {
                BracketItem::Char(c) => fmt_class_byte(*c, regex)?,
                BracketItem::Range(start, end) => {
                    fmt_class_byte(*start, regex)?;
                    regex.write_char('-')?;
                    fmt_class_byte(*end, regex)?;
                }
                BracketItem::Class(name) => write!(regex, "[:{name}:]")?,
            }
        }
        regex.write_char(']')
    }
}

impl ToRegex for Atom {
    fn fmt_regex(&self, regex: &mut dyn Write) -> Result {
        match self {
            Atom::Char(c) => fmt_byte(*c, regex),
            Atom::AnyChar => regex.write_char('.'),
            Atom::AnyString => regex.write_str(".*"),
            Atom::Bracket(bracket) => bracket.fmt_regex(regex),
        }
    }
}

impl ToRegex for Ast {
    fn fmt_regex(&self, regex: &mut dyn Write) -> Result {
        self.atoms.iter().try_for_each(|atom| atom.fmt_regex(regex))
    }
}
