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

//! Quoting strings so that the shell reads them back unchanged
//!
//! Output of `set`, `export -p`, `readonly -p`, `alias` and `trap` must be
//! reusable as shell input. [`quote`] leaves a string as is when it contains
//! no character the shell treats specially, and otherwise encloses it in
//! single quotes. A single quote inside the string closes the quotation,
//! appears double-quoted, and reopens it: `it's` becomes `'it'"'"'s'`.
//!
//! ```
//! # use swsh_quote::{quote, quoted};
//! assert_eq!(quote("foo"), "foo");
//! assert_eq!(quote(""), "''");
//! assert_eq!(quote("a b"), "'a b'");
//! assert_eq!(quote("it's"), r#"'it'"'"'s'"#);
//! assert_eq!(format!("x={}", quoted("$HOME")), "x='$HOME'");
//! ```

use std::borrow::Cow;
use std::fmt::{Display, Formatter, Write};

/// Tests whether the character is special somewhere in a word.
#[must_use]
fn is_special(c: char) -> bool {
    matches!(
        c,
        ';' | '&'
            | '|'
            | '('
            | ')'
            | '<'
            | '>'
            | '$'
            | '`'
            | '\\'
            | '"'
            | '\''
            | '='
            | '*'
            | '?'
            | '['
            | ']'
            | '{'
            | '}'
            | '#'
            | '~'
            | '%'
    ) || c.is_whitespace()
        || c.is_control()
}

/// Tests whether the string must be quoted.
#[must_use]
pub fn needs_quoting(s: &str) -> bool {
    s.is_empty() || s.chars().any(is_special)
}

/// String wrapper that prints its content quoted
#[derive(Clone, Copy, Debug)]
#[must_use = "`Quoted` does nothing unless printed"]
pub struct Quoted<'a>(&'a str);

/// Wraps a string so that it is quoted when displayed.
pub fn quoted(s: &str) -> Quoted<'_> {
    Quoted(s)
}

impl Display for Quoted<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if !needs_quoting(self.0) {
            return f.write_str(self.0);
        }
        f.write_char('\'')?;
        let mut pieces = self.0.split('\'');
        if let Some(first) = pieces.next() {
            f.write_str(first)?;
        }
        for piece in pieces {
            f.write_str("'\"'\"'")?;
            f.write_str(piece)?;
        }
        f.write_char('\'')
    }
}

/// Returns the quoted form of the string.
///
/// The string is borrowed as is if it needs no quoting.
#[must_use]
pub fn quote(s: &str) -> Cow<'_, str> {
    if needs_quoting(s) {
        Cow::Owned(quoted(s).to_string())
    } else {
        Cow::Borrowed(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_strings_are_borrowed() {
        assert!(matches!(quote("abc_1.2/x-y:z"), Cow::Borrowed("abc_1.2/x-y:z")));
    }

    #[test]
    fn special_characters_are_quoted() {
        for s in [";", "a&b", "x|y", "(", "<", ">", "$v", "`", "\\", "\"", "=", "*", "?"] {
            assert_eq!(quote(s), format!("'{s}'"), "{s:?}");
        }
        assert_eq!(quote("a\tb"), "'a\tb'");
        assert_eq!(quote("a\nb"), "'a\nb'");
        assert_eq!(quote("~user"), "'~user'");
    }

    #[test]
    fn single_quotes() {
        assert_eq!(quote("'"), r#"''"'"''"#);
        assert_eq!(quote("a'b'c"), r#"'a'"'"'b'"'"'c'"#);
    }
}
