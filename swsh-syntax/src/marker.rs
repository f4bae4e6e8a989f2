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

//! In-band quoting markers
//!
//! Words are stored as *marked text*, a byte string in which quoting is
//! represented by two control bytes:
//!
//! - [`ESCAPE`] makes the next byte literal. A backslash-escaped character
//!   and every byte of a single-quoted string are preceded by `ESCAPE`.
//! - [`QUOTE`] toggles a quoted region. A double-quoted string and a
//!   single-quoted string are enclosed in a pair of `QUOTE` bytes.
//!
//! A source byte that happens to be one of the markers is always preceded by
//! `ESCAPE` so that it is never mistaken for a marker. The markers survive
//! parameter expansion, field splitting and pathname expansion, and are
//! finally removed by [`remove_quotes`].
//!
//! ```
//! # use swsh_syntax::marker::*;
//! let marked = [b'a', QUOTE, b'b', b' ', b'c', QUOTE, ESCAPE, b'*'];
//! assert!(is_quoted(&marked));
//! assert_eq!(remove_quotes(&marked), b"ab c*");
//! ```

/// Marker that makes the following byte literal
pub const ESCAPE: u8 = 0x01;

/// Marker that starts or ends a quoted region
pub const QUOTE: u8 = 0x02;

/// Tests whether the byte is one of the markers.
#[inline]
#[must_use]
pub const fn is_marker(byte: u8) -> bool {
    byte == ESCAPE || byte == QUOTE
}

/// Appends bytes to marked text, escaping bytes that look like markers.
pub fn push_escaping_markers(out: &mut Vec<u8>, bytes: &[u8]) {
    for &b in bytes {
        if is_marker(b) {
            out.push(ESCAPE);
        }
        out.push(b);
    }
}

/// Appends bytes to marked text, escaping every byte.
pub fn push_escaping_all(out: &mut Vec<u8>, bytes: &[u8]) {
    for &b in bytes {
        out.push(ESCAPE);
        out.push(b);
    }
}

/// Converts plain text to marked text without quoting it.
#[must_use]
pub fn mark_literal(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    push_escaping_markers(&mut out, bytes);
    out
}

/// Tests whether marked text contains any quoting.
#[must_use]
pub fn is_quoted(marked: &[u8]) -> bool {
    marked.iter().copied().any(is_marker)
}

/// Removes the markers from marked text.
#[must_use]
pub fn remove_quotes(marked: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(marked.len());
    let mut bytes = marked.iter().copied();
    while let Some(b) = bytes.next() {
        match b {
            ESCAPE => out.extend(bytes.next()),
            QUOTE => (),
            _ => out.push(b),
        }
    }
    out
}

/// Iterator over the bytes of marked text with their quotedness
///
/// Each item is a pair of a byte and whether it is quoted, either by a
/// preceding `ESCAPE` or by enclosing `QUOTE`s. The markers themselves are
/// not yielded.
#[derive(Clone, Debug)]
pub struct Unmark<'a> {
    bytes: std::slice::Iter<'a, u8>,
    in_quote: bool,
}

impl Iterator for Unmark<'_> {
    type Item = (u8, bool);
    fn next(&mut self) -> Option<(u8, bool)> {
        loop {
            match *self.bytes.next()? {
                ESCAPE => return self.bytes.next().map(|&b| (b, true)),
                QUOTE => self.in_quote = !self.in_quote,
                b => return Some((b, self.in_quote)),
            }
        }
    }
}

/// Returns an iterator over the bytes of marked text with their quotedness.
pub fn unmark(marked: &[u8]) -> Unmark<'_> {
    Unmark {
        bytes: marked.iter(),
        in_quote: false,
    }
}

/// Tests whether the string is a valid variable name.
#[must_use]
pub fn is_name(name: &[u8]) -> bool {
    match name.split_first() {
        Some((first, rest)) => {
            (first.is_ascii_alphabetic() || *first == b'_')
                && rest.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'_')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaping_markers() {
        let mut out = Vec::new();
        push_escaping_markers(&mut out, b"a\x01b\x02");
        assert_eq!(out, [b'a', ESCAPE, ESCAPE, b'b', ESCAPE, QUOTE]);
        assert_eq!(remove_quotes(&out), b"a\x01b\x02");
    }

    #[test]
    fn unmark_reports_quotedness() {
        let marked = [b'a', QUOTE, b'b', ESCAPE, QUOTE, QUOTE, ESCAPE, b'c', b'd'];
        let items: Vec<_> = unmark(&marked).collect();
        assert_eq!(
            items,
            [(b'a', false), (b'b', true), (QUOTE, true), (b'c', true), (b'd', false)]
        );
    }

    #[test]
    fn names() {
        assert!(is_name(b"foo_1"));
        assert!(is_name(b"_"));
        assert!(!is_name(b""));
        assert!(!is_name(b"1a"));
        assert!(!is_name(b"a-b"));
    }
}
