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

//! Iterators producing pattern characters from plain byte strings

use crate::PatternChar;
use std::iter::Copied;
use std::slice::Iter;

/// Iterator that treats a backslash as quoting the next byte
#[derive(Clone, Debug)]
pub struct WithEscape<'a> {
    bytes: Copied<Iter<'a, u8>>,
}

impl Iterator for WithEscape<'_> {
    type Item = PatternChar;
    fn next(&mut self) -> Option<PatternChar> {
        match self.bytes.next()? {
            b'\\' => self.bytes.next().map(PatternChar::Literal),
            b => Some(PatternChar::Normal(b)),
        }
    }
}

/// Returns an iterator that treats `\` as an escape in the pattern.
///
/// A trailing backslash is dropped.
#[must_use]
pub fn with_escape(pattern: &[u8]) -> WithEscape<'_> {
    WithEscape {
        bytes: pattern.iter().copied(),
    }
}

/// Iterator that makes every byte a normal pattern character
#[derive(Clone, Debug)]
pub struct WithoutEscape<'a> {
    bytes: Copied<Iter<'a, u8>>,
}

impl Iterator for WithoutEscape<'_> {
    type Item = PatternChar;
    fn next(&mut self) -> Option<PatternChar> {
        self.bytes.next().map(PatternChar::Normal)
    }
}

/// Returns an iterator that treats every byte of the pattern as a normal
/// pattern character.
#[must_use]
pub fn without_escape(pattern: &[u8]) -> WithoutEscape<'_> {
    WithoutEscape {
        bytes: pattern.iter().copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PatternChar::*;

    #[test]
    fn with_escape_as_iterator() {
        let v: Vec<_> = with_escape(br"a\bc\").collect();
        assert_eq!(v, [Normal(b'a'), Literal(b'b'), Normal(b'c')]);
    }

    #[test]
    fn without_escape_as_iterator() {
        let v: Vec<_> = without_escape(br"a\b").collect();
        assert_eq!(v, [Normal(b'a'), Normal(b'\\'), Normal(b'b')]);
    }
}
