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

//! Methods about passing source code to the [parser](crate::parser).

use std::borrow::Cow;

/// Parameter passed to the input function
///
/// The context tells the input function whether the line requested is the
/// first line of a command, so that an interactive shell can choose between
/// the primary and secondary prompts.
#[derive(Debug)]
#[non_exhaustive]
pub struct Context {
    is_first_line: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            is_first_line: true,
        }
    }
}

impl Context {
    /// Whether the requested line is the first line of a command
    #[inline]
    #[must_use]
    pub fn is_first_line(&self) -> bool {
        self.is_first_line
    }

    /// Sets whether the requested line is the first line of a command.
    #[inline]
    pub fn set_is_first_line(&mut self, is_first_line: bool) {
        self.is_first_line = is_first_line;
    }
}

/// Error returned by the [Input] function.
pub type Error = std::io::Error;

/// Result of the [Input] function.
pub type Result = std::result::Result<Vec<u8>, Error>;

/// Line-oriented source code reader
///
/// An `Input` implementor provides the lexer with source code by reading from
/// an underlying source.
pub trait Input {
    /// Reads a next line of the source code.
    ///
    /// The returned line is terminated by a newline unless the end of input
    /// is reached, in which case the remaining bytes up to the end are
    /// returned without a trailing newline. If there are no more bytes at
    /// all, the returned line is empty.
    ///
    /// Errors returned from this function are considered unrecoverable.
    fn next_line(&mut self, context: &Context) -> Result;
}

/// Input function that reads from a byte string in memory
#[derive(Clone, Debug)]
pub struct Memory<'a> {
    code: Cow<'a, [u8]>,
    position: usize,
}

impl Memory<'_> {
    /// Creates a new `Memory` that reads the given byte string.
    pub fn new(code: &[u8]) -> Memory<'_> {
        Memory::from(Cow::Borrowed(code))
    }
}

impl<'a> From<Cow<'a, [u8]>> for Memory<'a> {
    fn from(code: Cow<'a, [u8]>) -> Self {
        Memory { code, position: 0 }
    }
}

impl Input for Memory<'_> {
    fn next_line(&mut self, _context: &Context) -> Result {
        let rest = &self.code[self.position..];
        let len = match rest.iter().position(|&b| b == b'\n') {
            Some(index) => index + 1,
            None => rest.len(),
        };
        let line = rest[..len].to_vec();
        self.position += len;
        Ok(line)
    }
}

impl<T: Input + ?Sized> Input for Box<T> {
    fn next_line(&mut self, context: &Context) -> Result {
        (**self).next_line(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_reads_lines() {
        let mut input = Memory::new(b"one\ntwo\n\nthree");
        let context = Context::default();
        assert_eq!(input.next_line(&context).unwrap(), b"one\n");
        assert_eq!(input.next_line(&context).unwrap(), b"two\n");
        assert_eq!(input.next_line(&context).unwrap(), b"\n");
        assert_eq!(input.next_line(&context).unwrap(), b"three");
        assert_eq!(input.next_line(&context).unwrap(), b"");
        assert_eq!(input.next_line(&context).unwrap(), b"");
    }
}
