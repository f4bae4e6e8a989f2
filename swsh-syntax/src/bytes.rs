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

//! Lossless conversion between shell bytes and strings
//!
//! The shell handles arbitrary bytes, while fields and variable values are
//! kept as `String`s. [`decode`] turns each byte that is not part of valid
//! UTF-8 into a character in the private use range `U+F780..=U+F7FF`, one
//! character per byte. A valid character that itself falls in that range is
//! decoded byte by byte in the same way, so [`encode`] always restores the
//! original bytes.
//!
//! ```
//! # use swsh_syntax::bytes::{decode, encode};
//! let bytes = b"a\xffb";
//! let text = decode(bytes);
//! assert_eq!(text.chars().count(), 3);
//! assert_eq!(encode(&text), &bytes[..]);
//! ```

use std::borrow::Cow;
use std::ffi::{CString, NulError};

const RAW_BASE: u32 = 0xF700;

/// Returns the byte the character stands for, if it is a raw byte
/// character.
fn raw_byte(c: char) -> Option<u8> {
    let code = u32::from(c);
    (0xF780..=0xF7FF)
        .contains(&code)
        .then(|| (code - RAW_BASE) as u8)
}

/// Appends the character standing for a byte not less than 0x80.
fn push_raw(out: &mut String, byte: u8) {
    out.push(char::from_u32(RAW_BASE + u32::from(byte)).unwrap_or(char::REPLACEMENT_CHARACTER));
}

/// Converts bytes to a string without losing any byte.
#[must_use]
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        if !text.chars().any(|c| raw_byte(c).is_some()) {
            return Cow::Borrowed(text);
        }
    }

    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        for c in chunk.valid().chars() {
            if raw_byte(c).is_some() {
                let mut buffer = [0; 4];
                for &byte in c.encode_utf8(&mut buffer).as_bytes() {
                    push_raw(&mut out, byte);
                }
            } else {
                out.push(c);
            }
        }
        for &byte in chunk.invalid() {
            push_raw(&mut out, byte);
        }
    }
    Cow::Owned(out)
}

/// Converts a string produced by [`decode`] back to the original bytes.
#[must_use]
pub fn encode(text: &str) -> Cow<'_, [u8]> {
    if !text.chars().any(|c| raw_byte(c).is_some()) {
        return Cow::Borrowed(text.as_bytes());
    }

    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match raw_byte(c) {
            Some(byte) => out.push(byte),
            None => {
                let mut buffer = [0; 4];
                out.extend_from_slice(c.encode_utf8(&mut buffer).as_bytes());
            }
        }
    }
    Cow::Owned(out)
}

/// Converts a string to a C string of the original bytes.
///
/// Fails if the string contains a nul byte.
pub fn to_c_string(text: &str) -> Result<CString, NulError> {
    CString::new(encode(text).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_text_is_borrowed() {
        assert_eq!(decode(b"abc \xE3\x81\x82"), Cow::Borrowed("abc \u{3042}"));
        assert_eq!(encode("abc \u{3042}"), Cow::Borrowed(&b"abc \xE3\x81\x82"[..]));
    }

    #[test]
    fn invalid_bytes_survive() {
        let bytes = b"a\xff\xfeb\xE3\x81";
        let text = decode(bytes);
        assert_eq!(text, "a\u{F7FF}\u{F7FE}b\u{F7E3}\u{F781}");
        assert_eq!(encode(&text), &bytes[..]);
    }

    #[test]
    fn characters_in_raw_range_survive() {
        let bytes = "x\u{F780}y".as_bytes();
        let text = decode(bytes);
        assert_eq!(text.chars().count(), 5);
        assert_eq!(encode(&text), bytes);
    }

    #[test]
    fn c_string_has_original_bytes() {
        let text = decode(b"/tmp/\x80");
        assert_eq!(to_c_string(&text).unwrap().as_bytes(), b"/tmp/\x80");
        assert!(to_c_string("a\0b").is_err());
    }
}
