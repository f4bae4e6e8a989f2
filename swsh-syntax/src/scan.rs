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

//! Finding the end of expansions
//!
//! The lexer copies parameter expansions, command substitutions and
//! arithmetic expansions into words verbatim. The functions in this module
//! find where such a construct ends in a byte string, so that the lexer can
//! tell when it has read enough input and the expander can locate the
//! construct again in the word.
//!
//! ```
//! # use swsh_syntax::scan::{Scan, expansion_end};
//! let text = b"a$(echo ')'; x=$((1+(2))))b";
//! assert_eq!(expansion_end(text, 1, false), Scan::Complete(text.len() - 1));
//! assert_eq!(expansion_end(b"${x", 0, false), Scan::Incomplete);
//! assert_eq!(expansion_end(b"$%", 0, false), Scan::NotExpansion);
//! ```

use crate::marker::is_marker;

/// Result of [`expansion_end`]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scan {
    /// The construct ends just before the index.
    Complete(usize),
    /// The text ends before the construct is closed.
    Incomplete,
    /// The text at the start index does not begin an expansion.
    NotExpansion,
}

/// Finds the end of the expansion starting at `start`.
///
/// The byte at `start` should be `$` or `` ` ``. `in_dquote` tells whether
/// the construct appears inside double quotes, in which case single quotes
/// are not special in a braced parameter expansion.
#[must_use]
pub fn expansion_end(text: &[u8], start: usize, in_dquote: bool) -> Scan {
    match text.get(start) {
        Some(b'$') => dollar_end(text, start, in_dquote),
        Some(b'`') => backquote_end(text, start + 1),
        _ => Scan::NotExpansion,
    }
}

fn dollar_end(text: &[u8], start: usize, in_dquote: bool) -> Scan {
    let Some(&next) = text.get(start + 1) else {
        return Scan::NotExpansion;
    };
    match next {
        b'(' if text.get(start + 2) == Some(&b'(') => match arith_end(text, start + 3) {
            Some(result) => result,
            None => command_end(text, start + 2),
        },
        b'(' => command_end(text, start + 2),
        b'{' => braced_end(text, start + 2, in_dquote),
        b'_' | b'a'..=b'z' | b'A'..=b'Z' => {
            let len = text[start + 1..]
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                .count();
            Scan::Complete(start + 1 + len)
        }
        b'0'..=b'9' | b'@' | b'*' | b'#' | b'?' | b'-' | b'$' | b'!' => Scan::Complete(start + 2),
        _ => Scan::NotExpansion,
    }
}

/// Skips a nested construct at `index` if any.
///
/// Returns the index to continue scanning from, or `Err` if the nested
/// construct is incomplete.
fn skip_nested(text: &[u8], index: usize, in_dquote: bool) -> Result<usize, Scan> {
    match expansion_end(text, index, in_dquote) {
        Scan::Complete(end) => Ok(end),
        Scan::Incomplete => Err(Scan::Incomplete),
        Scan::NotExpansion => Ok(index + 1),
    }
}

fn single_quote_end(text: &[u8], index: usize) -> Result<usize, Scan> {
    match text[index..].iter().position(|&b| b == b'\'') {
        Some(len) => Ok(index + len + 1),
        None => Err(Scan::Incomplete),
    }
}

fn double_quote_end(text: &[u8], mut index: usize) -> Result<usize, Scan> {
    loop {
        match text.get(index) {
            None => return Err(Scan::Incomplete),
            Some(b'"') => return Ok(index + 1),
            Some(b'\\') => index += 2,
            Some(b'$' | b'`') => index = skip_nested(text, index, true)?,
            Some(_) => index += 1,
        }
    }
}

/// Scans the inside of `$((...))`.
///
/// Returns `None` if the construct turns out to be a command substitution
/// starting with a subshell.
fn arith_end(text: &[u8], mut index: usize) -> Option<Scan> {
    let mut depth = 0usize;
    loop {
        match text.get(index) {
            None => return Some(Scan::Incomplete),
            Some(b'(') => depth += 1,
            Some(b')') if depth > 0 => depth -= 1,
            Some(b')') => {
                return match text.get(index + 1) {
                    Some(b')') => Some(Scan::Complete(index + 2)),
                    None => Some(Scan::Incomplete),
                    Some(_) => None,
                };
            }
            Some(b'\\') => index += 1,
            Some(b'$' | b'`') => {
                match skip_nested(text, index, false) {
                    Ok(next) => index = next,
                    Err(scan) => return Some(scan),
                }
                continue;
            }
            Some(_) => (),
        }
        index += 1;
    }
}

fn is_word_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b' ' | b'\t' | b'\n' | b';' | b'&' | b'|' | b'(' | b')' | b'<' | b'>'
    )
}

/// Tests whether the reserved word appears as a whole word at the index.
fn is_reserved_word_at(text: &[u8], index: usize, word: &[u8]) -> bool {
    text[index..].starts_with(word)
        && text
            .get(index + word.len())
            .is_none_or(|&b| is_word_delimiter(b))
}

/// Scans the inside of `$(...)`.
///
/// Unbalanced `)` in case items of a nested `case` command are recognized
/// roughly by counting `case` and `esac` words.
fn command_end(text: &[u8], mut index: usize) -> Scan {
    let mut depth = 1usize;
    let mut case_depth = 0usize;
    let mut at_word_start = true;
    loop {
        let Some(&byte) = text.get(index) else {
            return Scan::Incomplete;
        };
        if at_word_start {
            if byte == b'#' {
                match text[index..].iter().position(|&b| b == b'\n') {
                    Some(len) => index += len,
                    None => return Scan::Incomplete,
                }
                continue;
            }
            if is_reserved_word_at(text, index, b"case") {
                case_depth += 1;
            } else if is_reserved_word_at(text, index, b"esac") {
                case_depth = case_depth.saturating_sub(1);
            }
        }
        at_word_start = is_word_delimiter(byte);
        let next = match byte {
            b'\\' => Ok(index + 2),
            b'\'' => single_quote_end(text, index + 1),
            b'"' => double_quote_end(text, index + 1),
            b'$' | b'`' => skip_nested(text, index, false),
            b'(' => {
                depth += 1;
                Ok(index + 1)
            }
            b')' if depth == 1 && case_depth > 0 => Ok(index + 1),
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Scan::Complete(index + 1);
                }
                Ok(index + 1)
            }
            _ => Ok(index + 1),
        };
        match next {
            Ok(next) => index = next,
            Err(scan) => return scan,
        }
    }
}

/// Scans the inside of `${...}`.
fn braced_end(text: &[u8], mut index: usize, in_dquote: bool) -> Scan {
    loop {
        let next = match text.get(index) {
            None => return Scan::Incomplete,
            Some(b'}') => return Scan::Complete(index + 1),
            Some(b'\\') => Ok(index + 2),
            Some(b'\'') if !in_dquote => single_quote_end(text, index + 1),
            Some(b'"') => double_quote_end(text, index + 1),
            Some(b'$' | b'`') => skip_nested(text, index, in_dquote),
            Some(_) => Ok(index + 1),
        };
        match next {
            Ok(next) => index = next,
            Err(scan) => return scan,
        }
    }
}

/// Scans the inside of `` `...` ``.
fn backquote_end(text: &[u8], mut index: usize) -> Scan {
    loop {
        match text.get(index) {
            None => return Scan::Incomplete,
            Some(b'`') => return Scan::Complete(index + 1),
            Some(b'\\') => index += 2,
            Some(_) => index += 1,
        }
    }
}

/// Finds the end of a tilde prefix in marked text.
///
/// The byte at `start` should be `~`. The prefix extends up to the first
/// unquoted `/`, or `:` if `stop_at_colon` is true, or the end of the text.
/// Returns `None` if the prefix contains a quoted character or an expansion,
/// in which case no tilde expansion should be performed.
#[must_use]
pub fn tilde_prefix_end(marked: &[u8], start: usize, stop_at_colon: bool) -> Option<usize> {
    if marked.get(start) != Some(&b'~') {
        return None;
    }
    let mut index = start + 1;
    while let Some(&byte) = marked.get(index) {
        match byte {
            b'/' => break,
            b':' if stop_at_colon => break,
            b'$' | b'`' => return None,
            _ if is_marker(byte) => return None,
            _ => index += 1,
        }
    }
    Some(index)
}
