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

//! Initial expansion
//!
//! The [`Expander`] walks marked text and copies it to an [`Expansion`],
//! replacing each expansion it finds with the result. Which construct starts
//! where is found by [`expansion_end`], the same scanner the lexer uses to
//! read the construct in the first place.

mod arith;
mod command_subst;
mod param;
mod tilde;

use super::{Error, ErrorCause, Expansion, Mode, Range, RangeKind, Result};
use swsh_env::Env;
use swsh_env::semantics::ExitStatus;
use swsh_syntax::bytes::{decode, encode};
use swsh_syntax::marker::{ESCAPE, QUOTE, is_marker, push_escaping_all};
use swsh_syntax::scan::{Scan, expansion_end, tilde_prefix_end};

/// State of the initial expansion
#[derive(Debug)]
pub(crate) struct Expander<'e> {
    pub env: &'e mut Env,
    pub mode: Mode,
    /// Line number of the word being expanded
    pub line_no: u64,
    /// Exit status of the last command substitution
    pub last_command_subst_status: Option<ExitStatus>,
}

impl<'e> Expander<'e> {
    pub fn new(env: &'e mut Env, mode: Mode, line_no: u64) -> Self {
        Expander {
            env,
            mode,
            line_no,
            last_command_subst_status: None,
        }
    }

    pub fn error(&self, cause: ErrorCause) -> Error {
        Error {
            cause,
            line_no: self.line_no,
        }
    }

    /// Expands marked text and appends the result to `out`.
    ///
    /// `in_dquote` tells whether the text starts inside double quotes.
    /// `word_start` tells whether the text is at the beginning of a word,
    /// where a tilde prefix may appear.
    pub fn expand(
        &mut self,
        text: &[u8],
        mut in_dquote: bool,
        word_start: bool,
        out: &mut Expansion,
    ) -> Result<()> {
        let mut index = 0;
        while let Some(&byte) = text.get(index) {
            match byte {
                ESCAPE => {
                    out.text.extend(&text[index..(index + 2).min(text.len())]);
                    index += 2;
                }
                QUOTE => {
                    out.text.push(QUOTE);
                    in_dquote = !in_dquote;
                    index += 1;
                }
                b'$' | b'`' => match expansion_end(text, index, in_dquote) {
                    Scan::Complete(end) => {
                        self.expand_construct(&text[index..end], in_dquote, out)?;
                        index = end;
                    }
                    Scan::Incomplete | Scan::NotExpansion => {
                        out.text.push(byte);
                        index += 1;
                    }
                },
                b'~' if !in_dquote && self.tilde_allowed(text, index, word_start) => {
                    let stop_at_colon = self.mode.contains(Mode::TILDE_AFTER_COLON);
                    let expanded = tilde_prefix_end(text, index, stop_at_colon).and_then(|end| {
                        let home = self.tilde(&text[index + 1..end])?;
                        Some((end, home))
                    });
                    match expanded {
                        Some((end, home)) => {
                            push_escaping_all(&mut out.text, &encode(&home));
                            index = end;
                        }
                        None => {
                            out.text.push(byte);
                            index += 1;
                        }
                    }
                }
                _ => {
                    out.text.push(byte);
                    index += 1;
                }
            }
        }
        Ok(())
    }

    fn tilde_allowed(&self, text: &[u8], index: usize, word_start: bool) -> bool {
        if index == 0 {
            return word_start && self.mode.intersects(Mode::TILDE | Mode::TILDE_AFTER_COLON);
        }
        self.mode.contains(Mode::TILDE_AFTER_COLON)
            && text[index - 1] == b':'
            && (index < 2 || text[index - 2] != ESCAPE)
    }

    /// Expands a single construct starting with `$` or `` ` ``.
    fn expand_construct(&mut self, construct: &[u8], in_dquote: bool, out: &mut Expansion) -> Result<()> {
        let len = construct.len();
        if construct.starts_with(b"$((") && construct.ends_with(b"))") && len >= 5 {
            let value = self.arith(&construct[3..len - 2])?;
            self.push_value(value.as_bytes(), in_dquote, out);
        } else if construct.starts_with(b"$(") {
            let output = self.command_subst(&construct[2..len - 1])?;
            self.push_value(&output, in_dquote, out);
        } else if construct.starts_with(b"`") {
            let body = command_subst::unquote_backquoted(&construct[1..len - 1], in_dquote);
            let output = self.command_subst(&body)?;
            self.push_value(&output, in_dquote, out);
        } else if construct.starts_with(b"${") {
            self.braced_param(&construct[2..len - 1], in_dquote, out)?;
        } else {
            let name = decode(&construct[1..]).into_owned();
            self.raw_param(&name, in_dquote, out)?;
        }
        Ok(())
    }

    /// Appends the output of an expansion.
    ///
    /// Unquoted output is recorded as a range subject to field splitting.
    /// Pattern characters in unquoted output stay active for pathname
    /// expansion.
    pub fn push_value(&self, value: &[u8], in_dquote: bool, out: &mut Expansion) {
        let start = out.text.len();
        for &byte in value {
            if is_marker(byte) {
                out.text.push(ESCAPE);
            }
            out.text.push(byte);
        }
        if !in_dquote {
            out.ranges.push(Range {
                start,
                end: out.text.len(),
                kind: RangeKind::FieldSplit,
            });
        }
    }

    /// Appends values separated by null bytes.
    ///
    /// The null bytes are split on in field splitting: inside double quotes
    /// each value becomes a field of its own; outside, the values are also
    /// split on IFS characters.
    pub fn push_fields(&self, values: &[String], in_dquote: bool, out: &mut Expansion) {
        let start = out.text.len();
        if in_dquote && values.is_empty() {
            out.ranges.push(Range {
                start,
                end: start,
                kind: RangeKind::Vanishing,
            });
            return;
        }
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                out.text.push(b'\0');
            }
            for &byte in encode(value).iter() {
                if byte == b'\0' {
                    continue;
                }
                if is_marker(byte) {
                    out.text.push(ESCAPE);
                }
                out.text.push(byte);
            }
        }
        let kind = if in_dquote {
            RangeKind::SplitOnNull
        } else {
            RangeKind::FieldSplit
        };
        out.ranges.push(Range {
            start,
            end: out.text.len(),
            kind,
        });
    }
}
