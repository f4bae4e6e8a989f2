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

//! Part of the lexer that parses words

use super::{Lexer, is_blank, is_operator_char};
use crate::input::Memory;
use crate::marker::{ESCAPE, QUOTE, push_escaping_all, push_escaping_markers};
use crate::parser::error::{Result, SyntaxError};
use crate::scan::{Scan, expansion_end};

/// Where a word ends
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum WordMode {
    /// The word ends at an unquoted blank or operator character.
    Token,
    /// The word extends to the end of input.
    ///
    /// `in_dquote` tells whether the word appears inside double quotes, in
    /// which case single quotes are not special.
    Whole { in_dquote: bool },
}

impl Lexer<'_> {
    /// Parses a word token.
    ///
    /// Returns the marked text of the word and whether it contains any
    /// quotation.
    pub(super) fn word(&mut self) -> Result<(Vec<u8>, bool)> {
        self.word_text(WordMode::Token)
    }

    fn word_text(&mut self, mode: WordMode) -> Result<(Vec<u8>, bool)> {
        let in_dquote = matches!(mode, WordMode::Whole { in_dquote: true });
        let mut text = Vec::new();
        let mut quoted = false;
        while let Some(byte) = self.peek()? {
            match byte {
                _ if mode == WordMode::Token && (is_blank(byte) || is_operator_char(byte)) => {
                    break;
                }
                b'\\' => {
                    self.consume()?;
                    if in_dquote {
                        self.backslash_in_double_quote(&mut text, b"$`\\\"}")?;
                    } else {
                        quoted |= self.backslash(&mut text)?;
                    }
                }
                b'\'' if !in_dquote => {
                    self.consume()?;
                    self.single_quote(&mut text)?;
                    quoted = true;
                }
                b'"' => {
                    self.consume()?;
                    self.double_quote(&mut text)?;
                    quoted = true;
                }
                b'$' | b'`' => self.expansion(&mut text, in_dquote)?,
                _ => {
                    self.consume()?;
                    push_escaping_markers(&mut text, &[byte]);
                }
            }
        }
        Ok((text, quoted))
    }

    /// Parses the byte after an unquoted backslash.
    ///
    /// Returns false for a line continuation.
    fn backslash(&mut self, text: &mut Vec<u8>) -> Result<bool> {
        match self.consume()? {
            Some(b'\n') => Ok(false),
            Some(byte) => {
                text.extend([ESCAPE, byte]);
                Ok(true)
            }
            None => {
                text.extend([ESCAPE, b'\\']);
                Ok(true)
            }
        }
    }

    /// Parses the byte after a backslash inside double quotes.
    ///
    /// The backslash quotes the next byte if it is one of `escapable`.
    /// Otherwise, the backslash is literal.
    fn backslash_in_double_quote(&mut self, text: &mut Vec<u8>, escapable: &[u8]) -> Result<()> {
        match self.peek()? {
            Some(b'\n') => {
                self.consume()?;
            }
            Some(byte) if escapable.contains(&byte) => {
                self.consume()?;
                text.extend([ESCAPE, byte]);
            }
            _ => text.extend([ESCAPE, b'\\']),
        }
        Ok(())
    }

    /// Parses a single-quoted string after the opening quote.
    fn single_quote(&mut self, text: &mut Vec<u8>) -> Result<()> {
        text.push(QUOTE);
        loop {
            match self.consume()? {
                Some(b'\'') => break,
                Some(byte) => push_escaping_all(text, &[byte]),
                None => return Err(self.error(SyntaxError::UnclosedSingleQuote)),
            }
        }
        text.push(QUOTE);
        Ok(())
    }

    /// Parses a double-quoted string after the opening quote.
    fn double_quote(&mut self, text: &mut Vec<u8>) -> Result<()> {
        text.push(QUOTE);
        loop {
            match self.peek()? {
                Some(b'"') => {
                    self.consume()?;
                    break;
                }
                Some(b'\\') => {
                    self.consume()?;
                    self.backslash_in_double_quote(text, b"$`\\\"")?;
                }
                Some(b'$' | b'`') => self.expansion(text, true)?,
                Some(byte) => {
                    self.consume()?;
                    push_escaping_markers(text, &[byte]);
                }
                None => return Err(self.error(SyntaxError::UnclosedDoubleQuote)),
            }
        }
        text.push(QUOTE);
        Ok(())
    }

    /// Copies an expansion at the current position into the text verbatim.
    ///
    /// More lines are read until the expansion is closed. A `$` that does
    /// not start an expansion is copied as a literal byte.
    fn expansion(&mut self, text: &mut Vec<u8>, in_dquote: bool) -> Result<()> {
        let start = self.next_index;
        loop {
            match expansion_end(&self.buffer, start, in_dquote) {
                Scan::Complete(end) => {
                    text.extend_from_slice(&self.buffer[start..end]);
                    self.skip_to(end);
                    return Ok(());
                }
                Scan::NotExpansion => {
                    self.consume()?;
                    text.push(self.buffer[start]);
                    return Ok(());
                }
                Scan::Incomplete => {
                    if !self.fill()? {
                        let unclosed = &self.buffer[start..];
                        let cause = if unclosed.starts_with(b"$((") {
                            SyntaxError::UnclosedArith
                        } else if unclosed.starts_with(b"$(") {
                            SyntaxError::UnclosedCommandSubstitution
                        } else if unclosed.starts_with(b"${") {
                            SyntaxError::UnclosedParam
                        } else {
                            SyntaxError::UnclosedBackquote
                        };
                        return Err(self.error(cause));
                    }
                }
            }
        }
    }
}

/// Converts source text to marked text as a whole word.
///
/// Blanks and operator characters have no special meaning; quotes,
/// backslashes and expansions are processed in the same way as in a word
/// token. This is used for the word in a parameter expansion like
/// `${foo:-word}`. If `in_dquote` is true, the word is treated as appearing
/// inside double quotes.
pub fn mark_word(source: &[u8], in_dquote: bool) -> Result<Vec<u8>> {
    let mut lexer = Lexer::new(Box::new(Memory::new(source)));
    let (text, _) = lexer.word_text(WordMode::Whole { in_dquote })?;
    Ok(text)
}

/// Converts the content of a here-document to marked text.
///
/// The content is treated as if it were enclosed in double quotes, except
/// that double quotes are not special and a backslash only quotes `$`,
/// `` ` ``, `\` and a newline.
#[must_use]
pub fn mark_here_doc(content: &[u8]) -> Vec<u8> {
    let mut text = Vec::with_capacity(content.len() + 2);
    text.push(QUOTE);
    let mut index = 0;
    while let Some(&byte) = content.get(index) {
        match byte {
            b'\\' => match content.get(index + 1) {
                Some(b'\n') => index += 2,
                Some(&next @ (b'$' | b'`' | b'\\')) => {
                    text.extend([ESCAPE, next]);
                    index += 2;
                }
                _ => {
                    text.extend([ESCAPE, b'\\']);
                    index += 1;
                }
            },
            b'$' | b'`' => match expansion_end(content, index, true) {
                Scan::Complete(end) => {
                    text.extend_from_slice(&content[index..end]);
                    index = end;
                }
                Scan::Incomplete | Scan::NotExpansion => {
                    text.extend([ESCAPE, byte]);
                    index += 1;
                }
            },
            _ => {
                push_escaping_markers(&mut text, &[byte]);
                index += 1;
            }
        }
    }
    text.push(QUOTE);
    text
}
