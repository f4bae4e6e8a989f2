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

//! Lexical analyzer
//!
//! The [`Lexer`] reads source code line by line from an [`Input`] into a
//! buffer and splits it into [`Token`]s. The buffer also receives the
//! replacement text of aliases: when a command word matches an alias, the
//! word is replaced with the alias value in the buffer and the lexer reads
//! the value as if it had been part of the source.
//!
//! Word tokens are [marked text](crate::marker). Here-document contents are
//! read by the lexer when it reaches the newline that ends the line
//! containing the here-document operators.

mod heredoc;
mod keyword;
mod op;
mod word;

pub use self::keyword::Keyword;
pub use self::op::{Operator, is_operator_char};
pub use self::word::{mark_here_doc, mark_word};

use super::error::{Error, ErrorCause, Result, SyntaxError};
use crate::alias::{Alias, Glossary};
use crate::input::{Context, Input};
use crate::marker::is_name;
use crate::syntax::HereDoc;
use std::fmt;
use std::rc::Rc;

/// Token identifier, or classification of tokens
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TokenId {
    /// Normal word token
    Word,
    /// Word that has the form of an assignment
    ///
    /// The parser treats this as an ordinary word if it appears after the
    /// command name.
    AssignmentWord,
    /// Digits that are immediately followed by `<` or `>`
    IoNumber,
    /// Operator token
    Operator(Operator),
    /// Reserved word
    Keyword(Keyword),
    /// Imaginary token identifier for the end of input
    EndOfInput,
}

impl TokenId {
    /// Determines if this token can be a delimiter of a clause.
    ///
    /// This function returns `true` for the end of input, `)`, `;;` and
    /// clause-delimiting reserved words.
    #[must_use]
    pub fn is_clause_delimiter(self) -> bool {
        match self {
            TokenId::Keyword(keyword) => keyword.is_clause_delimiter(),
            TokenId::Operator(op) => {
                matches!(op, Operator::CloseParen | Operator::SemicolonSemicolon)
            }
            TokenId::EndOfInput => true,
            TokenId::Word | TokenId::AssignmentWord | TokenId::IoNumber => false,
        }
    }
}

/// Result of lexical analysis produced by the [`Lexer`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub id: TokenId,
    /// Content of the token
    ///
    /// For a word token, this is marked text. For an operator, this is the
    /// operator itself.
    pub text: Vec<u8>,
    /// Line number where the token starts
    pub line_no: u64,
    /// Whether the token contains any quotation
    pub quoted: bool,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = crate::marker::remove_quotes(&self.text);
        f.write_str(&String::from_utf8_lossy(&text))
    }
}

/// Part of the buffer that came from an alias value
#[derive(Clone, Debug)]
struct AliasRegion {
    alias: Rc<Alias>,
    start: usize,
    end: usize,
}

/// Lexical analyzer
pub struct Lexer<'a> {
    input: Box<dyn Input + 'a>,
    buffer: Vec<u8>,
    /// Index of the next byte to read in `buffer`
    next_index: usize,
    /// Line number of the next byte to read
    line_no: u64,
    end_of_input: bool,
    /// Whether the next line read is the first line of a command
    first_line: bool,
    /// Current token
    pub token: Token,
    pending_here_docs: Vec<Rc<HereDoc>>,
    alias_regions: Vec<AliasRegion>,
    /// Whether the current token is the last word of an alias value, which
    /// makes the next word subject to alias substitution
    alias_follows: bool,
}

impl fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("buffer", &String::from_utf8_lossy(&self.buffer))
            .field("next_index", &self.next_index)
            .field("line_no", &self.line_no)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// Tests whether the byte is a blank, that is, a space or tab.
#[must_use]
pub fn is_blank(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

/// Tests whether the marked text has the form of an assignment word.
///
/// Returns the index of the first `=` if it does.
#[must_use]
pub fn assignment_split(text: &[u8]) -> Option<usize> {
    let index = text.iter().position(|&b| b == b'=')?;
    is_name(&text[..index]).then_some(index)
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer that reads from the input, starting at line 1.
    #[must_use]
    pub fn new(input: Box<dyn Input + 'a>) -> Lexer<'a> {
        Lexer::with_line_no(input, 1)
    }

    /// Creates a new lexer that reads from the input, starting at the given
    /// line number.
    #[must_use]
    pub fn with_line_no(input: Box<dyn Input + 'a>, line_no: u64) -> Lexer<'a> {
        Lexer {
            input,
            buffer: Vec::new(),
            next_index: 0,
            line_no,
            end_of_input: false,
            first_line: true,
            token: Token {
                id: TokenId::EndOfInput,
                text: Vec::new(),
                line_no,
                quoted: false,
            },
            pending_here_docs: Vec::new(),
            alias_regions: Vec::new(),
            alias_follows: false,
        }
    }

    /// Returns the line number of the next byte to read.
    #[must_use]
    pub fn line_no(&self) -> u64 {
        self.line_no
    }

    pub(super) fn error<C: Into<ErrorCause>>(&self, cause: C) -> Error {
        Error {
            cause: cause.into(),
            line_no: self.line_no,
            token: Vec::new(),
        }
    }

    /// Reads the next line from the input into the buffer.
    ///
    /// Returns false at the end of input.
    fn fill(&mut self) -> Result<bool> {
        if self.end_of_input {
            return Ok(false);
        }
        let mut context = Context::default();
        context.set_is_first_line(self.first_line);
        self.first_line = false;
        let line = self.input.next_line(&context).map_err(|e| self.error(e))?;
        if line.is_empty() {
            self.end_of_input = true;
            return Ok(false);
        }
        self.buffer.extend(line);
        Ok(true)
    }

    /// Returns the byte at the index of the buffer, reading more input if
    /// necessary.
    fn peek_at(&mut self, index: usize) -> Result<Option<u8>> {
        while index >= self.buffer.len() {
            if !self.fill()? {
                return Ok(None);
            }
        }
        Ok(Some(self.buffer[index]))
    }

    /// Returns the next byte without consuming it.
    pub(super) fn peek(&mut self) -> Result<Option<u8>> {
        self.peek_at(self.next_index)
    }

    /// Consumes and returns the next byte.
    pub(super) fn consume(&mut self) -> Result<Option<u8>> {
        let byte = self.peek()?;
        if let Some(byte) = byte {
            self.next_index += 1;
            if byte == b'\n' {
                self.line_no += 1;
            }
        }
        Ok(byte)
    }

    /// Pushes back the last consumed byte so that the next read yields it
    /// again.
    pub fn unput(&mut self) {
        if let Some(index) = self.next_index.checked_sub(1) {
            self.next_index = index;
            if self.buffer[index] == b'\n' {
                self.line_no -= 1;
            }
        }
    }

    /// Moves the read position forward to `end`, counting newlines.
    fn skip_to(&mut self, end: usize) {
        let newlines = self.buffer[self.next_index..end]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.line_no += newlines as u64;
        self.next_index = end;
    }

    /// Skips blanks, line continuations and a comment.
    fn skip_blanks_and_comment(&mut self) -> Result<()> {
        loop {
            match self.peek()? {
                Some(byte) if is_blank(byte) => {
                    self.consume()?;
                }
                Some(b'\\') if self.peek_at(self.next_index + 1)? == Some(b'\n') => {
                    self.consume()?;
                    self.consume()?;
                }
                _ => break,
            }
        }
        if self.peek()? == Some(b'#') {
            while let Some(byte) = self.peek()? {
                if byte == b'\n' {
                    break;
                }
                self.consume()?;
            }
        }
        Ok(())
    }

    /// Registers a here-document whose content is read at the next newline.
    pub fn push_here_doc(&mut self, here_doc: Rc<HereDoc>) {
        self.pending_here_docs.push(here_doc);
    }

    /// Prepares for reading a new command.
    ///
    /// The already consumed part of the buffer is dropped, and the next line
    /// is read as the first line of a command.
    pub fn start_command(&mut self) {
        let consumed = self.next_index;
        self.buffer.drain(..consumed);
        self.next_index = 0;
        self.alias_regions.retain_mut(|region| {
            region.start = region.start.saturating_sub(consumed);
            region.end = region.end.saturating_sub(consumed);
            region.end > 0
        });
        if self.buffer.is_empty() {
            self.first_line = true;
        }
    }

    /// Discards the rest of the input that has been read.
    ///
    /// This is used to recover from a syntax error in an interactive shell.
    pub fn discard_line(&mut self) {
        self.skip_to(self.buffer.len());
        self.pending_here_docs.clear();
        self.alias_regions.clear();
        self.alias_follows = false;
        self.start_command();
    }

    /// Tests whether an alias of the name is being substituted at the index.
    fn is_in_alias(&self, name: &str, index: usize) -> bool {
        self.alias_regions
            .iter()
            .any(|region| region.alias.name == name && region.start <= index && index < region.end)
    }

    /// Tests whether the index is at the end of the last word of an alias
    /// value.
    fn is_at_alias_end(&self, index: usize) -> bool {
        self.alias_regions.iter().any(|region| {
            region.start < index
                && index <= region.end
                && self.buffer[index..region.end].iter().all(|&b| is_blank(b))
        })
    }

    /// Replaces the word between `start` and the current position with the
    /// alias value.
    ///
    /// A space is appended to the value so that the word following the alias
    /// is also subject to alias substitution. After the substitution, the
    /// read position is at the start of the value.
    fn substitute_alias(&mut self, start: usize, alias: Rc<Alias>) {
        let end = self.next_index;
        let mut replacement = crate::bytes::encode(&alias.replacement).into_owned();
        replacement.push(b' ');
        let new_end = start + replacement.len();

        let newlines = self.buffer[start..end].iter().filter(|&&b| b == b'\n').count();
        self.line_no -= newlines as u64;
        self.buffer.splice(start..end, replacement);
        for region in &mut self.alias_regions {
            if region.end >= end {
                region.end = region.end - (end - start) + (new_end - start);
            }
        }
        log::trace!(target: "swsh::lex", "substituting alias {:?}", alias.name);
        self.alias_regions.push(AliasRegion {
            alias,
            start,
            end: new_end,
        });
        self.next_index = start;
    }

    /// Classifies a word token.
    fn word_token_id(&mut self, text: &[u8], quoted: bool, first: bool) -> Result<TokenId> {
        if !quoted
            && !text.is_empty()
            && text.iter().all(u8::is_ascii_digit)
            && matches!(self.peek()?, Some(b'<' | b'>'))
        {
            return Ok(TokenId::IoNumber);
        }
        if first && !quoted {
            if let Some(keyword) = Keyword::from_bytes(text) {
                return Ok(TokenId::Keyword(keyword));
            }
        }
        if assignment_split(text).is_some() {
            Ok(TokenId::AssignmentWord)
        } else {
            Ok(TokenId::Word)
        }
    }

    /// Reads the next token into [`self.token`](Self::token).
    ///
    /// If `first_command_word` is true, the token is at the position of a
    /// command name, so reserved words are recognized and aliases are
    /// substituted. Aliases are also substituted for the word following an
    /// alias value.
    ///
    /// When the token is a newline, the contents of pending here-documents
    /// are read before this function returns.
    pub fn next_token(&mut self, first_command_word: bool, glossary: &dyn Glossary) -> Result<()> {
        loop {
            self.skip_blanks_and_comment()?;
            let start = self.next_index;
            let line_no = self.line_no;
            self.alias_regions.retain(|region| region.end > start);

            if self.peek()?.is_none() {
                if !self.pending_here_docs.is_empty() {
                    return Err(self.error(SyntaxError::MissingHereDocContent));
                }
                self.alias_follows = false;
                self.token = Token {
                    id: TokenId::EndOfInput,
                    text: Vec::new(),
                    line_no,
                    quoted: false,
                };
                return Ok(());
            }

            if let Some(op) = self.operator()? {
                self.alias_follows = false;
                self.token = Token {
                    id: TokenId::Operator(op),
                    text: op.as_str().as_bytes().to_vec(),
                    line_no,
                    quoted: false,
                };
                if op == Operator::Newline {
                    self.read_here_docs()?;
                }
                return Ok(());
            }

            let (text, quoted) = self.word()?;
            let id = self.word_token_id(&text, quoted, first_command_word)?;
            if id == TokenId::Word
                && !quoted
                && (first_command_word || self.alias_follows)
                && !glossary.is_empty()
            {
                if let Some(alias) = glossary.look_up(&text) {
                    if !self.is_in_alias(&alias.name, start) {
                        self.substitute_alias(start, alias);
                        continue;
                    }
                }
            }

            self.alias_follows =
                matches!(id, TokenId::Word | TokenId::AssignmentWord) && self.is_at_alias_end(self.next_index);
            self.token = Token {
                id,
                text,
                line_no,
                quoted,
            };
            return Ok(());
        }
    }
}
