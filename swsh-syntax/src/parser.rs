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

//! Syntax parser for the shell language.
//!
//! The [`Parser`] is a recursive descent parser that pulls tokens from a
//! [`Lexer`](lex::Lexer). [`Parser::command_line`] parses one command line at
//! a time, so the shell can execute a line before reading the next one. This
//! is necessary because an alias defined on one line takes effect on the
//! following lines.
//!
//! The parser tells the lexer whether the next token is at the position of a
//! command name, where reserved words are recognized and aliases are
//! substituted.

mod command;
mod compound;
pub mod error;
pub mod lex;
mod redir;

pub use self::error::{Error, ErrorCause, Result, SyntaxError};

use self::lex::{Keyword, Lexer, Operator, Token, TokenId};
use crate::alias::Glossary;
use crate::syntax::Node;
use std::rc::Rc;

/// Result of [`Parser::command_line`]
#[derive(Clone, Debug)]
pub enum Line {
    /// The input has ended.
    EndOfInput,
    /// The line contained no commands.
    Blank,
    /// Command parsed from the line
    Command(Rc<Node>),
}

/// The shell syntax parser
///
/// A parser borrows a lexer and a glossary. The glossary is consulted for
/// alias substitution while the parser is alive, so the parser is usually
/// created for each command line and dropped before the command is
/// executed.
pub struct Parser<'a, 'b> {
    lexer: &'a mut Lexer<'b>,
    glossary: &'a dyn Glossary,
}

impl<'a, 'b> Parser<'a, 'b> {
    /// Creates a new parser based on the given lexer and glossary.
    pub fn new(lexer: &'a mut Lexer<'b>, glossary: &'a dyn Glossary) -> Self {
        Parser { lexer, glossary }
    }

    /// Returns the current token.
    fn token(&self) -> &Token {
        &self.lexer.token
    }

    /// Tests whether the current token is the operator.
    fn is_operator(&self, op: Operator) -> bool {
        self.token().id == TokenId::Operator(op)
    }

    /// Tests whether the current token is the reserved word.
    fn is_keyword(&self, keyword: Keyword) -> bool {
        self.token().id == TokenId::Keyword(keyword)
    }

    /// Reads the next token.
    fn advance(&mut self, first_command_word: bool) -> Result<()> {
        self.lexer.next_token(first_command_word, self.glossary)
    }

    /// Creates an error at the current token.
    fn error(&self, cause: SyntaxError) -> Error {
        Error {
            cause: cause.into(),
            line_no: self.token().line_no,
            token: self.token().text.clone(),
        }
    }

    /// Skips newline tokens.
    fn linebreak(&mut self) -> Result<()> {
        while self.is_operator(Operator::Newline) {
            self.advance(true)?;
        }
        Ok(())
    }

    /// Parses a command line.
    ///
    /// A command line is a list of commands that ends with a newline or the
    /// end of input. The newline token is not consumed beyond the line, so
    /// the next line is not read until this function is called again.
    pub fn command_line(&mut self) -> Result<Line> {
        self.lexer.start_command();
        self.advance(true)?;
        match self.token().id {
            TokenId::EndOfInput => return Ok(Line::EndOfInput),
            TokenId::Operator(Operator::Newline) => return Ok(Line::Blank),
            _ => (),
        }
        let list = self.list()?;
        match self.token().id {
            TokenId::EndOfInput | TokenId::Operator(Operator::Newline) => {
                Ok(Line::Command(Rc::new(list)))
            }
            _ => Err(self.error(SyntaxError::UnexpectedToken)),
        }
    }

    /// Parses all command lines up to the end of input.
    ///
    /// Aliases are substituted with the glossary at the time of parsing, so
    /// this function is not suitable for scripts that define aliases.
    pub fn program(&mut self) -> Result<Vec<Rc<Node>>> {
        let mut commands = Vec::new();
        loop {
            match self.command_line()? {
                Line::EndOfInput => return Ok(commands),
                Line::Blank => (),
                Line::Command(command) => commands.push(command),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::{AliasSet, EmptyGlossary, HashEntry};
    use crate::input::Memory;
    use crate::syntax::NodeKind;

    #[test]
    fn blank_lines_and_end_of_input() {
        let mut lexer = Lexer::new(Box::new(Memory::new(b"\n  # comment\necho")));
        let mut parser = Parser::new(&mut lexer, &EmptyGlossary);
        assert!(matches!(parser.command_line().unwrap(), Line::Blank));
        assert!(matches!(parser.command_line().unwrap(), Line::Blank));
        assert!(matches!(parser.command_line().unwrap(), Line::Command(_)));
        assert!(matches!(parser.command_line().unwrap(), Line::EndOfInput));
    }

    #[test]
    fn lines_are_parsed_one_at_a_time() {
        let mut lexer = Lexer::new(Box::new(Memory::new(b"a\ng\n")));
        let mut aliases = AliasSet::new();
        let Line::Command(first) = Parser::new(&mut lexer, &aliases).command_line().unwrap()
        else {
            panic!("expected a command");
        };
        assert_eq!(first.literal_command_name(), Some(b"a".to_vec()));

        aliases.insert(HashEntry::new("g".to_string(), "echo hi".to_string()));
        let Line::Command(second) = Parser::new(&mut lexer, &aliases).command_line().unwrap()
        else {
            panic!("expected a command");
        };
        assert_matches::assert_matches!(&second.kind, NodeKind::SimpleCommand { words, .. } => {
            assert_eq!(words.len(), 2);
            assert_eq!(words[0].text, b"echo");
            assert_eq!(words[1].text, b"hi");
        });
    }

    #[test]
    fn unexpected_token_at_end_of_line() {
        let mut lexer = Lexer::new(Box::new(Memory::new(b"echo a )\n")));
        let error = Parser::new(&mut lexer, &EmptyGlossary)
            .command_line()
            .unwrap_err();
        assert_eq!(error.cause, SyntaxError::UnexpectedToken.into());
        assert_eq!(error.token, b")");
        assert_eq!(error.to_string(), "1: syntax error: unexpected token Token: )");
    }

    #[test]
    fn program_collects_all_lines() {
        let mut lexer = Lexer::new(Box::new(Memory::new(b"a\n\nb; c\n")));
        let commands = Parser::new(&mut lexer, &EmptyGlossary).program().unwrap();
        assert_eq!(commands.len(), 2);
        assert_matches::assert_matches!(&commands[1].kind, NodeKind::List(items) => {
            assert_eq!(items.len(), 2);
        });
    }
}
