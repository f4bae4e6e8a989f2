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

//! Parsing lists, pipelines and simple commands

use super::lex::{Keyword, Operator, TokenId, assignment_split};
use super::{Parser, Result, SyntaxError};
use crate::marker::remove_quotes;
use crate::syntax::{AndOr, Assign, Node, NodeKind, Word};
use std::rc::Rc;

impl Parser<'_, '_> {
    /// Tests whether the current token can start a command.
    pub(super) fn starts_command(&self) -> bool {
        match self.token().id {
            TokenId::Word | TokenId::AssignmentWord | TokenId::IoNumber => true,
            TokenId::Operator(op) => op == Operator::OpenParen || op.is_redirection(),
            TokenId::Keyword(keyword) => matches!(
                keyword,
                Keyword::Bang
                    | Keyword::If
                    | Keyword::While
                    | Keyword::Until
                    | Keyword::For
                    | Keyword::Case
                    | Keyword::OpenBrace
            ),
            TokenId::EndOfInput => false,
        }
    }

    /// Parses a list of and-or lists up to the end of the line.
    pub(super) fn list(&mut self) -> Result<Node> {
        let mut items = Vec::new();
        loop {
            let mut and_or = self.and_or()?;
            if self.is_operator(Operator::Semicolon) {
                self.advance(true)?;
            } else if self.is_operator(Operator::And) {
                and_or.asynchronous = true;
                self.advance(true)?;
            } else {
                items.push(Rc::new(and_or));
                break;
            }
            items.push(Rc::new(and_or));
            if !self.starts_command() {
                break;
            }
        }
        Ok(Node::flatten(NodeKind::List, items))
    }

    /// Parses a compound list, a sequence of and-or lists separated by
    /// `;`, `&` or newlines that ends before a clause delimiter.
    ///
    /// Returns `None` if the list contains no commands.
    pub(super) fn compound_list(&mut self) -> Result<Option<Node>> {
        self.linebreak()?;
        let mut items = Vec::new();
        while !self.token().id.is_clause_delimiter() {
            let mut and_or = self.and_or()?;
            if self.is_operator(Operator::Semicolon) || self.is_operator(Operator::Newline) {
                self.advance(true)?;
            } else if self.is_operator(Operator::And) {
                and_or.asynchronous = true;
                self.advance(true)?;
            } else {
                items.push(Rc::new(and_or));
                break;
            }
            items.push(Rc::new(and_or));
            self.linebreak()?;
        }
        if items.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Node::flatten(NodeKind::Term, items)))
        }
    }

    /// Parses a compound list that must contain at least one command.
    pub(super) fn required_compound_list(&mut self) -> Result<Node> {
        match self.compound_list()? {
            Some(list) => Ok(list),
            None => Err(self.error(SyntaxError::EmptyCompoundList)),
        }
    }

    /// Parses pipelines joined by `&&` and `||`.
    fn and_or(&mut self) -> Result<Node> {
        let mut pipelines = Vec::new();
        let mut pipeline = self.pipeline()?;
        loop {
            let link = if self.is_operator(Operator::AndAnd) {
                AndOr::AndThen
            } else if self.is_operator(Operator::BarBar) {
                AndOr::OrElse
            } else {
                break;
            };
            pipeline.and_or_link = Some(link);
            pipelines.push(Rc::new(pipeline));
            self.advance(true)?;
            self.linebreak()?;
            if !self.starts_command() {
                return Err(self.error(SyntaxError::MissingPipeline));
            }
            pipeline = self.pipeline()?;
        }
        pipelines.push(Rc::new(pipeline));
        Ok(Node::flatten(NodeKind::AndOr, pipelines))
    }

    /// Parses commands connected by `|`, optionally preceded by `!`.
    fn pipeline(&mut self) -> Result<Node> {
        let line_no = self.token().line_no;
        let negated = self.is_keyword(Keyword::Bang);
        if negated {
            self.advance(true)?;
            if !self.starts_command() {
                return Err(self.error(SyntaxError::MissingCommandAfterBang));
            }
        }

        let mut commands = vec![self.command()?];
        while self.is_operator(Operator::Bar) {
            self.advance(true)?;
            self.linebreak()?;
            if !self.starts_command() {
                return Err(self.error(SyntaxError::MissingCommandAfterBar));
            }
            commands.push(self.command()?);
        }

        if !negated && commands.len() == 1 {
            if let Some(command) = commands.pop() {
                return Ok(command);
            }
        }
        let last = commands.len() - 1;
        let commands = commands
            .into_iter()
            .enumerate()
            .map(|(i, mut command)| {
                command.run_in_background = i < last;
                Rc::new(command)
            })
            .collect();
        Ok(Node::new(NodeKind::Pipeline { negated, commands }, line_no))
    }

    /// Parses a command.
    fn command(&mut self) -> Result<Node> {
        if self.starts_compound_command() {
            return self.full_compound_command();
        }
        match self.token().id {
            TokenId::Word | TokenId::AssignmentWord | TokenId::IoNumber => {
                self.simple_command_or_function()
            }
            TokenId::Operator(op) if op.is_redirection() => self.simple_command_or_function(),
            _ => Err(self.error(SyntaxError::UnexpectedToken)),
        }
    }

    /// Parses a simple command or function definition.
    fn simple_command_or_function(&mut self) -> Result<Node> {
        let line_no = self.token().line_no;
        let mut assigns = Vec::new();
        let mut words = Vec::new();
        let mut redirs = Vec::new();

        loop {
            let token = self.token();
            let (id, quoted) = (token.id, token.quoted);
            let word = Word {
                text: token.text.clone(),
                line_no: token.line_no,
            };
            match id {
                TokenId::AssignmentWord if words.is_empty() => {
                    let index = assignment_split(&word.text).unwrap_or_default();
                    let name = String::from_utf8_lossy(&word.text[..index]).into_owned();
                    let value = Word {
                        text: word.text[index + 1..].to_vec(),
                        line_no: word.line_no,
                    };
                    assigns.push(Assign { name, value });
                    self.advance(true)?;
                }
                TokenId::Word
                    if words.is_empty()
                        && assigns.is_empty()
                        && redirs.is_empty()
                        && !quoted =>
                {
                    self.advance(false)?;
                    if self.is_operator(Operator::OpenParen) {
                        return self.function_definition(&word, line_no);
                    }
                    words.push(word);
                }
                TokenId::Word | TokenId::AssignmentWord => {
                    words.push(word);
                    self.advance(false)?;
                }
                // A reserved word after assignments or redirections is a
                // command name.
                TokenId::Keyword(_) if words.is_empty() => {
                    words.push(word);
                    self.advance(false)?;
                }
                TokenId::IoNumber => {
                    redirs.push(self.redirection()?);
                    self.advance(words.is_empty())?;
                }
                TokenId::Operator(op) if op.is_redirection() => {
                    redirs.push(self.redirection()?);
                    self.advance(words.is_empty())?;
                }
                _ => break,
            }
        }

        if assigns.is_empty() && words.is_empty() && redirs.is_empty() {
            return Err(self.error(SyntaxError::UnexpectedToken));
        }
        let mut node = Node::new(NodeKind::SimpleCommand { assigns, words }, line_no);
        node.redirs = redirs;
        Ok(node)
    }

    /// Parses a function definition after the name.
    ///
    /// The current token must be the `(` following the name.
    fn function_definition(&mut self, name: &Word, line_no: u64) -> Result<Node> {
        self.advance(false)?;
        if !self.is_operator(Operator::CloseParen) {
            return Err(self.error(SyntaxError::UnmatchedParenthesis));
        }
        self.advance(true)?;
        self.linebreak()?;
        if !self.starts_compound_command() {
            return Err(self.error(SyntaxError::MissingFunctionBody));
        }
        let body = self.full_compound_command()?;
        let name = String::from_utf8_lossy(&remove_quotes(&name.text)).into_owned();
        Ok(Node::new(
            NodeKind::Function {
                name,
                body: Rc::new(body),
            },
            line_no,
        ))
    }
}
