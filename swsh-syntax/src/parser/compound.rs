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

//! Parsing compound commands

use super::lex::{Keyword, Operator, TokenId};
use super::{Parser, Result, SyntaxError};
use crate::marker::is_name;
use crate::syntax::{CaseItem, Node, NodeKind, Word};
use std::rc::Rc;

impl Parser<'_, '_> {
    /// Tests whether the current token starts a compound command.
    pub(super) fn starts_compound_command(&self) -> bool {
        match self.token().id {
            TokenId::Keyword(keyword) => matches!(
                keyword,
                Keyword::If
                    | Keyword::While
                    | Keyword::Until
                    | Keyword::For
                    | Keyword::Case
                    | Keyword::OpenBrace
            ),
            TokenId::Operator(op) => op == Operator::OpenParen,
            _ => false,
        }
    }

    /// Parses a compound command followed by optional redirections.
    pub(super) fn full_compound_command(&mut self) -> Result<Node> {
        let mut node = match self.token().id {
            TokenId::Keyword(Keyword::OpenBrace) => self.brace_group()?,
            TokenId::Operator(Operator::OpenParen) => self.subshell()?,
            TokenId::Keyword(Keyword::If) => self.if_command()?,
            TokenId::Keyword(Keyword::While) => self.while_loop(false)?,
            TokenId::Keyword(Keyword::Until) => self.while_loop(true)?,
            TokenId::Keyword(Keyword::For) => self.for_loop()?,
            TokenId::Keyword(Keyword::Case) => self.case_command()?,
            _ => return Err(self.error(SyntaxError::UnexpectedToken)),
        };
        while self.token().id == TokenId::IoNumber
            || matches!(self.token().id, TokenId::Operator(op) if op.is_redirection())
        {
            node.redirs.push(self.redirection()?);
            self.advance(true)?;
        }
        Ok(node)
    }

    fn brace_group(&mut self) -> Result<Node> {
        let line_no = self.token().line_no;
        self.advance(true)?;
        let list = self.required_compound_list()?;
        if !self.is_keyword(Keyword::CloseBrace) {
            return Err(self.error(SyntaxError::UnclosedGrouping));
        }
        self.advance(true)?;
        Ok(Node::new(NodeKind::BraceGroup(Rc::new(list)), line_no))
    }

    fn subshell(&mut self) -> Result<Node> {
        let line_no = self.token().line_no;
        self.advance(true)?;
        let list = self.required_compound_list()?;
        if !self.is_operator(Operator::CloseParen) {
            return Err(self.error(SyntaxError::UnclosedSubshell));
        }
        self.advance(true)?;
        Ok(Node::new(NodeKind::Subshell(Rc::new(list)), line_no))
    }

    fn if_command(&mut self) -> Result<Node> {
        let node = self.if_clause()?;
        if !self.is_keyword(Keyword::Fi) {
            return Err(self.error(SyntaxError::UnclosedIf));
        }
        self.advance(true)?;
        Ok(node)
    }

    /// Parses an `if` or `elif` clause up to the closing `fi`, which is not
    /// consumed.
    fn if_clause(&mut self) -> Result<Node> {
        let line_no = self.token().line_no;
        self.advance(true)?;
        let condition = self.required_compound_list()?;
        if !self.is_keyword(Keyword::Then) {
            return Err(self.error(SyntaxError::IfMissingThen));
        }
        self.advance(true)?;
        let body = self.required_compound_list()?;
        let else_part = if self.is_keyword(Keyword::Elif) {
            Some(Rc::new(self.if_clause()?))
        } else if self.is_keyword(Keyword::Else) {
            self.advance(true)?;
            Some(Rc::new(self.required_compound_list()?))
        } else {
            None
        };
        Ok(Node::new(
            NodeKind::If {
                condition: Rc::new(condition),
                body: Rc::new(body),
                else_part,
            },
            line_no,
        ))
    }

    /// Parses a `do ... done` clause.
    fn do_group(&mut self) -> Result<Node> {
        if !self.is_keyword(Keyword::Do) {
            return Err(self.error(SyntaxError::MissingDoClause));
        }
        self.advance(true)?;
        let body = self.required_compound_list()?;
        if !self.is_keyword(Keyword::Done) {
            return Err(self.error(SyntaxError::UnclosedDoClause));
        }
        self.advance(true)?;
        Ok(body)
    }

    fn while_loop(&mut self, until: bool) -> Result<Node> {
        let line_no = self.token().line_no;
        self.advance(true)?;
        let condition = Rc::new(self.required_compound_list()?);
        let body = Rc::new(self.do_group()?);
        let kind = if until {
            NodeKind::Until { condition, body }
        } else {
            NodeKind::While { condition, body }
        };
        Ok(Node::new(kind, line_no))
    }

    fn for_loop(&mut self) -> Result<Node> {
        let line_no = self.token().line_no;
        self.advance(false)?;
        let name = match self.token().id {
            TokenId::Word | TokenId::AssignmentWord | TokenId::IoNumber => {
                let text = &self.token().text;
                if !is_name(text) {
                    return Err(self.error(SyntaxError::InvalidForName));
                }
                String::from_utf8_lossy(text).into_owned()
            }
            _ => return Err(self.error(SyntaxError::MissingForName)),
        };
        self.advance(true)?;

        let values = if self.is_operator(Operator::Semicolon) {
            self.advance(true)?;
            self.linebreak()?;
            None
        } else {
            self.linebreak()?;
            if self.is_keyword(Keyword::In) {
                Some(self.for_values()?)
            } else {
                None
            }
        };

        let body = Rc::new(self.do_group()?);
        Ok(Node::new(NodeKind::For { name, values, body }, line_no))
    }

    /// Parses the words after `in` in a for loop, and the following
    /// separator.
    fn for_values(&mut self) -> Result<Vec<Word>> {
        let mut values = Vec::new();
        self.advance(false)?;
        loop {
            match self.token().id {
                TokenId::Word | TokenId::AssignmentWord | TokenId::IoNumber => {
                    values.push(Word {
                        text: self.token().text.clone(),
                        line_no: self.token().line_no,
                    });
                    self.advance(false)?;
                }
                TokenId::Operator(Operator::Semicolon | Operator::Newline) => {
                    self.advance(true)?;
                    self.linebreak()?;
                    return Ok(values);
                }
                _ => return Err(self.error(SyntaxError::MissingDoClause)),
            }
        }
    }

    fn case_command(&mut self) -> Result<Node> {
        let line_no = self.token().line_no;
        self.advance(false)?;
        let subject = match self.token().id {
            TokenId::Word | TokenId::AssignmentWord | TokenId::IoNumber => Word {
                text: self.token().text.clone(),
                line_no: self.token().line_no,
            },
            _ => return Err(self.error(SyntaxError::MissingCaseSubject)),
        };
        self.advance(true)?;
        self.linebreak()?;
        if !self.is_keyword(Keyword::In) {
            return Err(self.error(SyntaxError::MissingIn));
        }
        self.advance(true)?;
        self.linebreak()?;

        let mut items = Vec::new();
        while !self.is_keyword(Keyword::Esac) {
            if self.token().id == TokenId::EndOfInput {
                return Err(self.error(SyntaxError::UnclosedCase));
            }
            items.push(self.case_item()?);
            if self.is_operator(Operator::SemicolonSemicolon) {
                self.advance(true)?;
                self.linebreak()?;
            } else if !self.is_keyword(Keyword::Esac) {
                return Err(self.error(SyntaxError::UnclosedCase));
            }
        }
        self.advance(true)?;
        Ok(Node::new(NodeKind::Case { subject, items }, line_no))
    }

    /// Parses a case item up to, but not including, `;;` or `esac`.
    fn case_item(&mut self) -> Result<CaseItem> {
        if self.is_operator(Operator::OpenParen) {
            self.advance(false)?;
        }
        let mut patterns = Vec::new();
        loop {
            match self.token().id {
                TokenId::Word | TokenId::AssignmentWord | TokenId::IoNumber | TokenId::Keyword(_) => {
                    patterns.push(Word {
                        text: self.token().text.clone(),
                        line_no: self.token().line_no,
                    });
                }
                _ => return Err(self.error(SyntaxError::MissingPattern)),
            }
            self.advance(false)?;
            if self.is_operator(Operator::Bar) {
                self.advance(false)?;
            } else if self.is_operator(Operator::CloseParen) {
                break;
            } else {
                return Err(self.error(SyntaxError::UnclosedPatternList));
            }
        }
        self.advance(true)?;
        let body = self.compound_list()?.map(Rc::new);
        Ok(CaseItem { patterns, body })
    }
}
