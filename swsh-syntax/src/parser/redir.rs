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

//! Parsing redirections

use super::lex::{Operator, TokenId};
use super::{Parser, Result, SyntaxError};
use crate::marker::remove_quotes;
use crate::syntax::{HereDoc, Redir, RedirBody, RedirOp, Word};
use std::cell::OnceCell;
use std::rc::Rc;

impl Parser<'_, '_> {
    /// Parses a redirection.
    ///
    /// The current token must be an IO number or a redirection operator.
    /// After this function returns, the current token is still the operand
    /// of the redirection; the caller reads the next token.
    ///
    /// For a here-document, the content is read by the lexer at the end of
    /// the line.
    pub(super) fn redirection(&mut self) -> Result<Redir> {
        let line_no = self.token().line_no;
        let fd = if self.token().id == TokenId::IoNumber {
            let text = String::from_utf8_lossy(&self.token().text).into_owned();
            let fd = text
                .parse()
                .map_err(|_| self.error(SyntaxError::FdOutOfRange))?;
            self.advance(false)?;
            Some(fd)
        } else {
            None
        };

        let TokenId::Operator(op) = self.token().id else {
            return Err(self.error(SyntaxError::UnexpectedToken));
        };
        self.advance(false)?;

        let is_here_doc = matches!(op, Operator::LessLess | Operator::LessLessDash);
        if !matches!(
            self.token().id,
            TokenId::Word | TokenId::AssignmentWord | TokenId::IoNumber
        ) {
            let cause = if is_here_doc {
                SyntaxError::MissingHereDocDelimiter
            } else {
                SyntaxError::MissingRedirOperand
            };
            return Err(self.error(cause));
        }
        let operand = Word {
            text: self.token().text.clone(),
            line_no: self.token().line_no,
        };

        let body = if is_here_doc {
            let here_doc = Rc::new(HereDoc {
                delimiter: remove_quotes(&operand.text),
                quoted: self.token().quoted,
                remove_tabs: op == Operator::LessLessDash,
                content: OnceCell::new(),
            });
            self.lexer.push_here_doc(Rc::clone(&here_doc));
            RedirBody::HereDoc(here_doc)
        } else {
            let operator = match op {
                Operator::Less => RedirOp::FileIn,
                Operator::LessGreater => RedirOp::FileInOut,
                Operator::Greater => RedirOp::FileOut,
                Operator::GreaterGreater => RedirOp::FileAppend,
                Operator::GreaterBar => RedirOp::FileClobber,
                Operator::LessAnd => RedirOp::FdIn,
                Operator::GreaterAnd => RedirOp::FdOut,
                _ => return Err(self.error(SyntaxError::UnexpectedToken)),
            };
            RedirBody::Normal { operator, operand }
        };
        Ok(Redir { fd, body, line_no })
    }
}

#[cfg(test)]
mod tests {
    use crate::alias::EmptyGlossary;
    use crate::input::Memory;
    use crate::marker::{QUOTE, is_quoted};
    use crate::parser::lex::Lexer;
    use crate::parser::{ErrorCause, Line, Parser, SyntaxError};
    use crate::syntax::{Node, RedirBody, RedirOp};
    use assert_matches::assert_matches;
    use std::rc::Rc;

    fn parse(code: &[u8]) -> Rc<Node> {
        let mut lexer = Lexer::new(Box::new(Memory::new(code)));
        match Parser::new(&mut lexer, &EmptyGlossary).command_line() {
            Ok(Line::Command(node)) => node,
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn normal_redirections() {
        let node = parse(b"cmd <a 3>b 2>>c >|d <>e 4<&5 >&-\n");
        let redirs: Vec<_> = node
            .redirs
            .iter()
            .map(|redir| match &redir.body {
                RedirBody::Normal { operator, operand } => {
                    (redir.fd_or_default(), *operator, operand.text.clone())
                }
                RedirBody::HereDoc(_) => panic!("unexpected here-document"),
            })
            .collect();
        assert_eq!(
            redirs,
            [
                (0, RedirOp::FileIn, b"a".to_vec()),
                (3, RedirOp::FileOut, b"b".to_vec()),
                (2, RedirOp::FileAppend, b"c".to_vec()),
                (1, RedirOp::FileClobber, b"d".to_vec()),
                (0, RedirOp::FileInOut, b"e".to_vec()),
                (4, RedirOp::FdIn, b"5".to_vec()),
                (1, RedirOp::FdOut, b"-".to_vec()),
            ]
        );
    }

    #[test]
    fn here_documents() {
        let node = parse(b"cat <<END <<-'X'; echo\n$a\nEND\n\tb\n\tX\n");
        assert_matches!(&node.kind, crate::syntax::NodeKind::List(items) => {
            let redirs = &items[0].redirs;
            assert_eq!(redirs.len(), 2);
            assert_matches!(&redirs[0].body, RedirBody::HereDoc(doc) => {
                assert_eq!(doc.delimiter, b"END");
                assert!(!doc.quoted);
                assert_eq!(doc.content.get().unwrap(), b"$a\n");
                let marked = doc.marked_content();
                assert_eq!(marked, [QUOTE, b'$', b'a', b'\n', QUOTE]);
            });
            assert_matches!(&redirs[1].body, RedirBody::HereDoc(doc) => {
                assert_eq!(doc.delimiter, b"X");
                assert!(doc.quoted);
                assert!(doc.remove_tabs);
                assert_eq!(doc.content.get().unwrap(), b"b\n");
                assert!(is_quoted(&doc.marked_content()));
            });
        });
    }

    #[test]
    fn missing_operands() {
        let error = |code: &[u8]| {
            let mut lexer = Lexer::new(Box::new(Memory::new(code)));
            match Parser::new(&mut lexer, &EmptyGlossary).command_line() {
                Err(error) => error.cause,
                other => panic!("unexpected result: {other:?}"),
            }
        };
        assert_eq!(
            error(b"echo >\n"),
            ErrorCause::Syntax(SyntaxError::MissingRedirOperand)
        );
        assert_eq!(
            error(b"cat <<;\n"),
            ErrorCause::Syntax(SyntaxError::MissingHereDocDelimiter)
        );
        assert_eq!(
            error(b"echo 99999999999>x\n"),
            ErrorCause::Syntax(SyntaxError::FdOutOfRange)
        );
    }
}
