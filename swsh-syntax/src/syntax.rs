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

//! Shell command language syntax
//!
//! This module contains types that represent abstract syntax trees (ASTs) of
//! the shell language.
//!
//! A parsed command is a tree of [`Node`]s. Nodes are immutable once built
//! and shared through [`Rc`], so a function definition can keep its body
//! alive after the command line that defined it is dropped, and the body of
//! a running function stays valid even if the function is redefined.
//!
//! The parser does not produce redundant levels: a [`List`](NodeKind::List)
//! or [`AndOr`](NodeKind::AndOr) with a single child, or a
//! [`Pipeline`](NodeKind::Pipeline) with a single command and no `!`, is
//! replaced with the child itself.
//!
//! Words are [marked text](crate::marker).

use crate::marker::{mark_literal, push_escaping_all};
use std::cell::OnceCell;
use std::os::raw::c_int;
use std::rc::Rc;

/// Word in marked text
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Word {
    /// Marked text of the word
    pub text: Vec<u8>,
    /// Line number where the word appears
    pub line_no: u64,
}

impl Word {
    /// Creates a word that means the given literal text.
    #[must_use]
    pub fn literal(text: &[u8], line_no: u64) -> Word {
        Word {
            text: mark_literal(text),
            line_no,
        }
    }
}

/// Assignment word
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assign {
    /// Name of the variable to assign to
    pub name: String,
    /// Value assigned to the variable
    pub value: Word,
}

/// Redirection operators
///
/// This enum defines the redirection operator types except here-document.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RedirOp {
    /// `<` (open a file for input)
    FileIn,
    /// `<>` (open a file for input and output)
    FileInOut,
    /// `>` (open a file for output; truncate or fail if existing)
    FileOut,
    /// `>>` (open a file for output; append if existing)
    FileAppend,
    /// `>|` (open a file for output; always truncate if existing)
    FileClobber,
    /// `<&` (copy or close a file descriptor for input)
    FdIn,
    /// `>&` (copy or close a file descriptor for output)
    FdOut,
}

/// Here-document
#[derive(Debug)]
pub struct HereDoc {
    /// Delimiter that ends the content, with quotes removed
    pub delimiter: Vec<u8>,

    /// Whether the delimiter was quoted
    ///
    /// If quoted, the content is literal. Otherwise, parameter expansion,
    /// command substitution and arithmetic expansion are performed on the
    /// content, and a backslash quotes `$`, `` ` ``, `\` and a newline.
    pub quoted: bool,

    /// Whether leading tab characters are removed from each line
    ///
    /// This value is `true` for the `<<-` operator and `false` for `<<`.
    pub remove_tabs: bool,

    /// Content of the here-document, exactly as read
    ///
    /// The content ends with a newline unless it is empty. Leading tabs are
    /// already removed if `remove_tabs` is true.
    ///
    /// The content is read after the rest of the line containing the
    /// operator, so the cell is filled by the lexer when it reaches the
    /// newline.
    pub content: OnceCell<Vec<u8>>,
}

impl HereDoc {
    /// Returns the content in marked text.
    ///
    /// If the delimiter was quoted, every byte is escaped. Otherwise, the
    /// content is converted as if it were enclosed in double quotes.
    #[must_use]
    pub fn marked_content(&self) -> Vec<u8> {
        let raw = self.content.get().map(Vec::as_slice).unwrap_or_default();
        if self.quoted {
            let mut out = Vec::with_capacity(raw.len() * 2);
            push_escaping_all(&mut out, raw);
            out
        } else {
            crate::parser::lex::mark_here_doc(raw)
        }
    }
}

/// Part of a redirection that defines the nature of the resulting file
/// descriptor
#[derive(Clone, Debug)]
pub enum RedirBody {
    /// Normal redirection
    Normal { operator: RedirOp, operand: Word },
    /// Here-document
    HereDoc(Rc<HereDoc>),
}

/// Redirection
#[derive(Clone, Debug)]
pub struct Redir {
    /// File descriptor that is modified by this redirection
    pub fd: Option<c_int>,
    /// Nature of the resulting file descriptor
    pub body: RedirBody,
    /// Line number where the redirection appears
    pub line_no: u64,
}

impl Redir {
    /// Computes the file descriptor that is modified by this redirection.
    ///
    /// If `self.fd` is `Some(_)`, the value is returned intact. Otherwise,
    /// the default file descriptor is selected depending on the operator.
    #[must_use]
    pub fn fd_or_default(&self) -> c_int {
        use RedirOp::*;
        self.fd.unwrap_or(match self.body {
            RedirBody::Normal { operator, .. } => match operator {
                FileIn | FileInOut | FdIn => 0,
                FileOut | FileAppend | FileClobber | FdOut => 1,
            },
            RedirBody::HereDoc(_) => 0,
        })
    }
}

/// Condition that determines whether the next pipeline in an and-or list is
/// executed
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AndOr {
    /// `&&`
    AndThen,
    /// `||`
    OrElse,
}

/// Branch of a case command
#[derive(Clone, Debug)]
pub struct CaseItem {
    /// Patterns that are matched against the subject
    pub patterns: Vec<Word>,
    /// Commands executed if a pattern matches
    ///
    /// The body may be empty, as in `a) ;;`.
    pub body: Option<Rc<Node>>,
}

/// Type and children of a node
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Sequence of and-or lists separated by `;`, `&` or newlines at the
    /// top level of a command line
    List(Vec<Rc<Node>>),
    /// Sequence of pipelines joined by `&&` and `||`
    ///
    /// Each child except the last has an [`and_or_link`](Node::and_or_link)
    /// that tells how it is joined with the next child.
    AndOr(Vec<Rc<Node>>),
    /// Commands connected by `|`
    Pipeline {
        negated: bool,
        commands: Vec<Rc<Node>>,
    },
    /// Command with assignments, words and redirections
    SimpleCommand { assigns: Vec<Assign>, words: Vec<Word> },
    /// Function definition
    Function { name: String, body: Rc<Node> },
    /// `if` command
    ///
    /// An `elif` clause is represented as a nested `If` node in `else_part`.
    If {
        condition: Rc<Node>,
        body: Rc<Node>,
        else_part: Option<Rc<Node>>,
    },
    /// Sequence of commands inside a compound command
    Term(Vec<Rc<Node>>),
    /// `for` loop
    For {
        name: String,
        /// Words after `in`, or `None` to iterate over the positional
        /// parameters
        values: Option<Vec<Word>>,
        body: Rc<Node>,
    },
    /// `{ ... }`
    BraceGroup(Rc<Node>),
    /// `case` command
    Case { subject: Word, items: Vec<CaseItem> },
    /// `while` loop
    While { condition: Rc<Node>, body: Rc<Node> },
    /// `until` loop
    Until { condition: Rc<Node>, body: Rc<Node> },
    /// `( ... )`
    Subshell(Rc<Node>),
}

/// Node of the abstract syntax tree
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    /// Redirections applied to the whole node
    pub redirs: Vec<Redir>,
    /// Line number of the first token of the node
    pub line_no: u64,
    /// How this node is joined with the next one in an and-or list
    pub and_or_link: Option<AndOr>,
    /// Whether this is a non-final command of a pipeline, which the shell
    /// does not wait for before starting the next command of the pipeline
    pub run_in_background: bool,
    /// Whether this node was followed by `&`
    pub asynchronous: bool,
}

impl Node {
    /// Creates a node with no redirections and flags.
    #[must_use]
    pub fn new(kind: NodeKind, line_no: u64) -> Node {
        Node {
            kind,
            redirs: Vec::new(),
            line_no,
            and_or_link: None,
            run_in_background: false,
            asynchronous: false,
        }
    }

    /// Creates a list-like node, or returns the only child if there is just
    /// one.
    ///
    /// `kind` is [`NodeKind::List`], [`NodeKind::AndOr`] or
    /// [`NodeKind::Term`]. The single child is returned only if the caller
    /// is its sole owner, which is always the case in the parser.
    #[must_use]
    pub fn flatten(kind: fn(Vec<Rc<Node>>) -> NodeKind, mut children: Vec<Rc<Node>>) -> Node {
        let line_no = children.first().map_or(0, |child| child.line_no);
        if children.len() == 1 {
            if let Some(only) = children.pop() {
                match Rc::try_unwrap(only) {
                    Ok(node) => return node,
                    Err(rc) => children.push(rc),
                }
            }
        }
        Node::new(kind(children), line_no)
    }

    /// Returns the name of the command if this is a simple command whose
    /// first word is a literal.
    #[must_use]
    pub fn literal_command_name(&self) -> Option<Vec<u8>> {
        match &self.kind {
            NodeKind::SimpleCommand { words, .. } => {
                let first = words.first()?;
                if crate::marker::is_quoted(&first.text) {
                    None
                } else {
                    Some(first.text.clone())
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(word: &str, line_no: u64) -> Rc<Node> {
        Rc::new(Node::new(
            NodeKind::SimpleCommand {
                assigns: vec![],
                words: vec![Word::literal(word.as_bytes(), line_no)],
            },
            line_no,
        ))
    }

    #[test]
    fn flatten_single_child() {
        let node = Node::flatten(NodeKind::List, vec![simple("a", 3)]);
        assert!(matches!(node.kind, NodeKind::SimpleCommand { .. }));
        assert_eq!(node.line_no, 3);
        assert_eq!(node.literal_command_name(), Some(b"a".to_vec()));
    }

    #[test]
    fn flatten_multiple_children() {
        let node = Node::flatten(NodeKind::AndOr, vec![simple("a", 1), simple("b", 2)]);
        assert!(matches!(&node.kind, NodeKind::AndOr(children) if children.len() == 2));
        assert_eq!(node.line_no, 1);
    }

    #[test]
    fn default_redirection_fd() {
        let redir = |operator| Redir {
            fd: None,
            body: RedirBody::Normal {
                operator,
                operand: Word::literal(b"f", 1),
            },
            line_no: 1,
        };
        assert_eq!(redir(RedirOp::FileIn).fd_or_default(), 0);
        assert_eq!(redir(RedirOp::FileAppend).fd_or_default(), 1);
        assert_eq!(redir(RedirOp::FdOut).fd_or_default(), 1);
        let explicit = Redir {
            fd: Some(5),
            ..redir(RedirOp::FileIn)
        };
        assert_eq!(explicit.fd_or_default(), 5);
    }
}
