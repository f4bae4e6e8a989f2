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

//! Shell language syntax and parser.
//!
//! This crate defines the abstract syntax tree (AST) of the shell language in
//! the [`syntax`] module and a parser that builds it in the [`parser`] module.
//!
//! Words in the AST are kept as *marked text*: byte strings in which quoting
//! is represented by two in-band control bytes defined in the [`marker`]
//! module. Expansions such as `$(...)` and `${...}` are kept verbatim in the
//! marked text and are re-scanned by the expander with the helpers of the
//! [`scan`] module.
//!
//! The [`input`] module defines an abstract method for feeding the parser
//! with source code, and the [`alias`] module defines aliases that are
//! substituted while parsing. The [`bytes`] module converts arbitrary bytes
//! to strings and back without loss.
//!
//! ```
//! # use swsh_syntax::alias::EmptyGlossary;
//! # use swsh_syntax::input::Memory;
//! # use swsh_syntax::parser::{Line, Parser, lex::Lexer};
//! # use swsh_syntax::syntax::NodeKind;
//! let mut lexer = Lexer::new(Box::new(Memory::new(b"echo hello | cat\n")));
//! let mut parser = Parser::new(&mut lexer, &EmptyGlossary);
//! let Line::Command(node) = parser.command_line().unwrap() else { panic!() };
//! assert!(matches!(node.kind, NodeKind::Pipeline { .. }));
//! ```

pub mod alias;
pub mod bytes;
pub mod input;
pub mod marker;
pub mod parser;
pub mod scan;
pub mod syntax;
