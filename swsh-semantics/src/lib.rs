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

//! Semantics of the shell language.
//!
//! This crate defines how commands are executed and words are expanded.
//! A parsed command can be executed by calling
//! [`Command::execute`](command::Command::execute). Words are expanded by
//! the functions in [`expansion`].
//!
//! A [`ReadEvalLoop`] reads, parses, and executes commands from an input.
//! [`run_source`] is a shorthand for running commands in a string, as
//! the `eval` built-in and traps do.

pub mod assign;
pub mod command;
pub mod command_search;
pub mod expansion;
pub mod redir;
pub mod subshell;
pub mod trap;
pub mod xtrace;

#[doc(no_inline)]
pub use swsh_env::semantics::*;

mod handle;
pub use handle::Handle;

mod runner;
pub use runner::{ReadEvalLoop, run_source};

pub use command::Command;
