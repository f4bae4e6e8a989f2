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

//! Methods about passing source code to the parser
//!
//! This module extends the [input](swsh_syntax::input) module of the syntax
//! crate with input functions that interact with the environment.
//! [`FdReader`] reads lines from a file descriptor. The others are
//! decorators wrapping another input: [`Echo`] implements the `verbose`
//! option, [`Prompter`] prints the prompt of an interactive shell, and
//! [`IgnoreEof`] implements the `ignoreeof` option.
//!
//! The decorators share the environment with the read-eval loop through a
//! `RefCell`. They borrow the environment only while reading a line, so the
//! loop can borrow it to execute the commands parsed.

#[doc(no_inline)]
pub use swsh_syntax::input::*;

mod echo;
mod fd_reader;
mod ignore_eof;
mod prompt;

pub use self::echo::Echo;
pub use self::fd_reader::FdReader;
pub use self::ignore_eof::IgnoreEof;
pub use self::prompt::Prompter;
