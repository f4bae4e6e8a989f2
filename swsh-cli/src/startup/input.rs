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

//! Preparing input for the parser
//!
//! This module implements the [`prepare_input`] function that prepares the
//! input for the shell syntax parser. The input is constructed from the given
//! source and decorated with the [`Echo`], [`Prompter`], and [`IgnoreEof`]
//! decorators as necessary.

use super::args::Source;
use std::cell::RefCell;
use swsh_env::Env;
use swsh_env::input::{Echo, FdReader, IgnoreEof, Input, Memory, Prompter};
use swsh_env::io::{Fd, MIN_INTERNAL_FD};
use swsh_env::system::{Errno, Mode, OFlag, SharedSystem, System as _};
use swsh_semantics::ExitStatus;
use swsh_syntax::bytes::{encode, to_c_string};
use swsh_syntax::parser::lex::Lexer;
use thiserror::Error;

/// Error returned by [`prepare_input`]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("cannot open script file '{path}': {}", .errno.desc())]
pub struct PrepareInputError {
    /// Raw error value returned by the underlying system call
    pub errno: Errno,
    /// Path of the script file that could not be opened
    pub path: String,
}

impl PrepareInputError {
    /// Returns the exit status the shell exits with because of this error.
    ///
    /// The status is 127 if the file is not found and 126 otherwise.
    #[must_use]
    pub fn exit_status(&self) -> ExitStatus {
        match self.errno {
            Errno::ENOENT | Errno::ENOTDIR | Errno::EILSEQ => ExitStatus::NOT_FOUND,
            _ => ExitStatus::NOEXEC,
        }
    }
}

/// Moves the file descriptor to [`MIN_INTERNAL_FD`] or above.
///
/// Scripts read by the shell must not occupy the file descriptors available
/// to redirections.
fn move_fd_internal(system: &mut SharedSystem, fd: Fd) -> Result<Fd, Errno> {
    if fd >= MIN_INTERNAL_FD {
        return Ok(fd);
    }
    let new_fd = system.dup(fd, MIN_INTERNAL_FD, true)?;
    let _ = system.close(fd);
    Ok(new_fd)
}

/// Prepares the input for the shell syntax parser.
///
/// This function constructs a lexer from the given source with the
/// following decorators applied to the input object:
///
/// - If the source is read with a file descriptor, the [`Echo`] decorator is
///   applied to the input to implement the `verbose` shell option.
/// - If the shell is interactive and the source is the standard input, the
///   [`Prompter`] and [`IgnoreEof`] decorators are applied as well.
///
/// The `RefCell` passed as the first argument should be shared with (and only
/// with) the [`ReadEvalLoop`](swsh_semantics::ReadEvalLoop) that consumes the
/// input and executes the parsed commands.
pub fn prepare_input<'a>(
    env: &'a RefCell<&mut Env>,
    source: &'a Source,
) -> Result<Lexer<'a>, PrepareInputError> {
    match source {
        Source::Stdin => {
            let (system, is_interactive) = {
                let env = env.borrow();
                (env.system.clone(), env.is_interactive())
            };
            let basic_input = Echo::new(FdReader::new(Fd::STDIN, system), env);
            let input: Box<dyn Input + 'a> = if is_interactive {
                let message =
                    "# Type `exit` to leave the shell when the ignoreeof option is on.\n"
                        .to_string();
                let prompter = Prompter::new(basic_input, env);
                Box::new(IgnoreEof::new(prompter, Fd::STDIN, env, message))
            } else {
                Box::new(basic_input)
            };
            Ok(Lexer::new(input))
        }

        Source::File { path } => {
            let mut system = env.borrow().system.clone();
            let c_path = to_c_string(path).map_err(|_| PrepareInputError {
                errno: Errno::EILSEQ,
                path: path.clone(),
            })?;
            let fd = system
                .open(&c_path, OFlag::O_RDONLY | OFlag::O_CLOEXEC, Mode::empty())
                .and_then(|fd| move_fd_internal(&mut system, fd))
                .map_err(|errno| PrepareInputError {
                    errno,
                    path: path.clone(),
                })?;
            log::debug!(target: "swsh::exec", "reading script {path} from fd {fd}");
            let input = Box::new(Echo::new(FdReader::new(fd, system), env));
            Ok(Lexer::new(input))
        }

        Source::String(command) => Ok(Lexer::new(Box::new(Memory::from(encode(command))))),
    }
}
