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

//! Exit built-in
//!
//! The **`exit`** built-in causes the currently executing shell to exit.
//!
//! # Synopsis
//!
//! ```sh
//! exit [exit_status]
//! ```
//!
//! # Description
//!
//! The built-in makes the shell exit with the exit status given as the
//! operand. Without an operand, the exit status is that of the last command
//! executed, or in a trap action, that of the last command executed before
//! the trap was entered.
//!
//! The EXIT trap is run by the shell before it exits. In a subshell, the
//! built-in exits the subshell only.

use crate::common::syntax_error;
use crate::r#return::{default_exit_status, parse_exit_status};
use std::ops::ControlFlow::Break;
use swsh_env::Env;
use swsh_env::builtin::Result;
use swsh_env::semantics::{Divert, Field};

/// Entry point of the exit built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let exit_status = match parse_exit_status(args) {
        Ok(exit_status) => exit_status.unwrap_or_else(|| default_exit_status(env)),
        Err(message) => return syntax_error(env, &message),
    };
    log::debug!(target: "swsh::exec", "exit requested with status {exit_status}");
    Result::with_exit_status_and_divert(exit_status, Break(Divert::Exit(Some(exit_status))))
}
