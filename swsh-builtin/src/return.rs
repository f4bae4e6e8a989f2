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

//! Return built-in
//!
//! The **`return`** built-in quits the currently executing function or
//! script.
//!
//! # Synopsis
//!
//! ```sh
//! return [exit_status]
//! ```
//!
//! # Description
//!
//! The built-in ends the innermost function call or the script read by the
//! `.` built-in. The exit status of the function or script is the operand,
//! which must be a non-negative decimal integer.
//!
//! Without an operand, the exit status is that of the last command
//! executed. In a trap action, the exit status is that of the last command
//! executed before the trap was entered.
//!
//! # Errors
//!
//! It is an error to use the built-in outside a function or script.

use crate::common::syntax::parse_arguments;
use crate::common::{report_failure, syntax_error};
use std::ops::ControlFlow::Break;
use swsh_env::Env;
use swsh_env::builtin::Result;
use swsh_env::semantics::{Divert, ExitStatus, Field};
use swsh_env::stack::Frame;

/// Parses the optional exit status operand of `return` and `exit`.
pub(crate) fn parse_exit_status(
    args: Vec<Field>,
) -> std::result::Result<Option<ExitStatus>, String> {
    let operands = parse_arguments(&[], args).map_err(|error| error.to_string())?.1;
    match operands.as_slice() {
        [] => Ok(None),
        [operand] => match operand.value.parse::<u32>() {
            Ok(value) => match i32::try_from(value) {
                Ok(value) => Ok(Some(ExitStatus(value))),
                Err(_) => Err(format!("{}: exit status out of range", operand.value)),
            },
            Err(_) => Err(format!("{}: not a valid exit status", operand.value)),
        },
        _ => Err("too many operands".to_string()),
    }
}

/// Returns the exit status used when no operand is given.
///
/// Inside a trap action, this is the exit status saved when entering the
/// trap.
pub(crate) fn default_exit_status(env: &Env) -> ExitStatus {
    env.stack
        .iter()
        .rev()
        .find_map(|frame| match frame {
            Frame::Trap {
                previous_exit_status,
                ..
            } => Some(*previous_exit_status),
            _ => None,
        })
        .unwrap_or(env.exit_status)
}

/// Entry point of the return built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let exit_status = match parse_exit_status(args) {
        Ok(exit_status) => exit_status,
        Err(message) => return syntax_error(env, &message),
    };
    if !env.stack.is_returnable() {
        return report_failure(env, "not in a function or script");
    }
    let exit_status = exit_status.unwrap_or_else(|| default_exit_status(env));
    Result::with_exit_status_and_divert(exit_status, Break(Divert::Return(Some(exit_status))))
}
