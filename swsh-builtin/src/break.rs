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

//! Break built-in
//!
//! The **`break`** built-in exits the enclosing loops.
//!
//! # Synopsis
//!
//! ```sh
//! break [n]
//! ```
//!
//! # Description
//!
//! The built-in exits the `n`th innermost `for`, `while`, or `until` loop.
//! The operand defaults to one. If `n` is greater than the number of
//! enclosing loops, the outermost loop is exited.
//!
//! Only loops in the current function or subshell count; a function called
//! from a loop cannot break the loop.
//!
//! # Errors
//!
//! It is an error to use the built-in outside a loop, or with an operand
//! that is not a positive decimal integer.

use crate::common::syntax::parse_arguments;
use crate::common::{report_failure, syntax_error};
use std::ops::ControlFlow::Break;
use swsh_env::Env;
use swsh_env::builtin::Result;
use swsh_env::semantics::{Divert, ExitStatus, Field};

/// Parses the loop count operand shared by `break` and `continue`.
///
/// On success, returns the number of loops to exit, which is at least one.
pub(crate) fn parse_count(args: Vec<Field>) -> std::result::Result<usize, String> {
    let operands = parse_arguments(&[], args).map_err(|error| error.to_string())?.1;
    match operands.as_slice() {
        [] => Ok(1),
        [operand] => match operand.value.parse() {
            Ok(0) | Err(_) => Err(format!("{}: not a positive integer", operand.value)),
            Ok(count) => Ok(count),
        },
        _ => Err("too many operands".to_string()),
    }
}

/// Common part of `break` and `continue`
///
/// `divert` creates the result from the number of loops to skip after the
/// innermost one.
pub(crate) fn run<F>(env: &mut Env, args: Vec<Field>, divert: F) -> Result
where
    F: FnOnce(usize) -> Divert,
{
    let count = match parse_count(args) {
        Ok(count) => count,
        Err(message) => return syntax_error(env, &message),
    };
    let count = env.stack.loop_count(count);
    if count == 0 {
        return report_failure(env, "not in a loop");
    }
    Result::with_exit_status_and_divert(ExitStatus::SUCCESS, Break(divert(count - 1)))
}

/// Entry point of the break built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    run(env, args, |count| Divert::Break { count })
}
