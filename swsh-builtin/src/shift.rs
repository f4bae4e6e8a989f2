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

//! Shift built-in
//!
//! The **`shift`** built-in removes some positional parameters.
//!
//! # Synopsis
//!
//! ```sh
//! shift [n]
//! ```
//!
//! # Description
//!
//! The built-in removes the first `n` positional parameters. The remaining
//! parameters are renumbered starting from `$1`. The operand defaults to
//! one and may be zero.
//!
//! # Errors
//!
//! It is an error if `n` is greater than the number of positional
//! parameters, in which case no parameters are removed.

use crate::common::syntax::parse_arguments;
use crate::common::{report_failure, syntax_error};
use swsh_env::Env;
use swsh_env::builtin::Result;
use swsh_env::semantics::{ExitStatus, Field};

/// Entry point of the shift built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let operands = match parse_arguments(&[], args) {
        Ok((_, operands)) => operands,
        Err(error) => return syntax_error(env, &error.to_string()),
    };
    let count = match operands.as_slice() {
        [] => 1,
        [operand] => match operand.value.parse::<usize>() {
            Ok(count) => count,
            Err(_) => {
                let message = format!("{}: not a valid number", operand.value);
                return syntax_error(env, &message);
            }
        },
        _ => return syntax_error(env, "too many operands"),
    };

    let params = env.variables.positional_params_mut();
    if count > params.len() {
        let message = format!(
            "cannot shift {count} positional parameters (there are only {})",
            params.len()
        );
        return report_failure(env, &message);
    }
    params.drain(..count);
    ExitStatus::SUCCESS.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::env_with_all_builtins;
    use std::ops::ControlFlow::{Break, Continue};
    use swsh_env::semantics::Divert;
    use swsh_env_test_helper::{assert_stderr, assert_stdout};
    use swsh_semantics::run_source;

    #[test]
    fn shifting_one() {
        let (mut env, state) = env_with_all_builtins();
        let result = run_source(&mut env, b"set a b c; shift; echo $# $@", 1);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "2 b c\n"));
    }

    #[test]
    fn shifting_many() {
        let (mut env, _) = env_with_all_builtins();
        *env.variables.positional_params_mut() = vec!["1".into(), "2".into(), "3".into()];
        let result = main(&mut env, Field::dummies(["3"]));
        assert_eq!(result, Result::new(ExitStatus::SUCCESS));
        assert!(env.variables.positional_params().is_empty());
    }

    #[test]
    fn shifting_zero() {
        let (mut env, _) = env_with_all_builtins();
        *env.variables.positional_params_mut() = vec!["x".into()];
        let result = main(&mut env, Field::dummies(["0"]));
        assert_eq!(result, Result::new(ExitStatus::SUCCESS));
        assert_eq!(env.variables.positional_params(), ["x"]);
    }

    #[test]
    fn shifting_too_many() {
        let (mut env, state) = env_with_all_builtins();
        let result = run_source(&mut env, b"set a; shift 2", 1);
        assert_eq!(result, Break(Divert::Interrupt(None)));
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
        assert_eq!(env.variables.positional_params(), ["a"]);
        assert_stderr(&state, |stderr| {
            assert_eq!(
                stderr,
                "sh: shift: cannot shift 2 positional parameters (there are only 1)\n"
            )
        });
    }

    #[test]
    fn shifting_in_function() {
        let (mut env, state) = env_with_all_builtins();
        let result = run_source(&mut env, b"f() { shift; echo $1; }; set x y; f a b; echo $1", 1);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "b\nx\n"));
    }
}
