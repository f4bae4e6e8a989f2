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

//! Execution of the for loop

use crate::Handle;
use crate::command::Command;
use crate::expansion::{Error, ErrorCause, expand_words};
use std::ops::ControlFlow::{Break, Continue};
use swsh_env::Env;
use swsh_env::semantics::{Divert, ExitStatus, Field, Result};
use swsh_env::stack::Frame;
use swsh_env::variable::Scope;
use swsh_syntax::syntax::{Node, Word};

/// Executes the for loop.
///
/// If `values` is `None`, the loop iterates over the positional parameters.
pub fn execute(
    env: &mut Env,
    name: &str,
    values: Option<&[Word]>,
    body: &Node,
    line_no: u64,
) -> Result {
    let values = match values {
        Some(words) => match expand_words(env, words) {
            Ok((fields, _)) => fields,
            Err(error) => return error.handle(env),
        },
        None => env
            .variables
            .positional_params()
            .iter()
            .map(|value| Field {
                value: value.clone(),
                line_no,
            })
            .collect(),
    };

    let env = &mut env.push_frame(Frame::Loop);
    let mut exit_status = ExitStatus::SUCCESS;
    for Field { value, line_no } in values {
        let result = env.get_or_create_variable(name, Scope::Global).assign(value);
        if result.is_err() {
            let error = Error {
                cause: ErrorCause::ReadOnly(name.to_string()),
                line_no,
            };
            return error.handle(env);
        }

        match body.execute(env) {
            Continue(()) | Break(Divert::Continue { count: 0 }) => (),
            Break(Divert::Break { count: 0 }) => {
                exit_status = env.exit_status;
                break;
            }
            Break(Divert::Break { count }) => return Break(Divert::Break { count: count - 1 }),
            Break(Divert::Continue { count }) => {
                return Break(Divert::Continue { count: count - 1 });
            }
            other => return other,
        }
        exit_status = env.exit_status;
    }
    env.exit_status = exit_status;
    Continue(())
}

#[cfg(test)]
mod tests {
    use crate::runner::run_source;
    use std::ops::ControlFlow::{Break, Continue};
    use swsh_env::semantics::{Divert, ExitStatus};
    use swsh_env::variable::Scope;
    use swsh_env_test_helper::{assert_stderr, assert_stdout, env_with_builtins};

    #[test]
    fn loop_over_expanded_words() {
        let (mut env, state) = env_with_builtins();
        let result = run_source(&mut env, b"v='b c'\nfor x in a $v; do echo $x; done; echo $x", 1);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "a\nb\nc\nc\n"));
    }

    #[test]
    fn loop_over_positional_parameters() {
        let (mut env, state) = env_with_builtins();
        *env.variables.positional_params_mut() = vec!["1".to_string(), "2".to_string()];
        run_source(&mut env, b"for x do echo $x; done", 1);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "1\n2\n"));
    }

    #[test]
    fn empty_loop_yields_zero() {
        let (mut env, _) = env_with_builtins();
        env.exit_status = ExitStatus(5);
        run_source(&mut env, b"for x in; do echo $x; done", 1);
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn exit_status_of_last_iteration() {
        let (mut env, _) = env_with_builtins();
        run_source(&mut env, b"for x in 1 2 3; do return -n $x; done", 1);
        assert_eq!(env.exit_status, ExitStatus(3));
    }

    #[test]
    fn break_and_continue() {
        let (mut env, state) = env_with_builtins();
        let source = b"for i in 1 2 3; do for j in a b; do \
            if return -n $((i != 2)); then continue 2; fi; echo $i$j; break; done; done";
        let result = run_source(&mut env, source, 1);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "1a\n3a\n"));
    }

    #[test]
    fn read_only_loop_variable() {
        let (mut env, state) = env_with_builtins();
        env.variables
            .get_or_new("x", Scope::Global)
            .make_read_only();
        let result = run_source(&mut env, b"for x in 1; do echo $x; done", 1);
        assert_eq!(result, Break(Divert::Interrupt(Some(ExitStatus::FAILURE))));
        assert_stdout(&state, |stdout| assert_eq!(stdout, ""));
        assert_stderr(&state, |stderr| assert!(stderr.contains("x: cannot assign")));
    }
}
