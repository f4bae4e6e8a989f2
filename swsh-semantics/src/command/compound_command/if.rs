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

//! Execution of the if command

use super::evaluate_condition;
use crate::command::Command;
use std::ops::ControlFlow::Continue;
use swsh_env::Env;
use swsh_env::semantics::{ExitStatus, Result};
use swsh_syntax::syntax::Node;

/// Executes the if command.
///
/// An `elif` clause is an if command nested in `else_part`. If no branch is
/// taken, the exit status is zero.
pub fn execute(env: &mut Env, condition: &Node, body: &Node, else_part: Option<&Node>) -> Result {
    if evaluate_condition(env, condition)? {
        return body.execute(env);
    }
    match else_part {
        Some(else_part) => else_part.execute(env),
        None => {
            env.exit_status = ExitStatus::SUCCESS;
            Continue(())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::runner::run_source;
    use swsh_env::option::{ErrExit, On};
    use swsh_env::semantics::ExitStatus;
    use swsh_env_test_helper::{assert_stdout, env_with_builtins};

    #[test]
    fn true_condition_runs_body() {
        let (mut env, state) = env_with_builtins();
        run_source(&mut env, b"if return -n 0; then echo then; else echo else; fi", 1);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "then\n"));
    }

    #[test]
    fn elif_chain() {
        let (mut env, state) = env_with_builtins();
        let source = b"if return -n 1; then echo 1; elif return -n 0; then echo 2; else echo 3; fi";
        run_source(&mut env, source, 1);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "2\n"));
    }

    #[test]
    fn no_branch_taken_yields_zero() {
        let (mut env, _) = env_with_builtins();
        run_source(&mut env, b"if return -n 3; then echo x; fi", 1);
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn failing_condition_does_not_trigger_errexit() {
        let (mut env, state) = env_with_builtins();
        env.options.set(ErrExit, On);
        run_source(&mut env, b"if return -n 1; then :; fi; echo reached", 1);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "reached\n"));
    }
}
