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

//! Execution of the while and until loops

use super::evaluate_condition;
use crate::command::Command;
use std::ops::ControlFlow::{Break, Continue};
use swsh_env::Env;
use swsh_env::semantics::{Divert, ExitStatus, Result};
use swsh_env::stack::Frame;
use swsh_syntax::syntax::Node;

/// Execution context for loops
struct Loop<'a> {
    env: &'a mut Env,
    condition: &'a Node,
    expected_condition: bool,
    body: &'a Node,
    exit_status: ExitStatus,
}

impl Loop<'_> {
    fn iterate(&mut self) -> Result {
        while evaluate_condition(self.env, self.condition)? == self.expected_condition {
            self.body.execute(self.env)?;
            self.exit_status = self.env.exit_status;
        }
        Continue(())
    }

    fn execute(&mut self) -> Result {
        loop {
            match self.iterate() {
                Break(Divert::Break { count: 0 }) => {
                    self.exit_status = self.env.exit_status;
                    return Continue(());
                }
                Break(Divert::Break { count }) => return Break(Divert::Break { count: count - 1 }),
                Break(Divert::Continue { count: 0 }) => continue,
                Break(Divert::Continue { count }) => {
                    return Break(Divert::Continue { count: count - 1 });
                }
                other => return other,
            }
        }
    }
}

fn execute_common(env: &mut Env, condition: &Node, expected_condition: bool, body: &Node) -> Result {
    let env = &mut env.push_frame(Frame::Loop);
    let mut l = Loop {
        env,
        condition,
        expected_condition,
        body,
        exit_status: ExitStatus::default(),
    };
    l.execute()?;
    env.exit_status = l.exit_status;
    Continue(())
}

/// Executes the while loop.
pub fn execute_while(env: &mut Env, condition: &Node, body: &Node) -> Result {
    execute_common(env, condition, true, body)
}

/// Executes the until loop.
pub fn execute_until(env: &mut Env, condition: &Node, body: &Node) -> Result {
    execute_common(env, condition, false, body)
}

#[cfg(test)]
mod tests {
    use crate::runner::run_source;
    use std::ops::ControlFlow::{Break, Continue};
    use swsh_env::semantics::{Divert, ExitStatus};
    use swsh_env_test_helper::{assert_stdout, env_with_builtins};

    #[test]
    fn zero_round_while_loop() {
        let (mut env, state) = env_with_builtins();
        env.exit_status = ExitStatus(15);
        let result = run_source(&mut env, b"while echo $?; return -n 1; do echo unreached; done", 1);
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "15\n"));
    }

    #[test]
    fn while_loop_counts_down() {
        let (mut env, state) = env_with_builtins();
        let source = b"i=3\nwhile return -n $((i == 0)); do echo $i; i=$((i - 1)); done";
        run_source(&mut env, source, 1);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "3\n2\n1\n"));
    }

    #[test]
    fn until_loop_ends_on_success() {
        let (mut env, state) = env_with_builtins();
        let source = b"i=0\nuntil return -n $((i < 2)); do echo $i; i=$((i + 1)); done";
        run_source(&mut env, source, 1);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "0\n1\n"));
    }

    #[test]
    fn break_leaves_loop_with_status_of_break() {
        let (mut env, state) = env_with_builtins();
        let source = b"while return -n 0; do echo 1; break; echo 2; done; echo $?";
        let result = run_source(&mut env, source, 1);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "1\n0\n"));
    }

    #[test]
    fn nested_break_and_continue() {
        let (mut env, state) = env_with_builtins();
        let source = b"i=0\nuntil return -n $((i < 2)); do i=$((i + 1)); \
            until return -n 1; do echo $i; continue 2; done; done";
        let result = run_source(&mut env, source, 1);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "1\n2\n"));
    }

    #[test]
    fn return_passes_through_loop() {
        let (mut env, _) = env_with_builtins();
        let result = run_source(&mut env, b"until return -n 0; do :; done; while return 4; do :; done", 1);
        assert_eq!(result, Break(Divert::Return(Some(ExitStatus(4)))));
    }
}
