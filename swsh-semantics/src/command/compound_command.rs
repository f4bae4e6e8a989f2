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

//! Execution of compound commands
//!
//! Redirections of the compound command have already been performed by the
//! caller when [`execute`] is called.

mod case;
mod for_loop;
mod r#if;
mod subshell;
mod while_loop;

use super::Command;
use std::ops::ControlFlow::Continue;
use swsh_env::Env;
use swsh_env::semantics::{ExitStatus, Result};
use swsh_env::stack::Frame;
use swsh_syntax::syntax::{Node, NodeKind};

/// Executes the condition of an if/while/until command.
fn evaluate_condition(env: &mut Env, condition: &Node) -> Result<bool> {
    let mut env = env.push_frame(Frame::Condition);
    condition.execute(&mut env)?;
    Continue(env.exit_status == ExitStatus::SUCCESS)
}

/// Executes the compound command.
pub fn execute(env: &mut Env, node: &Node) -> Result {
    match &node.kind {
        NodeKind::BraceGroup(body) => body.execute(env),
        NodeKind::Subshell(body) => subshell::execute(env, body),
        NodeKind::If {
            condition,
            body,
            else_part,
        } => r#if::execute(env, condition, body, else_part.as_deref()),
        NodeKind::For { name, values, body } => {
            for_loop::execute(env, name, values.as_deref(), body, node.line_no)
        }
        NodeKind::While { condition, body } => while_loop::execute_while(env, condition, body),
        NodeKind::Until { condition, body } => while_loop::execute_until(env, condition, body),
        NodeKind::Case { subject, items } => case::execute(env, subject, items),
        // Other kinds are run by the command module directly.
        _ => Continue(()),
    }
}

#[cfg(test)]
mod tests {
    use crate::runner::run_source;
    use std::ops::ControlFlow::Continue;
    use swsh_env::semantics::ExitStatus;
    use swsh_env_test_helper::{assert_stdout, env_with_builtins};

    #[test]
    fn brace_group_runs_in_current_environment() {
        let (mut env, state) = env_with_builtins();
        let result = run_source(&mut env, b"{ x=1; echo $x; }; echo $x", 1);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "1\n1\n"));
    }

    #[test]
    fn redirection_applies_to_whole_compound_command() {
        let (mut env, state) = env_with_builtins();
        run_source(&mut env, b"{ echo 1; echo 2; } >/out; echo 3", 1);
        assert_eq!(state.borrow().file_content("/out"), "1\n2\n");
        assert_stdout(&state, |stdout| assert_eq!(stdout, "3\n"));
    }

    #[test]
    fn redirection_error_skips_body() {
        let (mut env, state) = env_with_builtins();
        run_source(&mut env, b"{ echo 1; } </no/such/file", 1);
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
        assert_stdout(&state, |stdout| assert_eq!(stdout, ""));
    }
}
