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

//! Simple command without a command word

use crate::Handle;
use crate::assign::perform_assignments;
use crate::redir::RedirGuard;
use crate::xtrace::{self, XTrace};
use std::ops::ControlFlow::Continue;
use swsh_env::Env;
use swsh_env::semantics::{ExitStatus, Result};
use swsh_env::variable::Scope;
use swsh_syntax::syntax::{Assign, Redir};

/// Executes a simple command that has no command word.
///
/// `exit_status` is that of the last command substitution performed in the
/// expansion of the command words, if any.
pub fn execute(
    env: &mut Env,
    assigns: &[Assign],
    redirs: &[Redir],
    exit_status: Option<ExitStatus>,
) -> Result {
    let mut env = RedirGuard::new(env);
    let redir_exit_status = match env.perform_redirs(redirs) {
        Ok(exit_status) => exit_status,
        Err(error) => return error.handle(&mut env),
    };

    let mut xtrace = XTrace::from_options(&env.options);
    let assign_exit_status =
        match perform_assignments(&mut env, assigns, Scope::Global, false, xtrace.as_mut()) {
            Ok(exit_status) => exit_status,
            Err(error) => return error.handle(&mut env),
        };
    xtrace::print(&mut env, xtrace);

    env.exit_status = assign_exit_status
        .or(redir_exit_status)
        .or(exit_status)
        .unwrap_or_default();
    Continue(())
}

#[cfg(test)]
mod tests {
    use crate::runner::run_source;
    use std::ops::ControlFlow::{Break, Continue};
    use swsh_env::semantics::{Divert, ExitStatus};
    use swsh_env::variable::Scope;
    use swsh_env_test_helper::{assert_stdout, env_with_builtins};

    #[test]
    fn assignments_persist() {
        let (mut env, state) = env_with_builtins();
        run_source(&mut env, b"a=1 b=$a; echo $a$b", 1);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "11\n"));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn exit_status_of_command_substitution() {
        let (mut env, _) = env_with_builtins();
        let result = run_source(&mut env, b"a=$(return -n 3)", 1);
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus(3));

        run_source(&mut env, b"a=1", 1);
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn redirection_creates_file() {
        let (mut env, state) = env_with_builtins();
        run_source(&mut env, b">/created", 1);
        assert_eq!(state.borrow().file_content("/created"), "");
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn read_only_assignment_fails() {
        let (mut env, _) = env_with_builtins();
        env.variables
            .get_or_new("x", Scope::Global)
            .assign("1")
            .unwrap();
        env.variables.get_or_new("x", Scope::Global).make_read_only();
        let result = run_source(&mut env, b"x=2", 1);
        assert_eq!(result, Break(Divert::Interrupt(Some(ExitStatus::FAILURE))));
        assert_eq!(env.variables.value("x", 0).as_deref(), Some("1"));
    }
}
