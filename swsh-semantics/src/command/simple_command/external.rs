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

//! Simple command that runs an external utility

use super::trace_fields;
use crate::Handle;
use crate::assign::perform_assignments;
use crate::redir::RedirGuard;
use crate::subshell::{Child, wait_subshell};
use crate::xtrace::XTrace;
use std::ffi::CString;
use std::ops::ControlFlow::Continue;
use swsh_env::semantics::{ExitStatus, Field, Result};
use swsh_env::system::Errno;
use swsh_env::variable::{Context, Scope};
use swsh_env::{Env, System};
use swsh_syntax::bytes::to_c_string;
use swsh_syntax::syntax::{Assign, Redir};

/// Runs the external utility at `path`.
///
/// If `path` is `None`, the command was not found and this function only
/// reports the error after performing the redirections and assignments.
pub fn execute(
    env: &mut Env,
    path: Option<CString>,
    assigns: &[Assign],
    fields: Vec<Field>,
    redirs: &[Redir],
) -> Result {
    let mut env = RedirGuard::new(env);
    if let Err(error) = env.perform_redirs(redirs) {
        return error.handle(&mut env);
    }

    let mut xtrace = XTrace::from_options(&env.options);
    let mut env = env.push_context(Context::Volatile);
    if let Err(error) =
        perform_assignments(&mut env, assigns, Scope::Volatile, true, xtrace.as_mut())
    {
        return error.handle(&mut env);
    }
    trace_fields(&mut env, xtrace, &fields);

    let name = &fields[0].value;
    let Some(path) = path else {
        env.print_error(&format!("{name}: command not found"));
        env.exit_status = ExitStatus::NOT_FOUND;
        return Continue(());
    };

    let args = match to_c_strings(&fields) {
        Some(args) => args,
        None => {
            env.print_error(&format!("{name}: argument contains a null byte"));
            env.exit_status = ExitStatus::NOEXEC;
            return Continue(());
        }
    };
    let envs = env.variables.env_c_strings();

    log::debug!(target: "swsh::exec", "running {path:?}");
    let exit_status = env
        .system
        .spawn(&path, &args, &envs)
        .and_then(|pid| wait_subshell(&mut env, Child::Process(pid)));
    env.exit_status = match exit_status {
        Ok(exit_status) => exit_status,
        Err(errno) => {
            env.print_system_error(errno, &format!("cannot execute {name}"));
            match errno {
                Errno::ENOENT | Errno::ENOTDIR => ExitStatus::NOT_FOUND,
                _ => ExitStatus::NOEXEC,
            }
        }
    };
    Continue(())
}

fn to_c_strings(fields: &[Field]) -> Option<Vec<CString>> {
    fields
        .iter()
        .map(|field| to_c_string(&field.value).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::runner::run_source;
    use std::cell::RefCell;
    use std::ffi::CString;
    use std::ops::ControlFlow::Continue;
    use std::rc::Rc;
    use swsh_env::Env;
    use swsh_env::semantics::ExitStatus;
    use swsh_env::system::r#virtual::{INode, SystemState};
    use swsh_env::variable::{Scope, Variable};
    use swsh_env_test_helper::{assert_stderr, virtual_env};

    fn env_with_ls() -> (Env, Rc<RefCell<SystemState>>) {
        let (mut env, state) = virtual_env();
        state
            .borrow_mut()
            .file_system
            .save("/bin/ls", Rc::new(RefCell::new(INode::executable())))
            .unwrap();
        env.variables
            .get_or_new("PATH", Scope::Global)
            .assign("/bin")
            .unwrap();
        (env, state)
    }

    #[test]
    fn utility_is_spawned_with_arguments() {
        let (mut env, state) = env_with_ls();
        env.exit_status = ExitStatus(9);
        let result = run_source(&mut env, b"ls -l 'a b'", 1);
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        let state = state.borrow();
        assert_eq!(state.executions.len(), 1);
        assert_eq!(state.executions[0].path.as_c_str(), c"/bin/ls");
        assert_eq!(
            state.executions[0].args,
            [c"ls".to_owned(), c"-l".to_owned(), c"a b".to_owned()]
        );
    }

    #[test]
    fn arguments_and_environment_keep_non_utf8_bytes() {
        let (mut env, state) = env_with_ls();
        run_source(&mut env, b"x=\xfe\xe3 ls a\xffb \"$x\"", 1);
        let state = state.borrow();
        let execution = &state.executions[0];
        assert_eq!(
            execution.args,
            [c"ls".to_owned(), c"a\xffb".to_owned(), c"\xfe\xe3".to_owned()]
        );
        assert!(execution.envs.contains(&c"x=\xfe\xe3".to_owned()));
    }

    #[test]
    fn assignments_are_exported_to_utility_only() {
        let (mut env, state) = env_with_ls();
        run_source(&mut env, b"x=1 ls", 1);
        assert!(
            state.borrow().executions[0]
                .envs
                .contains(&CString::new("x=1").unwrap())
        );
        assert_eq!(env.variables.get("x"), None);
    }

    #[test]
    fn exported_variables_are_passed() {
        let (mut env, state) = env_with_ls();
        env.variables
            .get_or_new("y", Scope::Global)
            .assign("2")
            .unwrap();
        env.variables.get_or_new("y", Scope::Global).export(true);
        run_source(&mut env, b"ls", 1);
        assert!(
            state.borrow().executions[0]
                .envs
                .contains(&CString::new("y=2").unwrap())
        );
        assert_eq!(
            env.variables.get("y"),
            Some(&Variable::new("2").export())
        );
    }

    #[test]
    fn command_not_found() {
        let (mut env, state) = env_with_ls();
        let result = run_source(&mut env, b"no_such_command", 1);
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::NOT_FOUND);
        assert_stderr(&state, |stderr| {
            assert_eq!(stderr, "sh: no_such_command: command not found\n")
        });
    }

    #[test]
    fn non_executable_file_with_slash() {
        let (mut env, state) = env_with_ls();
        swsh_env_test_helper::stub_file(&state, "/tmp/script", "echo");
        let result = run_source(&mut env, b"/tmp/script", 1);
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::NOEXEC);
        assert_stderr(&state, |stderr| assert!(stderr.starts_with("sh: cannot execute /tmp/script: ")));
    }

    #[test]
    fn missing_file_with_slash() {
        let (mut env, _) = env_with_ls();
        run_source(&mut env, b"/no/such/file", 1);
        assert_eq!(env.exit_status, ExitStatus::NOT_FOUND);
    }
}
