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

//! Implementation of the pipeline semantics

use super::Command;
use crate::subshell::{Child, start_subshell, wait_subshell};
use std::ops::ControlFlow::{Break, Continue};
use std::rc::Rc;
use swsh_env::io::Fd;
use swsh_env::semantics::{Divert, ExitStatus, Result};
use swsh_env::stack::Frame;
use swsh_env::system::Errno;
use swsh_env::{Env, System};
use swsh_syntax::syntax::Node;

/// Executes the pipeline.
///
/// A pipeline of one command runs the command in the current shell
/// environment. A pipeline of more than one command runs every command in
/// a subshell. The standard output of each command is connected to the
/// standard input of the next through a pipe. If the system supports
/// `fork`, the commands run concurrently; otherwise they run one after
/// another, each writing its whole output to the pipe before the next
/// starts.
///
/// The exit status of the pipeline is that of the last command. If the
/// pipeline is `negated`, [`Frame::Condition`] is pushed to the stack while
/// the commands run, and the exit status is inverted: zero becomes one, and
/// non-zero becomes zero. A divert is not inverted.
pub fn execute(env: &mut Env, negated: bool, commands: &[Rc<Node>]) -> Result {
    if !negated {
        return execute_commands(env, commands);
    }

    let mut env = env.push_frame(Frame::Condition);
    execute_commands(&mut env, commands)?;
    env.exit_status = if env.exit_status.is_successful() {
        ExitStatus::FAILURE
    } else {
        ExitStatus::SUCCESS
    };
    Continue(())
}

fn execute_commands(env: &mut Env, commands: &[Rc<Node>]) -> Result {
    match commands {
        [] => {
            env.exit_status = ExitStatus::SUCCESS;
            Continue(())
        }
        [command] => command.execute(env),
        _ => {
            execute_multi_command_pipeline(env, commands)?;
            env.apply_errexit()
        }
    }
}

fn execute_multi_command_pipeline(env: &mut Env, commands: &[Rc<Node>]) -> Result {
    let mut children = Vec::with_capacity(commands.len());
    let mut stdin = None;

    for (index, command) in commands.iter().enumerate() {
        let is_last = index + 1 == commands.len();
        let (next_stdin, stdout) = if is_last {
            (None, None)
        } else {
            match env.system.pipe() {
                Ok((reader, writer)) => (Some(reader), Some(writer)),
                Err(errno) => {
                    close(env, stdin);
                    return abort(env, children, errno, "cannot open a pipe");
                }
            }
        };

        let task = |env: &mut Env| {
            // In a child process, the reading end for the next command is
            // not ours to keep open.
            if env.system.fork_supported() {
                close(env, next_stdin);
            }
            command.execute(env)
        };
        match start_subshell(env, stdin, stdout, task) {
            Ok(child) => children.push(child),
            Err(errno) => {
                close(env, next_stdin);
                return abort(env, children, errno, "cannot start a subshell");
            }
        }
        stdin = next_stdin;
    }

    env.exit_status = wait_all(env, children)?;
    Continue(())
}

fn close(env: &mut Env, fd: Option<Fd>) {
    if let Some(fd) = fd {
        env.system.close(fd).ok();
    }
}

/// Waits for the children and returns the exit status of the last.
fn wait_all(env: &mut Env, children: Vec<Child>) -> Result<ExitStatus> {
    let mut exit_status = ExitStatus::SUCCESS;
    for child in children {
        match wait_subshell(env, child) {
            Ok(status) => exit_status = status,
            Err(errno) => {
                env.print_system_error(errno, "cannot wait for a subshell");
                return Break(Divert::Interrupt(Some(ExitStatus::ERROR)));
            }
        }
    }
    Continue(exit_status)
}

fn abort(env: &mut Env, children: Vec<Child>, errno: Errno, message: &str) -> Result {
    env.print_system_error(errno, message);
    wait_all(env, children)?;
    env.exit_status = ExitStatus::ERROR;
    Break(Divert::Interrupt(Some(ExitStatus::ERROR)))
}

#[cfg(test)]
mod tests {
    use crate::runner::run_source;
    use std::ops::ControlFlow::{Break, Continue};
    use swsh_env::option::{ErrExit, On};
    use swsh_env::semantics::{Divert, ExitStatus};
    use swsh_env_test_helper::{assert_stdout, env_with_builtins};

    #[test]
    fn output_is_piped_to_next_command() {
        let (mut env, state) = env_with_builtins();
        let result = run_source(&mut env, b"echo piped | cat | cat", 1);
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "piped\n"));
    }

    #[test]
    fn exit_status_of_last_command() {
        let (mut env, _) = env_with_builtins();
        run_source(&mut env, b"echo | return -n 5", 1);
        assert_eq!(env.exit_status, ExitStatus(5));
        run_source(&mut env, b"return -n 5 | echo", 1);
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn negation_inverts_exit_status() {
        let (mut env, _) = env_with_builtins();
        run_source(&mut env, b"! return -n 5", 1);
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        run_source(&mut env, b"! echo | cat", 1);
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
    }

    #[test]
    fn commands_run_in_subshells() {
        let (mut env, state) = env_with_builtins();
        run_source(&mut env, b"x=1 | echo; echo ${x-unset}", 1);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "\nunset\n"));
    }

    #[test]
    fn errexit_with_negation() {
        let (mut env, state) = env_with_builtins();
        env.options.set(ErrExit, On);
        let result = run_source(&mut env, b"! echo 1; echo 2; echo | return -n 3; echo 4", 1);
        assert_eq!(result, Break(Divert::Exit(None)));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "1\n2\n"));
    }
}
