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

//! Starting subshells
//!
//! A subshell runs in a child process if the system supports `fork`.
//! Otherwise, it runs to completion in the current process on a clone of
//! the environment. Changes the subshell makes to variables, functions,
//! options and traps are discarded with the clone, but changes to the
//! system, such as files written, are shared.

use crate::trap::run_exit_trap;
use std::ops::ControlFlow::Break;
use swsh_env::io::{Fd, MIN_INTERNAL_FD};
use swsh_env::option::{Interactive, Off};
use swsh_env::semantics::{ExitStatus, Result, exit_status_of};
use swsh_env::stack::Frame;
use swsh_env::system::{Errno, ForkResult, Pid, SignalHandling};
use swsh_env::trap::{Signal, SignalSystem};
use swsh_env::{Env, System};

/// Subshell that has been started
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Child {
    /// Subshell running in a child process
    Process(Pid),
    /// Subshell that has already finished in the current process
    Done(ExitStatus),
}

/// Signal system that leaves signal dispositions intact
///
/// An in-process subshell shares the dispositions with its parent, so
/// resetting traps for the subshell must not touch the system.
struct KeepDispositions;

impl SignalSystem for KeepDispositions {
    fn set_signal_handling(
        &mut self,
        _signal: Signal,
        handling: SignalHandling,
    ) -> std::result::Result<SignalHandling, Errno> {
        Ok(handling)
    }
}

/// Updates the exit status with the one carried by the divert, if any.
pub fn apply_result(env: &mut Env, result: Result) {
    if let Break(divert) = result {
        if let Some(exit_status) = divert.exit_status() {
            env.exit_status = exit_status;
        }
    }
}

/// Runs the task as a subshell in the given environment.
fn run_task<F>(env: &mut Env, task: F)
where
    F: FnOnce(&mut Env) -> Result,
{
    let mut env = env.push_frame(Frame::Subshell);
    let env = &mut *env;
    env.options.set(Interactive, Off);
    let result = task(env);
    apply_result(env, result);
    run_exit_trap(env);
}

/// Restores file descriptors saved by [`start_subshell`].
fn restore_fds(env: &mut Env, saved: Vec<(Fd, Option<Fd>)>) {
    for (target, save) in saved.into_iter().rev() {
        match save {
            Some(save) => {
                env.system.dup2(save, target).ok();
                env.system.close(save).ok();
            }
            None => {
                env.system.close(target).ok();
            }
        }
    }
}

/// Starts a subshell that runs the task.
///
/// If `stdin` or `stdout` is given, the file descriptor becomes the standard
/// input or output of the subshell, respectively. The given descriptors are
/// closed in the parent shell.
///
/// The returned [`Child`] should be passed to [`wait_subshell`] to obtain
/// the exit status of the subshell.
pub fn start_subshell<F>(
    env: &mut Env,
    stdin: Option<Fd>,
    stdout: Option<Fd>,
    task: F,
) -> std::result::Result<Child, Errno>
where
    F: FnOnce(&mut Env) -> Result,
{
    if env.system.fork_supported() {
        return match env.system.fork() {
            Ok(ForkResult::Parent { child }) => {
                for fd in stdin.into_iter().chain(stdout) {
                    env.system.close(fd).ok();
                }
                log::debug!(target: "swsh::exec", "started subshell {child}");
                Ok(Child::Process(child))
            }
            Ok(ForkResult::Child) => {
                for (fd, target) in [(stdin, Fd::STDIN), (stdout, Fd::STDOUT)] {
                    if let Some(fd) = fd {
                        if fd != target {
                            env.system.dup2(fd, target).ok();
                            env.system.close(fd).ok();
                        }
                    }
                }
                env.traps.enter_subshell(&mut env.system);
                run_task(env, task);
                std::process::exit(env.exit_status.0)
            }
            Err(errno) => {
                for fd in stdin.into_iter().chain(stdout) {
                    env.system.close(fd).ok();
                }
                Err(errno)
            }
        };
    }

    let mut saved = Vec::new();
    for (fd, target) in [(stdin, Fd::STDIN), (stdout, Fd::STDOUT)] {
        let Some(fd) = fd else { continue };
        let save = match env.system.dup(target, MIN_INTERNAL_FD, true) {
            Ok(save) => Some(save),
            Err(Errno::EBADF) => None,
            Err(errno) => {
                env.system.close(fd).ok();
                restore_fds(env, saved);
                return Err(errno);
            }
        };
        let result = env.system.dup2(fd, target);
        env.system.close(fd).ok();
        saved.push((target, save));
        if let Err(errno) = result {
            restore_fds(env, saved);
            return Err(errno);
        }
    }

    log::debug!(target: "swsh::exec", "running subshell in process");
    let mut subshell_env = env.clone();
    subshell_env.traps.enter_subshell(&mut KeepDispositions);
    run_task(&mut subshell_env, task);
    let exit_status = subshell_env.exit_status;
    drop(subshell_env);

    restore_fds(env, saved);
    Ok(Child::Done(exit_status))
}

/// Waits for the subshell to finish and returns its exit status.
pub fn wait_subshell(env: &mut Env, child: Child) -> std::result::Result<ExitStatus, Errno> {
    match child {
        Child::Done(exit_status) => Ok(exit_status),
        Child::Process(pid) => loop {
            let status = env.system.wait(pid)?;
            if let Some(exit_status) = exit_status_of(status) {
                log::debug!(target: "swsh::exec", "subshell {pid} exited with {exit_status}");
                return Ok(exit_status);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ops::ControlFlow::Continue;
    use swsh_env::option::On;
    use swsh_env::semantics::Divert;
    use swsh_env::variable::Scope;
    use swsh_env_test_helper::{assert_stdout, virtual_env};

    #[test]
    fn in_process_subshell_returns_exit_status() {
        let (mut env, _) = virtual_env();
        let child = start_subshell(&mut env, None, None, |env| {
            env.exit_status = ExitStatus(3);
            Continue(())
        })
        .unwrap();
        assert_eq!(child, Child::Done(ExitStatus(3)));
        assert_eq!(wait_subshell(&mut env, child), Ok(ExitStatus(3)));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn divert_sets_exit_status() {
        let (mut env, _) = virtual_env();
        let child = start_subshell(&mut env, None, None, |_| {
            Break(Divert::Exit(Some(ExitStatus(7))))
        })
        .unwrap();
        assert_eq!(child, Child::Done(ExitStatus(7)));
    }

    #[test]
    fn changes_in_subshell_are_discarded() {
        let (mut env, _) = virtual_env();
        env.options.set(Interactive, On);
        start_subshell(&mut env, None, None, |env| {
            assert_eq!(env.stack[..], [Frame::Subshell]);
            assert!(!env.is_interactive());
            env.variables
                .get_or_new("x", Scope::Global)
                .assign("1")
                .unwrap();
            Continue(())
        })
        .unwrap();
        assert_eq!(env.variables.get("x"), None);
        assert!(env.is_interactive());
        assert_eq!(env.stack[..], []);
    }

    #[test]
    fn standard_output_is_redirected() {
        let (mut env, state) = virtual_env();
        let (reader, writer) = env.system.pipe().unwrap();
        start_subshell(&mut env, None, Some(writer), |env| {
            env.system.write_all(Fd::STDOUT, b"piped").unwrap();
            Continue(())
        })
        .unwrap();
        assert_eq!(env.system.read_all(reader).unwrap(), b"piped");

        env.system.write_all(Fd::STDOUT, b"direct").unwrap();
        assert_stdout(&state, |stdout| assert_eq!(stdout, "direct"));
    }
}
