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

//! Running traps

use crate::runner::run_source;
use std::ops::ControlFlow::{Break, Continue};
use std::rc::Rc;
use swsh_env::Env;
use swsh_env::semantics::Result;
use swsh_env::stack::Frame;
use swsh_env::trap::{Action, Condition};
use swsh_syntax::bytes::encode;

/// Runs trap commands for signals that have been caught.
///
/// Signals caught by the system are first moved to the trap set. Then the
/// command of each pending trap is run in ascending order of signal numbers.
/// The exit status is restored after each trap unless the trap diverts.
pub fn run_traps_for_caught_signals(env: &mut Env) -> Result {
    env.catch_signals();

    while let Some((signal, state)) = env.traps.take_caught_signal() {
        let Action::Command(command) = &state.action else {
            continue;
        };
        let command = Rc::clone(command);
        log::debug!(target: "swsh::trap", "running trap for {signal}: {command}");

        let previous_exit_status = env.exit_status;
        let line_no = env.stack.line_no;
        let frame = Frame::Trap {
            condition: Condition::Signal(signal),
            previous_exit_status,
        };
        run_source(&mut env.push_frame(frame), &encode(&command), line_no)?;
        env.exit_status = previous_exit_status;
    }

    Continue(())
}

/// Runs the `EXIT` trap, if any.
///
/// The trap is removed before it runs, so it runs at most once. The exit
/// status is preserved unless the trap command exits with a specific status.
pub fn run_exit_trap(env: &mut Env) {
    let Some(command) = env.traps.take_exit_command() else {
        return;
    };
    log::debug!(target: "swsh::trap", "running EXIT trap: {command}");

    let previous_exit_status = env.exit_status;
    let line_no = env.stack.line_no;
    let frame = Frame::Trap {
        condition: Condition::Exit,
        previous_exit_status,
    };
    let result = run_source(&mut env.push_frame(frame), &encode(&command), line_no);
    env.exit_status = match result {
        Break(divert) => divert.exit_status().unwrap_or(previous_exit_status),
        Continue(()) => previous_exit_status,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use swsh_env::builtin::{self, Builtin, Type};
    use swsh_env::semantics::{Divert, ExitStatus, Field};
    use swsh_env::system::r#virtual::SystemState;
    use swsh_env::trap::Signal;
    use swsh_env_test_helper::{assert_stdout, env_with_builtins};

    fn signal_env() -> (Env, Rc<RefCell<SystemState>>) {
        let (mut env, state) = env_with_builtins();
        env.traps
            .set_action(
                &mut env.system,
                Condition::Signal(Signal::SIGINT),
                Action::Command("echo trapped".into()),
                false,
            )
            .unwrap();
        env.traps
            .set_action(
                &mut env.system,
                Condition::Signal(Signal::SIGUSR1),
                Action::Command("exit 56".into()),
                false,
            )
            .unwrap();
        (env, state)
    }

    #[test]
    fn nothing_to_do_without_signals_caught() {
        let (mut env, state) = signal_env();
        assert_eq!(run_traps_for_caught_signals(&mut env), Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, ""));
    }

    #[test]
    fn running_trap_once() {
        let (mut env, state) = signal_env();
        state.borrow_mut().raise_signal(Signal::SIGINT);
        assert_eq!(run_traps_for_caught_signals(&mut env), Continue(()));
        assert_eq!(run_traps_for_caught_signals(&mut env), Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "trapped\n"));
    }

    #[test]
    fn exit_status_is_restored_after_trap() {
        let (mut env, state) = signal_env();
        env.exit_status = ExitStatus(42);
        state.borrow_mut().raise_signal(Signal::SIGINT);
        let _ = run_traps_for_caught_signals(&mut env);
        assert_eq!(env.exit_status, ExitStatus(42));
    }

    #[test]
    fn exit_from_trap() {
        let (mut env, state) = signal_env();
        state.borrow_mut().raise_signal(Signal::SIGUSR1);
        let result = run_traps_for_caught_signals(&mut env);
        assert_eq!(result, Break(Divert::Exit(Some(ExitStatus(56)))));
        assert_eq!(env.stack[..], []);
    }

    #[test]
    fn exit_trap_runs_once_and_keeps_status() {
        let (mut env, state) = env_with_builtins();
        env.traps
            .set_action(
                &mut env.system,
                Condition::Exit,
                Action::Command("echo bye; return -n 9".into()),
                false,
            )
            .unwrap();
        env.exit_status = ExitStatus(4);
        run_exit_trap(&mut env);
        run_exit_trap(&mut env);
        assert_eq!(env.exit_status, ExitStatus(4));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "bye\n"));
    }

    #[test]
    fn exit_trap_with_exit_status() {
        let (mut env, _) = env_with_builtins();
        env.traps
            .set_action(
                &mut env.system,
                Condition::Exit,
                Action::Command("exit 3".into()),
                false,
            )
            .unwrap();
        run_exit_trap(&mut env);
        assert_eq!(env.exit_status, ExitStatus(3));
    }

    thread_local! {
        static RAISING_STATE: RefCell<Option<Rc<RefCell<SystemState>>>> =
            const { RefCell::new(None) };
    }

    /// Built-in that delivers SIGINT to the shell while it runs.
    fn raise_builtin(_env: &mut Env, _args: Vec<Field>) -> builtin::Result {
        RAISING_STATE.with_borrow(|state| {
            if let Some(state) = state {
                state.borrow_mut().raise_signal(Signal::SIGINT);
            }
        });
        ExitStatus::SUCCESS.into()
    }

    #[test]
    fn signal_caught_during_command_is_handled_before_next_command() {
        let (mut env, state) = signal_env();
        RAISING_STATE.set(Some(Rc::clone(&state)));
        env.builtins.insert(
            "raise",
            Builtin {
                r#type: Type::Regular,
                execute: raise_builtin,
            },
        );
        let result = run_source(&mut env, b"echo 1; raise; echo 2\necho 3\n", 1);
        RAISING_STATE.set(None);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "1\ntrapped\n2\n3\n"));
    }

    #[test]
    fn signal_caught_during_function_is_handled_inside_function() {
        let (mut env, state) = signal_env();
        RAISING_STATE.set(Some(Rc::clone(&state)));
        env.builtins.insert(
            "raise",
            Builtin {
                r#type: Type::Regular,
                execute: raise_builtin,
            },
        );
        let source = b"f() { raise; echo in; }\nf; echo out\n";
        let result = run_source(&mut env, source, 1);
        RAISING_STATE.set(None);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "trapped\nin\nout\n"));
    }
}
