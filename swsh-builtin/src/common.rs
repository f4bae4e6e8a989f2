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

//! Common items for implementing built-ins
//!
//! Error messages printed by built-ins take the form `sh: name: message`,
//! where `name` is the built-in taken from [`Stack::current_builtin`]. An
//! error in a special built-in interrupts the shell; see
//! [`divert_on_error`].

use std::ops::ControlFlow::{Break, Continue};
use swsh_env::Env;
use swsh_env::builtin::Result;
use swsh_env::io::Fd;
use swsh_env::semantics::{Divert, ExitStatus};
#[cfg(doc)]
use swsh_env::stack::Stack;
use swsh_syntax::bytes::encode;

pub mod syntax;

/// Returns the divert value for an error in the current built-in.
///
/// The result is `Break(Divert::Interrupt(None))` if the current built-in
/// is special and `Continue(())` otherwise.
#[must_use]
pub fn divert_on_error(env: &Env) -> swsh_env::semantics::Result {
    match env.stack.current_builtin() {
        Some((_, true)) => Break(Divert::Interrupt(None)),
        _ => Continue(()),
    }
}

/// Prints an error message prefixed with the built-in name.
pub fn print_message(env: &mut Env, message: &str) {
    let message = match env.stack.current_builtin() {
        Some((name, _)) => format!("{name}: {message}"),
        None => message.to_owned(),
    };
    env.print_error(&message);
}

/// Reports an error with the given exit status.
pub fn report(env: &mut Env, message: &str, exit_status: ExitStatus) -> Result {
    print_message(env, message);
    Result::with_exit_status_and_divert(exit_status, divert_on_error(env))
}

/// Reports a runtime failure with exit status 1.
pub fn report_failure(env: &mut Env, message: &str) -> Result {
    report(env, message, ExitStatus::FAILURE)
}

/// Reports a usage error with exit status 2.
pub fn syntax_error(env: &mut Env, message: &str) -> Result {
    report(env, message, ExitStatus::ERROR)
}

/// Prints the text to the standard output.
///
/// Returns the exit status of the built-in: zero on success, or one after
/// printing an error message if the output fails.
pub fn output(env: &mut Env, text: &str) -> Result {
    match env.system.write_all(Fd::STDOUT, &encode(text)) {
        Ok(_) => Result::new(ExitStatus::SUCCESS),
        Err(errno) => {
            let message = format!("cannot print to the standard output: {}", errno.desc());
            report_failure(env, &message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swsh_env::stack::Frame;
    use swsh_env_test_helper::{assert_stderr, assert_stdout, virtual_env};

    #[test]
    fn error_in_special_builtin_interrupts() {
        let (mut env, state) = virtual_env();
        let mut env = env.push_frame(Frame::Builtin {
            name: "set".to_string(),
            is_special: true,
        });
        let result = syntax_error(&mut env, "bad option");
        assert_eq!(result.exit_status(), ExitStatus::ERROR);
        assert_eq!(result.divert(), Break(Divert::Interrupt(None)));
        assert_stderr(&state, |stderr| assert_eq!(stderr, "sh: set: bad option\n"));
    }

    #[test]
    fn error_in_regular_builtin_continues() {
        let (mut env, _) = virtual_env();
        let mut env = env.push_frame(Frame::Builtin {
            name: "alias".to_string(),
            is_special: false,
        });
        let result = report_failure(&mut env, "x: no such alias");
        assert_eq!(result, Result::new(ExitStatus::FAILURE));
    }

    #[test]
    fn output_writes_to_stdout() {
        let (mut env, state) = virtual_env();
        let result = output(&mut env, "text\n");
        assert_eq!(result, Result::new(ExitStatus::SUCCESS));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "text\n"));
    }
}
