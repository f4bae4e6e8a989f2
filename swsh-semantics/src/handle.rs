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

//! Error handlers

use std::ops::ControlFlow::{Break, Continue};
use swsh_env::Env;
use swsh_env::semantics::{Divert, ExitStatus, Result};

/// Error handler
///
/// Most errors in the shell are handled by printing an error message to the
/// standard error and setting a non-zero exit status. This trait provides a
/// standard interface for implementing that behavior.
pub trait Handle {
    /// Handles the error.
    fn handle(&self, env: &mut Env) -> Result;
}

/// Prints an error message and interrupts the current command.
///
/// The exit status is set to [`ExitStatus::FAILURE`], and the result is
/// `Divert::Interrupt(Some(ExitStatus::FAILURE))`, which makes a
/// non-interactive shell exit.
impl Handle for crate::expansion::Error {
    fn handle(&self, env: &mut Env) -> Result {
        env.print_error(&self.to_string());
        env.exit_status = ExitStatus::FAILURE;
        Break(Divert::Interrupt(Some(ExitStatus::FAILURE)))
    }
}

/// Prints an error message and sets the exit status to non-zero.
///
/// An error in the expansion of the operand is handled like any other
/// expansion error. Other errors only set the exit status to
/// [`ExitStatus::FAILURE`]; the caller interrupts the shell if the
/// redirection belongs to a special built-in.
impl Handle for crate::redir::Error {
    fn handle(&self, env: &mut Env) -> Result {
        env.print_error(&self.to_string());
        env.exit_status = ExitStatus::FAILURE;
        match self.cause {
            crate::redir::ErrorCause::Expansion(_) => {
                Break(Divert::Interrupt(Some(ExitStatus::FAILURE)))
            }
            _ => Continue(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::ErrorCause;
    use swsh_env::system::Errno;
    use swsh_env_test_helper::{assert_stderr, virtual_env};

    #[test]
    fn expansion_error_interrupts() {
        let (mut env, state) = virtual_env();
        let error = crate::expansion::Error {
            cause: ErrorCause::Unset("x".to_string()),
            line_no: 3,
        };
        let result = error.handle(&mut env);
        assert_eq!(result, Break(Divert::Interrupt(Some(ExitStatus::FAILURE))));
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
        assert_stderr(&state, |stderr| {
            assert_eq!(stderr, "sh: 3: x: parameter not set\n")
        });
    }

    #[test]
    fn redirection_error_continues() {
        let (mut env, _) = virtual_env();
        let error = crate::redir::Error {
            cause: crate::redir::ErrorCause::TemporaryFile(Errno::EIO),
            line_no: 1,
        };
        assert_eq!(error.handle(&mut env), Continue(()));
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
    }

    #[test]
    fn redirection_expansion_error_interrupts() {
        let (mut env, _) = virtual_env();
        let error = crate::redir::Error {
            cause: crate::redir::ErrorCause::Expansion(ErrorCause::Unset("x".to_string())),
            line_no: 1,
        };
        assert_eq!(
            error.handle(&mut env),
            Break(Divert::Interrupt(Some(ExitStatus::FAILURE)))
        );
    }
}
