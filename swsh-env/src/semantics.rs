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

//! Type definitions for command execution.

use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
use std::ops::ControlFlow;
use std::os::raw::c_int;

/// Resultant string of word expansion.
///
/// A field is a string accompanied with the line number of the word it
/// resulted from.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Field {
    /// String value of the field.
    pub value: String,
    /// Line number of the word this field resulted from.
    pub line_no: u64,
}

impl Field {
    /// Creates a new field with line number zero.
    #[inline]
    pub fn dummy<S: Into<String>>(value: S) -> Field {
        Field {
            value: value.into(),
            line_no: 0,
        }
    }

    /// Creates an array of fields with line number zero.
    pub fn dummies<I, S>(values: I) -> Vec<Field>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values.into_iter().map(Self::dummy).collect()
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.fmt(f)
    }
}

/// Number that summarizes the result of command execution.
///
/// In the shell language, the special parameter `$?` expands to the exit status
/// of the last executed command. Exit statuses also affect the behavior of some
/// compound commands.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ExitStatus(pub c_int);

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<c_int> for ExitStatus {
    fn from(value: c_int) -> ExitStatus {
        ExitStatus(value)
    }
}

impl From<ExitStatus> for c_int {
    fn from(exit_status: ExitStatus) -> c_int {
        exit_status.0
    }
}

/// Converts a signal to the exit status of a process killed by the signal.
///
/// The result is the signal number plus 128.
impl From<Signal> for ExitStatus {
    fn from(signal: Signal) -> Self {
        Self::from(signal as c_int + 0x80)
    }
}

/// Converts a `WaitStatus` to an `ExitStatus` if the process has terminated.
///
/// Returns `None` for a process that is still alive.
#[must_use]
pub fn exit_status_of(status: WaitStatus) -> Option<ExitStatus> {
    match status {
        WaitStatus::Exited(_, exit_status) => Some(ExitStatus(exit_status)),
        WaitStatus::Signaled(_, signal, _) => Some(ExitStatus::from(signal)),
        _ => None,
    }
}

impl ExitStatus {
    /// Exit status of 0: success.
    pub const SUCCESS: ExitStatus = ExitStatus(0);

    /// Exit status of 1: failure.
    pub const FAILURE: ExitStatus = ExitStatus(1);

    /// Exit status of 2: error severer than failure.
    pub const ERROR: ExitStatus = ExitStatus(2);

    /// Exit Status of 126: command not executable.
    pub const NOEXEC: ExitStatus = ExitStatus(126);

    /// Exit status of 127: command not found.
    pub const NOT_FOUND: ExitStatus = ExitStatus(127);

    /// Returns true if and only if `self` is zero.
    pub const fn is_successful(&self) -> bool {
        self.0 == 0
    }
}

/// Result of interrupted command execution.
///
/// `Divert` implements `Ord`. Values are ordered by severity.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Divert {
    /// Continue the current loop.
    Continue {
        /// Number of loops to break before continuing.
        ///
        /// `0` for continuing the innermost loop, `1` for one-level outer, and so on.
        count: usize,
    },

    /// Break the current loop.
    Break {
        /// Number of loops to break.
        ///
        /// `0` for breaking the innermost loop, `1` for one-level outer, and so on.
        count: usize,
    },

    /// Return from the current function or script.
    Return(Option<ExitStatus>),

    /// Interrupt the current shell execution environment.
    ///
    /// This is the same as `Exit` in a non-interactive shell. In an interactive
    /// shell, this will abort the currently executed command and resume
    /// prompting for a next command line.
    Interrupt(Option<ExitStatus>),

    /// Exit from the current shell execution environment.
    Exit(Option<ExitStatus>),
}

impl Divert {
    /// Returns the exit status associated with the `Divert`.
    ///
    /// Returns the variant's value if `self` is `Return`, `Exit` or
    /// `Interrupt`; otherwise, `None`.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        use Divert::*;
        match self {
            Continue { .. } | Break { .. } => None,
            Return(exit_status) | Interrupt(exit_status) | Exit(exit_status) => *exit_status,
        }
    }
}

/// Result of command execution.
///
/// If the command was interrupted in the middle of execution, the result value
/// will be a `Break` having a [`Divert`] value which specifies what to execute
/// next.
pub type Result<T = ()> = ControlFlow<Divert, T>;

#[cfg(test)]
mod tests {
    use super::*;
    use nix::unistd::Pid;

    #[test]
    fn exit_status_from_signal() {
        assert_eq!(ExitStatus::from(Signal::SIGINT), ExitStatus(130));
        assert_eq!(ExitStatus::from(Signal::SIGKILL), ExitStatus(137));
    }

    #[test]
    fn exit_status_from_wait_status() {
        let pid = Pid::from_raw(10);
        assert_eq!(
            exit_status_of(WaitStatus::Exited(pid, 3)),
            Some(ExitStatus(3))
        );
        assert_eq!(
            exit_status_of(WaitStatus::Signaled(pid, Signal::SIGTERM, false)),
            Some(ExitStatus(143))
        );
        assert_eq!(exit_status_of(WaitStatus::StillAlive), None);
    }

    #[test]
    fn divert_ordering_and_status() {
        assert!(Divert::Break { count: 0 } > Divert::Continue { count: 5 });
        assert!(Divert::Exit(None) > Divert::Return(None));
        assert_eq!(
            Divert::Return(Some(ExitStatus(4))).exit_status(),
            Some(ExitStatus(4))
        );
        assert_eq!(Divert::Break { count: 1 }.exit_status(), None);
    }
}
