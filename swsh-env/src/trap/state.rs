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

//! Items that manage the state of a single trap condition.

use super::SignalSystem;
use super::cond::Condition;
#[cfg(doc)]
use super::TrapSet;
use crate::system::SignalHandling;
use nix::errno::Errno;
use nix::sys::signal::Signal;
use std::rc::Rc;
use thiserror::Error;

/// Action performed when a [`Condition`] is met
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Action {
    /// Performs the default action.
    ///
    /// For signal conditions, the behavior depends on the signal delivered.
    /// For other conditions, this is equivalent to `Ignore`.
    #[default]
    Default,

    /// Pretends as if the condition was not met.
    Ignore,

    /// Executes a command string.
    Command(Rc<str>),
}

impl From<&Action> for SignalHandling {
    fn from(trap: &Action) -> Self {
        match trap {
            Action::Default => SignalHandling::Default,
            Action::Ignore => SignalHandling::Ignore,
            Action::Command(_) => SignalHandling::Catch,
        }
    }
}

/// Error that may happen in [`TrapSet::set_action`].
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum SetActionError {
    /// Attempt to set a trap that has been ignored since the shell startup.
    #[error("the signal has been ignored since startup")]
    InitiallyIgnored,
    /// Attempt to set a trap for the `SIGKILL` signal.
    #[error("cannot set a trap for SIGKILL")]
    SIGKILL,
    /// Attempt to set a trap for the `SIGSTOP` signal.
    #[error("cannot set a trap for SIGSTOP")]
    SIGSTOP,
    /// Error from the underlying system interface.
    #[error(transparent)]
    SystemError(#[from] Errno),
}

/// State of the trap action for a condition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrapState {
    /// Action taken when the condition is met.
    pub action: Action,
    /// True iff a signal specified by the condition has been caught and the
    /// action command has not yet executed.
    pub pending: bool,
}

/// User-visible trap setting.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Setting {
    /// The user has not yet set a trap, and the signal disposition the shell
    /// has inherited is `SIG_DFL`.
    InitiallyDefaulted,
    /// The user has not yet set a trap, and the signal disposition the shell
    /// has inherited is `SIG_IGN`.
    ///
    /// A non-interactive shell does not allow changing the action for such a
    /// signal.
    InitiallyIgnored,
    /// User-defined trap.
    UserSpecified(TrapState),
}

impl Setting {
    /// Returns the user-defined trap, if any.
    #[must_use]
    pub fn as_trap(&self) -> Option<&TrapState> {
        if let Setting::UserSpecified(trap) = self {
            Some(trap)
        } else {
            None
        }
    }

    /// Creates the setting from the disposition the shell inherited.
    #[must_use]
    pub fn from_initial_handling(handling: SignalHandling) -> Self {
        match handling {
            SignalHandling::Default | SignalHandling::Catch => Self::InitiallyDefaulted,
            SignalHandling::Ignore => Self::InitiallyIgnored,
        }
    }
}

impl From<&Setting> for SignalHandling {
    fn from(state: &Setting) -> Self {
        match state {
            Setting::InitiallyDefaulted => SignalHandling::Default,
            Setting::InitiallyIgnored => SignalHandling::Ignore,
            Setting::UserSpecified(trap) => (&trap.action).into(),
        }
    }
}

/// Whole configuration and state for a trap condition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GrandState {
    /// Setting that is effective in the current environment.
    pub current_setting: Setting,

    /// Whether the internal handler has been installed in the current
    /// environment.
    ///
    /// An internal handler catches the signal regardless of the user
    /// setting.
    pub internal_handler_enabled: bool,

    /// Whether the signal has been caught while only the internal handler
    /// was interested in it.
    pub internal_pending: bool,
}

impl GrandState {
    /// Creates a new state from the initial signal disposition.
    #[must_use]
    pub fn new(initial_handling: SignalHandling) -> Self {
        GrandState {
            current_setting: Setting::from_initial_handling(initial_handling),
            internal_handler_enabled: false,
            internal_pending: false,
        }
    }

    /// Computes the signal handling that should be installed.
    #[must_use]
    pub fn handling(&self) -> SignalHandling {
        if self.internal_handler_enabled {
            SignalHandling::Catch
        } else {
            (&self.current_setting).into()
        }
    }

    /// Updates the signal handling of the system to match this state.
    pub fn install<S: SignalSystem + ?Sized>(
        &self,
        system: &mut S,
        condition: Condition,
    ) -> Result<(), Errno> {
        match condition {
            Condition::Signal(signal) => system
                .set_signal_handling(signal, self.handling())
                .map(drop),
            Condition::Exit => Ok(()),
        }
    }

    /// Tests whether the action may be changed.
    pub fn check_settable(
        &self,
        condition: Condition,
        override_ignore: bool,
    ) -> Result<(), SetActionError> {
        match condition {
            Condition::Signal(Signal::SIGKILL) => return Err(SetActionError::SIGKILL),
            Condition::Signal(Signal::SIGSTOP) => return Err(SetActionError::SIGSTOP),
            _ => (),
        }
        if !override_ignore && self.current_setting == Setting::InitiallyIgnored {
            return Err(SetActionError::InitiallyIgnored);
        }
        Ok(())
    }
}
