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

//! Signal and other event handling settings.
//!
//! The trap is a mechanism of the shell that allows you to configure event
//! handlers for specific situations. A [`TrapSet`] is a mapping from
//! [`Condition`]s to [`Action`]s. When the mapping is modified, it updates the
//! corresponding signal disposition in the underlying system through a
//! [`SignalSystem`] implementor.
//!
//! Signals are not handled as soon as they are caught. The signal handler of
//! the system only raises a flag; the shell later calls
//! [`catch_signal`](TrapSet::catch_signal) for each flagged signal to mark
//! the trap pending, and runs pending traps between commands.

mod cond;
mod state;

pub use self::cond::{Condition, ParseConditionError, Signal};
pub use self::state::{Action, GrandState, SetActionError, Setting, TrapState};
use crate::system::SignalHandling;
use nix::errno::Errno;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::rc::Rc;

/// System interface for signal handling configuration
pub trait SignalSystem {
    /// Sets how a signal is handled.
    ///
    /// Returns the previous handling.
    fn set_signal_handling(
        &mut self,
        signal: Signal,
        handling: SignalHandling,
    ) -> Result<SignalHandling, Errno>;
}

/// Collection of event handling settings.
#[derive(Clone, Debug, Default)]
pub struct TrapSet {
    traps: BTreeMap<Condition, GrandState>,
}

/// Creates the state for a condition seen for the first time.
///
/// For a signal, the initial disposition is found out by temporarily ignoring
/// the signal. The caller must install the final handling afterwards.
fn new_state<S: SignalSystem + ?Sized>(
    system: &mut S,
    condition: Condition,
) -> Result<GrandState, Errno> {
    let initial = match condition {
        Condition::Exit => SignalHandling::Default,
        Condition::Signal(signal) => system.set_signal_handling(signal, SignalHandling::Ignore)?,
    };
    Ok(GrandState::new(initial))
}

impl TrapSet {
    /// Returns the current user-specified trap for the condition.
    ///
    /// Returns `None` if the user has not set a trap for the condition.
    #[must_use]
    pub fn get_state(&self, condition: Condition) -> Option<&TrapState> {
        self.traps.get(&condition)?.current_setting.as_trap()
    }

    /// Returns the current action for the condition.
    #[must_use]
    pub fn get_action(&self, condition: Condition) -> Action {
        self.get_state(condition)
            .map(|trap| trap.action.clone())
            .unwrap_or_default()
    }

    /// Sets a trap action for a condition.
    ///
    /// If the condition is a signal, this function installs a signal handler
    /// to the specified underlying system.
    ///
    /// If `override_ignore` is `false`, you cannot set a trap for a signal
    /// that has been ignored since the shell startup. An interactive shell
    /// should set `override_ignore` to `true` to bypass this restriction.
    ///
    /// You can never set a trap for `SIGKILL` or `SIGSTOP`.
    pub fn set_action<S: SignalSystem + ?Sized>(
        &mut self,
        system: &mut S,
        condition: Condition,
        action: Action,
        override_ignore: bool,
    ) -> Result<(), SetActionError> {
        let state = match self.traps.entry(condition) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                if let Condition::Signal(Signal::SIGKILL) = condition {
                    return Err(SetActionError::SIGKILL);
                }
                if let Condition::Signal(Signal::SIGSTOP) = condition {
                    return Err(SetActionError::SIGSTOP);
                }
                let state = new_state(system, condition)?;
                entry.insert(state)
            }
        };

        let result = state.check_settable(condition, override_ignore);
        if result.is_ok() {
            state.current_setting = Setting::UserSpecified(TrapState {
                action,
                pending: false,
            });
        }
        state.install(system, condition)?;
        result
    }

    /// Returns an iterator over the user-specified traps.
    ///
    /// The items are ordered by condition: `EXIT` first, then signals in
    /// ascending order of their numbers.
    pub fn iter(&self) -> impl Iterator<Item = (Condition, &TrapState)> {
        self.traps
            .iter()
            .filter_map(|(&cond, state)| Some((cond, state.current_setting.as_trap()?)))
    }

    /// Marks the signal as caught.
    ///
    /// If a command trap is set for the signal, the trap becomes pending. If
    /// the shell handles the signal internally, the internal flag is raised.
    /// Otherwise, this function does nothing.
    pub fn catch_signal(&mut self, signal: Signal) {
        let Some(state) = self.traps.get_mut(&Condition::Signal(signal)) else {
            return;
        };
        match &mut state.current_setting {
            Setting::UserSpecified(trap) if matches!(trap.action, Action::Command(_)) => {
                log::debug!(target: "swsh::trap", "signal {signal} caught");
                trap.pending = true;
            }
            _ if state.internal_handler_enabled => {
                log::debug!(target: "swsh::trap", "signal {signal} caught internally");
                state.internal_pending = true;
            }
            _ => (),
        }
    }

    /// Returns a signal that has been caught and clears its pending flag.
    ///
    /// Signals are examined in ascending order of their numbers. The
    /// returned state is the trap that should be run for the signal.
    pub fn take_caught_signal(&mut self) -> Option<(Signal, &TrapState)> {
        for (cond, state) in &mut self.traps {
            let Condition::Signal(signal) = *cond else {
                continue;
            };
            if let Setting::UserSpecified(trap) = &mut state.current_setting {
                if trap.pending {
                    trap.pending = false;
                    return Some((signal, &*trap));
                }
            }
        }
        None
    }

    /// Tests and clears the internal pending flag of the signal.
    pub fn take_internal_signal(&mut self, signal: Signal) -> bool {
        self.traps
            .get_mut(&Condition::Signal(signal))
            .is_some_and(|state| std::mem::take(&mut state.internal_pending))
    }

    /// Removes the `EXIT` trap and returns its command.
    ///
    /// The shell calls this function when it is about to exit, so the trap
    /// runs at most once.
    pub fn take_exit_command(&mut self) -> Option<Rc<str>> {
        let state = self.traps.get_mut(&Condition::Exit)?;
        let setting = std::mem::replace(&mut state.current_setting, Setting::InitiallyDefaulted);
        match setting {
            Setting::UserSpecified(TrapState {
                action: Action::Command(command),
                ..
            }) => Some(command),
            _ => None,
        }
    }

    /// Installs the internal handler for `SIGINT`.
    ///
    /// An interactive shell catches `SIGINT` to abort the current command
    /// line even if the user has not set a trap for it.
    pub fn enable_sigint_handler<S: SignalSystem + ?Sized>(
        &mut self,
        system: &mut S,
    ) -> Result<(), Errno> {
        let condition = Condition::Signal(Signal::SIGINT);
        let state = match self.traps.entry(condition) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(new_state(system, condition)?),
        };
        state.internal_handler_enabled = true;
        state.install(system, condition)
    }

    /// Resets traps for a subshell.
    ///
    /// Command traps are reset to the default action because the subshell
    /// does not inherit them. Ignored traps remain ignored. Internal
    /// handlers are disabled, and pending flags are cleared.
    pub fn enter_subshell<S: SignalSystem + ?Sized>(&mut self, system: &mut S) {
        for (&cond, state) in &mut self.traps {
            let mut changed = std::mem::take(&mut state.internal_handler_enabled);
            state.internal_pending = false;
            if let Setting::UserSpecified(trap) = &mut state.current_setting {
                trap.pending = false;
                if let Action::Command(_) = trap.action {
                    trap.action = Action::Default;
                    changed = true;
                }
            }
            if changed {
                if let Err(errno) = state.install(system, cond) {
                    log::warn!(target: "swsh::trap", "cannot reset {cond}: {errno}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct DummySystem(HashMap<Signal, SignalHandling>);

    impl SignalSystem for DummySystem {
        fn set_signal_handling(
            &mut self,
            signal: Signal,
            handling: SignalHandling,
        ) -> Result<SignalHandling, Errno> {
            Ok(self.0.insert(signal, handling).unwrap_or_default())
        }
    }

    fn command(s: &str) -> Action {
        Action::Command(s.into())
    }

    #[test]
    fn default_trap() {
        let trap_set = TrapSet::default();
        assert_eq!(trap_set.get_state(Signal::SIGCHLD.into()), None);
        assert_eq!(trap_set.get_action(Signal::SIGCHLD.into()), Action::Default);
    }

    #[test]
    fn setting_trap_to_ignore() {
        let mut system = DummySystem::default();
        let mut trap_set = TrapSet::default();
        let cond = Signal::SIGCHLD.into();
        let result = trap_set.set_action(&mut system, cond, Action::Ignore, false);
        assert_eq!(result, Ok(()));
        assert_eq!(trap_set.get_action(cond), Action::Ignore);
        assert_eq!(system.0[&Signal::SIGCHLD], SignalHandling::Ignore);
    }

    #[test]
    fn setting_trap_to_command() {
        let mut system = DummySystem::default();
        let mut trap_set = TrapSet::default();
        let cond = Signal::SIGINT.into();
        trap_set
            .set_action(&mut system, cond, command("echo"), false)
            .unwrap();
        assert_eq!(trap_set.get_action(cond), command("echo"));
        assert_eq!(system.0[&Signal::SIGINT], SignalHandling::Catch);
    }

    #[test]
    fn resetting_trap_to_default() {
        let mut system = DummySystem::default();
        let mut trap_set = TrapSet::default();
        let cond = Signal::SIGTERM.into();
        trap_set
            .set_action(&mut system, cond, command("echo"), false)
            .unwrap();
        trap_set
            .set_action(&mut system, cond, Action::Default, false)
            .unwrap();
        assert_eq!(system.0[&Signal::SIGTERM], SignalHandling::Default);
    }

    #[test]
    fn uncatchable_signals() {
        let mut system = DummySystem::default();
        let mut trap_set = TrapSet::default();
        let result = trap_set.set_action(&mut system, Signal::SIGKILL.into(), command(""), false);
        assert_eq!(result, Err(SetActionError::SIGKILL));
        let result = trap_set.set_action(&mut system, Signal::SIGSTOP.into(), command(""), false);
        assert_eq!(result, Err(SetActionError::SIGSTOP));
        assert!(system.0.is_empty());
    }

    #[test]
    fn initially_ignored_signal_is_kept_ignored() {
        let mut system = DummySystem::default();
        system.0.insert(Signal::SIGQUIT, SignalHandling::Ignore);
        let mut trap_set = TrapSet::default();
        let cond = Signal::SIGQUIT.into();
        let result = trap_set.set_action(&mut system, cond, command("echo"), false);
        assert_eq!(result, Err(SetActionError::InitiallyIgnored));
        assert_eq!(trap_set.get_state(cond), None);
        assert_eq!(system.0[&Signal::SIGQUIT], SignalHandling::Ignore);

        let result = trap_set.set_action(&mut system, cond, command("echo"), true);
        assert_eq!(result, Ok(()));
        assert_eq!(system.0[&Signal::SIGQUIT], SignalHandling::Catch);
    }

    #[test]
    fn exit_trap_does_not_touch_system() {
        let mut system = DummySystem::default();
        let mut trap_set = TrapSet::default();
        trap_set
            .set_action(&mut system, Condition::Exit, command("echo bye"), false)
            .unwrap();
        assert!(system.0.is_empty());
        assert_eq!(trap_set.take_exit_command().as_deref(), Some("echo bye"));
        assert_eq!(trap_set.take_exit_command(), None);
    }

    #[test]
    fn iteration_in_condition_order() {
        let mut system = DummySystem::default();
        let mut trap_set = TrapSet::default();
        trap_set
            .set_action(&mut system, Signal::SIGUSR1.into(), Action::Ignore, false)
            .unwrap();
        trap_set
            .set_action(&mut system, Signal::SIGINT.into(), command("a"), false)
            .unwrap();
        trap_set
            .set_action(&mut system, Condition::Exit, command("b"), false)
            .unwrap();
        trap_set.enable_sigint_handler(&mut system).unwrap();
        let conditions: Vec<_> = trap_set.iter().map(|(cond, _)| cond).collect();
        assert_eq!(
            conditions,
            [
                Condition::Exit,
                Signal::SIGINT.into(),
                Signal::SIGUSR1.into()
            ]
        );
    }

    #[test]
    fn caught_signals_become_pending_once() {
        let mut system = DummySystem::default();
        let mut trap_set = TrapSet::default();
        trap_set
            .set_action(&mut system, Signal::SIGUSR2.into(), command("b"), false)
            .unwrap();
        trap_set
            .set_action(&mut system, Signal::SIGUSR1.into(), command("a"), false)
            .unwrap();
        trap_set.catch_signal(Signal::SIGUSR2);
        trap_set.catch_signal(Signal::SIGUSR1);
        trap_set.catch_signal(Signal::SIGUSR1);

        let (signal, state) = trap_set.take_caught_signal().unwrap();
        assert_eq!(signal, Signal::SIGUSR1);
        assert_eq!(state.action, command("a"));
        let (signal, _) = trap_set.take_caught_signal().unwrap();
        assert_eq!(signal, Signal::SIGUSR2);
        assert_eq!(trap_set.take_caught_signal(), None);
    }

    #[test]
    fn ignored_signal_is_not_pending() {
        let mut system = DummySystem::default();
        let mut trap_set = TrapSet::default();
        trap_set
            .set_action(&mut system, Signal::SIGUSR1.into(), Action::Ignore, false)
            .unwrap();
        trap_set.catch_signal(Signal::SIGUSR1);
        assert_eq!(trap_set.take_caught_signal(), None);
    }

    #[test]
    fn internal_sigint_handler() {
        let mut system = DummySystem::default();
        let mut trap_set = TrapSet::default();
        trap_set.enable_sigint_handler(&mut system).unwrap();
        assert_eq!(system.0[&Signal::SIGINT], SignalHandling::Catch);
        assert_eq!(trap_set.get_state(Signal::SIGINT.into()), None);

        trap_set.catch_signal(Signal::SIGINT);
        assert_eq!(trap_set.take_caught_signal(), None);
        assert!(trap_set.take_internal_signal(Signal::SIGINT));
        assert!(!trap_set.take_internal_signal(Signal::SIGINT));

        // A user trap takes precedence over the internal handler.
        trap_set
            .set_action(&mut system, Signal::SIGINT.into(), command("x"), true)
            .unwrap();
        trap_set.catch_signal(Signal::SIGINT);
        assert!(!trap_set.take_internal_signal(Signal::SIGINT));
        assert!(trap_set.take_caught_signal().is_some());

        // Ignoring the signal by trap leaves the internal handler installed.
        trap_set
            .set_action(&mut system, Signal::SIGINT.into(), Action::Ignore, true)
            .unwrap();
        assert_eq!(system.0[&Signal::SIGINT], SignalHandling::Catch);
    }

    #[test]
    fn entering_subshell_resets_command_traps() {
        let mut system = DummySystem::default();
        let mut trap_set = TrapSet::default();
        trap_set
            .set_action(&mut system, Signal::SIGUSR1.into(), command("a"), false)
            .unwrap();
        trap_set
            .set_action(&mut system, Signal::SIGUSR2.into(), Action::Ignore, false)
            .unwrap();
        trap_set.enable_sigint_handler(&mut system).unwrap();
        trap_set.catch_signal(Signal::SIGUSR1);

        trap_set.enter_subshell(&mut system);
        assert_eq!(trap_set.get_action(Signal::SIGUSR1.into()), Action::Default);
        assert_eq!(trap_set.get_action(Signal::SIGUSR2.into()), Action::Ignore);
        assert_eq!(system.0[&Signal::SIGUSR1], SignalHandling::Default);
        assert_eq!(system.0[&Signal::SIGUSR2], SignalHandling::Ignore);
        assert_eq!(system.0[&Signal::SIGINT], SignalHandling::Default);
        assert_eq!(trap_set.take_caught_signal(), None);
    }
}
