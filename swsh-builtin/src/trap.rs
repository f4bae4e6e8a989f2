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

//! Trap built-in
//!
//! The **`trap`** built-in sets or prints signal traps.
//!
//! # Synopsis
//!
//! ```sh
//! trap [action condition...]
//! trap condition...
//! ```
//!
//! # Description
//!
//! The action is one of:
//!
//! - `-`: the condition gets the default behavior,
//! - an empty string: the condition is ignored,
//! - any other string: the string is run as commands when the condition is
//!   met.
//!
//! A condition is a signal name with or without the `SIG` prefix, a signal
//! number, or `EXIT` (or `0`) for the exit of the shell. If the first
//! operand is a number, or is the only operand, all operands are taken as
//! conditions to reset to the default.
//!
//! Without operands, the built-in prints the current traps as `trap`
//! commands.
//!
//! # Errors
//!
//! An unknown condition is an error. The other conditions are still
//! processed.
//!
//! # Exit status
//!
//! Zero if successful, one on error, and two on a usage error.

use crate::common::syntax::parse_arguments;
use crate::common::{output, report_failure, syntax_error};
use std::fmt::Write as _;
use std::rc::Rc;
use swsh_env::Env;
use swsh_env::builtin::Result;
use swsh_env::semantics::{ExitStatus, Field};
use swsh_env::trap::{Action, Condition};
use swsh_quote::quoted;

fn print_traps(env: &mut Env) -> Result {
    let mut text = String::new();
    for (condition, state) in env.traps.iter() {
        let command = match &state.action {
            Action::Default => continue,
            Action::Ignore => "",
            Action::Command(command) => &**command,
        };
        let _ = writeln!(text, "trap -- {} {condition}", quoted(command));
    }
    output(env, &text)
}

/// Splits the operands into the action and the conditions.
fn parse_action(mut operands: Vec<Field>) -> (Action, Vec<Field>) {
    let first = &operands[0].value;
    if operands.len() == 1 || first.parse::<u32>().is_ok() {
        return (Action::Default, operands);
    }
    let action = match first.as_str() {
        "-" => Action::Default,
        "" => Action::Ignore,
        command => Action::Command(Rc::from(command)),
    };
    operands.remove(0);
    (action, operands)
}

/// Entry point of the trap built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let operands = match parse_arguments(&[], args) {
        Ok((_, operands)) => operands,
        Err(error) => return syntax_error(env, &error.to_string()),
    };
    if operands.is_empty() {
        return print_traps(env);
    }

    let (action, conditions) = parse_action(operands);
    let override_ignore = env.is_interactive();
    let mut result = Result::new(ExitStatus::SUCCESS);
    for field in conditions {
        let condition = match field.value.parse::<Condition>() {
            Ok(condition) => condition,
            Err(error) => {
                result = report_failure(env, &error.to_string());
                continue;
            }
        };
        log::debug!(target: "swsh::trap", "setting trap for {condition}: {action:?}");
        let set = env
            .traps
            .set_action(&mut env.system, condition, action.clone(), override_ignore);
        if let Err(error) = set {
            result = report_failure(env, &format!("{condition}: {error}"));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::env_with_all_builtins;
    use swsh_env::trap::Signal;
    use swsh_env_test_helper::{assert_stderr, assert_stdout};

    #[test]
    fn setting_command_trap() {
        let (mut env, _) = env_with_all_builtins();
        let result = main(&mut env, Field::dummies(["echo bye", "EXIT", "INT"]));
        assert_eq!(result, Result::default());
        assert_eq!(env.traps.get_action(Condition::Exit), Action::Command("echo bye".into()));
        assert_eq!(
            env.traps.get_action(Condition::Signal(Signal::SIGINT)),
            Action::Command("echo bye".into())
        );
    }

    #[test]
    fn ignoring_and_resetting() {
        let (mut env, _) = env_with_all_builtins();
        main(&mut env, Field::dummies(["", "TERM"]));
        let term = Condition::Signal(Signal::SIGTERM);
        assert_eq!(env.traps.get_action(term), Action::Ignore);
        main(&mut env, Field::dummies(["-", "SIGTERM"]));
        assert_eq!(env.traps.get_action(term), Action::Default);
    }

    #[test]
    fn numeric_first_operand_resets_all() {
        let (mut env, _) = env_with_all_builtins();
        main(&mut env, Field::dummies(["echo", "0", "2"]));
        main(&mut env, Field::dummies(["0", "2"]));
        assert_eq!(env.traps.get_action(Condition::Exit), Action::Default);
        assert_eq!(env.traps.get_action(Condition::Signal(Signal::SIGINT)), Action::Default);
    }

    #[test]
    fn unknown_condition() {
        let (mut env, state) = env_with_all_builtins();
        let result = main(&mut env, Field::dummies(["echo", "NOSUCH", "QUIT"]));
        assert_eq!(result.exit_status(), ExitStatus::FAILURE);
        assert_eq!(
            env.traps.get_action(Condition::Signal(Signal::SIGQUIT)),
            Action::Command("echo".into())
        );
        assert_stderr(&state, |stderr| assert!(stderr.contains("NOSUCH: no such signal")));
    }

    #[test]
    fn printing_traps() {
        let (mut env, state) = env_with_all_builtins();
        main(&mut env, Field::dummies(["echo 'hi'", "EXIT"]));
        main(&mut env, Field::dummies(["", "INT"]));
        main(&mut env, vec![]);
        assert_stdout(&state, |stdout| {
            assert_eq!(stdout, "trap -- 'echo '\"'\"'hi'\"'\"'' EXIT\ntrap -- '' INT\n")
        });
    }
}
