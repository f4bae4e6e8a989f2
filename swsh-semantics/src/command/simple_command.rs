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

//! Implementation of the simple command semantics
//!
//! # Outline
//!
//! The execution starts with the [expansion](crate::expansion) of the
//! command words. Next, the [command search](crate::command_search) finds
//! the target named by the first field. The target type defines how the
//! target is executed. After the execution, the `errexit` option is applied.
//!
//! # Target types
//!
//! ## Absent target
//!
//! If the expansion yields no fields, redirections are performed and undone,
//! and assignments are performed in the current environment. The exit status
//! is that of the last command substitution, or zero if there was none.
//!
//! ## Built-in
//!
//! Redirections are performed first. For a special built-in, assignments
//! persist after the built-in returns. For a regular built-in, assignments
//! are made in a volatile context that is discarded afterward. The built-in
//! receives the fields except the first as arguments.
//!
//! ## Function
//!
//! Redirections and assignments are performed in the same way as a regular
//! built-in. Then a new variable context is pushed with the remaining fields
//! as positional parameters, and the function body is executed. A
//! `Divert::Return` is consumed here.
//!
//! ## External utility
//!
//! Redirections are performed, and assignments are made in a volatile
//! context and exported. The utility is spawned in a child process with the
//! exported variables as its environment, and the shell waits for it.
//!
//! If the command search finds nothing, the same is done but an error is
//! printed instead of spawning, and the exit status is 127.
//!
//! # Errors
//!
//! An expansion error or an assignment to a read-only variable interrupts
//! the command with exit status 1. A redirection error makes the exit status
//! 1; it interrupts the shell only for a special built-in.

mod absent;
mod builtin;
mod external;
mod function;

use crate::Handle;
use crate::command_search::{Target, search};
use crate::expansion::expand_words;
use crate::xtrace::XTrace;
use swsh_env::Env;
use swsh_env::semantics::{Field, Result};
use swsh_syntax::syntax::{Assign, Redir, Word};

/// Executes the simple command.
pub fn execute(env: &mut Env, assigns: &[Assign], words: &[Word], redirs: &[Redir]) -> Result {
    let (fields, exit_status) = match expand_words(env, words) {
        Ok(result) => result,
        Err(error) => return error.handle(env),
    };

    if let Some(name) = fields.first() {
        match search(env, &name.value) {
            Some(Target::Builtin(builtin)) => builtin::execute(env, builtin, assigns, fields, redirs),
            Some(Target::Function(function)) => {
                function::execute(env, function, assigns, fields, redirs)
            }
            Some(Target::External { path }) => {
                external::execute(env, Some(path), assigns, fields, redirs)
            }
            None => external::execute(env, None, assigns, fields, redirs),
        }?;
    } else {
        absent::execute(env, assigns, redirs, exit_status)?;
    }

    env.apply_errexit()
}

/// Adds the command words to the trace and prints it.
fn trace_fields(env: &mut Env, xtrace: Option<XTrace>, fields: &[Field]) {
    if let Some(mut xtrace) = xtrace {
        for field in fields {
            xtrace.push_word(&field.value);
        }
        xtrace.print(env);
    }
}

#[cfg(test)]
mod tests {
    use crate::runner::run_source;
    use std::ops::ControlFlow::{Break, Continue};
    use swsh_env::option::{ErrExit, On, XTrace};
    use swsh_env::semantics::{Divert, ExitStatus};
    use swsh_env::variable::{PS4, Scope};
    use swsh_env_test_helper::{assert_stderr, assert_stdout, env_with_builtins};

    #[test]
    fn expansion_error_interrupts() {
        let (mut env, state) = env_with_builtins();
        let result = run_source(&mut env, b"echo ${x?oops}; echo not reached", 1);
        assert_eq!(result, Break(Divert::Interrupt(Some(ExitStatus::FAILURE))));
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
        assert_stdout(&state, |stdout| assert_eq!(stdout, ""));
        assert_stderr(&state, |stderr| assert_eq!(stderr, "sh: 1: x: oops\n"));
    }

    #[test]
    fn errexit_after_failure() {
        let (mut env, state) = env_with_builtins();
        env.options.set(ErrExit, On);
        let result = run_source(&mut env, b"echo 1; return -n 2; echo 3", 1);
        assert_eq!(result, Break(Divert::Exit(None)));
        assert_eq!(env.exit_status, ExitStatus(2));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "1\n"));
    }

    #[test]
    fn xtrace_prints_expanded_command() {
        let (mut env, state) = env_with_builtins();
        env.variables
            .get_or_new(PS4, Scope::Global)
            .assign("+ ")
            .unwrap();
        env.options.set(XTrace, On);
        let result = run_source(&mut env, b"v='a b'; echo $v 'c d'", 1);
        assert_eq!(result, Continue(()));
        assert_stderr(&state, |stderr| {
            assert_eq!(stderr, "+ v='a b'\n+ echo a b 'c d'\n")
        });
    }
}
