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

//! Read-eval loop

use crate::command::Command;
use crate::trap::run_traps_for_caught_signals;
use std::cell::RefCell;
use std::ops::ControlFlow::{Break, Continue};
use std::rc::Rc;
use swsh_env::Env;
use swsh_env::input::Memory;
use swsh_env::option::NoExec;
use swsh_env::semantics::{Divert, ExitStatus, Result};
use swsh_syntax::parser::lex::Lexer;
use swsh_syntax::parser::{Line, Parser};

/// Read-eval loop
///
/// The loop parses a command line with the [`Lexer`], executes it, runs
/// pending traps, and repeats until the end of input or a divert.
///
/// The environment is shared through a `RefCell` because input functions
/// such as [`Prompter`](swsh_env::input::Prompter) need to access the
/// environment while the lexer reads a line. The loop borrows the
/// environment only while executing a command.
///
/// If the input contains no commands, the exit status is set to zero.
///
/// In an interactive shell, an interrupt or a syntax error only abandons
/// the current line. In a non-interactive shell, a syntax error ends the
/// loop with `Break(Divert::Interrupt(Some(ExitStatus::ERROR)))`.
#[derive(Debug)]
#[must_use = "the loop does nothing unless run"]
pub struct ReadEvalLoop<'a, 'b, 'c> {
    env: &'a RefCell<&'b mut Env>,
    lexer: &'a mut Lexer<'c>,
}

impl<'a, 'b, 'c> ReadEvalLoop<'a, 'b, 'c> {
    pub fn new(env: &'a RefCell<&'b mut Env>, lexer: &'a mut Lexer<'c>) -> Self {
        ReadEvalLoop { env, lexer }
    }

    /// Runs the loop.
    pub fn run(self) -> Result {
        let mut executed = false;

        loop {
            let aliases = Rc::clone(&self.env.borrow().aliases);
            let line = Parser::new(self.lexer, &*aliases).command_line();

            let mut env = self.env.borrow_mut();
            let env = &mut **env;
            match line {
                Ok(Line::EndOfInput) => break,
                Ok(Line::Blank) => (),
                Ok(Line::Command(command)) => {
                    if !env.options.is_on(NoExec) || env.is_interactive() {
                        let result = command.execute(env);
                        executed = true;
                        match result {
                            Continue(()) => (),
                            Break(Divert::Interrupt(exit_status)) if env.is_interactive() => {
                                if let Some(exit_status) = exit_status {
                                    env.exit_status = exit_status;
                                }
                                self.lexer.discard_line();
                            }
                            Break(divert) => return Break(divert),
                        }
                    }
                }
                Err(error) => {
                    env.print_error(&error.to_string());
                    env.exit_status = ExitStatus::ERROR;
                    executed = true;
                    if error.is_io() || !env.is_interactive() {
                        return Break(Divert::Interrupt(Some(ExitStatus::ERROR)));
                    }
                    self.lexer.discard_line();
                }
            }

            run_traps_for_caught_signals(env)?;
        }

        if !executed {
            self.env.borrow_mut().exit_status = ExitStatus::SUCCESS;
        }
        Continue(())
    }
}

/// Parses and runs source code in the environment.
///
/// `line_no` is the line number of the first line of the source. This is
/// the loop used for `eval`, traps and command substitutions.
pub fn run_source(env: &mut Env, source: &[u8], line_no: u64) -> Result {
    let mut lexer = Lexer::with_line_no(Box::new(Memory::new(source)), line_no);
    let env = RefCell::new(env);
    ReadEvalLoop::new(&env, &mut lexer).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use swsh_env::option::{Interactive, On};
    use swsh_syntax::alias::HashEntry;
    use swsh_env_test_helper::{assert_stderr, assert_stdout, env_with_builtins};

    #[test]
    fn exit_status_zero_with_no_commands() {
        let (mut env, _) = env_with_builtins();
        env.exit_status = ExitStatus(5);
        let result = run_source(&mut env, b"\n\n", 1);
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn commands_run_in_order() {
        let (mut env, state) = env_with_builtins();
        let result = run_source(&mut env, b"echo 1; echo 2\necho 3\n", 1);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "1\n2\n3\n"));
    }

    #[test]
    fn exit_status_of_last_command() {
        let (mut env, _) = env_with_builtins();
        let result = run_source(&mut env, b"return -n 7", 1);
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus(7));
    }

    #[test]
    fn divert_ends_loop() {
        let (mut env, state) = env_with_builtins();
        let result = run_source(&mut env, b"echo 1; exit 4; echo 2", 1);
        assert_eq!(result, Break(Divert::Exit(Some(ExitStatus(4)))));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "1\n"));
    }

    #[test]
    fn alias_defined_on_previous_line_is_used() {
        let (mut env, state) = env_with_builtins();
        let mut aliases = (*env.aliases).clone();
        aliases.insert(HashEntry::new("say".to_string(), "echo said".to_string()));
        env.aliases = Rc::new(aliases);
        run_source(&mut env, b"say hi", 1);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "said hi\n"));
    }

    #[test]
    fn syntax_error_in_non_interactive_shell() {
        let (mut env, state) = env_with_builtins();
        let result = run_source(&mut env, b"echo 1\nfi\necho 2\n", 1);
        assert_eq!(result, Break(Divert::Interrupt(Some(ExitStatus::ERROR))));
        assert_eq!(env.exit_status, ExitStatus::ERROR);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "1\n"));
        assert_stderr(&state, |stderr| assert!(stderr.starts_with("sh: 2: "), "{stderr}"));
    }

    #[test]
    fn syntax_error_in_interactive_shell() {
        let (mut env, state) = env_with_builtins();
        env.options.set(Interactive, On);
        let result = run_source(&mut env, b"fi\necho 2\n", 1);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "2\n"));
    }

    #[test]
    fn noexec_skips_commands() {
        let (mut env, state) = env_with_builtins();
        env.options.set(NoExec, On);
        let result = run_source(&mut env, b"echo 1", 1);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, ""));
    }
}
