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

//! Shell startup
//!
//! The [`args`] module parses the command line into a [`Run`], which
//! [`configure_environment`] applies to the environment. The [`input`]
//! module then prepares the lexer that feeds the main read-eval loop.

use self::args::{Run, Source};
use swsh_builtin::BUILTINS;
use swsh_env::Env;
use swsh_env::io::Fd;
use swsh_env::option::{Interactive, On, Stdin};
use swsh_env::system::System;

pub mod args;
pub mod input;

/// Tests whether the shell should be implicitly interactive.
///
/// As per POSIX, "if there are no operands and the shell's standard input and
/// standard error are attached to a terminal, the shell is considered to be
/// interactive." This function implements this rule.
pub fn auto_interactive<S: System + ?Sized>(system: &S, run: &Run) -> bool {
    if run.source != Source::Stdin {
        return false;
    }
    if run.options.iter().any(|&(o, _)| o == Interactive) {
        return false;
    }
    if !run.positional_params.is_empty() {
        return false;
    }
    system.isatty(Fd::STDIN) && system.isatty(Fd::STDERR)
}

/// Configures the environment according to the command line.
///
/// This function applies the shell options, sets `$0` and the positional
/// parameters, installs the built-ins, and initializes the default
/// variables. Variables imported from the process environment should be
/// added before calling this function so that they are not overwritten.
///
/// Returns the source of the commands to run.
pub fn configure_environment(env: &mut Env, run: Run) -> Source {
    let is_interactive = auto_interactive(&env.system, &run);
    for &(option, state) in &run.options {
        env.options.set(option, state);
    }
    if is_interactive {
        env.options.set(Interactive, On);
    }
    if run.source == Source::Stdin {
        env.options.set(Stdin, On);
    }

    env.arg0 = run.arg0;
    *env.variables.positional_params_mut() = run.positional_params;
    env.builtins.extend(BUILTINS.iter().copied());
    env.init_variables();

    if env.is_interactive() {
        _ = env.traps.enable_sigint_handler(&mut env.system);
    }
    log::debug!(target: "swsh::exec", "options: -{}", env.options.to_short_string());

    run.source
}

#[cfg(test)]
mod tests {
    use super::*;
    use swsh_env::option::{ErrExit, Off};
    use swsh_env::variable::IFS;
    use swsh_env_test_helper::virtual_env;

    #[test]
    fn script_file_is_not_interactive() {
        let (env, _) = virtual_env();
        let run = Run {
            source: Source::File {
                path: "foo".to_string(),
            },
            ..Run::default()
        };
        assert!(!auto_interactive(&env.system, &run));
    }

    #[test]
    fn virtual_stdin_is_not_terminal() {
        let (env, _) = virtual_env();
        assert!(!auto_interactive(&env.system, &Run::default()));
    }

    #[test]
    fn terminal_makes_shell_interactive() {
        let (env, state) = virtual_env();
        state.borrow_mut().terminals.extend([Fd::STDIN, Fd::STDERR]);
        assert!(auto_interactive(&env.system, &Run::default()));

        let run = Run {
            positional_params: vec!["x".to_string()],
            ..Run::default()
        };
        assert!(!auto_interactive(&env.system, &run));
    }

    #[test]
    fn environment_is_configured() {
        let (mut env, _) = virtual_env();
        let run = Run {
            source: Source::String("echo".to_string()),
            options: vec![(ErrExit, On)],
            arg0: "name".to_string(),
            positional_params: vec!["a".to_string(), "b".to_string()],
        };
        let source = configure_environment(&mut env, run);
        assert_eq!(source, Source::String("echo".to_string()));
        assert_eq!(env.options.get(ErrExit), On);
        assert_eq!(env.options.get(Stdin), Off);
        assert_eq!(env.arg0, "name");
        assert_eq!(env.variables.positional_params(), ["a", "b"]);
        assert!(env.builtins.contains_key("set"));
        assert!(env.variables.get(IFS).is_some());
    }

    #[test]
    fn stdin_option_is_set_when_reading_stdin() {
        let (mut env, _) = virtual_env();
        configure_environment(&mut env, Run::default());
        assert_eq!(env.options.get(Stdin), On);
        assert_eq!(env.options.get(Interactive), Off);
    }
}
