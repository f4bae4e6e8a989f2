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

//! Set built-in
//!
//! The **`set`** built-in changes shell options and positional parameters.
//! It also prints variables and options.
//!
//! # Synopsis
//!
//! ```sh
//! set [-abCdefhmnuvx] [+abCdefhmnuvx] [-o option] [+o option]... [--] [operand...]
//! set -o
//! set +o
//! set
//! ```
//!
//! # Description
//!
//! Without arguments, the built-in prints all variables in the form
//! `name=value`, sorted by name, with values quoted so that the output can
//! be read back by the shell.
//!
//! An option letter after `-` enables the option and one after `+` disables
//! it. `-o name` and `+o name` do the same with the long name, which may be
//! abbreviated to an unambiguous prefix. `-o` without a name prints every
//! option with its state; `+o` without a name prints the options as `set`
//! commands that restore the current state.
//!
//! Operands replace the positional parameters. `--` or `-` ends the options
//! so that operands starting with `-` or `+` can be given. `set --` with no
//! operands clears the positional parameters.
//!
//! # Exit status
//!
//! Zero unless an unknown or unchangeable option is given, which is an error
//! with exit status two.

use crate::common::{output, syntax_error};
use itertools::Itertools as _;
use std::fmt::Write as _;
use swsh_env::Env;
use swsh_env::builtin::Result;
use swsh_env::option::{Off, On, Option as ShellOption, State, parse_short};
use swsh_env::semantics::Field;
use swsh_env::variable::Scope;
use swsh_quote::quoted;

/// What to print after changing options
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Listing {
    /// Options and their states (`set -o`)
    Human,
    /// Commands that restore the options (`set +o`)
    Commands,
}

fn print_variables(env: &mut Env) -> Result {
    let line_no = env.stack.line_no;
    let text = env
        .variables
        .iter(Scope::Global)
        .filter_map(|(name, variable)| Some((name, variable.expand(line_no)?)))
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .fold(String::new(), |mut text, (name, value)| {
            let _ = writeln!(text, "{name}={}", quoted(&value));
            text
        });
    output(env, &text)
}

fn print_options(env: &mut Env, listing: Listing) -> Result {
    let mut text = String::new();
    for (option, state) in env.options.iter() {
        let _ = match listing {
            Listing::Human => writeln!(text, "{option:15} {state}"),
            Listing::Commands => {
                let flag = if state == On { '-' } else { '+' };
                writeln!(text, "set {flag}o {option}")
            }
        };
    }
    output(env, &text)
}

fn parse_long(
    env: &mut Env,
    name: &str,
    state: State,
) -> std::result::Result<(ShellOption, State), Result> {
    match name.parse::<ShellOption>() {
        Ok(option) => Ok((option, state)),
        Err(error) => Err(syntax_error(env, &format!("{name}: {error}"))),
    }
}

/// Entry point of the set built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if args.is_empty() {
        return print_variables(env);
    }

    let mut args = args.into_iter().peekable();
    let mut changes = Vec::new();
    let mut listing = None;
    let mut replace_params = false;

    while let Some(arg) = args.next_if(|arg| arg.value.starts_with(['-', '+'])) {
        if arg.value == "--" || arg.value == "-" {
            replace_params = true;
            break;
        }
        let state = if arg.value.starts_with('-') { On } else { Off };
        for c in arg.value[1..].chars() {
            if c == 'o' {
                match args.next() {
                    Some(name) => match parse_long(env, &name.value, state) {
                        Ok(change) => changes.push(change),
                        Err(result) => return result,
                    },
                    None if state == On => listing = Some(Listing::Human),
                    None => listing = Some(Listing::Commands),
                }
                continue;
            }
            match parse_short(c) {
                Some(option) => changes.push((option, state)),
                None => return syntax_error(env, &format!("-{c}: no such option")),
            }
        }
    }

    for &(option, _) in &changes {
        if !option.is_modifiable() {
            return syntax_error(env, &format!("{option}: the option cannot be changed"));
        }
    }
    for (option, state) in changes {
        env.options.set(option, state);
    }

    let operands: Vec<String> = args.map(|field| field.value).collect();
    if replace_params || !operands.is_empty() {
        *env.variables.positional_params_mut() = operands;
    }

    match listing {
        Some(listing) => print_options(env, listing),
        None => Result::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::env_with_all_builtins;
    use swsh_env::option::{AllExport, ErrExit, Interactive, NoGlob, XTrace};
    use swsh_env::semantics::ExitStatus;
    use swsh_env::stack::Frame;
    use swsh_env::variable::Variable;
    use swsh_env_test_helper::assert_stdout;

    #[test]
    fn enabling_and_disabling_short_options() {
        let (mut env, _) = env_with_all_builtins();
        env.options.set(NoGlob, On);
        let result = main(&mut env, Field::dummies(["-ae", "+f"]));
        assert_eq!(result, Result::default());
        assert!(env.options.is_on(AllExport));
        assert!(env.options.is_on(ErrExit));
        assert!(!env.options.is_on(NoGlob));
    }

    #[test]
    fn long_options() {
        let (mut env, _) = env_with_all_builtins();
        let result = main(&mut env, Field::dummies(["-o", "xtrace", "-o", "allex"]));
        assert_eq!(result, Result::default());
        assert!(env.options.is_on(XTrace));
        assert!(env.options.is_on(AllExport));
        main(&mut env, Field::dummies(["+o", "xtrace"]));
        assert!(!env.options.is_on(XTrace));
    }

    #[test]
    fn operands_replace_positional_parameters() {
        let (mut env, _) = env_with_all_builtins();
        main(&mut env, Field::dummies(["-e", "a", "-b"]));
        assert_eq!(env.variables.positional_params(), ["a", "-b"]);
        main(&mut env, Field::dummies(["--", "-x"]));
        assert_eq!(env.variables.positional_params(), ["-x"]);
        assert!(!env.options.is_on(XTrace));
        main(&mut env, Field::dummies(["--"]));
        assert!(env.variables.positional_params().is_empty());
    }

    #[test]
    fn options_alone_keep_positional_parameters() {
        let (mut env, _) = env_with_all_builtins();
        *env.variables.positional_params_mut() = vec!["1".to_string()];
        main(&mut env, Field::dummies(["-u"]));
        assert_eq!(env.variables.positional_params(), ["1"]);
    }

    #[test]
    fn unknown_option_is_error() {
        let (mut env, _) = env_with_all_builtins();
        let mut env = env.push_frame(Frame::Builtin {
            name: "set".to_string(),
            is_special: true,
        });
        let result = main(&mut env, Field::dummies(["-eZ"]));
        assert_eq!(result.exit_status(), ExitStatus::ERROR);
        assert!(result.is_aborting());
        assert!(!env.options.is_on(ErrExit));
    }

    #[test]
    fn interactive_cannot_be_changed() {
        let (mut env, _) = env_with_all_builtins();
        let result = main(&mut env, Field::dummies(["-i"]));
        assert_eq!(result.exit_status(), ExitStatus::ERROR);
        assert!(!env.options.is_on(Interactive));
    }

    #[test]
    fn printing_variables() {
        let (mut env, state) = env_with_all_builtins();
        env.variables.get_or_new("b", Scope::Global).assign("x y").unwrap();
        env.variables.get_or_new("a", Scope::Global).assign("1").unwrap();
        env.variables.get_or_new("c", Scope::Global);
        let result = main(&mut env, vec![]);
        assert_eq!(result, Result::default());
        assert_stdout(&state, |stdout| assert_eq!(stdout, "a=1\nb='x y'\n"));
        assert_eq!(env.variables.get("a"), Some(&Variable::new("1")));
    }

    #[test]
    fn listing_options() {
        let (mut env, state) = env_with_all_builtins();
        env.options.set(ErrExit, On);
        main(&mut env, Field::dummies(["-o"]));
        assert_stdout(&state, |stdout| {
            assert!(stdout.contains("errexit         on\n"), "{stdout}");
            assert!(stdout.contains("xtrace          off\n"), "{stdout}");
        });
    }

    #[test]
    fn listing_options_as_commands() {
        let (mut env, state) = env_with_all_builtins();
        env.options.set(ErrExit, On);
        main(&mut env, Field::dummies(["+o"]));
        assert_stdout(&state, |stdout| {
            assert!(stdout.contains("set -o errexit\n"), "{stdout}");
            assert!(stdout.contains("set +o noglob\n"), "{stdout}");
        });
    }
}
