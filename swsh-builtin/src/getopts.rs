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

//! Getopts built-in
//!
//! The **`getopts`** built-in parses options in shell scripts.
//!
//! # Synopsis
//!
//! ```sh
//! getopts option_string name [argument...]
//! ```
//!
//! # Description
//!
//! Each invocation parses the next option in the arguments, which default to
//! the positional parameters. The option character is assigned to the
//! variable `name`, and the argument of an option that takes one is assigned
//! to `$OPTARG`. `$OPTIND` tracks the next option to parse. Assign `1` to it
//! to start parsing a new set of arguments.
//!
//! The option string lists the option characters. A character followed by a
//! colon takes an argument. If the option string starts with a colon, errors
//! are silent: an unknown option sets `name` to `?` and `$OPTARG` to the
//! option character, and a missing argument sets `name` to `:` and
//! `$OPTARG` to the option character. Otherwise, both errors set `name` to
//! `?`, unset `$OPTARG`, and print a message.
//!
//! When no options remain, `name` is set to `?` and `$OPTIND` to the index
//! of the first operand.
//!
//! While the built-in is inside a group of options such as `-abc`, `$OPTIND`
//! holds the argument index and the character index separated by a colon.
//!
//! # Exit status
//!
//! Zero if an option was found (even an invalid one), one when the options
//! have ended or a variable could not be updated, and two on a usage error.

pub mod model;

use self::model::{Error, OptionString, Position};
use crate::common::syntax::parse_arguments;
use crate::common::{print_message, report_failure, syntax_error};
use swsh_env::Env;
use swsh_env::builtin::Result;
use swsh_env::semantics::{ExitStatus, Field};
use swsh_env::variable::{OPTARG, OPTIND, OPTIND_INITIAL_VALUE, Scope};
use swsh_syntax::marker::is_name;

/// Assigns a global variable, reporting a read-only variable.
fn assign(env: &mut Env, name: &str, value: String) -> std::result::Result<(), Result> {
    let mut variable = env.get_or_create_variable(name, Scope::Global);
    match variable.assign(value) {
        Ok(_) => Ok(()),
        Err(_) => {
            let message = format!("{name}: cannot assign to a read-only variable");
            Err(report_failure(env, &message))
        }
    }
}

/// Unsets `$OPTARG`, reporting a read-only variable.
fn unset_optarg(env: &mut Env) -> std::result::Result<(), Result> {
    match env.variables.unset(OPTARG) {
        Ok(_) => Ok(()),
        Err(error) => {
            let message = format!("{}: cannot unset a read-only variable", error.name);
            Err(report_failure(env, &message))
        }
    }
}

/// Updates the variables after parsing an option.
fn update(
    env: &mut Env,
    name: &str,
    value: char,
    optarg: Option<String>,
    next: Position,
) -> std::result::Result<(), Result> {
    assign(env, name, value.to_string())?;
    match optarg {
        Some(optarg) => assign(env, OPTARG, optarg)?,
        None => unset_optarg(env)?,
    }
    assign(env, OPTIND, next.to_string())
}

/// Entry point of the getopts built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let operands = match parse_arguments(&[], args) {
        Ok((_, operands)) => operands,
        Err(error) => return syntax_error(env, &error.to_string()),
    };
    let [option_string, name, args @ ..] = operands.as_slice() else {
        return syntax_error(env, "missing operand");
    };
    let name = name.value.as_str();
    if !is_name(name.as_bytes()) {
        return syntax_error(env, &format!("{name}: invalid variable name"));
    }
    let args = if args.is_empty() {
        env.variables.positional_params().to_vec()
    } else {
        args.iter().map(|field| field.value.clone()).collect()
    };
    let (silent, options) = match option_string.value.strip_prefix(':') {
        Some(options) => (true, OptionString(options)),
        None => (false, OptionString(&option_string.value)),
    };

    let optind = env
        .variables
        .value(OPTIND, env.stack.line_no)
        .unwrap_or_else(|| OPTIND_INITIAL_VALUE.to_owned());
    let Some(position) = Position::parse(&optind) else {
        return report_failure(env, &format!("$OPTIND has an invalid value `{optind}`"));
    };

    let (occurrence, next) = model::next(&args, options, position);
    let Some(occurrence) = occurrence else {
        log::trace!(target: "swsh::exec", "getopts: end of options at {next}");
        let updated = assign(env, name, "?".to_owned())
            .and_then(|()| unset_optarg(env))
            .and_then(|()| {
                let optind = Position::at_arg(next.arg_index).to_string();
                assign(env, OPTIND, optind)
            });
        return match updated {
            Ok(()) => Result::new(ExitStatus::FAILURE),
            Err(result) => result,
        };
    };

    let option = occurrence.option;
    let updated = match occurrence.error {
        None => update(env, name, option, occurrence.argument, next),
        Some(Error::MissingArgument) if silent => {
            update(env, name, ':', Some(option.to_string()), next)
        }
        Some(_) if silent => update(env, name, '?', Some(option.to_string()), next),
        Some(error) => {
            print_message(env, &format!("-{option}: {error}"));
            update(env, name, '?', None, next)
        }
    };
    match updated {
        Ok(()) => Result::new(ExitStatus::SUCCESS),
        Err(result) => result,
    }
}
