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

//! Cd built-in
//!
//! The **`cd`** built-in changes the working directory.
//!
//! # Synopsis
//!
//! ```sh
//! cd [-L|-P] [directory]
//! ```
//!
//! # Description
//!
//! The new working directory is determined as follows:
//!
//! 1. Without an operand, `$HOME` is used. The operand `-` stands for
//!    `$OLDPWD`. It is an error if the variable is unset or empty.
//! 2. A relative operand whose first component is neither `.` nor `..` is
//!    searched for in the directories of `$CDPATH`. An empty entry stands
//!    for the working directory.
//! 3. With `-L` (the default), a relative operand is appended to `$PWD`,
//!    and the result is canonicalized: `.` components and redundant slashes
//!    are removed, and each `..` component is removed with the component
//!    before it. The directory a removed component names must exist.
//!
//! After the working directory is changed, `$OLDPWD` is set to the previous
//! `$PWD` and `$PWD` to the new directory. With `-P`, the new `$PWD` is
//! obtained from the system as `pwd -P` does. The new directory is printed
//! if the operand was `-` or was found in a non-empty `$CDPATH` entry.
//!
//! # Exit status
//!
//! Zero if the directory was changed, one if it could not be changed, and
//! two on a usage error.

use crate::common::syntax::parse_arguments;
use crate::common::{output, print_message, report_failure, syntax_error};
use crate::pwd::{self, Mode, OPTION_SPECS};
use swsh_env::builtin::Result;
use swsh_env::semantics::{ExitStatus, Field};
use swsh_env::variable::{CDPATH, HOME, OLDPWD, PWD, Scope};
use swsh_env::{Env, System as _};
use swsh_syntax::bytes::to_c_string;

fn non_empty_variable(env: &Env, name: &str) -> Option<String> {
    env.variables
        .get(name)?
        .value
        .clone()
        .filter(|value| !value.is_empty())
}

fn is_directory(env: &Env, path: &str) -> bool {
    to_c_string(path).is_ok_and(|path| env.system.is_directory(&path))
}

/// Searches `$CDPATH` for the operand.
///
/// Returns the path found in a non-empty entry. Returns `None` if the
/// operand is not subject to the search, is not found, or is found in an
/// empty entry.
fn search_cdpath(env: &Env, operand: &str) -> Option<String> {
    let first = operand.split('/').next().unwrap_or_default();
    if operand.starts_with('/') || first == "." || first == ".." {
        return None;
    }
    let cdpath = env.variables.value(CDPATH, env.stack.line_no)?;
    for dir in cdpath.split(':') {
        if dir.is_empty() {
            if is_directory(env, operand) {
                return None;
            }
            continue;
        }
        let candidate = if dir.ends_with('/') {
            format!("{dir}{operand}")
        } else {
            format!("{dir}/{operand}")
        };
        if is_directory(env, &candidate) {
            return Some(candidate);
        }
    }
    None
}

fn create_path(leading_slashes: usize, components: &[&str]) -> String {
    let root = match leading_slashes {
        0 => "",
        2 => "//",
        _ => "/",
    };
    let path = format!("{root}{}", components.join("/"));
    if path.is_empty() { ".".to_owned() } else { path }
}

/// Canonicalizes the path in the logical mode.
///
/// On error, returns the path to the directory that does not exist.
pub fn canonicalize(env: &Env, path: &str) -> std::result::Result<String, String> {
    let leading_slashes = path.bytes().take_while(|&b| b == b'/').count();
    let mut components = path
        .split('/')
        .filter(|component| !component.is_empty() && *component != ".")
        .collect::<Vec<_>>();

    let mut index = 1;
    while let Some(&component) = components.get(index) {
        if component != ".." || components[index - 1] == ".." {
            index += 1;
            continue;
        }
        let parent = create_path(leading_slashes, &components[..index]);
        if !is_directory(env, &parent) {
            return Err(parent);
        }
        components.drain(index - 1..=index);
        index = index.saturating_sub(1).max(1);
    }

    if leading_slashes > 0 {
        let dot_dots = components.iter().take_while(|&&c| c == "..").count();
        components.drain(..dot_dots);
    }
    Ok(create_path(leading_slashes, &components))
}

/// Assigns and exports the variable, printing an error on failure.
fn set_variable(env: &mut Env, name: &str, value: String) {
    let mut variable = env.get_or_create_variable(name, Scope::Global);
    let assigned = variable.assign(value).is_ok();
    if assigned {
        variable.export(true);
    } else {
        print_message(env, &format!("{name}: cannot assign to a read-only variable"));
    }
}

/// Entry point of the cd built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let (options, operands) = match parse_arguments(OPTION_SPECS, args) {
        Ok(parse) => parse,
        Err(error) => return syntax_error(env, &error.to_string()),
    };
    let mode = Mode::from_options(&options);
    let operand = match operands.as_slice() {
        [] => None,
        [operand] => Some(operand.value.as_str()),
        _ => return syntax_error(env, "too many operands"),
    };

    let old_pwd = env
        .variables
        .get(PWD)
        .and_then(|variable| variable.value.clone())
        .unwrap_or_default();

    let (target, print) = match operand {
        None => match non_empty_variable(env, HOME) {
            Some(home) => (home, false),
            None => return report_failure(env, "$HOME is not set"),
        },
        Some("-") => match non_empty_variable(env, OLDPWD) {
            Some(old) => (old, true),
            None => return report_failure(env, "$OLDPWD is not set"),
        },
        Some(operand) => match search_cdpath(env, operand) {
            Some(found) => (found, true),
            None => (operand.to_owned(), false),
        },
    };

    let path = match mode {
        Mode::Logical => {
            let absolute = if target.starts_with('/') || old_pwd.is_empty() {
                target.clone()
            } else {
                format!("{old_pwd}/{target}")
            };
            match canonicalize(env, &absolute) {
                Ok(path) => path,
                Err(missing) => {
                    return report_failure(env, &format!("{missing}: no such directory"));
                }
            }
        }
        Mode::Physical => target.clone(),
    };

    let changed = match to_c_string(&path) {
        Ok(c_path) => env.system.chdir(&c_path).map_err(|errno| errno.desc()),
        Err(_) => Err("pathname contains a null byte"),
    };
    if let Err(reason) = changed {
        return report_failure(env, &format!("{target}: {reason}"));
    }
    log::debug!(target: "swsh::exec", "changed working directory to {path}");

    let new_pwd = match mode {
        Mode::Logical => path,
        Mode::Physical => pwd::physical(env).unwrap_or(path),
    };
    let result = if print {
        output(env, &format!("{new_pwd}\n"))
    } else {
        Result::new(ExitStatus::SUCCESS)
    };
    set_variable(env, OLDPWD, old_pwd);
    set_variable(env, PWD, new_pwd);
    result
}
