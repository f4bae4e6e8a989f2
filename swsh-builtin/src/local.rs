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

//! Local built-in
//!
//! The **`local`** built-in defines variables local to the running
//! function.
//!
//! # Synopsis
//!
//! ```sh
//! local [name[=value]|-]...
//! ```
//!
//! # Description
//!
//! Each `name=value` operand defines a local variable with the value. A bare
//! `name` defines a local variable that starts with the value of the
//! variable it hides. Either way, the local variable is exported if the
//! hidden variable is. Local variables disappear when
//! the function returns, uncovering the hidden variables.
//!
//! The operand `-` saves the current shell options so that they are restored
//! when the function returns.
//!
//! # Errors
//!
//! It is an error to use the built-in outside a function or to hide a
//! read-only variable.
//!
//! # Exit status
//!
//! Zero if successful, one on error.

use crate::common::syntax::parse_arguments;
use crate::common::{report_failure, syntax_error};
use crate::typeset::split_operand;
use swsh_env::Env;
use swsh_env::builtin::Result;
use swsh_env::semantics::{ExitStatus, Field};
use swsh_env::variable::Scope;
use swsh_syntax::marker::is_name;

/// Defines a local variable.
///
/// On error, returns the message to print.
fn define(env: &mut Env, name: &str, value: Option<&str>) -> std::result::Result<(), String> {
    if !is_name(name.as_bytes()) {
        return Err(format!("{name}: invalid variable name"));
    }
    let hidden = env.variables.get(name).cloned();
    if hidden.as_ref().is_some_and(|variable| variable.is_read_only) {
        return Err(format!("{name}: cannot hide a read-only variable"));
    }

    let mut variable = env.get_or_create_variable(name, Scope::Local);
    if hidden.as_ref().is_some_and(|hidden| hidden.is_exported) {
        variable.export(true);
    }
    let assigned = match value {
        Some(value) => variable.assign(value),
        None => match hidden {
            Some(hidden) if variable.value.is_none() => {
                match hidden.value {
                    Some(value) => variable.assign(value),
                    None => Ok(None),
                }
            }
            _ => Ok(None),
        },
    };
    assigned
        .map(drop)
        .map_err(|_| format!("{name}: cannot assign to a read-only variable"))
}

/// Entry point of the local built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let operands = match parse_arguments(&[], args) {
        Ok((_, operands)) => operands,
        Err(error) => return syntax_error(env, &error.to_string()),
    };
    if !env.variables.is_in_function() {
        return report_failure(env, "cannot be used outside a function");
    }

    let mut result = Result::new(ExitStatus::SUCCESS);
    for operand in &operands {
        if operand.value == "-" {
            let options = env.options;
            env.variables.save_options(options);
            continue;
        }
        let (name, value) = split_operand(&operand.value);
        if let Err(message) = define(env, name, value) {
            result = report_failure(env, &message);
        }
    }
    result
}
