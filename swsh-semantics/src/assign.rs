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

//! Assignment

use crate::expansion::{Error, ErrorCause, Result, expand_value};
use crate::xtrace::XTrace;
use swsh_env::Env;
use swsh_env::semantics::ExitStatus;
use swsh_env::variable::Scope;
use swsh_syntax::syntax::Assign;

/// Performs an assignment.
///
/// This function [expands the value](expand_value) and assigns it to the
/// variable in the given scope. If `export` is true, the variable is also
/// exported. The return value is the exit status of the last command
/// substitution performed during the expansion, if any.
pub fn perform_assignment(
    env: &mut Env,
    assign: &Assign,
    scope: Scope,
    export: bool,
    xtrace: Option<&mut XTrace>,
) -> Result<Option<ExitStatus>> {
    let (value, exit_status) = expand_value(env, &assign.value)?;
    if let Some(xtrace) = xtrace {
        xtrace.push_assign(&assign.name, &value);
    }

    let mut variable = env.get_or_create_variable(assign.name.as_str(), scope);
    variable.assign(value).map_err(|_| Error {
        cause: ErrorCause::ReadOnly(assign.name.clone()),
        line_no: assign.value.line_no,
    })?;
    if export {
        variable.export(true);
    }
    Ok(exit_status)
}

/// Performs assignments in order.
///
/// Stops at the first failure. Returns the exit status of the last command
/// substitution performed, if any.
pub fn perform_assignments(
    env: &mut Env,
    assigns: &[Assign],
    scope: Scope,
    export: bool,
    mut xtrace: Option<&mut XTrace>,
) -> Result<Option<ExitStatus>> {
    let mut exit_status = None;
    for assign in assigns {
        let new_status = perform_assignment(env, assign, scope, export, xtrace.as_deref_mut())?;
        exit_status = new_status.or(exit_status);
    }
    Ok(exit_status)
}
