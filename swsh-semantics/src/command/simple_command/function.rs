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

//! Simple command that calls a function

use super::trace_fields;
use crate::Handle;
use crate::assign::perform_assignments;
use crate::command::Command;
use crate::redir::RedirGuard;
use crate::xtrace::XTrace;
use std::ops::ControlFlow::{Break, Continue};
use std::rc::Rc;
use swsh_env::Env;
use swsh_env::function::Function;
use swsh_env::semantics::{Divert, Field, Result};
use swsh_env::stack::Frame;
use swsh_env::variable::{Context, Scope};
use swsh_syntax::syntax::{Assign, Redir};

/// Calls the function.
///
/// `fields` contains the function name as the first item. The rest become
/// the positional parameters while the function runs.
pub fn execute(
    env: &mut Env,
    function: Rc<Function>,
    assigns: &[Assign],
    fields: Vec<Field>,
    redirs: &[Redir],
) -> Result {
    let mut env = RedirGuard::new(env);
    if let Err(error) = env.perform_redirs(redirs) {
        return error.handle(&mut env);
    }

    let mut xtrace = XTrace::from_options(&env.options);
    let mut env = env.push_context(Context::Volatile);
    if let Err(error) =
        perform_assignments(&mut env, assigns, Scope::Volatile, false, xtrace.as_mut())
    {
        return error.handle(&mut env);
    }
    trace_fields(&mut env, xtrace, &fields);

    let params = fields.into_iter().skip(1).map(|field| field.value).collect();
    let mut env = env.push_context(Context::with_params(params));
    let mut env = env.push_frame(Frame::Function {
        name: function.name.clone(),
    });
    log::debug!(target: "swsh::exec", "calling function {}", function.name);

    match function.body.execute(&mut env) {
        Break(Divert::Return(exit_status)) => {
            if let Some(exit_status) = exit_status {
                env.exit_status = exit_status;
            }
            Continue(())
        }
        result => result,
    }
}
