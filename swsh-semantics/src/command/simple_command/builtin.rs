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

//! Simple command that invokes a built-in

use super::trace_fields;
use crate::Handle;
use crate::assign::perform_assignments;
use crate::redir::RedirGuard;
use crate::xtrace::XTrace;
use std::ops::ControlFlow::{Break, Continue};
use swsh_env::Env;
use swsh_env::builtin::{self, Builtin, Type};
use swsh_env::semantics::{Divert, Field, Result};
use swsh_env::stack::Frame;
use swsh_env::variable::{Context, Scope};
use swsh_syntax::syntax::{Assign, Redir};

/// Executes the built-in.
///
/// `fields` contains the command name as the first item.
pub fn execute(
    env: &mut Env,
    builtin: Builtin,
    assigns: &[Assign],
    fields: Vec<Field>,
    redirs: &[Redir],
) -> Result {
    let is_special = builtin.r#type == Type::Special;
    let mut env = RedirGuard::new(env);
    if let Err(error) = env.perform_redirs(redirs) {
        error.handle(&mut env)?;
        return if is_special {
            Break(Divert::Interrupt(Some(env.exit_status)))
        } else {
            Continue(())
        };
    }

    let mut xtrace = XTrace::from_options(&env.options);
    let result = if is_special {
        if let Err(error) =
            perform_assignments(&mut env, assigns, Scope::Global, false, xtrace.as_mut())
        {
            return error.handle(&mut env);
        }
        trace_fields(&mut env, xtrace, &fields);
        run(&mut env, builtin, fields, is_special)
    } else {
        let mut env = env.push_context(Context::Volatile);
        if let Err(error) =
            perform_assignments(&mut env, assigns, Scope::Volatile, false, xtrace.as_mut())
        {
            return error.handle(&mut env);
        }
        trace_fields(&mut env, xtrace, &fields);
        run(&mut env, builtin, fields, is_special)
    };

    if result.should_retain_redirs() {
        env.preserve_redirs();
    }
    result.divert()
}

fn run(env: &mut Env, builtin: Builtin, mut fields: Vec<Field>, is_special: bool) -> builtin::Result {
    let name = fields.remove(0).value;
    let mut env = env.push_frame(Frame::Builtin { name, is_special });
    let result = (builtin.execute)(&mut env, fields);
    env.exit_status = result.exit_status();
    result
}
