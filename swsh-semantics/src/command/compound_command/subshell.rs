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

//! Execution of the subshell command

use crate::command::Command;
use crate::subshell::{start_subshell, wait_subshell};
use std::ops::ControlFlow::Break;
use swsh_env::Env;
use swsh_env::semantics::{Divert, ExitStatus, Result};
use swsh_syntax::syntax::Node;

/// Executes the body in a subshell and waits for it.
///
/// Changes the body makes to the environment do not affect the current
/// shell.
pub fn execute(env: &mut Env, body: &Node) -> Result {
    let exit_status = start_subshell(env, None, None, |env| body.execute(env))
        .and_then(|child| wait_subshell(env, child));
    match exit_status {
        Ok(exit_status) => {
            env.exit_status = exit_status;
            env.apply_errexit()
        }
        Err(errno) => {
            env.print_system_error(errno, "cannot start subshell");
            Break(Divert::Interrupt(Some(ExitStatus::ERROR)))
        }
    }
}
