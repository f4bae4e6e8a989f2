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

//! Execution of the function definition command

use std::ops::ControlFlow::Continue;
use std::rc::Rc;
use swsh_env::Env;
use swsh_env::function::HashEntry;
use swsh_env::semantics::{ExitStatus, Result};
use swsh_syntax::syntax::Node;

/// Defines a function.
///
/// An existing function with the same name is replaced. The body is not
/// executed until the function is called. The exit status is zero.
pub fn execute(env: &mut Env, name: &str, body: &Rc<Node>, line_no: u64) -> Result {
    log::debug!(target: "swsh::exec", "defining function {name}");
    env.functions
        .replace(HashEntry::new(name.to_string(), Rc::clone(body), line_no));
    env.exit_status = ExitStatus::SUCCESS;
    Continue(())
}
