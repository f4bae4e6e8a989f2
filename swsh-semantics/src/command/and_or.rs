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

//! Implementation of the and-or list semantics

use super::Command;
use std::ops::ControlFlow::Continue;
use std::rc::Rc;
use swsh_env::Env;
use swsh_env::semantics::{ExitStatus, Result};
use swsh_env::stack::Frame;
use swsh_syntax::syntax::AndOr;
use swsh_syntax::syntax::Node;

/// Tests whether the next pipeline should run after the link.
fn should_run(link: Option<AndOr>, exit_status: ExitStatus) -> bool {
    match link {
        None => true,
        Some(AndOr::AndThen) => exit_status.is_successful(),
        Some(AndOr::OrElse) => !exit_status.is_successful(),
    }
}

/// Executes the and-or list.
///
/// The `&&` operator runs the right-hand side if and only if the exit status
/// of the left-hand side is zero. The `||` operator runs it if and only if
/// the exit status is non-zero. The operators are left-associative and have
/// equal precedence. The exit status of the list is that of the last
/// executed pipeline.
///
/// [`Frame::Condition`] is pushed to the stack while running the pipelines
/// except for the last.
pub fn execute(env: &mut Env, items: &[Rc<Node>]) -> Result {
    let Some((last, init)) = items.split_last() else {
        return Continue(());
    };

    let mut link = None;
    {
        let mut env = env.push_frame(Frame::Condition);
        for item in init {
            if should_run(link, env.exit_status) {
                item.execute(&mut env)?;
            }
            link = item.and_or_link;
        }
    }

    if should_run(link, env.exit_status) {
        last.execute(env)
    } else {
        Continue(())
    }
}
