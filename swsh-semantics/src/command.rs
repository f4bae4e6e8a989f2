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

//! Command execution
//!
//! The [`Command`] trait is implemented for [`Node`], so any syntax tree
//! produced by the parser can be executed. Before running a node, the line
//! number of the node is recorded in the [stack](swsh_env::stack::Stack) as
//! the value of `$LINENO`.
//!
//! A node followed by `&` is run in a subshell that the shell does not wait
//! for. Redirections attached to a compound command are performed before the
//! command and undone after it. Those of a simple command are handled by the
//! simple command itself, since their effect depends on the command search.

mod and_or;
mod compound_command;
mod function_definition;
mod pipeline;
mod simple_command;

use crate::Handle;
use crate::redir::RedirGuard;
use crate::subshell::{Child, start_subshell};
use crate::trap::run_traps_for_caught_signals;
use std::ops::ControlFlow::Continue;
use std::rc::Rc;
use swsh_env::Env;
use swsh_env::semantics::{ExitStatus, Result};
use swsh_syntax::syntax::{Node, NodeKind};

/// Syntactic construct that can be executed
pub trait Command {
    /// Executes this command.
    ///
    /// The exit status of the command is stored in `env.exit_status`. A
    /// [`Divert`](swsh_env::semantics::Divert) in the result tells the
    /// caller to leave the normal flow of execution.
    fn execute(&self, env: &mut Env) -> Result;
}

impl Command for Node {
    fn execute(&self, env: &mut Env) -> Result {
        env.stack.line_no = self.line_no;
        if self.asynchronous {
            execute_async(self, env)
        } else {
            execute_sync(self, env)
        }
    }
}

/// Runs the items in sequence, running pending traps after each item.
fn execute_items(env: &mut Env, items: &[Rc<Node>]) -> Result {
    for item in items {
        item.execute(env)?;
        run_traps_for_caught_signals(env)?;
    }
    Continue(())
}

fn execute_sync(node: &Node, env: &mut Env) -> Result {
    match &node.kind {
        NodeKind::List(items) | NodeKind::Term(items) => execute_items(env, items),
        NodeKind::AndOr(items) => and_or::execute(env, items),
        NodeKind::Pipeline { negated, commands } => pipeline::execute(env, *negated, commands),
        NodeKind::SimpleCommand { assigns, words } => {
            simple_command::execute(env, assigns, words, &node.redirs)
        }
        NodeKind::Function { name, body } => {
            function_definition::execute(env, name, body, node.line_no)
        }
        _ => {
            let mut env = RedirGuard::new(env);
            if let Err(error) = env.perform_redirs(&node.redirs) {
                return error.handle(&mut env);
            }
            compound_command::execute(&mut env, node)
        }
    }
}

/// Starts the node in a subshell without waiting for it.
///
/// The exit status is zero. If the subshell runs in a child process, its
/// process ID becomes the value of `$!`.
fn execute_async(node: &Node, env: &mut Env) -> Result {
    match start_subshell(env, None, None, |env| execute_sync(node, env)) {
        Ok(Child::Process(pid)) => {
            log::debug!(target: "swsh::exec", "started asynchronous command {pid}");
            env.last_async_pid = Some(pid);
        }
        Ok(Child::Done(_)) => (),
        Err(errno) => {
            env.print_system_error(errno, "cannot start asynchronous command");
        }
    }
    env.exit_status = ExitStatus::SUCCESS;
    Continue(())
}
