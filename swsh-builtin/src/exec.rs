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

//! Exec built-in
//!
//! The **`exec`** built-in replaces the shell process with an external
//! utility, or applies redirections to the shell itself.
//!
//! # Synopsis
//!
//! ```sh
//! exec [name [argument...]]
//! ```
//!
//! # Description
//!
//! Without operands, the redirections of the command stay in effect for the
//! rest of the shell session instead of being undone when the built-in
//! returns.
//!
//! With operands, the built-in searches `$PATH` for the utility named by the
//! first operand (unless it contains a slash) and executes it in place of the
//! shell with the remaining operands as arguments. Exported variables make up
//! the environment of the new process.
//!
//! # Exit status
//!
//! Zero without operands. If the utility cannot be executed, the status is
//! 127 if it was not found and 126 otherwise, and a non-interactive shell
//! exits with that status.

use crate::common::syntax::parse_arguments;
use crate::common::{print_message, syntax_error};
use std::ffi::CString;
use std::ops::ControlFlow::Break;
use swsh_env::builtin::Result;
use swsh_env::semantics::{Divert, ExitStatus, Field};
use swsh_env::system::Errno;
use swsh_env::{Env, System as _};
use swsh_semantics::command_search::search_path;
use swsh_syntax::bytes::to_c_string;

/// Finds the path to execute for the command name.
fn resolve(env: &Env, name: &str) -> Option<CString> {
    if name.contains('/') {
        to_c_string(name).ok()
    } else {
        search_path(env, name)
    }
}

/// Fails with the exit status, exiting the shell unless it is interactive.
fn fail(env: &Env, exit_status: ExitStatus) -> Result {
    if env.is_interactive() {
        Result::new(exit_status)
    } else {
        Result::with_exit_status_and_divert(exit_status, Break(Divert::Exit(Some(exit_status))))
    }
}

/// Entry point of the exec built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let operands = match parse_arguments(&[], args) {
        Ok((_, operands)) => operands,
        Err(error) => return syntax_error(env, &error.to_string()),
    };

    let Some(name) = operands.first() else {
        let mut result = Result::default();
        result.retain_redirs();
        return result;
    };
    let name = name.value.clone();

    let Some(path) = resolve(env, &name) else {
        print_message(env, &format!("{name}: command not found"));
        return fail(env, ExitStatus::NOT_FOUND);
    };
    let args = operands
        .iter()
        .map(|field| to_c_string(&field.value))
        .collect::<std::result::Result<Vec<_>, _>>();
    let Ok(args) = args else {
        print_message(env, &format!("{name}: argument contains a null byte"));
        return fail(env, ExitStatus::NOEXEC);
    };
    let envs = env.variables.env_c_strings();

    log::debug!(target: "swsh::exec", "replacing the shell with {path:?}");
    let Err(errno) = env.system.execve(&path, &args, &envs);
    env.print_system_error(errno, &format!("exec: cannot execute {name}"));
    let exit_status = match errno {
        Errno::ENOENT | Errno::ENOTDIR => ExitStatus::NOT_FOUND,
        _ => ExitStatus::NOEXEC,
    };
    fail(env, exit_status)
}
