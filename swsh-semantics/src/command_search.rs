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

//! Command search
//!
//! The [command search](search) determines what a simple command invokes.
//! If the command name contains a slash, the target is always an external
//! utility. Otherwise, the shell searches the following candidates in the
//! order of priority:
//!
//! 1. Special built-ins
//! 1. Functions
//! 1. Regular built-ins
//! 1. External utilities found in the directories of `$PATH`

use std::ffi::CString;
use std::rc::Rc;
use swsh_env::builtin::Builtin;
use swsh_env::builtin::Type::{Regular, Special};
use swsh_env::function::Function;
use swsh_env::variable::PATH;
use swsh_env::{Env, System};
use swsh_syntax::bytes::to_c_string;

/// Target of a simple command execution
#[derive(Clone, Debug)]
pub enum Target {
    /// Built-in utility
    Builtin(Builtin),
    /// Function
    Function(Rc<Function>),
    /// External utility
    External {
        /// Path to the executable file
        ///
        /// If the `$PATH` variable contains a relative directory name, the
        /// path may be relative. If the command name contains a slash, the
        /// name is used as the path without checking the file.
        path: CString,
    },
}

/// Searches `$PATH` for an executable file with the name.
#[must_use]
pub fn search_path(env: &Env, name: &str) -> Option<CString> {
    let path = env.variables.value(PATH, env.stack.line_no)?;
    path.split(':').find_map(|dir| {
        let dir = if dir.is_empty() { "." } else { dir };
        let candidate = to_c_string(&format!("{dir}/{name}")).ok()?;
        env.system
            .is_executable_file(&candidate)
            .then_some(candidate)
    })
}

/// Performs command search.
///
/// Returns `None` if no target is found.
#[must_use]
pub fn search(env: &Env, name: &str) -> Option<Target> {
    if name.contains('/') {
        let path = to_c_string(name).ok()?;
        return Some(Target::External { path });
    }

    let builtin = env.builtins.get(name).copied();
    if let Some(builtin) = builtin.filter(|b| b.r#type == Special) {
        return Some(Target::Builtin(builtin));
    }

    if let Some(function) = env.functions.get(name) {
        return Some(Target::Function(Rc::clone(&function.0)));
    }

    if let Some(builtin) = builtin.filter(|b| b.r#type == Regular) {
        return Some(Target::Builtin(builtin));
    }

    search_path(env, name).map(|path| Target::External { path })
}
