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

//! Eval built-in
//!
//! The **`eval`** built-in runs the operands as commands.
//!
//! # Synopsis
//!
//! ```sh
//! eval [command...]
//! ```
//!
//! The operands are joined with spaces, and the resulting string is parsed
//! and run in the current environment.
//!
//! # Exit status
//!
//! The exit status of the last command run, or zero if there is none.

use itertools::Itertools as _;
use swsh_env::Env;
use swsh_env::builtin::Result;
use swsh_env::semantics::Field;
use swsh_semantics::run_source;
use swsh_syntax::bytes::encode;

/// Entry point of the eval built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let command = args.iter().map(|field| &field.value).join(" ");
    let line_no = args.first().map_or(env.stack.line_no, |field| field.line_no);
    let divert = run_source(env, &encode(&command), line_no);
    Result::with_exit_status_and_divert(env.exit_status, divert)
}
