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

//! Continue built-in
//!
//! The **`continue`** built-in skips the rest of the loop body and starts
//! the next iteration.
//!
//! # Synopsis
//!
//! ```sh
//! continue [n]
//! ```
//!
//! # Description
//!
//! The built-in resumes the `n`th innermost `for`, `while`, or `until`
//! loop. The inner loops are exited. The operand is interpreted the same
//! way as that of the [`break`](crate::r#break) built-in.

use swsh_env::Env;
use swsh_env::builtin::Result;
use swsh_env::semantics::{Divert, Field};

/// Entry point of the continue built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    crate::r#break::run(env, args, |count| Divert::Continue { count })
}
