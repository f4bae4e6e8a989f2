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

//! True built-in
//!
//! The **`true`** built-in does nothing and returns zero.

use swsh_env::Env;
use swsh_env::builtin::Result;
use swsh_env::semantics::{ExitStatus, Field};

/// Entry point of the true built-in
pub fn main(_env: &mut Env, _args: Vec<Field>) -> Result {
    ExitStatus::SUCCESS.into()
}
