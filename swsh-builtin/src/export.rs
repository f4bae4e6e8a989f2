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

//! Export built-in
//!
//! The **`export`** built-in exports variables to the environment of
//! utilities the shell runs.
//!
//! # Synopsis
//!
//! ```sh
//! export name[=value]...
//! export [-p]
//! ```
//!
//! Each operand exports the named variable, assigning the value first if
//! given. A variable exported without a value stays unset but is passed to
//! utilities once a value is assigned. Without operands, exported variables
//! are printed as `export name=value` lines.
//!
//! # Exit status
//!
//! Zero unless an operand names a read-only variable with a value or is not
//! a valid name.

use crate::typeset::{self, Attribute};
use swsh_env::Env;
use swsh_env::builtin::Result;
use swsh_env::semantics::Field;

/// Entry point of the export built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    typeset::main(env, args, Attribute::Export)
}
