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

//! Pwd built-in
//!
//! The **`pwd`** built-in prints the working directory.
//!
//! # Synopsis
//!
//! ```sh
//! pwd [-L|-P]
//! ```
//!
//! # Description
//!
//! With `-L` (the default), the value of `$PWD` is printed if it is an
//! absolute pathname of an existing directory without `.` or `..`
//! components. Otherwise, and with `-P`, the working directory obtained from
//! the system is printed. If both options are given, the last one applies.
//!
//! # Exit status
//!
//! Zero if successful, one if the working directory cannot be determined or
//! printed, and two on a usage error.

use crate::common::syntax::{OptionOccurrence, OptionSpec, parse_arguments};
use crate::common::{output, report_failure, syntax_error};
use std::os::unix::ffi::OsStrExt as _;
use swsh_env::builtin::Result;
use swsh_env::semantics::Field;
use swsh_env::system::Errno;
use swsh_env::variable::PWD;
use swsh_env::{Env, System as _};
use swsh_syntax::bytes::{decode, to_c_string};

pub(crate) const OPTION_SPECS: &[OptionSpec] = &[OptionSpec::new('L'), OptionSpec::new('P')];

/// Treatment of symbolic links in the working directory pathname
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// Keep the pathname as the user specified it
    #[default]
    Logical,
    /// Use the pathname without symbolic links
    Physical,
}

impl Mode {
    /// Returns the mode selected by the last `-L` or `-P` option.
    #[must_use]
    pub fn from_options(options: &[OptionOccurrence<'_>]) -> Self {
        match options.last().map(|option| option.spec.get_short()) {
            Some('P') => Mode::Physical,
            _ => Mode::Logical,
        }
    }
}

/// Tests whether the path is absolute and free of `.` and `..` components.
#[must_use]
pub fn is_normalized(path: &str) -> bool {
    path.starts_with('/') && !path.split('/').any(|component| component == "." || component == "..")
}

/// Returns the working directory obtained from the system.
pub fn physical(env: &Env) -> std::result::Result<String, Errno> {
    let cwd = env.system.getcwd()?;
    Ok(decode(cwd.as_os_str().as_bytes()).into_owned())
}

/// Returns `$PWD` if it names the working directory in the logical mode.
fn logical(env: &Env) -> Option<String> {
    let pwd = env.variables.get(PWD)?.value.clone()?;
    let path = to_c_string(&pwd).ok()?;
    (is_normalized(&pwd) && env.system.is_directory(&path)).then_some(pwd)
}

/// Entry point of the pwd built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let (options, operands) = match parse_arguments(OPTION_SPECS, args) {
        Ok(parse) => parse,
        Err(error) => return syntax_error(env, &error.to_string()),
    };
    if !operands.is_empty() {
        return syntax_error(env, "no operands are expected");
    }

    let pwd = match Mode::from_options(&options) {
        Mode::Logical => logical(env).map_or_else(|| physical(env), Ok),
        Mode::Physical => physical(env),
    };
    match pwd {
        Ok(pwd) => output(env, &format!("{pwd}\n")),
        Err(errno) => {
            let message = format!("cannot determine the working directory: {}", errno.desc());
            report_failure(env, &message)
        }
    }
}
