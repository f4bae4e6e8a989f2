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

//! Dot built-in
//!
//! The **`.`** built-in reads and runs commands from a file in the current
//! execution environment.
//!
//! # Synopsis
//!
//! ```sh
//! . file
//! ```
//!
//! # Description
//!
//! If the operand contains a slash, it is the pathname of the file.
//! Otherwise, the directories of `$PATH` are searched for a readable regular
//! file with the name. The file is parsed and run as if its content were
//! written in place of the built-in, except that the `return` built-in ends
//! the script.
//!
//! # Exit status
//!
//! The exit status of the last command run in the file, or zero if the file
//! contains no commands.
//!
//! # Errors
//!
//! It is an error if the file is not found or cannot be read.

use crate::common::syntax::parse_arguments;
use crate::common::{report_failure, syntax_error};
use std::ffi::CString;
use std::ops::ControlFlow::{Break, Continue};
use swsh_env::builtin::Result;
use swsh_env::semantics::{Divert, Field};
use swsh_env::stack::Frame;
use swsh_env::system::{Errno, Mode, OFlag};
use swsh_env::variable::PATH;
use swsh_env::{Env, System as _};
use swsh_semantics::run_source;
use swsh_syntax::bytes::to_c_string;

/// Finds the file to read.
fn find_file(env: &Env, name: &str) -> Option<CString> {
    if name.contains('/') {
        return to_c_string(name).ok();
    }
    let path = env.variables.value(PATH, env.stack.line_no)?;
    path.split(':').find_map(|dir| {
        let dir = if dir.is_empty() { "." } else { dir };
        let candidate = to_c_string(&format!("{dir}/{name}")).ok()?;
        env.system.is_regular_file(&candidate).then_some(candidate)
    })
}

fn read_file(env: &mut Env, path: &CString) -> std::result::Result<Vec<u8>, Errno> {
    let fd = env.system.open(path, OFlag::O_RDONLY | OFlag::O_CLOEXEC, Mode::empty())?;
    let content = env.system.read_all(fd);
    let _ = env.system.close(fd);
    content
}

/// Entry point of the dot built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let operands = match parse_arguments(&[], args) {
        Ok((_, operands)) => operands,
        Err(error) => return syntax_error(env, &error.to_string()),
    };
    let name = match operands.as_slice() {
        [name] => &name.value,
        [] => return syntax_error(env, "missing file operand"),
        _ => return syntax_error(env, "too many operands"),
    };

    let Some(path) = find_file(env, name) else {
        return report_failure(env, &format!("{name}: file not found"));
    };
    let content = match read_file(env, &path) {
        Ok(content) => content,
        Err(errno) => {
            let message = format!("cannot read {name}: {}", errno.desc());
            return report_failure(env, &message);
        }
    };

    log::debug!(target: "swsh::exec", "reading script {name}");
    let mut env = env.push_frame(Frame::DotScript);
    let divert = match run_source(&mut env, &content, 1) {
        Break(Divert::Return(exit_status)) => {
            if let Some(exit_status) = exit_status {
                env.exit_status = exit_status;
            }
            Continue(())
        }
        divert => divert,
    };
    Result::with_exit_status_and_divert(env.exit_status, divert)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::env_with_all_builtins;
    use swsh_env::semantics::ExitStatus;
    use swsh_env::variable::Scope;
    use swsh_env_test_helper::{assert_stderr, assert_stdout, stub_file};

    #[test]
    fn running_file_in_current_environment() {
        let (mut env, state) = env_with_all_builtins();
        stub_file(&state, "/tmp/script", "x=1\necho in script\n");
        let result = run_source(&mut env, b". /tmp/script; echo $x", 1);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "in script\n1\n"));
    }

    #[test]
    fn searching_path() {
        let (mut env, state) = env_with_all_builtins();
        stub_file(&state, "/lib/sh/lib.sh", "echo found\n");
        env.variables
            .get_or_new(PATH, Scope::Global)
            .assign("/bin:/lib/sh")
            .unwrap();
        let result = run_source(&mut env, b". lib.sh", 1);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "found\n"));
    }

    #[test]
    fn return_ends_script() {
        let (mut env, state) = env_with_all_builtins();
        stub_file(&state, "/script", "echo 1\nreturn 3\necho 2\n");
        let result = run_source(&mut env, b". /script; echo $?", 1);
        assert_eq!(result, Continue(()));
        assert_stdout(&state, |stdout| assert_eq!(stdout, "1\n3\n"));
    }

    #[test]
    fn empty_script() {
        let (mut env, state) = env_with_all_builtins();
        stub_file(&state, "/empty", "");
        env.exit_status = ExitStatus(4);
        let result = main(&mut env, Field::dummies(["/empty"]));
        assert_eq!(result, Result::new(ExitStatus::SUCCESS));
    }

    #[test]
    fn file_not_found() {
        let (mut env, state) = env_with_all_builtins();
        let result = run_source(&mut env, b". /no/such/file", 1);
        assert_eq!(result, Break(Divert::Interrupt(None)));
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
        assert_stderr(&state, |stderr| {
            assert_eq!(stderr, "sh: .: cannot read /no/such/file: No such file or directory\n")
        });
    }
}
