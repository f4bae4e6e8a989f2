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

//! This crate contains utility functions for use in tests that interact with
//! the shell environment ([`swsh_env::Env`]).
//!
//! The built-ins defined here are minimal stand-ins for the real ones. They
//! let the tests of the semantics crate run commands without depending on
//! the built-in crate.

use itertools::Itertools as _;
use std::cell::RefCell;
use std::ops::ControlFlow::Break;
use std::rc::Rc;
use swsh_env::Env;
use swsh_env::builtin::{Builtin, Result, Type};
use swsh_env::io::Fd;
use swsh_env::semantics::{Divert, ExitStatus, Field};
use swsh_env::system::r#virtual::{INode, SystemState, VirtualSystem};
use swsh_env::system::System as _;
use swsh_env::variable::Scope;
use swsh_syntax::bytes::encode;

/// Creates an environment with a virtual system.
///
/// Returns the environment and a reference to the state of the virtual
/// system, which can be used to inspect files and signals.
#[must_use]
pub fn virtual_env() -> (Env, Rc<RefCell<SystemState>>) {
    let system = VirtualSystem::new();
    let state = Rc::clone(&system.state);
    (Env::with_system(Box::new(system)), state)
}

/// Creates a regular file with the content in the virtual file system.
pub fn stub_file(state: &RefCell<SystemState>, path: &str, content: &str) {
    state
        .borrow_mut()
        .file_system
        .save(path, Rc::new(RefCell::new(INode::new(content))))
        .unwrap();
}

/// Helper function for asserting on the content of /dev/stdout
///
/// The argument function `f` is called with the content of /dev/stdout as a
/// string slice.
///
/// # Example
///
/// ```
/// # use swsh_env::io::Fd;
/// # use swsh_env::system::System;
/// # use swsh_env_test_helper::{assert_stdout, virtual_env};
/// let (mut env, state) = virtual_env();
/// env.system.write(Fd::STDOUT, b"Hello, world!\n").unwrap();
/// assert_stdout(&state, |stdout| assert_eq!(stdout, "Hello, world!\n"));
/// ```
pub fn assert_stdout<F, T>(state: &RefCell<SystemState>, f: F) -> T
where
    F: FnOnce(&str) -> T,
{
    f(&state.borrow().file_content("/dev/stdout"))
}

/// Helper function for asserting on the content of /dev/stderr
///
/// This function is analogous to [`assert_stdout`].
pub fn assert_stderr<F, T>(state: &RefCell<SystemState>, f: F) -> T
where
    F: FnOnce(&str) -> T,
{
    f(&state.borrow().file_content("/dev/stderr"))
}

fn echo_builtin_main(env: &mut Env, args: Vec<Field>) -> Result {
    let fields = args.iter().map(|f| &f.value).format(" ");
    let message = format!("{fields}\n");
    match env.system.write_all(Fd::STDOUT, &encode(&message)) {
        Ok(_) => ExitStatus::SUCCESS.into(),
        Err(_) => ExitStatus::FAILURE.into(),
    }
}

/// Returns a minimal implementation of the `echo` built-in.
///
/// The built-in prints the arguments separated by spaces and followed by a
/// newline. No options are recognized.
pub fn echo_builtin() -> Builtin {
    Builtin {
        r#type: Type::Regular,
        execute: echo_builtin_main,
    }
}

fn return_builtin_main(env: &mut Env, args: Vec<Field>) -> Result {
    let mut i = args.iter().peekable();
    let no_return = i.next_if(|field| field.value == "-n").is_some();
    let exit_status = i.next().map(|arg| ExitStatus(arg.value.parse().unwrap()));
    if no_return {
        Result::new(exit_status.unwrap_or(env.exit_status))
    } else {
        Result::with_exit_status_and_divert(env.exit_status, Break(Divert::Return(exit_status)))
    }
}

/// Returns a minimal implementation of the `return` built-in.
///
/// With the `-n` option, the built-in only sets the exit status without
/// returning.
pub fn return_builtin() -> Builtin {
    Builtin {
        r#type: Type::Special,
        execute: return_builtin_main,
    }
}

fn exit_builtin_main(env: &mut Env, args: Vec<Field>) -> Result {
    let exit_status = args
        .first()
        .map(|field| ExitStatus(field.value.parse().unwrap_or(2)));
    Result::with_exit_status_and_divert(env.exit_status, Break(Divert::Exit(exit_status)))
}

/// Returns a minimal implementation of the `exit` built-in.
pub fn exit_builtin() -> Builtin {
    Builtin {
        r#type: Type::Special,
        execute: exit_builtin_main,
    }
}

fn break_builtin_main(_env: &mut Env, args: Vec<Field>) -> Result {
    let count = args.first().map_or(1, |field| field.value.parse().unwrap());
    Result::with_exit_status_and_divert(
        ExitStatus::SUCCESS,
        Break(Divert::Break { count: count - 1 }),
    )
}

/// Returns a minimal implementation of the `break` built-in.
pub fn break_builtin() -> Builtin {
    Builtin {
        r#type: Type::Special,
        execute: break_builtin_main,
    }
}

fn continue_builtin_main(_env: &mut Env, args: Vec<Field>) -> Result {
    let count = args.first().map_or(1, |field| field.value.parse().unwrap());
    Result::with_exit_status_and_divert(
        ExitStatus::SUCCESS,
        Break(Divert::Continue { count: count - 1 }),
    )
}

/// Returns a minimal implementation of the `continue` built-in.
pub fn continue_builtin() -> Builtin {
    Builtin {
        r#type: Type::Special,
        execute: continue_builtin_main,
    }
}

fn local_builtin_main(env: &mut Env, args: Vec<Field>) -> Result {
    for Field { value, .. } in args {
        let (name, value) = match value.split_once('=') {
            Some((name, value)) => (name.to_owned(), Some(value.to_owned())),
            None => (value, None),
        };
        let mut variable = env.variables.get_or_new(name, Scope::Local);
        if let Some(value) = value {
            if variable.assign(value).is_err() {
                return ExitStatus::FAILURE.into();
            }
        }
    }
    Result::default()
}

/// Returns a minimal implementation of the `local` built-in.
///
/// Each argument of the form `name=value` defines a local variable with the
/// value. A bare `name` defines a local variable without changing the value.
pub fn local_builtin() -> Builtin {
    Builtin {
        r#type: Type::Regular,
        execute: local_builtin_main,
    }
}

fn cat_builtin_main(env: &mut Env, _args: Vec<Field>) -> Result {
    let copy = env
        .system
        .read_all(Fd::STDIN)
        .and_then(|content| env.system.write_all(Fd::STDOUT, &content));
    match copy {
        Ok(_) => ExitStatus::SUCCESS.into(),
        Err(_) => ExitStatus::FAILURE.into(),
    }
}

/// Returns a minimal implementation of the `cat` built-in.
///
/// The built-in copies the standard input to the standard output. Operands
/// are ignored.
pub fn cat_builtin() -> Builtin {
    Builtin {
        r#type: Type::Regular,
        execute: cat_builtin_main,
    }
}

/// Creates an environment with all the built-ins of this crate.
#[must_use]
pub fn env_with_builtins() -> (Env, Rc<RefCell<SystemState>>) {
    let (mut env, state) = virtual_env();
    env.builtins.insert("break", break_builtin());
    env.builtins.insert("cat", cat_builtin());
    env.builtins.insert("continue", continue_builtin());
    env.builtins.insert("echo", echo_builtin());
    env.builtins.insert("exit", exit_builtin());
    env.builtins.insert("local", local_builtin());
    env.builtins.insert("return", return_builtin());
    (env, state)
}
