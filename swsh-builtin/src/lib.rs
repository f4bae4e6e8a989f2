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

//! Implementation of the shell built-in utilities.
//!
//! Each built-in utility is implemented in the submodule named after the
//! utility. The submodule contains the `main` function that implements the
//! built-in utility. The module documentation for each submodule describes
//! the specification of the built-in utility.
//!
//! The [`common`] module provides common functions that are used for
//! implementing built-in utilities.
//!
//! # Stack
//!
//! Many built-ins in this crate use [`Stack::current_builtin`] to obtain the
//! command word that invoked the built-in. It is used to prefix error
//! messages and to decide whether an error interrupts the shell. For the
//! built-ins to work correctly, the [stack](Env::stack) should contain a
//! [built-in frame](Frame::Builtin), which the simple command executor of
//! `swsh_semantics` pushes.

pub mod alias;
pub mod r#break;
pub mod cd;
pub mod colon;
pub mod common;
pub mod r#continue;
pub mod eval;
pub mod exec;
pub mod exit;
pub mod export;
pub mod r#false;
pub mod getopts;
pub mod local;
pub mod pwd;
pub mod read;
pub mod readonly;
pub mod r#return;
pub mod set;
pub mod shift;
pub mod source;
pub mod trap;
pub mod r#true;
pub mod typeset;
pub mod unalias;
pub mod unset;

#[cfg(doc)]
use swsh_env::Env;
#[doc(no_inline)]
pub use swsh_env::builtin::*;
#[cfg(doc)]
use swsh_env::stack::{Frame, Stack};

use Type::{Regular, Special};

/// Array of all the implemented built-in utilities.
///
/// The array items are ordered alphabetically.
pub const BUILTINS: &[(&str, Builtin)] = &[
    (
        ".",
        Builtin {
            r#type: Special,
            execute: source::main,
        },
    ),
    (
        ":",
        Builtin {
            r#type: Special,
            execute: colon::main,
        },
    ),
    (
        "alias",
        Builtin {
            r#type: Regular,
            execute: alias::main,
        },
    ),
    (
        "break",
        Builtin {
            r#type: Special,
            execute: r#break::main,
        },
    ),
    (
        "cd",
        Builtin {
            r#type: Regular,
            execute: cd::main,
        },
    ),
    (
        "continue",
        Builtin {
            r#type: Special,
            execute: r#continue::main,
        },
    ),
    (
        "eval",
        Builtin {
            r#type: Special,
            execute: eval::main,
        },
    ),
    (
        "exec",
        Builtin {
            r#type: Special,
            execute: exec::main,
        },
    ),
    (
        "exit",
        Builtin {
            r#type: Special,
            execute: exit::main,
        },
    ),
    (
        "export",
        Builtin {
            r#type: Special,
            execute: export::main,
        },
    ),
    (
        "false",
        Builtin {
            r#type: Regular,
            execute: r#false::main,
        },
    ),
    (
        "getopts",
        Builtin {
            r#type: Regular,
            execute: getopts::main,
        },
    ),
    (
        "local",
        Builtin {
            r#type: Regular,
            execute: local::main,
        },
    ),
    (
        "pwd",
        Builtin {
            r#type: Regular,
            execute: pwd::main,
        },
    ),
    (
        "read",
        Builtin {
            r#type: Regular,
            execute: read::main,
        },
    ),
    (
        "readonly",
        Builtin {
            r#type: Special,
            execute: readonly::main,
        },
    ),
    (
        "return",
        Builtin {
            r#type: Special,
            execute: r#return::main,
        },
    ),
    (
        "set",
        Builtin {
            r#type: Special,
            execute: set::main,
        },
    ),
    (
        "shift",
        Builtin {
            r#type: Special,
            execute: shift::main,
        },
    ),
    (
        "trap",
        Builtin {
            r#type: Special,
            execute: trap::main,
        },
    ),
    (
        "true",
        Builtin {
            r#type: Regular,
            execute: r#true::main,
        },
    ),
    (
        "unalias",
        Builtin {
            r#type: Regular,
            execute: unalias::main,
        },
    ),
    (
        "unset",
        Builtin {
            r#type: Special,
            execute: unset::main,
        },
    ),
];
