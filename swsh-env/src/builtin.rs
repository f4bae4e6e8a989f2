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

//! Type definitions for built-in utilities.
//!
//! This module provides data types for defining built-in utilities.
//!
//! Note that concrete implementations of built-ins are not included in the
//! `swsh_env` crate. For implementations of specific built-ins like `set` and
//! `export`, see the `swsh_builtin` crate.

use crate::Env;
use crate::semantics::Divert;
use crate::semantics::ExitStatus;
use crate::semantics::Field;
use std::fmt::Debug;
use std::ops::ControlFlow::{self, Break, Continue};

/// Types of built-in utilities.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Type {
    /// Special built-in.
    ///
    /// Special built-in utilities are treated differently from regular built-ins.
    /// Especially, special built-ins are found in the first stage of command
    /// search and cannot be overridden by functions or external utilities. Many
    /// errors in special built-ins force the shell to exit, and variable
    /// assignments preceding a special built-in persist after it returns.
    Special,

    /// Regular built-in.
    ///
    /// Regular built-ins are found after functions in command search.
    Regular,
}

/// Result of built-in utility execution.
///
/// The result contains the exit status of the built-in and an optional
/// [`Divert`] that tells the caller to interrupt the normal flow of
/// execution, as is the case with `return` and `exit`. It also tells
/// whether the redirections of the command should stay in effect after the
/// built-in returns, which is the case with `exec`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Result {
    exit_status: ExitStatus,
    divert: crate::semantics::Result,
    retain_redirs: bool,
}

impl Result {
    /// Creates a new result with the exit status and no divert.
    #[must_use]
    pub const fn new(exit_status: ExitStatus) -> Self {
        Result {
            exit_status,
            divert: Continue(()),
            retain_redirs: false,
        }
    }

    /// Creates a new result with the exit status and divert.
    #[must_use]
    pub const fn with_exit_status_and_divert(
        exit_status: ExitStatus,
        divert: crate::semantics::Result,
    ) -> Self {
        Result {
            exit_status,
            divert,
            retain_redirs: false,
        }
    }

    /// Returns the exit status of this result.
    #[must_use]
    pub const fn exit_status(&self) -> ExitStatus {
        self.exit_status
    }

    /// Returns the divert of this result.
    #[must_use]
    pub const fn divert(&self) -> crate::semantics::Result {
        self.divert
    }

    /// Makes the redirections of the command stay in effect.
    pub fn retain_redirs(&mut self) {
        self.retain_redirs = true;
    }

    /// Whether the redirections of the command should stay in effect
    #[must_use]
    pub const fn should_retain_redirs(&self) -> bool {
        self.retain_redirs
    }

    /// Tests whether the divert is [`Divert::Exit`] or
    /// [`Divert::Interrupt`].
    #[must_use]
    pub fn is_aborting(&self) -> bool {
        matches!(self.divert, Break(Divert::Exit(_) | Divert::Interrupt(_)))
    }
}

impl Default for Result {
    /// Returns a result with [`ExitStatus::SUCCESS`] and no divert.
    fn default() -> Self {
        Self::new(ExitStatus::SUCCESS)
    }
}

impl From<ExitStatus> for Result {
    #[inline]
    fn from(exit_status: ExitStatus) -> Self {
        Self::new(exit_status)
    }
}

impl From<ControlFlow<Divert>> for Result {
    /// Converts a divert into a result with [`ExitStatus::SUCCESS`].
    fn from(divert: ControlFlow<Divert>) -> Self {
        Self::with_exit_status_and_divert(ExitStatus::SUCCESS, divert)
    }
}

/// Type of functions that implement the behavior of a built-in.
pub type Main = fn(&mut Env, Vec<Field>) -> Result;

/// Built-in utility definition.
#[derive(Clone, Copy)]
pub struct Builtin {
    /// Type of the built-in.
    pub r#type: Type,
    /// Function that implements the behavior of the built-in.
    pub execute: Main,
}

impl Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin")
            .field("type", &self.r#type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_result_is_success_without_divert() {
        let result = Result::default();
        assert_eq!(result.exit_status(), ExitStatus::SUCCESS);
        assert_eq!(result.divert(), Continue(()));
        assert!(!result.is_aborting());
        assert!(!result.should_retain_redirs());
    }

    #[test]
    fn retaining_redirs() {
        let mut result = Result::new(ExitStatus(1));
        result.retain_redirs();
        assert!(result.should_retain_redirs());
        assert_eq!(result.exit_status(), ExitStatus(1));
    }

    #[test]
    fn aborting_diverts() {
        let exit = Result::with_exit_status_and_divert(ExitStatus(3), Break(Divert::Exit(None)));
        assert!(exit.is_aborting());
        let r#return = Result::from(Break(Divert::Return(None)));
        assert!(!r#return.is_aborting());
        assert_eq!(r#return.exit_status(), ExitStatus::SUCCESS);
    }
}
