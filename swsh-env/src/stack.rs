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

//! Runtime execution context stack
//!
//! The ["stack"](Stack) traces the state of execution context at runtime.
//! For example, when entering a subshell, the runner pushes `Frame::Subshell`
//! to the stack. By examining the stack, commands executed in the subshell can
//! detect that they are inside the subshell.
//!
//! The stack also records the line number of the command being executed,
//! which is the value of `$LINENO`.
//!
//! [`Stack::push`] returns a [`StackFrameGuard`] that allows re-borrowing the
//! `Stack`. [`Env::push_frame`] returns a [`EnvFrameGuard`] that implements
//! `DerefMut<Target = Env>`. Either guard pops the frame when dropped.

use crate::Env;
use crate::semantics::ExitStatus;
use std::ops::Deref;
use std::ops::DerefMut;

/// Element of runtime execution context stack
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Frame {
    /// For, while, or until loop
    Loop,

    /// Subshell
    Subshell,

    /// Context where the `ErrExit` [option](crate::option::Option) is ignored
    ///
    /// This frame is pushed when executing negated commands, the condition part
    /// of and-or lists and the `if`, `while`, and `until` commands.
    Condition,

    /// Built-in utility
    Builtin {
        /// Name of the built-in
        name: String,

        /// Whether the utility acts as a special built-in
        ///
        /// This value determines whether an error in the built-in interrupts
        /// the shell.
        is_special: bool,
    },

    /// Function call
    Function {
        /// Name of the function
        name: String,
    },

    /// Script read by the `.` built-in
    DotScript,

    /// Trap
    Trap {
        /// Condition that triggered the trap
        condition: crate::trap::Condition,
        /// Exit status saved just before entering the trap
        previous_exit_status: ExitStatus,
    },
}

/// Runtime execution context stack
///
/// You can access the inner vector of the stack via the `Deref` implementation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stack {
    inner: Vec<Frame>,
    /// Line number of the command being executed
    pub line_no: u64,
}

impl Deref for Stack {
    type Target = Vec<Frame>;
    fn deref(&self) -> &Vec<Frame> {
        &self.inner
    }
}

impl From<Vec<Frame>> for Stack {
    fn from(vec: Vec<Frame>) -> Self {
        Stack {
            inner: vec,
            line_no: 0,
        }
    }
}

/// RAII-style guard that makes sure a stack frame is popped properly
///
/// The guard object is created by [`Stack::push`].
#[derive(Debug)]
#[must_use = "The frame is popped when the guard is dropped"]
pub struct StackFrameGuard<'a> {
    stack: &'a mut Stack,
}

impl Stack {
    /// Pushes a new frame to the stack.
    ///
    /// This function returns a frame guard that will pop the frame when dropped.
    #[inline]
    pub fn push(&mut self, frame: Frame) -> StackFrameGuard<'_> {
        self.inner.push(frame);
        StackFrameGuard { stack: self }
    }

    /// Returns the number of enclosing loops.
    ///
    /// This function returns the number of lexically enclosing `for`, `while`,
    /// and `until` loops in the current execution environment. That is, the
    /// result is the count of `Frame::Loop`s pushed after the last
    /// `Frame::Subshell` or `Frame::Function`.
    ///
    /// The function stops counting when `max_count` is reached. Pass
    /// `usize::MAX` to count all loops.
    #[must_use]
    pub fn loop_count(&self, max_count: usize) -> usize {
        self.inner
            .iter()
            .rev()
            .take_while(|&frame| !matches!(frame, Frame::Subshell | Frame::Function { .. }))
            .filter(|&frame| frame == &Frame::Loop)
            .take(max_count)
            .count()
    }

    /// Tests whether the `ErrExit` option should be ignored in the current
    /// context.
    #[must_use]
    pub fn is_in_condition(&self) -> bool {
        self.inner.contains(&Frame::Condition)
    }

    /// Tests whether a function or script is running, from which the
    /// `return` built-in can return.
    #[must_use]
    pub fn is_returnable(&self) -> bool {
        self.inner
            .iter()
            .any(|frame| matches!(frame, Frame::Function { .. } | Frame::DotScript))
    }

    /// Returns the innermost built-in frame, if any.
    #[must_use]
    pub fn current_builtin(&self) -> Option<(&str, bool)> {
        self.inner.iter().rev().find_map(|frame| match frame {
            Frame::Builtin { name, is_special } => Some((name.as_str(), *is_special)),
            _ => None,
        })
    }
}

impl Drop for StackFrameGuard<'_> {
    fn drop(&mut self) {
        self.stack.inner.pop();
    }
}

impl Deref for StackFrameGuard<'_> {
    type Target = Stack;
    fn deref(&self) -> &Stack {
        self.stack
    }
}

impl DerefMut for StackFrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut Stack {
        self.stack
    }
}

/// RAII-style guard that makes sure a stack frame is popped properly
///
/// The guard object is created by [`Env::push_frame`].
#[derive(Debug)]
#[must_use = "The frame is popped when the guard is dropped"]
pub struct EnvFrameGuard<'a> {
    env: &'a mut Env,
}

impl Env {
    /// Pushes a new frame to the runtime execution context stack.
    ///
    /// This function is equivalent to `self.stack.push(frame)`, but returns an
    /// `EnvFrameGuard` that allows re-borrowing the `Env`.
    #[inline]
    pub fn push_frame(&mut self, frame: Frame) -> EnvFrameGuard<'_> {
        self.stack.inner.push(frame);
        EnvFrameGuard { env: self }
    }
}

impl Drop for EnvFrameGuard<'_> {
    fn drop(&mut self) {
        self.env.stack.inner.pop();
    }
}

impl Deref for EnvFrameGuard<'_> {
    type Target = Env;
    fn deref(&self) -> &Env {
        self.env
    }
}

impl DerefMut for EnvFrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut Env {
        self.env
    }
}
