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

use super::Context;
use super::VariableSet;
use crate::Env;
use std::ops::Deref;
use std::ops::DerefMut;

/// RAII-style guard for temporarily retaining a variable context.
///
/// The guard object is created by [`VariableSet::push_context`].
#[derive(Debug)]
#[must_use = "You must retain ContextGuard to keep the context alive"]
pub struct ContextGuard<'a> {
    stack: &'a mut VariableSet,
}

impl VariableSet {
    /// Pushes a new empty context to this variable set.
    ///
    /// This function returns a scope guard that will pop the context when dropped.
    /// Options saved in the context are discarded when it is popped.
    #[inline]
    pub fn push_context(&mut self, context: Context) -> ContextGuard<'_> {
        self.push_context_impl(context);
        ContextGuard { stack: self }
    }

    /// Pops the topmost context from the variable set.
    #[inline]
    pub fn pop_context(guard: ContextGuard<'_>) {
        drop(guard)
    }
}

impl Drop for ContextGuard<'_> {
    #[inline]
    fn drop(&mut self) {
        self.stack.pop_context_impl();
    }
}

impl Deref for ContextGuard<'_> {
    type Target = VariableSet;
    #[inline]
    fn deref(&self) -> &VariableSet {
        self.stack
    }
}

impl DerefMut for ContextGuard<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut VariableSet {
        self.stack
    }
}

/// RAII-style guard that makes sure a context is popped properly
///
/// The guard object is created by [`Env::push_context`]. When the guard is
/// dropped, the context is popped and the shell options saved in it by
/// `local -` are restored.
#[derive(Debug)]
#[must_use = "The context is popped when the guard is dropped"]
pub struct EnvContextGuard<'a> {
    env: &'a mut Env,
}

impl Env {
    /// Pushes a new context to the variable set.
    ///
    /// This function is equivalent to `self.variables.push_context(context)`,
    /// but returns an `EnvContextGuard` that allows re-borrowing the `Env`.
    #[inline]
    pub fn push_context(&mut self, context: Context) -> EnvContextGuard<'_> {
        self.variables.push_context_impl(context);
        EnvContextGuard { env: self }
    }

    /// Pops the topmost context from the variable set.
    #[inline]
    pub fn pop_context(guard: EnvContextGuard<'_>) {
        drop(guard)
    }
}

impl Drop for EnvContextGuard<'_> {
    #[inline]
    fn drop(&mut self) {
        if let Some(options) = self.env.variables.pop_context_impl() {
            self.env.options = options;
        }
    }
}

impl Deref for EnvContextGuard<'_> {
    type Target = Env;
    #[inline]
    fn deref(&self) -> &Env {
        self.env
    }
}

impl DerefMut for EnvContextGuard<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Env {
        self.env
    }
}
