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

//! Items for shell variables
//!
//! A [`Variable`] is a named parameter that can be assigned and exported. It is
//! defined in a context of a variable set. A [`VariableSet`] is a stack of
//! contexts that can be pushed and popped. Each context has a map of
//! name-variable pairs that effectively manages the variables.
//!
//! # Variable sets and contexts
//!
//! The variable set is a component of the shell environment
//! ([`Env`](crate::Env)). It contains a non-empty stack of contexts. The first
//! context in the stack is called the _base context_, and it is always
//! present. Other contexts can be pushed and popped on a last-in-first-out
//! basis.
//!
//! Each context is a map of name-variable pairs. Variables in a context hide
//! those with the same name in lower contexts. You cannot access such hidden
//! variables until the hiding variables are removed or the context containing
//! them is popped.
//!
//! There are two types of [`Context`]s: regular and volatile. A regular context
//! is the base context or a _function layer_ pushed for a function call; it
//! has its own positional parameters. A volatile context holds temporary
//! variables assigned for the duration of a built-in or function call.
//!
//! Variables of all contexts are kept in a single hash map keyed by name and
//! hashed with [`PjwHasher`].
//!
//! ## Context guards
//!
//! The push functions return a guard that pops the context when dropped.
//! Implementing `Deref` and `DerefMut`, the guard allows access to the
//! borrowed variable set or environment.
//!
//! # Examples
//!
//! ```
//! use swsh_env::variable::{Context, Scope, VariableSet};
//! let mut set = VariableSet::new();
//!
//! // Define a variable in the base context
//! let mut var = set.get_or_new("foo", Scope::Global);
//! var.assign("hello").unwrap();
//!
//! // Push a new context
//! let mut guard = set.push_context(Context::default());
//!
//! // The variable is still visible
//! assert_eq!(guard.get("foo").unwrap().value.as_deref(), Some("hello"));
//!
//! // Defining a new variable in the new context hides the previous variable
//! let mut var = guard.get_or_new("foo", Scope::Local);
//! var.assign("world").unwrap();
//! assert_eq!(guard.get("foo").unwrap().value.as_deref(), Some("world"));
//!
//! // Pop the context
//! drop(guard);
//!
//! // The previous variable is visible again
//! assert_eq!(set.get("foo").unwrap().value.as_deref(), Some("hello"));
//! ```

use crate::option::OptionSet;
use std::collections::HashMap;
use std::collections::hash_map::Entry::{Occupied, Vacant};
use std::ffi::CString;
use std::iter::FusedIterator;
use swsh_syntax::bytes::to_c_string;
use thiserror::Error;

mod constants;
mod guard;
mod hasher;
mod main;
mod quirk;

pub use self::constants::*;
pub use self::guard::{ContextGuard, EnvContextGuard};
pub use self::hasher::{PjwBuildHasher, PjwHasher};
pub use self::main::{AssignError, Variable, VariableRefMut};
pub use self::quirk::Quirk;

#[derive(Clone, Debug, Eq, PartialEq)]
struct VariableInContext {
    variable: Variable,
    context_index: usize,
}

/// Variable context
///
/// This enum defines the type of a context. The context type affects the
/// behavior of variable assignment. A regular context may have positional
/// parameters. A volatile context is used for holding temporary variables
/// when executing a built-in or function.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Context {
    /// Context for normal assignments.
    ///
    /// The base context is a regular context. Every function invocation also
    /// creates a regular context for local assignments and positional
    /// parameters.
    Regular {
        /// Values of positional parameters
        positional_params: Vec<String>,
        /// Shell options saved by `local -`
        ///
        /// The options are restored when the context is popped from an
        /// environment.
        saved_options: Option<OptionSet>,
    },

    /// Context for temporary assignments.
    Volatile,
}

impl Default for Context {
    fn default() -> Self {
        Context::Regular {
            positional_params: Vec::new(),
            saved_options: None,
        }
    }
}

impl Context {
    /// Creates a regular context with the given positional parameters.
    #[must_use]
    pub fn with_params(positional_params: Vec<String>) -> Self {
        Context::Regular {
            positional_params,
            saved_options: None,
        }
    }
}

/// Collection of variables.
///
/// See the [module documentation](self) for details.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariableSet {
    /// Hash map containing all variables.
    ///
    /// The value of a hash map entry is a stack of variables defined in
    /// contexts, sorted in the ascending order of the context index.
    all_variables: HashMap<String, Vec<VariableInContext>, PjwBuildHasher>,

    /// Stack of contexts.
    ///
    /// The stack can never be empty since the base context is always the first
    /// item.
    contexts: Vec<Context>,
}

impl Default for VariableSet {
    fn default() -> Self {
        VariableSet {
            all_variables: Default::default(),
            contexts: vec![Context::default()],
        }
    }
}

/// Choice of a context in which a variable is assigned or searched for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    /// The variable is assigned in the context that already has it, or the
    /// base context.
    Global,
    /// The variable is assigned in the topmost regular context.
    Local,
    /// The variable is assigned in the topmost volatile context.
    Volatile,
}

/// Error that occurs when unsetting a read-only variable
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{name}: cannot unset a read-only variable")]
pub struct UnsetError {
    /// Variable name.
    pub name: String,
}

/// Iterator of variables
///
/// [`VariableSet::iter`] returns this iterator.
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    inner: std::collections::hash_map::Iter<'a, String, Vec<VariableInContext>>,
    min_context_index: usize,
}

/// Replaces bytes that cannot appear in a variable name with `_`.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .enumerate()
        .map(|(i, c)| {
            if c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl VariableSet {
    /// Creates an empty variable set.
    #[must_use]
    pub fn new() -> VariableSet {
        Default::default()
    }

    /// Gets a reference to the variable with the specified name.
    ///
    /// If variables with the same name are defined in multiple contexts, the
    /// one in the topmost context is considered _visible_ and returned.
    ///
    /// You cannot retrieve positional parameters using this function.
    /// See [`positional_params`](Self::positional_params).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Variable> {
        Some(&self.all_variables.get(name)?.last()?.variable)
    }

    /// Computes the index of the topmost regular context.
    fn index_of_topmost_regular_context(contexts: &[Context]) -> usize {
        contexts
            .iter()
            .rposition(|context| matches!(context, Context::Regular { .. }))
            .unwrap_or(0)
    }

    /// Computes the index of the context that matches the specified scope.
    fn index_of_context(scope: Scope, contexts: &[Context]) -> usize {
        match scope {
            Scope::Global => 0,
            Scope::Local => Self::index_of_topmost_regular_context(contexts),
            Scope::Volatile => Self::index_of_topmost_regular_context(contexts) + 1,
        }
    }

    /// Returns a reference to the variable with the specified name in the
    /// scope.
    ///
    /// - If the scope is `Global`, the variable is searched for in all contexts
    ///   from the topmost to the base context.
    /// - If the scope is `Local`, the variable is searched for from the topmost
    ///   to the topmost regular context.
    /// - If the scope is `Volatile`, the variable is searched for in volatile
    ///   contexts above the topmost regular context.
    #[must_use]
    pub fn get_scoped(&self, name: &str, scope: Scope) -> Option<&Variable> {
        let index = Self::index_of_context(scope, &self.contexts);
        self.all_variables
            .get(name)?
            .last()
            .filter(|vic| vic.context_index >= index)
            .map(|vic| &vic.variable)
    }

    /// Gets a mutable reference to the variable with the specified name.
    ///
    /// This method searches for a variable of the specified name, and returns
    /// a mutable reference to it if found. Otherwise, this method creates a new
    /// variable and returns a mutable reference to it. The `scope` parameter
    /// determines the context the variable is searched for or created in:
    ///
    /// - If the scope is `Global`, an existing variable is searched for like
    ///   [`get`](Self::get). If a variable is found in a [regular] context, the
    ///   variable is returned. If there is no variable, a new defaulted
    ///   variable is created in the base context and returned.
    ///   - If a variable is in a [volatile] context, this method removes the
    ///     variable from the volatile context and continues searching for a
    ///     variable in a lower context. If a variable is found in a regular
    ///     context, it is replaced with the variable removed from the volatile
    ///     context. Otherwise, the removed variable is moved to the base
    ///     context. In either case, the moved variable is returned.
    /// - If the scope is `Local`, the behavior is the same as `Global` except
    ///   that any contexts below the topmost [regular] context are ignored.
    /// - If the scope is `Volatile`, the topmost context should be
    ///   [volatile]. If a variable is found in the topmost context, the
    ///   variable is returned. If a variable is found in a lower context, the
    ///   variable is cloned to the topmost context and returned. If there is
    ///   no variable, a new defaulted variable is created in the topmost
    ///   context and returned.
    ///
    /// This method does not apply the [`AllExport`](crate::option::AllExport)
    /// option. Use [`Env::get_or_create_variable`](crate::Env::get_or_create_variable)
    /// to get the option applied automatically.
    ///
    /// [regular]: Context::Regular
    /// [volatile]: Context::Volatile
    #[inline]
    pub fn get_or_new<S: Into<String>>(&mut self, name: S, scope: Scope) -> VariableRefMut<'_> {
        self.get_or_new_impl(name.into(), scope)
    }

    fn get_or_new_impl(&mut self, name: String, scope: Scope) -> VariableRefMut<'_> {
        let stack = match self.all_variables.entry(name) {
            Vacant(vacant) => vacant.insert(Vec::new()),
            Occupied(occupied) => occupied.into_mut(),
        };
        let context_index = match scope {
            Scope::Global => 0,
            Scope::Local => Self::index_of_topmost_regular_context(&self.contexts),
            Scope::Volatile => self.contexts.len() - 1,
        };

        match scope {
            Scope::Global | Scope::Local => 'branch: {
                let mut removed_volatile_variable = None;

                // Search the stack for a variable to return, and add one if not found.
                // A variable in a volatile context is moved to the target context.
                while let Some(var) = stack.last_mut() {
                    if var.context_index < context_index {
                        break;
                    }
                    match self.contexts[var.context_index] {
                        Context::Regular { .. } => {
                            if let Some(removed_volatile_variable) = removed_volatile_variable {
                                var.variable = removed_volatile_variable;
                            }
                            break 'branch;
                        }
                        Context::Volatile => {
                            if let Some(removed) = stack.pop() {
                                removed_volatile_variable.get_or_insert(removed.variable);
                            }
                        }
                    }
                }

                stack.push(VariableInContext {
                    variable: removed_volatile_variable.unwrap_or_default(),
                    context_index,
                });
            }

            Scope::Volatile => {
                debug_assert_eq!(
                    self.contexts[context_index],
                    Context::Volatile,
                    "no volatile context to store the variable",
                );
                let variable = match stack.last() {
                    Some(var) if var.context_index == context_index => None,
                    Some(var) => Some(var.variable.clone()),
                    None => Some(Variable::default()),
                };
                if let Some(variable) = variable {
                    stack.push(VariableInContext {
                        variable,
                        context_index,
                    });
                }
            }
        }

        let last = stack.len() - 1;
        VariableRefMut::from(&mut stack[last].variable)
    }

    /// Panics if the set contains any variable with an invalid context index.
    #[cfg(test)]
    fn assert_normalized(&self) {
        for context in self.all_variables.values() {
            for vars in context.windows(2) {
                assert!(
                    vars[0].context_index < vars[1].context_index,
                    "invalid context index: {vars:?}",
                );
            }
            if let Some(last) = context.last() {
                assert!(
                    last.context_index < self.contexts.len(),
                    "invalid context index: {last:?}",
                );
            }
        }
    }

    /// Returns the value of the variable, applying its quirk.
    ///
    /// `line_no` is used for the `LINENO` variable. Returns `None` if the
    /// variable is not set.
    #[must_use]
    pub fn value(&self, name: &str, line_no: u64) -> Option<String> {
        self.get(name)?.expand(line_no)
    }

    /// Unsets a variable.
    ///
    /// Temporary copies of the variable in volatile contexts are removed.
    /// Then, if the visible variable is in the base context, it is removed.
    /// If it is in a function layer, the variable record is kept with no
    /// value so that it keeps hiding any variable of the same name in lower
    /// contexts.
    ///
    /// If successful, the return value is the previously visible variable.
    /// If any of the affected variables is read-only, this function fails
    /// and does not change anything.
    pub fn unset(&mut self, name: &str) -> Result<Option<Variable>, UnsetError> {
        let contexts = &self.contexts;
        let Some(stack) = self.all_variables.get_mut(name) else {
            return Ok(None);
        };

        let regular = stack
            .iter()
            .rposition(|vic| matches!(contexts[vic.context_index], Context::Regular { .. }));
        let start = regular.unwrap_or(0);
        if stack[start..].iter().any(|vic| vic.variable.is_read_only) {
            return Err(UnsetError {
                name: name.to_owned(),
            });
        }

        let old = stack.last().map(|vic| vic.variable.clone());
        match regular {
            Some(index) if stack[index].context_index != 0 => {
                stack.truncate(index + 1);
                let variable = &mut stack[index].variable;
                variable.value = None;
                variable.quirk = None;
            }
            _ => stack.truncate(start),
        }
        if stack.is_empty() {
            self.all_variables.remove(name);
        }
        Ok(old)
    }

    /// Returns an iterator of variables.
    ///
    /// The `scope` parameter chooses variables returned by the iterator:
    ///
    /// - `Global`: all variables
    /// - `Local`: variables in the topmost [regular] context or above.
    /// - `Volatile`: variables above the topmost [regular] context
    ///
    /// In all cases, the iterator ignores variables hidden by another.
    ///
    /// The order of iterated variables is unspecified.
    ///
    /// [regular]: Context::Regular
    pub fn iter(&self, scope: Scope) -> Iter<'_> {
        Iter {
            inner: self.all_variables.iter(),
            min_context_index: Self::index_of_context(scope, &self.contexts),
        }
    }

    /// Returns environment variables in a new vector of C string.
    ///
    /// The result contains `name=value` strings of the exported variables
    /// that have a value. Strings containing a null byte are dropped.
    #[must_use]
    pub fn env_c_strings(&self) -> Vec<CString> {
        self.all_variables
            .iter()
            .filter_map(|(name, vars)| {
                let var = &vars.last()?.variable;
                let value = var.value.as_ref().filter(|_| var.is_exported)?;
                to_c_string(&format!("{name}={value}")).ok()
            })
            .collect()
    }

    /// Imports environment variables from an iterator.
    ///
    /// The argument iterator must yield name-value pairs. Invalid characters
    /// in a name are replaced with `_`. `IFS` is never imported. The
    /// variables are exported.
    ///
    /// If an assignment fails because of an existing read-only variable, this
    /// function ignores the error and continues to the next assignment.
    pub fn extend_env<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in vars {
            let name = sanitize_name(name.as_ref());
            if name == IFS {
                continue;
            }
            let mut var = self.get_or_new(name, Scope::Global);
            if var.assign(value).is_ok() {
                var.export(true)
            }
        }
    }

    /// Initializes default variables.
    ///
    /// This function assigns the following variables to `self`:
    ///
    /// - `IFS=' \t\n'`
    /// - `OPTIND=1`
    /// - `PS1='$ '`
    /// - `PS2='> '`
    /// - `PS4='+ '`
    /// - `LINENO` (with no value, but has its `quirk` set to [`Quirk::LineNumber`])
    /// - `RANDOM` (with [`Quirk::Random`] seeded with `random_seed`)
    ///
    /// Variables imported from the environment are not overwritten, except
    /// `IFS`. This function ignores any assignment errors.
    pub fn init(&mut self, random_seed: u32) {
        self.get_or_new(IFS, Scope::Global)
            .assign(IFS_INITIAL_VALUE)
            .ok();

        const VARIABLES: &[(&str, &str)] = &[
            (OPTIND, OPTIND_INITIAL_VALUE),
            (PS1, PS1_INITIAL_VALUE_NON_ROOT),
            (PS2, PS2_INITIAL_VALUE),
            (PS4, PS4_INITIAL_VALUE),
        ];
        for &(name, value) in VARIABLES {
            if self.get(name).is_none() {
                self.get_or_new(name, Scope::Global).assign(value).ok();
            }
        }

        self.get_or_new(LINENO, Scope::Global)
            .set_quirk(Some(Quirk::LineNumber));
        self.get_or_new(RANDOM, Scope::Global)
            .set_quirk(Some(Quirk::random(random_seed)));
    }

    fn topmost_regular_context(&self) -> Option<(&Vec<String>, &Option<OptionSet>)> {
        self.contexts.iter().rev().find_map(|context| match context {
            Context::Regular {
                positional_params,
                saved_options,
            } => Some((positional_params, saved_options)),
            Context::Volatile => None,
        })
    }

    /// Returns a reference to the positional parameters.
    ///
    /// Every regular context has its own positional parameters, and volatile
    /// contexts cannot have positional parameters. This function returns
    /// those of the topmost regular context.
    #[must_use]
    pub fn positional_params(&self) -> &[String] {
        self.topmost_regular_context()
            .map_or(&[], |(params, _)| params.as_slice())
    }

    /// Returns a mutable reference to the positional parameters.
    ///
    /// See [`positional_params`](Self::positional_params).
    pub fn positional_params_mut(&mut self) -> &mut Vec<String> {
        self.contexts
            .iter_mut()
            .rev()
            .find_map(|context| match context {
                Context::Regular {
                    positional_params, ..
                } => Some(positional_params),
                Context::Volatile => None,
            })
            .expect("base context has gone")
    }

    /// Whether a function layer is on the stack.
    ///
    /// Local variables can only be defined in a function layer.
    #[must_use]
    pub fn is_in_function(&self) -> bool {
        Self::index_of_topmost_regular_context(&self.contexts) > 0
    }

    /// Saves the shell options in the topmost function layer.
    ///
    /// The options will be restored when the layer is popped from the
    /// environment. Only the first snapshot in a layer is kept. This
    /// function does nothing outside a function layer.
    pub fn save_options(&mut self, options: OptionSet) {
        let index = Self::index_of_topmost_regular_context(&self.contexts);
        if index == 0 {
            return;
        }
        if let Context::Regular { saved_options, .. } = &mut self.contexts[index] {
            saved_options.get_or_insert(options);
        }
    }

    fn push_context_impl(&mut self, context: Context) {
        self.contexts.push(context);
    }

    /// Pops the topmost context.
    ///
    /// Returns the options saved in the context, if any.
    fn pop_context_impl(&mut self) -> Option<OptionSet> {
        debug_assert!(self.contexts.len() > 1, "cannot pop the base context");
        if self.contexts.len() <= 1 {
            return None;
        }
        let context = self.contexts.pop();
        let len = self.contexts.len();
        self.all_variables.retain(|_, stack| {
            if stack.last().is_some_and(|vic| vic.context_index >= len) {
                stack.pop();
            }
            !stack.is_empty()
        });
        match context {
            Some(Context::Regular { saved_options, .. }) => saved_options,
            _ => None,
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Variable);

    fn next(&mut self) -> Option<(&'a str, &'a Variable)> {
        loop {
            let next = self.inner.next()?;
            if let Some(variable) = next.1.last() {
                if variable.context_index >= self.min_context_index {
                    return Some((next.0, &variable.variable));
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (_min, max) = self.inner.size_hint();
        (0, max)
    }
}

impl FusedIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of<'a>(set: &'a VariableSet, name: &str) -> Option<&'a str> {
        set.get(name)?.value.as_deref()
    }

    #[test]
    fn new_variable_in_global_scope() {
        let mut set = VariableSet::new();
        set.push_context_impl(Context::default());
        set.push_context_impl(Context::Volatile);

        set.get_or_new("foo", Scope::Global).assign("VALUE").unwrap();
        set.assert_normalized();
        set.pop_context_impl();
        set.pop_context_impl();
        assert_eq!(value_of(&set, "foo"), Some("VALUE"));
    }

    #[test]
    fn assignment_updates_the_layer_that_has_the_variable() {
        let mut set = VariableSet::new();
        set.get_or_new("x", Scope::Global).assign("outer").unwrap();
        set.push_context_impl(Context::default());
        set.get_or_new("x", Scope::Local).assign("local").unwrap();
        set.push_context_impl(Context::default());

        // An inner function without its own `x` updates the caller's local.
        set.get_or_new("x", Scope::Global).assign("changed").unwrap();
        set.assert_normalized();
        set.pop_context_impl();
        assert_eq!(value_of(&set, "x"), Some("changed"));
        set.pop_context_impl();
        assert_eq!(value_of(&set, "x"), Some("outer"));
    }

    #[test]
    fn volatile_variable_is_temporary() {
        let mut set = VariableSet::new();
        set.get_or_new("x", Scope::Global).assign("1").unwrap();
        set.push_context_impl(Context::Volatile);
        let mut var = set.get_or_new("x", Scope::Volatile);
        assert_eq!(var.value.as_deref(), Some("1"));
        var.assign("2").unwrap();
        var.export(true);
        assert_eq!(value_of(&set, "x"), Some("2"));
        assert_eq!(set.get_scoped("x", Scope::Volatile).unwrap().value.as_deref(), Some("2"));
        set.pop_context_impl();
        assert_eq!(value_of(&set, "x"), Some("1"));
        assert!(!set.get("x").unwrap().is_exported);
    }

    #[test]
    fn lowering_volatile_variable_to_base_context() {
        let mut set = VariableSet::new();
        set.push_context_impl(Context::Volatile);
        set.get_or_new("x", Scope::Volatile).assign("v").unwrap();
        let var = set.get_or_new("x", Scope::Global);
        assert_eq!(var.value.as_deref(), Some("v"));
        set.assert_normalized();
        set.pop_context_impl();
        assert_eq!(value_of(&set, "x"), Some("v"));
    }

    #[test]
    fn unset_in_base_context_removes_variable() {
        let mut set = VariableSet::new();
        set.get_or_new("x", Scope::Global).assign("1").unwrap();
        let old = set.unset("x").unwrap();
        assert_eq!(old.unwrap().value.as_deref(), Some("1"));
        assert_eq!(set.get("x"), None);
        assert_eq!(set.unset("x"), Ok(None));
    }

    #[test]
    fn unset_in_function_layer_keeps_record() {
        let mut set = VariableSet::new();
        set.get_or_new("x", Scope::Global).assign("global").unwrap();
        set.push_context_impl(Context::default());
        set.get_or_new("x", Scope::Local).assign("local").unwrap();
        set.unset("x").unwrap();

        let var = set.get("x").unwrap();
        assert_eq!(var.value, None);
        assert!(!var.is_set());
        set.pop_context_impl();
        assert_eq!(value_of(&set, "x"), Some("global"));
    }

    #[test]
    fn unset_read_only_variable() {
        let mut set = VariableSet::new();
        let mut var = set.get_or_new("x", Scope::Global);
        var.assign("1").unwrap();
        var.make_read_only();
        assert_eq!(
            set.unset("x"),
            Err(UnsetError {
                name: "x".to_string()
            })
        );
        assert_eq!(value_of(&set, "x"), Some("1"));
    }

    #[test]
    fn unset_removes_quirk() {
        let mut set = VariableSet::new();
        set.init(1);
        assert!(set.value(LINENO, 3).is_some());
        set.unset(LINENO).unwrap();
        assert_eq!(set.value(LINENO, 3), None);
    }

    #[test]
    fn positional_params_per_regular_context() {
        let mut set = VariableSet::new();
        set.positional_params_mut().push("a".to_string());
        set.push_context_impl(Context::with_params(vec!["x".to_string(), "y".to_string()]));
        set.push_context_impl(Context::Volatile);
        assert_eq!(set.positional_params(), ["x", "y"]);
        set.pop_context_impl();
        set.pop_context_impl();
        assert_eq!(set.positional_params(), ["a"]);
    }

    #[test]
    fn saved_options_are_returned_on_pop() {
        let mut set = VariableSet::new();
        let options = OptionSet::default();
        set.save_options(options);
        set.push_context_impl(Context::default());
        assert!(set.is_in_function());
        set.save_options(options);
        assert_eq!(set.pop_context_impl(), Some(options));
        assert!(!set.is_in_function());
    }

    #[test]
    fn iter_scopes() {
        let mut set = VariableSet::new();
        set.get_or_new("g", Scope::Global).assign("").unwrap();
        set.push_context_impl(Context::default());
        set.get_or_new("l", Scope::Local).assign("").unwrap();
        set.push_context_impl(Context::Volatile);
        set.get_or_new("v", Scope::Volatile).assign("").unwrap();

        let mut names: Vec<_> = set.iter(Scope::Global).map(|(name, _)| name).collect();
        names.sort_unstable();
        assert_eq!(names, ["g", "l", "v"]);
        let mut names: Vec<_> = set.iter(Scope::Local).map(|(name, _)| name).collect();
        names.sort_unstable();
        assert_eq!(names, ["l", "v"]);
        let names: Vec<_> = set.iter(Scope::Volatile).map(|(name, _)| name).collect();
        assert_eq!(names, ["v"]);
    }

    #[test]
    fn env_import_and_export() {
        let mut set = VariableSet::new();
        set.extend_env([("PATH", "/bin"), ("IFS", "x"), ("A-B", "1"), ("9Z", "2")]);
        assert_eq!(value_of(&set, "PATH"), Some("/bin"));
        assert_eq!(set.get("IFS"), None);
        assert_eq!(value_of(&set, "A_B"), Some("1"));
        assert_eq!(value_of(&set, "_Z"), Some("2"));

        set.get_or_new("local", Scope::Global).assign("no").unwrap();
        let mut env = set.env_c_strings();
        env.sort();
        assert_eq!(
            env,
            [
                CString::new("A_B=1").unwrap(),
                CString::new("PATH=/bin").unwrap(),
                CString::new("_Z=2").unwrap(),
            ]
        );
    }

    #[test]
    fn init_keeps_imported_prompts() {
        let mut set = VariableSet::new();
        set.extend_env([("PS1", "% ")]);
        set.init(0);
        assert_eq!(value_of(&set, "PS1"), Some("% "));
        assert_eq!(value_of(&set, "PS2"), Some("> "));
        assert_eq!(value_of(&set, "IFS"), Some(" \t\n"));
        assert_eq!(value_of(&set, "OPTIND"), Some("1"));
        assert_eq!(set.value(LINENO, 12).as_deref(), Some("12"));
        let random: u32 = set.value(RANDOM, 0).unwrap().parse().unwrap();
        assert!(random <= 65535);
    }
}
