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

//! Module that defines the main `Variable` type.

use super::Quirk;
use std::ops::Deref;
use thiserror::Error;

/// Definition of a variable.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Variable {
    /// Value of the variable.
    ///
    /// The value is `None` if the variable has been declared without
    /// assignment, or unset in a function layer.
    pub value: Option<String>,

    /// Special characteristics of the variable
    ///
    /// See [`Quirk`] and [`expand`](Self::expand) for details.
    pub quirk: Option<Quirk>,

    /// Whether this variable is exported or not.
    ///
    /// An exported variable is also referred to as an _environment variable_.
    pub is_exported: bool,

    /// Whether this variable is read-only or not.
    pub is_read_only: bool,
}

impl Variable {
    /// Creates a new variable from a string.
    ///
    /// The returned variable is neither exported nor read-only.
    #[must_use]
    pub fn new<S: Into<String>>(value: S) -> Self {
        Variable {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Sets the `is_exported` flag.
    ///
    /// This is a convenience function for doing `self.is_exported = true` in a
    /// method chain.
    #[inline]
    #[must_use]
    pub fn export(mut self) -> Self {
        self.is_exported = true;
        self
    }

    /// Makes the variable read-only.
    #[inline]
    #[must_use]
    pub fn make_read_only(mut self) -> Self {
        self.is_read_only = true;
        self
    }

    /// Whether the variable has a value.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.value.is_some() || self.quirk.is_some()
    }

    /// Returns the value of this variable, applying any quirk.
    ///
    /// If this variable has no [`Quirk`], this function just returns a copy
    /// of `self.value`. Otherwise, the effect of the quirk is applied.
    /// `line_no` is the line number of the command that is expanding the
    /// variable, which is the value of a [`Quirk::LineNumber`] variable.
    #[must_use]
    pub fn expand(&self, line_no: u64) -> Option<String> {
        match &self.quirk {
            None => self.value.clone(),
            Some(quirk) => Some(quirk.expand(line_no)),
        }
    }
}

/// Error that occurs when assigning to a read-only variable
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("cannot assign to a read-only variable")]
pub struct AssignError {
    /// Value that was being assigned
    pub new_value: String,
}

/// Managed mutable reference to a variable
///
/// A `VariableRefMut` is obtained from
/// [`VariableSet::get_or_new`](super::VariableSet::get_or_new). It refuses to
/// change the value of a read-only variable.
#[derive(Debug, Eq, PartialEq)]
pub struct VariableRefMut<'a>(&'a mut Variable);

impl<'a> From<&'a mut Variable> for VariableRefMut<'a> {
    fn from(variable: &'a mut Variable) -> Self {
        VariableRefMut(variable)
    }
}

impl Deref for VariableRefMut<'_> {
    type Target = Variable;
    fn deref(&self) -> &Variable {
        self.0
    }
}

impl VariableRefMut<'_> {
    /// Assigns a value to this variable.
    ///
    /// The quirk of the variable is removed. Returns the old value on
    /// success. Fails if the variable is read-only.
    pub fn assign<S: Into<String>>(&mut self, value: S) -> Result<Option<String>, AssignError> {
        let value = value.into();
        if self.0.is_read_only {
            return Err(AssignError { new_value: value });
        }
        self.0.quirk = None;
        Ok(self.0.value.replace(value))
    }

    /// Sets whether this variable is exported.
    pub fn export(&mut self, is_exported: bool) {
        self.0.is_exported = is_exported;
    }

    /// Makes this variable read-only.
    pub fn make_read_only(&mut self) {
        self.0.is_read_only = true;
    }

    /// Sets the quirk of this variable.
    ///
    /// This function ignores the read-only flag.
    pub fn set_quirk(&mut self, quirk: Option<Quirk>) {
        self.0.quirk = quirk;
    }
}
