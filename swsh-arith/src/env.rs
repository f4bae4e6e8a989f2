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

//! Variable access from the evaluator

use std::collections::HashMap;
use std::convert::Infallible;

/// Interface for accessing variables during evaluation
pub trait Env {
    /// Error that may occur when assigning a variable
    type AssignVariableError;

    /// Returns the value of the variable, or `None` if it is not set.
    ///
    /// This function takes `&mut self` because reading some variables
    /// changes the environment, as with `$RANDOM`.
    fn get_variable(&mut self, name: &str) -> Option<String>;

    /// Assigns a value to the variable.
    fn assign_variable(
        &mut self,
        name: &str,
        value: String,
    ) -> Result<(), Self::AssignVariableError>;
}

impl Env for HashMap<String, String> {
    type AssignVariableError = Infallible;

    fn get_variable(&mut self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }

    fn assign_variable(&mut self, name: &str, value: String) -> Result<(), Infallible> {
        self.insert(name.to_owned(), value);
        Ok(())
    }
}
