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

use super::{Context, Input, Result};
use crate::Env;
use crate::variable::{PS1, PS2};
use std::cell::RefCell;

/// `Input` decorator that shows a command prompt.
///
/// Before reading a line, an interactive shell prints the value of the `PS1`
/// variable if the line is the first line of a command, and `PS2` otherwise.
/// The prompt is printed to the standard error as is, without escape
/// processing. A non-interactive shell prints no prompt.
#[derive(Clone, Debug)]
#[must_use = "Prompter does nothing unless used by a parser"]
pub struct Prompter<'a, 'b, T> {
    inner: T,
    env: &'a RefCell<&'b mut Env>,
}

impl<'a, 'b, T> Prompter<'a, 'b, T> {
    /// Creates a new `Prompter` decorator.
    pub fn new(inner: T, env: &'a RefCell<&'b mut Env>) -> Self {
        Self { inner, env }
    }
}

impl<T: Input> Input for Prompter<'_, '_, T> {
    fn next_line(&mut self, context: &Context) -> Result {
        {
            let env = &mut **self.env.borrow_mut();
            if env.is_interactive() {
                let name = if context.is_first_line() { PS1 } else { PS2 };
                let prompt = env
                    .variables
                    .value(name, env.stack.line_no)
                    .unwrap_or_default();
                env.system.print_error(&prompt);
            }
        }
        self.inner.next_line(context)
    }
}
