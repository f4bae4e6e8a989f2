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

//! Helper items for printing expansion results
//!
//! When the `xtrace` [shell option](swsh_env::option) is on, the shell
//! traces simple commands after expanding them. For each command, the shell
//! prints a line to the standard error containing an expansion of `$PS4`
//! followed by the assignments and the command words.
//!
//! [`XTrace`] accumulates the expanded strings until they are printed. It
//! is no use to collect them when the option is off, so create an `XTrace`
//! with [`XTrace::from_options`].

use crate::Handle;
use crate::expansion::expand_text;
use swsh_env::Env;
use swsh_env::io::Fd;
use swsh_env::option::{Off, On, OptionSet, XTrace as XTraceOption};
use swsh_env::variable::PS4;
use swsh_quote::quote;
use swsh_syntax::bytes::encode;

/// Expands `$PS4`.
///
/// The `xtrace` option is turned off during the expansion so that a command
/// substitution in the value is not traced recursively.
fn expand_ps4(env: &mut Env) -> String {
    let line_no = env.stack.line_no;
    let value = env.variables.value(PS4, line_no).unwrap_or_default();
    env.options.set(XTraceOption, Off);
    let result = expand_text(env, &value, line_no);
    env.options.set(XTraceOption, On);
    match result {
        Ok(expansion) => expansion,
        Err(error) => {
            _ = error.handle(env);
            value
        }
    }
}

/// Collection of string buffers that accumulate expanded strings
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct XTrace {
    assigns: String,
    words: String,
}

impl XTrace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new trace buffer if the `xtrace` option is on.
    #[must_use]
    pub fn from_options(options: &OptionSet) -> Option<Self> {
        options.is_on(XTraceOption).then(Self::new)
    }

    /// Adds an expanded assignment.
    pub fn push_assign(&mut self, name: &str, value: &str) {
        self.assigns.push_str(name);
        self.assigns.push('=');
        self.assigns.push_str(&quote(value));
        self.assigns.push(' ');
    }

    /// Adds an expanded command word.
    pub fn push_word(&mut self, word: &str) {
        self.words.push_str(&quote(word));
        self.words.push(' ');
    }

    /// Returns the line to be printed, without `$PS4`.
    #[must_use]
    pub fn line(&self) -> String {
        let mut line = format!("{}{}", self.assigns, self.words);
        if line.ends_with(' ') {
            line.pop();
        }
        line.push('\n');
        line
    }

    /// Prints the trace to the standard error.
    ///
    /// Nothing is printed if no assignments or words have been added.
    pub fn print(self, env: &mut Env) {
        if self.assigns.is_empty() && self.words.is_empty() {
            return;
        }
        let ps4 = expand_ps4(env);
        let message = format!("{ps4}{}", self.line());
        env.system.write_all(Fd::STDERR, &encode(&message)).ok();
    }
}

/// Convenience function for printing a trace if any.
pub fn print(env: &mut Env, xtrace: Option<XTrace>) {
    if let Some(xtrace) = xtrace {
        xtrace.print(env);
    }
}
