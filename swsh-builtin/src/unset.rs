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

//! Unset built-in
//!
//! The **`unset`** built-in removes variables or functions.
//!
//! # Synopsis
//!
//! ```sh
//! unset [-f|-v] name...
//! ```
//!
//! With `-f`, the operands name functions to remove. With `-v` or without
//! options, they name variables. Naming a variable or function that does not
//! exist is not an error.
//!
//! # Errors
//!
//! A read-only variable cannot be unset. The other operands are still
//! processed.
//!
//! # Exit status
//!
//! Zero if successful, one if a read-only variable is named, and two on a
//! usage error.

use crate::common::syntax::{OptionSpec, parse_arguments};
use crate::common::{report_failure, syntax_error};
use swsh_env::Env;
use swsh_env::builtin::Result;
use swsh_env::semantics::{ExitStatus, Field};

const OPTION_SPECS: &[OptionSpec] = &[OptionSpec::new('f'), OptionSpec::new('v')];

/// What the operands name
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Variables,
    Functions,
}

/// Entry point of the unset built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let (options, operands) = match parse_arguments(OPTION_SPECS, args) {
        Ok(parse) => parse,
        Err(error) => return syntax_error(env, &error.to_string()),
    };
    let mode = match options.last().map(|option| option.spec.get_short()) {
        Some('f') => Mode::Functions,
        _ => Mode::Variables,
    };

    let mut result = Result::new(ExitStatus::SUCCESS);
    for Field { value: name, .. } in operands {
        match mode {
            Mode::Variables => {
                if let Err(error) = env.variables.unset(&name) {
                    result = report_failure(env, &error.to_string());
                }
            }
            Mode::Functions => {
                env.functions.remove(name.as_str());
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::env_with_all_builtins;
    use std::rc::Rc;
    use swsh_env::function::HashEntry;
    use swsh_env::stack::Frame;
    use swsh_env::variable::Scope;
    use swsh_env_test_helper::assert_stderr;
    use swsh_syntax::syntax::{Node, NodeKind};

    #[test]
    fn unsets_variables() {
        let (mut env, _) = env_with_all_builtins();
        env.variables.get_or_new("a", Scope::Global).assign("1").unwrap();
        env.variables.get_or_new("b", Scope::Global).assign("2").unwrap();
        let result = main(&mut env, Field::dummies(["a", "b", "c"]));
        assert_eq!(result, Result::new(ExitStatus::SUCCESS));
        assert_eq!(env.variables.get("a"), None);
        assert_eq!(env.variables.get("b"), None);
    }

    #[test]
    fn unsets_functions() {
        let (mut env, _) = env_with_all_builtins();
        let body = Rc::new(Node::new(NodeKind::Term(vec![]), 1));
        env.functions.insert(HashEntry::new("f".to_string(), body, 1));
        env.variables.get_or_new("f", Scope::Global).assign("1").unwrap();
        let result = main(&mut env, Field::dummies(["-f", "f"]));
        assert_eq!(result, Result::new(ExitStatus::SUCCESS));
        assert!(env.functions.get("f").is_none());
        assert!(env.variables.get("f").is_some());
    }

    #[test]
    fn read_only_variable_is_kept() {
        let (mut env, state) = env_with_all_builtins();
        let mut x = env.variables.get_or_new("x", Scope::Global);
        x.assign("1").unwrap();
        x.make_read_only();
        env.variables.get_or_new("y", Scope::Global).assign("2").unwrap();
        let mut env = env.push_frame(Frame::Builtin {
            name: "unset".to_string(),
            is_special: true,
        });
        let result = main(&mut env, Field::dummies(["x", "y"]));
        assert_eq!(result.exit_status(), ExitStatus::FAILURE);
        assert!(result.is_aborting());
        assert_eq!(env.variables.get("x").unwrap().value.as_deref(), Some("1"));
        assert_eq!(env.variables.get("y"), None);
        assert_stderr(&state, |stderr| {
            assert_eq!(stderr, "sh: unset: x: cannot unset a read-only variable\n")
        });
    }
}
