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

//! Unalias built-in
//!
//! The **`unalias`** built-in removes alias definitions.
//!
//! # Synopsis
//!
//! ```sh
//! unalias name...
//! unalias -a
//! ```
//!
//! With the `-a` option, all aliases are removed. Otherwise, the aliases
//! named by the operands are removed. It is an error to name an alias that
//! is not defined; the other operands are still processed.
//!
//! # Exit status
//!
//! Zero if successful, one if an alias is not found, and two on a usage
//! error.

use crate::common::syntax::{OptionSpec, parse_arguments};
use crate::common::{report_failure, syntax_error};
use std::rc::Rc;
use swsh_env::Env;
use swsh_env::builtin::Result;
use swsh_env::semantics::{ExitStatus, Field};

const OPTION_SPECS: &[OptionSpec] = &[OptionSpec::new('a')];

/// Entry point of the unalias built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let (options, operands) = match parse_arguments(OPTION_SPECS, args) {
        Ok(parse) => parse,
        Err(error) => return syntax_error(env, &error.to_string()),
    };

    if !options.is_empty() {
        if !operands.is_empty() {
            return syntax_error(env, "operands cannot be used with -a");
        }
        Rc::make_mut(&mut env.aliases).clear();
        return Result::default();
    }
    if operands.is_empty() {
        return syntax_error(env, "missing operand");
    }

    let mut result = Result::new(ExitStatus::SUCCESS);
    for operand in operands {
        if !Rc::make_mut(&mut env.aliases).remove(operand.value.as_str()) {
            result = report_failure(env, &format!("{}: no such alias", operand.value));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::env_with_all_builtins;
    use swsh_env_test_helper::assert_stderr;
    use swsh_syntax::alias::HashEntry;

    fn define(env: &mut Env, names: &[&str]) {
        let aliases = Rc::make_mut(&mut env.aliases);
        for &name in names {
            aliases.insert(HashEntry::new(name.to_string(), "x".to_string()));
        }
    }

    #[test]
    fn removes_named_aliases() {
        let (mut env, _) = env_with_all_builtins();
        define(&mut env, &["a", "b", "c"]);
        let result = main(&mut env, Field::dummies(["a", "c"]));
        assert_eq!(result, Result::new(ExitStatus::SUCCESS));
        assert_eq!(env.aliases.len(), 1);
        assert!(env.aliases.get("b").is_some());
    }

    #[test]
    fn removes_all_aliases() {
        let (mut env, _) = env_with_all_builtins();
        define(&mut env, &["a", "b"]);
        let result = main(&mut env, Field::dummies(["-a"]));
        assert_eq!(result, Result::new(ExitStatus::SUCCESS));
        assert!(env.aliases.is_empty());
    }

    #[test]
    fn missing_alias() {
        let (mut env, state) = env_with_all_builtins();
        define(&mut env, &["a"]);
        let mut env = env.push_frame(swsh_env::stack::Frame::Builtin {
            name: "unalias".to_string(),
            is_special: false,
        });
        let result = main(&mut env, Field::dummies(["x", "a"]));
        assert_eq!(result.exit_status(), ExitStatus::FAILURE);
        assert!(env.aliases.is_empty());
        assert_stderr(&state, |stderr| assert_eq!(stderr, "sh: unalias: x: no such alias\n"));
    }

    #[test]
    fn no_operands() {
        let (mut env, _) = env_with_all_builtins();
        let result = main(&mut env, vec![]);
        assert_eq!(result.exit_status(), ExitStatus::ERROR);
    }
}
