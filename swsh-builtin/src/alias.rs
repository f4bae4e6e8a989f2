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

//! Alias built-in
//!
//! The **`alias`** built-in defines aliases or prints alias definitions.
//!
//! # Synopsis
//!
//! ```sh
//! alias [name[=value]...]
//! ```
//!
//! # Description
//!
//! An operand of the form `name=value` defines an alias. An operand without
//! `=` prints the definition of the alias in the form `name=value`, with the
//! value quoted so that the output can be read back by the shell. Without
//! operands, all aliases are printed in alphabetical order.
//!
//! # Exit status
//!
//! Zero unless an operand names an undefined alias or an invalid alias name
//! is given, in which case the exit status is one.

use crate::common::{output, report_failure, syntax_error};
use crate::common::syntax::parse_arguments;
use itertools::Itertools as _;
use std::rc::Rc;
use swsh_env::Env;
use swsh_env::builtin::Result;
use swsh_env::semantics::{ExitStatus, Field};
use swsh_quote::quoted;
use swsh_syntax::alias::{Alias, HashEntry, is_alias_name};

fn definition(alias: &Alias) -> String {
    format!("{}={}\n", alias.name, quoted(&alias.replacement))
}

/// Entry point of the alias built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let operands = match parse_arguments(&[], args) {
        Ok((_, operands)) => operands,
        Err(error) => return syntax_error(env, &error.to_string()),
    };

    if operands.is_empty() {
        let text = env
            .aliases
            .iter()
            .map(|entry| &entry.0)
            .sorted_by(|a, b| a.name.cmp(&b.name))
            .map(|alias| definition(alias))
            .collect::<String>();
        return output(env, &text);
    }

    let mut result = Result::new(ExitStatus::SUCCESS);
    for Field { value, .. } in operands {
        if let Some((name, replacement)) = value.split_once('=') {
            if !is_alias_name(name) {
                result = report_failure(env, &format!("{name}: invalid alias name"));
                continue;
            }
            log::debug!(target: "swsh::lex", "defining alias {name}");
            Rc::make_mut(&mut env.aliases)
                .replace(HashEntry::new(name.to_owned(), replacement.to_owned()));
        } else {
            let text = env.aliases.get(value.as_str()).map(|entry| definition(&entry.0));
            result = match text {
                Some(text) => merge(result, output(env, &text)),
                None => report_failure(env, &format!("{value}: no such alias")),
            };
        }
    }
    result
}

/// Keeps a failure in `previous` unless `next` also fails.
fn merge(previous: Result, next: Result) -> Result {
    if next.exit_status() == ExitStatus::SUCCESS {
        previous
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::env_with_all_builtins;
    use swsh_env_test_helper::{assert_stderr, assert_stdout};
    use swsh_semantics::run_source;

    #[test]
    fn defines_alias() {
        let (mut env, _) = env_with_all_builtins();
        let result = main(&mut env, Field::dummies(["foo=bar baz"]));
        assert_eq!(result, Result::new(ExitStatus::SUCCESS));
        let alias = &env.aliases.get("foo").unwrap().0;
        assert_eq!(alias.replacement, "bar baz");
    }

    #[test]
    fn prints_all_aliases_sorted() {
        let (mut env, state) = env_with_all_builtins();
        run_source(&mut env, b"alias b='echo 2' a=x\nalias", 1);
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "a=x\nb='echo 2'\n"));
    }

    #[test]
    fn prints_single_alias() {
        let (mut env, state) = env_with_all_builtins();
        run_source(&mut env, b"alias ll='ls -l' la='ls -a'\nalias ll", 1);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "ll='ls -l'\n"));
    }

    #[test]
    fn undefined_alias_fails() {
        let (mut env, state) = env_with_all_builtins();
        run_source(&mut env, b"alias nosuch", 1);
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
        assert_stderr(&state, |stderr| assert_eq!(stderr, "sh: alias: nosuch: no such alias\n"));
    }

    #[test]
    fn alias_is_used_on_next_line() {
        let (mut env, state) = env_with_all_builtins();
        run_source(&mut env, b"alias g='echo hi'\ng\n", 1);
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "hi\n"));
    }

    #[test]
    fn invalid_name() {
        let (mut env, _) = env_with_all_builtins();
        let result = main(&mut env, Field::dummies(["a/b=c"]));
        assert_eq!(result.exit_status(), ExitStatus::FAILURE);
        assert!(env.aliases.is_empty());
    }
}
