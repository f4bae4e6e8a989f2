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

//! Common part of the export and readonly built-ins
//!
//! Both built-ins take operands of the form `name` or `name=value`. The
//! value, if any, is assigned first and then the attribute is set. Without
//! operands, or with the `-p` option, the variables that have the attribute
//! are printed as commands that would recreate them.

use crate::common::syntax::{OptionSpec, parse_arguments};
use crate::common::{output, report_failure, syntax_error};
use itertools::Itertools as _;
use std::fmt::Write as _;
use swsh_env::Env;
use swsh_env::builtin::Result;
use swsh_env::semantics::{ExitStatus, Field};
use swsh_env::variable::{Scope, Variable};
use swsh_quote::quoted;
use swsh_syntax::marker::is_name;

const OPTION_SPECS: &[OptionSpec] = &[OptionSpec::new('p')];

/// Attribute set by the built-in
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Attribute {
    Export,
    ReadOnly,
}

impl Attribute {
    fn command_name(self) -> &'static str {
        match self {
            Attribute::Export => "export",
            Attribute::ReadOnly => "readonly",
        }
    }

    fn test(self, variable: &Variable) -> bool {
        match self {
            Attribute::Export => variable.is_exported,
            Attribute::ReadOnly => variable.is_read_only,
        }
    }
}

fn print(env: &mut Env, attribute: Attribute) -> Result {
    let line_no = env.stack.line_no;
    let command = attribute.command_name();
    let text = env
        .variables
        .iter(Scope::Global)
        .filter(|(_, variable)| attribute.test(variable))
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .fold(String::new(), |mut text, (name, variable)| {
            let _ = match variable.expand(line_no) {
                Some(value) => writeln!(text, "{command} {name}={}", quoted(&value)),
                None => writeln!(text, "{command} {name}"),
            };
            text
        });
    output(env, &text)
}

/// Splits an operand into the name and the optional value.
pub fn split_operand(operand: &str) -> (&str, Option<&str>) {
    match operand.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (operand, None),
    }
}

/// Performs the export or readonly built-in.
pub fn main(env: &mut Env, args: Vec<Field>, attribute: Attribute) -> Result {
    let (options, operands) = match parse_arguments(OPTION_SPECS, args) {
        Ok(parse) => parse,
        Err(error) => return syntax_error(env, &error.to_string()),
    };
    if operands.is_empty() {
        return print(env, attribute);
    }
    if !options.is_empty() {
        return syntax_error(env, "-p cannot be used with operands");
    }

    let mut result = Result::new(ExitStatus::SUCCESS);
    for operand in &operands {
        let (name, value) = split_operand(&operand.value);
        if !is_name(name.as_bytes()) {
            result = report_failure(env, &format!("{name}: invalid variable name"));
            continue;
        }

        let mut variable = env.get_or_create_variable(name, Scope::Global);
        let assigned = match value {
            Some(value) => variable.assign(value).is_ok(),
            None => true,
        };
        if assigned {
            match attribute {
                Attribute::Export => variable.export(true),
                Attribute::ReadOnly => variable.make_read_only(),
            }
        } else {
            result = report_failure(env, &format!("{name}: cannot assign to a read-only variable"));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splitting_operands() {
        assert_eq!(split_operand("a"), ("a", None));
        assert_eq!(split_operand("a="), ("a", Some("")));
        assert_eq!(split_operand("a=b=c"), ("a", Some("b=c")));
    }
}
