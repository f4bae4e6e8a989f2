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

//! Command-line argument syntax parser
//!
//! This module parses arguments that follow the POSIX Utility Syntax
//! Guidelines into options and operands. Options are single letters that
//! may be grouped after one hyphen (`-ab`). An option that takes an argument
//! consumes the rest of the argument or the next one (`-ofoo` or `-o foo`).
//! The first argument that is not an option, or the argument following
//! `--`, starts the operands. A lone `-` is an operand.
//!
//! ```
//! # use swsh_builtin::common::syntax::*;
//! let specs = &[OptionSpec::new('a'), OptionSpec::new('o').argument()];
//! let args = Field::dummies(["-ao", "x", "--", "-a", "foo"]);
//! let (options, operands) = parse_arguments(specs, args).unwrap();
//! assert_eq!(options.len(), 2);
//! assert_eq!(options[0].spec.get_short(), 'a');
//! assert_eq!(options[1].argument, Some(Field::dummy("x")));
//! assert_eq!(operands, Field::dummies(["-a", "foo"]));
//! ```

use thiserror::Error;

#[doc(no_inline)]
pub use swsh_env::semantics::Field;

/// Specification of an option
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OptionSpec {
    short: char,
    takes_argument: bool,
}

impl OptionSpec {
    /// Creates an option spec with the short name.
    #[must_use]
    pub const fn new(short: char) -> Self {
        OptionSpec {
            short,
            takes_argument: false,
        }
    }

    /// Makes the option take an argument.
    #[must_use]
    pub const fn argument(mut self) -> Self {
        self.takes_argument = true;
        self
    }

    /// Returns the short name.
    #[must_use]
    pub const fn get_short(&self) -> char {
        self.short
    }
}

/// Option found in the arguments
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OptionOccurrence<'a> {
    /// Spec of the option
    pub spec: &'a OptionSpec,
    /// Argument of the option, if the option takes one
    pub argument: Option<Field>,
}

/// Error in argument parsing
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ParseError {
    /// The argument contains an option that is not in the specs.
    #[error("-{0}: unknown option")]
    UnknownOption(char),
    /// The option requires an argument, but none is given.
    #[error("-{0}: missing option argument")]
    MissingOptionArgument(char),
}

/// Parses the arguments into options and operands.
pub fn parse_arguments(
    specs: &[OptionSpec],
    args: Vec<Field>,
) -> Result<(Vec<OptionOccurrence<'_>>, Vec<Field>), ParseError> {
    let mut options = Vec::new();
    let mut args = args.into_iter().peekable();

    while let Some(arg) = args.next_if(|arg| arg.value.starts_with('-') && arg.value != "-") {
        if arg.value == "--" {
            break;
        }

        let mut chars = arg.value[1..].char_indices();
        while let Some((index, c)) = chars.next() {
            let spec = specs
                .iter()
                .find(|spec| spec.short == c)
                .ok_or(ParseError::UnknownOption(c))?;
            if !spec.takes_argument {
                options.push(OptionOccurrence {
                    spec,
                    argument: None,
                });
                continue;
            }

            let rest = &arg.value[1 + index + c.len_utf8()..];
            let argument = if rest.is_empty() {
                args.next().ok_or(ParseError::MissingOptionArgument(c))?
            } else {
                Field {
                    value: rest.to_owned(),
                    line_no: arg.line_no,
                }
            };
            options.push(OptionOccurrence {
                spec,
                argument: Some(argument),
            });
            break;
        }
    }

    Ok((options, args.collect()))
}
