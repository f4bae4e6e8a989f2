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

//! Option parsing model of the getopts built-in

use std::num::NonZeroUsize;
use thiserror::Error;

/// Type of an option character
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OptionType {
    /// Option without an argument
    NoArgument,
    /// Option that takes an argument
    TakesArgument,
    /// Option not in the option string
    Unknown,
}

/// Option string without the leading colon
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct OptionString<'a>(pub &'a str);

impl OptionString<'_> {
    /// Returns the type of the option character.
    #[must_use]
    pub fn judge(&self, option: char) -> OptionType {
        if option == ':' {
            return OptionType::Unknown;
        }
        let mut chars = self.0.chars();
        match chars.find(|&c| c == option) {
            None => OptionType::Unknown,
            Some(_) if chars.next() == Some(':') => OptionType::TakesArgument,
            Some(_) => OptionType::NoArgument,
        }
    }
}

/// Error found in an option
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
pub enum Error {
    #[error("invalid option")]
    UnknownOption,
    #[error("missing argument")]
    MissingArgument,
}

/// Option found in the arguments
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Occurrence {
    pub option: char,
    pub argument: Option<String>,
    pub error: Option<Error>,
}

/// Position of the next option to parse
///
/// Both indexes start from 1. The argument index counts the arguments and
/// the character index counts the characters after the leading hyphen.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Position {
    pub arg_index: NonZeroUsize,
    pub char_index: NonZeroUsize,
}

impl Position {
    /// Position at the start of the argument
    #[must_use]
    pub fn at_arg(arg_index: NonZeroUsize) -> Self {
        Position {
            arg_index,
            char_index: NonZeroUsize::MIN,
        }
    }

    /// Parses the value of `$OPTIND`.
    ///
    /// The value is either a single argument index or the argument and
    /// character indexes separated by a colon.
    #[must_use]
    pub fn parse(optind: &str) -> Option<Self> {
        let (arg_index, char_index) = optind.split_once(':').unwrap_or((optind, "1"));
        Some(Position {
            arg_index: arg_index.parse().ok()?,
            char_index: char_index.parse().ok()?,
        })
    }
}

/// Formats the position as the value of `$OPTIND`.
impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.char_index == NonZeroUsize::MIN {
            write!(f, "{}", self.arg_index)
        } else {
            write!(f, "{}:{}", self.arg_index, self.char_index)
        }
    }
}

/// Parses the option at `position` in the arguments.
///
/// Returns the option found, if any, and the position of the next option.
/// `None` means the options have ended, in which case the next position
/// points at the first operand.
#[must_use]
pub fn next(
    args: &[String],
    options: OptionString,
    position: Position,
) -> (Option<Occurrence>, Position) {
    let mut rest = args.iter().skip(position.arg_index.get() - 1);
    let end = (None, position);
    let Some(arg) = rest.next() else {
        return end;
    };
    let Some(chars) = arg.strip_prefix('-') else {
        return end;
    };
    if chars.is_empty() {
        return end;
    }
    if chars == "-" {
        return (None, Position::at_arg(position.arg_index.saturating_add(1)));
    }

    let mut chars = chars.chars().skip(position.char_index.get() - 1);
    let Some(option) = chars.next() else {
        return end;
    };
    let remainder = chars.collect::<String>();
    let same_arg = Position {
        arg_index: position.arg_index,
        char_index: position.char_index.saturating_add(1),
    };
    let next_arg = Position::at_arg(position.arg_index.saturating_add(1));
    let following = if remainder.is_empty() { next_arg } else { same_arg };

    let (argument, error, next) = match options.judge(option) {
        OptionType::NoArgument => (None, None, following),
        OptionType::Unknown => (None, Some(Error::UnknownOption), following),
        OptionType::TakesArgument if !remainder.is_empty() => (Some(remainder), None, next_arg),
        OptionType::TakesArgument => match rest.next() {
            Some(arg) => (
                Some(arg.clone()),
                None,
                Position::at_arg(position.arg_index.saturating_add(2)),
            ),
            None => (None, Some(Error::MissingArgument), next_arg),
        },
    };
    let occurrence = Occurrence {
        option,
        argument,
        error,
    };
    (Some(occurrence), next)
}
