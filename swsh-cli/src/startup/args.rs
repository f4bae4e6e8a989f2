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

//! Command line argument parser for the shell

use std::iter::Peekable;
use std::str::FromStr as _;
use thiserror::Error;
#[cfg(doc)]
use swsh_env::Env;
use swsh_env::option::{FromStrError, Option as ShellOption, State, Stdin, parse_short};

/// Input to the main read-eval loop
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Source {
    /// Read from standard input (the `-s` option or no operand)
    #[default]
    Stdin,
    /// Read from a file (an operand without `-c` or `-s`)
    File { path: String },
    /// Read from a string (the `-c` option)
    String(String),
}

/// Configuration for starting the main read-eval loop
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Run {
    /// Input source
    pub source: Source,
    /// Shell options in the order specified
    pub options: Vec<(ShellOption, State)>,
    /// Value of [`Env::arg0`]
    pub arg0: String,
    /// Positional parameters
    pub positional_params: Vec<String>,
}

/// Parse result
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Parse {
    /// Runs the shell
    Run(Run),
    /// Prints help message and exit
    Help,
    /// Prints version information and exit
    Version,
}

/// Error in command line parsing
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// Short option that is not defined
    #[error("unknown option `-{0}`")]
    UnknownShortOption(char),

    /// Long option that is not defined
    #[error("unknown option `{0}`")]
    UnknownLongOption(String),

    /// Operand of `-o` or `+o` that does not name a shell option
    #[error("`{name}`: {error}")]
    InvalidOptionName {
        /// Operand given to the option
        name: String,
        /// Reason why the operand is rejected
        error: FromStrError,
    },

    /// Option missing an argument
    #[error("option `{0}` missing an argument")]
    MissingOptionArgument(String),

    /// The `-c` option in the `+` form
    #[error("cannot negate option `c`")]
    UnnegatableCommandString,

    /// The `-c` option without a command string
    #[error("missing command string for `-c`")]
    MissingCommandString,

    /// The `-c` and `-s` options used together
    #[error("cannot specify both `-c` and `-s`")]
    ConflictingSources,
}

/// Parses command line arguments.
///
/// The first item of `args` is the name of the shell, which becomes
/// [`Env::arg0`] unless overridden by the name operand of `-c` or the script
/// path.
pub fn parse<I, S>(args: I) -> Result<Parse, Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into).peekable();
    let mut result = Run::default();
    let mut command_string = false;

    if let Some(arg0) = args.next() {
        result.arg0 = arg0;
    }

    // Parse options
    while let Some(arg) = args.next_if(|arg| is_option(arg)) {
        match arg.as_str() {
            "-" | "--" => break,
            "--help" => return Ok(Parse::Help),
            "--version" => return Ok(Parse::Version),
            _ if arg.starts_with("--") || arg.starts_with("++") => {
                return Err(Error::UnknownLongOption(arg));
            }
            _ => parse_short_options(&arg, &mut args, &mut result.options, &mut command_string)?,
        }
    }

    let stdin = result
        .options
        .iter()
        .rev()
        .find(|&&(option, _)| option == Stdin)
        .is_some_and(|&(_, state)| state == State::On);

    // Parse operands
    if command_string {
        if stdin {
            return Err(Error::ConflictingSources);
        }
        let command = args.next().ok_or(Error::MissingCommandString)?;
        result.source = Source::String(command);
        if let Some(name) = args.next() {
            result.arg0 = name;
        }
    } else if !stdin {
        if let Some(operand) = args.next() {
            result.arg0 = operand.clone();
            result.source = Source::File { path: operand };
        }
    }
    result.positional_params = args.collect();

    Ok(Parse::Run(result))
}

/// Tests if the argument is an option or option separator.
fn is_option(arg: &str) -> bool {
    (arg.starts_with('-') || arg.starts_with('+')) && arg != "+"
}

/// Parses a group of short options such as `-ex` or `+o errexit`.
fn parse_short_options<I: Iterator<Item = String>>(
    arg: &str,
    args: &mut Peekable<I>,
    options: &mut Vec<(ShellOption, State)>,
    command_string: &mut bool,
) -> Result<(), Error> {
    let mut chars = arg.chars();
    let state = match chars.next() {
        Some('+') => State::Off,
        _ => State::On,
    };

    while let Some(c) = chars.next() {
        match c {
            'c' if state == State::On => *command_string = true,
            'c' => return Err(Error::UnnegatableCommandString),
            'o' => {
                let rest = chars.as_str();
                let name = if rest.is_empty() {
                    args.next()
                        .ok_or_else(|| Error::MissingOptionArgument(arg.to_owned()))?
                } else {
                    rest.to_owned()
                };
                let option = ShellOption::from_str(&name)
                    .map_err(|error| Error::InvalidOptionName { name, error })?;
                options.push((option, state));
                break;
            }
            _ => {
                let option = parse_short(c).ok_or(Error::UnknownShortOption(c))?;
                options.push((option, state));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use swsh_env::option::{AllExport, ErrExit, Interactive, NoUnset, XTrace};

    #[test]
    fn no_arguments() {
        assert_eq!(parse([] as [&str; 0]), Ok(Parse::Run(Run::default())));
    }

    #[test]
    fn arg0_only() {
        assert_eq!(
            parse(["swsh"]),
            Ok(Parse::Run(Run {
                arg0: "swsh".to_string(),
                ..Run::default()
            })),
        );
    }

    #[test]
    fn run_file() {
        assert_eq!(
            parse(["swsh", "path/to/script", "-x", "foo"]),
            Ok(Parse::Run(Run {
                source: Source::File {
                    path: "path/to/script".to_string()
                },
                arg0: "path/to/script".to_string(),
                positional_params: vec!["-x".to_string(), "foo".to_string()],
                ..Run::default()
            })),
        );
    }

    #[test]
    fn run_string() {
        assert_eq!(
            parse(["swsh", "-c", "echo"]),
            Ok(Parse::Run(Run {
                source: Source::String("echo".to_string()),
                arg0: "swsh".to_string(),
                ..Run::default()
            })),
        );

        assert_eq!(
            parse(["swsh", "-c", "echo", "name", "foo", "bar"]),
            Ok(Parse::Run(Run {
                source: Source::String("echo".to_string()),
                arg0: "name".to_string(),
                positional_params: vec!["foo".to_string(), "bar".to_string()],
                ..Run::default()
            }))
        );
    }

    #[test]
    fn command_string_combined_with_other_options() {
        assert_eq!(
            parse(["swsh", "-ec", "false"]),
            Ok(Parse::Run(Run {
                source: Source::String("false".to_string()),
                options: vec![(ErrExit, State::On)],
                arg0: "swsh".to_string(),
                ..Run::default()
            }))
        );
    }

    #[test]
    fn missing_command_string() {
        assert_eq!(parse(["swsh", "-c"]), Err(Error::MissingCommandString));
    }

    #[test]
    fn run_stdin() {
        assert_eq!(
            parse(["swsh", "-s", "foo", "-bar"]),
            Ok(Parse::Run(Run {
                source: Source::Stdin,
                options: vec![(Stdin, State::On)],
                arg0: "swsh".to_string(),
                positional_params: vec!["foo".to_string(), "-bar".to_string()],
            })),
        );
    }

    #[test]
    fn conflicting_sources() {
        assert_eq!(parse(["swsh", "-cs", "echo"]), Err(Error::ConflictingSources));
    }

    #[test]
    fn short_options() {
        assert_eq!(
            parse(["swsh", "-a", "-ux", "+a", "-i"]),
            Ok(Parse::Run(Run {
                options: vec![
                    (AllExport, State::On),
                    (NoUnset, State::On),
                    (XTrace, State::On),
                    (AllExport, State::Off),
                    (Interactive, State::On),
                ],
                arg0: "swsh".to_string(),
                ..Run::default()
            })),
        );
    }

    #[test]
    fn long_options_with_o() {
        assert_eq!(
            parse(["swsh", "-o", "errexit", "+oxtrace", "-o", "allex"]),
            Ok(Parse::Run(Run {
                options: vec![
                    (ErrExit, State::On),
                    (XTrace, State::Off),
                    (AllExport, State::On),
                ],
                arg0: "swsh".to_string(),
                ..Run::default()
            })),
        );
    }

    #[test]
    fn invalid_option_names() {
        assert_matches!(
            parse(["swsh", "-o", "foo"]),
            Err(Error::InvalidOptionName { name, error: FromStrError::NoSuchOption }) => {
                assert_eq!(name, "foo");
            }
        );
        assert_matches!(
            parse(["swsh", "-o", "no"]),
            Err(Error::InvalidOptionName { error: FromStrError::Ambiguous, .. })
        );
        assert_eq!(
            parse(["swsh", "-o"]),
            Err(Error::MissingOptionArgument("-o".to_string()))
        );
    }

    #[test]
    fn unknown_options() {
        assert_eq!(parse(["swsh", "-Z"]), Err(Error::UnknownShortOption('Z')));
        assert_eq!(
            parse(["swsh", "--foo"]),
            Err(Error::UnknownLongOption("--foo".to_string()))
        );
        assert_eq!(parse(["swsh", "+c"]), Err(Error::UnnegatableCommandString));
    }

    #[test]
    fn separator_ends_options() {
        assert_eq!(
            parse(["swsh", "--", "-x"]),
            Ok(Parse::Run(Run {
                source: Source::File {
                    path: "-x".to_string()
                },
                arg0: "-x".to_string(),
                ..Run::default()
            })),
        );
    }

    #[test]
    fn help_and_version() {
        assert_eq!(parse(["swsh", "--help"]), Ok(Parse::Help));
        assert_eq!(parse(["swsh", "-e", "--version"]), Ok(Parse::Version));
    }
}
