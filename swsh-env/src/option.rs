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

//! Type definitions for shell options
//!
//! This module defines the [`OptionSet`] struct, a set of enabled
//! [`Option`]s. An option is named by a long name like `errexit` and, for
//! most options, a single letter like `e` as well.
//!
//! Note that `OptionSet` merely manages the state of options. It is not the
//! responsibility of `OptionSet` to change the behavior of the shell according
//! to the options.

use enumset::EnumSet;
use enumset::EnumSetType;
use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::Not;
use std::str::FromStr;

/// State of an option: either enabled or disabled.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum State {
    /// Enabled.
    On,
    /// Disabled.
    Off,
}

pub use State::*;

/// Converts a state to a string (`on` or `off`).
impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            On => "on",
            Off => "off",
        };
        s.fmt(f)
    }
}

impl Not for State {
    type Output = Self;
    #[must_use]
    fn not(self) -> Self {
        match self {
            On => Off,
            Off => On,
        }
    }
}

impl From<bool> for State {
    fn from(on: bool) -> Self {
        if on { On } else { Off }
    }
}

/// Shell option
///
/// Variants are declared in the order of their long names so that iterating
/// over an [`EnumSet`] yields options in alphabetical order.
#[derive(Clone, Copy, Debug, EnumSetType, Eq, Hash, PartialEq)]
#[enumset(no_super_impls)]
#[non_exhaustive]
pub enum Option {
    /// Makes all variables exported when they are assigned.
    AllExport,
    /// Enables debugging output.
    Debug,
    /// Makes the shell to exit when a command returns a non-zero exit status.
    ErrExit,
    /// Performs command search for each command in a function on its
    /// definition.
    HashOnDefinition,
    /// Prevents the interactive shell from exiting when the user enters an
    /// end-of-file.
    IgnoreEof,
    /// Enables features for interactive use.
    Interactive,
    /// Enables job control.
    Monitor,
    /// Forbids overwriting an existing file with the `>` redirection.
    NoClobber,
    /// Parses commands without executing them.
    NoExec,
    /// Disables pathname expansion.
    NoGlob,
    /// Keeps function definitions out of the command history.
    NoLog,
    /// Automatically reports the results of asynchronous jobs.
    Notify,
    /// Makes expansion of unset variables an error.
    NoUnset,
    /// Reads commands from the standard input.
    Stdin,
    /// Echos the input before parsing and executing.
    Verbose,
    /// Prints expanded words during command execution.
    XTrace,
}

pub use self::Option::*;

/// Pairs of short option letters and options in the order used by `$-`
const SHORT_OPTIONS: &[(char, Option)] = &[
    ('a', AllExport),
    ('b', Notify),
    ('C', NoClobber),
    ('d', Debug),
    ('e', ErrExit),
    ('f', NoGlob),
    ('h', HashOnDefinition),
    ('i', Interactive),
    ('m', Monitor),
    ('n', NoExec),
    ('s', Stdin),
    ('u', NoUnset),
    ('v', Verbose),
    ('x', XTrace),
];

impl Option {
    /// Whether this option can be modified by the set built-in.
    ///
    /// Unmodifiable options can be set only on shell startup.
    #[must_use]
    pub fn is_modifiable(self) -> bool {
        !matches!(self, Interactive | Stdin)
    }

    /// Returns the option name, all in lower case without punctuations.
    ///
    /// This function returns a string like `"allexport"` and `"noexec"`.
    #[must_use]
    pub fn long_name(self) -> &'static str {
        match self {
            AllExport => "allexport",
            Debug => "debug",
            ErrExit => "errexit",
            HashOnDefinition => "hashondefinition",
            IgnoreEof => "ignoreeof",
            Interactive => "interactive",
            Monitor => "monitor",
            NoClobber => "noclobber",
            NoExec => "noexec",
            NoGlob => "noglob",
            NoLog => "nolog",
            Notify => "notify",
            NoUnset => "nounset",
            Stdin => "stdin",
            Verbose => "verbose",
            XTrace => "xtrace",
        }
    }

    /// Returns the single-letter name of the option, if any.
    #[must_use]
    pub fn short_name(self) -> std::option::Option<char> {
        SHORT_OPTIONS
            .iter()
            .find(|&&(_, option)| option == self)
            .map(|&(c, _)| c)
    }
}

/// Prints the option name, all in lower case without punctuations.
impl Display for Option {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.long_name().fmt(f)
    }
}

/// Error type indicating that the input string does not name a valid option.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, thiserror::Error)]
pub enum FromStrError {
    /// The input string does not match any option name.
    #[error("no such option")]
    NoSuchOption,
    /// The input string is a prefix of more than one valid option name.
    #[error("ambiguous option name")]
    Ambiguous,
}

pub use FromStrError::*;

/// Parses an option name.
///
/// The option name may be abbreviated as long as it is an unambiguous prefix of
/// a valid option name. For example, `Option::from_str("allex")` returns
/// `Ok(AllExport)`. If the name is ambiguous, `from_str` returns
/// `Err(Ambiguous)`. A full option name is never considered ambiguous:
/// `"notify"` names [`Notify`] even though it does not start any other
/// option name, and `"noexec"` names [`NoExec`] although `"no"` is a prefix
/// of many.
impl FromStr for Option {
    type Err = FromStrError;
    fn from_str(name: &str) -> Result<Self, FromStrError> {
        const OPTIONS: &[(&str, Option)] = &[
            ("allexport", AllExport),
            ("debug", Debug),
            ("errexit", ErrExit),
            ("hashondefinition", HashOnDefinition),
            ("ignoreeof", IgnoreEof),
            ("interactive", Interactive),
            ("monitor", Monitor),
            ("noclobber", NoClobber),
            ("noexec", NoExec),
            ("noglob", NoGlob),
            ("nolog", NoLog),
            ("notify", Notify),
            ("nounset", NoUnset),
            ("stdin", Stdin),
            ("verbose", Verbose),
            ("xtrace", XTrace),
        ];

        match OPTIONS.binary_search_by_key(&name, |&(full_name, _option)| full_name) {
            Ok(index) => Ok(OPTIONS[index].1),
            Err(index) => {
                let mut options = OPTIONS[index..]
                    .iter()
                    .filter(|&(full_name, _option)| full_name.starts_with(name));
                match options.next() {
                    Some(first) => match options.next() {
                        Some(_second) => Err(Ambiguous),
                        None => Ok(first.1),
                    },
                    None => Err(NoSuchOption),
                }
            }
        }
    }
}

/// Parses a short option name.
///
/// ```
/// # use swsh_env::option::*;
/// assert_eq!(parse_short('a'), Some(AllExport));
/// assert_eq!(parse_short('C'), Some(NoClobber));
/// assert_eq!(parse_short('f'), Some(NoGlob));
/// assert_eq!(parse_short('c'), None);
/// ```
///
/// The name argument is case-sensitive.
#[must_use]
pub fn parse_short(name: char) -> std::option::Option<self::Option> {
    SHORT_OPTIONS
        .iter()
        .find(|&&(c, _)| c == name)
        .map(|&(_, option)| option)
}

/// Set of the shell options and their states.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct OptionSet {
    enabled_options: EnumSet<Option>,
}

impl OptionSet {
    /// Creates an option set with all options disabled.
    #[must_use]
    pub fn empty() -> Self {
        OptionSet {
            enabled_options: EnumSet::empty(),
        }
    }

    /// Returns the current state of the option.
    #[must_use]
    pub fn get(&self, option: Option) -> State {
        self.enabled_options.contains(option).into()
    }

    /// Tests whether the option is enabled.
    #[inline]
    #[must_use]
    pub fn is_on(&self, option: Option) -> bool {
        self.enabled_options.contains(option)
    }

    /// Changes an option's state.
    ///
    /// Some options should not be changed after the shell startup, but that
    /// does not affect the behavior of this function.
    pub fn set(&mut self, option: Option, state: State) {
        match state {
            On => self.enabled_options.insert(option),
            Off => self.enabled_options.remove(option),
        };
    }

    /// Returns an iterator over all options and their states in
    /// alphabetical order of the long names.
    pub fn iter(&self) -> impl Iterator<Item = (Option, State)> + '_ {
        EnumSet::<Option>::all()
            .iter()
            .map(|option| (option, self.get(option)))
    }

    /// Returns the value of the `$-` special parameter.
    ///
    /// The result contains the short names of the enabled options.
    #[must_use]
    pub fn to_short_string(&self) -> String {
        SHORT_OPTIONS
            .iter()
            .filter(|&&(_, option)| self.is_on(option))
            .map(|&(c, _)| c)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_from_str_round_trip() {
        for option in EnumSet::<Option>::all() {
            let name = option.to_string();
            assert_eq!(Option::from_str(&name), Ok(option));
        }
    }

    #[test]
    fn from_str_unambiguous_abbreviation() {
        assert_eq!(Option::from_str("allexpor"), Ok(AllExport));
        assert_eq!(Option::from_str("a"), Ok(AllExport));
        assert_eq!(Option::from_str("noc"), Ok(NoClobber));
        assert_eq!(Option::from_str("nou"), Ok(NoUnset));
        assert_eq!(Option::from_str("x"), Ok(XTrace));
    }

    #[test]
    fn from_str_ambiguous_abbreviation() {
        assert_eq!(Option::from_str(""), Err(Ambiguous));
        assert_eq!(Option::from_str("no"), Err(Ambiguous));
        assert_eq!(Option::from_str("i"), Err(Ambiguous));
        assert_eq!(Option::from_str("not"), Ok(Notify));
    }

    #[test]
    fn from_str_no_match() {
        assert_eq!(Option::from_str("vim"), Err(NoSuchOption));
        assert_eq!(Option::from_str("ERREXIT"), Err(NoSuchOption));
    }

    #[test]
    fn short_names() {
        assert_eq!(parse_short('e'), Some(ErrExit));
        assert_eq!(parse_short('E'), None);
        assert_eq!(NoUnset.short_name(), Some('u'));
        assert_eq!(IgnoreEof.short_name(), None);
        for &(c, option) in SHORT_OPTIONS {
            assert_eq!(parse_short(c), Some(option));
        }
    }

    #[test]
    fn short_string_order() {
        let mut options = OptionSet::default();
        assert_eq!(options.to_short_string(), "");
        options.set(XTrace, On);
        options.set(NoClobber, On);
        options.set(AllExport, On);
        options.set(IgnoreEof, On);
        assert_eq!(options.to_short_string(), "aCx");
        options.set(NoClobber, Off);
        assert_eq!(options.to_short_string(), "ax");
    }

    #[test]
    fn iteration_is_alphabetical() {
        let options = OptionSet::default();
        let names: Vec<_> = options.iter().map(|(o, _)| o.long_name()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(options.iter().all(|(_, state)| state == Off));
    }
}
