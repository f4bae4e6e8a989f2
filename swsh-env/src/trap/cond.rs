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

//! Items that define trap conditions

#[cfg(doc)]
use super::state::Action;
#[doc(no_inline)]
pub use nix::sys::signal::Signal;
use std::ffi::c_int;
use thiserror::Error;

/// Condition under which an [`Action`] is executed
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Condition {
    /// When the shell exits
    Exit,
    /// When the specified signal is delivered to the shell process
    Signal(Signal),
}

/// Conversion from `Signal` to `Condition`
impl From<Signal> for Condition {
    fn from(signal: Signal) -> Self {
        Self::Signal(signal)
    }
}

/// Conversion from `Condition` to `String`
///
/// The result is an uppercase string representing the condition such as
/// `"EXIT"` and `"TERM"`.
impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Exit => "EXIT".fmt(f),
            Condition::Signal(signal) => {
                let full_name = signal.as_str();
                let name = full_name.strip_prefix("SIG").unwrap_or(full_name);
                name.fmt(f)
            }
        }
    }
}

/// Error in conversion from string to [`Condition`]
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
#[error("{0}: no such signal")]
pub struct ParseConditionError(pub String);

/// Conversion from `String` to `Condition`
///
/// This implementation supports parsing signal names like `"TERM"`, `"INT"`
/// and `"SIGQUIT"` in any case as well as signal numbers like `"9"` and
/// `"15"`. `"EXIT"` and the number `"0"` denote [`Condition::Exit`].
impl std::str::FromStr for Condition {
    type Err = ParseConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParseConditionError(s.to_owned());

        if let Ok(number) = s.parse::<c_int>() {
            if number == 0 {
                return Ok(Self::Exit);
            }
            return Signal::try_from(number)
                .map(Self::Signal)
                .map_err(|_| error());
        }

        let upper = s.to_ascii_uppercase();
        if upper == "EXIT" {
            return Ok(Self::Exit);
        }
        let name = if upper.starts_with("SIG") {
            upper
        } else {
            format!("SIG{upper}")
        };
        name.parse().map(Self::Signal).map_err(|_| error())
    }
}

impl Condition {
    /// Returns the number of the condition.
    ///
    /// The number is zero for [`Condition::Exit`].
    #[must_use]
    pub fn number(self) -> c_int {
        match self {
            Condition::Exit => 0,
            Condition::Signal(signal) => signal as c_int,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_from_str() {
        assert_eq!("EXIT".parse(), Ok(Condition::Exit));
        assert_eq!("exit".parse(), Ok(Condition::Exit));
        assert_eq!("TERM".parse(), Ok(Condition::Signal(Signal::SIGTERM)));
        assert_eq!("int".parse(), Ok(Condition::Signal(Signal::SIGINT)));
        assert_eq!("SIGQUIT".parse(), Ok(Condition::Signal(Signal::SIGQUIT)));

        assert_eq!("0".parse(), Ok(Condition::Exit));
        assert_eq!("1".parse(), Ok(Condition::Signal(Signal::SIGHUP)));
        assert_eq!("9".parse(), Ok(Condition::Signal(Signal::SIGKILL)));

        assert_eq!(
            "XXXXX".parse::<Condition>(),
            Err(ParseConditionError("XXXXX".to_string()))
        );
        assert!("999999999".parse::<Condition>().is_err());
        assert!("-123".parse::<Condition>().is_err());
    }

    #[test]
    fn condition_display() {
        assert_eq!(Condition::Exit.to_string(), "EXIT");
        assert_eq!(Condition::Signal(Signal::SIGUSR1).to_string(), "USR1");
        assert_eq!(Condition::Signal(Signal::SIGINT).number(), 2);
        assert_eq!(Condition::Exit.number(), 0);
    }
}
