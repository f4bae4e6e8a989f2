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

//! Reserved words

use std::fmt;
use strum::{AsRefStr, EnumIter, EnumString};

/// Token identifier for reserved words.
///
/// A word is recognized as a reserved word only at the position of a
/// command name and only if it is not quoted.
#[derive(AsRefStr, Clone, Copy, Debug, EnumIter, EnumString, Eq, Hash, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    #[strum(serialize = "!")]
    Bang,
    Case,
    Do,
    Done,
    Elif,
    Else,
    Esac,
    Fi,
    For,
    If,
    In,
    Then,
    Until,
    While,
    #[strum(serialize = "{")]
    OpenBrace,
    #[strum(serialize = "}")]
    CloseBrace,
}

impl Keyword {
    /// Determines if this token can be a delimiter of a clause.
    ///
    /// This function returns `true` for `Do`, `Done`, `Elif`, `Else`, `Esac`,
    /// `Fi`, `Then`, and `CloseBrace`, and `false` for others.
    #[must_use]
    pub fn is_clause_delimiter(self) -> bool {
        use Keyword::*;
        matches!(self, Do | Done | Elif | Else | Esac | Fi | Then | CloseBrace)
    }

    /// Looks up the reserved word that has the given text.
    #[must_use]
    pub fn from_bytes(text: &[u8]) -> Option<Keyword> {
        std::str::from_utf8(text).ok()?.parse().ok()
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}
