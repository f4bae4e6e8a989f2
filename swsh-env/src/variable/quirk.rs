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

//! Quirks of variables

use std::cell::Cell;

/// Special characteristics of a variable
///
/// While most variables act as a simple store of a value, some variables
/// have their value computed dynamically on expansion. `Quirk` determines
/// the nature of such a variable and contains the relevant state.
///
/// A quirk is lost when an assignment sets a new value to the variable or
/// the variable is unset.
///
/// Use [`Variable::expand`](super::Variable::expand) to apply the variable's
/// quirk when expanding a variable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Quirk {
    /// Quirk for the `$LINENO` variable
    ///
    /// The value is the line number of the command being executed.
    LineNumber,

    /// Quirk for the `$RANDOM` variable
    ///
    /// The value is a pseudo-random integer in `0..=65535`. The cell holds
    /// the state of the linear congruential generator, which advances on
    /// every expansion.
    Random(Cell<u32>),
}

impl Quirk {
    /// Creates a `Random` quirk with the given seed.
    #[must_use]
    pub fn random(seed: u32) -> Self {
        Quirk::Random(Cell::new(seed))
    }

    /// Computes the value of a variable having this quirk.
    pub(super) fn expand(&self, line_no: u64) -> String {
        match self {
            Quirk::LineNumber => line_no.to_string(),
            Quirk::Random(state) => {
                let next = state.get().wrapping_mul(1_103_515_245).wrapping_add(12345);
                state.set(next);
                ((next >> 16) & 0xFFFF).to_string()
            }
        }
    }
}
