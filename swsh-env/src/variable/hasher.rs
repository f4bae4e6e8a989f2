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

//! Hash function for variable names

use std::hash::BuildHasherDefault;
use std::hash::Hasher;

/// Hasher that computes the ELF hash (PJW hash) of variable names
///
/// Variable names are short ASCII strings, for which this simple hash is
/// fast and spreads well enough.
#[derive(Clone, Copy, Debug, Default)]
pub struct PjwHasher {
    hash: u32,
}

impl Hasher for PjwHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.hash = (self.hash << 4).wrapping_add(u32::from(byte));
            let high = self.hash & 0xF000_0000;
            if high != 0 {
                self.hash ^= high >> 24;
            }
            self.hash &= !high;
        }
    }

    fn finish(&self) -> u64 {
        u64::from(self.hash)
    }
}

/// `BuildHasher` that creates [`PjwHasher`]s
pub type PjwBuildHasher = BuildHasherDefault<PjwHasher>;
