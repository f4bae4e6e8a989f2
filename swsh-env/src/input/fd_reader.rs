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

use super::{Context, Input, Result};
use crate::io::Fd;
use crate::system::{SharedSystem, System};
use std::slice::from_mut;

/// Input function that reads from a file descriptor.
///
/// An instance of `FdReader` contains a [`SharedSystem`] to interact with the
/// file descriptor.
///
/// The reader reads one byte at a time so that it never consumes bytes
/// beyond the end of the line. This allows the utilities the shell runs to
/// read the rest of the input from the same file descriptor.
#[derive(Clone, Debug)]
#[must_use = "FdReader does nothing unless used by a parser"]
pub struct FdReader {
    /// File descriptor to read from
    fd: Fd,
    /// System to interact with the FD
    system: SharedSystem,
}

impl FdReader {
    /// Creates a new `FdReader` instance.
    ///
    /// The `fd` argument is the file descriptor to read from. It should be
    /// readable and remain open for the lifetime of the `FdReader` instance.
    pub fn new(fd: Fd, system: SharedSystem) -> Self {
        FdReader { fd, system }
    }
}

impl Input for FdReader {
    fn next_line(&mut self, _context: &Context) -> Result {
        let mut bytes = Vec::new();
        loop {
            let mut byte = 0;
            match self.system.read(self.fd, from_mut(&mut byte)) {
                // End of input
                Ok(0) => break,

                Ok(_) => {
                    bytes.push(byte);
                    if byte == b'\n' {
                        break;
                    }
                }

                Err(errno) => return Err(std::io::Error::from_raw_os_error(errno as i32)),
            }
        }
        Ok(bytes)
    }
}
