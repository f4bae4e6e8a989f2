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

//! I/O within a virtual system.

use super::FileBody;
use super::INode;
use nix::errno::Errno;
use std::cell::RefCell;
use std::io::SeekFrom;
use std::rc::Rc;

/// State of a file opened for reading and/or writing
#[derive(Debug)]
pub struct OpenFileDescription {
    /// The file.
    pub file: Rc<RefCell<INode>>,
    /// Position in bytes to perform next I/O operation at.
    pub offset: usize,
    /// Whether this file is opened for reading.
    pub is_readable: bool,
    /// Whether this file is opened for writing.
    pub is_writable: bool,
    /// Whether this file is opened for appending.
    pub is_appending: bool,
}

impl OpenFileDescription {
    /// Opens the file, counting the reader and writer of a FIFO.
    pub fn new(
        file: Rc<RefCell<INode>>,
        is_readable: bool,
        is_writable: bool,
        is_appending: bool,
    ) -> Self {
        if let FileBody::Fifo {
            readers, writers, ..
        } = &mut file.borrow_mut().body
        {
            if is_readable {
                *readers += 1;
            }
            if is_writable {
                *writers += 1;
            }
        }
        OpenFileDescription {
            file,
            offset: 0,
            is_readable,
            is_writable,
            is_appending,
        }
    }

    /// Reads from this open file description.
    ///
    /// Returns the number of bytes successfully read. Reading from an empty
    /// FIFO fails with `EAGAIN` while the FIFO has a writer, since a virtual
    /// process cannot block.
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Errno> {
        if !self.is_readable {
            return Err(Errno::EBADF);
        }
        let mut file = self.file.borrow_mut();
        match &mut file.body {
            FileBody::Regular { content, .. } => {
                let len = content.len();
                if self.offset >= len {
                    return Ok(0);
                }
                let count = buffer.len().min(len - self.offset);
                buffer[..count].copy_from_slice(&content[self.offset..][..count]);
                self.offset += count;
                Ok(count)
            }
            FileBody::Directory { .. } => Err(Errno::EISDIR),
            FileBody::Fifo {
                content, writers, ..
            } => {
                if content.is_empty() {
                    return if *writers == 0 {
                        Ok(0)
                    } else {
                        Err(Errno::EAGAIN)
                    };
                }
                let count = buffer.len().min(content.len());
                for (dst, src) in buffer.iter_mut().zip(content.drain(..count)) {
                    *dst = src;
                }
                Ok(count)
            }
        }
    }

    /// Writes to this open file description.
    ///
    /// Returns the number of bytes successfully written. A FIFO has no
    /// capacity limit.
    pub fn write(&mut self, buffer: &[u8]) -> Result<usize, Errno> {
        if !self.is_writable {
            return Err(Errno::EBADF);
        }
        let mut file = self.file.borrow_mut();
        match &mut file.body {
            FileBody::Regular { content, .. } => {
                if self.is_appending {
                    self.offset = content.len();
                }
                let end = self.offset + buffer.len();
                if content.len() < end {
                    content.resize(end, 0);
                }
                content[self.offset..end].copy_from_slice(buffer);
                self.offset = end;
                Ok(buffer.len())
            }
            FileBody::Directory { .. } => Err(Errno::EISDIR),
            FileBody::Fifo {
                content, readers, ..
            } => {
                if *readers == 0 {
                    return Err(Errno::EPIPE);
                }
                content.extend(buffer);
                Ok(buffer.len())
            }
        }
    }

    /// Moves the file offset and returns the new offset.
    pub fn seek(&mut self, position: SeekFrom) -> Result<u64, Errno> {
        let len = match &self.file.borrow().body {
            FileBody::Regular { content, .. } => content.len(),
            FileBody::Directory { files } => files.len(),
            FileBody::Fifo { .. } => return Err(Errno::ESPIPE),
        };
        let (base, offset) = match position {
            SeekFrom::Start(offset) => (0, i64::try_from(offset).map_err(|_| Errno::EOVERFLOW)?),
            SeekFrom::Current(offset) => (self.offset, offset),
            SeekFrom::End(offset) => (len, offset),
        };
        let new_offset = i64::try_from(base)
            .ok()
            .and_then(|base| base.checked_add(offset))
            .ok_or(Errno::EOVERFLOW)?;
        self.offset = usize::try_from(new_offset).map_err(|_| Errno::EINVAL)?;
        Ok(self.offset as u64)
    }
}

impl Drop for OpenFileDescription {
    fn drop(&mut self) {
        if let FileBody::Fifo {
            readers, writers, ..
        } = &mut self.file.borrow_mut().body
        {
            if self.is_readable {
                *readers -= 1;
            }
            if self.is_writable {
                *writers -= 1;
            }
        }
    }
}

/// State of a file descriptor
#[derive(Clone, Debug)]
pub struct FdBody {
    /// Underlying open file description.
    ///
    /// File descriptors duplicated from each other share the same open file
    /// description.
    pub open_file_description: Rc<RefCell<OpenFileDescription>>,
    /// True if this FD has the close-on-exec flag set.
    pub cloexec: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn regular(content: &[u8]) -> Rc<RefCell<INode>> {
        Rc::new(RefCell::new(INode::new(content)))
    }

    fn fifo() -> Rc<RefCell<INode>> {
        Rc::new(RefCell::new(INode {
            body: FileBody::Fifo {
                content: VecDeque::new(),
                readers: 0,
                writers: 0,
            },
            permissions: nix::sys::stat::Mode::empty(),
        }))
    }

    #[test]
    fn read_unreadable() {
        let mut ofd = OpenFileDescription::new(regular(b"a"), false, true, false);
        assert_eq!(ofd.read(&mut [0]), Err(Errno::EBADF));
    }

    #[test]
    fn read_regular_file() {
        let mut ofd = OpenFileDescription::new(regular(b"12345"), true, false, false);
        ofd.offset = 1;
        let mut buffer = [0; 3];
        assert_eq!(ofd.read(&mut buffer), Ok(3));
        assert_eq!(buffer, *b"234");
        assert_eq!(ofd.read(&mut buffer), Ok(1));
        assert_eq!(buffer[0], b'5');
        assert_eq!(ofd.read(&mut buffer), Ok(0));
    }

    #[test]
    fn write_regular_file_overwrites_and_extends() {
        let file = regular(b"12345");
        let mut ofd = OpenFileDescription::new(Rc::clone(&file), false, true, false);
        ofd.offset = 3;
        assert_eq!(ofd.write(b"abc"), Ok(3));
        assert_eq!(ofd.offset, 6);
        assert_eq!(file.borrow().body, INode::new("123abc").body);
    }

    #[test]
    fn write_appending() {
        let file = regular(b"12");
        let mut ofd = OpenFileDescription::new(Rc::clone(&file), false, true, true);
        assert_eq!(ofd.write(b"x"), Ok(1));
        assert_eq!(file.borrow().body, INode::new("12x").body);
    }

    #[test]
    fn seek_regular_file() {
        let mut ofd = OpenFileDescription::new(regular(b"12345"), true, false, false);
        assert_eq!(ofd.seek(SeekFrom::End(-2)), Ok(3));
        assert_eq!(ofd.seek(SeekFrom::Current(-1)), Ok(2));
        assert_eq!(ofd.seek(SeekFrom::Start(0)), Ok(0));
        assert_eq!(ofd.seek(SeekFrom::Current(-1)), Err(Errno::EINVAL));
    }

    #[test]
    fn fifo_read_write() {
        let file = fifo();
        let mut reader = OpenFileDescription::new(Rc::clone(&file), true, false, false);
        let mut writer = OpenFileDescription::new(Rc::clone(&file), false, true, false);

        let mut buffer = [0; 4];
        assert_eq!(reader.read(&mut buffer), Err(Errno::EAGAIN));
        assert_eq!(writer.write(b"abcdef"), Ok(6));
        assert_eq!(reader.read(&mut buffer), Ok(4));
        assert_eq!(buffer, *b"abcd");
        drop(writer);
        assert_eq!(reader.read(&mut buffer), Ok(2));
        assert_eq!(reader.read(&mut buffer), Ok(0));
    }

    #[test]
    fn fifo_write_without_reader() {
        let file = fifo();
        let reader = OpenFileDescription::new(Rc::clone(&file), true, false, false);
        let mut writer = OpenFileDescription::new(Rc::clone(&file), false, true, false);
        drop(reader);
        assert_eq!(writer.write(b"x"), Err(Errno::EPIPE));
        assert_eq!(writer.seek(SeekFrom::Start(0)), Err(Errno::ESPIPE));
    }
}
