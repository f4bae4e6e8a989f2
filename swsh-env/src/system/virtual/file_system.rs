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

//! File system in a virtual system.

use nix::errno::Errno;
use nix::sys::stat::Mode;
use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::Component;
use std::path::Path;
use std::rc::Rc;

/// Collection of files
#[derive(Clone, Debug)]
pub struct FileSystem {
    /// Root directory
    pub root: Rc<RefCell<INode>>,
}

impl Default for FileSystem {
    fn default() -> Self {
        FileSystem {
            root: Rc::new(RefCell::new(INode::directory())),
        }
    }
}

impl FileSystem {
    /// Saves a file.
    ///
    /// The path must be absolute. Missing parent directories are created. If
    /// there is an existing file at the specified path, this function
    /// replaces it with the new file and returns the old one, regardless of
    /// permissions.
    pub fn save<P: AsRef<Path>>(
        &mut self,
        path: P,
        content: Rc<RefCell<INode>>,
    ) -> Result<Option<Rc<RefCell<INode>>>, Errno> {
        let path = path.as_ref();
        let name = path.file_name().ok_or(Errno::EINVAL)?;
        let mut dir = Rc::clone(&self.root);
        for component in path.parent().into_iter().flat_map(Path::components) {
            let Component::Normal(part) = component else {
                continue;
            };
            let next = match &mut dir.borrow_mut().body {
                FileBody::Directory { files } => Rc::clone(
                    files
                        .entry(part.to_owned())
                        .or_insert_with(|| Rc::new(RefCell::new(INode::directory()))),
                ),
                _ => return Err(Errno::ENOTDIR),
            };
            dir = next;
        }
        match &mut dir.borrow_mut().body {
            FileBody::Directory { files } => Ok(files.insert(name.to_owned(), content)),
            _ => Err(Errno::ENOTDIR),
        }
    }

    /// Returns a reference to the existing file at the specified path.
    ///
    /// The path must be absolute.
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Result<Rc<RefCell<INode>>, Errno> {
        let mut ancestors = vec![Rc::clone(&self.root)];
        for component in path.as_ref().components() {
            match component {
                Component::Prefix(_) | Component::RootDir | Component::CurDir => (),
                Component::ParentDir => {
                    if ancestors.len() > 1 {
                        ancestors.pop();
                    }
                }
                Component::Normal(name) => {
                    let Some(dir) = ancestors.last() else {
                        return Err(Errno::ENOENT);
                    };
                    let next = match &dir.borrow().body {
                        FileBody::Directory { files } => {
                            Rc::clone(files.get(name).ok_or(Errno::ENOENT)?)
                        }
                        _ => return Err(Errno::ENOTDIR),
                    };
                    ancestors.push(next);
                }
            }
        }
        ancestors.pop().ok_or(Errno::ENOENT)
    }
}

/// File on the file system
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct INode {
    /// File content
    pub body: FileBody,
    /// Access permissions
    pub permissions: Mode,
}

impl INode {
    /// Creates a regular file with the given content.
    pub fn new<T: Into<Vec<u8>>>(bytes: T) -> Self {
        INode {
            body: FileBody::Regular {
                content: bytes.into(),
                is_native_executable: false,
            },
            permissions: Mode::from_bits_truncate(0o644),
        }
    }

    /// Creates an empty directory.
    pub fn directory() -> Self {
        INode {
            body: FileBody::Directory {
                files: HashMap::new(),
            },
            permissions: Mode::from_bits_truncate(0o755),
        }
    }

    /// Creates an executable regular file.
    pub fn executable() -> Self {
        INode {
            body: FileBody::Regular {
                content: Vec::new(),
                is_native_executable: true,
            },
            permissions: Mode::from_bits_truncate(0o755),
        }
    }

    /// Whether this is a regular file with any execute permission bit.
    #[must_use]
    pub fn is_executable(&self) -> bool {
        matches!(self.body, FileBody::Regular { .. })
            && self
                .permissions
                .intersects(Mode::S_IXUSR | Mode::S_IXGRP | Mode::S_IXOTH)
    }
}

/// Type and content of a file
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FileBody {
    /// Regular file
    Regular {
        /// File content
        content: Vec<u8>,
        /// Whether this file is a native binary that can be exec'ed
        is_native_executable: bool,
    },
    /// Directory
    Directory {
        /// Files contained in this directory
        ///
        /// The keys are filenames without any parent directory components.
        /// The map does not contain "." or "..".
        files: HashMap<OsString, Rc<RefCell<INode>>>,
    },
    /// Named or unnamed pipe
    Fifo {
        /// Bytes written but not yet read
        content: VecDeque<u8>,
        /// Number of open file descriptions reading from the pipe
        readers: usize,
        /// Number of open file descriptions writing to the pipe
        writers: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn save_and_get() {
        let mut fs = FileSystem::default();
        let file = Rc::new(RefCell::new(INode::new("foo")));
        let old = fs.save("/a/b/c", Rc::clone(&file)).unwrap();
        assert_eq!(old, None);

        let got = fs.get("/a/b/c").unwrap();
        assert!(Rc::ptr_eq(&got, &file));
        let dir = fs.get("/a/b").unwrap();
        assert_matches!(&dir.borrow().body, FileBody::Directory { files } => {
            assert_eq!(files.len(), 1);
        });
        let got = fs.get("/a/./b/../b/c").unwrap();
        assert!(Rc::ptr_eq(&got, &file));
    }

    #[test]
    fn replacing_file() {
        let mut fs = FileSystem::default();
        let first = Rc::new(RefCell::new(INode::new("1")));
        let second = Rc::new(RefCell::new(INode::new("2")));
        fs.save("/f", Rc::clone(&first)).unwrap();
        let old = fs.save("/f", second).unwrap().unwrap();
        assert!(Rc::ptr_eq(&old, &first));
    }

    #[test]
    fn get_errors() {
        let mut fs = FileSystem::default();
        fs.save("/file", Rc::new(RefCell::new(INode::new(""))))
            .unwrap();
        assert_eq!(fs.get("/missing").unwrap_err(), Errno::ENOENT);
        assert_eq!(fs.get("/file/x").unwrap_err(), Errno::ENOTDIR);
        assert_eq!(
            fs.save("/file/x", Rc::new(RefCell::new(INode::new(""))))
                .unwrap_err(),
            Errno::ENOTDIR
        );
    }

    #[test]
    fn executable_permission() {
        assert!(!INode::new("").is_executable());
        assert!(INode::executable().is_executable());
        assert!(!INode::directory().is_executable());
    }
}
