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

//! Redirection semantics
//!
//! A [redirection](Redir) modifies its [target file
//! descriptor](Redir::fd_or_default) on the basis of its [body](RedirBody).
//!
//! If the body is `Normal`, the operand word is [expanded](crate::expansion)
//! to a single field first. Then, the [operator](RedirOp) defines the next
//! behavior:
//!
//! - `FileIn`: Opens a file for reading, regarding the expanded field as a
//!   pathname.
//! - `FileInOut`: Likewise, opens a file for reading and writing. Creates an
//!   empty regular file if the file does not exist.
//! - `FileOut`: Likewise, opens a file for writing and clears the file
//!   content. Creates an empty regular file if the file does not exist. If
//!   the `noclobber` option is on, an existing regular file is not opened.
//! - `FileClobber`: Same as `FileOut` but ignores the `noclobber` option.
//! - `FileAppend`: Likewise, opens a file for appending.
//! - `FdIn`, `FdOut`: Copies a file descriptor, regarding the expanded
//!   field as a decimal integer. Closes the target file descriptor if the
//!   field is a single hyphen (`-`) instead.
//!
//! If the body is `HereDoc`, the content is expanded unless the delimiter
//! was quoted, and written to a temporary file that the target file
//! descriptor is made to read from.
//!
//! To perform redirections, wrap an [`Env`] in a [`RedirGuard`] and call
//! [`RedirGuard::perform_redirs`]. When the guard is dropped, the target
//! file descriptors are restored to their previous state.

use crate::expansion::{expand_here_doc, expand_word};
use std::ffi::CString;
use std::io::SeekFrom;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;
use swsh_env::io::{Fd, MIN_INTERNAL_FD};
use swsh_env::option::NoClobber;
use swsh_env::semantics::{ExitStatus, Field};
use swsh_env::system::{Errno, Mode, OFlag};
use swsh_env::{Env, System};
use swsh_syntax::bytes::{encode, to_c_string};
use swsh_syntax::syntax::{HereDoc, Redir, RedirBody, RedirOp};
use thiserror::Error;

/// Types of errors that may occur in the redirection.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ErrorCause {
    /// Expansion error
    #[error(transparent)]
    Expansion(crate::expansion::ErrorCause),

    /// Pathname containing a nul byte
    #[error("{0}: nul byte found in the pathname")]
    NulByte(String),

    /// The target file descriptor could not be modified for the redirection.
    #[error("cannot redirect file descriptor {}: {}", .0, .1.desc())]
    FdNotOverwritten(Fd, Errno),

    /// The operand of `<&` or `>&` is not an open file descriptor.
    #[error("cannot copy file descriptor {}: {}", .0, .1.desc())]
    FdNotCopied(Fd, Errno),

    /// Error while opening a file
    #[error("{}: {}", .0.to_string_lossy(), .1.desc())]
    OpenFile(CString, Errno),

    /// Operand of `<&` or `>&` that is not an integer
    #[error("{0}: not a valid file descriptor")]
    MalformedFd(String),

    /// Error preparing the content of a here-document
    #[error("cannot prepare here-document: {}", .0.desc())]
    TemporaryFile(Errno),
}

/// Explanation of a redirection error
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{line_no}: {cause}")]
pub struct Error {
    pub cause: ErrorCause,
    /// Line number of the redirection
    pub line_no: u64,
}

impl From<crate::expansion::Error> for Error {
    fn from(e: crate::expansion::Error) -> Self {
        Error {
            cause: ErrorCause::Expansion(e.cause),
            line_no: e.line_no,
        }
    }
}

/// Record of saving an open file description in another file descriptor
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct SavedFd {
    /// File descriptor modified by the redirection
    original: Fd,
    /// Internal file descriptor that keeps the original open file
    /// description, or `None` if the original was closed
    save: Option<Fd>,
}

/// Intermediate state of a redirected file descriptor
#[derive(Debug)]
enum FdSpec {
    /// File descriptor specifically opened for the redirection
    Owned(Fd),
    /// Existing file descriptor
    Borrowed(Fd),
    /// Closed file descriptor
    Closed,
}

const FILE_MODE: Mode = Mode::from_bits_truncate(0o666);

fn open_file(env: &mut Env, flags: OFlag, path: Field) -> Result<FdSpec, Error> {
    let Field { value, line_no } = path;
    let path = to_c_string(&value).map_err(|_| Error {
        cause: ErrorCause::NulByte(value.clone()),
        line_no,
    })?;
    match env.system.open(&path, flags, FILE_MODE) {
        Ok(fd) => Ok(FdSpec::Owned(fd)),
        Err(errno) => Err(Error {
            cause: ErrorCause::OpenFile(path, errno),
            line_no,
        }),
    }
}

/// Opens a file for `>` with the `noclobber` option on.
///
/// An existing regular file is an error. Other existing files, such as
/// `/dev/null`, are opened without truncation.
fn open_file_no_clobber(env: &mut Env, path: Field) -> Result<FdSpec, Error> {
    let exclusive = OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_EXCL;
    match open_file(env, exclusive, path.clone()) {
        Err(Error {
            cause: ErrorCause::OpenFile(c_path, Errno::EEXIST),
            line_no,
        }) => {
            if env.system.is_regular_file(&c_path) {
                Err(Error {
                    cause: ErrorCause::OpenFile(c_path, Errno::EEXIST),
                    line_no,
                })
            } else {
                open_file(env, OFlag::O_WRONLY, path)
            }
        }
        result => result,
    }
}

/// Parses the operand of `<&` and `>&`.
fn copy_fd(operand: Field) -> Result<FdSpec, Error> {
    if operand.value == "-" {
        return Ok(FdSpec::Closed);
    }
    match operand.value.parse() {
        Ok(fd) if fd >= 0 => Ok(FdSpec::Borrowed(Fd(fd))),
        _ => Err(Error {
            cause: ErrorCause::MalformedFd(operand.value),
            line_no: operand.line_no,
        }),
    }
}

fn open_normal(env: &mut Env, operator: RedirOp, operand: Field) -> Result<FdSpec, Error> {
    use RedirOp::*;
    let truncate = OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC;
    match operator {
        FileIn => open_file(env, OFlag::O_RDONLY, operand),
        FileInOut => open_file(env, OFlag::O_RDWR | OFlag::O_CREAT, operand),
        FileOut if env.options.is_on(NoClobber) => open_file_no_clobber(env, operand),
        FileOut | FileClobber => open_file(env, truncate, operand),
        FileAppend => open_file(
            env,
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND,
            operand,
        ),
        FdIn | FdOut => copy_fd(operand),
    }
}

/// Writes the content to a temporary file and rewinds it.
fn open_here_doc(env: &mut Env, content: &str, line_no: u64) -> Result<FdSpec, Error> {
    let to_error = |errno| Error {
        cause: ErrorCause::TemporaryFile(errno),
        line_no,
    };
    let fd = env.system.open_tmpfile().map_err(to_error)?;
    let written = env
        .system
        .write_all(fd, &encode(content))
        .and_then(|_| env.system.lseek(fd, SeekFrom::Start(0)));
    if let Err(errno) = written {
        env.system.close(fd).ok();
        return Err(to_error(errno));
    }
    Ok(FdSpec::Owned(fd))
}

fn here_doc(env: &mut Env, here_doc: &Rc<HereDoc>, line_no: u64) -> Result<FdSpec, Error> {
    let content = expand_here_doc(env, here_doc, line_no)?;
    open_here_doc(env, &content, line_no)
}

/// Prepares the file descriptor the target is redirected to.
fn open(env: &mut Env, redir: &Redir) -> Result<(FdSpec, Option<ExitStatus>), Error> {
    match &redir.body {
        RedirBody::Normal { operator, operand } => {
            let (field, exit_status) = expand_word(env, operand)?;
            Ok((open_normal(env, *operator, field)?, exit_status))
        }
        RedirBody::HereDoc(doc) => Ok((here_doc(env, doc, redir.line_no)?, None)),
    }
}

/// Performs a redirection.
fn perform(env: &mut Env, redir: &Redir) -> Result<(SavedFd, Option<ExitStatus>), Error> {
    let target = Fd(redir.fd_or_default());
    let not_overwritten = |errno| Error {
        cause: ErrorCause::FdNotOverwritten(target, errno),
        line_no: redir.line_no,
    };

    // Save the current open file description at the target
    let save = match env.system.dup(target, MIN_INTERNAL_FD, true) {
        Ok(save) => Some(save),
        Err(Errno::EBADF) => None,
        Err(errno) => return Err(not_overwritten(errno)),
    };

    let result = open(env, redir).and_then(|(spec, exit_status)| {
        let result = match spec {
            FdSpec::Owned(fd) => {
                let result = env.system.dup2(fd, target);
                env.system.close(fd).ok();
                result.map(drop).map_err(not_overwritten)
            }
            FdSpec::Borrowed(fd) if fd == target => Ok(()),
            FdSpec::Borrowed(fd) => match env.system.dup2(fd, target) {
                Ok(_) => Ok(()),
                Err(Errno::EBADF) => Err(Error {
                    cause: ErrorCause::FdNotCopied(fd, Errno::EBADF),
                    line_no: redir.line_no,
                }),
                Err(errno) => Err(not_overwritten(errno)),
            },
            FdSpec::Closed => {
                env.system.close(target).ok();
                Ok(())
            }
        };
        result.map(|()| exit_status)
    });

    match result {
        Ok(exit_status) => {
            let saved = SavedFd {
                original: target,
                save,
            };
            Ok((saved, exit_status))
        }
        Err(error) => {
            if let Some(save) = save {
                env.system.close(save).ok();
            }
            Err(error)
        }
    }
}

/// `Env` wrapper for performing redirections
///
/// A `RedirGuard` keeps track of file descriptors modified by redirections
/// so that they can be restored when the guard is dropped.
/// [`preserve_redirs`](Self::preserve_redirs) makes the redirections
/// permanent instead.
#[derive(Debug)]
#[must_use = "redirections are undone when the guard is dropped"]
pub struct RedirGuard<'e> {
    env: &'e mut Env,
    saved_fds: Vec<SavedFd>,
}

impl Deref for RedirGuard<'_> {
    type Target = Env;
    fn deref(&self) -> &Env {
        self.env
    }
}

impl DerefMut for RedirGuard<'_> {
    fn deref_mut(&mut self) -> &mut Env {
        self.env
    }
}

impl Drop for RedirGuard<'_> {
    fn drop(&mut self) {
        self.undo_redirs()
    }
}

impl<'e> RedirGuard<'e> {
    pub fn new(env: &'e mut Env) -> Self {
        RedirGuard {
            env,
            saved_fds: Vec::new(),
        }
    }

    /// Performs a redirection.
    ///
    /// Returns the exit status of the last command substitution performed
    /// in the operand, if any.
    pub fn perform_redir(&mut self, redir: &Redir) -> Result<Option<ExitStatus>, Error> {
        let (saved, exit_status) = perform(self.env, redir)?;
        self.saved_fds.push(saved);
        Ok(exit_status)
    }

    /// Performs redirections in order.
    ///
    /// If a redirection fails, the rest are not performed, but the effects
    /// of the preceding ones remain until the guard is dropped.
    pub fn perform_redirs<'a, I>(&mut self, redirs: I) -> Result<Option<ExitStatus>, Error>
    where
        I: IntoIterator<Item = &'a Redir>,
    {
        let mut exit_status = None;
        for redir in redirs {
            exit_status = self.perform_redir(redir)?.or(exit_status);
        }
        Ok(exit_status)
    }

    /// Restores the file descriptors modified by the redirections.
    pub fn undo_redirs(&mut self) {
        for SavedFd { original, save } in self.saved_fds.drain(..).rev() {
            match save {
                Some(save) => {
                    self.env.system.dup2(save, original).ok();
                    self.env.system.close(save).ok();
                }
                None => {
                    self.env.system.close(original).ok();
                }
            }
        }
    }

    /// Makes the redirections permanent.
    ///
    /// The internal copies of the original file descriptors are closed.
    pub fn preserve_redirs(&mut self) {
        for SavedFd { save, .. } in self.saved_fds.drain(..) {
            if let Some(save) = save {
                self.env.system.close(save).ok();
            }
        }
    }
}
