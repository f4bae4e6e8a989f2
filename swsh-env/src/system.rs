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

//! API declarations and implementations for system-managed parts of the
//! environment.
//!
//! The [`System`] trait defines the interface the shell uses to perform
//! system calls. [`RealSystem`] performs them on the underlying operating
//! system, and [`VirtualSystem`] simulates them in memory for testing.
//!
//! The environment holds its system as a [`SharedSystem`] so that input
//! readers and subshells can access the same system while the environment
//! itself is borrowed.

pub mod real;
pub mod r#virtual;

pub use self::real::RealSystem;
pub use self::r#virtual::VirtualSystem;
use crate::io::Fd;
use crate::trap::SignalSystem;
#[doc(no_inline)]
pub use nix::errno::Errno;
#[doc(no_inline)]
pub use nix::fcntl::OFlag;
#[doc(no_inline)]
pub use nix::sys::signal::Signal;
#[doc(no_inline)]
pub use nix::sys::stat::Mode;
#[doc(no_inline)]
pub use nix::sys::wait::WaitStatus;
#[doc(no_inline)]
pub use nix::unistd::{ForkResult, Pid};
use std::cell::RefCell;
use std::convert::Infallible;
use std::ffi::CStr;
use std::ffi::CString;
use std::ffi::OsString;
use std::fmt::Debug;
use std::io::SeekFrom;
use std::path::PathBuf;
use std::rc::Rc;
use swsh_syntax::bytes::encode;

/// Result type of system calls
pub type Result<T> = std::result::Result<T, Errno>;

/// How a signal is handled by the shell process
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SignalHandling {
    /// The signal performs its default action.
    #[default]
    Default,
    /// The signal is ignored.
    Ignore,
    /// The signal is caught by the shell's signal handler.
    Catch,
}

/// API to the system-managed parts of the environment.
///
/// Most methods correspond to a POSIX function of the same name. Errors are
/// reported as [`Errno`] values.
pub trait System: Debug {
    /// Whether there is an executable regular file at the specified path.
    fn is_executable_file(&self, path: &CStr) -> bool;

    /// Whether there is a directory at the specified path.
    fn is_directory(&self, path: &CStr) -> bool;

    /// Whether there is a regular file at the specified path.
    fn is_regular_file(&self, path: &CStr) -> bool;

    /// Creates an unnamed pipe.
    ///
    /// Returns the reading end and the writing end.
    fn pipe(&mut self) -> Result<(Fd, Fd)>;

    /// Duplicates a file descriptor.
    ///
    /// The new FD is the minimum unused FD not less than `to_min`. If
    /// `cloexec` is true, the new FD has the close-on-exec flag set.
    fn dup(&mut self, from: Fd, to_min: Fd, cloexec: bool) -> Result<Fd>;

    /// Duplicates a file descriptor to the specified FD.
    ///
    /// The close-on-exec flag of the new FD is cleared.
    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd>;

    /// Opens a file.
    fn open(&mut self, path: &CStr, flags: OFlag, mode: Mode) -> Result<Fd>;

    /// Opens an unnamed temporary file for reading and writing.
    fn open_tmpfile(&mut self) -> Result<Fd>;

    /// Closes a file descriptor.
    ///
    /// Closing an FD that is not open is not an error.
    fn close(&mut self, fd: Fd) -> Result<()>;

    /// Whether the file descriptor is associated with a terminal.
    fn isatty(&self, fd: Fd) -> bool;

    /// Reads from the file descriptor.
    ///
    /// Returns the number of bytes read, which is zero at the end of input.
    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize>;

    /// Writes to the file descriptor.
    ///
    /// Returns the number of bytes written, which may be less than the
    /// length of the buffer.
    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize>;

    /// Moves the file offset.
    fn lseek(&mut self, fd: Fd, position: SeekFrom) -> Result<u64>;

    /// Returns the names of the entries of a directory.
    ///
    /// The result does not include `.` and `..`, and is not sorted.
    fn read_dir(&self, path: &CStr) -> Result<Vec<OsString>>;

    /// Sets how a signal is handled.
    ///
    /// Returns the previous handling.
    fn sigaction(&mut self, signal: Signal, handling: SignalHandling) -> Result<SignalHandling>;

    /// Returns the signals caught since the last call and clears them.
    ///
    /// Signals are returned in ascending order of their numbers.
    fn caught_signals(&mut self) -> Vec<Signal>;

    /// Returns the process ID of the current process.
    fn getpid(&self) -> Pid;

    /// Returns the process ID of the parent process.
    fn getppid(&self) -> Pid;

    /// Whether the effective user of the process is the superuser.
    fn is_root(&self) -> bool;

    /// Returns the current working directory.
    fn getcwd(&self) -> Result<PathBuf>;

    /// Changes the current working directory.
    fn chdir(&mut self, path: &CStr) -> Result<()>;

    /// Returns the home directory of the named user.
    ///
    /// Returns `Ok(None)` if the user is not found.
    fn getpwnam_dir(&self, name: &str) -> Result<Option<PathBuf>>;

    /// Whether [`fork`](Self::fork) is available.
    ///
    /// Without fork, the shell runs subshells in-process on a copy of the
    /// environment.
    fn fork_supported(&self) -> bool;

    /// Creates a child process that continues running the shell.
    fn fork(&mut self) -> Result<ForkResult>;

    /// Starts an external utility in a new child process.
    ///
    /// The child process has the file descriptors of the current process
    /// except those with the close-on-exec flag. Returns the process ID of
    /// the child.
    fn spawn(&mut self, path: &CStr, args: &[CString], envs: &[CString]) -> Result<Pid>;

    /// Waits for the child process to terminate.
    fn wait(&mut self, target: Pid) -> Result<WaitStatus>;

    /// Replaces the current process image with a new one.
    fn execve(&mut self, path: &CStr, args: &[CString], envs: &[CString]) -> Result<Infallible>;
}

/// System shared by a reference counter.
///
/// Cloning a `SharedSystem` only increments the reference count. The clones
/// share the same backing system instance.
///
/// `SharedSystem` implements [`System`] by delegating to the contained
/// system instance.
#[derive(Clone, Debug)]
pub struct SharedSystem(Rc<RefCell<Box<dyn System>>>);

impl SharedSystem {
    /// Creates a new shared system.
    pub fn new(system: Box<dyn System>) -> Self {
        SharedSystem(Rc::new(RefCell::new(system)))
    }

    /// Writes the whole buffer to the file descriptor.
    ///
    /// Retries until all bytes are written or an error occurs.
    pub fn write_all(&mut self, fd: Fd, mut buffer: &[u8]) -> Result<usize> {
        let total = buffer.len();
        while !buffer.is_empty() {
            match self.write(fd, buffer)? {
                0 => return Err(Errno::EIO),
                count => buffer = &buffer[count..],
            }
        }
        Ok(total)
    }

    /// Writes the message to the standard error.
    ///
    /// Any errors that may happen writing to the standard error are ignored.
    pub fn print_error(&mut self, message: &str) {
        let _: Result<usize> = self.write_all(Fd::STDERR, &encode(message));
    }

    /// Reads all bytes from the file descriptor until the end of input.
    pub fn read_all(&mut self, fd: Fd) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        let mut buffer = [0; 1024];
        loop {
            match self.read(fd, &mut buffer)? {
                0 => return Ok(content),
                count => content.extend_from_slice(&buffer[..count]),
            }
        }
    }
}

impl System for SharedSystem {
    fn is_executable_file(&self, path: &CStr) -> bool {
        self.0.borrow().is_executable_file(path)
    }
    fn is_directory(&self, path: &CStr) -> bool {
        self.0.borrow().is_directory(path)
    }
    fn is_regular_file(&self, path: &CStr) -> bool {
        self.0.borrow().is_regular_file(path)
    }
    fn pipe(&mut self) -> Result<(Fd, Fd)> {
        self.0.borrow_mut().pipe()
    }
    fn dup(&mut self, from: Fd, to_min: Fd, cloexec: bool) -> Result<Fd> {
        self.0.borrow_mut().dup(from, to_min, cloexec)
    }
    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd> {
        self.0.borrow_mut().dup2(from, to)
    }
    fn open(&mut self, path: &CStr, flags: OFlag, mode: Mode) -> Result<Fd> {
        self.0.borrow_mut().open(path, flags, mode)
    }
    fn open_tmpfile(&mut self) -> Result<Fd> {
        self.0.borrow_mut().open_tmpfile()
    }
    fn close(&mut self, fd: Fd) -> Result<()> {
        self.0.borrow_mut().close(fd)
    }
    fn isatty(&self, fd: Fd) -> bool {
        self.0.borrow().isatty(fd)
    }
    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize> {
        self.0.borrow_mut().read(fd, buffer)
    }
    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize> {
        self.0.borrow_mut().write(fd, buffer)
    }
    fn lseek(&mut self, fd: Fd, position: SeekFrom) -> Result<u64> {
        self.0.borrow_mut().lseek(fd, position)
    }
    fn read_dir(&self, path: &CStr) -> Result<Vec<OsString>> {
        self.0.borrow().read_dir(path)
    }
    fn sigaction(&mut self, signal: Signal, handling: SignalHandling) -> Result<SignalHandling> {
        self.0.borrow_mut().sigaction(signal, handling)
    }
    fn caught_signals(&mut self) -> Vec<Signal> {
        self.0.borrow_mut().caught_signals()
    }
    fn getpid(&self) -> Pid {
        self.0.borrow().getpid()
    }
    fn getppid(&self) -> Pid {
        self.0.borrow().getppid()
    }
    fn is_root(&self) -> bool {
        self.0.borrow().is_root()
    }
    fn getcwd(&self) -> Result<PathBuf> {
        self.0.borrow().getcwd()
    }
    fn chdir(&mut self, path: &CStr) -> Result<()> {
        self.0.borrow_mut().chdir(path)
    }
    fn getpwnam_dir(&self, name: &str) -> Result<Option<PathBuf>> {
        self.0.borrow().getpwnam_dir(name)
    }
    fn fork_supported(&self) -> bool {
        self.0.borrow().fork_supported()
    }
    fn fork(&mut self) -> Result<ForkResult> {
        self.0.borrow_mut().fork()
    }
    fn spawn(&mut self, path: &CStr, args: &[CString], envs: &[CString]) -> Result<Pid> {
        self.0.borrow_mut().spawn(path, args, envs)
    }
    fn wait(&mut self, target: Pid) -> Result<WaitStatus> {
        self.0.borrow_mut().wait(target)
    }
    fn execve(&mut self, path: &CStr, args: &[CString], envs: &[CString]) -> Result<Infallible> {
        self.0.borrow_mut().execve(path, args, envs)
    }
}

impl SignalSystem for SharedSystem {
    fn set_signal_handling(
        &mut self,
        signal: Signal,
        handling: SignalHandling,
    ) -> Result<SignalHandling> {
        self.sigaction(signal, handling)
    }
}
