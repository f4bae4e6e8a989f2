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

//! Implementation of `System` that actually interacts with the system.

use super::Errno;
use super::ForkResult;
use super::Pid;
use super::Result;
use super::Signal;
use super::SignalHandling;
use super::System;
use super::WaitStatus;
use crate::io::Fd;
use nix::fcntl::OFlag;
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet};
use nix::sys::stat::Mode;
use std::convert::Infallible;
use std::ffi::c_int;
use std::ffi::CStr;
use std::ffi::CString;
use std::ffi::OsStr;
use std::ffi::OsString;
use std::io::SeekFrom;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::IntoRawFd;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

/// Number of slots in [`PENDING`]
///
/// Signal numbers not less than this value are not caught.
const SIGNAL_SLOTS: usize = 65;

/// Flags raised by [`catch_signal`], indexed by signal number
static PENDING: [AtomicBool; SIGNAL_SLOTS] = [const { AtomicBool::new(false) }; SIGNAL_SLOTS];

/// Number of times [`catch_signal`] has been called
static CAUGHT_COUNT: AtomicUsize = AtomicUsize::new(0);

/// Signal catching function.
///
/// This function only raises the flag for the signal and increments the
/// counter. The shell examines the flags at its next safe point.
extern "C" fn catch_signal(signal: c_int) {
    // This function can only perform async-signal-safe operations.
    let Some(flag) = usize::try_from(signal).ok().and_then(|i| PENDING.get(i)) else {
        return;
    };
    flag.store(true, Ordering::Relaxed);
    CAUGHT_COUNT.fetch_add(1, Ordering::Release);
}

/// Calls the function repeatedly while it fails with `EINTR`.
fn retry<T, F: FnMut() -> Result<T>>(mut f: F) -> Result<T> {
    loop {
        match f() {
            Err(Errno::EINTR) => (),
            result => return result,
        }
    }
}

fn to_path(path: &CStr) -> &Path {
    Path::new(OsStr::from_bytes(path.to_bytes()))
}

fn errno_of(error: &std::io::Error) -> Errno {
    Errno::from_raw(error.raw_os_error().unwrap_or(libc::EIO))
}

/// Implementation of `System` that actually interacts with the system.
///
/// `RealSystem` only remembers how many signals it has seen because the
/// underlying operating system manages the rest of the state.
#[derive(Debug)]
pub struct RealSystem {
    seen_count: usize,
}

impl RealSystem {
    /// Returns an instance of `RealSystem`.
    ///
    /// # Safety
    ///
    /// This function is marked `unsafe` because improper use of `RealSystem`
    /// may lead to undefined behavior. Most operations performed on the
    /// system are not thread-safe. You should never use `RealSystem` in a
    /// multi-threaded program, and it is your responsibility to make sure you
    /// are using only one instance of `RealSystem` in the process.
    pub unsafe fn new() -> Self {
        RealSystem { seen_count: 0 }
    }
}

impl System for RealSystem {
    fn is_executable_file(&self, path: &CStr) -> bool {
        self.is_regular_file(path)
            && unsafe {
                libc::faccessat(libc::AT_FDCWD, path.as_ptr(), libc::X_OK, libc::AT_EACCESS) == 0
            }
    }

    fn is_directory(&self, path: &CStr) -> bool {
        std::fs::metadata(to_path(path)).is_ok_and(|metadata| metadata.is_dir())
    }

    fn is_regular_file(&self, path: &CStr) -> bool {
        std::fs::metadata(to_path(path)).is_ok_and(|metadata| metadata.is_file())
    }

    fn pipe(&mut self) -> Result<(Fd, Fd)> {
        let mut fds = [0; 2];
        let result = unsafe { libc::pipe(fds.as_mut_ptr()) };
        Errno::result(result)?;
        Ok((Fd(fds[0]), Fd(fds[1])))
    }

    fn dup(&mut self, from: Fd, to_min: Fd, cloexec: bool) -> Result<Fd> {
        let command = if cloexec {
            libc::F_DUPFD_CLOEXEC
        } else {
            libc::F_DUPFD
        };
        let result = unsafe { libc::fcntl(from.0, command, to_min.0) };
        Errno::result(result).map(Fd)
    }

    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd> {
        retry(|| Errno::result(unsafe { libc::dup2(from.0, to.0) }).map(Fd))
    }

    fn open(&mut self, path: &CStr, flags: OFlag, mode: Mode) -> Result<Fd> {
        retry(|| {
            let result =
                unsafe { libc::open(path.as_ptr(), flags.bits(), mode.bits() as libc::c_uint) };
            Errno::result(result).map(Fd)
        })
    }

    fn open_tmpfile(&mut self) -> Result<Fd> {
        match tempfile::tempfile() {
            Ok(file) => Ok(Fd(file.into_raw_fd())),
            Err(error) => Err(errno_of(&error)),
        }
    }

    fn close(&mut self, fd: Fd) -> Result<()> {
        match Errno::result(unsafe { libc::close(fd.0) }) {
            Ok(_) | Err(Errno::EBADF) | Err(Errno::EINTR) => Ok(()),
            Err(errno) => Err(errno),
        }
    }

    fn isatty(&self, fd: Fd) -> bool {
        unsafe { libc::isatty(fd.0) == 1 }
    }

    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize> {
        retry(|| {
            let result = unsafe { libc::read(fd.0, buffer.as_mut_ptr().cast(), buffer.len()) };
            Errno::result(result).map(|count| count as usize)
        })
    }

    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize> {
        retry(|| {
            let result = unsafe { libc::write(fd.0, buffer.as_ptr().cast(), buffer.len()) };
            Errno::result(result).map(|count| count as usize)
        })
    }

    fn lseek(&mut self, fd: Fd, position: SeekFrom) -> Result<u64> {
        let (offset, whence) = match position {
            SeekFrom::Start(offset) => {
                let offset = offset.try_into().map_err(|_| Errno::EOVERFLOW)?;
                (offset, libc::SEEK_SET)
            }
            SeekFrom::End(offset) => (offset, libc::SEEK_END),
            SeekFrom::Current(offset) => (offset, libc::SEEK_CUR),
        };
        let offset = offset.try_into().map_err(|_| Errno::EOVERFLOW)?;
        let result = unsafe { libc::lseek(fd.0, offset, whence) };
        Errno::result(result).map(|new_offset| new_offset as u64)
    }

    fn read_dir(&self, path: &CStr) -> Result<Vec<OsString>> {
        let entries = std::fs::read_dir(to_path(path)).map_err(|e| errno_of(&e))?;
        entries
            .map(|entry| entry.map(|entry| entry.file_name()).map_err(|e| errno_of(&e)))
            .collect()
    }

    fn sigaction(&mut self, signal: Signal, handling: SignalHandling) -> Result<SignalHandling> {
        let handler = match handling {
            SignalHandling::Default => SigHandler::SigDfl,
            SignalHandling::Ignore => SigHandler::SigIgn,
            SignalHandling::Catch => SigHandler::Handler(catch_signal),
        };
        let new_action = SigAction::new(handler, SaFlags::empty(), SigSet::empty());
        // SAFETY: The `catch_signal` function only accesses atomic variables.
        let old_action = unsafe { nix::sys::signal::sigaction(signal, &new_action) }?;
        let old_handling = match old_action.handler() {
            SigHandler::SigDfl => SignalHandling::Default,
            SigHandler::SigIgn => SignalHandling::Ignore,
            SigHandler::Handler(_) | SigHandler::SigAction(_) => SignalHandling::Catch,
        };
        Ok(old_handling)
    }

    fn caught_signals(&mut self) -> Vec<Signal> {
        let count = CAUGHT_COUNT.load(Ordering::Acquire);
        if count == self.seen_count {
            return Vec::new();
        }
        self.seen_count = count;

        PENDING
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, flag)| flag.swap(false, Ordering::Relaxed))
            .filter_map(|(number, _)| Signal::try_from(number as c_int).ok())
            .collect()
    }

    fn getpid(&self) -> Pid {
        nix::unistd::getpid()
    }

    fn getppid(&self) -> Pid {
        nix::unistd::getppid()
    }

    fn is_root(&self) -> bool {
        nix::unistd::geteuid().is_root()
    }

    fn getcwd(&self) -> Result<PathBuf> {
        nix::unistd::getcwd()
    }

    fn chdir(&mut self, path: &CStr) -> Result<()> {
        nix::unistd::chdir(path)
    }

    fn getpwnam_dir(&self, name: &str) -> Result<Option<PathBuf>> {
        nix::unistd::User::from_name(name).map(|user| user.map(|passwd| passwd.dir))
    }

    fn fork_supported(&self) -> bool {
        true
    }

    fn fork(&mut self) -> Result<ForkResult> {
        // SAFETY: As stated on RealSystem::new, the caller is responsible for
        // making only one instance of RealSystem in the process.
        unsafe { nix::unistd::fork() }
    }

    /// Starts an external utility.
    ///
    /// This implementation forks the process and calls `execve` in the child.
    /// If `execve` fails, the child exits with status 127 if the file is not
    /// found and 126 otherwise.
    fn spawn(&mut self, path: &CStr, args: &[CString], envs: &[CString]) -> Result<Pid> {
        match self.fork()? {
            ForkResult::Parent { child } => Ok(child),
            ForkResult::Child => {
                let Err(errno) = self.execve(path, args, envs);
                let status = if errno == Errno::ENOENT { 127 } else { 126 };
                unsafe { libc::_exit(status) }
            }
        }
    }

    fn wait(&mut self, target: Pid) -> Result<WaitStatus> {
        retry(|| nix::sys::wait::waitpid(target, None))
    }

    fn execve(&mut self, path: &CStr, args: &[CString], envs: &[CString]) -> Result<Infallible> {
        retry(|| nix::unistd::execve(path, args, envs))
    }
}
