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

//! System simulated in Rust.
//!
//! [`VirtualSystem`] is an implementation of [`System`] that simulates the
//! behavior of the underlying system without any interaction with the actual
//! operating system. It is used for testing the behavior of the shell.
//!
//! The virtual system runs a single process. It cannot fork, so the shell
//! runs subshells in-process. External utilities started by
//! [`spawn`](System::spawn) are not run at all; the system records each
//! invocation as an [`Execution`] and reports the child as having exited
//! successfully.

mod file_system;
mod io;

pub use self::file_system::*;
pub use self::io::*;
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
use nix::sys::stat::Mode;
use std::cell::Ref;
use std::cell::RefCell;
use std::cell::RefMut;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::ffi::CStr;
use std::ffi::CString;
use std::ffi::OsStr;
use std::ffi::OsString;
use std::io::SeekFrom;
use std::os::unix::ffi::OsStrExt;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;
use swsh_syntax::bytes::decode;

/// Record of an external utility invocation
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Execution {
    /// Path to the executable
    pub path: CString,
    /// Command line arguments including the utility name
    pub args: Vec<CString>,
    /// Environment variables in the `name=value` form
    pub envs: Vec<CString>,
}

/// State of the virtual system
#[derive(Debug)]
pub struct SystemState {
    /// Files
    pub file_system: FileSystem,
    /// Open file descriptors of the process
    pub fds: BTreeMap<Fd, FdBody>,
    /// Current working directory
    pub cwd: PathBuf,
    /// Process ID of the process
    pub pid: Pid,
    /// Process ID of the parent process
    pub ppid: Pid,
    /// Whether the effective user is the superuser
    pub is_root: bool,
    /// File descriptors that are regarded as terminals
    pub terminals: BTreeSet<Fd>,
    /// Home directories by user name
    pub home_dirs: HashMap<String, PathBuf>,
    /// Current signal dispositions
    ///
    /// Signals not in the map have the default disposition.
    pub signal_handlings: HashMap<Signal, SignalHandling>,
    /// Signals caught but not yet reported by `caught_signals`
    pub caught_signals: BTreeSet<Signal>,
    /// External utilities started so far
    pub executions: Vec<Execution>,
    /// Children that have terminated but not yet been waited for
    pub children: HashMap<Pid, WaitStatus>,
    next_pid: i32,
}

impl SystemState {
    /// Simulates delivery of a signal to the process.
    ///
    /// The signal is recorded as caught if the process catches it.
    /// Otherwise, this function does nothing; the virtual process is never
    /// terminated by a signal.
    pub fn raise_signal(&mut self, signal: Signal) {
        if self.signal_handlings.get(&signal) == Some(&SignalHandling::Catch) {
            self.caught_signals.insert(signal);
        }
    }

    /// Returns the content of a regular file as a string.
    ///
    /// This is a convenience function for examining output in tests.
    /// Returns an empty string if the file is not a regular file. Bytes that
    /// are not valid UTF-8 are converted by [`decode`].
    #[must_use]
    pub fn file_content<P: AsRef<Path>>(&self, path: P) -> String {
        let Ok(file) = self.file_system.get(path) else {
            return String::new();
        };
        let file = file.borrow();
        match &file.body {
            FileBody::Regular { content, .. } => decode(content).into_owned(),
            _ => String::new(),
        }
    }

    /// Opens a new file descriptor with the minimum unused number not less
    /// than `min`.
    fn open_fd(&mut self, min: Fd, body: FdBody) -> Fd {
        let mut fd = min;
        for &used in self.fds.range(min..).map(|(fd, _)| fd) {
            if used != fd {
                break;
            }
            fd = Fd(fd.0 + 1);
        }
        self.fds.insert(fd, body);
        fd
    }
}

/// Simulated system
///
/// A `VirtualSystem` shares its [`SystemState`] through `Rc` so that a test
/// can keep a reference to the state after passing the system to the
/// environment.
#[derive(Clone, Debug)]
pub struct VirtualSystem {
    /// State of the system.
    pub state: Rc<RefCell<SystemState>>,
}

impl VirtualSystem {
    /// Creates a virtual system with an almost empty state.
    ///
    /// The file system contains files named `/dev/stdin`, `/dev/stdout`, and
    /// `/dev/stderr` that are opened with file descriptors 0, 1, and 2,
    /// respectively. The file system also contains an empty directory `/tmp`.
    /// The process ID is 2 and the working directory is `/`.
    pub fn new() -> VirtualSystem {
        let mut state = SystemState {
            file_system: FileSystem::default(),
            fds: BTreeMap::new(),
            cwd: PathBuf::from("/"),
            pid: Pid::from_raw(2),
            ppid: Pid::from_raw(1),
            is_root: false,
            terminals: BTreeSet::new(),
            home_dirs: HashMap::new(),
            signal_handlings: HashMap::new(),
            caught_signals: BTreeSet::new(),
            executions: Vec::new(),
            children: HashMap::new(),
            next_pid: 3,
        };

        for (path, fd) in [
            ("/dev/stdin", Fd::STDIN),
            ("/dev/stdout", Fd::STDOUT),
            ("/dev/stderr", Fd::STDERR),
        ] {
            let file = Rc::new(RefCell::new(INode::new([])));
            // Saving to the fresh root directory never fails.
            let _ = state.file_system.save(path, Rc::clone(&file));
            let ofd = OpenFileDescription::new(file, true, true, true);
            let body = FdBody {
                open_file_description: Rc::new(RefCell::new(ofd)),
                cloexec: false,
            };
            state.fds.insert(fd, body);
        }
        let tmp = Rc::new(RefCell::new(INode::directory()));
        let _ = state.file_system.save("/tmp", tmp);

        VirtualSystem {
            state: Rc::new(RefCell::new(state)),
        }
    }

    fn state(&self) -> Ref<'_, SystemState> {
        self.state.borrow()
    }

    fn state_mut(&self) -> RefMut<'_, SystemState> {
        self.state.borrow_mut()
    }

    fn resolve(&self, path: &CStr) -> PathBuf {
        let path = Path::new(OsStr::from_bytes(path.to_bytes()));
        self.state().cwd.join(path)
    }

    fn inode(&self, path: &CStr) -> Result<Rc<RefCell<INode>>> {
        let path = self.resolve(path);
        self.state().file_system.get(path)
    }

    fn open_file_description(&self, fd: Fd) -> Result<Rc<RefCell<OpenFileDescription>>> {
        let state = self.state();
        let body = state.fds.get(&fd).ok_or(Errno::EBADF)?;
        Ok(Rc::clone(&body.open_file_description))
    }
}

impl Default for VirtualSystem {
    fn default() -> Self {
        VirtualSystem::new()
    }
}

impl System for VirtualSystem {
    fn is_executable_file(&self, path: &CStr) -> bool {
        self.inode(path)
            .is_ok_and(|inode| inode.borrow().is_executable())
    }

    fn is_directory(&self, path: &CStr) -> bool {
        self.inode(path)
            .is_ok_and(|inode| matches!(inode.borrow().body, FileBody::Directory { .. }))
    }

    fn is_regular_file(&self, path: &CStr) -> bool {
        self.inode(path)
            .is_ok_and(|inode| matches!(inode.borrow().body, FileBody::Regular { .. }))
    }

    fn pipe(&mut self) -> Result<(Fd, Fd)> {
        let file = Rc::new(RefCell::new(INode {
            body: FileBody::Fifo {
                content: VecDeque::new(),
                readers: 0,
                writers: 0,
            },
            permissions: Mode::from_bits_truncate(0o600),
        }));
        let reader = OpenFileDescription::new(Rc::clone(&file), true, false, false);
        let writer = OpenFileDescription::new(file, false, true, false);
        let mut state = self.state_mut();
        let reader = state.open_fd(
            Fd(0),
            FdBody {
                open_file_description: Rc::new(RefCell::new(reader)),
                cloexec: false,
            },
        );
        let writer = state.open_fd(
            Fd(0),
            FdBody {
                open_file_description: Rc::new(RefCell::new(writer)),
                cloexec: false,
            },
        );
        Ok((reader, writer))
    }

    fn dup(&mut self, from: Fd, to_min: Fd, cloexec: bool) -> Result<Fd> {
        let mut state = self.state_mut();
        let mut body = state.fds.get(&from).ok_or(Errno::EBADF)?.clone();
        body.cloexec = cloexec;
        Ok(state.open_fd(to_min, body))
    }

    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd> {
        let mut state = self.state_mut();
        let mut body = state.fds.get(&from).ok_or(Errno::EBADF)?.clone();
        if from != to {
            body.cloexec = false;
            let old = state.fds.insert(to, body);
            drop(state);
            drop(old);
        }
        Ok(to)
    }

    fn open(&mut self, path: &CStr, flags: OFlag, mode: Mode) -> Result<Fd> {
        let path = self.resolve(path);
        let mut state = self.state_mut();
        let access = flags & OFlag::O_ACCMODE;
        let is_readable = access != OFlag::O_WRONLY;
        let is_writable = access != OFlag::O_RDONLY;

        let file = match state.file_system.get(&path) {
            Ok(inode) => {
                if flags.contains(OFlag::O_CREAT | OFlag::O_EXCL) {
                    return Err(Errno::EEXIST);
                }
                match &mut inode.borrow_mut().body {
                    FileBody::Directory { .. } if is_writable => return Err(Errno::EISDIR),
                    FileBody::Regular { content, .. } if flags.contains(OFlag::O_TRUNC) => {
                        content.clear()
                    }
                    _ => (),
                }
                inode
            }
            Err(Errno::ENOENT) if flags.contains(OFlag::O_CREAT) => {
                let mut inode = INode::new([]);
                inode.permissions = mode;
                let inode = Rc::new(RefCell::new(inode));
                state.file_system.save(&path, Rc::clone(&inode))?;
                inode
            }
            Err(errno) => return Err(errno),
        };

        let ofd = OpenFileDescription::new(
            file,
            is_readable,
            is_writable,
            flags.contains(OFlag::O_APPEND),
        );
        let body = FdBody {
            open_file_description: Rc::new(RefCell::new(ofd)),
            cloexec: flags.contains(OFlag::O_CLOEXEC),
        };
        Ok(state.open_fd(Fd(0), body))
    }

    fn open_tmpfile(&mut self) -> Result<Fd> {
        let file = Rc::new(RefCell::new(INode::new([])));
        let ofd = OpenFileDescription::new(file, true, true, false);
        let body = FdBody {
            open_file_description: Rc::new(RefCell::new(ofd)),
            cloexec: false,
        };
        Ok(self.state_mut().open_fd(Fd(0), body))
    }

    fn close(&mut self, fd: Fd) -> Result<()> {
        let old = self.state_mut().fds.remove(&fd);
        drop(old);
        Ok(())
    }

    fn isatty(&self, fd: Fd) -> bool {
        self.state().terminals.contains(&fd)
    }

    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize> {
        self.open_file_description(fd)?.borrow_mut().read(buffer)
    }

    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize> {
        self.open_file_description(fd)?.borrow_mut().write(buffer)
    }

    fn lseek(&mut self, fd: Fd, position: SeekFrom) -> Result<u64> {
        self.open_file_description(fd)?.borrow_mut().seek(position)
    }

    fn read_dir(&self, path: &CStr) -> Result<Vec<OsString>> {
        let inode = self.inode(path)?;
        let inode = inode.borrow();
        match &inode.body {
            FileBody::Directory { files } => Ok(files.keys().cloned().collect()),
            _ => Err(Errno::ENOTDIR),
        }
    }

    fn sigaction(&mut self, signal: Signal, handling: SignalHandling) -> Result<SignalHandling> {
        let mut state = self.state_mut();
        let old = state.signal_handlings.insert(signal, handling);
        if handling != SignalHandling::Catch {
            state.caught_signals.remove(&signal);
        }
        Ok(old.unwrap_or_default())
    }

    fn caught_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.state_mut().caught_signals)
            .into_iter()
            .collect()
    }

    fn getpid(&self) -> Pid {
        self.state().pid
    }

    fn getppid(&self) -> Pid {
        self.state().ppid
    }

    fn is_root(&self) -> bool {
        self.state().is_root
    }

    fn getcwd(&self) -> Result<PathBuf> {
        Ok(self.state().cwd.clone())
    }

    fn chdir(&mut self, path: &CStr) -> Result<()> {
        let inode = self.inode(path)?;
        if !matches!(inode.borrow().body, FileBody::Directory { .. }) {
            return Err(Errno::ENOTDIR);
        }
        let mut cwd = PathBuf::from("/");
        for component in self.resolve(path).components() {
            match component {
                Component::Normal(name) => cwd.push(name),
                Component::ParentDir => {
                    cwd.pop();
                }
                Component::Prefix(_) | Component::RootDir | Component::CurDir => (),
            }
        }
        self.state_mut().cwd = cwd;
        Ok(())
    }

    fn getpwnam_dir(&self, name: &str) -> Result<Option<PathBuf>> {
        Ok(self.state().home_dirs.get(name).cloned())
    }

    fn fork_supported(&self) -> bool {
        false
    }

    fn fork(&mut self) -> Result<ForkResult> {
        Err(Errno::ENOSYS)
    }

    /// Records the execution of an external utility.
    ///
    /// The returned child is considered to have exited with status 0.
    fn spawn(&mut self, path: &CStr, args: &[CString], envs: &[CString]) -> Result<Pid> {
        let inode = self.inode(path)?;
        if !inode.borrow().is_executable() {
            return Err(Errno::EACCES);
        }
        let mut state = self.state_mut();
        state.executions.push(Execution {
            path: path.to_owned(),
            args: args.to_vec(),
            envs: envs.to_vec(),
        });
        let pid = Pid::from_raw(state.next_pid);
        state.next_pid += 1;
        state.children.insert(pid, WaitStatus::Exited(pid, 0));
        Ok(pid)
    }

    fn wait(&mut self, target: Pid) -> Result<WaitStatus> {
        self.state_mut()
            .children
            .remove(&target)
            .ok_or(Errno::ECHILD)
    }

    fn execve(&mut self, path: &CStr, args: &[CString], envs: &[CString]) -> Result<Infallible> {
        self.state_mut().executions.push(Execution {
            path: path.to_owned(),
            args: args.to_vec(),
            envs: envs.to_vec(),
        });
        Err(Errno::ENOSYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    #[test]
    fn standard_fds_are_files() {
        let mut system = VirtualSystem::new();
        system.write(Fd::STDOUT, b"out").unwrap();
        system.write(Fd::STDERR, b"err").unwrap();
        let state = system.state.borrow();
        assert_eq!(state.file_content("/dev/stdout"), "out");
        assert_eq!(state.file_content("/dev/stderr"), "err");
    }

    #[test]
    fn pipe_read_write() {
        let mut system = VirtualSystem::new();
        let (reader, writer) = system.pipe().unwrap();
        assert_eq!(reader, Fd(3));
        assert_eq!(writer, Fd(4));
        assert_eq!(system.write(writer, b"xyz"), Ok(3));
        let mut buffer = [0; 5];
        assert_eq!(system.read(reader, &mut buffer), Ok(3));
        assert_eq!(system.read(reader, &mut buffer), Err(Errno::EAGAIN));
        system.close(writer).unwrap();
        assert_eq!(system.read(reader, &mut buffer), Ok(0));
    }

    #[test]
    fn dup_shares_open_file_description() {
        let mut system = VirtualSystem::new();
        let fd = system.dup(Fd::STDOUT, Fd(10), true).unwrap();
        assert_eq!(fd, Fd(10));
        let fd2 = system.dup(Fd::STDOUT, Fd(10), false).unwrap();
        assert_eq!(fd2, Fd(11));
        system.write(fd, b"a").unwrap();
        system.write(Fd::STDOUT, b"b").unwrap();
        let state = system.state.borrow();
        assert_eq!(state.file_content("/dev/stdout"), "ab");
        assert!(state.fds[&fd].cloexec);
        assert!(!state.fds[&fd2].cloexec);
    }

    #[test]
    fn dup2_replaces_fd() {
        let mut system = VirtualSystem::new();
        let fd = system.dup(Fd::STDOUT, Fd(10), true).unwrap();
        assert_eq!(system.dup2(Fd::STDERR, Fd::STDOUT), Ok(Fd::STDOUT));
        system.write(Fd::STDOUT, b"to stderr").unwrap();
        assert_eq!(system.dup2(fd, Fd::STDOUT), Ok(Fd::STDOUT));
        system.write(Fd::STDOUT, b"to stdout").unwrap();
        let state = system.state.borrow();
        assert_eq!(state.file_content("/dev/stderr"), "to stderr");
        assert_eq!(state.file_content("/dev/stdout"), "to stdout");
        assert!(!state.fds[&Fd::STDOUT].cloexec);
    }

    #[test]
    fn dup_closed_fd() {
        let mut system = VirtualSystem::new();
        assert_eq!(system.dup(Fd(5), Fd(10), false), Err(Errno::EBADF));
        assert_eq!(system.dup2(Fd(5), Fd(1)), Err(Errno::EBADF));
    }

    #[test]
    fn open_creating_and_truncating() {
        let mut system = VirtualSystem::new();
        let path = c("/tmp/file");
        let flags = OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC;
        let mode = Mode::from_bits_truncate(0o666);
        let fd = system.open(&path, flags, mode).unwrap();
        assert_eq!(fd, Fd(3));
        system.write(fd, b"hello").unwrap();
        system.close(fd).unwrap();

        let fd = system.open(&path, flags, mode).unwrap();
        system.write(fd, b"hi").unwrap();
        assert_eq!(system.state.borrow().file_content("/tmp/file"), "hi");
    }

    #[test]
    fn open_appending() {
        let mut system = VirtualSystem::new();
        let path = c("/tmp/file");
        let flags = OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND;
        let mode = Mode::from_bits_truncate(0o666);
        let fd = system.open(&path, flags, mode).unwrap();
        system.write(fd, b"1").unwrap();
        let fd2 = system.open(&path, flags, mode).unwrap();
        system.write(fd2, b"2").unwrap();
        system.write(fd, b"3").unwrap();
        assert_eq!(system.state.borrow().file_content("/tmp/file"), "123");
    }

    #[test]
    fn open_errors() {
        let mut system = VirtualSystem::new();
        let mode = Mode::empty();
        assert_eq!(
            system.open(&c("/no/such/file"), OFlag::O_RDONLY, mode),
            Err(Errno::ENOENT)
        );
        assert_eq!(
            system.open(&c("/tmp"), OFlag::O_WRONLY, mode),
            Err(Errno::EISDIR)
        );
        let flags = OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_EXCL;
        assert_eq!(system.open(&c("/dev/stdout"), flags, mode), Err(Errno::EEXIST));
    }

    #[test]
    fn chdir_normalizes_path() {
        let mut system = VirtualSystem::new();
        let dir = Rc::new(RefCell::new(INode::directory()));
        system.state.borrow_mut().file_system.save("/a/b", dir).unwrap();
        system.chdir(&c("/a/b/../b/.")).unwrap();
        assert_eq!(system.getcwd().unwrap(), PathBuf::from("/a/b"));
        system.chdir(&c("..")).unwrap();
        assert_eq!(system.getcwd().unwrap(), PathBuf::from("/a"));
    }

    #[test]
    fn chdir_to_non_directory() {
        let mut system = VirtualSystem::new();
        assert_eq!(system.chdir(&c("/dev/stdout")), Err(Errno::ENOTDIR));
        assert_eq!(system.chdir(&c("/no/such")), Err(Errno::ENOENT));
        assert_eq!(system.getcwd().unwrap(), PathBuf::from("/"));
    }

    #[test]
    fn open_relative_to_cwd() {
        let mut system = VirtualSystem::new();
        system.state.borrow_mut().cwd = PathBuf::from("/tmp");
        let flags = OFlag::O_WRONLY | OFlag::O_CREAT;
        let fd = system.open(&c("f"), flags, Mode::empty()).unwrap();
        system.write(fd, b"!").unwrap();
        assert_eq!(system.state.borrow().file_content("/tmp/f"), "!");
    }

    #[test]
    fn tmpfile_can_be_rewound() {
        let mut system = VirtualSystem::new();
        let fd = system.open_tmpfile().unwrap();
        system.write(fd, b"data").unwrap();
        assert_eq!(system.lseek(fd, SeekFrom::Start(0)), Ok(0));
        let mut buffer = [0; 8];
        assert_eq!(system.read(fd, &mut buffer), Ok(4));
        assert_eq!(&buffer[..4], b"data");
    }

    #[test]
    fn read_dir_lists_entries() {
        let system = VirtualSystem::new();
        let mut names = system.read_dir(&c("/dev")).unwrap();
        names.sort();
        assert_eq!(names, ["stderr", "stdin", "stdout"]);
        assert_eq!(system.read_dir(&c("/dev/stdin")), Err(Errno::ENOTDIR));
    }

    #[test]
    fn signals_are_caught_only_when_catching() {
        let mut system = VirtualSystem::new();
        system.state.borrow_mut().raise_signal(Signal::SIGINT);
        assert_eq!(system.caught_signals(), []);

        system.sigaction(Signal::SIGINT, SignalHandling::Catch).unwrap();
        system.sigaction(Signal::SIGTERM, SignalHandling::Catch).unwrap();
        system.state.borrow_mut().raise_signal(Signal::SIGTERM);
        system.state.borrow_mut().raise_signal(Signal::SIGINT);
        assert_eq!(system.caught_signals(), [Signal::SIGINT, Signal::SIGTERM]);
        assert_eq!(system.caught_signals(), []);
    }

    #[test]
    fn spawn_records_execution() {
        let mut system = VirtualSystem::new();
        let file = Rc::new(RefCell::new(INode::executable()));
        system
            .state
            .borrow_mut()
            .file_system
            .save("/bin/ls", file)
            .unwrap();
        let args = [c("ls"), c("-l")];
        let envs = [c("A=1")];
        let pid = system.spawn(&c("/bin/ls"), &args, &envs).unwrap();
        assert_eq!(system.wait(pid), Ok(WaitStatus::Exited(pid, 0)));
        assert_eq!(system.wait(pid), Err(Errno::ECHILD));

        let state = system.state.borrow();
        assert_eq!(state.executions.len(), 1);
        assert_eq!(state.executions[0].args, args);
        assert_eq!(state.executions[0].envs, envs);
    }

    #[test]
    fn spawn_errors() {
        let mut system = VirtualSystem::new();
        assert_eq!(system.spawn(&c("/bin/none"), &[], &[]), Err(Errno::ENOENT));
        assert_eq!(system.spawn(&c("/dev/stdin"), &[], &[]), Err(Errno::EACCES));
        assert!(!system.fork_supported());
    }
}
