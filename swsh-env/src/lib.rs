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

//! This crate defines the shell execution environment.
//!
//! A shell execution environment, [`Env`], is a collection of data that may
//! affect or be affected by the execution of commands. The environment consists
//! of application-managed parts and system-managed parts. Application-managed
//! parts are implemented in pure Rust in this crate. Many application-managed
//! parts like [function]s and [variable]s can be manipulated independently of
//! interactions with the underlying system. System-managed parts, on the other
//! hand, depend on the underlying system. Attributes like the working directory
//! and the signal dispositions are managed by the system to be accessed only by
//! interaction with the system interface.
//!
//! The [`System`] trait is the interface to the system-managed parts.
//! [`RealSystem`] provides an implementation for `System` that interacts with
//! the underlying system. [`VirtualSystem`] is a dummy for simulating the
//! system's behavior without affecting the actual system.

pub mod builtin;
pub mod function;
pub mod input;
pub mod io;
pub mod option;
pub mod semantics;
pub mod stack;
pub mod system;
pub mod trap;
pub mod variable;

use self::builtin::Builtin;
use self::function::FunctionSet;
use self::option::{AllExport, ErrExit, Interactive, OptionSet};
use self::semantics::{Divert, ExitStatus};
use self::stack::Stack;
pub use self::system::{RealSystem, SharedSystem, System, VirtualSystem};
use self::trap::TrapSet;
use self::variable::{PS1, PS1_INITIAL_VALUE_ROOT, PWD, Scope, VariableRefMut, VariableSet};
use nix::errno::Errno;
use nix::unistd::Pid;
use std::collections::HashMap;
use std::ops::ControlFlow::{Break, Continue};
use std::os::unix::ffi::OsStrExt as _;
use std::rc::Rc;
use swsh_syntax::alias::AliasSet;
use swsh_syntax::bytes::decode;

/// Whole shell execution environment.
///
/// The shell execution environment consists of application-managed parts and
/// system-managed parts. Application-managed parts are directly implemented in
/// the `Env` instance. System-managed parts are managed by a [`SharedSystem`]
/// that contains an instance of [`System`].
///
/// # Cloning
///
/// `Env::clone` effectively clones the application-managed parts of the
/// environment. Since [`SharedSystem`] is reference-counted, you will not get a
/// deep copy of the system-managed parts. A subshell that runs in the same
/// process uses such a clone, so changes it makes to variables, functions and
/// the like do not leak to the parent.
#[derive(Clone, Debug)]
pub struct Env {
    /// Aliases defined in the environment.
    ///
    /// The `AliasSet` is reference-counted so that the parser can keep using
    /// the aliases while a command on the same line redefines them.
    pub aliases: Rc<AliasSet>,

    /// Name of the current shell executable or shell script
    ///
    /// Special parameter `0` expands to this value.
    pub arg0: String,

    /// Built-in utilities available in the environment.
    pub builtins: HashMap<&'static str, Builtin>,

    /// Exit status of the last executed command.
    pub exit_status: ExitStatus,

    /// Functions defined in the environment.
    pub functions: FunctionSet,

    /// Process ID of the last asynchronous command
    ///
    /// Special parameter `!` expands to this value.
    pub last_async_pid: Option<Pid>,

    /// Process ID of the main shell process
    ///
    /// Special parameter `$` expands to this value. It does not change in
    /// subshells.
    pub main_pid: Pid,

    /// Shell options
    pub options: OptionSet,

    /// Runtime execution context stack
    pub stack: Stack,

    /// Traps defined in the environment.
    pub traps: TrapSet,

    /// Variables and positional parameters defined in the environment.
    pub variables: VariableSet,

    /// Interface to the system-managed parts of the environment.
    pub system: SharedSystem,
}

impl Env {
    /// Creates a new environment with the given system.
    ///
    /// Members of the new environments are default-constructed except that:
    /// - `arg0` is `"sh"`,
    /// - `main_pid` is the process ID of the shell, and
    /// - `system` is a new [`SharedSystem`] containing the given system.
    #[must_use]
    pub fn with_system(system: Box<dyn System>) -> Env {
        let main_pid = system.getpid();
        Env {
            aliases: Default::default(),
            arg0: "sh".to_string(),
            builtins: Default::default(),
            exit_status: Default::default(),
            functions: Default::default(),
            last_async_pid: None,
            main_pid,
            options: Default::default(),
            stack: Default::default(),
            traps: Default::default(),
            variables: Default::default(),
            system: SharedSystem::new(system),
        }
    }

    /// Creates a new environment with a default-constructed [`VirtualSystem`].
    #[must_use]
    pub fn new_virtual() -> Env {
        Env::with_system(Box::<VirtualSystem>::default())
    }

    /// Initializes default variables.
    ///
    /// This function calls [`VariableSet::init`] and then assigns the
    /// following variables:
    ///
    /// - `PS1='# '` if the shell runs as root and `PS1` has not been
    ///   imported from the environment
    /// - `PWD` with the working directory if the imported value does not
    ///   name it
    pub fn init_variables(&mut self) {
        if self.system.is_root() && self.variables.get(PS1).is_none() {
            self.variables
                .get_or_new(PS1, Scope::Global)
                .assign(PS1_INITIAL_VALUE_ROOT)
                .ok();
        }

        let random_seed = self.main_pid.as_raw() as u32;
        self.variables.init(random_seed);

        if let Ok(cwd) = self.system.getcwd() {
            let cwd = decode(cwd.as_os_str().as_bytes());
            let current = self.variables.get(PWD).and_then(|v| v.value.as_deref());
            if current != Some(&*cwd) {
                let mut var = self.variables.get_or_new(PWD, Scope::Global);
                if var.assign(cwd).is_ok() {
                    var.export(true);
                }
            }
        }
    }

    /// Tests whether the shell is interactive.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.options.is_on(Interactive)
    }

    /// Tests whether the [`ErrExit`] option is on and not suppressed.
    ///
    /// The option is suppressed while the shell runs the condition of an `if`
    /// or a loop, a non-final member of an and-or list, or a negated pipeline.
    #[must_use]
    pub fn errexit_is_applicable(&self) -> bool {
        self.options.is_on(ErrExit) && !self.stack.is_in_condition()
    }

    /// Exits the shell if the last command failed and [`ErrExit`] applies.
    ///
    /// Returns `Break(Divert::Exit(None))` if the exit status is non-zero and
    /// [`errexit_is_applicable`](Self::errexit_is_applicable) is true.
    /// Otherwise, returns `Continue(())`.
    pub fn apply_errexit(&self) -> semantics::Result {
        if !self.exit_status.is_successful() && self.errexit_is_applicable() {
            Break(Divert::Exit(None))
        } else {
            Continue(())
        }
    }

    /// Gets a mutable reference to the variable with the specified name.
    ///
    /// This is a wrapper around [`VariableSet::get_or_new`] that exports the
    /// variable if the [`AllExport`] option is on.
    pub fn get_or_create_variable<S>(&mut self, name: S, scope: Scope) -> VariableRefMut<'_>
    where
        S: Into<String>,
    {
        let mut variable = self.variables.get_or_new(name, scope);
        if self.options.is_on(AllExport) {
            variable.export(true);
        }
        variable
    }

    /// Convenience function that prints the given error message.
    ///
    /// This function prints `sh: {message}\n` to the standard error of this
    /// environment. Any errors that may happen writing to the standard error
    /// are ignored.
    pub fn print_error(&mut self, message: &str) {
        self.system.print_error(&format!("sh: {message}\n"));
    }

    /// Convenience function that prints an error message for the given `errno`.
    ///
    /// This function prints `sh: {message}: {errno.desc()}\n` to the standard
    /// error of this environment.
    pub fn print_system_error(&mut self, errno: Errno, message: &str) {
        self.print_error(&format!("{message}: {}", errno.desc()))
    }

    /// Moves the signals caught by the system to the trap set.
    ///
    /// The signal handler only records the signals. The read-eval loop and
    /// the command runners call this function at safe points, and then run the
    /// trap actions that have become pending.
    pub fn catch_signals(&mut self) {
        for signal in self.system.caught_signals() {
            self.traps.catch_signal(signal);
        }
    }
}
