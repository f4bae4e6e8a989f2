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

//! This is an internal library crate for the swsh shell. **This crate is not
//! intended to be used as a library by other crates.**
//!
//! The entry point for the shell is the [`main`] function, which is to be used
//! as the `main` function in the binary crate. The function sets up the shell
//! environment and runs the main read-eval loop.
//!
//! # Logging
//!
//! Diagnostic records of the library crates are discarded unless the
//! `SWSH_LOG` environment variable names a log level (`error`, `warn`,
//! `info`, `debug`, or `trace`), in which case they are written to the
//! standard error.

pub mod startup;

use self::startup::args::{Parse, parse};
use self::startup::configure_environment;
use self::startup::input::prepare_input;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::cell::RefCell;
use std::ffi::OsStr;
use std::ops::ControlFlow::{Break, Continue};
use std::os::unix::ffi::OsStrExt as _;
use swsh_env::system::{Signal, SignalHandling, System as _};
use swsh_env::{Env, RealSystem};
use swsh_semantics::trap::run_exit_trap;
use swsh_semantics::{ExitStatus, ReadEvalLoop};
use swsh_syntax::bytes::decode;

/// Name of the environment variable that enables logging
pub const LOG_VARIABLE: &str = "SWSH_LOG";

const USAGE: &str = "\
Usage: swsh [-abCefhimnuvx] [-o option]... [-c command [name [arg...]]]
       swsh [-abCefhimnuvx] [-o option]... [-s] [arg...]
       swsh [-abCefhimnuvx] [-o option]... file [arg...]
       swsh --help | --version
";

/// Parses the value of [`LOG_VARIABLE`].
///
/// Returns `None` if the value does not name a log level.
fn log_level(value: &str) -> Option<LevelFilter> {
    value.trim().parse().ok()
}

/// Installs the logger if requested by the environment.
fn init_logger() {
    let Some(level) = std::env::var(LOG_VARIABLE).ok().as_deref().and_then(log_level) else {
        return;
    };
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Error)
        .build();
    _ = WriteLogger::init(level, config, std::io::stderr());
}

fn print_version(env: &mut Env) {
    let version = env!("CARGO_PKG_VERSION");
    let result = swsh_builtin::common::output(env, &format!("swsh {version}\n"));
    env.exit_status = result.exit_status();
}

fn print_help(env: &mut Env) {
    let result = swsh_builtin::common::output(env, USAGE);
    env.exit_status = result.exit_status();
}

/// Runs the shell with the command line arguments.
///
/// The exit status of the shell is left in `env.exit_status`.
pub fn run_as_shell_process<I, S>(env: &mut Env, args: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    // Parse the command-line arguments
    let run = match parse(args) {
        Ok(Parse::Help) => return print_help(env),
        Ok(Parse::Version) => return print_version(env),
        Ok(Parse::Run(run)) => run,
        Err(e) => {
            env.system.print_error(&format!("swsh: {e}\n"));
            env.exit_status = ExitStatus::ERROR;
            return;
        }
    };

    // Import environment variables
    env.variables.extend_env(
        std::env::vars_os().map(|(name, value)| (os_to_string(&name), os_to_string(&value))),
    );

    let source = configure_environment(env, run);

    // Prepare the input for the main read-eval loop
    let ref_env = RefCell::new(env);
    let lexer = match prepare_input(&ref_env, &source) {
        Ok(lexer) => lexer,
        Err(e) => {
            let mut env = ref_env.borrow_mut();
            env.system.print_error(&format!("swsh: {e}\n"));
            env.exit_status = e.exit_status();
            return;
        }
    };

    // Run the read-eval loop
    let result = ReadEvalLoop::new(&ref_env, &mut { lexer }).run();

    let env = ref_env.into_inner();
    match result {
        Continue(()) => (),
        Break(divert) => {
            log::debug!(target: "swsh::exec", "read-eval loop ended with {divert:?}");
            if let Some(exit_status) = divert.exit_status() {
                env.exit_status = exit_status;
            }
        }
    }
    run_exit_trap(env);
}

/// Converts an argument or environment string without losing bytes.
fn os_to_string(s: &OsStr) -> String {
    decode(s.as_bytes()).into_owned()
}

/// Entry point of the shell
pub fn main() -> ! {
    init_logger();

    // SAFETY: This is the only instance of RealSystem we create in the whole
    // process.
    let system = unsafe { RealSystem::new() };
    let mut env = Env::with_system(Box::new(system));

    // Rust by default sets SIGPIPE to SIG_IGN, which is not desired.
    _ = env.system.sigaction(Signal::SIGPIPE, SignalHandling::Default);

    run_as_shell_process(&mut env, std::env::args_os().map(|arg| os_to_string(&arg)));
    std::process::exit(env.exit_status.0)
}
