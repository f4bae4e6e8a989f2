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
use crate::Env;
use crate::io::Fd;
use crate::option::{IgnoreEof as IgnoreEofOption, Interactive};
use crate::system::System as _;
use std::cell::RefCell;

/// Maximum number of consecutive end-of-file conditions ignored
const MAX_TRIES: usize = 50;

/// `Input` decorator that ignores end-of-file on a terminal.
///
/// If the shell is interactive, the `ignoreeof` option is on, and the file
/// descriptor is a terminal, an empty line (end of input) from the inner
/// input is not passed to the parser. Instead, the decorator prints a message
/// and reads again, up to 50 times in a row.
#[derive(Clone, Debug)]
#[must_use = "IgnoreEof does nothing unless used by a parser"]
pub struct IgnoreEof<'a, 'b, T> {
    /// Inner input to read from
    inner: T,
    /// File descriptor to be checked if it is a terminal
    fd: Fd,
    /// Environment to check the shell options and interact with the system
    env: &'a RefCell<&'b mut Env>,
    /// Text to be displayed when EOF is ignored
    message: String,
}

impl<'a, 'b, T> IgnoreEof<'a, 'b, T> {
    /// Creates a new `IgnoreEof` decorator.
    ///
    /// The `fd` should be the file descriptor the inner input reads from.
    pub fn new(inner: T, fd: Fd, env: &'a RefCell<&'b mut Env>, message: String) -> Self {
        Self {
            inner,
            fd,
            env,
            message,
        }
    }
}

impl<T: Input> Input for IgnoreEof<'_, '_, T> {
    fn next_line(&mut self, context: &Context) -> Result {
        let mut remaining_tries = MAX_TRIES;

        loop {
            let line = self.inner.next_line(context)?;

            let env = &mut **self.env.borrow_mut();
            let should_break = !line.is_empty()
                || !env.options.is_on(Interactive)
                || !env.options.is_on(IgnoreEofOption)
                || remaining_tries == 0
                || !env.system.isatty(self.fd);
            if should_break {
                return Ok(line);
            }

            env.system.print_error(&self.message);
            remaining_tries -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::On;
    use crate::system::VirtualSystem;
    use crate::tests::assert_stderr;
    use std::rc::Rc;
    use swsh_syntax::input::Memory;

    /// `Input` decorator that returns EOF for the first `count` calls
    /// and then reads from the inner input.
    struct EofStub<T> {
        inner: T,
        count: usize,
    }

    impl<T: Input> Input for EofStub<T> {
        fn next_line(&mut self, context: &Context) -> Result {
            if let Some(remaining) = self.count.checked_sub(1) {
                self.count = remaining;
                Ok(Vec::new())
            } else {
                self.inner.next_line(context)
            }
        }
    }

    fn env_with_tty(system: Box<VirtualSystem>) -> Env {
        system.state.borrow_mut().terminals.insert(Fd::STDIN);
        let mut env = Env::with_system(system);
        env.options.set(Interactive, On);
        env.options.set(IgnoreEofOption, On);
        env
    }

    #[test]
    fn eof_ignored_on_terminal() {
        let system = Box::new(VirtualSystem::new());
        let state = Rc::clone(&system.state);
        let mut env = env_with_tty(system);
        let ref_env = RefCell::new(&mut env);
        let inner = EofStub {
            inner: Memory::new(b"echo\n"),
            count: 2,
        };
        let message = "type `exit` to leave the shell\n".to_string();
        let mut input = IgnoreEof::new(inner, Fd::STDIN, &ref_env, message);

        let line = input.next_line(&Context::default()).unwrap();
        assert_eq!(line, b"echo\n");
        assert_stderr(&state, |stderr| {
            assert_eq!(stderr, "type `exit` to leave the shell\n".repeat(2))
        });
    }

    #[test]
    fn eof_accepted_after_many_tries() {
        let system = Box::new(VirtualSystem::new());
        let mut env = env_with_tty(system);
        let ref_env = RefCell::new(&mut env);
        let inner = EofStub {
            inner: Memory::new(b"echo\n"),
            count: MAX_TRIES + 1,
        };
        let mut input = IgnoreEof::new(inner, Fd::STDIN, &ref_env, String::new());
        let line = input.next_line(&Context::default()).unwrap();
        assert_eq!(line, b"");
    }

    #[test]
    fn eof_accepted_on_non_terminal() {
        let system = Box::new(VirtualSystem::new());
        let mut env = env_with_tty(system);
        let ref_env = RefCell::new(&mut env);
        let inner = EofStub {
            inner: Memory::new(b"echo\n"),
            count: 1,
        };
        let mut input = IgnoreEof::new(inner, Fd(3), &ref_env, String::new());
        let line = input.next_line(&Context::default()).unwrap();
        assert_eq!(line, b"");
    }
}
