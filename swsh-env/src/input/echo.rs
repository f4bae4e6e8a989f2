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
use crate::option::Verbose;
use std::cell::RefCell;

/// `Input` decorator that echoes the input.
///
/// This decorator adds the behavior of the `verbose` shell option to the
/// input. If the option is on, every line read from the inner input is
/// printed to the standard error.
#[derive(Clone, Debug)]
#[must_use = "Echo does nothing unless used by a parser"]
pub struct Echo<'a, 'b, T> {
    inner: T,
    env: &'a RefCell<&'b mut Env>,
}

impl<'a, 'b, T> Echo<'a, 'b, T> {
    /// Creates a new `Echo` decorator.
    ///
    /// The first argument is the inner `Input` that performs the actual input
    /// operation. The second argument is the shell environment that contains
    /// the shell option state and the system interface to print to the
    /// standard error.
    pub fn new(inner: T, env: &'a RefCell<&'b mut Env>) -> Self {
        Self { inner, env }
    }
}

impl<T: Input> Input for Echo<'_, '_, T> {
    fn next_line(&mut self, context: &Context) -> Result {
        let line = self.inner.next_line(context)?;

        let env = &mut **self.env.borrow_mut();
        if env.options.is_on(Verbose) {
            let _ = env.system.write_all(Fd::STDERR, &line);
        }

        Ok(line)
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

    #[test]
    fn verbose_off() {
        let system = Box::new(VirtualSystem::new());
        let state = Rc::clone(&system.state);
        let mut env = Env::with_system(system);
        let ref_env = RefCell::new(&mut env);
        let mut echo = Echo::new(Memory::new(b"echo test\n"), &ref_env);

        let line = echo.next_line(&Context::default()).unwrap();
        assert_eq!(line, b"echo test\n");
        assert_stderr(&state, |stderr| assert_eq!(stderr, ""));
    }

    #[test]
    fn verbose_on() {
        let system = Box::new(VirtualSystem::new());
        let state = Rc::clone(&system.state);
        let mut env = Env::with_system(system);
        env.options.set(Verbose, On);
        let ref_env = RefCell::new(&mut env);
        let mut echo = Echo::new(Memory::new(b"echo test\nfoo"), &ref_env);

        let line = echo.next_line(&Context::default()).unwrap();
        assert_eq!(line, b"echo test\n");
        assert_stderr(&state, |stderr| assert_eq!(stderr, "echo test\n"));

        let line = echo.next_line(&Context::default()).unwrap();
        assert_eq!(line, b"foo");
        assert_stderr(&state, |stderr| assert_eq!(stderr, "echo test\nfoo"));
    }
}
