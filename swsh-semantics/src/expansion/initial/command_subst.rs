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

//! Command substitution

use super::{ErrorCause, Expander, Result};
use crate::runner::run_source;
use crate::subshell::{start_subshell, wait_subshell};
use swsh_env::System;
use swsh_env::system::Errno;

/// Removes backslashes that quote special characters in `` `...` ``.
///
/// A backslash is removed if followed by `$`, `` ` `` or `\`, or by `"` in
/// double quotes.
#[must_use]
pub(super) fn unquote_backquoted(body: &[u8], in_dquote: bool) -> Vec<u8> {
    let mut result = Vec::with_capacity(body.len());
    let mut bytes = body.iter().copied().peekable();
    while let Some(byte) = bytes.next() {
        if byte == b'\\' {
            if let Some(&next) = bytes.peek() {
                if matches!(next, b'$' | b'`' | b'\\') || (in_dquote && next == b'"') {
                    result.push(next);
                    bytes.next();
                    continue;
                }
            }
        }
        result.push(byte);
    }
    result
}

impl Expander<'_> {
    /// Runs the commands in a subshell and returns their standard output.
    ///
    /// Null bytes and trailing newlines are removed from the output.
    pub(super) fn command_subst(&mut self, body: &[u8]) -> Result<Vec<u8>> {
        self.run_command_subst(body)
            .map_err(|errno| self.error(ErrorCause::CommandSubst(errno)))
    }

    fn run_command_subst(&mut self, body: &[u8]) -> std::result::Result<Vec<u8>, Errno> {
        let line_no = self.line_no;
        let (reader, writer) = self.env.system.pipe()?;
        let child = start_subshell(self.env, None, Some(writer), |env| {
            run_source(env, body, line_no)
        });
        let child = match child {
            Ok(child) => child,
            Err(errno) => {
                self.env.system.close(reader).ok();
                return Err(errno);
            }
        };

        let output = self.env.system.read_all(reader);
        self.env.system.close(reader).ok();
        let status = wait_subshell(self.env, child)?;
        self.last_command_subst_status = Some(status);

        let mut output = output?;
        output.retain(|&byte| byte != b'\0');
        while output.last() == Some(&b'\n') {
            output.pop();
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::{expand_word, expand_words};
    use super::*;
    use swsh_env::semantics::ExitStatus;
    use swsh_env_test_helper::env_with_builtins;
    use swsh_syntax::parser::lex::mark_word;
    use swsh_syntax::syntax::Word;

    fn word(source: &str) -> Word {
        Word {
            text: mark_word(source.as_bytes(), false).unwrap(),
            line_no: 1,
        }
    }

    #[test]
    fn unquoting_backquoted_text() {
        assert_eq!(unquote_backquoted(br"\$x \` \\ \a", false), br"$x ` \ \a");
        assert_eq!(unquote_backquoted(br#"\""#, false), br#"\""#);
        assert_eq!(unquote_backquoted(br#"\""#, true), br#"""#);
    }

    #[test]
    fn output_is_substituted() {
        let (mut env, _) = env_with_builtins();
        let (field, status) = expand_word(&mut env, &word("[$(echo a; echo b)]")).unwrap();
        assert_eq!(field.value, "[a\nb]");
        assert_eq!(status, Some(ExitStatus::SUCCESS));
    }

    #[test]
    fn trailing_newlines_are_removed() {
        let (mut env, _) = env_with_builtins();
        let (field, _) = expand_word(&mut env, &word("`echo x; echo; echo`")).unwrap();
        assert_eq!(field.value, "x");
    }

    #[test]
    fn exit_status_of_last_substitution() {
        let (mut env, _) = env_with_builtins();
        let (_, status) = expand_word(&mut env, &word("$(return 3)$(return 5)")).unwrap();
        assert_eq!(status, Some(ExitStatus(5)));
    }

    #[test]
    fn unquoted_output_is_split() {
        let (mut env, _) = env_with_builtins();
        let (fields, _) = expand_words(&mut env, &[word("$(echo 1 2)")]).unwrap();
        let values: Vec<_> = fields.into_iter().map(|f| f.value).collect();
        assert_eq!(values, ["1", "2"]);
    }

    #[test]
    fn subshell_does_not_affect_parent() {
        let (mut env, _) = env_with_builtins();
        let (field, _) = expand_word(&mut env, &word("$(x=1; echo $x)${x-unset}")).unwrap();
        assert_eq!(field.value, "1unset");
    }
}
