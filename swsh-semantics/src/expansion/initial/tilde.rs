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

//! Tilde expansion

use super::Expander;
use std::os::unix::ffi::OsStrExt;
use swsh_env::System;
use swsh_env::variable::HOME;
use swsh_syntax::bytes::decode;

impl Expander<'_> {
    /// Returns the directory a tilde prefix expands to.
    ///
    /// `name` is the part of the prefix after the `~`. An empty name yields
    /// `$HOME`; any other name is looked up in the user database. Returns
    /// `None` if the prefix is left unexpanded.
    pub(super) fn tilde(&self, name: &[u8]) -> Option<String> {
        if name.is_empty() {
            return self.env.variables.get(HOME)?.value.clone();
        }
        let name = std::str::from_utf8(name).ok()?;
        let dir = self.env.system.getpwnam_dir(name).ok()??;
        Some(decode(dir.as_os_str().as_bytes()).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::{expand_value, expand_word, expand_words};
    use swsh_env::variable::{HOME, Scope};
    use swsh_env_test_helper::virtual_env;
    use swsh_syntax::parser::lex::mark_word;
    use swsh_syntax::syntax::Word;

    fn word(source: &str) -> Word {
        Word {
            text: mark_word(source.as_bytes(), false).unwrap(),
            line_no: 1,
        }
    }

    #[test]
    fn home_directory() {
        let (mut env, _) = virtual_env();
        env.variables
            .get_or_new(HOME, Scope::Global)
            .assign("/home/me")
            .unwrap();
        assert_eq!(expand_word(&mut env, &word("~")).unwrap().0.value, "/home/me");
        assert_eq!(expand_word(&mut env, &word("~/a")).unwrap().0.value, "/home/me/a");
        assert_eq!(expand_word(&mut env, &word("'~'")).unwrap().0.value, "~");
        assert_eq!(expand_word(&mut env, &word("a~")).unwrap().0.value, "a~");
    }

    #[test]
    fn unset_home_leaves_tilde() {
        let (mut env, _) = virtual_env();
        assert_eq!(expand_word(&mut env, &word("~/x")).unwrap().0.value, "~/x");
    }

    #[test]
    fn user_home_directory() {
        let (mut env, state) = virtual_env();
        state
            .borrow_mut()
            .home_dirs
            .insert("alice".to_string(), "/users/alice".into());
        assert_eq!(
            expand_word(&mut env, &word("~alice/bin")).unwrap().0.value,
            "/users/alice/bin"
        );
        assert_eq!(expand_word(&mut env, &word("~bob")).unwrap().0.value, "~bob");
    }

    #[test]
    fn home_with_special_characters_is_not_split() {
        let (mut env, _) = virtual_env();
        env.variables
            .get_or_new(HOME, Scope::Global)
            .assign("/my home/*")
            .unwrap();
        let (fields, _) = expand_words(&mut env, &[word("~")]).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].value, "/my home/*");
    }

    #[test]
    fn tilde_after_colon_in_assignment() {
        let (mut env, _) = virtual_env();
        env.variables
            .get_or_new(HOME, Scope::Global)
            .assign("/h")
            .unwrap();
        let (value, _) = expand_value(&mut env, &word("~/a:~/b:x~")).unwrap();
        assert_eq!(value, "/h/a:/h/b:x~");
    }
}
