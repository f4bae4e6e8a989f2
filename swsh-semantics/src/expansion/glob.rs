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

//! Pathname expansion
//!
//! A field is split at each `/`, and each component that contains an unquoted
//! `*`, `?` or `[` is matched against the entries of the directory named by
//! the preceding components. Components without such characters are used as
//! they are. A leading period in a file name must be matched by a literal
//! period in the pattern.
//!
//! Errors reading directories are silently ignored.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use swsh_env::Env;
use swsh_env::System;
use swsh_fnmatch::{Config, Pattern, PatternChar};
use swsh_syntax::bytes::decode;
use swsh_syntax::marker::unmark;

fn is_pattern_char(&(byte, quoted): &(u8, bool)) -> bool {
    !quoted && matches!(byte, b'*' | b'?' | b'[')
}

fn to_pattern(component: &[(u8, bool)]) -> Option<Pattern> {
    let chars = component.iter().map(|&(byte, quoted)| {
        if quoted {
            PatternChar::Literal(byte)
        } else {
            PatternChar::Normal(byte)
        }
    });
    let mut config = Config::default();
    config.literal_period = true;
    Pattern::parse_with_config(chars, config).ok()
}

#[derive(Debug)]
struct Search<'e> {
    env: &'e Env,
    prefix: Vec<u8>,
    results: Vec<String>,
}

impl Search<'_> {
    fn search(&mut self, components: &[Vec<(u8, bool)>]) {
        let Some((this, rest)) = components.split_first() else {
            return;
        };

        let pattern = this
            .iter()
            .any(is_pattern_char)
            .then(|| to_pattern(this))
            .flatten();
        let Some(pattern) = pattern else {
            let old_len = self.prefix.len();
            self.prefix.extend(this.iter().map(|&(byte, _)| byte));
            self.next(rest, false);
            self.prefix.truncate(old_len);
            return;
        };

        let dir = if self.prefix.is_empty() {
            b".".to_vec()
        } else {
            self.prefix.clone()
        };
        let Ok(dir) = CString::new(dir) else { return };
        let Ok(mut names) = self.env.system.read_dir(&dir) else {
            return;
        };
        names.sort();
        for name in names {
            let name = name.as_bytes();
            if pattern.is_match(name) {
                let old_len = self.prefix.len();
                self.prefix.extend(name);
                self.next(rest, true);
                self.prefix.truncate(old_len);
            }
        }
    }

    /// Continues with the remaining components.
    ///
    /// `found` tells whether the last component was found in a directory.
    fn next(&mut self, rest: &[Vec<(u8, bool)>], found: bool) {
        if !rest.is_empty() {
            self.prefix.push(b'/');
            self.search(rest);
            self.prefix.pop();
        } else if found || self.exists() {
            self.results.push(decode(&self.prefix).into_owned());
        }
    }

    fn exists(&self) -> bool {
        let Ok(path) = CString::new(self.prefix.clone()) else {
            return false;
        };
        let system = &self.env.system;
        system.is_directory(&path) || system.is_regular_file(&path)
    }
}

/// Performs pathname expansion on a field.
///
/// `field` is marked text. Returns `None` if the field contains no unquoted
/// pattern character or no pathname matches. Otherwise, the matching
/// pathnames are returned in sorted order.
#[must_use]
pub fn glob(env: &Env, field: &[u8]) -> Option<Vec<String>> {
    let chars: Vec<(u8, bool)> = unmark(field).collect();
    if !chars.iter().any(is_pattern_char) {
        return None;
    }

    let components: Vec<Vec<(u8, bool)>> = chars
        .split(|&(byte, _)| byte == b'/')
        .map(<[_]>::to_vec)
        .collect();
    let mut search = Search {
        env,
        prefix: Vec::new(),
        results: Vec::new(),
    };
    search.search(&components);

    let mut results = search.results;
    if results.is_empty() {
        return None;
    }
    results.sort();
    Some(results)
}
