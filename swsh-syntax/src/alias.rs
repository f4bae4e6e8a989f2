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

//! Defining aliases.
//!
//! This module provides data structures for defining aliases in the shell
//! execution environment.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;
use std::hash::Hasher;
use std::rc::Rc;

/// Name-value pair that defines an alias.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Alias {
    /// Name of the alias that is matched against a command word by the parser
    pub name: String,
    /// Source text that replaces the command word
    pub replacement: String,
}

/// Wrapper of [`Alias`] for inserting into a hash set.
///
/// A `HashEntry` wraps an `Alias` in `Rc` so that the lexer can keep
/// referring to an alias while its replacement is being read, even if the
/// alias is redefined or removed in the meantime. The `Hash` and `PartialEq`
/// implementations compare only names.
///
/// ```
/// # use swsh_syntax::alias::{AliasSet, HashEntry};
/// let mut entries = AliasSet::new();
/// entries.insert(HashEntry::new("ll".to_string(), "ls -l".to_string()));
/// let old = entries.replace(HashEntry::new("ll".to_string(), "ls -al".to_string()));
/// assert_eq!(old.unwrap().0.replacement, "ls -l");
/// assert_eq!(entries.get("ll").unwrap().0.replacement, "ls -al");
/// ```
#[derive(Clone, Debug, Eq)]
pub struct HashEntry(pub Rc<Alias>);

impl HashEntry {
    /// Convenience method for creating a new alias definition as `HashEntry`
    pub fn new(name: String, replacement: String) -> HashEntry {
        HashEntry(Rc::new(Alias { name, replacement }))
    }
}

impl PartialEq for HashEntry {
    fn eq(&self, other: &HashEntry) -> bool {
        self.0.name == other.0.name
    }
}

impl Hash for HashEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state)
    }
}

impl Borrow<str> for HashEntry {
    fn borrow(&self) -> &str {
        &self.0.name
    }
}

/// Collection of aliases.
pub type AliasSet = HashSet<HashEntry>;

/// Tests whether the string is a valid alias name.
///
/// An alias name may contain alphanumerics, `_`, `!`, `%`, `,`, `-`, `@` and
/// non-ASCII bytes.
#[must_use]
pub fn is_alias_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || !b.is_ascii() || b"_!%,-@".contains(&b))
}

/// Interface used by the parser to look up aliases.
pub trait Glossary {
    /// Looks up an alias by name.
    ///
    /// The name is compared byte by byte.
    #[must_use]
    fn look_up(&self, name: &[u8]) -> Option<Rc<Alias>>;

    /// Returns whether the glossary is empty.
    #[must_use]
    fn is_empty(&self) -> bool;
}

impl Glossary for AliasSet {
    fn look_up(&self, name: &[u8]) -> Option<Rc<Alias>> {
        let name = std::str::from_utf8(name).ok()?;
        self.get(name).map(|entry| Rc::clone(&entry.0))
    }

    fn is_empty(&self) -> bool {
        self.is_empty()
    }
}

/// Empty glossary that does not contain any aliases
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct EmptyGlossary;

impl Glossary for EmptyGlossary {
    fn look_up(&self, _name: &[u8]) -> Option<Rc<Alias>> {
        None
    }

    fn is_empty(&self) -> bool {
        true
    }
}

impl<T: Glossary + ?Sized> Glossary for &T {
    fn look_up(&self, name: &[u8]) -> Option<Rc<Alias>> {
        (**self).look_up(name)
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }
}
